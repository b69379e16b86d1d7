//! Ledger error types

use crate::identity::Address;
use thiserror::Error;

/// Token ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance for {holder}: requested {requested}, available {available}")]
    InsufficientBalance {
        holder: Address,
        requested: u128,
        available: u128,
    },

    #[error("Insufficient allowance for {spender}: requested {requested}, approved {approved}")]
    InsufficientAllowance {
        spender: Address,
        requested: u128,
        approved: u128,
    },

    #[error("Total supply overflow")]
    SupplyOverflow,

    #[error("Zero address not allowed as {0}")]
    ZeroAddress(&'static str),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
