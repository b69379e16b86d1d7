//! Economics error types

use thiserror::Error;

/// Fixed-point arithmetic errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid decimal amount: {0}")]
    InvalidDecimal(String),
}

/// Pricing and distribution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomicsError {
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Distribution ratios must sum to {expected}, got {beneficiary} + {liquidity}")]
    RatioSum {
        beneficiary: u16,
        liquidity: u16,
        expected: u16,
    },
}

pub type Result<T> = std::result::Result<T, EconomicsError>;
