//! Pool identity
//!
//! A pool is keyed by its two currencies in canonical order (lower identity
//! in the first slot), its fee tier and its tick spacing. The native base
//! asset is the zero identity, so it always takes the first slot.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use surge_core::Address;

/// Fee tier in hundredths of a basis point (0.30%)
pub const DEFAULT_FEE_TIER: u32 = 3000;

/// Tick spacing paired with the 0.30% tier
pub const DEFAULT_TICK_SPACING: i32 = 60;

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = 887272;

/// Native base asset currency
pub const NATIVE: Address = Address::ZERO;

/// Inclusive tick bounds of a position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TickRange {
    pub lower: i32,
    pub upper: i32,
}

impl TickRange {
    /// The widest range whose bounds are multiples of `tick_spacing`
    pub fn full_range(tick_spacing: i32) -> Self {
        let spacing = tick_spacing.max(1);
        Self {
            lower: (MIN_TICK / spacing) * spacing,
            upper: (MAX_TICK / spacing) * spacing,
        }
    }
}

/// Keccak-256 of the canonical pool key encoding
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolId(pub [u8; 32]);

impl PoolId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolId({})", self)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolKey {
    pub currency0: Address,
    pub currency1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
}

impl PoolKey {
    /// Pair `token` with `base`, ordering the currencies canonically
    pub fn new(token: Address, base: Address, fee: u32, tick_spacing: i32) -> Self {
        let (currency0, currency1) = if token < base {
            (token, base)
        } else {
            (base, token)
        };

        Self {
            currency0,
            currency1,
            fee,
            tick_spacing,
        }
    }

    /// Pair `token` with the native base asset at the default tier
    pub fn native_pair(token: Address) -> Self {
        Self::new(token, NATIVE, DEFAULT_FEE_TIER, DEFAULT_TICK_SPACING)
    }

    pub fn token_is_currency0(&self, token: &Address) -> bool {
        &self.currency0 == token
    }

    pub fn id(&self) -> PoolId {
        let mut hasher = Keccak256::new();
        hasher.update(self.currency0.as_bytes());
        hasher.update(self.currency1.as_bytes());
        hasher.update(self.fee.to_be_bytes());
        hasher.update(self.tick_spacing.to_be_bytes());

        let mut id = [0u8; 32];
        id.copy_from_slice(&hasher.finalize());
        PoolId(id)
    }

    pub fn full_range(&self) -> TickRange {
        TickRange::full_range(self.tick_spacing)
    }
}
