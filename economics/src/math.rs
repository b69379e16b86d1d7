//! Fixed-point arithmetic
//!
//! Every amount and price is an integer at scale `SCALE = 10^18`. Division
//! always truncates, so each derived quantity (tokens minted, shares paid
//! out) rounds down, in the protocol's favor.

use primitive_types::U256;

use crate::constants::{DECIMALS, SCALE};
use crate::error::MathError;

/// `floor(a * b / d)` with a 256-bit intermediate product
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128, MathError> {
    if d == 0 {
        return Err(MathError::DivisionByZero);
    }

    // Both factors fit in 128 bits, so the product fits in 256
    let quotient = U256::from(a) * U256::from(b) / U256::from(d);
    if quotient > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(quotient.as_u128())
}

/// Parse a decimal string ("1.5", "0.001", "42") into fixed-point units
pub fn parse_units(input: &str) -> Result<u128, MathError> {
    let trimmed = input.trim();
    let invalid = || MathError::InvalidDecimal(input.to_string());

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }
    if fraction.len() > DECIMALS as usize {
        return Err(invalid());
    }

    let whole_units: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };

    let mut padded = fraction.to_string();
    while padded.len() < DECIMALS as usize {
        padded.push('0');
    }
    let fraction_units: u128 = padded.parse().map_err(|_| invalid())?;

    whole_units
        .checked_mul(SCALE)
        .and_then(|w| w.checked_add(fraction_units))
        .ok_or(MathError::Overflow)
}

/// Render fixed-point units as a decimal string without trailing zeros
pub fn format_units(amount: u128) -> String {
    let whole = amount / SCALE;
    let fraction = amount % SCALE;
    if fraction == 0 {
        return whole.to_string();
    }

    let digits = format!("{:0width$}", fraction, width = DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}
