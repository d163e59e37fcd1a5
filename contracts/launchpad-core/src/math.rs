//! Checked wide-integer helpers shared by the curve, fee and oracle code.

use casper_types::{U256, U512};

use crate::error::{LaunchpadError, Result};

/// Lossless U256 -> U512.
pub fn widen(value: U256) -> U512 {
    let mut words = [0u64; 8];
    words[..4].copy_from_slice(&value.0);
    U512(words)
}

/// U512 -> U256, failing when the upper half is non-zero.
pub fn narrow(value: U512) -> Result<U256> {
    if value.0[4..].iter().any(|word| *word != 0) {
        return Err(LaunchpadError::Overflow);
    }
    let mut words = [0u64; 4];
    words.copy_from_slice(&value.0[..4]);
    Ok(U256(words))
}

pub fn add(a: U512, b: U512) -> Result<U512> {
    a.checked_add(b).ok_or(LaunchpadError::Overflow)
}

pub fn sub(a: U512, b: U512) -> Result<U512> {
    a.checked_sub(b).ok_or(LaunchpadError::Overflow)
}

pub fn mul(a: U512, b: U512) -> Result<U512> {
    a.checked_mul(b).ok_or(LaunchpadError::Overflow)
}

/// floor(a * b / d)
pub fn mul_div(a: U512, b: U512, d: U512) -> Result<U512> {
    if d.is_zero() {
        return Err(LaunchpadError::Overflow);
    }
    Ok(mul(a, b)? / d)
}

/// ceil(n / d)
pub fn div_ceil(n: U512, d: U512) -> Result<U512> {
    if d.is_zero() {
        return Err(LaunchpadError::Overflow);
    }
    let quotient = n / d;
    if quotient * d == n {
        Ok(quotient)
    } else {
        add(quotient, U512::one())
    }
}

/// 10^exp. U512 tops out just above 10^154.
pub fn pow10(exp: u8) -> Result<U512> {
    U512::from(10u64)
        .checked_pow(U512::from(exp))
        .ok_or(LaunchpadError::Overflow)
}
