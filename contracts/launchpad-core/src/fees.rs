use alloc::vec::Vec;

use casper_types::{
    bytesrepr::{self, FromBytes, ToBytes},
    CLType, CLTyped, Key, U512,
};

use crate::error::{LaunchpadError, Result};
use crate::math;

/// Basis-point denominator; fee rates live in `[0, BPS_DENOMINATOR)`.
pub const BPS_DENOMINATOR: u16 = 10_000;

pub fn validate_fee_bps(fee_bps: u16) -> Result<()> {
    if fee_bps >= BPS_DENOMINATOR {
        return Err(LaunchpadError::InvalidFeeRate);
    }
    Ok(())
}

/// Splits `gross` into `(net, fee)`.
///
/// `net` is rounded down and `fee` takes the remainder, so
/// `net + fee == gross` holds exactly for every input.
pub fn apply_fee(gross: U512, fee_bps: u16) -> Result<(U512, U512)> {
    validate_fee_bps(fee_bps)?;
    let keep_bps = U512::from(BPS_DENOMINATOR - fee_bps);
    let net = math::mul_div(gross, keep_bps, U512::from(BPS_DENOMINATOR))?;
    let fee = math::sub(gross, net)?;
    Ok((net, fee))
}

/// Running total of fees a curve (or the factory) has taken in.
///
/// Only `owner` may withdraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeLedger {
    owner: Key,
    collected: U512,
    withdrawn: U512,
}

impl FeeLedger {
    pub fn new(owner: Key) -> Self {
        Self {
            owner,
            collected: U512::zero(),
            withdrawn: U512::zero(),
        }
    }

    pub fn owner(&self) -> Key {
        self.owner
    }

    /// Everything ever accumulated, withdrawn or not.
    pub fn collected(&self) -> U512 {
        self.collected
    }

    pub fn withdrawn(&self) -> U512 {
        self.withdrawn
    }

    pub fn available(&self) -> U512 {
        self.collected - self.withdrawn
    }

    pub fn accumulate(&mut self, fee: U512) -> Result<()> {
        self.collected = math::add(self.collected, fee)?;
        Ok(())
    }

    pub fn withdraw(&mut self, caller: &Key, amount: U512) -> Result<U512> {
        if *caller != self.owner {
            return Err(LaunchpadError::Unauthorized);
        }
        if amount > self.available() {
            return Err(LaunchpadError::InsufficientFeeBalance);
        }
        self.withdrawn = math::add(self.withdrawn, amount)?;
        Ok(amount)
    }

    pub fn withdraw_all(&mut self, caller: &Key) -> Result<U512> {
        let available = self.available();
        self.withdraw(caller, available)
    }
}

impl ToBytes for FeeLedger {
    fn to_bytes(&self) -> core::result::Result<Vec<u8>, bytesrepr::Error> {
        let mut buffer = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        self.owner.serialized_length()
            + self.collected.serialized_length()
            + self.withdrawn.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> core::result::Result<(), bytesrepr::Error> {
        self.owner.write_bytes(writer)?;
        self.collected.write_bytes(writer)?;
        self.withdrawn.write_bytes(writer)
    }
}

impl FromBytes for FeeLedger {
    fn from_bytes(bytes: &[u8]) -> core::result::Result<(Self, &[u8]), bytesrepr::Error> {
        let (owner, rem) = Key::from_bytes(bytes)?;
        let (collected, rem) = U512::from_bytes(rem)?;
        let (withdrawn, rem) = U512::from_bytes(rem)?;
        if withdrawn > collected {
            return Err(bytesrepr::Error::Formatting);
        }
        Ok((
            FeeLedger {
                owner,
                collected,
                withdrawn,
            },
            rem,
        ))
    }
}

impl CLTyped for FeeLedger {
    fn cl_type() -> CLType {
        CLType::Any
    }
}
