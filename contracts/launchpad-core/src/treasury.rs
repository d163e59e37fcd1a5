//! Factory treasury: creation fees plus trading fees swept out of curves.
//!
//! Every routed trade moves its curve's uncollected fee into the treasury
//! right away, so paying the owner touches two ledgers no matter how many
//! curves the factory has launched.

use alloc::vec::Vec;

use casper_types::{
    bytesrepr::{self, FromBytes, ToBytes},
    CLType, CLTyped, Key, U512,
};

use crate::engine::BondingCurve;
use crate::error::{LaunchpadError, Result};
use crate::fees::FeeLedger;
use crate::math;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Treasury {
    creation: FeeLedger,
    trading: FeeLedger,
}

impl Treasury {
    pub fn new(owner: Key) -> Self {
        Self {
            creation: FeeLedger::new(owner),
            trading: FeeLedger::new(owner),
        }
    }

    pub fn owner(&self) -> Key {
        self.creation.owner()
    }

    pub fn creation_fees(&self) -> &FeeLedger {
        &self.creation
    }

    pub fn trading_fees(&self) -> &FeeLedger {
        &self.trading
    }

    /// Everything the owner could withdraw right now.
    pub fn pending(&self) -> Result<U512> {
        math::add(self.creation.available(), self.trading.available())
    }

    pub fn collect_creation_fee(&mut self, paid: U512) -> Result<()> {
        self.creation.accumulate(paid)
    }

    /// Moves the curve's uncollected trading fees in. `factory` must own the
    /// curve's ledger. Leaves both sides untouched on error.
    pub fn sweep(&mut self, curve: &mut BondingCurve, factory: &Key) -> Result<U512> {
        let available = curve.state().fees().available();
        if available.is_zero() {
            return Ok(available);
        }
        let mut trading = self.trading.clone();
        trading.accumulate(available)?;
        let swept = curve.withdraw_fees(factory)?;
        self.trading = trading;
        Ok(swept)
    }

    /// Drains both ledgers to the owner and returns the amount moved.
    pub fn withdraw(&mut self, caller: &Key) -> Result<U512> {
        if *caller != self.owner() {
            return Err(LaunchpadError::Unauthorized);
        }
        let total = self.pending()?;
        if total.is_zero() {
            return Ok(total);
        }
        self.creation.withdraw_all(caller)?;
        self.trading.withdraw_all(caller)?;
        Ok(total)
    }
}

impl ToBytes for Treasury {
    fn to_bytes(&self) -> core::result::Result<Vec<u8>, bytesrepr::Error> {
        let mut buffer = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        self.creation.serialized_length() + self.trading.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> core::result::Result<(), bytesrepr::Error> {
        self.creation.write_bytes(writer)?;
        self.trading.write_bytes(writer)
    }
}

impl FromBytes for Treasury {
    fn from_bytes(bytes: &[u8]) -> core::result::Result<(Self, &[u8]), bytesrepr::Error> {
        let (creation, rem) = FeeLedger::from_bytes(bytes)?;
        let (trading, rem) = FeeLedger::from_bytes(rem)?;
        if creation.owner() != trading.owner() {
            return Err(bytesrepr::Error::Formatting);
        }
        Ok((Treasury { creation, trading }, rem))
    }
}

impl CLTyped for Treasury {
    fn cl_type() -> CLType {
        CLType::Any
    }
}
