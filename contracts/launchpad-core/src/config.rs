use casper_types::{U256, U512};
use serde::{Deserialize, Serialize};

use crate::curves::ConstantProductCurve;
use crate::error::{LaunchpadError, Result};
use crate::fees::BPS_DENOMINATOR;

const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// 0.02 ETH
pub const DEFAULT_CREATION_FEE_WEI: u128 = WEI_PER_ETH / 50;
/// 1 billion tokens at 18 decimals
pub const DEFAULT_INITIAL_SUPPLY: u128 = 1_000_000_000 * WEI_PER_ETH;
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;
/// 1%
pub const DEFAULT_TRADING_FEE_BPS: u16 = 100;
pub const DEFAULT_MIGRATION_THRESHOLD_WEI: u128 = 10 * WEI_PER_ETH;
pub const DEFAULT_VIRTUAL_ETH_RESERVE_WEI: u128 = WEI_PER_ETH;

/// Past this, `10^decimals` no longer fits the price arithmetic.
pub const MAX_TOKEN_DECIMALS: u8 = 36;

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_SYMBOL_LEN: usize = 10;

/// Factory-wide launch parameters. Every new curve starts from these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchpadConfig {
    pub creation_fee_wei: u128,
    pub initial_supply: u128,
    pub token_decimals: u8,
    pub trading_fee_bps: u16,
    pub migration_threshold_wei: u128,
    pub virtual_eth_reserve_wei: u128,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            creation_fee_wei: DEFAULT_CREATION_FEE_WEI,
            initial_supply: DEFAULT_INITIAL_SUPPLY,
            token_decimals: DEFAULT_TOKEN_DECIMALS,
            trading_fee_bps: DEFAULT_TRADING_FEE_BPS,
            migration_threshold_wei: DEFAULT_MIGRATION_THRESHOLD_WEI,
            virtual_eth_reserve_wei: DEFAULT_VIRTUAL_ETH_RESERVE_WEI,
        }
    }
}

impl LaunchpadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.initial_supply == 0
            || self.migration_threshold_wei == 0
            || self.virtual_eth_reserve_wei == 0
            || self.trading_fee_bps >= BPS_DENOMINATOR
            || self.token_decimals > MAX_TOKEN_DECIMALS
        {
            return Err(LaunchpadError::InvalidConfig);
        }
        Ok(())
    }

    pub fn creation_fee(&self) -> U512 {
        U512::from(self.creation_fee_wei)
    }

    pub fn initial_supply(&self) -> U256 {
        U256::from(self.initial_supply)
    }

    pub fn migration_threshold(&self) -> U512 {
        U512::from(self.migration_threshold_wei)
    }

    pub fn curve(&self) -> ConstantProductCurve {
        ConstantProductCurve::new(U512::from(self.virtual_eth_reserve_wei))
    }
}

/// Launch parameters an installer may supply. `None` keeps the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub creation_fee_wei: Option<u128>,
    pub initial_supply: Option<u128>,
    pub token_decimals: Option<u8>,
    pub trading_fee_bps: Option<u16>,
    pub migration_threshold_wei: Option<u128>,
    pub virtual_eth_reserve_wei: Option<u128>,
}

impl ConfigOverrides {
    /// Layers the overrides on [`LaunchpadConfig::default`] and validates
    /// the result.
    pub fn resolve(self) -> Result<LaunchpadConfig> {
        let defaults = LaunchpadConfig::default();
        let config = LaunchpadConfig {
            creation_fee_wei: self.creation_fee_wei.unwrap_or(defaults.creation_fee_wei),
            initial_supply: self.initial_supply.unwrap_or(defaults.initial_supply),
            token_decimals: self.token_decimals.unwrap_or(defaults.token_decimals),
            trading_fee_bps: self.trading_fee_bps.unwrap_or(defaults.trading_fee_bps),
            migration_threshold_wei: self
                .migration_threshold_wei
                .unwrap_or(defaults.migration_threshold_wei),
            virtual_eth_reserve_wei: self
                .virtual_eth_reserve_wei
                .unwrap_or(defaults.virtual_eth_reserve_wei),
        };
        config.validate()?;
        Ok(config)
    }
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(LaunchpadError::InvalidName);
    }
    Ok(())
}

pub fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN {
        return Err(LaunchpadError::InvalidSymbol);
    }
    Ok(())
}
