use casper_types::U512;

use crate::error::{LaunchpadError, Result};
use crate::math;

/// Decimals of every USD figure the launchpad reports.
pub const USD_DECIMALS: u8 = 8;

/// Widest feed precision accepted. Anything finer is treated as a broken feed.
pub const MAX_FEED_DECIMALS: u8 = 36;

/// ETH/USD answer as published by the feed: `answer / 10^decimals` USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsdQuote {
    pub answer: U512,
    pub decimals: u8,
}

impl UsdQuote {
    /// Rejects quotes no feed should publish: a zero answer or a precision
    /// past [`MAX_FEED_DECIMALS`].
    pub fn checked(self) -> Result<Self> {
        if self.answer.is_zero() || self.decimals > MAX_FEED_DECIMALS {
            return Err(LaunchpadError::OracleUnavailable);
        }
        Ok(self)
    }

    /// Converts `wei` into USD with [`USD_DECIMALS`] decimals.
    pub fn wei_to_usd(&self, wei: U512) -> Result<U512> {
        if self.decimals > MAX_FEED_DECIMALS {
            return Err(LaunchpadError::OracleUnavailable);
        }
        // wei * answer / 10^18 gives USD at the feed's precision
        let at_feed = math::mul_div(wei, self.answer, math::pow10(18)?)?;
        if self.decimals >= USD_DECIMALS {
            Ok(at_feed / math::pow10(self.decimals - USD_DECIMALS)?)
        } else {
            math::mul(at_feed, math::pow10(USD_DECIMALS - self.decimals)?)
        }
    }
}

/// Read-only ETH/USD source.
pub trait PriceOracle {
    fn eth_usd(&self) -> Result<UsdQuote>;
}

/// Oracle pinned to a configured answer; `None` models a feed that is down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedRateOracle {
    quote: Option<UsdQuote>,
}

impl FixedRateOracle {
    pub fn new(answer: U512, decimals: u8) -> Self {
        Self {
            quote: Some(UsdQuote { answer, decimals }),
        }
    }

    pub fn unavailable() -> Self {
        Self { quote: None }
    }
}

impl PriceOracle for FixedRateOracle {
    fn eth_usd(&self) -> Result<UsdQuote> {
        self.quote
            .ok_or(LaunchpadError::OracleUnavailable)?
            .checked()
    }
}
