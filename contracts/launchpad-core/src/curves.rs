use casper_types::{U256, U512};

use crate::error::{LaunchpadError, Result};
use crate::math::{self, widen};

/// Constant product curve over a virtual ETH reserve.
///
/// The curve keeps `k = T * (E + V)` where `T` is the token reserve, `E` the
/// real ETH reserve and `V` a fixed virtual ETH reserve that sets the opening
/// price. Every quote rounds in favour of the curve, so `k` never shrinks and
/// a buy followed by a sell of the same tokens never returns more ETH than
/// went in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantProductCurve {
    virtual_eth_reserve: U512,
}

impl ConstantProductCurve {
    pub fn new(virtual_eth_reserve: U512) -> Self {
        Self {
            virtual_eth_reserve,
        }
    }

    pub fn virtual_eth_reserve(&self) -> U512 {
        self.virtual_eth_reserve
    }

    /// Returns `(k, E + V)` for the given reserves.
    fn invariant(&self, token_reserve: U256, eth_reserve: U512) -> Result<(U512, U512)> {
        let effective_eth = math::add(eth_reserve, self.virtual_eth_reserve)?;
        let k = math::mul(widen(token_reserve), effective_eth)?;
        Ok((k, effective_eth))
    }

    /// Tokens released for `eth_in` wei entering the curve.
    ///
    /// The result is always strictly below `token_reserve`: the new token
    /// reserve is a ceiling division of a positive `k`, so it stays >= 1.
    pub fn quote_buy(&self, eth_in: U512, token_reserve: U256, eth_reserve: U512) -> Result<U256> {
        if eth_in.is_zero() {
            return Err(LaunchpadError::ZeroAmount);
        }
        if token_reserve.is_zero() {
            return Err(LaunchpadError::InsufficientReserve);
        }

        let (k, effective_eth) = self.invariant(token_reserve, eth_reserve)?;
        let new_effective_eth = math::add(effective_eth, eth_in)?;
        let new_token_reserve = math::div_ceil(k, new_effective_eth)?;
        let tokens_out = math::sub(widen(token_reserve), new_token_reserve)?;

        math::narrow(tokens_out)
    }

    /// Wei released for `tokens_in` tokens returning to the curve.
    pub fn quote_sell(&self, tokens_in: U256, token_reserve: U256, eth_reserve: U512) -> Result<U512> {
        if tokens_in.is_zero() {
            return Err(LaunchpadError::ZeroAmount);
        }

        let (k, effective_eth) = self.invariant(token_reserve, eth_reserve)?;
        let new_token_reserve = math::add(widen(token_reserve), widen(tokens_in))?;
        let new_effective_eth = math::div_ceil(k, new_token_reserve)?;
        let eth_out = effective_eth
            .checked_sub(new_effective_eth)
            .unwrap_or_else(U512::zero);

        if eth_out > eth_reserve {
            return Err(LaunchpadError::InsufficientReserve);
        }
        Ok(eth_out)
    }

    /// Marginal price in wei per whole token (`10^decimals` base units).
    pub fn spot_price(&self, token_reserve: U256, eth_reserve: U512, decimals: u8) -> Result<U512> {
        if token_reserve.is_zero() {
            return Err(LaunchpadError::InsufficientReserve);
        }
        let effective_eth = math::add(eth_reserve, self.virtual_eth_reserve)?;
        math::mul_div(effective_eth, math::pow10(decimals)?, widen(token_reserve))
    }
}
