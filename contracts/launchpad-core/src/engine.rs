//! Per-token bonding curve state machine.
//!
//! ```text
//!   ┌────────┐   buy lifts ETH reserve ≥ threshold   ┌──────────┐
//!   │ Active │ ─────────────────────────────────────▶ │ Migrated │
//!   └────────┘            (exactly once)              └──────────┘
//! ```
//!
//! Buys and sells are computed against a snapshot of the reserves and only
//! written back after every check has passed, so a rejected call leaves the
//! curve, its fee ledger and the token balances untouched.

use alloc::vec::Vec;

use casper_types::{
    bytesrepr::{self, FromBytes, ToBytes},
    CLType, CLTyped, Key, U256, U512,
};
use tracing::{debug, info};

use crate::config::LaunchpadConfig;
use crate::curves::ConstantProductCurve;
use crate::error::{LaunchpadError, Result};
use crate::events::{EventSink, LaunchpadEvent};
use crate::fees::{apply_fee, validate_fee_bps, FeeLedger, BPS_DENOMINATOR};
use crate::math::{self, widen};
use crate::oracle::PriceOracle;
use crate::token::FungibleToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CurvePhase {
    /// Trading open.
    Active = 0,
    /// Threshold reached; terminal.
    Migrated = 1,
}

impl CurvePhase {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CurvePhase::Active),
            1 => Some(CurvePhase::Migrated),
            _ => None,
        }
    }

    pub fn is_migrated(&self) -> bool {
        matches!(self, CurvePhase::Migrated)
    }
}

/// Reserves and trading parameters of one curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveState {
    token_reserve: U256,
    eth_reserve: U512,
    fee_bps: u16,
    migration_threshold: U512,
    phase: CurvePhase,
    fees: FeeLedger,
}

impl CurveState {
    pub fn token_reserve(&self) -> U256 {
        self.token_reserve
    }

    pub fn eth_reserve(&self) -> U512 {
        self.eth_reserve
    }

    pub fn fee_bps(&self) -> u16 {
        self.fee_bps
    }

    pub fn migration_threshold(&self) -> U512 {
        self.migration_threshold
    }

    pub fn phase(&self) -> CurvePhase {
        self.phase
    }

    pub fn is_migrated(&self) -> bool {
        self.phase.is_migrated()
    }

    pub fn fees(&self) -> &FeeLedger {
        &self.fees
    }

    /// Cumulative trading fees ever taken by this curve.
    pub fn fees_collected(&self) -> U512 {
        self.fees.collected()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyReceipt {
    pub tokens_out: U256,
    pub eth_in: U512,
    /// Part of `eth_in` that entered the reserve.
    pub net_eth: U512,
    pub fee: U512,
    pub migrated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellReceipt {
    pub tokens_in: U256,
    /// Taken out of the reserve.
    pub gross_eth: U512,
    /// Owed to the seller.
    pub eth_out: U512,
    pub fee: U512,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondingCurve {
    address: Key,
    token: Key,
    creator: Key,
    main_owner: Key,
    decimals: u8,
    total_supply: U256,
    curve: ConstantProductCurve,
    state: CurveState,
}

impl BondingCurve {
    /// A fresh curve holding the whole initial supply and no ETH. The token
    /// ledger is expected to have minted `config.initial_supply` to `address`.
    pub fn new(
        address: Key,
        token: Key,
        creator: Key,
        main_owner: Key,
        config: &LaunchpadConfig,
    ) -> Self {
        let total_supply = config.initial_supply();
        Self {
            address,
            token,
            creator,
            main_owner,
            decimals: config.token_decimals,
            total_supply,
            curve: config.curve(),
            state: CurveState {
                token_reserve: total_supply,
                eth_reserve: U512::zero(),
                fee_bps: config.trading_fee_bps,
                migration_threshold: config.migration_threshold(),
                phase: CurvePhase::Active,
                fees: FeeLedger::new(main_owner),
            },
        }
    }

    pub fn address(&self) -> Key {
        self.address
    }

    pub fn token(&self) -> Key {
        self.token
    }

    pub fn creator(&self) -> Key {
        self.creator
    }

    /// The factory that launched this curve.
    pub fn main_owner(&self) -> Key {
        self.main_owner
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn state(&self) -> &CurveState {
        &self.state
    }

    pub fn trading_fee_bps(&self) -> u16 {
        self.state.fee_bps
    }

    fn require_active(&self) -> Result<()> {
        if self.state.phase.is_migrated() {
            return Err(LaunchpadError::CurveMigrated);
        }
        Ok(())
    }

    /// Tokens a buyer would receive for `eth_in`, fee included.
    pub fn calculate_buy_amount(&self, eth_in: U512) -> Result<U256> {
        if eth_in.is_zero() {
            return Err(LaunchpadError::ZeroAmount);
        }
        let (net_eth, _) = apply_fee(eth_in, self.state.fee_bps)?;
        let tokens = self
            .curve
            .quote_buy(net_eth, self.state.token_reserve, self.state.eth_reserve)?;
        debug!(token = %self.token, eth_in = %eth_in, tokens = %tokens, "buy quote");
        Ok(tokens)
    }

    /// ETH a seller would receive for `token_amount`, fee removed.
    pub fn calculate_sell_amount(&self, token_amount: U256) -> Result<U512> {
        let gross = self
            .curve
            .quote_sell(token_amount, self.state.token_reserve, self.state.eth_reserve)?;
        let (net, _) = apply_fee(gross, self.state.fee_bps)?;
        debug!(token = %self.token, tokens = %token_amount, eth_out = %net, "sell quote");
        Ok(net)
    }

    pub fn buy<T, E>(
        &mut self,
        buyer: &Key,
        eth_in: U512,
        min_tokens_out: U256,
        token: &mut T,
        events: &mut E,
    ) -> Result<BuyReceipt>
    where
        T: FungibleToken,
        E: EventSink,
    {
        self.require_active()?;
        if eth_in.is_zero() {
            return Err(LaunchpadError::ZeroAmount);
        }

        let (net_eth, fee) = apply_fee(eth_in, self.state.fee_bps)?;
        let tokens_out = self
            .curve
            .quote_buy(net_eth, self.state.token_reserve, self.state.eth_reserve)?;
        if tokens_out.is_zero() {
            return Err(LaunchpadError::ZeroAmount);
        }
        if tokens_out < min_tokens_out {
            return Err(LaunchpadError::SlippageExceeded);
        }

        let token_reserve = self
            .state
            .token_reserve
            .checked_sub(tokens_out)
            .ok_or(LaunchpadError::InsufficientReserve)?;
        let eth_reserve = math::add(self.state.eth_reserve, net_eth)?;
        let mut fees = self.state.fees.clone();
        fees.accumulate(fee)?;

        token.transfer(&self.address, buyer, tokens_out)?;

        self.state.token_reserve = token_reserve;
        self.state.eth_reserve = eth_reserve;
        self.state.fees = fees;

        info!(
            token = %self.token,
            buyer = %buyer,
            eth_in = %eth_in,
            tokens_out = %tokens_out,
            fee = %fee,
            "curve buy"
        );
        events.emit(LaunchpadEvent::Buy {
            buyer: *buyer,
            token: self.token,
            token_amount: tokens_out,
            eth_amount: eth_in,
            fee,
        });

        let migrated = eth_reserve >= self.state.migration_threshold;
        if migrated {
            self.state.phase = CurvePhase::Migrated;
            info!(
                token = %self.token,
                eth_reserve = %eth_reserve,
                token_reserve = %token_reserve,
                "curve migrated"
            );
            events.emit(LaunchpadEvent::Migrated {
                token: self.token,
                curve: self.address,
                eth_reserve,
                token_reserve,
            });
        }

        Ok(BuyReceipt {
            tokens_out,
            eth_in,
            net_eth,
            fee,
            migrated,
        })
    }

    /// The seller must have approved this curve's address for at least
    /// `token_amount` on the token beforehand.
    pub fn sell<T, E>(
        &mut self,
        seller: &Key,
        token_amount: U256,
        min_eth_out: U512,
        token: &mut T,
        events: &mut E,
    ) -> Result<SellReceipt>
    where
        T: FungibleToken,
        E: EventSink,
    {
        self.require_active()?;
        if token_amount.is_zero() {
            return Err(LaunchpadError::ZeroAmount);
        }
        if token.allowance(seller, &self.address) < token_amount {
            return Err(LaunchpadError::TransferNotApproved);
        }
        if token.balance_of(seller) < token_amount {
            return Err(LaunchpadError::InsufficientBalance);
        }

        let gross_eth = self
            .curve
            .quote_sell(token_amount, self.state.token_reserve, self.state.eth_reserve)?;
        let (eth_out, fee) = apply_fee(gross_eth, self.state.fee_bps)?;
        if eth_out.is_zero() {
            return Err(LaunchpadError::ZeroAmount);
        }
        if eth_out < min_eth_out {
            return Err(LaunchpadError::SlippageExceeded);
        }

        let token_reserve = self
            .state
            .token_reserve
            .checked_add(token_amount)
            .ok_or(LaunchpadError::Overflow)?;
        let eth_reserve = self
            .state
            .eth_reserve
            .checked_sub(gross_eth)
            .ok_or(LaunchpadError::InsufficientReserve)?;
        let mut fees = self.state.fees.clone();
        fees.accumulate(fee)?;

        token.transfer_from(&self.address, seller, &self.address, token_amount)?;

        self.state.token_reserve = token_reserve;
        self.state.eth_reserve = eth_reserve;
        self.state.fees = fees;

        info!(
            token = %self.token,
            seller = %seller,
            tokens_in = %token_amount,
            eth_out = %eth_out,
            fee = %fee,
            "curve sell"
        );
        events.emit(LaunchpadEvent::Sell {
            seller: *seller,
            token: self.token,
            token_amount,
            eth_amount: eth_out,
            fee,
        });

        Ok(SellReceipt {
            tokens_in: token_amount,
            gross_eth,
            eth_out,
            fee,
        })
    }

    /// Progress toward migration in basis points, capped at 10000.
    pub fn curve_progress(&self) -> u64 {
        let full = u64::from(BPS_DENOMINATOR);
        if self.state.is_migrated() {
            return full;
        }
        let threshold = self.state.migration_threshold;
        if threshold.is_zero() {
            return 0;
        }
        let progress = self.state.eth_reserve * U512::from(full) / threshold;
        if progress >= U512::from(full) {
            full
        } else {
            progress.as_u64()
        }
    }

    /// Spot price in wei per whole token.
    pub fn current_price_in_eth(&self) -> Result<U512> {
        self.curve.spot_price(
            self.state.token_reserve,
            self.state.eth_reserve,
            self.decimals,
        )
    }

    pub fn current_price_in_usd<O: PriceOracle>(&self, oracle: &O) -> Result<U512> {
        let quote = oracle.eth_usd()?;
        quote.wei_to_usd(self.current_price_in_eth()?)
    }

    /// Spot price × total supply, in USD with 8 decimals.
    pub fn current_market_cap_in_usd<O: PriceOracle>(&self, oracle: &O) -> Result<U512> {
        let quote = oracle.eth_usd()?;
        if self.state.token_reserve.is_zero() {
            return Err(LaunchpadError::InsufficientReserve);
        }
        let effective_eth = math::add(self.state.eth_reserve, self.curve.virtual_eth_reserve())?;
        let market_cap_wei = math::mul_div(
            widen(self.total_supply),
            effective_eth,
            widen(self.state.token_reserve),
        )?;
        quote.wei_to_usd(market_cap_wei)
    }

    /// Returns the previous rate.
    pub fn set_trading_fee(&mut self, caller: &Key, new_fee_bps: u16) -> Result<u16> {
        if *caller != self.main_owner {
            return Err(LaunchpadError::Unauthorized);
        }
        validate_fee_bps(new_fee_bps)?;
        let old = self.state.fee_bps;
        self.state.fee_bps = new_fee_bps;
        Ok(old)
    }

    /// Drains the trading-fee ledger to its owner (the factory).
    pub fn withdraw_fees(&mut self, caller: &Key) -> Result<U512> {
        self.state.fees.withdraw_all(caller)
    }
}

impl ToBytes for CurvePhase {
    fn to_bytes(&self) -> core::result::Result<Vec<u8>, bytesrepr::Error> {
        (*self as u8).to_bytes()
    }

    fn serialized_length(&self) -> usize {
        (*self as u8).serialized_length()
    }
}

impl FromBytes for CurvePhase {
    fn from_bytes(bytes: &[u8]) -> core::result::Result<(Self, &[u8]), bytesrepr::Error> {
        let (tag, rem) = u8::from_bytes(bytes)?;
        let phase = CurvePhase::from_u8(tag).ok_or(bytesrepr::Error::Formatting)?;
        Ok((phase, rem))
    }
}

impl ToBytes for CurveState {
    fn to_bytes(&self) -> core::result::Result<Vec<u8>, bytesrepr::Error> {
        let mut buffer = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        self.token_reserve.serialized_length()
            + self.eth_reserve.serialized_length()
            + self.fee_bps.serialized_length()
            + self.migration_threshold.serialized_length()
            + self.phase.serialized_length()
            + self.fees.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> core::result::Result<(), bytesrepr::Error> {
        self.token_reserve.write_bytes(writer)?;
        self.eth_reserve.write_bytes(writer)?;
        self.fee_bps.write_bytes(writer)?;
        self.migration_threshold.write_bytes(writer)?;
        self.phase.write_bytes(writer)?;
        self.fees.write_bytes(writer)
    }
}

impl FromBytes for CurveState {
    fn from_bytes(bytes: &[u8]) -> core::result::Result<(Self, &[u8]), bytesrepr::Error> {
        let (token_reserve, rem) = U256::from_bytes(bytes)?;
        let (eth_reserve, rem) = U512::from_bytes(rem)?;
        let (fee_bps, rem) = u16::from_bytes(rem)?;
        let (migration_threshold, rem) = U512::from_bytes(rem)?;
        let (phase, rem) = CurvePhase::from_bytes(rem)?;
        let (fees, rem) = FeeLedger::from_bytes(rem)?;
        Ok((
            CurveState {
                token_reserve,
                eth_reserve,
                fee_bps,
                migration_threshold,
                phase,
                fees,
            },
            rem,
        ))
    }
}

impl CLTyped for CurveState {
    fn cl_type() -> CLType {
        CLType::Any
    }
}

impl ToBytes for BondingCurve {
    fn to_bytes(&self) -> core::result::Result<Vec<u8>, bytesrepr::Error> {
        let mut buffer = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        self.address.serialized_length()
            + self.token.serialized_length()
            + self.creator.serialized_length()
            + self.main_owner.serialized_length()
            + self.decimals.serialized_length()
            + self.total_supply.serialized_length()
            + self.curve.virtual_eth_reserve().serialized_length()
            + self.state.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> core::result::Result<(), bytesrepr::Error> {
        self.address.write_bytes(writer)?;
        self.token.write_bytes(writer)?;
        self.creator.write_bytes(writer)?;
        self.main_owner.write_bytes(writer)?;
        self.decimals.write_bytes(writer)?;
        self.total_supply.write_bytes(writer)?;
        self.curve.virtual_eth_reserve().write_bytes(writer)?;
        self.state.write_bytes(writer)
    }
}

impl FromBytes for BondingCurve {
    fn from_bytes(bytes: &[u8]) -> core::result::Result<(Self, &[u8]), bytesrepr::Error> {
        let (address, rem) = Key::from_bytes(bytes)?;
        let (token, rem) = Key::from_bytes(rem)?;
        let (creator, rem) = Key::from_bytes(rem)?;
        let (main_owner, rem) = Key::from_bytes(rem)?;
        let (decimals, rem) = u8::from_bytes(rem)?;
        let (total_supply, rem) = U256::from_bytes(rem)?;
        let (virtual_eth_reserve, rem) = U512::from_bytes(rem)?;
        let (state, rem) = CurveState::from_bytes(rem)?;
        Ok((
            BondingCurve {
                address,
                token,
                creator,
                main_owner,
                decimals,
                total_supply,
                curve: ConstantProductCurve::new(virtual_eth_reserve),
                state,
            },
            rem,
        ))
    }
}

impl CLTyped for BondingCurve {
    fn cl_type() -> CLType {
        CLType::Any
    }
}
