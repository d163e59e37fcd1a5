//! Token factory: issues (token, curve) pairs and routes trades to them.
//!
//! The factory owns every registry the launchpad has. Each operation checks
//! everything first and only then writes, so a failed call leaves the salt
//! registry, the records, the ledgers and the curves as they were.
//!
//! The creation checks live on [`Launch`] behind [`LaunchRegistry`], so any
//! store of launches (this in-memory factory or contract storage) admits a
//! new token by exactly the same rules.

use alloc::{
    collections::{BTreeMap, BTreeSet},
    string::{String, ToString},
    vec::Vec,
};

use casper_types::{
    bytesrepr::{self, FromBytes, ToBytes},
    CLType, CLTyped, Key, U256, U512,
};
use tracing::{info, warn};

use crate::address::{curve_address, symbol_salt, token_address, Salt};
use crate::config::{validate_name, validate_symbol, LaunchpadConfig};
use crate::context::CallContext;
use crate::engine::{BondingCurve, BuyReceipt, SellReceipt};
use crate::error::{LaunchpadError, Result};
use crate::events::{EventSink, LaunchpadEvent};
use crate::fees::FeeLedger;
use crate::oracle::PriceOracle;
use crate::token::{FungibleToken, TokenLedger};
use crate::treasury::Treasury;

/// Immutable description of an issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub name: String,
    pub symbol: String,
    pub creator: Key,
    pub token: Key,
    pub curve: Key,
    pub created_at: u64,
}

/// What the creation checks need to know about launches already made.
pub trait LaunchRegistry {
    fn salt_used(&self, salt: &Salt) -> bool;
    fn token_exists(&self, token: &Key) -> bool;
    fn curve_exists(&self, curve: &Key) -> bool;
}

/// Addresses a launch would occupy, derived before anything is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Launch {
    pub salt: Salt,
    pub token: Key,
    pub curve: Key,
}

impl Launch {
    /// Validates the name and symbol and derives the launch addresses.
    pub fn plan(factory: &Key, name: &str, symbol: &str, creator: &Key) -> Result<Self> {
        validate_name(name)?;
        validate_symbol(symbol)?;
        let token = token_address(factory, name, symbol, creator);
        Ok(Self {
            salt: symbol_salt(symbol),
            token,
            curve: curve_address(factory, symbol, &token),
        })
    }

    /// Runs every check `create_token` makes before it writes: name and
    /// symbol, the creation fee paid in `ctx.value`, the salt, and both
    /// derived addresses.
    pub fn admit<R: LaunchRegistry>(
        registry: &R,
        factory: &Key,
        config: &LaunchpadConfig,
        ctx: &CallContext,
        name: &str,
        symbol: &str,
    ) -> Result<Self> {
        let launch = Self::plan(factory, name, symbol, &ctx.caller)?;
        if ctx.value < config.creation_fee() {
            warn!(creator = %ctx.caller, paid = %ctx.value, "creation fee too low");
            return Err(LaunchpadError::InsufficientCreationFee);
        }
        if registry.salt_used(&launch.salt)
            || registry.token_exists(&launch.token)
            || registry.curve_exists(&launch.curve)
        {
            return Err(LaunchpadError::SaltAlreadyUsed);
        }
        Ok(launch)
    }

    /// Mints the initial supply to the curve address and builds the curve
    /// and record. `factory` is the token admin and the curve's main owner.
    pub fn issue<T: FungibleToken>(
        &self,
        factory: &Key,
        config: &LaunchpadConfig,
        ctx: &CallContext,
        name: &str,
        symbol: &str,
        ledger: &mut T,
    ) -> Result<(BondingCurve, TokenRecord)> {
        ledger.mint(factory, &self.curve, config.initial_supply())?;
        let curve = BondingCurve::new(self.curve, self.token, ctx.caller, *factory, config);
        Ok((curve, self.record(name, symbol, ctx.caller, ctx.block_time)))
    }

    pub fn record(&self, name: &str, symbol: &str, creator: Key, created_at: u64) -> TokenRecord {
        TokenRecord {
            name: name.to_string(),
            symbol: symbol.to_string(),
            creator,
            token: self.token,
            curve: self.curve,
            created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenFactory {
    identity: Key,
    owner: Key,
    config: LaunchpadConfig,
    salts: BTreeSet<Salt>,
    records: BTreeMap<Key, TokenRecord>,
    launch_order: Vec<Key>,
    curves: BTreeMap<Key, BondingCurve>,
    tokens: BTreeMap<Key, TokenLedger>,
    curve_index: BTreeMap<Key, Key>,
    treasury: Treasury,
    events: Vec<LaunchpadEvent>,
}

impl LaunchRegistry for TokenFactory {
    fn salt_used(&self, salt: &Salt) -> bool {
        self.salts.contains(salt)
    }

    fn token_exists(&self, token: &Key) -> bool {
        self.records.contains_key(token)
    }

    fn curve_exists(&self, curve: &Key) -> bool {
        self.curve_index.contains_key(curve)
    }
}

impl TokenFactory {
    /// `identity` is the factory's own address; `owner` the principal allowed
    /// to withdraw fees and reconfigure curves.
    pub fn new(identity: Key, owner: Key, config: LaunchpadConfig) -> Result<Self> {
        config.validate()?;
        info!(factory = %identity, owner = %owner, "factory initialized");
        Ok(Self {
            identity,
            owner,
            config,
            salts: BTreeSet::new(),
            records: BTreeMap::new(),
            launch_order: Vec::new(),
            curves: BTreeMap::new(),
            tokens: BTreeMap::new(),
            curve_index: BTreeMap::new(),
            treasury: Treasury::new(owner),
            events: Vec::new(),
        })
    }

    pub fn identity(&self) -> Key {
        self.identity
    }

    pub fn owner(&self) -> Key {
        self.owner
    }

    pub fn config(&self) -> &LaunchpadConfig {
        &self.config
    }

    pub fn creation_fee(&self) -> U512 {
        self.config.creation_fee()
    }

    pub fn creation_fees(&self) -> &FeeLedger {
        self.treasury.creation_fees()
    }

    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    /// Address `create_token(name, symbol)` would return for `creator`.
    pub fn predict_token_address(&self, name: &str, symbol: &str, creator: &Key) -> Key {
        token_address(&self.identity, name, symbol, creator)
    }

    pub fn is_symbol_taken(&self, symbol: &str) -> bool {
        self.salts.contains(&symbol_salt(symbol))
    }

    /// Issues a token and its curve. `ctx.value` is the creation fee paid;
    /// the whole amount is kept.
    pub fn create_token(&mut self, ctx: &CallContext, name: &str, symbol: &str) -> Result<Key> {
        let launch = Launch::admit(&*self, &self.identity, &self.config, ctx, name, symbol)?;

        let mut treasury = self.treasury.clone();
        treasury.collect_creation_fee(ctx.value)?;

        let mut ledger = TokenLedger::new(
            name.to_string(),
            symbol.to_string(),
            self.config.token_decimals,
            self.identity,
        );
        let (curve, record) =
            launch.issue(&self.identity, &self.config, ctx, name, symbol, &mut ledger)?;

        self.treasury = treasury;
        self.salts.insert(launch.salt);
        self.records.insert(launch.token, record);
        self.launch_order.push(launch.token);
        self.tokens.insert(launch.token, ledger);
        self.curves.insert(launch.token, curve);
        self.curve_index.insert(launch.curve, launch.token);

        info!(
            token = %launch.token,
            curve = %launch.curve,
            symbol = symbol,
            creator = %ctx.caller,
            "token created"
        );
        self.events.emit(LaunchpadEvent::TokenCreated {
            token: launch.token,
            curve: launch.curve,
            name: name.to_string(),
            symbol: symbol.to_string(),
            creator: ctx.caller,
        });
        Ok(launch.token)
    }

    /// Buys with the ETH attached to `ctx`. The trading fee lands in the
    /// treasury.
    pub fn buy_token(
        &mut self,
        ctx: &CallContext,
        token: &Key,
        min_tokens_out: U256,
    ) -> Result<BuyReceipt> {
        let curve = self
            .curves
            .get_mut(token)
            .ok_or(LaunchpadError::UnknownToken)?;
        let ledger = self
            .tokens
            .get_mut(token)
            .ok_or(LaunchpadError::UnknownToken)?;
        let receipt =
            curve.buy(&ctx.caller, ctx.value, min_tokens_out, ledger, &mut self.events)?;
        self.treasury.sweep(curve, &self.identity)?;
        Ok(receipt)
    }

    pub fn sell_token(
        &mut self,
        ctx: &CallContext,
        token: &Key,
        token_amount: U256,
        min_eth_out: U512,
    ) -> Result<SellReceipt> {
        let curve = self
            .curves
            .get_mut(token)
            .ok_or(LaunchpadError::UnknownToken)?;
        let ledger = self
            .tokens
            .get_mut(token)
            .ok_or(LaunchpadError::UnknownToken)?;
        let receipt = curve.sell(
            &ctx.caller,
            token_amount,
            min_eth_out,
            ledger,
            &mut self.events,
        )?;
        self.treasury.sweep(curve, &self.identity)?;
        Ok(receipt)
    }

    pub fn get_token_info(&self, token: &Key) -> Result<&TokenRecord> {
        self.records.get(token).ok_or(LaunchpadError::UnknownToken)
    }

    pub fn token(&self, token: &Key) -> Result<&TokenLedger> {
        self.tokens.get(token).ok_or(LaunchpadError::UnknownToken)
    }

    pub fn curve(&self, token: &Key) -> Result<&BondingCurve> {
        self.curves.get(token).ok_or(LaunchpadError::UnknownToken)
    }

    pub fn curve_by_address(&self, curve: &Key) -> Result<&BondingCurve> {
        let token = self
            .curve_index
            .get(curve)
            .ok_or(LaunchpadError::UnknownToken)?;
        self.curve(token)
    }

    pub fn token_count(&self) -> usize {
        self.launch_order.len()
    }

    /// Records in creation order, `limit` at most starting at `offset`.
    pub fn list_tokens(&self, offset: usize, limit: usize) -> Vec<&TokenRecord> {
        self.launch_order
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|token| self.records.get(token))
            .collect()
    }

    /// Token-contract `approve` on behalf of `ctx.caller`.
    pub fn approve(
        &mut self,
        ctx: &CallContext,
        token: &Key,
        spender: &Key,
        amount: U256,
    ) -> Result<()> {
        let ledger = self
            .tokens
            .get_mut(token)
            .ok_or(LaunchpadError::UnknownToken)?;
        ledger.approve(&ctx.caller, spender, amount);
        Ok(())
    }

    pub fn balance_of(&self, token: &Key, owner: &Key) -> Result<U256> {
        Ok(self.token(token)?.balance_of(owner))
    }

    pub fn allowance(&self, token: &Key, owner: &Key, spender: &Key) -> Result<U256> {
        Ok(self.token(token)?.allowance(owner, spender))
    }

    pub fn calculate_buy_amount(&self, token: &Key, eth_in: U512) -> Result<U256> {
        self.curve(token)?.calculate_buy_amount(eth_in)
    }

    pub fn calculate_sell_amount(&self, token: &Key, token_amount: U256) -> Result<U512> {
        self.curve(token)?.calculate_sell_amount(token_amount)
    }

    /// Basis points, 10000 once migrated.
    pub fn curve_progress(&self, token: &Key) -> Result<u64> {
        Ok(self.curve(token)?.curve_progress())
    }

    pub fn current_price_in_eth(&self, token: &Key) -> Result<U512> {
        self.curve(token)?.current_price_in_eth()
    }

    pub fn current_price_in_usd<O: PriceOracle>(&self, token: &Key, oracle: &O) -> Result<U512> {
        self.curve(token)?.current_price_in_usd(oracle)
    }

    pub fn market_cap_in_usd<O: PriceOracle>(&self, token: &Key, oracle: &O) -> Result<U512> {
        self.curve(token)?.current_market_cap_in_usd(oracle)
    }

    /// Fees not yet withdrawn: creation fees plus swept trading fees.
    pub fn pending_fees(&self) -> Result<U512> {
        self.treasury.pending()
    }

    /// Drains the treasury to the owner and returns the amount moved.
    pub fn withdraw_fees(&mut self, ctx: &CallContext) -> Result<U512> {
        if ctx.caller != self.owner {
            warn!(caller = %ctx.caller, "fee withdrawal by non-owner rejected");
            return Err(LaunchpadError::Unauthorized);
        }
        let total = self.treasury.withdraw(&ctx.caller)?;
        if total.is_zero() {
            return Ok(total);
        }

        info!(amount = %total, to = %self.owner, "fees withdrawn");
        self.events.emit(LaunchpadEvent::FeeCollected {
            amount: total,
            to: self.owner,
        });
        Ok(total)
    }

    /// Updates the trading-fee rate of the curve at `curve`.
    pub fn config_bonding_curve(
        &mut self,
        ctx: &CallContext,
        curve: &Key,
        new_fee_bps: u16,
    ) -> Result<()> {
        if ctx.caller != self.owner {
            warn!(
                caller = %ctx.caller,
                curve = %curve,
                "curve reconfiguration by non-owner rejected"
            );
            return Err(LaunchpadError::Unauthorized);
        }
        let token = self
            .curve_index
            .get(curve)
            .ok_or(LaunchpadError::UnknownToken)?;
        let bonding_curve = self
            .curves
            .get_mut(token)
            .ok_or(LaunchpadError::UnknownToken)?;
        let old_bps = bonding_curve.set_trading_fee(&self.identity, new_fee_bps)?;

        info!(curve = %curve, old_bps, new_bps = new_fee_bps, "trading fee updated");
        self.events.emit(LaunchpadEvent::TradingFeeUpdated {
            curve: *curve,
            old_bps,
            new_bps: new_fee_bps,
        });
        Ok(())
    }

    pub fn events(&self) -> &[LaunchpadEvent] {
        &self.events
    }

    /// Returns and clears the events emitted so far.
    pub fn take_events(&mut self) -> Vec<LaunchpadEvent> {
        core::mem::take(&mut self.events)
    }
}

impl ToBytes for TokenRecord {
    fn to_bytes(&self) -> core::result::Result<Vec<u8>, bytesrepr::Error> {
        let mut buffer = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        self.name.serialized_length()
            + self.symbol.serialized_length()
            + self.creator.serialized_length()
            + self.token.serialized_length()
            + self.curve.serialized_length()
            + self.created_at.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> core::result::Result<(), bytesrepr::Error> {
        self.name.write_bytes(writer)?;
        self.symbol.write_bytes(writer)?;
        self.creator.write_bytes(writer)?;
        self.token.write_bytes(writer)?;
        self.curve.write_bytes(writer)?;
        self.created_at.write_bytes(writer)
    }
}

impl FromBytes for TokenRecord {
    fn from_bytes(bytes: &[u8]) -> core::result::Result<(Self, &[u8]), bytesrepr::Error> {
        let (name, rem) = String::from_bytes(bytes)?;
        let (symbol, rem) = String::from_bytes(rem)?;
        let (creator, rem) = Key::from_bytes(rem)?;
        let (token, rem) = Key::from_bytes(rem)?;
        let (curve, rem) = Key::from_bytes(rem)?;
        let (created_at, rem) = u64::from_bytes(rem)?;
        Ok((
            TokenRecord {
                name,
                symbol,
                creator,
                token,
                curve,
                created_at,
            },
            rem,
        ))
    }
}

impl CLTyped for TokenRecord {
    fn cl_type() -> CLType {
        CLType::Any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casper_types::account::AccountHash;

    const ETH: u128 = 1_000_000_000_000_000_000;

    fn account(id: u8) -> Key {
        Key::Account(AccountHash::new([id; 32]))
    }

    fn deployer() -> Key {
        account(0xde)
    }

    fn factory() -> TokenFactory {
        TokenFactory::new(Key::Hash([0xfa; 32]), deployer(), LaunchpadConfig::default()).unwrap()
    }

    fn paid(caller: Key, wei: u128) -> CallContext {
        CallContext::new(caller, 1_700_000_000).with_value(U512::from(wei))
    }

    fn creation_fee() -> u128 {
        ETH / 50
    }

    #[test]
    fn creation_funds_the_curve() {
        let mut f = factory();
        let token = f
            .create_token(&paid(account(1), creation_fee()), "New Token", "NEW")
            .unwrap();
        let record = f.get_token_info(&token).unwrap().clone();

        assert_eq!(record.name, "New Token");
        assert_eq!(record.creator, account(1));
        assert_eq!(record.created_at, 1_700_000_000);
        assert_eq!(
            f.balance_of(&token, &record.curve).unwrap(),
            U256::from(1_000_000_000u128 * ETH)
        );
        assert_eq!(f.curve(&token).unwrap().main_owner(), f.identity());
        assert_eq!(f.curve(&token).unwrap().creator(), account(1));
        assert_eq!(f.creation_fees().collected(), U512::from(creation_fee()));
        assert_eq!(f.token_count(), 1);
        assert_eq!(
            f.take_events(),
            vec![LaunchpadEvent::TokenCreated {
                token,
                curve: record.curve,
                name: "New Token".into(),
                symbol: "NEW".into(),
                creator: account(1),
            }]
        );
        assert!(f.events().is_empty());
    }

    #[test]
    fn underpaid_creation_is_rejected() {
        let mut f = factory();
        let result = f.create_token(&paid(account(1), creation_fee() - 1), "New Token", "NEW");
        assert_eq!(result, Err(LaunchpadError::InsufficientCreationFee));
        assert_eq!(f.token_count(), 0);
        assert!(!f.is_symbol_taken("NEW"));
        assert!(f.creation_fees().collected().is_zero());
    }

    #[test]
    fn symbol_can_only_be_used_once() {
        let mut f = factory();
        f.create_token(&paid(account(1), creation_fee()), "New Token", "NEW")
            .unwrap();
        assert_eq!(
            f.create_token(&paid(account(2), creation_fee()), "Another Token", "NEW"),
            Err(LaunchpadError::SaltAlreadyUsed)
        );
        assert_eq!(f.token_count(), 1);
        assert_eq!(f.creation_fees().collected(), U512::from(creation_fee()));
    }

    #[test]
    fn names_and_symbols_are_validated() {
        let mut f = factory();
        let ctx = paid(account(1), creation_fee());
        assert_eq!(f.create_token(&ctx, "", "NEW"), Err(LaunchpadError::InvalidName));
        assert_eq!(
            f.create_token(&ctx, "New Token", "WAYTOOLONGSYMBOL"),
            Err(LaunchpadError::InvalidSymbol)
        );
    }

    #[test]
    fn prediction_matches_creation() {
        let mut f = factory();
        let predicted = f.predict_token_address("New Token", "NEW", &account(1));
        let created = f
            .create_token(&paid(account(1), creation_fee()), "New Token", "NEW")
            .unwrap();
        assert_eq!(predicted, created);
        assert_ne!(
            predicted,
            f.predict_token_address("New Token", "NEW", &account(2))
        );
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        let mut f = factory();
        let stranger = Key::Hash([0x55; 32]);
        let ctx = paid(account(1), ETH);
        assert_eq!(
            f.buy_token(&ctx, &stranger, U256::zero()),
            Err(LaunchpadError::UnknownToken)
        );
        assert_eq!(
            f.sell_token(&ctx, &stranger, U256::one(), U512::zero()),
            Err(LaunchpadError::UnknownToken)
        );
        assert_eq!(
            f.get_token_info(&stranger),
            Err(LaunchpadError::UnknownToken)
        );
        assert_eq!(
            f.curve_progress(&stranger),
            Err(LaunchpadError::UnknownToken)
        );
    }

    #[test]
    fn trades_route_to_the_token_curve() {
        let mut f = factory();
        let token = f
            .create_token(&paid(account(1), creation_fee()), "New Token", "NEW")
            .unwrap();
        let curve = f.get_token_info(&token).unwrap().curve;

        let bought = f.buy_token(&paid(account(2), ETH), &token, U256::zero()).unwrap();
        assert_eq!(f.balance_of(&token, &account(2)).unwrap(), bought.tokens_out);

        let seller = CallContext::new(account(2), 1_700_000_100);
        f.approve(&seller, &token, &curve, bought.tokens_out).unwrap();
        assert_eq!(
            f.allowance(&token, &account(2), &curve).unwrap(),
            bought.tokens_out
        );
        let sold = f
            .sell_token(&seller, &token, bought.tokens_out, U512::zero())
            .unwrap();
        assert!(sold.eth_out < U512::from(ETH));
        assert!(f.balance_of(&token, &account(2)).unwrap().is_zero());
        assert!(f.allowance(&token, &account(2), &curve).unwrap().is_zero());
    }

    #[test]
    fn only_owner_withdraws_fees() {
        let mut f = factory();
        let token = f
            .create_token(&paid(account(1), creation_fee()), "New Token", "NEW")
            .unwrap();
        let fee = f
            .buy_token(&paid(account(2), ETH), &token, U256::zero())
            .unwrap()
            .fee;
        f.take_events();

        assert_eq!(
            f.withdraw_fees(&CallContext::new(account(1), 0)),
            Err(LaunchpadError::Unauthorized)
        );
        let expected = U512::from(creation_fee()) + fee;
        assert_eq!(f.pending_fees().unwrap(), expected);
        assert_eq!(
            f.withdraw_fees(&CallContext::new(deployer(), 0)).unwrap(),
            expected
        );
        assert_eq!(
            f.take_events(),
            vec![LaunchpadEvent::FeeCollected {
                amount: expected,
                to: deployer(),
            }]
        );

        assert!(f.pending_fees().unwrap().is_zero());
        assert!(f
            .withdraw_fees(&CallContext::new(deployer(), 0))
            .unwrap()
            .is_zero());
        assert!(f.events().is_empty());
    }

    #[test]
    fn owner_reconfigures_curve_fee() {
        let mut f = factory();
        let token = f
            .create_token(&paid(account(1), creation_fee()), "New Token", "NEW")
            .unwrap();
        let curve = f.get_token_info(&token).unwrap().curve;
        let owner = CallContext::new(deployer(), 0);

        assert_eq!(
            f.config_bonding_curve(&CallContext::new(account(1), 0), &curve, 50),
            Err(LaunchpadError::Unauthorized)
        );
        assert_eq!(
            f.config_bonding_curve(&owner, &curve, 10_000),
            Err(LaunchpadError::InvalidFeeRate)
        );
        assert_eq!(
            f.config_bonding_curve(&owner, &token, 50),
            Err(LaunchpadError::UnknownToken)
        );

        f.config_bonding_curve(&owner, &curve, 50).unwrap();
        assert_eq!(f.curve_by_address(&curve).unwrap().trading_fee_bps(), 50);
        assert_eq!(
            f.events().last(),
            Some(&LaunchpadEvent::TradingFeeUpdated {
                curve,
                old_bps: 100,
                new_bps: 50,
            })
        );
    }

    #[derive(Default)]
    struct Taken {
        salts: Vec<Salt>,
        tokens: Vec<Key>,
        curves: Vec<Key>,
    }

    impl LaunchRegistry for Taken {
        fn salt_used(&self, salt: &Salt) -> bool {
            self.salts.contains(salt)
        }

        fn token_exists(&self, token: &Key) -> bool {
            self.tokens.contains(token)
        }

        fn curve_exists(&self, curve: &Key) -> bool {
            self.curves.contains(curve)
        }
    }

    #[test]
    fn admission_rejects_any_occupied_address() {
        let identity = Key::Hash([0xfa; 32]);
        let config = LaunchpadConfig::default();
        let ctx = paid(account(1), creation_fee());
        let admit = |registry: &Taken| {
            Launch::admit(registry, &identity, &config, &ctx, "New Token", "NEW")
        };

        let launch = admit(&Taken::default()).unwrap();
        assert_eq!(
            launch,
            Launch::plan(&identity, "New Token", "NEW", &account(1)).unwrap()
        );

        let curve_only = Taken {
            curves: vec![launch.curve],
            ..Taken::default()
        };
        assert_eq!(admit(&curve_only), Err(LaunchpadError::SaltAlreadyUsed));
        let token_only = Taken {
            tokens: vec![launch.token],
            ..Taken::default()
        };
        assert_eq!(admit(&token_only), Err(LaunchpadError::SaltAlreadyUsed));
        let salt_only = Taken {
            salts: vec![launch.salt],
            ..Taken::default()
        };
        assert_eq!(admit(&salt_only), Err(LaunchpadError::SaltAlreadyUsed));

        let short = paid(account(1), creation_fee() - 1);
        assert_eq!(
            Launch::admit(&Taken::default(), &identity, &config, &short, "New Token", "NEW"),
            Err(LaunchpadError::InsufficientCreationFee)
        );
    }

    #[test]
    fn issue_mints_supply_to_the_curve() {
        let identity = Key::Hash([0xfa; 32]);
        let config = LaunchpadConfig::default();
        let ctx = paid(account(1), creation_fee());
        let launch = Launch::plan(&identity, "New Token", "NEW", &account(1)).unwrap();
        let mut ledger = TokenLedger::new("New Token".into(), "NEW".into(), 18, identity);

        let (curve, record) = launch
            .issue(&identity, &config, &ctx, "New Token", "NEW", &mut ledger)
            .unwrap();
        assert_eq!(ledger.balance_of(&launch.curve), config.initial_supply());
        assert_eq!(curve.address(), launch.curve);
        assert_eq!(curve.main_owner(), identity);
        assert_eq!(record.created_at, 1_700_000_000);

        let mut foreign = TokenLedger::new("New Token".into(), "NEW".into(), 18, account(7));
        assert_eq!(
            launch
                .issue(&identity, &config, &ctx, "New Token", "NEW", &mut foreign)
                .err(),
            Some(LaunchpadError::Unauthorized)
        );
    }

    #[test]
    fn trading_fees_move_into_the_treasury() {
        let mut f = factory();
        let token = f
            .create_token(&paid(account(1), creation_fee()), "New Token", "NEW")
            .unwrap();
        let bought = f.buy_token(&paid(account(2), ETH), &token, U256::zero()).unwrap();

        let curve = f.curve(&token).unwrap();
        assert!(curve.state().fees().available().is_zero());
        assert_eq!(curve.state().fees_collected(), bought.fee);
        assert_eq!(f.treasury().trading_fees().available(), bought.fee);

        let curve_address = curve.address();
        let seller = CallContext::new(account(2), 1_700_000_100);
        f.approve(&seller, &token, &curve_address, bought.tokens_out).unwrap();
        let sold = f
            .sell_token(&seller, &token, bought.tokens_out, U512::zero())
            .unwrap();
        assert_eq!(
            f.treasury().trading_fees().available(),
            bought.fee + sold.fee
        );
        assert_eq!(
            f.pending_fees().unwrap(),
            U512::from(creation_fee()) + bought.fee + sold.fee
        );
    }

    #[test]
    fn listing_is_paginated_in_creation_order() {
        let mut f = factory();
        for (index, symbol) in ["AAA", "BBB", "CCC", "DDD"].iter().enumerate() {
            let ctx = paid(account(index as u8 + 1), creation_fee());
            f.create_token(&ctx, "Token", symbol).unwrap();
        }
        let symbols: Vec<&str> = f
            .list_tokens(1, 2)
            .into_iter()
            .map(|record| record.symbol.as_str())
            .collect();
        assert_eq!(symbols, ["BBB", "CCC"]);
        assert!(f.list_tokens(10, 5).is_empty());
        assert_eq!(f.list_tokens(0, 100).len(), 4);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = LaunchpadConfig {
            trading_fee_bps: 10_000,
            ..LaunchpadConfig::default()
        };
        assert_eq!(
            TokenFactory::new(Key::Hash([0xfa; 32]), deployer(), config).err(),
            Some(LaunchpadError::InvalidConfig)
        );
    }

    #[test]
    fn record_survives_bytesrepr() {
        let launch = Launch::plan(&Key::Hash([0xfa; 32]), "New Token", "NEW", &account(1)).unwrap();
        let record = launch.record("New Token", "NEW", account(1), 42);
        let bytes = record.to_bytes().unwrap();
        assert_eq!(bytes.len(), record.serialized_length());
        assert_eq!(TokenRecord::from_bytes(&bytes).unwrap(), (record, &[][..]));
    }
}
