use casper_types::{account::AccountHash, bytesrepr::ToBytes, Key, U256, U512};
use launchpad_core::{
    CallContext, FixedRateOracle, LaunchpadConfig, LaunchpadError, LaunchpadEvent, TokenFactory,
    USD_DECIMALS,
};

const ETH: u128 = 1_000_000_000_000_000_000;
const NOW: u64 = 1_717_000_000;

struct Harness {
    factory: TokenFactory,
    owner: Key,
    user1: Key,
    user2: Key,
}

impl Harness {
    fn deploy() -> Self {
        let owner = Key::Account(AccountHash::new([1u8; 32]));
        let factory = TokenFactory::new(
            Key::Hash([0x7f; 32]),
            owner,
            LaunchpadConfig::default(),
        )
        .unwrap();
        Self {
            factory,
            owner,
            user1: Key::Account(AccountHash::new([2u8; 32])),
            user2: Key::Account(AccountHash::new([3u8; 32])),
        }
    }

    fn call(&self, caller: Key) -> CallContext {
        CallContext::new(caller, NOW)
    }

    fn pay(&self, caller: Key, wei: U512) -> CallContext {
        self.call(caller).with_value(wei)
    }

    /// "Test Token"/"TEST" created by user1, as every trading scenario starts.
    fn with_test_token() -> (Self, Key, Key) {
        let mut h = Self::deploy();
        let fee = h.factory.creation_fee();
        h.factory
            .create_token(&h.pay(h.user1, fee), "Test Token", "TEST")
            .unwrap();
        let token = h
            .factory
            .predict_token_address("Test Token", "TEST", &h.user1);
        let curve = h.factory.get_token_info(&token).unwrap().curve;
        h.factory.take_events();
        (h, token, curve)
    }
}

#[test]
fn creates_token_and_curve() {
    let mut h = Harness::deploy();
    let fee = h.factory.creation_fee();
    assert_eq!(fee, U512::from(ETH / 50));

    h.factory
        .create_token(&h.pay(h.user1, fee), "New Token", "NEW")
        .unwrap();

    let token = h.factory.predict_token_address("New Token", "NEW", &h.user1);
    let info = h.factory.get_token_info(&token).unwrap().clone();
    assert_eq!(info.name, "New Token");
    assert_eq!(info.symbol, "NEW");
    assert_eq!(info.creator, h.user1);

    let events = h.factory.take_events();
    assert!(matches!(
        &events[..],
        [LaunchpadEvent::TokenCreated { name, symbol, creator, .. }]
            if name == "New Token" && symbol == "NEW" && *creator == h.user1
    ));

    let ledger = h.factory.token(&token).unwrap();
    assert_eq!(ledger.name(), "New Token");
    assert_eq!(ledger.symbol(), "NEW");

    let curve = h.factory.curve_by_address(&info.curve).unwrap();
    assert_eq!(curve.main_owner(), h.factory.identity());
    assert_eq!(curve.creator(), h.user1);

    assert_eq!(
        h.factory.balance_of(&token, &info.curve).unwrap(),
        U256::from(1_000_000_000u128 * ETH)
    );
}

#[test]
fn rejects_duplicate_symbol() {
    let mut h = Harness::deploy();
    let fee = h.factory.creation_fee();
    h.factory
        .create_token(&h.pay(h.user1, fee), "New Token", "NEW")
        .unwrap();

    let err = h
        .factory
        .create_token(&h.pay(h.user1, fee), "Another Token", "NEW")
        .unwrap_err();
    assert_eq!(err, LaunchpadError::SaltAlreadyUsed);
    assert_eq!(err.to_string(), "salt already used");
}

#[test]
fn rejects_insufficient_creation_fee() {
    let mut h = Harness::deploy();
    let short = h.factory.creation_fee() - U512::from(ETH / 1_000);
    let err = h
        .factory
        .create_token(&h.pay(h.user1, short), "New Token", "NEW")
        .unwrap_err();
    assert_eq!(err, LaunchpadError::InsufficientCreationFee);
    assert_eq!(err.to_string(), "insufficient creation fee");
    assert_eq!(h.factory.token_count(), 0);
}

#[test]
fn buys_through_factory() {
    let (mut h, token, _curve) = Harness::with_test_token();
    let buy_amount = U512::from(ETH);

    let receipt = h
        .factory
        .buy_token(&h.pay(h.user2, buy_amount), &token, U256::zero())
        .unwrap();

    assert_eq!(
        h.factory.take_events(),
        vec![LaunchpadEvent::Buy {
            buyer: h.user2,
            token,
            token_amount: receipt.tokens_out,
            eth_amount: buy_amount,
            fee: receipt.fee,
        }]
    );
    assert!(h.factory.balance_of(&token, &h.user2).unwrap() > U256::zero());
    assert!(h.factory.curve(&token).unwrap().state().eth_reserve() > U512::zero());
}

#[test]
fn sells_through_factory_after_approval() {
    let (mut h, token, curve) = Harness::with_test_token();
    h.factory
        .buy_token(&h.pay(h.user2, U512::from(ETH)), &token, U256::zero())
        .unwrap();
    let balance = h.factory.balance_of(&token, &h.user2).unwrap();

    let unapproved = h
        .factory
        .sell_token(&h.call(h.user2), &token, balance, U512::zero());
    assert_eq!(unapproved, Err(LaunchpadError::TransferNotApproved));

    h.factory
        .approve(&h.call(h.user2), &token, &curve, balance)
        .unwrap();
    assert_eq!(
        h.factory.allowance(&token, &h.user2, &curve).unwrap(),
        balance
    );
    h.factory.take_events();

    let receipt = h
        .factory
        .sell_token(&h.call(h.user2), &token, balance, U512::zero())
        .unwrap();
    assert_eq!(
        h.factory.take_events(),
        vec![LaunchpadEvent::Sell {
            seller: h.user2,
            token,
            token_amount: balance,
            eth_amount: receipt.eth_out,
            fee: receipt.fee,
        }]
    );
    assert!(h.factory.balance_of(&token, &h.user2).unwrap().is_zero());
}

#[test]
fn rejects_zero_trades() {
    let (mut h, token, _curve) = Harness::with_test_token();
    assert_eq!(
        h.factory
            .buy_token(&h.pay(h.user2, U512::zero()), &token, U256::zero()),
        Err(LaunchpadError::ZeroAmount)
    );
    assert_eq!(
        h.factory
            .sell_token(&h.call(h.user2), &token, U256::zero(), U512::zero()),
        Err(LaunchpadError::ZeroAmount)
    );
    assert!(h.factory.events().is_empty());
}

#[test]
fn big_buy_migrates_and_reports_market_cap() {
    let (mut h, token, curve) = Harness::with_test_token();
    let oracle = FixedRateOracle::new(U512::from(3_000u64 * 100_000_000), 8);
    let opening_cap = h.factory.market_cap_in_usd(&token, &oracle).unwrap();
    assert_eq!(opening_cap, U512::from(3_000u64) * U512::exp10(USD_DECIMALS as usize));

    let receipt = h
        .factory
        .buy_token(&h.pay(h.user2, U512::from(20 * ETH)), &token, U256::zero())
        .unwrap();
    assert!(receipt.migrated);
    assert_eq!(h.factory.curve_progress(&token).unwrap(), 10_000);

    let events = h.factory.take_events();
    assert!(matches!(
        events.last(),
        Some(LaunchpadEvent::Migrated { curve: migrated, .. }) if *migrated == curve
    ));

    let cap = h.factory.market_cap_in_usd(&token, &oracle).unwrap();
    assert!(cap > opening_cap);
    assert_eq!(
        h.factory
            .market_cap_in_usd(&token, &FixedRateOracle::unavailable()),
        Err(LaunchpadError::OracleUnavailable)
    );

    assert_eq!(
        h.factory
            .buy_token(&h.pay(h.user2, U512::from(ETH)), &token, U256::zero()),
        Err(LaunchpadError::CurveMigrated)
    );
}

#[test]
fn previews_and_prices() {
    let (h, token, _curve) = Harness::with_test_token();
    let oracle = FixedRateOracle::new(U512::from(3_000u64 * 100_000_000), 8);

    assert!(h
        .factory
        .calculate_buy_amount(&token, U512::from(ETH))
        .unwrap()
        > U256::zero());
    assert_eq!(
        h.factory
            .calculate_sell_amount(&token, U256::from(1_000u128 * ETH)),
        Err(LaunchpadError::InsufficientReserve)
    );
    assert!(h.factory.current_price_in_eth(&token).unwrap() > U512::zero());
    assert!(h.factory.current_price_in_usd(&token, &oracle).unwrap() > U512::zero());
}

#[test]
fn owner_collects_fees_and_tunes_curves() {
    let (mut h, token, curve) = Harness::with_test_token();
    h.factory
        .buy_token(&h.pay(h.user2, U512::from(ETH)), &token, U256::zero())
        .unwrap();

    assert_eq!(
        h.factory.withdraw_fees(&h.call(h.user1)),
        Err(LaunchpadError::Unauthorized)
    );
    let pending = h.factory.pending_fees().unwrap();
    assert_eq!(h.factory.withdraw_fees(&h.call(h.owner)).unwrap(), pending);
    assert!(matches!(
        h.factory.events().last(),
        Some(LaunchpadEvent::FeeCollected { amount, to }) if *amount == pending && *to == h.owner
    ));

    let initial = h.factory.curve(&token).unwrap().trading_fee_bps();
    h.factory
        .config_bonding_curve(&h.call(h.owner), &curve, 200)
        .unwrap();
    let current = h.factory.curve(&token).unwrap().trading_fee_bps();
    assert_eq!(current, 200);
    assert_ne!(current, initial);
}

#[test]
fn trading_one_token_leaves_the_other_curve_alone() {
    let (mut h, token, curve) = Harness::with_test_token();
    let fee = h.factory.creation_fee();
    let other = h
        .factory
        .create_token(&h.pay(h.user2, fee), "Other Token", "OTHER")
        .unwrap();
    let other_curve = h.factory.curve(&other).unwrap().clone();
    let other_bytes = other_curve.to_bytes().unwrap();
    let other_reserve = h.factory.balance_of(&other, &other_curve.address()).unwrap();

    let bought = h
        .factory
        .buy_token(&h.pay(h.user2, U512::from(2 * ETH)), &token, U256::zero())
        .unwrap();
    h.factory
        .approve(&h.call(h.user2), &token, &curve, bought.tokens_out)
        .unwrap();
    h.factory
        .sell_token(&h.call(h.user2), &token, bought.tokens_out / 2, U512::zero())
        .unwrap();
    h.factory
        .config_bonding_curve(&h.call(h.owner), &curve, 250)
        .unwrap();

    let after = h.factory.curve(&other).unwrap();
    assert_eq!(*after, other_curve);
    assert_eq!(after.to_bytes().unwrap(), other_bytes);
    assert_eq!(
        h.factory.balance_of(&other, &other_curve.address()).unwrap(),
        other_reserve
    );
    assert!(h.factory.balance_of(&other, &h.user2).unwrap().is_zero());
    assert_ne!(h.factory.curve(&token).unwrap().state(), other_curve.state());
}

#[test]
fn oversized_decimals_are_errors_not_panics() {
    let (h, token, _curve) = Harness::with_test_token();
    let broken_feed = FixedRateOracle::new(U512::one(), 200);
    assert_eq!(
        h.factory.market_cap_in_usd(&token, &broken_feed),
        Err(LaunchpadError::OracleUnavailable)
    );
    assert_eq!(
        h.factory.current_price_in_usd(&token, &broken_feed),
        Err(LaunchpadError::OracleUnavailable)
    );

    let config = LaunchpadConfig {
        token_decimals: 200,
        ..LaunchpadConfig::default()
    };
    assert_eq!(config.validate(), Err(LaunchpadError::InvalidConfig));
    assert_eq!(
        TokenFactory::new(Key::Hash([0x7f; 32]), h.owner, config).err(),
        Some(LaunchpadError::InvalidConfig)
    );
}
