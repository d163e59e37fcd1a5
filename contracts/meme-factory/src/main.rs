#![no_std]
#![no_main]

//! Meme token launchpad contract.
//!
//! One installed contract plays both roles: it is the token factory and it
//! hosts every launched token's CEP-18 balances and bonding curve in its own
//! dictionaries. Motes for buys and creation fees are deposited into the
//! launchpad purse (see `deposit_purse`) in the same deploy, before the call.

extern crate alloc;

mod storage;

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use casper_contract::{
    contract_api::{runtime, storage as casper_storage, system},
    unwrap_or_revert::UnwrapOrRevert,
};
use casper_types::{
    addressable_entity::{EntityEntryPoint as EntryPoint, EntryPoints},
    contracts::NamedKeys,
    runtime_args, CLType, CLTyped, CLValue, EntryPointAccess, EntryPointPayment,
    EntryPointType, Key, Parameter, U256, U512,
};
use launchpad_core::{
    token_address, BondingCurve, CallContext, ConfigOverrides, EventSink, FungibleToken, Launch,
    LaunchpadConfig, LaunchpadError, LaunchpadEvent, TokenRecord, Treasury, MAX_FEED_DECIMALS,
};

use crate::storage::*;

fn known_token(token: &Key) -> TokenRecord {
    read_record(token).unwrap_or_revert_with(LaunchpadError::UnknownToken)
}

fn token_ledger(token: &Key) -> DictionaryToken {
    let identity: Key = read_named_key(IDENTITY);
    DictionaryToken::new(*token, identity)
}

/// Moves the curve's fresh trading fee into the treasury, so withdrawals
/// never have to visit the curves.
fn sweep_trading_fees(curve: &mut BondingCurve) {
    let identity: Key = read_named_key(IDENTITY);
    let mut treasury: Treasury = read_named_key(TREASURY);
    treasury.sweep(curve, &identity).unwrap_or_revert();
    write_named_key(TREASURY, treasury);
}

// ============ Entry Points ============

#[no_mangle]
pub extern "C" fn init() {
    let initialized: bool = read_named_key(INITIALIZED);
    if initialized {
        runtime::revert(LaunchpadError::Unauthorized);
    }

    for name in DICTIONARIES {
        casper_storage::new_dictionary(name).unwrap_or_revert();
    }
    let purse = system::create_purse();
    runtime::put_key(PURSE, purse.into());

    let identity: Key = runtime::get_named_arg("identity");
    write_named_key(IDENTITY, identity);
    write_named_key(INITIALIZED, true);
}

/// Add-only handle to the purse that receives buy payments and creation fees.
#[no_mangle]
pub extern "C" fn deposit_purse() {
    runtime::ret(CLValue::from_t(purse().into_add()).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn create_token() {
    let name: String = runtime::get_named_arg("name");
    let symbol: String = runtime::get_named_arg("symbol");

    let config = read_config();
    let identity: Key = read_named_key(IDENTITY);
    let ctx = CallContext::new(caller(), block_time()).with_value(attached_value());

    let launch = Launch::admit(&StoredLaunches, &identity, &config, &ctx, &name, &symbol)
        .unwrap_or_revert();

    let mut treasury: Treasury = read_named_key(TREASURY);
    treasury.collect_creation_fee(ctx.value).unwrap_or_revert();
    write_named_key(TREASURY, treasury);

    let mut ledger = token_ledger(&launch.token);
    let (curve, record) = launch
        .issue(&identity, &config, &ctx, &name, &symbol, &mut ledger)
        .unwrap_or_revert();

    mark_salt(&launch.salt);
    write_record(record);
    write_curve(curve);
    index_curve(&launch.curve, launch.token);
    push_launch(launch.token);
    settle_balance();

    ContractEvents.emit(LaunchpadEvent::TokenCreated {
        token: launch.token,
        curve: launch.curve,
        name,
        symbol,
        creator: ctx.caller,
    });

    runtime::ret(CLValue::from_t(launch.token).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn predict_token_address() {
    let name: String = runtime::get_named_arg("name");
    let symbol: String = runtime::get_named_arg("symbol");
    let creator: Key = runtime::get_named_arg("creator");
    let identity: Key = read_named_key(IDENTITY);
    let token = token_address(&identity, &name, &symbol, &creator);
    runtime::ret(CLValue::from_t(token).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn buy_token() {
    let token: Key = runtime::get_named_arg("token");
    let min_tokens_out: U256 = runtime::get_named_arg("min_tokens_out");
    known_token(&token);

    let mut curve = read_curve(&token);
    let mut ledger = token_ledger(&token);
    let receipt = curve
        .buy(
            &caller(),
            attached_value(),
            min_tokens_out,
            &mut ledger,
            &mut ContractEvents,
        )
        .unwrap_or_revert();
    sweep_trading_fees(&mut curve);
    write_curve(curve);
    settle_balance();

    runtime::ret(CLValue::from_t(receipt.tokens_out).unwrap_or_revert());
}

/// The seller must first `approve` the token's curve address as spender.
#[no_mangle]
pub extern "C" fn sell_token() {
    let token: Key = runtime::get_named_arg("token");
    let token_amount: U256 = runtime::get_named_arg("token_amount");
    let min_eth_out: U512 = runtime::get_named_arg("min_eth_out");
    known_token(&token);

    let seller = caller();
    let mut curve = read_curve(&token);
    let mut ledger = token_ledger(&token);
    let receipt = curve
        .sell(
            &seller,
            token_amount,
            min_eth_out,
            &mut ledger,
            &mut ContractEvents,
        )
        .unwrap_or_revert();
    sweep_trading_fees(&mut curve);
    write_curve(curve);
    pay_out(&seller, receipt.eth_out);
    settle_balance();

    runtime::ret(CLValue::from_t(receipt.eth_out).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn get_token_info() {
    let token: Key = runtime::get_named_arg("token");
    runtime::ret(CLValue::from_t(known_token(&token)).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn withdraw_fees() {
    require_owner();
    let owner: Key = read_named_key(OWNER);

    let mut treasury: Treasury = read_named_key(TREASURY);
    let total = treasury.withdraw(&owner).unwrap_or_revert();
    write_named_key(TREASURY, treasury);

    if !total.is_zero() {
        pay_out(&owner, total);
        settle_balance();
        ContractEvents.emit(LaunchpadEvent::FeeCollected {
            amount: total,
            to: owner,
        });
    }

    runtime::ret(CLValue::from_t(total).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn config_bonding_curve() {
    require_owner();
    let curve_address: Key = runtime::get_named_arg("curve");
    let fee_bps: u16 = runtime::get_named_arg("fee_bps");
    let identity: Key = read_named_key(IDENTITY);

    let token =
        token_for_curve(&curve_address).unwrap_or_revert_with(LaunchpadError::UnknownToken);
    let mut curve = read_curve(&token);
    let old_bps = curve.set_trading_fee(&identity, fee_bps).unwrap_or_revert();
    write_curve(curve);

    ContractEvents.emit(LaunchpadEvent::TradingFeeUpdated {
        curve: curve_address,
        old_bps,
        new_bps: fee_bps,
    });
}

#[no_mangle]
pub extern "C" fn approve() {
    let token: Key = runtime::get_named_arg("token");
    let spender: Key = runtime::get_named_arg("spender");
    let amount: U256 = runtime::get_named_arg("amount");
    known_token(&token);
    token_ledger(&token).approve(&caller(), &spender, amount);
}

#[no_mangle]
pub extern "C" fn balance_of() {
    let token: Key = runtime::get_named_arg("token");
    let owner: Key = runtime::get_named_arg("owner");
    known_token(&token);
    let balance = token_ledger(&token).balance_of(&owner);
    runtime::ret(CLValue::from_t(balance).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn allowance() {
    let token: Key = runtime::get_named_arg("token");
    let owner: Key = runtime::get_named_arg("owner");
    let spender: Key = runtime::get_named_arg("spender");
    known_token(&token);
    let allowance = token_ledger(&token).allowance(&owner, &spender);
    runtime::ret(CLValue::from_t(allowance).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn calculate_buy_amount() {
    let token: Key = runtime::get_named_arg("token");
    let eth_amount: U512 = runtime::get_named_arg("eth_amount");
    let tokens = read_curve(&token)
        .calculate_buy_amount(eth_amount)
        .unwrap_or_revert();
    runtime::ret(CLValue::from_t(tokens).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn calculate_sell_amount() {
    let token: Key = runtime::get_named_arg("token");
    let token_amount: U256 = runtime::get_named_arg("token_amount");
    let eth = read_curve(&token)
        .calculate_sell_amount(token_amount)
        .unwrap_or_revert();
    runtime::ret(CLValue::from_t(eth).unwrap_or_revert());
}

/// Returns progress toward migration in basis points.
#[no_mangle]
pub extern "C" fn curve_progress() {
    let token: Key = runtime::get_named_arg("token");
    let progress = read_curve(&token).curve_progress();
    runtime::ret(CLValue::from_t(progress).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn current_price_in_eth() {
    let token: Key = runtime::get_named_arg("token");
    let price = read_curve(&token)
        .current_price_in_eth()
        .unwrap_or_revert();
    runtime::ret(CLValue::from_t(price).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn current_price_in_usd() {
    let token: Key = runtime::get_named_arg("token");
    let price = read_curve(&token)
        .current_price_in_usd(&StoredRateOracle)
        .unwrap_or_revert();
    runtime::ret(CLValue::from_t(price).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn market_cap_in_usd() {
    let token: Key = runtime::get_named_arg("token");
    let market_cap = read_curve(&token)
        .current_market_cap_in_usd(&StoredRateOracle)
        .unwrap_or_revert();
    runtime::ret(CLValue::from_t(market_cap).unwrap_or_revert());
}

/// Owner pushes the ETH/USD answer; an answer of zero takes the feed offline.
#[no_mangle]
pub extern "C" fn set_eth_usd_rate() {
    require_owner();
    let answer: U512 = runtime::get_named_arg("answer");
    let decimals: u8 = runtime::get_named_arg("decimals");
    if decimals > MAX_FEED_DECIMALS {
        runtime::revert(LaunchpadError::OracleUnavailable);
    }
    write_named_key(ETH_USD_ANSWER, answer);
    write_named_key(ETH_USD_DECIMALS, decimals);
}

#[no_mangle]
pub extern "C" fn token_count() {
    let count: u64 = read_named_key(TOKEN_COUNT);
    runtime::ret(CLValue::from_t(count).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn get_tokens() {
    let offset: u64 = runtime::get_named_arg("offset");
    let limit: u64 = runtime::get_named_arg("limit");
    let count: u64 = read_named_key(TOKEN_COUNT);

    let end = offset.saturating_add(limit).min(count);
    let tokens: Vec<Key> = (offset..end).filter_map(launch_at).collect();
    runtime::ret(CLValue::from_t(tokens).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn creation_fee() {
    let fee: U512 = read_named_key(CREATION_FEE);
    runtime::ret(CLValue::from_t(fee).unwrap_or_revert());
}

#[no_mangle]
pub extern "C" fn owner() {
    let owner: Key = read_named_key(OWNER);
    runtime::ret(CLValue::from_t(owner).unwrap_or_revert());
}

// ============ Contract Installation ============

fn entry_point(name: &str, params: Vec<Parameter>, ret: CLType) -> EntryPoint {
    EntryPoint::new(
        name,
        params,
        ret,
        EntryPointAccess::Public,
        EntryPointType::Called,
        EntryPointPayment::Caller,
    )
}

fn token_param() -> Parameter {
    Parameter::new("token", CLType::Key)
}

fn get_entry_points() -> EntryPoints {
    let mut entry_points = EntryPoints::new();

    entry_points.add_entry_point(entry_point(
        "init",
        vec![Parameter::new("identity", CLType::Key)],
        CLType::Unit,
    ));
    entry_points.add_entry_point(entry_point("deposit_purse", vec![], CLType::URef));

    // State-changing entry points
    entry_points.add_entry_point(entry_point(
        "create_token",
        vec![
            Parameter::new("name", CLType::String),
            Parameter::new("symbol", CLType::String),
        ],
        CLType::Key,
    ));
    entry_points.add_entry_point(entry_point(
        "buy_token",
        vec![token_param(), Parameter::new("min_tokens_out", CLType::U256)],
        CLType::U256,
    ));
    entry_points.add_entry_point(entry_point(
        "sell_token",
        vec![
            token_param(),
            Parameter::new("token_amount", CLType::U256),
            Parameter::new("min_eth_out", CLType::U512),
        ],
        CLType::U512,
    ));
    entry_points.add_entry_point(entry_point(
        "approve",
        vec![
            token_param(),
            Parameter::new("spender", CLType::Key),
            Parameter::new("amount", CLType::U256),
        ],
        CLType::Unit,
    ));
    entry_points.add_entry_point(entry_point("withdraw_fees", vec![], CLType::U512));
    entry_points.add_entry_point(entry_point(
        "config_bonding_curve",
        vec![
            Parameter::new("curve", CLType::Key),
            Parameter::new("fee_bps", CLType::U16),
        ],
        CLType::Unit,
    ));
    entry_points.add_entry_point(entry_point(
        "set_eth_usd_rate",
        vec![
            Parameter::new("answer", CLType::U512),
            Parameter::new("decimals", CLType::U8),
        ],
        CLType::Unit,
    ));

    // Read-only entry points
    entry_points.add_entry_point(entry_point(
        "predict_token_address",
        vec![
            Parameter::new("name", CLType::String),
            Parameter::new("symbol", CLType::String),
            Parameter::new("creator", CLType::Key),
        ],
        CLType::Key,
    ));
    entry_points.add_entry_point(entry_point(
        "get_token_info",
        vec![token_param()],
        TokenRecord::cl_type(),
    ));
    entry_points.add_entry_point(entry_point(
        "balance_of",
        vec![token_param(), Parameter::new("owner", CLType::Key)],
        CLType::U256,
    ));
    entry_points.add_entry_point(entry_point(
        "allowance",
        vec![
            token_param(),
            Parameter::new("owner", CLType::Key),
            Parameter::new("spender", CLType::Key),
        ],
        CLType::U256,
    ));
    entry_points.add_entry_point(entry_point(
        "calculate_buy_amount",
        vec![token_param(), Parameter::new("eth_amount", CLType::U512)],
        CLType::U256,
    ));
    entry_points.add_entry_point(entry_point(
        "calculate_sell_amount",
        vec![token_param(), Parameter::new("token_amount", CLType::U256)],
        CLType::U512,
    ));
    entry_points.add_entry_point(entry_point(
        "curve_progress",
        vec![token_param()],
        CLType::U64,
    ));
    for name in ["current_price_in_eth", "current_price_in_usd", "market_cap_in_usd"] {
        entry_points.add_entry_point(entry_point(name, vec![token_param()], CLType::U512));
    }
    entry_points.add_entry_point(entry_point("token_count", vec![], CLType::U64));
    entry_points.add_entry_point(entry_point(
        "get_tokens",
        vec![
            Parameter::new("offset", CLType::U64),
            Parameter::new("limit", CLType::U64),
        ],
        CLType::List(Box::new(CLType::Key)),
    ));
    entry_points.add_entry_point(entry_point("creation_fee", vec![], CLType::U512));
    entry_points.add_entry_point(entry_point("owner", vec![], CLType::Key));

    entry_points
}

/// Launch parameters from the install deploy. Omitted arguments keep their
/// defaults.
fn install_config() -> LaunchpadConfig {
    ConfigOverrides {
        creation_fee_wei: optional_named_arg::<U512>(CREATION_FEE).map(wei_to_u128),
        initial_supply: optional_named_arg::<U256>(INITIAL_SUPPLY).map(supply_to_u128),
        token_decimals: optional_named_arg(TOKEN_DECIMALS),
        trading_fee_bps: optional_named_arg(TRADING_FEE_BPS),
        migration_threshold_wei: optional_named_arg::<U512>(MIGRATION_THRESHOLD)
            .map(wei_to_u128),
        virtual_eth_reserve_wei: optional_named_arg::<U512>(VIRTUAL_ETH_RESERVE)
            .map(wei_to_u128),
    }
    .resolve()
    .unwrap_or_revert()
}

#[no_mangle]
pub extern "C" fn call() {
    let config = install_config();

    let owner = caller();
    let mut named_keys = NamedKeys::new();
    let mut put = |name: &str, key: Key| {
        named_keys.insert(name.to_string(), key);
    };

    put(OWNER, casper_storage::new_uref(owner).into());
    put(INITIALIZED, casper_storage::new_uref(false).into());
    put(IDENTITY, casper_storage::new_uref(owner).into());
    put(TRACKED_BALANCE, casper_storage::new_uref(U512::zero()).into());
    put(TREASURY, casper_storage::new_uref(Treasury::new(owner)).into());
    put(TOKEN_COUNT, casper_storage::new_uref(0u64).into());
    put(EVENT_COUNT, casper_storage::new_uref(0u64).into());
    put(ETH_USD_ANSWER, casper_storage::new_uref(U512::zero()).into());
    put(ETH_USD_DECIMALS, casper_storage::new_uref(8u8).into());

    put(CREATION_FEE, casper_storage::new_uref(config.creation_fee()).into());
    put(
        INITIAL_SUPPLY,
        casper_storage::new_uref(config.initial_supply()).into(),
    );
    put(
        TOKEN_DECIMALS,
        casper_storage::new_uref(config.token_decimals).into(),
    );
    put(
        TRADING_FEE_BPS,
        casper_storage::new_uref(config.trading_fee_bps).into(),
    );
    put(
        MIGRATION_THRESHOLD,
        casper_storage::new_uref(config.migration_threshold()).into(),
    );
    put(
        VIRTUAL_ETH_RESERVE,
        casper_storage::new_uref(U512::from(config.virtual_eth_reserve_wei)).into(),
    );

    let (contract_hash, _) = casper_storage::new_contract(
        get_entry_points(),
        Some(named_keys),
        Some("meme_factory_package".to_string()),
        Some("meme_factory_access".to_string()),
        None,
    );

    runtime::put_key("meme_factory", contract_hash.into());

    runtime::call_contract::<()>(
        contract_hash,
        "init",
        runtime_args! { "identity" => Key::Hash(contract_hash.value()) },
    );
}
