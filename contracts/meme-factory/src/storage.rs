//! Named keys, dictionaries and the storage-backed views the engine runs on.

use alloc::string::{String, ToString};

use casper_contract::{
    contract_api::{runtime, storage, system},
    ext_ffi,
    unwrap_or_revert::UnwrapOrRevert,
};
use casper_types::{
    api_error,
    bytesrepr::{FromBytes, ToBytes},
    ApiError, CLTyped, Key, URef, U256, U512,
};
use launchpad_core::{
    BondingCurve, EventSink, FungibleToken, LaunchRegistry, LaunchpadConfig, LaunchpadError,
    LaunchpadEvent, PriceOracle, Salt, TokenRecord, UsdQuote,
};

// Named keys
pub const IDENTITY: &str = "identity";
pub const OWNER: &str = "owner";
pub const INITIALIZED: &str = "initialized";
pub const PURSE: &str = "launchpad_purse";
pub const TRACKED_BALANCE: &str = "tracked_balance";
pub const TREASURY: &str = "treasury";
pub const TOKEN_COUNT: &str = "token_count";
pub const EVENT_COUNT: &str = "event_count";
pub const ETH_USD_ANSWER: &str = "eth_usd_answer";
pub const ETH_USD_DECIMALS: &str = "eth_usd_decimals";

pub const CREATION_FEE: &str = "creation_fee";
pub const INITIAL_SUPPLY: &str = "initial_supply";
pub const TOKEN_DECIMALS: &str = "token_decimals";
pub const TRADING_FEE_BPS: &str = "trading_fee_bps";
pub const MIGRATION_THRESHOLD: &str = "migration_threshold";
pub const VIRTUAL_ETH_RESERVE: &str = "virtual_eth_reserve";

// Dictionaries
pub const RECORDS: &str = "records";
pub const CURVES: &str = "curves";
pub const CURVE_INDEX: &str = "curve_index";
pub const SALTS: &str = "salts";
pub const LAUNCHES: &str = "launches";
pub const BALANCES: &str = "balances";
pub const ALLOWANCES: &str = "allowances";
pub const SUPPLIES: &str = "supplies";
pub const EVENTS: &str = "events";

pub const DICTIONARIES: [&str; 9] = [
    RECORDS,
    CURVES,
    CURVE_INDEX,
    SALTS,
    LAUNCHES,
    BALANCES,
    ALLOWANCES,
    SUPPLIES,
    EVENTS,
];

pub fn read_named_key<T: CLTyped + FromBytes>(name: &str) -> T {
    let key = runtime::get_key(name).unwrap_or_revert();
    let uref = key.into_uref().unwrap_or_revert();
    storage::read(uref).unwrap_or_revert().unwrap_or_revert()
}

pub fn write_named_key<T: CLTyped + ToBytes>(name: &str, value: T) {
    let key = runtime::get_key(name).unwrap_or_revert();
    let uref = key.into_uref().unwrap_or_revert();
    storage::write(uref, value);
}

pub fn get_dictionary_uref(name: &str) -> URef {
    runtime::get_key(name)
        .unwrap_or_revert()
        .into_uref()
        .unwrap_or_revert()
}

fn dictionary_read<T: CLTyped + FromBytes>(dictionary: &str, item: &str) -> Option<T> {
    storage::dictionary_get(get_dictionary_uref(dictionary), item).unwrap_or_revert()
}

fn dictionary_write<T: CLTyped + ToBytes>(dictionary: &str, item: &str, value: T) {
    storage::dictionary_put(get_dictionary_uref(dictionary), item, value);
}

/// Dictionary item keys are capped at 64 characters, so keys are stored
/// as their hex-encoded 32-byte hash.
pub fn key_to_str(key: &Key) -> String {
    match key {
        Key::Account(account_hash) => hex::encode(account_hash.value()),
        Key::Hash(hash) => hex::encode(hash),
        _ => hex::encode(runtime::blake2b(key.to_bytes().unwrap_or_revert())),
    }
}

fn composite_key(parts: &[&Key]) -> String {
    let mut bytes = alloc::vec::Vec::new();
    for part in parts {
        bytes.extend_from_slice(&part.to_bytes().unwrap_or_revert());
    }
    hex::encode(runtime::blake2b(bytes))
}

/// Reads an install or call argument the deploy may leave out.
pub fn optional_named_arg<T: FromBytes>(name: &str) -> Option<T> {
    let mut arg_size: usize = 0;
    let ret = unsafe {
        ext_ffi::casper_get_named_arg_size(
            name.as_bytes().as_ptr(),
            name.len(),
            &mut arg_size as *mut usize,
        )
    };
    match api_error::result_from(ret) {
        Ok(()) => Some(runtime::get_named_arg(name)),
        Err(ApiError::MissingArgument) => None,
        Err(error) => runtime::revert(error),
    }
}

pub fn caller() -> Key {
    Key::Account(runtime::get_caller())
}

pub fn block_time() -> u64 {
    runtime::get_blocktime().into()
}

pub fn require_owner() {
    let owner: Key = read_named_key(OWNER);
    if caller() != owner {
        runtime::revert(LaunchpadError::Unauthorized);
    }
}

pub fn wei_to_u128(value: U512) -> u128 {
    if value.bits() > 128 {
        runtime::revert(LaunchpadError::InvalidConfig);
    }
    value.as_u128()
}

pub fn supply_to_u128(value: U256) -> u128 {
    if value.bits() > 128 {
        runtime::revert(LaunchpadError::InvalidConfig);
    }
    value.as_u128()
}

pub fn read_config() -> LaunchpadConfig {
    LaunchpadConfig {
        creation_fee_wei: wei_to_u128(read_named_key(CREATION_FEE)),
        initial_supply: supply_to_u128(read_named_key(INITIAL_SUPPLY)),
        token_decimals: read_named_key(TOKEN_DECIMALS),
        trading_fee_bps: read_named_key(TRADING_FEE_BPS),
        migration_threshold_wei: wei_to_u128(read_named_key(MIGRATION_THRESHOLD)),
        virtual_eth_reserve_wei: wei_to_u128(read_named_key(VIRTUAL_ETH_RESERVE)),
    }
}

// ============ Registry ============

pub fn read_record(token: &Key) -> Option<TokenRecord> {
    dictionary_read(RECORDS, &key_to_str(token))
}

pub fn write_record(record: TokenRecord) {
    let item = key_to_str(&record.token);
    dictionary_write(RECORDS, &item, record);
}

pub fn read_curve(token: &Key) -> BondingCurve {
    dictionary_read(CURVES, &key_to_str(token))
        .unwrap_or_revert_with(LaunchpadError::UnknownToken)
}

pub fn write_curve(curve: BondingCurve) {
    let item = key_to_str(&curve.token());
    dictionary_write(CURVES, &item, curve);
}

pub fn token_for_curve(curve: &Key) -> Option<Key> {
    dictionary_read(CURVE_INDEX, &key_to_str(curve))
}

pub fn index_curve(curve: &Key, token: Key) {
    dictionary_write(CURVE_INDEX, &key_to_str(curve), token);
}

pub fn mark_salt(salt: &Salt) {
    dictionary_write(SALTS, &hex::encode(salt), true);
}

pub fn push_launch(token: Key) -> u64 {
    let index: u64 = read_named_key(TOKEN_COUNT);
    dictionary_write(LAUNCHES, &index.to_string(), token);
    write_named_key(TOKEN_COUNT, index + 1);
    index
}

pub fn launch_at(index: u64) -> Option<Key> {
    dictionary_read(LAUNCHES, &index.to_string())
}

/// Launch registry over the `salts`, `records` and `curve_index` dictionaries.
pub struct StoredLaunches;

impl LaunchRegistry for StoredLaunches {
    fn salt_used(&self, salt: &Salt) -> bool {
        dictionary_read::<bool>(SALTS, &hex::encode(salt)).unwrap_or_default()
    }

    fn token_exists(&self, token: &Key) -> bool {
        read_record(token).is_some()
    }

    fn curve_exists(&self, curve: &Key) -> bool {
        token_for_curve(curve).is_some()
    }
}

// ============ Purse ============

pub fn purse() -> URef {
    runtime::get_key(PURSE)
        .unwrap_or_revert()
        .into_uref()
        .unwrap_or_revert()
}

/// Motes deposited into the launchpad purse since the last settled call.
pub fn attached_value() -> U512 {
    let balance = system::get_purse_balance(purse()).unwrap_or_revert();
    let tracked: U512 = read_named_key(TRACKED_BALANCE);
    balance.checked_sub(tracked).unwrap_or_default()
}

pub fn pay_out(recipient: &Key, amount: U512) {
    if amount.is_zero() {
        return;
    }
    match recipient {
        Key::Account(account) => {
            system::transfer_from_purse_to_account(purse(), *account, amount, None)
                .unwrap_or_revert();
        }
        _ => runtime::revert(LaunchpadError::Unauthorized),
    }
}

/// Records the purse balance after all transfers of the current call.
pub fn settle_balance() {
    let balance = system::get_purse_balance(purse()).unwrap_or_revert();
    write_named_key(TRACKED_BALANCE, balance);
}

// ============ Token ledger ============

/// CEP-18 balances of one launched token, kept in the factory's dictionaries.
pub struct DictionaryToken {
    token: Key,
    admin: Key,
}

impl DictionaryToken {
    pub fn new(token: Key, admin: Key) -> Self {
        Self { token, admin }
    }
}

impl FungibleToken for DictionaryToken {
    fn read_balance(&self, owner: &Key) -> U256 {
        dictionary_read(BALANCES, &composite_key(&[&self.token, owner])).unwrap_or_default()
    }

    fn write_balance(&mut self, owner: &Key, amount: U256) {
        dictionary_write(BALANCES, &composite_key(&[&self.token, owner]), amount);
    }

    fn read_allowance(&self, owner: &Key, spender: &Key) -> U256 {
        dictionary_read(ALLOWANCES, &composite_key(&[&self.token, owner, spender]))
            .unwrap_or_default()
    }

    fn write_allowance(&mut self, owner: &Key, spender: &Key, amount: U256) {
        dictionary_write(
            ALLOWANCES,
            &composite_key(&[&self.token, owner, spender]),
            amount,
        );
    }

    fn total_supply(&self) -> U256 {
        dictionary_read(SUPPLIES, &key_to_str(&self.token)).unwrap_or_default()
    }

    fn write_total_supply(&mut self, amount: U256) {
        dictionary_write(SUPPLIES, &key_to_str(&self.token), amount);
    }

    fn admin(&self) -> Key {
        self.admin
    }
}

// ============ Events ============

/// Appends events to the `events` dictionary as text.
pub struct ContractEvents;

impl EventSink for ContractEvents {
    fn emit(&mut self, event: LaunchpadEvent) {
        let index: u64 = read_named_key(EVENT_COUNT);
        dictionary_write(EVENTS, &index.to_string(), event.to_string());
        write_named_key(EVENT_COUNT, index + 1);
    }
}

// ============ Oracle ============

/// ETH/USD rate pushed on-chain by the owner. A zero answer means unset.
pub struct StoredRateOracle;

impl PriceOracle for StoredRateOracle {
    fn eth_usd(&self) -> launchpad_core::Result<UsdQuote> {
        UsdQuote {
            answer: read_named_key(ETH_USD_ANSWER),
            decimals: read_named_key(ETH_USD_DECIMALS),
        }
        .checked()
    }
}
