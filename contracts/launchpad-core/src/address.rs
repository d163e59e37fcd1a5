//! Deterministic address derivation.
//!
//! Addresses follow the CREATE2 shape:
//! `keccak256(0xff ‖ factory ‖ salt ‖ keccak256(init))`, so an address can
//! be predicted off-line from the same inputs the factory uses.

use casper_types::Key;
use sha3::{Digest, Keccak256};

pub type Salt = [u8; 32];

const CREATE2_PREFIX: u8 = 0xff;
const CURVE_DOMAIN: &[u8] = b"bonding_curve";

fn keccak(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Raw identity bytes of a principal or contract key. Other key kinds are
/// hashed from their formatted string, which is unique per key and cannot
/// fail to encode.
fn key_bytes(key: &Key) -> [u8; 32] {
    match key {
        Key::Account(account_hash) => account_hash.value(),
        Key::Hash(hash) => *hash,
        other => keccak(&[other.to_formatted_string().as_bytes()]),
    }
}

fn create2(factory: &Key, salt: &Salt, init_hash: &[u8; 32]) -> Key {
    let factory = key_bytes(factory);
    Key::Hash(keccak(&[&[CREATE2_PREFIX], &factory, salt, init_hash]))
}

/// Uniqueness is keyed on the ticker alone: two launches with the same
/// symbol collide even when their names differ.
pub fn symbol_salt(symbol: &str) -> Salt {
    keccak(&[symbol.as_bytes()])
}

pub fn token_address(factory: &Key, name: &str, symbol: &str, creator: &Key) -> Key {
    let creator = key_bytes(creator);
    let init_hash = keccak(&[name.as_bytes(), &[0], symbol.as_bytes(), &[0], &creator]);
    create2(factory, &symbol_salt(symbol), &init_hash)
}

pub fn curve_address(factory: &Key, symbol: &str, token: &Key) -> Key {
    let token = key_bytes(token);
    let init_hash = keccak(&[CURVE_DOMAIN, &token]);
    create2(factory, &symbol_salt(symbol), &init_hash)
}
