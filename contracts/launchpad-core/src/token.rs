use alloc::{collections::BTreeMap, string::String};

use casper_types::{Key, U256};

use crate::error::{LaunchpadError, Result};

/// CEP-18 style fungible token as seen by the curve.
///
/// Implementors supply the storage primitives; the transfer rules are shared
/// so an in-memory ledger and a contract dictionary behave identically.
pub trait FungibleToken {
    fn read_balance(&self, owner: &Key) -> U256;
    fn write_balance(&mut self, owner: &Key, amount: U256);
    fn read_allowance(&self, owner: &Key, spender: &Key) -> U256;
    fn write_allowance(&mut self, owner: &Key, spender: &Key, amount: U256);
    fn total_supply(&self) -> U256;
    fn write_total_supply(&mut self, amount: U256);
    /// Principal allowed to mint.
    fn admin(&self) -> Key;

    fn balance_of(&self, owner: &Key) -> U256 {
        self.read_balance(owner)
    }

    fn allowance(&self, owner: &Key, spender: &Key) -> U256 {
        self.read_allowance(owner, spender)
    }

    fn approve(&mut self, owner: &Key, spender: &Key, amount: U256) {
        self.write_allowance(owner, spender, amount);
    }

    fn transfer(&mut self, sender: &Key, recipient: &Key, amount: U256) -> Result<()> {
        let sender_balance = self.read_balance(sender);
        if sender_balance < amount {
            return Err(LaunchpadError::InsufficientBalance);
        }
        if sender == recipient {
            return Ok(());
        }
        let recipient_balance = self
            .read_balance(recipient)
            .checked_add(amount)
            .ok_or(LaunchpadError::Overflow)?;

        self.write_balance(sender, sender_balance - amount);
        self.write_balance(recipient, recipient_balance);
        Ok(())
    }

    /// Moves `amount` out of `owner` on behalf of `spender`, consuming
    /// allowance. Both checks run before anything is written.
    fn transfer_from(
        &mut self,
        spender: &Key,
        owner: &Key,
        recipient: &Key,
        amount: U256,
    ) -> Result<()> {
        let current_allowance = self.read_allowance(owner, spender);
        if current_allowance < amount {
            return Err(LaunchpadError::TransferNotApproved);
        }
        self.transfer(owner, recipient, amount)?;
        self.write_allowance(owner, spender, current_allowance - amount);
        Ok(())
    }

    fn mint(&mut self, caller: &Key, to: &Key, amount: U256) -> Result<()> {
        if *caller != self.admin() {
            return Err(LaunchpadError::Unauthorized);
        }
        let supply = self
            .total_supply()
            .checked_add(amount)
            .ok_or(LaunchpadError::Overflow)?;
        let balance = self
            .read_balance(to)
            .checked_add(amount)
            .ok_or(LaunchpadError::Overflow)?;

        self.write_balance(to, balance);
        self.write_total_supply(supply);
        Ok(())
    }
}

/// In-memory token owned by the factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLedger {
    name: String,
    symbol: String,
    decimals: u8,
    admin: Key,
    total_supply: U256,
    balances: BTreeMap<Key, U256>,
    allowances: BTreeMap<(Key, Key), U256>,
}

impl TokenLedger {
    pub fn new(name: String, symbol: String, decimals: u8, admin: Key) -> Self {
        Self {
            name,
            symbol,
            decimals,
            admin,
            total_supply: U256::zero(),
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn holders(&self) -> usize {
        self.balances.len()
    }
}

impl FungibleToken for TokenLedger {
    fn read_balance(&self, owner: &Key) -> U256 {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    fn write_balance(&mut self, owner: &Key, amount: U256) {
        if amount.is_zero() {
            self.balances.remove(owner);
        } else {
            self.balances.insert(*owner, amount);
        }
    }

    fn read_allowance(&self, owner: &Key, spender: &Key) -> U256 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    fn write_allowance(&mut self, owner: &Key, spender: &Key, amount: U256) {
        if amount.is_zero() {
            self.allowances.remove(&(*owner, *spender));
        } else {
            self.allowances.insert((*owner, *spender), amount);
        }
    }

    fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn write_total_supply(&mut self, amount: U256) {
        self.total_supply = amount;
    }

    fn admin(&self) -> Key {
        self.admin
    }
}
