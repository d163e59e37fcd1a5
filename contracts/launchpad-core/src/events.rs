use alloc::{string::String, vec::Vec};
use core::fmt;

use casper_types::{Key, U256, U512};

/// Everything the launchpad announces to the outside world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchpadEvent {
    TokenCreated {
        token: Key,
        curve: Key,
        name: String,
        symbol: String,
        creator: Key,
    },
    Buy {
        buyer: Key,
        token: Key,
        token_amount: U256,
        /// Gross ETH attached, fee included.
        eth_amount: U512,
        fee: U512,
    },
    Sell {
        seller: Key,
        token: Key,
        token_amount: U256,
        /// ETH paid to the seller, fee already removed.
        eth_amount: U512,
        fee: U512,
    },
    Migrated {
        token: Key,
        curve: Key,
        eth_reserve: U512,
        token_reserve: U256,
    },
    FeeCollected {
        amount: U512,
        to: Key,
    },
    TradingFeeUpdated {
        curve: Key,
        old_bps: u16,
        new_bps: u16,
    },
}

impl LaunchpadEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LaunchpadEvent::TokenCreated { .. } => "TokenCreated",
            LaunchpadEvent::Buy { .. } => "Buy",
            LaunchpadEvent::Sell { .. } => "Sell",
            LaunchpadEvent::Migrated { .. } => "Migrated",
            LaunchpadEvent::FeeCollected { .. } => "FeeCollected",
            LaunchpadEvent::TradingFeeUpdated { .. } => "TradingFeeUpdated",
        }
    }
}

impl fmt::Display for LaunchpadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchpadEvent::TokenCreated {
                token,
                curve,
                name,
                symbol,
                creator,
            } => write!(
                f,
                "TokenCreated(token={token}, curve={curve}, name={name}, symbol={symbol}, creator={creator})"
            ),
            LaunchpadEvent::Buy {
                buyer,
                token,
                token_amount,
                eth_amount,
                fee,
            } => write!(
                f,
                "Buy(buyer={buyer}, token={token}, tokens={token_amount}, eth={eth_amount}, fee={fee})"
            ),
            LaunchpadEvent::Sell {
                seller,
                token,
                token_amount,
                eth_amount,
                fee,
            } => write!(
                f,
                "Sell(seller={seller}, token={token}, tokens={token_amount}, eth={eth_amount}, fee={fee})"
            ),
            LaunchpadEvent::Migrated {
                token,
                curve,
                eth_reserve,
                token_reserve,
            } => write!(
                f,
                "Migrated(token={token}, curve={curve}, eth_reserve={eth_reserve}, token_reserve={token_reserve})"
            ),
            LaunchpadEvent::FeeCollected { amount, to } => {
                write!(f, "FeeCollected(amount={amount}, to={to})")
            }
            LaunchpadEvent::TradingFeeUpdated {
                curve,
                old_bps,
                new_bps,
            } => write!(
                f,
                "TradingFeeUpdated(curve={curve}, old_bps={old_bps}, new_bps={new_bps})"
            ),
        }
    }
}

/// Destination for emitted events.
pub trait EventSink {
    fn emit(&mut self, event: LaunchpadEvent);
}

impl EventSink for Vec<LaunchpadEvent> {
    fn emit(&mut self, event: LaunchpadEvent) {
        tracing::trace!(event = event.name(), "event emitted");
        self.push(event);
    }
}
