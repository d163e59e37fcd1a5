//! Token launchpad engine.
//!
//! A factory deterministically issues fungible tokens and binds each one to
//! its own bonding curve. Curves price buys and sells along a constant
//! product over a virtual ETH reserve, skim a trading fee into a fee ledger,
//! and freeze once the ETH reserve reaches the migration threshold. The
//! factory sweeps each trade's fee into its treasury.
//!
//! ```text
//!   TokenFactory ──create──▶ (TokenLedger, BondingCurve)
//!        │                          │
//!        ├──buy/sell (by token)────▶ ConstantProductCurve + FeeLedger
//!        │                                                    │
//!        └──withdraw───────────────▶ Treasury ◀──sweep────────┘
//! ```
//!
//! The crate is `no_std` so the same engine runs inside the `meme-factory`
//! contract and in host-side tests.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod address;
pub mod config;
pub mod context;
pub mod curves;
pub mod engine;
pub mod error;
pub mod events;
pub mod factory;
pub mod fees;
pub mod math;
pub mod oracle;
pub mod token;
pub mod treasury;

pub use address::{curve_address, symbol_salt, token_address, Salt};
pub use config::{ConfigOverrides, LaunchpadConfig};
pub use context::CallContext;
pub use curves::ConstantProductCurve;
pub use engine::{BondingCurve, BuyReceipt, CurvePhase, CurveState, SellReceipt};
pub use error::{LaunchpadError, Result};
pub use events::{EventSink, LaunchpadEvent};
pub use factory::{Launch, LaunchRegistry, TokenFactory, TokenRecord};
pub use fees::{apply_fee, FeeLedger, BPS_DENOMINATOR};
pub use oracle::{FixedRateOracle, PriceOracle, UsdQuote, MAX_FEED_DECIMALS, USD_DECIMALS};
pub use token::{FungibleToken, TokenLedger};
pub use treasury::Treasury;
