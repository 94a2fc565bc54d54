//! Price quoting against a concentrated-liquidity pool snapshot.
//!
//! This crate simulates trades by walking the pool's tick liquidity curve
//! and converts slippage tolerances into acceptable-amount bounds. All
//! operations are synchronous pure functions of an explicit [`PoolState`]
//! snapshot; nothing is cached across snapshots.
//!
//! [`PoolState`]: powerperp_domain::PoolState

/// Tick-walk quote simulation.
pub mod engine;
/// Quote result types.
pub mod quote;
/// Slippage-adjusted amount bounds.
pub mod slippage;

pub use engine::{QuoteError, quote_given_input, quote_given_output};
pub use quote::{BoundedQuote, Quote};
pub use slippage::{SlippageError, max_in, min_out};
