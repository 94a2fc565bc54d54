//! Domain model for the power-perpetual trading core.
//!
//! This crate holds the pure data types shared by the quoting, trading and
//! indexing layers: tokens and raw amounts, immutable pool snapshots, the
//! tick/price math they are measured against, and the error taxonomy.

/// Error types.
pub mod error;
/// Tick, price and swap-step math.
pub mod math;
/// Pool snapshots and fee tiers.
pub mod pool;
/// Tokens and raw amounts.
pub mod token;
/// Scale-carrying amounts and percentages.
pub mod value_objects;

pub use error::MathError;
pub use pool::{FeeTier, PoolState, TickData};
pub use token::{POWER_TOKEN_DECIMALS, Token, TokenAmount, WRAPPED_NATIVE_DECIMALS};
pub use value_objects::{amount::Amount, percentage::Percentage};
