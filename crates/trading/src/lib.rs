//! Trade construction and submission for the power-perpetual pool.
//!
//! Turns quotes into swap-router parameters, encodes multicall batches, and
//! drives the per-trade submission state machine against an explicit wallet
//! capability. Nothing here talks to the chain directly; signing and
//! sending belong to the wallet collaborator.

/// Multicall encoding against the router interface.
pub mod encoder;
/// Per-trade submission state machine.
pub mod flow;
/// Trade parameter construction.
pub mod params;
/// Position and balance driven trade decisions.
pub mod positions;
/// Wallet capability boundary.
pub mod wallet;

pub use encoder::{EncodeError, MulticallEncoder};
pub use flow::{FlowError, TradeFlow, TradeStage};
pub use params::{
    AmountMode, BuildError, DEADLINE_HORIZON_SECS, TradeIntent, TradeParams, TradeSide,
    build_exact_input, build_exact_output,
};
pub use positions::{Holdings, TradeDecision, decide};
pub use wallet::{SubmitError, TxReceipt, WalletCapability};
