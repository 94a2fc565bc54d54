//! Read-model projection of the yield strategy's on-chain events.
//!
//! Each strategy event maps to one append-or-update record keyed by
//! transaction hash. Records are created or field-updated idempotently and
//! never deleted.

/// Strategy event types.
pub mod events;
/// Event-to-record projection rules.
pub mod projection;
/// In-process record store.
pub mod store;

pub use events::{EventEnvelope, HedgeData, StrategyEvent, TransferData};
pub use projection::{StrategyTxRecord, TxType};
pub use store::StrategyTxStore;
