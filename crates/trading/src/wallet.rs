use async_trait::async_trait;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Acknowledgment from the signing capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    /// False when the transaction was mined but reverted; a quote gone
    /// stale surfaces here via the on-chain bound/deadline, never as a
    /// client-side prediction.
    pub success: bool,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// The user declined, or the wallet refused to sign/send.
    #[error("submission rejected: {reason}")]
    Rejected { reason: String },
    #[error("wallet has no connected address")]
    NoAddress,
    #[error("submission timed out")]
    Timeout,
}

/// The wallet/session collaborator, passed in explicitly rather than held
/// as ambient state.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    /// Connected account, if any.
    fn address(&self) -> Option<String>;

    fn network_id(&self) -> u64;

    /// Signs and sends an encoded call batch with the given native value
    /// attached, resolving once the receipt is acknowledged.
    async fn sign_and_send(
        &self,
        calls: Vec<Vec<u8>>,
        value: U256,
    ) -> Result<TxReceipt, SubmitError>;
}
