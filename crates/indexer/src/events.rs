use chrono::{DateTime, Utc};
use powerperp_domain::TokenAmount;
use serde::{Deserialize, Serialize};

/// The zero address; a transfer from it is a mint of strategy LP tokens.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// A strategy event with its transaction context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub tx_hash: String,
    /// Sender of the transaction that emitted the event.
    pub tx_from: String,
    /// Native value attached to the transaction.
    pub tx_value: TokenAmount,
    pub timestamp: DateTime<Utc>,
    pub event: StrategyEvent,
}

/// On-chain events emitted by the strategy vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StrategyEvent {
    Deposit {
        power_amount: TokenAmount,
        lp_amount: TokenAmount,
    },
    Withdraw {
        power_amount: TokenAmount,
        lp_amount: TokenAmount,
        eth_withdrawn: TokenAmount,
    },
    FlashDeposit {
        traded_amount_out: TokenAmount,
    },
    FlashWithdraw {
        power_amount: TokenAmount,
        lp_amount: TokenAmount,
    },
    Hedge(HedgeData),
    HedgeOnUniswap(HedgeData),
    Transfer(TransferData),
}

/// Fields shared by the two hedge event flavors; `hedger_price` is only
/// present on the auction hedge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HedgeData {
    pub hedger: String,
    pub target_power_amount: TokenAmount,
    pub target_eth_amount: TokenAmount,
    pub auction_price: TokenAmount,
    /// True when the strategy is selling the derivative in this hedge.
    pub is_selling_power: bool,
    pub hedger_price: Option<TokenAmount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferData {
    pub from: String,
    pub to: String,
    pub value: TokenAmount,
}

impl TransferData {
    /// A transfer from the zero address mints LP tokens.
    pub fn is_mint(&self) -> bool {
        self.from.eq_ignore_ascii_case(ZERO_ADDRESS)
    }
}
