use crate::events::{EventEnvelope, StrategyEvent};
use chrono::{DateTime, Utc};
use powerperp_domain::TokenAmount;
use serde::{Deserialize, Serialize};

/// Record tag for the event a transaction settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxType {
    Deposit,
    Withdraw,
    FlashDeposit,
    FlashWithdraw,
    Hedge,
    HedgeOnUniswap,
}

/// One row of the read model, keyed by transaction hash.
///
/// Fields are populated incrementally: a mint transfer may land before or
/// after the deposit event in the same transaction, so every field is
/// optional and updates are idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyTxRecord {
    pub tx_hash: String,
    pub tx_type: Option<TxType>,
    pub owner: Option<String>,
    /// Derivative tokens moved by the transaction.
    pub power_amount: Option<TokenAmount>,
    /// Strategy LP tokens minted or burned.
    pub lp_amount: Option<TokenAmount>,
    /// Native currency moved by the transaction.
    pub eth_amount: Option<TokenAmount>,
    pub hedge: Option<HedgeRecord>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HedgeRecord {
    pub target_power_amount: TokenAmount,
    pub target_eth_amount: TokenAmount,
    pub auction_price: TokenAmount,
    pub is_selling_power: bool,
    pub hedger_price: Option<TokenAmount>,
}

impl StrategyTxRecord {
    pub fn new(tx_hash: impl Into<String>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            tx_type: None,
            owner: None,
            power_amount: None,
            lp_amount: None,
            eth_amount: None,
            hedge: None,
            timestamp: None,
        }
    }

    /// Applies one event to the record. Returns false when the event does
    /// not touch the read model (a non-mint transfer).
    pub fn apply(&mut self, envelope: &EventEnvelope) -> bool {
        match &envelope.event {
            StrategyEvent::Deposit {
                power_amount,
                lp_amount,
            } => {
                self.tx_type = Some(TxType::Deposit);
                self.power_amount = Some(*power_amount);
                self.lp_amount = Some(*lp_amount);
                self.eth_amount = Some(envelope.tx_value);
                self.owner = Some(envelope.tx_from.clone());
                self.timestamp = Some(envelope.timestamp);
            }
            StrategyEvent::Withdraw {
                power_amount,
                lp_amount,
                eth_withdrawn,
            } => {
                self.tx_type = Some(TxType::Withdraw);
                self.power_amount = Some(*power_amount);
                self.lp_amount = Some(*lp_amount);
                self.eth_amount = Some(*eth_withdrawn);
                self.owner = Some(envelope.tx_from.clone());
                self.timestamp = Some(envelope.timestamp);
            }
            StrategyEvent::FlashDeposit { traded_amount_out } => {
                self.tx_type = Some(TxType::FlashDeposit);
                self.power_amount = Some(*traded_amount_out);
                self.eth_amount = Some(envelope.tx_value);
                self.owner = Some(envelope.tx_from.clone());
                self.timestamp = Some(envelope.timestamp);
            }
            StrategyEvent::FlashWithdraw {
                power_amount,
                lp_amount,
            } => {
                self.tx_type = Some(TxType::FlashWithdraw);
                self.power_amount = Some(*power_amount);
                self.lp_amount = Some(*lp_amount);
                self.owner = Some(envelope.tx_from.clone());
                self.timestamp = Some(envelope.timestamp);
            }
            StrategyEvent::Hedge(data) => {
                self.tx_type = Some(TxType::Hedge);
                self.apply_hedge(data);
                self.owner = Some(data.hedger.clone());
                self.timestamp = Some(envelope.timestamp);
            }
            StrategyEvent::HedgeOnUniswap(data) => {
                self.tx_type = Some(TxType::HedgeOnUniswap);
                self.apply_hedge(data);
                self.owner = Some(data.hedger.clone());
                self.timestamp = Some(envelope.timestamp);
            }
            StrategyEvent::Transfer(transfer) => {
                // Only the LP mint touches the record; ordinary transfers
                // between holders are not part of the read model.
                if !transfer.is_mint() {
                    return false;
                }
                self.lp_amount = Some(transfer.value);
            }
        }
        true
    }

    fn apply_hedge(&mut self, data: &crate::events::HedgeData) {
        self.hedge = Some(HedgeRecord {
            target_power_amount: data.target_power_amount,
            target_eth_amount: data.target_eth_amount,
            auction_price: data.auction_price,
            is_selling_power: data.is_selling_power,
            hedger_price: data.hedger_price,
        });
    }

    /// Amount of the record's primary leg, for display.
    pub fn primary_amount(&self) -> Option<TokenAmount> {
        self.power_amount.or(self.lp_amount)
    }
}
