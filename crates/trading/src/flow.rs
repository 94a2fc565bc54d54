//! Per-trade submission state machine.
//!
//! `Idle -> QuoteRequested -> ParamsBuilt -> Submitted -> Confirmed | Failed`
//!
//! Params are only built from a successful quote, submission happens only on
//! an explicit call, and a failure always lands back at `Idle` via
//! [`TradeFlow::reset`] — pool state may have moved, so the next attempt
//! starts from a fresh quote. Nothing retries automatically.

use crate::params::{
    BuildError, QuoteOrSlippage, TradeIntent, TradeParams, bounded_quote_for_intent,
    build_for_intent,
};
use crate::wallet::{SubmitError, TxReceipt, WalletCapability};
use powerperp_domain::{FeeTier, Percentage, PoolState, Token};
use powerperp_quoter::quote::BoundedQuote;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeStage {
    Idle,
    QuoteRequested,
    ParamsBuilt,
    Submitted,
    Confirmed(TxReceipt),
    Failed { reason: String },
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("no successful quote to build params from")]
    NotQuoted,
    #[error("no params built; nothing to submit")]
    NotBuilt,
    #[error("a submission is already in flight or settled; reset first")]
    AlreadySubmitted,
    #[error(transparent)]
    Quote(#[from] QuoteOrSlippage),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Drives one trade from quote to receipt.
///
/// Holds the quote and params derived from a single pool snapshot; dropping
/// or resetting the flow discards them.
pub struct TradeFlow {
    /// Correlation id for log lines across the trade's lifetime.
    id: String,
    stage: TradeStage,
    intent: Option<TradeIntent>,
    quote: Option<BoundedQuote>,
    params: Option<TradeParams>,
}

impl Default for TradeFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeFlow {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            stage: TradeStage::Idle,
            intent: None,
            quote: None,
            params: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stage(&self) -> &TradeStage {
        &self.stage
    }

    pub fn quote(&self) -> Option<&BoundedQuote> {
        self.quote.as_ref()
    }

    pub fn params(&self) -> Option<&TradeParams> {
        self.params.as_ref()
    }

    /// Quotes the intent against the snapshot. Entered on user amount
    /// input; re-entry with a new amount is allowed until submission.
    pub fn request_quote(
        &mut self,
        intent: TradeIntent,
        pool: &PoolState,
        base: &Token,
        derivative: &Token,
        slippage: Percentage,
    ) -> Result<&BoundedQuote, FlowError> {
        if matches!(
            self.stage,
            TradeStage::Submitted | TradeStage::Confirmed(_) | TradeStage::Failed { .. }
        ) {
            return Err(FlowError::AlreadySubmitted);
        }
        self.stage = TradeStage::QuoteRequested;
        self.params = None;

        match bounded_quote_for_intent(&intent, pool, base, derivative, slippage) {
            Ok(bounded) => {
                debug!(
                    amount = %bounded.amount,
                    bound = %bounded.bound,
                    impact_pct = %bounded.price_impact_pct,
                    "quote ready"
                );
                self.intent = Some(intent);
                self.quote = Some(bounded);
                Ok(self.quote.as_ref().unwrap_or_else(|| unreachable!()))
            }
            Err(e) => {
                // Stay in QuoteRequested; the caller branches on the error
                // and may re-enter with a corrected amount.
                self.intent = None;
                self.quote = None;
                warn!(error = %e, "quote failed");
                Err(e.into())
            }
        }
    }

    /// Builds trade params from the held quote. Only reachable after a
    /// successful quote.
    pub fn build_params(
        &mut self,
        base: &Token,
        derivative: &Token,
        fee: FeeTier,
        recipient: &str,
        slippage: Percentage,
        now: u64,
    ) -> Result<&TradeParams, FlowError> {
        if self.stage != TradeStage::QuoteRequested {
            return Err(if matches!(self.stage, TradeStage::Idle) {
                FlowError::NotQuoted
            } else {
                FlowError::AlreadySubmitted
            });
        }
        let intent = self.intent.as_ref().ok_or(FlowError::NotQuoted)?;
        let quote = self.quote.as_ref().ok_or(FlowError::NotQuoted)?;

        let inner = powerperp_quoter::quote::Quote {
            amount: quote.amount,
            price_impact_pct: quote.price_impact_pct,
        };
        let params = build_for_intent(
            intent, base, derivative, fee, recipient, &inner, slippage, now,
        )?;
        self.params = Some(params);
        self.stage = TradeStage::ParamsBuilt;
        Ok(self.params.as_ref().unwrap_or_else(|| unreachable!()))
    }

    /// Submits the encoded batch through the wallet capability. Called only
    /// on explicit user confirmation — never automatically.
    ///
    /// On rejection, cancellation or timeout the flow lands in `Failed`
    /// with the reason attached; call [`reset`](Self::reset) to start over
    /// with a fresh quote.
    pub async fn submit(
        &mut self,
        wallet: &dyn WalletCapability,
        calls: Vec<Vec<u8>>,
        value: primitive_types::U256,
    ) -> Result<TxReceipt, FlowError> {
        if self.stage != TradeStage::ParamsBuilt {
            return Err(FlowError::NotBuilt);
        }
        let params = self.params.as_ref().ok_or(FlowError::NotBuilt)?;
        params.ensure_attached_value(value)?;
        if wallet.address().is_none() {
            return Err(FlowError::Submit(SubmitError::NoAddress));
        }

        self.stage = TradeStage::Submitted;
        info!(flow = %self.id, calls = calls.len(), value = %value, "submitting trade");

        match wallet.sign_and_send(calls, value).await {
            Ok(receipt) => {
                info!(tx_hash = %receipt.tx_hash, success = receipt.success, "trade confirmed");
                self.stage = TradeStage::Confirmed(receipt.clone());
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, "trade submission failed");
                self.stage = TradeStage::Failed {
                    reason: e.to_string(),
                };
                Err(e.into())
            }
        }
    }

    /// Returns to `Idle`, discarding the quote and params. Required after a
    /// failure: the old quote is stale by definition.
    pub fn reset(&mut self) {
        self.stage = TradeStage::Idle;
        self.intent = None;
        self.quote = None;
        self.params = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{AmountMode, TradeSide};
    use async_trait::async_trait;
    use powerperp_domain::math::tick::{price_to_tick, sqrt_price_x96_from_price};
    use powerperp_domain::{TickData, TokenAmount};
    use primitive_types::U256;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockWallet {
        address: Option<String>,
        reject: bool,
        sends: AtomicUsize,
    }

    impl MockWallet {
        fn accepting() -> Self {
            Self {
                address: Some("0x1111111111111111111111111111111111111111".to_string()),
                reject: false,
                sends: AtomicUsize::new(0),
            }
        }

        fn rejecting() -> Self {
            Self {
                reject: true,
                ..Self::accepting()
            }
        }
    }

    #[async_trait]
    impl WalletCapability for MockWallet {
        fn address(&self) -> Option<String> {
            self.address.clone()
        }

        fn network_id(&self) -> u64 {
            1
        }

        async fn sign_and_send(
            &self,
            _calls: Vec<Vec<u8>>,
            _value: U256,
        ) -> Result<TxReceipt, SubmitError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                return Err(SubmitError::Rejected {
                    reason: "user denied transaction".to_string(),
                });
            }
            Ok(TxReceipt {
                tx_hash: "0xabc".to_string(),
                block_number: Some(1),
                success: true,
            })
        }
    }

    fn pool() -> (PoolState, Token, Token) {
        let base = Token::wrapped_native("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        let derivative = Token::power_perp("0x0b99e3e573a1a9c5e6b2ce818b617f0e664e86b1");
        let raw_price = dec!(20000000);
        let tick = price_to_tick(raw_price).unwrap();
        let pool = PoolState {
            token0: derivative.clone(),
            token1: base.clone(),
            fee_tier: powerperp_domain::FeeTier::Medium,
            sqrt_price_x96: sqrt_price_x96_from_price(raw_price).unwrap(),
            tick,
            liquidity: 10_000_000_000_000_000_000_000,
            ticks: vec![
                TickData {
                    index: tick - 6000,
                    liquidity_net: 8_000_000_000_000_000_000_000,
                },
                TickData {
                    index: tick + 6000,
                    liquidity_net: -8_000_000_000_000_000_000_000,
                },
            ],
        };
        (pool, base, derivative)
    }

    fn sell_intent() -> TradeIntent {
        TradeIntent {
            side: TradeSide::Sell,
            mode: AmountMode::ExactIn,
            amount: TokenAmount::from(100_000_000_000_000u128),
        }
    }

    fn drive_to_params(flow: &mut TradeFlow) -> (Token, Token) {
        let (pool, base, derivative) = pool();
        let slippage = Percentage::from_percent(dec!(0.5));
        flow.request_quote(sell_intent(), &pool, &base, &derivative, slippage)
            .unwrap();
        flow.build_params(
            &base,
            &derivative,
            pool.fee_tier,
            "0x1111111111111111111111111111111111111111",
            slippage,
            1_700_000_000,
        )
        .unwrap();
        (base, derivative)
    }

    #[tokio::test]
    async fn test_happy_path_reaches_confirmed() {
        let mut flow = TradeFlow::new();
        assert_eq!(*flow.stage(), TradeStage::Idle);

        drive_to_params(&mut flow);
        assert_eq!(*flow.stage(), TradeStage::ParamsBuilt);

        let wallet = MockWallet::accepting();
        let receipt = flow
            .submit(&wallet, vec![vec![0u8; 4]], U256::zero())
            .await
            .unwrap();
        assert!(receipt.success);
        assert!(matches!(flow.stage(), TradeStage::Confirmed(_)));
        assert_eq!(wallet.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejection_fails_and_requires_reset() {
        let mut flow = TradeFlow::new();
        drive_to_params(&mut flow);

        let wallet = MockWallet::rejecting();
        let err = flow
            .submit(&wallet, vec![vec![0u8; 4]], U256::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Submit(SubmitError::Rejected { .. })));
        assert!(matches!(flow.stage(), TradeStage::Failed { .. }));

        // No automatic retry: a fresh quote is required after reset.
        let (pool, base, derivative) = pool();
        let slippage = Percentage::from_percent(dec!(0.5));
        let err = flow
            .request_quote(sell_intent(), &pool, &base, &derivative, slippage)
            .unwrap_err();
        assert!(matches!(err, FlowError::AlreadySubmitted));

        flow.reset();
        assert_eq!(*flow.stage(), TradeStage::Idle);
        assert!(flow.quote().is_none());
        assert!(flow.params().is_none());
        flow.request_quote(sell_intent(), &pool, &base, &derivative, slippage)
            .unwrap();
    }

    #[tokio::test]
    async fn test_submit_requires_built_params() {
        let mut flow = TradeFlow::new();
        let wallet = MockWallet::accepting();
        let err = flow
            .submit(&wallet, vec![], U256::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::NotBuilt));
        assert_eq!(wallet.sends.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_params_require_quote() {
        let mut flow = TradeFlow::new();
        let (_, base, derivative) = pool();
        let err = flow
            .build_params(
                &base,
                &derivative,
                powerperp_domain::FeeTier::Medium,
                "0x1111111111111111111111111111111111111111",
                Percentage::from_percent(dec!(0.5)),
                0,
            )
            .unwrap_err();
        assert!(matches!(err, FlowError::NotQuoted));
    }

    #[tokio::test]
    async fn test_value_mismatch_fails_fast() {
        let mut flow = TradeFlow::new();
        drive_to_params(&mut flow);

        // Selling the derivative requires zero native value; attaching any
        // is a programming error caught before the wallet is touched.
        let wallet = MockWallet::accepting();
        let err = flow
            .submit(&wallet, vec![vec![0u8; 4]], U256::from(1u64))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Build(BuildError::ValueMismatch { .. })));
        assert_eq!(wallet.sends.load(Ordering::SeqCst), 0);
    }
}
