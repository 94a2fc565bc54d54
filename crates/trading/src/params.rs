use powerperp_domain::{FeeTier, Percentage, PoolState, Token, TokenAmount};
use powerperp_quoter::engine::{QuoteError, quote_given_input, quote_given_output};
use powerperp_quoter::quote::{BoundedQuote, Quote};
use powerperp_quoter::slippage::{SlippageError, max_in, min_out};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed deadline horizon for every trade: now + 24 hours.
pub const DEADLINE_HORIZON_SECS: u64 = 86_400;

/// Which side of the derivative the user is taking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    /// Spend the base asset, receive the derivative.
    Buy,
    /// Spend the derivative, receive the base asset.
    Sell,
}

/// Which leg of the trade is held exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountMode {
    ExactIn,
    ExactOut,
}

/// A fully-tagged trade request. Each side/mode combination dispatches to
/// exactly one quote function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub side: TradeSide,
    pub mode: AmountMode,
    /// The exact amount, denominated in the input token for `ExactIn` and
    /// the output token for `ExactOut`.
    pub amount: TokenAmount,
}

impl TradeIntent {
    /// Input/output tokens for this intent, given the deployment pair.
    pub fn legs<'a>(&self, base: &'a Token, derivative: &'a Token) -> (&'a Token, &'a Token) {
        match self.side {
            TradeSide::Buy => (base, derivative),
            TradeSide::Sell => (derivative, base),
        }
    }

    /// Runs the quote function this intent maps to.
    pub fn quote(
        &self,
        pool: &PoolState,
        base: &Token,
        derivative: &Token,
    ) -> Result<Quote, QuoteError> {
        let (token_in, token_out) = self.legs(base, derivative);
        match self.mode {
            AmountMode::ExactIn => quote_given_input(pool, token_in, token_out, self.amount),
            AmountMode::ExactOut => quote_given_output(pool, token_in, token_out, self.amount),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    Slippage(#[from] SlippageError),
    /// The native value attached to a submission must equal the input-leg
    /// amount exactly; anything else is a caller bug, not a user error.
    #[error("attached native value {attached} does not match required {required}")]
    ValueMismatch { required: U256, attached: U256 },
}

/// The structured parameters of one swap-router call.
///
/// Constructed fresh per trade; the deadline is always build-time + 24h and
/// the price limit is always the no-limit sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeParams {
    pub token_in: Token,
    pub token_out: Token,
    pub fee: FeeTier,
    pub recipient: String,
    /// Absolute unix timestamp.
    pub deadline: u64,
    pub mode: AmountMode,
    /// The exact leg: input amount for `ExactIn`, output amount for
    /// `ExactOut`.
    pub exact_amount: TokenAmount,
    /// The slippage-adjusted leg: minimum output for `ExactIn`, maximum
    /// input for `ExactOut`.
    pub bound_amount: TokenAmount,
    /// Always zero: slippage bounds are the only price protection here.
    pub sqrt_price_limit_x96: U256,
}

impl TradeParams {
    /// Native value that must ride along with the submission when the input
    /// leg is the wrapped-native token; zero otherwise.
    pub fn required_native_value(&self) -> U256 {
        if self.token_in.decimals != powerperp_domain::WRAPPED_NATIVE_DECIMALS
            || self.token_in.symbol != "WETH"
        {
            return U256::zero();
        }
        match self.mode {
            AmountMode::ExactIn => self.exact_amount.0,
            AmountMode::ExactOut => self.bound_amount.0,
        }
    }

    /// Fails fast when the attached value differs from the required one.
    pub fn ensure_attached_value(&self, attached: U256) -> Result<(), BuildError> {
        let required = self.required_native_value();
        if attached != required {
            return Err(BuildError::ValueMismatch { required, attached });
        }
        Ok(())
    }
}

/// Builds exact-input parameters from a quote of the output amount.
pub fn build_exact_input(
    token_in: &Token,
    token_out: &Token,
    fee: FeeTier,
    recipient: &str,
    exact_in: TokenAmount,
    quoted_out: &Quote,
    slippage: Percentage,
    now: u64,
) -> Result<TradeParams, BuildError> {
    Ok(TradeParams {
        token_in: token_in.clone(),
        token_out: token_out.clone(),
        fee,
        recipient: recipient.to_string(),
        deadline: now + DEADLINE_HORIZON_SECS,
        mode: AmountMode::ExactIn,
        exact_amount: exact_in,
        bound_amount: min_out(quoted_out.amount, slippage)?,
        sqrt_price_limit_x96: U256::zero(),
    })
}

/// Builds exact-output parameters from a quote of the input amount.
pub fn build_exact_output(
    token_in: &Token,
    token_out: &Token,
    fee: FeeTier,
    recipient: &str,
    exact_out: TokenAmount,
    quoted_in: &Quote,
    slippage: Percentage,
    now: u64,
) -> Result<TradeParams, BuildError> {
    Ok(TradeParams {
        token_in: token_in.clone(),
        token_out: token_out.clone(),
        fee,
        recipient: recipient.to_string(),
        deadline: now + DEADLINE_HORIZON_SECS,
        mode: AmountMode::ExactOut,
        exact_amount: exact_out,
        bound_amount: max_in(quoted_in.amount, slippage)?,
        sqrt_price_limit_x96: U256::zero(),
    })
}

/// Builds params for an intent that was just quoted, picking the builder
/// matching the intent's mode.
pub fn build_for_intent(
    intent: &TradeIntent,
    base: &Token,
    derivative: &Token,
    fee: FeeTier,
    recipient: &str,
    quote: &Quote,
    slippage: Percentage,
    now: u64,
) -> Result<TradeParams, BuildError> {
    let (token_in, token_out) = intent.legs(base, derivative);
    match intent.mode {
        AmountMode::ExactIn => build_exact_input(
            token_in, token_out, fee, recipient, intent.amount, quote, slippage, now,
        ),
        AmountMode::ExactOut => build_exact_output(
            token_in, token_out, fee, recipient, intent.amount, quote, slippage, now,
        ),
    }
}

/// Convenience: quote an intent and attach its slippage bound.
pub fn bounded_quote_for_intent(
    intent: &TradeIntent,
    pool: &PoolState,
    base: &Token,
    derivative: &Token,
    slippage: Percentage,
) -> Result<BoundedQuote, QuoteOrSlippage> {
    let quote = intent.quote(pool, base, derivative)?;
    let bounded = match intent.mode {
        AmountMode::ExactIn => BoundedQuote::exact_input(quote, slippage)?,
        AmountMode::ExactOut => BoundedQuote::exact_output(quote, slippage)?,
    };
    Ok(bounded)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuoteOrSlippage {
    #[error(transparent)]
    Quote(#[from] QuoteError),
    #[error(transparent)]
    Slippage(#[from] SlippageError),
}
