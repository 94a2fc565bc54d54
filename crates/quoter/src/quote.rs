use crate::slippage::{SlippageError, max_in, min_out};
use powerperp_domain::{Percentage, TokenAmount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The counter-amount and price impact of a simulated trade.
///
/// Derived from a single pool snapshot; recompute whenever the snapshot
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// The computed counter-amount: the output for an exact-input quote,
    /// the input for an exact-output quote.
    pub amount: TokenAmount,
    /// Relative difference between the marginal price before the trade and
    /// the effective execution price, in percent, rounded to 2 places.
    pub price_impact_pct: Decimal,
}

impl Quote {
    /// The quote for a zero-amount request: zero counter-amount, no impact.
    pub fn no_op() -> Self {
        Self {
            amount: TokenAmount::zero(),
            price_impact_pct: Decimal::ZERO,
        }
    }
}

/// A quote paired with its slippage-adjusted bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedQuote {
    pub amount: TokenAmount,
    /// Minimum acceptable output (exact-input) or maximum acceptable input
    /// (exact-output).
    pub bound: TokenAmount,
    pub price_impact_pct: Decimal,
}

impl BoundedQuote {
    /// Bounds an exact-input quote: the counter-amount is an output, so the
    /// bound is the minimum acceptable output.
    pub fn exact_input(quote: Quote, slippage: Percentage) -> Result<Self, SlippageError> {
        Ok(Self {
            amount: quote.amount,
            bound: min_out(quote.amount, slippage)?,
            price_impact_pct: quote.price_impact_pct,
        })
    }

    /// Bounds an exact-output quote: the counter-amount is an input, so the
    /// bound is the maximum acceptable input.
    pub fn exact_output(quote: Quote, slippage: Percentage) -> Result<Self, SlippageError> {
        Ok(Self {
            amount: quote.amount,
            bound: max_in(quote.amount, slippage)?,
            price_impact_pct: quote.price_impact_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_op_quote() {
        let q = Quote::no_op();
        assert!(q.amount.is_zero());
        assert_eq!(q.price_impact_pct, Decimal::ZERO);
    }

    #[test]
    fn test_bounded_directions() {
        let quote = Quote {
            amount: TokenAmount::from(1000u64),
            price_impact_pct: dec!(0.05),
        };
        let slippage = Percentage::from_percent(dec!(1));

        let exact_in = BoundedQuote::exact_input(quote, slippage).unwrap();
        assert_eq!(exact_in.bound, TokenAmount::from(990u64));

        let exact_out = BoundedQuote::exact_output(quote, slippage).unwrap();
        assert_eq!(exact_out.bound, TokenAmount::from(1010u64));
    }
}
