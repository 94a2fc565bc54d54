use powerperp_domain::value_objects::amount::{decimal_from_u256, raw_ceil, raw_floor};
use powerperp_domain::{MathError, Percentage, TokenAmount};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlippageError {
    /// A tolerance of zero (or less) would make every trade revert on any
    /// pool movement, so it is rejected outright rather than clamped.
    #[error("slippage tolerance must be greater than zero")]
    InvalidSlippage,
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Minimum acceptable output for a quoted output amount:
/// `amount * (1 - slippage)`, floored to the raw unit.
///
/// No upper clamp is applied; an unreasonably large tolerance is the
/// caller's concern.
pub fn min_out(amount_out: TokenAmount, slippage: Percentage) -> Result<TokenAmount, SlippageError> {
    let fraction = validate(slippage)?;
    let amount = decimal_from_u256(amount_out.0)?;
    let bounded = amount * (Decimal::ONE - fraction);
    // A tolerance of 100% or more bottoms out at zero.
    if bounded.is_sign_negative() {
        return Ok(TokenAmount::zero());
    }
    Ok(raw_floor(bounded)?)
}

/// Maximum acceptable input for a quoted input amount:
/// `amount * (1 + slippage)`, ceiled to the raw unit.
pub fn max_in(amount_in: TokenAmount, slippage: Percentage) -> Result<TokenAmount, SlippageError> {
    let fraction = validate(slippage)?;
    let amount = decimal_from_u256(amount_in.0)?;
    Ok(raw_ceil(amount * (Decimal::ONE + fraction))?)
}

fn validate(slippage: Percentage) -> Result<Decimal, SlippageError> {
    let fraction = slippage.as_fraction();
    if fraction <= Decimal::ZERO {
        return Err(SlippageError::InvalidSlippage);
    }
    Ok(fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_min_out_floors() {
        // 100 units at 0.5% -> 99.5, floored to 99.
        let out = min_out(TokenAmount::from(100u64), Percentage::from_percent(dec!(0.5))).unwrap();
        assert_eq!(out, TokenAmount::from(99u64));
    }

    #[test]
    fn test_max_in_ceils() {
        // 100 units at 0.5% -> 100.5, ceiled to 101.
        let max = max_in(TokenAmount::from(100u64), Percentage::from_percent(dec!(0.5))).unwrap();
        assert_eq!(max, TokenAmount::from(101u64));
    }

    #[test]
    fn test_bounds_bracket_amount() {
        let amount = TokenAmount::from(123_456_789u64);
        for pct in [dec!(0.01), dec!(0.5), dec!(5), dec!(50)] {
            let slippage = Percentage::from_percent(pct);
            assert!(min_out(amount, slippage).unwrap() <= amount);
            assert!(max_in(amount, slippage).unwrap() >= amount);
        }
    }

    #[test]
    fn test_tiny_slippage_converges_to_amount() {
        let amount = TokenAmount::from(1_000_000u64);
        let slippage = Percentage::from_percent(dec!(0.000001));
        assert_eq!(min_out(amount, slippage).unwrap(), TokenAmount::from(999_999u64));
        assert_eq!(max_in(amount, slippage).unwrap(), TokenAmount::from(1_000_001u64));
    }

    #[test]
    fn test_non_positive_slippage_rejected() {
        let amount = TokenAmount::from(100u64);
        assert_eq!(
            min_out(amount, Percentage::from_percent(Decimal::ZERO)).unwrap_err(),
            SlippageError::InvalidSlippage
        );
        assert_eq!(
            max_in(amount, Percentage::from_percent(dec!(-1))).unwrap_err(),
            SlippageError::InvalidSlippage
        );
    }

    #[test]
    fn test_full_slippage_permitted() {
        // 100% tolerance is not clamped; the bound simply reaches zero.
        let out = min_out(TokenAmount::from(100u64), Percentage::from_percent(dec!(100))).unwrap();
        assert_eq!(out, TokenAmount::zero());
    }
}
