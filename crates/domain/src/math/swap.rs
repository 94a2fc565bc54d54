use crate::error::MathError;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

fn liquidity_dec(liquidity: u128) -> Result<Decimal, MathError> {
    Decimal::from_u128(liquidity).ok_or(MathError::Overflow)
}

fn order(a: Decimal, b: Decimal) -> (Decimal, Decimal) {
    if a < b { (a, b) } else { (b, a) }
}

/// Amount of token0 moved across a sqrt-price range for a given liquidity.
/// delta_x = L * (sqrt(P_b) - sqrt(P_a)) / (sqrt(P_a) * sqrt(P_b))
pub fn amount0_delta(
    liquidity: u128,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
) -> Result<Decimal, MathError> {
    if sqrt_price_a <= Decimal::ZERO || sqrt_price_b <= Decimal::ZERO {
        return Err(MathError::NonPositiveSqrtPrice);
    }
    let (lower, upper) = order(sqrt_price_a, sqrt_price_b);
    let den = lower.checked_mul(upper).ok_or(MathError::Overflow)?;
    if den.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let factor = (upper - lower) / den;
    liquidity_dec(liquidity)?
        .checked_mul(factor)
        .ok_or(MathError::Overflow)
}

/// Amount of token1 moved across a sqrt-price range for a given liquidity.
/// delta_y = L * (sqrt(P_b) - sqrt(P_a))
pub fn amount1_delta(
    liquidity: u128,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
) -> Result<Decimal, MathError> {
    let (lower, upper) = order(sqrt_price_a, sqrt_price_b);
    liquidity_dec(liquidity)?
        .checked_mul(upper - lower)
        .ok_or(MathError::Overflow)
}

/// Sqrt price after adding `amount_in` of token0 to the pool (price falls).
/// sqrt(P') = L * sqrt(P) / (L + dx * sqrt(P))
pub fn next_sqrt_price_from_token0_in(
    sqrt_price: Decimal,
    liquidity: u128,
    amount_in: Decimal,
) -> Result<Decimal, MathError> {
    let l = liquidity_dec(liquidity)?;
    let num = l.checked_mul(sqrt_price).ok_or(MathError::Overflow)?;
    let den = l
        .checked_add(
            amount_in
                .checked_mul(sqrt_price)
                .ok_or(MathError::Overflow)?,
        )
        .ok_or(MathError::Overflow)?;
    if den <= Decimal::ZERO {
        return Err(MathError::DivisionByZero);
    }
    Ok(num / den)
}

/// Sqrt price after adding `amount_in` of token1 to the pool (price rises).
/// sqrt(P') = sqrt(P) + dy / L
pub fn next_sqrt_price_from_token1_in(
    sqrt_price: Decimal,
    liquidity: u128,
    amount_in: Decimal,
) -> Result<Decimal, MathError> {
    let l = liquidity_dec(liquidity)?;
    if l.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    sqrt_price
        .checked_add(amount_in / l)
        .ok_or(MathError::Overflow)
}

/// Sqrt price after removing `amount_out` of token0 from the pool (price
/// rises). sqrt(P') = L * sqrt(P) / (L - dx * sqrt(P))
pub fn next_sqrt_price_from_token0_out(
    sqrt_price: Decimal,
    liquidity: u128,
    amount_out: Decimal,
) -> Result<Decimal, MathError> {
    let l = liquidity_dec(liquidity)?;
    let num = l.checked_mul(sqrt_price).ok_or(MathError::Overflow)?;
    let den = l
        .checked_sub(
            amount_out
                .checked_mul(sqrt_price)
                .ok_or(MathError::Overflow)?,
        )
        .ok_or(MathError::Overflow)?;
    if den <= Decimal::ZERO {
        return Err(MathError::DivisionByZero);
    }
    Ok(num / den)
}

/// Sqrt price after removing `amount_out` of token1 from the pool (price
/// falls). sqrt(P') = sqrt(P) - dy / L
pub fn next_sqrt_price_from_token1_out(
    sqrt_price: Decimal,
    liquidity: u128,
    amount_out: Decimal,
) -> Result<Decimal, MathError> {
    let l = liquidity_dec(liquidity)?;
    if l.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let next = sqrt_price
        .checked_sub(amount_out / l)
        .ok_or(MathError::Overflow)?;
    if next <= Decimal::ZERO {
        return Err(MathError::NonPositiveSqrtPrice);
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_deltas() {
        // Liquidity 1000, sqrt price from 1 to 2:
        // delta_y = 1000 * (2 - 1) = 1000
        // delta_x = 1000 * (1/1 - 1/2) = 500
        let dy = amount1_delta(1000, dec!(1), dec!(2)).unwrap();
        assert_eq!(dy, dec!(1000));

        let dx = amount0_delta(1000, dec!(1), dec!(2)).unwrap();
        assert_eq!(dx, dec!(500));
    }

    #[test]
    fn test_deltas_order_independent() {
        let a = amount1_delta(1000, dec!(1), dec!(2)).unwrap();
        let b = amount1_delta(1000, dec!(2), dec!(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_next_sqrt_price_inverts_deltas() {
        // Pushing 500 of token0 in at sqrt 2 with L=1000 lands at sqrt 1,
        // the same range the delta functions measure.
        let next = next_sqrt_price_from_token0_in(dec!(2), 1000, dec!(500)).unwrap();
        assert_eq!(next, dec!(1));

        // Pushing 1000 of token1 in at sqrt 1 lands back at sqrt 2.
        let next = next_sqrt_price_from_token1_in(dec!(1), 1000, dec!(1000)).unwrap();
        assert_eq!(next, dec!(2));

        // And the exact-output variants walk the same boundaries.
        let next = next_sqrt_price_from_token0_out(dec!(1), 1000, dec!(500)).unwrap();
        assert_eq!(next, dec!(2));
        let next = next_sqrt_price_from_token1_out(dec!(2), 1000, dec!(1000)).unwrap();
        assert_eq!(next, dec!(1));
    }

    #[test]
    fn test_zero_liquidity_rejected() {
        assert_eq!(
            next_sqrt_price_from_token1_in(dec!(1), 0, dec!(10)).unwrap_err(),
            MathError::DivisionByZero
        );
    }

    #[test]
    fn test_draining_range_rejected() {
        // Removing more token1 than the curve holds above zero.
        assert_eq!(
            next_sqrt_price_from_token1_out(dec!(1), 1000, dec!(1000)).unwrap_err(),
            MathError::NonPositiveSqrtPrice
        );
    }
}
