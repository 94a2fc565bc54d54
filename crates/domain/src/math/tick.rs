use crate::error::MathError;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Minimum tick index supported by the pool contracts.
pub const MIN_TICK: i32 = -887272;
/// Maximum tick index supported by the pool contracts.
pub const MAX_TICK: i32 = 887272;

/// Returns the raw token1/token0 price at a given tick.
/// P = 1.0001 ^ tick
pub fn tick_to_price(tick: i32) -> Result<Decimal, MathError> {
    let base = 1.0001f64;
    let price = base.powi(tick);
    Decimal::from_f64(price).ok_or(MathError::Overflow)
}

/// Returns the tick whose price is nearest to the given raw price.
/// tick = log_1.0001(P)
pub fn price_to_tick(price: Decimal) -> Result<i32, MathError> {
    if price <= Decimal::ZERO {
        return Err(MathError::NonPositivePrice);
    }
    let price_f64 = price.to_f64().ok_or(MathError::Overflow)?;
    let tick = price_f64.log(1.0001f64);
    Ok(tick.round() as i32)
}

/// Returns sqrt(P) at a given tick.
/// sqrt(P) = 1.0001 ^ (tick / 2)
pub fn sqrt_price_at_tick(tick: i32) -> Result<Decimal, MathError> {
    let base = 1.0001f64;
    let sqrt_price = base.powf(f64::from(tick) / 2.0);
    let d = Decimal::from_f64(sqrt_price).ok_or(MathError::Overflow)?;
    if d <= Decimal::ZERO {
        return Err(MathError::NonPositiveSqrtPrice);
    }
    Ok(d)
}

/// Decodes a Q64.96 square-root price into a plain decimal sqrt price.
pub fn decode_sqrt_price_x96(sqrt_price_x96: U256) -> Result<Decimal, MathError> {
    if sqrt_price_x96.is_zero() {
        return Err(MathError::NonPositiveSqrtPrice);
    }
    let scale = U256::from(10u128.pow(18));
    let scaled = sqrt_price_x96
        .checked_mul(scale)
        .ok_or(MathError::Overflow)?
        >> 96;
    if scaled > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    let mantissa = i128::try_from(scaled.as_u128()).map_err(|_| MathError::Overflow)?;
    Decimal::try_from_i128_with_scale(mantissa, 18).map_err(|_| MathError::Overflow)
}

/// Encodes a raw token1/token0 price as a Q64.96 square-root price.
///
/// Precision is bounded by the f64 square root, which matches how tick
/// prices themselves are derived.
pub fn sqrt_price_x96_from_price(price: Decimal) -> Result<U256, MathError> {
    if price <= Decimal::ZERO {
        return Err(MathError::NonPositivePrice);
    }
    let sqrt = price.to_f64().ok_or(MathError::Overflow)?.sqrt();
    let mantissa = (sqrt * 1e18) as u128;
    let scale = U256::from(10u128.pow(18));
    let shifted = U256::from(mantissa)
        .checked_mul(U256::one() << 96)
        .ok_or(MathError::Overflow)?;
    Ok(shifted / scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tick_to_price() {
        // Tick 0 -> Price 1
        assert_eq!(tick_to_price(0).unwrap(), Decimal::from(1));

        // Tick 100 -> 1.0001^100 ~= 1.010049
        let p100 = tick_to_price(100).unwrap();
        let diff = (p100.to_f64().unwrap() - 1.01004966).abs();
        assert!(diff < 0.000001);
    }

    #[test]
    fn test_price_to_tick() {
        assert_eq!(price_to_tick(Decimal::from(1)).unwrap(), 0);
        assert_eq!(
            price_to_tick(Decimal::from_f64(1.01004966).unwrap()).unwrap(),
            100
        );
        assert_eq!(
            price_to_tick(Decimal::ZERO).unwrap_err(),
            MathError::NonPositivePrice
        );
    }

    #[test]
    fn test_sqrt_price_at_tick() {
        assert_eq!(sqrt_price_at_tick(0).unwrap(), Decimal::from(1));

        // sqrt(1.0001^200) = 1.0001^100
        let s = sqrt_price_at_tick(200).unwrap();
        let p = tick_to_price(100).unwrap();
        let diff = (s - p).abs();
        assert!(diff < dec!(0.0000001));
    }

    #[test]
    fn test_x96_round_trip() {
        let x96 = sqrt_price_x96_from_price(dec!(20000000)).unwrap();
        let sqrt = decode_sqrt_price_x96(x96).unwrap();
        // sqrt(2e7) ~= 4472.135955
        let diff = (sqrt - dec!(4472.135955)).abs();
        assert!(diff < dec!(0.0001), "got {sqrt}");
    }

    #[test]
    fn test_x96_price_one() {
        let x96 = sqrt_price_x96_from_price(Decimal::ONE).unwrap();
        assert_eq!(x96, U256::one() << 96);
        assert_eq!(decode_sqrt_price_x96(x96).unwrap(), Decimal::ONE);
    }
}
