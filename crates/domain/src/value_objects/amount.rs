use crate::error::MathError;
use crate::token::TokenAmount;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// A token amount paired with its decimal scale.
///
/// Arithmetic between amounts of different scales must first normalize to the
/// raw integer representation; display goes the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    pub raw: U256,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self {
            raw: U256::zero(),
            decimals,
        }
    }

    /// Converts a human-decimal value to its raw representation, flooring to
    /// the smallest unit.
    pub fn from_decimal(d: Decimal, decimals: u8) -> Result<Self, MathError> {
        if d.is_sign_negative() {
            return Err(MathError::NegativeAmount);
        }
        let multiplier =
            Decimal::from_u64(10u64.pow(u32::from(decimals))).ok_or(MathError::Overflow)?;
        let raw = (d * multiplier).floor();
        let raw_u128 = raw.to_u128().ok_or(MathError::Overflow)?;
        Ok(Self {
            raw: U256::from(raw_u128),
            decimals,
        })
    }

    /// Converts the raw representation back to a human-decimal value.
    pub fn to_decimal(&self) -> Result<Decimal, MathError> {
        let d = decimal_from_u256(self.raw)?;
        let divisor =
            Decimal::from_u64(10u64.pow(u32::from(self.decimals))).ok_or(MathError::Overflow)?;
        Ok(d / divisor)
    }

    pub fn token_amount(&self) -> TokenAmount {
        TokenAmount(self.raw)
    }
}

/// Converts a raw `U256` into a `Decimal`, failing when it exceeds the
/// 96-bit mantissa `Decimal` can hold.
pub fn decimal_from_u256(value: U256) -> Result<Decimal, MathError> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Decimal::from_u128(value.as_u128()).ok_or(MathError::Overflow)
}

/// Floors a non-negative decimal raw amount into a `TokenAmount`.
pub fn raw_floor(value: Decimal) -> Result<TokenAmount, MathError> {
    if value.is_sign_negative() {
        return Err(MathError::NegativeAmount);
    }
    let floored = value.floor().to_u128().ok_or(MathError::Overflow)?;
    Ok(TokenAmount(U256::from(floored)))
}

/// Ceils a non-negative decimal raw amount into a `TokenAmount`.
pub fn raw_ceil(value: Decimal) -> Result<TokenAmount, MathError> {
    if value.is_sign_negative() {
        return Err(MathError::NegativeAmount);
    }
    let ceiled = value.ceil().to_u128().ok_or(MathError::Overflow)?;
    Ok(TokenAmount(U256::from(ceiled)))
}
