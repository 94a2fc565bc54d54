use crate::math::tick::{MAX_TICK, MIN_TICK};
use crate::token::Token;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed fee tiers a pool can be deployed with, in hundredths of a bip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeTier {
    /// 0.05%
    Low,
    /// 0.3%
    Medium,
    /// 1%
    High,
}

impl FeeTier {
    pub fn from_raw(fee: u32) -> Option<Self> {
        match fee {
            500 => Some(Self::Low),
            3000 => Some(Self::Medium),
            10000 => Some(Self::High),
            _ => None,
        }
    }

    /// Fee in hundredths of a bip, the on-chain encoding.
    pub fn as_raw(&self) -> u32 {
        match self {
            Self::Low => 500,
            Self::Medium => 3000,
            Self::High => 10000,
        }
    }

    /// Fee as a fraction of the input amount.
    pub fn fraction(&self) -> rust_decimal::Decimal {
        rust_decimal::Decimal::from(self.as_raw()) / rust_decimal::Decimal::from(1_000_000)
    }

    pub fn tick_spacing(&self) -> i32 {
        match self {
            Self::Low => 10,
            Self::Medium => 60,
            Self::High => 200,
        }
    }
}

/// Net liquidity change at an initialized tick, applied when the tick is
/// crossed going left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickData {
    pub index: i32,
    pub liquidity_net: i128,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolStateError {
    #[error("tick data must be sorted strictly ascending (index {0} out of order)")]
    UnsortedTicks(i32),
    #[error("tick index {0} outside the valid tick range")]
    TickOutOfRange(i32),
    #[error("current tick {0} outside the valid tick range")]
    CurrentTickOutOfRange(i32),
}

/// An immutable snapshot of pool state.
///
/// Snapshots are replaced wholesale on refresh, never mutated; quotes derived
/// from one snapshot are not valid against another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolState {
    pub token0: Token,
    pub token1: Token,
    pub fee_tier: FeeTier,
    /// Q64.96 square root of the raw token1/token0 price.
    pub sqrt_price_x96: U256,
    pub tick: i32,
    /// Liquidity active at the current tick.
    pub liquidity: u128,
    /// Initialized ticks, sorted ascending by index.
    pub ticks: Vec<TickData>,
}

impl PoolState {
    /// Checks the snapshot invariants: strictly ascending tick order and
    /// in-range tick indices.
    pub fn validate(&self) -> Result<(), PoolStateError> {
        if self.tick < MIN_TICK || self.tick > MAX_TICK {
            return Err(PoolStateError::CurrentTickOutOfRange(self.tick));
        }
        let mut prev: Option<i32> = None;
        for tick in &self.ticks {
            if tick.index < MIN_TICK || tick.index > MAX_TICK {
                return Err(PoolStateError::TickOutOfRange(tick.index));
            }
            if let Some(p) = prev {
                if tick.index <= p {
                    return Err(PoolStateError::UnsortedTicks(tick.index));
                }
            }
            prev = Some(tick.index);
        }
        Ok(())
    }

    /// Raw token1/token0 price at the snapshot's sqrt price.
    pub fn price_token1_per_token0(&self) -> Result<rust_decimal::Decimal, crate::error::MathError> {
        let sqrt = crate::math::tick::decode_sqrt_price_x96(self.sqrt_price_x96)?;
        sqrt.checked_mul(sqrt)
            .ok_or(crate::error::MathError::Overflow)
    }

    /// Whether `token` is this pool's token0. `None` when the token is not
    /// part of the pair.
    pub fn position_of(&self, token: &Token) -> Option<bool> {
        if token.address.eq_ignore_ascii_case(&self.token0.address) {
            Some(true)
        } else if token.address.eq_ignore_ascii_case(&self.token1.address) {
            Some(false)
        } else {
            None
        }
    }

    /// Initialized ticks at or below `tick`, nearest first.
    pub fn ticks_below(&self, tick: i32) -> impl Iterator<Item = &TickData> {
        self.ticks.iter().rev().filter(move |t| t.index <= tick)
    }

    /// Initialized ticks strictly above `tick`, nearest first.
    pub fn ticks_above(&self, tick: i32) -> impl Iterator<Item = &TickData> {
        self.ticks.iter().filter(move |t| t.index > tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Token, Token) {
        (
            Token::wrapped_native("0xaaa0000000000000000000000000000000000001"),
            Token::power_perp("0xbbb0000000000000000000000000000000000002"),
        )
    }

    fn snapshot(ticks: Vec<TickData>) -> PoolState {
        let (token0, token1) = pair();
        PoolState {
            token0,
            token1,
            fee_tier: FeeTier::Medium,
            sqrt_price_x96: U256::from(1u64) << 96,
            tick: 0,
            liquidity: 1_000_000,
            ticks,
        }
    }

    #[test]
    fn test_fee_tier_fraction() {
        assert_eq!(FeeTier::Medium.as_raw(), 3000);
        assert_eq!(
            FeeTier::Medium.fraction(),
            rust_decimal::Decimal::new(3, 3) // 0.003
        );
        assert_eq!(FeeTier::from_raw(500), Some(FeeTier::Low));
        assert_eq!(FeeTier::from_raw(123), None);
    }

    #[test]
    fn test_validate_sorted() {
        let ok = snapshot(vec![
            TickData { index: -120, liquidity_net: 5 },
            TickData { index: 60, liquidity_net: -5 },
        ]);
        assert!(ok.validate().is_ok());

        let bad = snapshot(vec![
            TickData { index: 60, liquidity_net: -5 },
            TickData { index: -120, liquidity_net: 5 },
        ]);
        assert_eq!(bad.validate().unwrap_err(), PoolStateError::UnsortedTicks(-120));
    }

    #[test]
    fn test_tick_iteration_direction() {
        let pool = snapshot(vec![
            TickData { index: -120, liquidity_net: 5 },
            TickData { index: -60, liquidity_net: 3 },
            TickData { index: 60, liquidity_net: -3 },
        ]);

        let below: Vec<i32> = pool.ticks_below(0).map(|t| t.index).collect();
        assert_eq!(below, vec![-60, -120]);

        let above: Vec<i32> = pool.ticks_above(0).map(|t| t.index).collect();
        assert_eq!(above, vec![60]);
    }

    #[test]
    fn test_price_from_sqrt() {
        // sqrt_price_x96 of exactly 2^96 is a raw price of 1.
        let pool = snapshot(vec![]);
        assert_eq!(
            pool.price_token1_per_token0().unwrap(),
            rust_decimal::Decimal::ONE
        );
    }

    #[test]
    fn test_position_of() {
        let pool = snapshot(vec![]);
        assert_eq!(pool.position_of(&pool.token0.clone()), Some(true));
        assert_eq!(pool.position_of(&pool.token1.clone()), Some(false));
        let stranger = Token::new("0xccc", "X", 18, "Other");
        assert_eq!(pool.position_of(&stranger), None);
    }
}
