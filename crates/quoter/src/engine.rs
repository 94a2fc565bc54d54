use crate::quote::Quote;
use powerperp_domain::math::swap::{
    amount0_delta, amount1_delta, next_sqrt_price_from_token0_in, next_sqrt_price_from_token0_out,
    next_sqrt_price_from_token1_in, next_sqrt_price_from_token1_out,
};
use powerperp_domain::math::tick::{decode_sqrt_price_x96, sqrt_price_at_tick};
use powerperp_domain::pool::PoolStateError;
use powerperp_domain::value_objects::amount::{decimal_from_u256, raw_ceil, raw_floor};
use powerperp_domain::{MathError, PoolState, TickData, Token, TokenAmount};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuoteError {
    /// The requested amount cannot be filled within the snapshot's tick
    /// data.
    #[error("requested amount exceeds available pool liquidity")]
    InsufficientLiquidity,
    #[error("token {0} is not part of the pool pair")]
    UnknownToken(String),
    #[error("token_in and token_out must be the two distinct pool tokens")]
    SameToken,
    #[error("pool snapshot failed validation: {0}")]
    InvalidSnapshot(#[from] PoolStateError),
    /// Crossing a tick drove the running liquidity negative; the snapshot
    /// is internally inconsistent.
    #[error("tick data inconsistent with pool liquidity")]
    CorruptTickData,
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Simulates an exact-input trade against the snapshot and returns the
/// output amount plus price impact.
///
/// A zero input is a no-op quote, not an error. The quote is only valid for
/// the snapshot it was computed from.
pub fn quote_given_input(
    pool: &PoolState,
    token_in: &Token,
    token_out: &Token,
    raw_amount_in: TokenAmount,
) -> Result<Quote, QuoteError> {
    let direction = resolve_direction(pool, token_in, token_out)?;
    if raw_amount_in.is_zero() {
        return Ok(Quote::no_op());
    }
    pool.validate()?;

    let gross_in = decimal_from_u256(raw_amount_in.0).map_err(QuoteError::from)?;
    let walk = walk_exact_input(pool, direction, gross_in)?;

    let quote = Quote {
        amount: raw_floor(walk.amount_out).map_err(QuoteError::from)?,
        price_impact_pct: price_impact(pool, direction, walk.net_in, walk.amount_out)?,
    };
    debug!(
        amount_in = %raw_amount_in,
        amount_out = %quote.amount,
        impact_pct = %quote.price_impact_pct,
        zero_for_one = direction.zero_for_one,
        "exact-input quote"
    );
    Ok(quote)
}

/// Simulates an exact-output trade against the snapshot and returns the
/// required input amount plus price impact.
pub fn quote_given_output(
    pool: &PoolState,
    token_in: &Token,
    token_out: &Token,
    raw_amount_out: TokenAmount,
) -> Result<Quote, QuoteError> {
    let direction = resolve_direction(pool, token_in, token_out)?;
    if raw_amount_out.is_zero() {
        return Ok(Quote::no_op());
    }
    pool.validate()?;

    let amount_out = decimal_from_u256(raw_amount_out.0).map_err(QuoteError::from)?;
    let walk = walk_exact_output(pool, direction, amount_out)?;

    let quote = Quote {
        amount: raw_ceil(walk.gross_in).map_err(QuoteError::from)?,
        price_impact_pct: price_impact(pool, direction, walk.net_in, amount_out)?,
    };
    debug!(
        amount_out = %raw_amount_out,
        amount_in = %quote.amount,
        impact_pct = %quote.price_impact_pct,
        zero_for_one = direction.zero_for_one,
        "exact-output quote"
    );
    Ok(quote)
}

#[derive(Debug, Clone, Copy)]
struct Direction {
    /// true when token0 is the input side, so the price walks down.
    zero_for_one: bool,
}

fn resolve_direction(
    pool: &PoolState,
    token_in: &Token,
    token_out: &Token,
) -> Result<Direction, QuoteError> {
    let in_is_token0 = pool
        .position_of(token_in)
        .ok_or_else(|| QuoteError::UnknownToken(token_in.address.clone()))?;
    let out_is_token0 = pool
        .position_of(token_out)
        .ok_or_else(|| QuoteError::UnknownToken(token_out.address.clone()))?;
    if in_is_token0 == out_is_token0 {
        return Err(QuoteError::SameToken);
    }
    Ok(Direction {
        zero_for_one: in_is_token0,
    })
}

struct WalkState {
    sqrt_price: Decimal,
    liquidity: u128,
    /// Input consumed net of fees.
    net_in: Decimal,
    amount_out: Decimal,
    gross_in: Decimal,
}

struct ExactInResult {
    net_in: Decimal,
    amount_out: Decimal,
}

struct ExactOutResult {
    net_in: Decimal,
    gross_in: Decimal,
}

/// Boundaries ahead of the walk, nearest first.
fn boundaries(pool: &PoolState, direction: Direction) -> Vec<TickData> {
    if direction.zero_for_one {
        pool.ticks_below(pool.tick).copied().collect()
    } else {
        pool.ticks_above(pool.tick).copied().collect()
    }
}

/// Clamps a boundary target so the walk never moves against its direction;
/// tick-derived prices can land a hair past the snapshot's own sqrt price.
fn clamp_target(target: Decimal, current: Decimal, direction: Direction) -> Decimal {
    if direction.zero_for_one {
        target.min(current)
    } else {
        target.max(current)
    }
}

fn cross(state: &mut WalkState, tick: &TickData, direction: Direction) -> Result<(), QuoteError> {
    // liquidity_net is defined for left-to-right crossings; flip it when
    // walking down.
    let signed = if direction.zero_for_one {
        tick.liquidity_net.checked_neg().ok_or(QuoteError::CorruptTickData)?
    } else {
        tick.liquidity_net
    };
    state.liquidity = if signed >= 0 {
        state
            .liquidity
            .checked_add(signed.unsigned_abs())
            .ok_or(QuoteError::CorruptTickData)?
    } else {
        state
            .liquidity
            .checked_sub(signed.unsigned_abs())
            .ok_or(QuoteError::CorruptTickData)?
    };
    Ok(())
}

fn walk_exact_input(
    pool: &PoolState,
    direction: Direction,
    gross_in: Decimal,
) -> Result<ExactInResult, QuoteError> {
    let one_minus_fee = Decimal::ONE - pool.fee_tier.fraction();
    let mut state = WalkState {
        sqrt_price: decode_sqrt_price_x96(pool.sqrt_price_x96).map_err(QuoteError::from)?,
        liquidity: pool.liquidity,
        net_in: Decimal::ZERO,
        amount_out: Decimal::ZERO,
        gross_in: Decimal::ZERO,
    };
    let mut remaining = gross_in;

    for tick in boundaries(pool, direction) {
        if remaining <= Decimal::ZERO {
            break;
        }
        let target = clamp_target(
            sqrt_price_at_tick(tick.index).map_err(QuoteError::from)?,
            state.sqrt_price,
            direction,
        );

        if state.liquidity > 0 {
            let max_net_in = if direction.zero_for_one {
                amount0_delta(state.liquidity, target, state.sqrt_price)?
            } else {
                amount1_delta(state.liquidity, state.sqrt_price, target)?
            };
            let net_remaining = remaining * one_minus_fee;

            if net_remaining < max_net_in {
                // The trade settles inside this range.
                let next = if direction.zero_for_one {
                    next_sqrt_price_from_token0_in(state.sqrt_price, state.liquidity, net_remaining)?
                } else {
                    next_sqrt_price_from_token1_in(state.sqrt_price, state.liquidity, net_remaining)?
                };
                let out = out_delta(&state, next, direction)?;
                state.amount_out += out;
                state.net_in += net_remaining;
                return Ok(ExactInResult {
                    net_in: state.net_in,
                    amount_out: state.amount_out,
                });
            }

            // Consume the whole range, then cross.
            let out = out_delta(&state, target, direction)?;
            state.amount_out += out;
            state.net_in += max_net_in;
            remaining = (remaining - max_net_in / one_minus_fee).max(Decimal::ZERO);
        }

        state.sqrt_price = target;
        cross(&mut state, &tick, direction)?;
    }

    if remaining > Decimal::ZERO {
        return Err(QuoteError::InsufficientLiquidity);
    }
    Ok(ExactInResult {
        net_in: state.net_in,
        amount_out: state.amount_out,
    })
}

fn walk_exact_output(
    pool: &PoolState,
    direction: Direction,
    amount_out: Decimal,
) -> Result<ExactOutResult, QuoteError> {
    let one_minus_fee = Decimal::ONE - pool.fee_tier.fraction();
    let mut state = WalkState {
        sqrt_price: decode_sqrt_price_x96(pool.sqrt_price_x96).map_err(QuoteError::from)?,
        liquidity: pool.liquidity,
        net_in: Decimal::ZERO,
        amount_out: Decimal::ZERO,
        gross_in: Decimal::ZERO,
    };
    let mut remaining_out = amount_out;

    for tick in boundaries(pool, direction) {
        if remaining_out <= Decimal::ZERO {
            break;
        }
        let target = clamp_target(
            sqrt_price_at_tick(tick.index).map_err(QuoteError::from)?,
            state.sqrt_price,
            direction,
        );

        if state.liquidity > 0 {
            let max_out = if direction.zero_for_one {
                amount1_delta(state.liquidity, target, state.sqrt_price)?
            } else {
                amount0_delta(state.liquidity, state.sqrt_price, target)?
            };

            if remaining_out < max_out {
                // The trade settles inside this range.
                let next = if direction.zero_for_one {
                    next_sqrt_price_from_token1_out(state.sqrt_price, state.liquidity, remaining_out)?
                } else {
                    next_sqrt_price_from_token0_out(state.sqrt_price, state.liquidity, remaining_out)?
                };
                let net_in = in_delta(&state, next, direction)?;
                state.net_in += net_in;
                state.gross_in += net_in / one_minus_fee;
                return Ok(ExactOutResult {
                    net_in: state.net_in,
                    gross_in: state.gross_in,
                });
            }

            // Drain the whole range, then cross.
            let net_in = in_delta(&state, target, direction)?;
            state.net_in += net_in;
            state.gross_in += net_in / one_minus_fee;
            remaining_out -= max_out;
        }

        state.sqrt_price = target;
        cross(&mut state, &tick, direction)?;
    }

    if remaining_out > Decimal::ZERO {
        return Err(QuoteError::InsufficientLiquidity);
    }
    Ok(ExactOutResult {
        net_in: state.net_in,
        gross_in: state.gross_in,
    })
}

/// Output-token amount released moving from the walk's sqrt price to `next`.
fn out_delta(state: &WalkState, next: Decimal, direction: Direction) -> Result<Decimal, MathError> {
    if direction.zero_for_one {
        amount1_delta(state.liquidity, next, state.sqrt_price)
    } else {
        amount0_delta(state.liquidity, state.sqrt_price, next)
    }
}

/// Input-token amount absorbed moving from the walk's sqrt price to `next`.
fn in_delta(state: &WalkState, next: Decimal, direction: Direction) -> Result<Decimal, MathError> {
    if direction.zero_for_one {
        amount0_delta(state.liquidity, next, state.sqrt_price)
    } else {
        amount1_delta(state.liquidity, state.sqrt_price, next)
    }
}

/// Relative difference between the spot price before the trade and the
/// effective execution price, on fee-net amounts, in percent rounded to two
/// places.
fn price_impact(
    pool: &PoolState,
    direction: Direction,
    net_in: Decimal,
    amount_out: Decimal,
) -> Result<Decimal, QuoteError> {
    if net_in.is_zero() || amount_out.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let sqrt_price = decode_sqrt_price_x96(pool.sqrt_price_x96).map_err(QuoteError::from)?;
    let price = sqrt_price
        .checked_mul(sqrt_price)
        .ok_or(QuoteError::Math(MathError::Overflow))?;
    // Spot price expressed as output token per input token.
    let spot = if direction.zero_for_one {
        price
    } else {
        Decimal::ONE / price
    };
    let executed = amount_out / net_in;
    let impact = (spot - executed) / spot * Decimal::from(100);
    Ok(impact.max(Decimal::ZERO).round_dp(2))
}
