//! Balance- and position-driven trade decisions.
//!
//! The UI layer asks this module whether an intent is executable before a
//! quote is ever submitted: a long cannot be opened over a live short,
//! buys are capped by the native balance and sells by the held derivative
//! amount.

use crate::params::{TradeIntent, TradeSide};
use powerperp_domain::value_objects::amount::decimal_from_u256;
use powerperp_domain::{Amount, MathError, TokenAmount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The wallet's current exposure and spendable balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Holdings {
    /// Derivative tokens held long.
    pub long: TokenAmount,
    /// Derivative tokens owed short.
    pub short: TokenAmount,
    /// Spendable native balance in raw 18-decimal units.
    pub balance_native: TokenAmount,
}

/// What an intent amounts to against the current holdings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDecision {
    /// Executable as-is; opens or increases exposure.
    Open,
    /// Executable; reduces or closes the existing long.
    ClosesExisting,
    /// A live short blocks opening a long; it must be closed first.
    BlockedByShort,
    /// Not enough balance on the spending side.
    InsufficientBalance { available: TokenAmount },
}

/// Decides whether an intent is executable. `required_native` is the
/// native amount the trade would attach (the exact or bounded input leg).
pub fn decide(
    intent: &TradeIntent,
    holdings: &Holdings,
    required_native: TokenAmount,
) -> TradeDecision {
    match intent.side {
        TradeSide::Buy => {
            if !holdings.short.is_zero() {
                return TradeDecision::BlockedByShort;
            }
            if required_native > holdings.balance_native {
                return TradeDecision::InsufficientBalance {
                    available: holdings.balance_native,
                };
            }
            TradeDecision::Open
        }
        TradeSide::Sell => {
            // Only held tokens can be sold; shorting is a separate minting
            // flow, not a pool trade.
            if intent.amount > holdings.long {
                return TradeDecision::InsufficientBalance {
                    available: holdings.long,
                };
            }
            TradeDecision::ClosesExisting
        }
    }
}

/// Value of a derivative position in base-asset terms.
pub fn position_value_in_base(
    position: Amount,
    derivative_price_in_base: Decimal,
) -> Result<Decimal, MathError> {
    Ok(position.to_decimal()? * derivative_price_in_base)
}

/// Value of a derivative position in USD, via the base asset's USD price.
pub fn position_value_usd(
    position: Amount,
    derivative_price_in_base: Decimal,
    base_usd_price: Decimal,
) -> Result<Decimal, MathError> {
    Ok(position_value_in_base(position, derivative_price_in_base)? * base_usd_price)
}

/// Whether a strategy deposit of `amount` native units is affordable.
pub fn can_deposit(amount: TokenAmount, balance_native: TokenAmount) -> bool {
    !amount.is_zero() && amount <= balance_native
}

/// Whether a strategy withdrawal of `lp_amount` is covered by held shares.
pub fn can_withdraw(lp_amount: TokenAmount, lp_balance: TokenAmount) -> bool {
    !lp_amount.is_zero() && lp_amount <= lp_balance
}

/// Human-readable exposure from a raw long amount, for display layers.
pub fn exposure_display(long: TokenAmount, decimals: u8) -> Result<Decimal, MathError> {
    let raw = decimal_from_u256(long.0)?;
    let divisor = Decimal::from(10u64.pow(u32::from(decimals)));
    Ok(raw / divisor)
}
