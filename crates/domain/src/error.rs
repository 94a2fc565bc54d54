use thiserror::Error;

/// Errors from the tick/price/amount math.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MathError {
    #[error("amount overflows the supported numeric range")]
    Overflow,
    #[error("sqrt price must be positive")]
    NonPositiveSqrtPrice,
    #[error("price must be positive")]
    NonPositivePrice,
    #[error("amount must be non-negative")]
    NegativeAmount,
    #[error("division by zero")]
    DivisionByZero,
}
