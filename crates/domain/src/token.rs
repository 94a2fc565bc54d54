use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimals of the wrapped native asset (the base leg of the pool).
pub const WRAPPED_NATIVE_DECIMALS: u8 = 18;

/// Decimals of the power-perpetual token. Fixed per deployment.
pub const POWER_TOKEN_DECIMALS: u8 = 14;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
    pub name: String,
}

impl Token {
    pub fn new(
        address: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        name: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
            decimals,
            name: name.into(),
        }
    }

    /// The 18-decimal wrapped native asset.
    pub fn wrapped_native(address: impl Into<String>) -> Self {
        Self::new(address, "WETH", WRAPPED_NATIVE_DECIMALS, "Wrapped Ether")
    }

    /// The power-perpetual token.
    pub fn power_perp(address: impl Into<String>) -> Self {
        Self::new(address, "PWRP", POWER_TOKEN_DECIMALS, "Power Perpetual")
    }

    /// Whether this token sorts as token0 against `other` (lower address).
    pub fn is_token0_against(&self, other: &Token) -> bool {
        self.address.to_lowercase() < other.address.to_lowercase()
    }
}

/// An integer token amount in the token's smallest indivisible unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    pub fn new(amount: impl Into<U256>) -> Self {
        Self(amount.into())
    }

    pub fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<u64> for TokenAmount {
    fn from(v: u64) -> Self {
        Self(U256::from(v))
    }
}

impl From<u128> for TokenAmount {
    fn from(v: u128) -> Self {
        Self(U256::from(v))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
