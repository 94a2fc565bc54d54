use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A percentage value stored as a fraction (0.005 = 0.5%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percentage(pub Decimal);

impl Percentage {
    pub fn from_bps(bps: u32) -> Self {
        Self(Decimal::from(bps) / Decimal::from(10000))
    }

    /// Builds from a human percent figure, e.g. `0.5` meaning 0.5%.
    pub fn from_percent(percent: Decimal) -> Self {
        Self(percent / Decimal::from(100))
    }

    pub fn to_bps(&self) -> u32 {
        (self.0 * Decimal::from(10000)).to_u32().unwrap_or(0)
    }

    pub fn as_fraction(&self) -> Decimal {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_and_bps_agree() {
        assert_eq!(Percentage::from_percent(dec!(0.5)), Percentage::from_bps(50));
        assert_eq!(Percentage::from_bps(50).to_bps(), 50);
        assert_eq!(Percentage::from_percent(dec!(0.5)).as_fraction(), dec!(0.005));
    }
}
