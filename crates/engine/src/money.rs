use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Every amount the engine stores goes through this type so that provider
/// floats never reach the database.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::from_provider_amount(12.345).unwrap();
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Converts a provider amount into cents.
    ///
    /// The float is read as its shortest decimal representation (the digits
    /// the provider actually sent) and rounded half-to-even at two places:
    /// `12.345` becomes `12.34`, `12.355` becomes `12.36`.
    pub fn from_provider_amount(value: f64) -> Result<Self, EngineError> {
        if !value.is_finite() {
            return Err(EngineError::InvalidAmount(format!(
                "non-finite amount: {value}"
            )));
        }

        let decimal = Decimal::from_str(&value.to_string())
            .map_err(|_| EngineError::InvalidAmount(format!("amount out of range: {value}")))?;
        let mut rounded = decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        rounded.rescale(2);

        i64::try_from(rounded.mantissa())
            .map(Self)
            .map_err(|_| EngineError::InvalidAmount(format!("amount too large: {value}")))
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(value: f64) -> i64 {
        MoneyCents::from_provider_amount(value).unwrap().cents()
    }

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn provider_amount_rounds_half_to_even() {
        assert_eq!(cents(12.345), 1234);
        assert_eq!(cents(12.355), 1236);
        assert_eq!(cents(0.125), 12);
        assert_eq!(cents(0.135), 14);
        assert_eq!(cents(-12.345), -1234);
    }

    #[test]
    fn provider_amount_above_midpoint_rounds_up() {
        assert_eq!(cents(12.3451), 1235);
        assert_eq!(cents(12.349), 1235);
    }

    #[test]
    fn provider_amount_keeps_exact_cents() {
        assert_eq!(cents(0.1), 10);
        assert_eq!(cents(89.4), 8940);
        assert_eq!(cents(-4.22), -422);
        assert_eq!(cents(1200.0), 120_000);
        assert_eq!(cents(-0.0), 0);
    }

    #[test]
    fn provider_amount_rejects_non_finite() {
        assert!(matches!(
            MoneyCents::from_provider_amount(f64::NAN),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            MoneyCents::from_provider_amount(f64::INFINITY),
            Err(EngineError::InvalidAmount(_))
        ));
    }
}
