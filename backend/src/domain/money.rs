//! Integer minor-unit amounts.

use serde::{Deserialize, Serialize};

/// Largest accepted amount in minor units (one billion major units).
pub const MAX_MINOR_UNITS: u64 = 100_000_000_000;

/// Validation errors raised when converting major-unit input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PriceValidationError {
    #[error("price must be a finite number")]
    NotFinite,
    #[error("price must not be negative")]
    Negative,
    #[error("price must be at most {max} minor units")]
    TooLarge { max: u64 },
}

/// Amount in integer minor currency units (cents). Always non-negative.
///
/// # Examples
/// ```
/// use course_commerce::domain::Price;
///
/// let price = Price::from_major_units(19.99).expect("valid price");
/// assert_eq!(price.minor_units(), 1999);
/// assert!(Price::from_major_units(f64::NAN).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Wrap an amount already expressed in minor units.
    #[must_use]
    pub const fn from_minor_units(minor_units: u64) -> Self {
        Self(minor_units)
    }

    /// Convert a major-unit amount by multiplying by 100 and rounding.
    pub fn from_major_units(major_units: f64) -> Result<Self, PriceValidationError> {
        if !major_units.is_finite() {
            return Err(PriceValidationError::NotFinite);
        }
        if major_units < 0.0 {
            return Err(PriceValidationError::Negative);
        }
        let minor = (major_units * 100.0).round();
        if minor > MAX_MINOR_UNITS as f64 {
            return Err(PriceValidationError::TooLarge {
                max: MAX_MINOR_UNITS,
            });
        }
        // Bounded above and non-negative, so the cast is exact.
        Ok(Self(minor as u64))
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
