//! Injection rate value object
//!
//! Probability, per attempt, that a chaos strategy applies its effect.
//!
//! # Examples
//!
//! ```
//! use domain::InjectionRate;
//!
//! let rate = InjectionRate::new(0.05).expect("valid rate");
//! assert!((rate.value() - 0.05).abs() < f64::EPSILON);
//!
//! assert!(InjectionRate::new(1.5).is_err());
//! assert_eq!(InjectionRate::clamped(-3.0), InjectionRate::NEVER);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when an injection rate is outside `[0, 1]`
#[derive(Debug, Clone, Copy, Error, PartialEq)]
#[error("invalid injection rate: {0} is out of range (must be 0.0-1.0)")]
pub struct InvalidInjectionRate(f64);

/// Probability in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct InjectionRate(f64);

impl InjectionRate {
    /// Rate that never injects
    pub const NEVER: Self = Self(0.0);

    /// Rate that always injects
    pub const ALWAYS: Self = Self(1.0);

    /// Create a validated injection rate
    ///
    /// # Errors
    ///
    /// Returns `InvalidInjectionRate` for NaN or values outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, InvalidInjectionRate> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidInjectionRate(value))
        }
    }

    /// Create an injection rate, clamping to the valid range
    ///
    /// NaN maps to [`InjectionRate::NEVER`].
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            Self::NEVER
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Get the raw probability
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Returns true if no draw can ever succeed
    #[must_use]
    pub fn is_never(&self) -> bool {
        self.0 <= 0.0
    }

    /// Decide an injection from a uniform sample in `[0, 1)`
    ///
    /// A rate of 0 never fires and a rate of 1 always fires, whatever the
    /// sample.
    #[must_use]
    pub fn fires(&self, sample: f64) -> bool {
        if self.is_never() {
            return false;
        }
        if self.0 >= 1.0 {
            return true;
        }
        sample < self.0
    }
}

impl Default for InjectionRate {
    fn default() -> Self {
        Self::NEVER
    }
}

impl TryFrom<f64> for InjectionRate {
    type Error = InvalidInjectionRate;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InjectionRate> for f64 {
    fn from(rate: InjectionRate) -> Self {
        rate.0
    }
}

impl fmt::Display for InjectionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0 * 100.0)
    }
}
