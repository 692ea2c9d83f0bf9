//! Environment value object
//!
//! The ambient classification of the running process. Chaos decisions are
//! derived from it, so classification never fails: names that are not
//! recognised become [`Environment::Other`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::DomainError;

/// Application environment
///
/// # Examples
///
/// ```
/// use domain::Environment;
///
/// assert_eq!(Environment::classify("Production"), Environment::Production);
/// assert_eq!(Environment::classify("development"), Environment::Development);
/// assert!(matches!(Environment::classify("prod"), Environment::Other(_)));
/// assert!(matches!(Environment::classify("staging"), Environment::Other(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    /// Local development
    Development,
    /// Production deployment
    Production,
    /// Any other (or unclassified) environment
    #[default]
    Unclassified,
    /// Named environment that is neither development nor production
    Other(String),
}

impl Environment {
    /// Classify an environment name, never failing
    #[must_use]
    pub fn classify(name: &str) -> Self {
        name.parse()
            .unwrap_or_else(|_| match name.trim() {
                "" => Self::Unclassified,
                other => Self::Other(other.to_lowercase()),
            })
    }

    /// Returns true for the development environment
    #[must_use]
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Returns true for the production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Canonical lowercase name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Unclassified => "unclassified",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            _ => Err(DomainError::UnknownEnvironment(s.to_string())),
        }
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::classify(&name))
    }
}
