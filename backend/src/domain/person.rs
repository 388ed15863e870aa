//! Identity fields shared by users and restaurants.
//!
//! `PersonDetails` is embedded by value in both aggregates; neither inherits
//! from the other.

use std::fmt;
use std::str::FromStr;

use super::validation::{ValidationError, has_text, require_text};

/// Sign-in mechanism recorded for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthProvider {
    Google,
    Phone,
}

impl AuthProvider {
    pub const ALLOWED: &'static str = "google, phone";

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthProvider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "google" => Ok(Self::Google),
            "phone" => Ok(Self::Phone),
            "" => Err(ValidationError::Missing {
                field: "auth_provider",
            }),
            other => Err(ValidationError::Unsupported {
                field: "auth_provider",
                value: other.to_owned(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Name and contact details of a person-like account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDetails {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: AuthProvider,
}

impl PersonDetails {
    /// Name is required, and at least one contact channel must be present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        if !has_text(self.email.as_deref()) && !has_text(self.phone.as_deref()) {
            return Err(ValidationError::MissingEither {
                first: "email",
                second: "phone",
            });
        }
        Ok(())
    }
}
