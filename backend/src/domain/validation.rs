//! Structural validation shared by every entity validator.
//!
//! Validators are pure and short-circuit: they report the first violated
//! constraint. They run before any remote reference check or store write.

use serde_json::json;

use super::Error;

/// First constraint violated by an entity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("either {first} or {second} is required")]
    MissingEither {
        first: &'static str,
        second: &'static str,
    },
    #[error("{field} must not be empty")]
    EmptyCollection { field: &'static str },
    #[error("{field} must be non-negative")]
    Negative { field: &'static str },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be within [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} must be one of: {allowed}")]
    Unsupported {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },
    #[error("{field} must be a JSON object")]
    NotAnObject { field: &'static str },
    #[error("{first} and {second} must be provided together")]
    Unpaired {
        first: &'static str,
        second: &'static str,
    },
}

impl ValidationError {
    /// Primary field the violation refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::EmptyCollection { field }
            | Self::Negative { field }
            | Self::NotPositive { field }
            | Self::NotFinite { field }
            | Self::OutOfRange { field, .. }
            | Self::Unsupported { field, .. }
            | Self::NotAnObject { field } => field,
            Self::MissingEither { first, .. } | Self::Unpaired { first, .. } => first,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Missing { .. } | Self::MissingEither { .. } => "missing_field",
            Self::EmptyCollection { .. } => "empty_collection",
            Self::Negative { .. } | Self::NotPositive { .. } | Self::OutOfRange { .. } => {
                "out_of_range"
            }
            Self::NotFinite { .. } => "not_finite",
            Self::Unsupported { .. } => "unsupported_value",
            Self::NotAnObject { .. } => "invalid_type",
            Self::Unpaired { .. } => "unpaired_fields",
        }
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        let mut details = json!({
            "field": value.field(),
            "code": value.code(),
        });
        if let ValidationError::Unsupported { value: raw, .. } = &value {
            details["value"] = json!(raw);
        }
        Error::invalid_request(value.to_string()).with_details(details)
    }
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing { field });
    }
    Ok(())
}

pub(crate) fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(())
}

pub(crate) fn require_within(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { field, min, max });
    }
    Ok(())
}
