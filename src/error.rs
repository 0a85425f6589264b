//! Error types shared by the solver, configuration loader and CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single rejected request field, suitable for a per-field UI message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors surfaced to callers of the ballistics API.
#[derive(Error, Debug)]
pub enum BallisticsError {
    #[error("invalid input: {}", join_fields(.0))]
    InvalidInput(Vec<FieldError>),

    #[error("unknown drag model '{0}' (expected none, g1 or g7)")]
    UnknownDragModel(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("environment source failed: {0}")]
    EnvironmentSource(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BallisticsError {
    /// Per-field messages when this is a validation failure.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            BallisticsError::InvalidInput(fields) => fields,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for BallisticsError {
    fn from(e: serde_json::Error) -> Self {
        BallisticsError::Config(e.to_string())
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects field errors during validation.
#[derive(Debug, Default)]
pub(crate) struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn finite(&mut self, field: &str, value: f64) -> bool {
        if value.is_finite() {
            true
        } else {
            self.errors.push(FieldError::new(field, "must be a finite number"));
            false
        }
    }

    pub(crate) fn positive(&mut self, field: &str, value: f64) {
        if self.finite(field, value) && value <= 0.0 {
            self.errors.push(FieldError::new(field, "must be greater than zero"));
        }
    }

    pub(crate) fn non_negative(&mut self, field: &str, value: f64) {
        if self.finite(field, value) && value < 0.0 {
            self.errors.push(FieldError::new(field, "must not be negative"));
        }
    }

    pub(crate) fn within(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if self.finite(field, value) && !(min..=max).contains(&value) {
            self.errors.push(FieldError::new(
                field,
                format!("must be between {min} and {max}"),
            ));
        }
    }

    pub(crate) fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub(crate) fn finish(self) -> Result<(), BallisticsError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(BallisticsError::InvalidInput(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_collects_every_field() {
        let mut v = Validator::new();
        v.positive("range_m", 0.0);
        v.positive("muzzle_velocity_ms", -5.0);
        v.finite("temperature_c", f64::NAN);
        v.non_negative("wind_speed_ms", 3.0);

        let err = v.finish().unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["range_m", "muzzle_velocity_ms", "temperature_c"]);
    }

    #[test]
    fn test_validator_within_bounds() {
        let mut v = Validator::new();
        v.within("pressure_hpa", 1013.25, 0.0, 1200.0);
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.within("pressure_hpa", 1500.0, 0.0, 1200.0);
        assert!(v.finish().is_err());
    }

    #[test]
    fn test_invalid_input_display() {
        let err = BallisticsError::InvalidInput(vec![
            FieldError::new("range_m", "must be greater than zero"),
            FieldError::new("ballistic_coefficient", "must be greater than zero"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("range_m: must be greater than zero"));
        assert!(msg.contains("; ballistic_coefficient"));
    }
}
