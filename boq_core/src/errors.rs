//! # Error Types
//!
//! Structured error types for boq_core. Every failure carries enough context
//! (which field, which designation, which token) for a caller to report it or
//! fix the input programmatically.
//!
//! ## Example
//!
//! ```rust
//! use boq_core::errors::{BoqError, BoqResult};
//!
//! fn validate_height(height: f64) -> BoqResult<()> {
//!     if height <= 0.0 {
//!         return Err(BoqError::validation(
//!             "height",
//!             height.to_string(),
//!             "Height must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for boq_core operations
pub type BoqResult<T> = Result<T, BoqError>;

/// Structured error type for quantity derivation and persistence.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum BoqError {
    /// An input value is invalid (non-positive dimension, zero spacing, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    Validation {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field or section is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Bar designation not present in the reference library
    #[error("Unknown bar type: {designation}")]
    UnknownBarType { designation: String },

    /// Concrete grade not present in the reference library
    #[error("Unknown concrete grade: {grade}")]
    UnknownConcreteGrade { grade: String },

    /// Unit token, settings file or reference table could not be resolved
    #[error("Configuration error in '{setting}': {reason}")]
    Configuration { setting: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl BoqError {
    /// Create a Validation error
    pub fn validation(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        BoqError::Validation {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        BoqError::MissingField {
            field: field.into(),
        }
    }

    /// Create an UnknownBarType error
    pub fn unknown_bar_type(designation: impl Into<String>) -> Self {
        BoqError::UnknownBarType {
            designation: designation.into(),
        }
    }

    /// Create an UnknownConcreteGrade error
    pub fn unknown_concrete_grade(grade: impl Into<String>) -> Self {
        BoqError::UnknownConcreteGrade {
            grade: grade.into(),
        }
    }

    /// Create a Configuration error
    pub fn configuration(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        BoqError::Configuration {
            setting: setting.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        BoqError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        BoqError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError from anything displayable
    pub fn serialization(reason: impl std::fmt::Display) -> Self {
        BoqError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Only a held lock is worth retrying; every derivation error is deterministic.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BoqError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            BoqError::Validation { .. } => "VALIDATION_ERROR",
            BoqError::MissingField { .. } => "MISSING_FIELD",
            BoqError::UnknownBarType { .. } => "UNKNOWN_BAR_TYPE",
            BoqError::UnknownConcreteGrade { .. } => "UNKNOWN_CONCRETE_GRADE",
            BoqError::Configuration { .. } => "CONFIGURATION_ERROR",
            BoqError::FileError { .. } => "FILE_ERROR",
            BoqError::FileLocked { .. } => "FILE_LOCKED",
            BoqError::SerializationError { .. } => "SERIALIZATION_ERROR",
            BoqError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

/// Require a strictly positive dimension.
pub fn ensure_positive(field: &str, value: f64) -> BoqResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(BoqError::validation(
            field,
            value.to_string(),
            "Must be a positive number",
        ));
    }
    Ok(())
}

/// Require a strictly positive element or bar count.
pub fn ensure_count(field: &str, value: u32) -> BoqResult<()> {
    if value == 0 {
        return Err(BoqError::validation(field, "0", "Count must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = BoqError::validation("spacing", "0", "Spacing must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"Validation\""));
        let roundtrip: BoqError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(BoqError::missing_field("rebars").error_code(), "MISSING_FIELD");
        assert_eq!(BoqError::unknown_bar_type("m99").error_code(), "UNKNOWN_BAR_TYPE");
        assert_eq!(BoqError::unknown_concrete_grade("m99").error_code(), "UNKNOWN_CONCRETE_GRADE");
        assert_eq!(BoqError::configuration("unit", "bad").error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_only_locks_are_recoverable() {
        assert!(BoqError::file_locked("a.boq", "someone", "now").is_recoverable());
        assert!(!BoqError::validation("width", "-1", "negative").is_recoverable());
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("width", 0.4).is_ok());
        assert!(ensure_positive("width", 0.0).is_err());
        assert!(ensure_positive("width", -1.0).is_err());
        assert!(ensure_positive("width", f64::NAN).is_err());
        assert!(ensure_count("amt", 0).is_err());
        assert!(ensure_count("amt", 3).is_ok());
    }
}
