//! # Error Types
//!
//! Domain-specific error types for adlaunch-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  adlaunch-core errors (this file)                                      │
//! │  ├── CoreError        - Lifecycle and domain rule violations           │
//! │  └── ValidationError  - Payload validation failures                    │
//! │                                                                         │
//! │  adlaunch-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  adlaunch-sync errors (separate crate)                                 │
//! │  └── SyncError        - What engine callers see                        │
//! │                                                                         │
//! │  Flow: ValidationError → SyncError::ValidationFailed → caller          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::CreationStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A creation status move that the lifecycle does not allow.
    ///
    /// ## Allowed Moves
    /// ```text
    /// draft ──► pending ──► synced
    ///   ▲          │
    ///   │          ▼
    ///   └──────  failed ──► pending (explicit retry)
    /// ```
    #[error("Invalid creation status transition: {from} -> {to}")]
    InvalidTransition {
        from: CreationStatus,
        to: CreationStatus,
    },

    /// Unknown enum text read from storage or a caller.
    #[error("Unknown {field} value: {value}")]
    UnknownValue { field: String, value: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Payload validation errors.
///
/// Raised before any remote call; a payload that fails validation never moves
/// its entity out of its current creation status.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Too few items in a list field.
    #[error("{field} requires at least {min} entries, got {actual}")]
    TooFew {
        field: String,
        min: usize,
        actual: usize,
    },

    /// A list entry exceeds its character limit.
    #[error("{field}[{index}] must be at most {max} characters")]
    TooLong {
        field: String,
        index: usize,
        max: usize,
    },

    /// Value must be positive.
    #[error("{field} must be a positive number")]
    MustBePositive { field: String },

    /// Invalid format (e.g., relative URL).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::TooFew {
            field: "headlines".to_string(),
            min: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "headlines requires at least 3 entries, got 2"
        );

        let err = ValidationError::TooLong {
            field: "descriptions".to_string(),
            index: 1,
            max: 90,
        };
        assert_eq!(err.to_string(), "descriptions[1] must be at most 90 characters");
    }

    #[test]
    fn test_transition_message() {
        let err = CoreError::InvalidTransition {
            from: CreationStatus::Synced,
            to: CreationStatus::Pending,
        };
        assert_eq!(
            err.to_string(),
            "Invalid creation status transition: synced -> pending"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "final_url".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
