//! # Error Types
//!
//! The settlement error taxonomy.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── EngineError          - top-level: conflict / invalid state        │
//! │  ├── ValidationError      - field-level input failures                 │
//! │  └── ArithmeticGuardError - internal numeric guards                    │
//! │                                                                         │
//! │  till-engine errors (separate crate)                                   │
//! │  └── StoreError           - record-store collaborator failures         │
//! │                                                                         │
//! │  Flow: ValidationError / ArithmeticGuardError → EngineError → caller   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Context in every message (field, location, session id)
//! 3. Errors are enum variants, never String
//! 4. Validation failures never partially apply a document: a totals or
//!    commission computation either returns a full result or no result

use thiserror::Error;

// =============================================================================
// Engine Error
// =============================================================================

/// Top-level settlement errors.
///
/// Register state errors are fatal to the requested operation but never
/// corrupt a session's existing accumulators.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Opening a register at a location that already has an open session.
    #[error("register at location '{location}' already has open session {session_id}")]
    Conflict {
        location: String,
        session_id: String,
    },

    /// Operating on a register session that is already closed.
    #[error("register session {session_id} is already closed")]
    AlreadyClosed { session_id: String },

    /// Operating on a register session that does not exist.
    #[error("register session {session_id} not found")]
    SessionNotFound { session_id: String },

    /// Field-level input failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Internal numeric guard tripped.
    #[error("arithmetic guard: {0}")]
    Arithmetic(#[from] ArithmeticGuardError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, surfaced with a field-level reason.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. malformed UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A commission profile with neither an overall rate nor any
    /// category rate cannot be applied.
    #[error("commission profile '{profile_id}' has no overall rate and no category rates")]
    ProfileWithoutRate { profile_id: String },

    /// Advanced commission mode requires a category mapping for this
    /// entity type.
    #[error("commission profile '{profile_id}' ({entity}) requires at least one category rate")]
    ProfileRequiresCategoryRates { profile_id: String, entity: String },

    /// The category forest contains a cycle (a category is its own
    /// ancestor) or a chain deeper than the supported bound.
    #[error("category '{category_id}' is part of a cycle or exceeds depth {max_depth}")]
    CategoryCycle {
        category_id: String,
        max_depth: usize,
    },

    /// A category references a parent that is not in the forest.
    #[error("category '{category_id}' references unknown parent '{parent_id}'")]
    UnknownParentCategory {
        category_id: String,
        parent_id: String,
    },
}

// =============================================================================
// Arithmetic Guard Error
// =============================================================================

/// Internal numeric guards.
///
/// These fire on data that should never reach the calculator (negative
/// prices, non-positive quantities) and on line discounts that would
/// invert a line to negative. The *order*-level discount is clamped
/// instead — see [`crate::totals`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArithmeticGuardError {
    /// Quantity must be strictly positive.
    #[error("line {line_index}: quantity must be positive, got {milli} milli-units")]
    NonPositiveQuantity { line_index: usize, milli: i64 },

    /// Unit price must be non-negative.
    #[error("line {line_index}: unit price must be non-negative, got {minor}")]
    NegativeUnitPrice { line_index: usize, minor: i64 },

    /// Line discount must be non-negative.
    #[error("line {line_index}: line discount must be non-negative, got {minor}")]
    NegativeLineDiscount { line_index: usize, minor: i64 },

    /// Line discount may not exceed the line gross (would invert the line).
    #[error("line {line_index}: discount {discount_minor} exceeds line gross {gross_minor}")]
    LineDiscountExceedsGross {
        line_index: usize,
        discount_minor: i64,
        gross_minor: i64,
    },

    /// Shipping charge must be non-negative.
    #[error("shipping charge must be non-negative, got {minor}")]
    NegativeShipping { minor: i64 },

    /// Payments received must be non-negative.
    #[error("payments received must be non-negative, got {minor}")]
    NegativePayments { minor: i64 },

    /// Amount routed into a register accumulator must be non-negative.
    #[error("register amount must be non-negative, got {minor}")]
    NegativeRegisterAmount { minor: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience alias for Results with EngineError.
pub type CoreResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = EngineError::Conflict {
            location: "main-store".to_string(),
            session_id: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "register at location 'main-store' already has open session abc"
        );

        let err = ArithmeticGuardError::LineDiscountExceedsGross {
            line_index: 2,
            discount_minor: 500,
            gross_minor: 300,
        };
        assert_eq!(err.to_string(), "line 2: discount 500 exceeds line gross 300");
    }

    #[test]
    fn validation_converts_to_engine_error() {
        let validation = ValidationError::Required {
            field: "location".to_string(),
        };
        let engine: EngineError = validation.into();
        assert!(matches!(engine, EngineError::Validation(_)));
    }

    #[test]
    fn guard_converts_to_engine_error() {
        let guard = ArithmeticGuardError::NegativeShipping { minor: -1 };
        let engine: EngineError = guard.into();
        assert!(matches!(engine, EngineError::Arithmetic(_)));
    }
}
