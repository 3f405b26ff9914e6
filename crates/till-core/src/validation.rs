//! # Validation Module
//!
//! Field-level validation run before business logic. Callers (UI pages,
//! POS commands) validate early; the calculators still guard their own
//! arithmetic, so nothing relies on this layer alone.
//!
//! ## Usage
//! ```rust
//! use till_core::validation::{validate_rate_bps, validate_location};
//!
//! validate_location("main-store").unwrap();
//! validate_rate_bps(825).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::{Money, Quantity};
use crate::{MAX_DOCUMENT_LINES, MAX_LINE_QUANTITY_MILLI};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a business location identifier.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 100 characters
pub fn validate_location(location: &str) -> ValidationResult<()> {
    let location = location.trim();

    if location.is_empty() {
        return Err(ValidationError::Required {
            field: "location".to_string(),
        });
    }

    if location.len() > 100 {
        return Err(ValidationError::OutOfRange {
            field: "location".to_string(),
            min: 1,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a UUID string format.
///
/// Entity and payment-event ids are UUID v4 strings.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0 milli-units)
/// - Must not exceed `MAX_LINE_QUANTITY_MILLI`
pub fn validate_quantity(qty: Quantity) -> ValidationResult<()> {
    if !qty.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty.milli() > MAX_LINE_QUANTITY_MILLI {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY_MILLI,
        });
    }

    Ok(())
}

/// Validates a price or charge amount.
///
/// ## Rules
/// - Must be non-negative (zero is allowed: free items, no shipping)
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines on a document.
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count > MAX_DOCUMENT_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 0,
            max: MAX_DOCUMENT_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
