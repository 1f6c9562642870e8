//! # Validation Module
//!
//! Input validation rules applied before business logic runs. The database
//! layer backs these up with NOT NULL / UNIQUE constraints; validating here
//! first keeps the errors typed and the messages useful.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code (SKU / barcode).
///
/// ## Rules
/// - Must not be blank after trimming
/// - At most 64 characters
///
/// Codes arrive from barcode scanners and supplier documents, so beyond
/// length no character set is enforced.
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be blank after trimming
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an expense concept.
pub fn validate_concept(concept: &str) -> ValidationResult<()> {
    let concept = concept.trim();

    if concept.is_empty() {
        return Err(ValidationError::Required {
            field: "concept".to_string(),
        });
    }

    if concept.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "concept".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// Empty is fine (returns the unfiltered listing); only the length is
/// bounded. Returns the trimmed query.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount (cost, price, expense amount).
///
/// ## Rules
/// - Must be finite (no NaN / infinity from a bad parse upstream)
/// - Must not be negative; zero is allowed (free or unpriced items)
pub fn validate_amount(field: &str, amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if amount < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a sale-line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// Note this bounds the *sale request*, not the resulting stock: the ledger
/// deliberately allows stock to go negative on commit.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
