//! # Validation Module
//!
//! Pure discount rules. No store access, no clock: "today" is a parameter.
//!
//! ## Per-Record Checks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  check_discount(discount, today)                        │
//! │                                                                         │
//! │  today > valid_until ──────────► Expired                               │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │  today < valid_from ───────────► NotYetValid                           │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │  remaining_uses <= 0 ──────────► Exhausted                             │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │       Ok                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use chrono::{NaiveDate, Utc};
//! use digigoods_core::validation::check_discount;
//! use digigoods_core::NewDiscount;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
//! let discount = NewDiscount {
//!     code: "VALID10".to_string(),
//!     percentage_bps: 1000,
//!     remaining_uses: 5,
//!     valid_from: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
//!     valid_until: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
//! }
//! .into_discount("id".to_string(), Utc::now());
//!
//! assert!(check_discount(&discount, today).is_ok());
//! ```

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::{InvalidDiscount, ValidationError};
use crate::types::{Discount, NewDiscount, Percentage};
use crate::MAX_CODE_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Checkout Rules
// =============================================================================

/// Checks one resolved discount against `today`.
///
/// Order matters: an expired code with no uses left reports `Expired`.
pub fn check_discount(discount: &Discount, today: NaiveDate) -> Result<(), InvalidDiscount> {
    if today > discount.valid_until {
        return Err(InvalidDiscount::Expired {
            code: discount.code.clone(),
        });
    }

    if today < discount.valid_from {
        return Err(InvalidDiscount::NotYetValid {
            code: discount.code.clone(),
        });
    }

    if !discount.has_remaining_uses() {
        return Err(InvalidDiscount::Exhausted {
            code: discount.code.clone(),
        });
    }

    Ok(())
}

/// Removes duplicate codes, keeping the first occurrence of each.
///
/// Codes are compared exactly (case-sensitive, no trimming).
pub fn distinct_codes<S: AsRef<str>>(codes: &[S]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(codes.len());
    codes
        .iter()
        .map(AsRef::as_ref)
        .filter(|code| seen.insert(*code))
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Creation Rules
// =============================================================================

/// Validates a discount code.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_CODE_LENGTH`] characters
/// - Letters, digits, hyphens and underscores only
pub fn validate_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a creation payload before it reaches a store.
pub fn validate_new_discount(discount: &NewDiscount) -> ValidationResult<()> {
    validate_code(&discount.code)?;

    if discount.percentage_bps > Percentage::MAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "percentage_bps".to_string(),
            min: 0,
            max: Percentage::MAX_BPS as i64,
        });
    }

    if discount.remaining_uses < 0 {
        return Err(ValidationError::OutOfRange {
            field: "remaining_uses".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if discount.valid_from > discount.valid_until {
        return Err(ValidationError::InvalidWindow {
            valid_from: discount.valid_from.to_string(),
            valid_until: discount.valid_until.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
