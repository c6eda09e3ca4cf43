//! # Error Types
//!
//! Domain-specific error types for digigoods-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  digigoods-core errors (this file)                                     │
//! │  ├── InvalidDiscount  - Business-rule rejection of one code            │
//! │  ├── StoreError       - Infrastructure failure behind DiscountStore    │
//! │  ├── ValidationError  - Malformed creation payload                     │
//! │  ├── PartialRedemption - Batch redemption that only partly succeeded   │
//! │  └── DiscountError    - What the checkout caller sees                  │
//! │                                                                         │
//! │  digigoods-db errors (separate crate)                                  │
//! │  └── DbError          - Converted into StoreError at the trait seam    │
//! │                                                                         │
//! │  Flow: DbError → StoreError ─┐                                         │
//! │        InvalidDiscount ──────┼──► DiscountError → checkout caller      │
//! │        ValidationError ──────┘                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Mapping to Checkout Responses
//! - [`DiscountError::Invalid`] → rejected checkout naming the code and reason
//! - [`DiscountError::Store`] → generic failure, retryable when
//!   [`DiscountError::is_retryable`] says so
//! - [`DiscountError::PartialRedemption`] → the caller compensates the
//!   `redeemed` discounts, then rejects naming every entry in `failures`
//!
//! Nothing in this crate retries. Retry policy belongs to the store or its caller.

use thiserror::Error;

use crate::types::Discount;

// =============================================================================
// Invalid Discount
// =============================================================================

/// A requested discount code cannot be applied.
///
/// Each variant carries the offending code. The `Display` text starts with
/// the stable reason phrase so callers can surface it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDiscount {
    /// No discount record exists for the code.
    #[error("discount code not found: {code}")]
    CodeNotFound { code: String },

    /// `today > valid_until`.
    #[error("discount has expired: {code}")]
    Expired { code: String },

    /// `today < valid_from`.
    #[error("discount is not yet valid: {code}")]
    NotYetValid { code: String },

    /// No uses left, either at validation time or when the redemption
    /// lost the race for the last use.
    ///
    /// ## Race Loser
    /// ```text
    /// Checkout A: validate(remaining=1) ✓ ── redeem ✓ (remaining=0)
    /// Checkout B: validate(remaining=1) ✓ ────────── redeem ✗ Exhausted
    /// ```
    #[error("discount has no remaining uses: {code}")]
    Exhausted { code: String },
}

impl InvalidDiscount {
    /// The discount code this rejection is about.
    pub fn code(&self) -> &str {
        match self {
            InvalidDiscount::CodeNotFound { code }
            | InvalidDiscount::Expired { code }
            | InvalidDiscount::NotYetValid { code }
            | InvalidDiscount::Exhausted { code } => code,
        }
    }

    /// Human-readable reason, without the code.
    pub fn reason(&self) -> &'static str {
        match self {
            InvalidDiscount::CodeNotFound { .. } => "discount code not found",
            InvalidDiscount::Expired { .. } => "discount has expired",
            InvalidDiscount::NotYetValid { .. } => "discount is not yet valid",
            InvalidDiscount::Exhausted { .. } => "discount has no remaining uses",
        }
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// Infrastructure failures reported by a [`DiscountStore`](crate::store::DiscountStore).
///
/// These propagate to the caller unchanged; the engine never masks them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend cannot be reached (connection lost, pool closed).
    #[error("Discount store unavailable: {0}")]
    Unavailable(String),

    /// Backend did not answer in time.
    #[error("Discount store timed out")]
    Timeout,

    /// Anything else the backend reports.
    #[error("Discount store error: {0}")]
    Internal(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Creation payload validation errors.
///
/// Only used when seeding or inserting discounts; checkout never sees these.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// `valid_from` is after `valid_until`.
    #[error("valid_from {valid_from} is after valid_until {valid_until}")]
    InvalidWindow {
        valid_from: String,
        valid_until: String,
    },

    /// Duplicate value (e.g., duplicate code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Partial Redemption
// =============================================================================

/// A multi-discount redemption where at least one decrement failed.
///
/// Decrements that went through are not undone. `redeemed` holds those
/// discounts (already showing the consumed use) so the caller can
/// compensate; `failures` holds every failed code with its error, in the
/// order the discounts were passed in.
#[derive(Debug, Error)]
#[error(
    "{} of {} discounts could not be redeemed",
    .failures.len(),
    .failures.len() + .redeemed.len()
)]
pub struct PartialRedemption {
    pub redeemed: Vec<Discount>,
    pub failures: Vec<(String, DiscountError)>,
}

impl PartialRedemption {
    /// Codes that could not be redeemed.
    pub fn failed_codes(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|(code, _)| code.as_str())
    }
}

// =============================================================================
// Discount Error
// =============================================================================

/// Errors returned by [`DiscountService`](crate::service::DiscountService).
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Business-rule rejection. Never retried.
    #[error("Invalid discount: {0}")]
    Invalid(#[from] InvalidDiscount),

    /// Infrastructure failure from the store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed creation payload.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Some discounts of a batch were consumed, others failed.
    #[error(transparent)]
    PartialRedemption(#[from] PartialRedemption),
}

impl DiscountError {
    /// Returns the business-rule rejection, if this is one.
    pub fn as_invalid(&self) -> Option<&InvalidDiscount> {
        match self {
            DiscountError::Invalid(invalid) => Some(invalid),
            _ => None,
        }
    }

    /// True when the checkout may be retried as-is.
    ///
    /// A partial redemption is only retryable when nothing was consumed.
    pub fn is_retryable(&self) -> bool {
        match self {
            DiscountError::Store(StoreError::Unavailable(_) | StoreError::Timeout) => true,
            DiscountError::PartialRedemption(partial) => {
                partial.redeemed.is_empty()
                    && partial.failures.iter().all(|(_, err)| err.is_retryable())
            }
            _ => false,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for engine results.
pub type DiscountResult<T> = Result<T, DiscountError>;

/// Result type for `DiscountStore` calls.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
