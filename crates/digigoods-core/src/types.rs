//! # Domain Types
//!
//! The discount engine has a single entity, [`Discount`].
//!
//! ## Discount Record
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Discount                                       │
//! │  ─────────────────────────────────────────────────────────────────────  │
//! │  id              UUID, immutable                                       │
//! │  code            "VALID10" (case-sensitive, unique)                    │
//! │  percentage_bps  1000 = 10.00% (passed through, never interpreted)     │
//! │  remaining_uses  5 → 4 → ... → 0   (never negative)                    │
//! │  valid_from      2025-06-01 ┐                                          │
//! │  valid_until     2025-06-30 ┘ inclusive window                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: UUID v4 - immutable, used by the store to decrement
//! - `code`: what the customer types at checkout

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Percentage
// =============================================================================

/// Discount percentage represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10%. Integer storage keeps the value
/// exact; the engine never does arithmetic on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Percentage(u32);

impl Percentage {
    /// 100% in basis points.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the value as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Discount
// =============================================================================

/// A promotional code with a usage quota and an inclusive validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Discount {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Code entered at checkout. Case-sensitive.
    pub code: String,

    /// Percentage in basis points (1000 = 10.00%).
    pub percentage_bps: u32,

    /// Uses left. Never negative.
    pub remaining_uses: i64,

    /// First day the code may be used.
    pub valid_from: NaiveDate,

    /// Last day the code may be used.
    pub valid_until: NaiveDate,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Bumped on every successful decrement.
    pub version: i64,
}

impl Discount {
    /// Returns the percentage as a typed value.
    #[inline]
    pub fn percentage(&self) -> Percentage {
        Percentage::from_bps(self.percentage_bps)
    }

    /// Checks if at least one use is left.
    #[inline]
    pub fn has_remaining_uses(&self) -> bool {
        self.remaining_uses > 0
    }
}

// =============================================================================
// New Discount
// =============================================================================

/// Creation payload for a discount.
///
/// The administrative create/edit flow owns discount creation; this type
/// exists so stores can be seeded for demos and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDiscount {
    pub code: String,
    pub percentage_bps: u32,
    pub remaining_uses: i64,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
}

impl NewDiscount {
    /// Builds the stored record with a fresh id and timestamps.
    pub fn into_discount(self, id: String, now: DateTime<Utc>) -> Discount {
        Discount {
            id,
            code: self.code,
            percentage_bps: self.percentage_bps,
            remaining_uses: self.remaining_uses,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}

// =============================================================================
// Checkout Request
// =============================================================================

/// The discount part of a checkout request, as received from the caller.
///
/// `discount_codes` may be absent or `null`; both mean "no discounts".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscountCodesRequest {
    #[serde(default)]
    pub discount_codes: Option<Vec<String>>,
}

impl DiscountCodesRequest {
    /// Returns the requested codes, empty when none were sent.
    pub fn codes(&self) -> &[String] {
        self.discount_codes.as_deref().unwrap_or_default()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
