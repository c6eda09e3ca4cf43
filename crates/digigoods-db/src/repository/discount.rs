//! # Discount Repository
//!
//! SQLite implementation of the [`DiscountStore`] contract.
//!
//! ## Atomic Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   How a Use Is Consumed                                 │
//! │                                                                         │
//! │  ❌ WRONG: read-modify-write across two statements                     │
//! │     SELECT remaining_uses FROM discounts WHERE id = ?   -- 1           │
//! │     UPDATE discounts SET remaining_uses = 0 WHERE id = ?                │
//! │     (two checkouts both read 1, both write 0: one use lost)            │
//! │                                                                         │
//! │  ✅ CORRECT: one statement, guard in the WHERE clause                  │
//! │     UPDATE discounts                                                   │
//! │     SET remaining_uses = remaining_uses - 1                            │
//! │     WHERE id = ? AND remaining_uses > 0                                │
//! │                                                                         │
//! │     rows_affected = 1 → use consumed                                   │
//! │     rows_affected = 0 → already exhausted (or unknown id)              │
//! │                                                                         │
//! │  SQLite runs each write statement under the database write lock, so    │
//! │  concurrent decrements of the same row serialize on that statement.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use digigoods_core::validation::validate_new_discount;
use digigoods_core::{Discount, DiscountStore, NewDiscount, StoreResult};

const DISCOUNT_COLUMNS: &str = r#"
    id,
    code,
    percentage_bps,
    remaining_uses,
    valid_from,
    valid_until,
    created_at,
    updated_at,
    version
"#;

/// Repository for discount database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = DiscountRepository::new(pool);
///
/// let found = repo.get_by_codes(&["VALID10".to_string()]).await?;
/// let consumed = repo.decrement_remaining_uses(&found[0].id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    /// Creates a new DiscountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    /// Fetches every discount whose code is in `codes`, in one query.
    ///
    /// Codes match exactly (SQLite `=` on TEXT is case-sensitive).
    pub async fn get_by_codes(&self, codes: &[String]) -> DbResult<Vec<Discount>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        debug!(requested = codes.len(), "Looking up discounts by code");

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE code IN ("
        ));
        let mut separated = query.separated(", ");
        for code in codes {
            separated.push_bind(code.as_str());
        }
        separated.push_unseparated(") ORDER BY code");

        let discounts = query
            .build_query_as::<Discount>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = discounts.len(), "Lookup returned discounts");
        Ok(discounts)
    }

    /// Consumes one use if any remain.
    ///
    /// ## Returns
    /// * `Ok(true)` - `remaining_uses` went down by one
    /// * `Ok(false)` - nothing left to consume, or no such id
    pub async fn decrement_remaining_uses(&self, id: &str) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE discounts
            SET
                remaining_uses = remaining_uses - 1,
                updated_at = ?2,
                version = version + 1
            WHERE id = ?1 AND remaining_uses > 0
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let consumed = result.rows_affected() == 1;
        debug!(id = %id, consumed, "Conditional decrement");
        Ok(consumed)
    }

    /// Lists every discount ordered by code.
    pub async fn list(&self) -> DbResult<Vec<Discount>> {
        let discounts = sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts ORDER BY code"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    /// Gets a discount by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Discount))` - Discount found
    /// * `Ok(None)` - Discount not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Discount>> {
        let discount = sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(discount)
    }

    /// Gets a discount by its code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Discount>> {
        let discount = sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(discount)
    }

    /// Inserts a new discount with a generated id.
    ///
    /// ## Returns
    /// * `Ok(Discount)` - The stored record
    /// * `Err(DbError::Validation)` - Payload rejected before the insert
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    pub async fn insert(&self, discount: NewDiscount) -> DbResult<Discount> {
        validate_new_discount(&discount)?;

        let discount = discount.into_discount(Uuid::new_v4().to_string(), Utc::now());
        debug!(id = %discount.id, code = %discount.code, "Inserting discount");

        sqlx::query(
            r#"
            INSERT INTO discounts (
                id, code, percentage_bps, remaining_uses,
                valid_from, valid_until,
                created_at, updated_at, version
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6,
                ?7, ?8, ?9
            )
            "#,
        )
        .bind(&discount.id)
        .bind(&discount.code)
        .bind(discount.percentage_bps)
        .bind(discount.remaining_uses)
        .bind(discount.valid_from)
        .bind(discount.valid_until)
        .bind(discount.created_at)
        .bind(discount.updated_at)
        .bind(discount.version)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("code", &discount.code),
            other => other,
        })?;

        Ok(discount)
    }

    /// Counts stored discounts (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM discounts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl DiscountStore for DiscountRepository {
    async fn find_all_by_codes(&self, codes: &[String]) -> StoreResult<Vec<Discount>> {
        Ok(self.get_by_codes(codes).await?)
    }

    async fn decrement_if_positive(&self, id: &str) -> StoreResult<bool> {
        Ok(self.decrement_remaining_uses(id).await?)
    }

    async fn find_all(&self) -> StoreResult<Vec<Discount>> {
        Ok(self.list().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
