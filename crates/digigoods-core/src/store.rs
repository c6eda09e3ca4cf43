//! # Discount Store Contract
//!
//! The only component allowed to mutate durable discount state.
//!
//! ## Why the Decrement Lives Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Lost Update vs Conditional Decrement                 │
//! │                                                                         │
//! │  ❌ WRONG: read, check, write in separate steps                        │
//! │     A reads remaining=1      B reads remaining=1                       │
//! │     A writes remaining=0     B writes remaining=0   (two uses, one     │
//! │                                                      counted; or -1)   │
//! │                                                                         │
//! │  ✅ CORRECT: one indivisible store operation                           │
//! │     decrement_if_positive(id)                                          │
//! │     A: 1 → 0, returns true                                             │
//! │     B: 0 stays 0, returns false → Exhausted                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations:
//! - [`MemoryDiscountStore`] - per-record lock held only for the decrement
//! - `digigoods_db::DiscountRepository` - single conditional `UPDATE`

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DiscountResult, StoreError, StoreResult, ValidationError};
use crate::types::{Discount, NewDiscount};
use crate::validation::validate_new_discount;

// =============================================================================
// Trait
// =============================================================================

/// Lookup and atomic consumption of discounts.
#[async_trait]
pub trait DiscountStore: Send + Sync {
    /// Batch lookup by code.
    ///
    /// `codes` holds distinct codes. Every returned record's `code` is one of
    /// them, at most one record per code, in no particular order.
    async fn find_all_by_codes(&self, codes: &[String]) -> StoreResult<Vec<Discount>>;

    /// Decrements `remaining_uses` by one only if it is currently positive.
    ///
    /// Returns whether the decrement happened. Must be a single indivisible
    /// operation: concurrent calls for the same id serialize here.
    ///
    /// An id with no record returns `Ok(false)`, the same as a record with
    /// no uses left. The service reports both as `Exhausted`. Reserve `Err`
    /// for infrastructure failures.
    async fn decrement_if_positive(&self, id: &str) -> StoreResult<bool>;

    /// Lists every discount, ordered by code.
    async fn find_all(&self) -> StoreResult<Vec<Discount>>;
}

#[async_trait]
impl<T: DiscountStore + ?Sized> DiscountStore for Arc<T> {
    async fn find_all_by_codes(&self, codes: &[String]) -> StoreResult<Vec<Discount>> {
        (**self).find_all_by_codes(codes).await
    }

    async fn decrement_if_positive(&self, id: &str) -> StoreResult<bool> {
        (**self).decrement_if_positive(id).await
    }

    async fn find_all(&self) -> StoreResult<Vec<Discount>> {
        (**self).find_all().await
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Discount store kept entirely in memory.
///
/// ## Locking
/// The outer map lock is only taken to find a record (read) or add one
/// (write). Each record sits behind its own mutex, so decrements of different
/// discounts never contend and decrements of the same discount serialize.
#[derive(Debug, Default)]
pub struct MemoryDiscountStore {
    records: RwLock<HashMap<String, Arc<Mutex<Discount>>>>,
}

impl MemoryDiscountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a new discount, returning the stored record.
    ///
    /// ## Returns
    /// * `Err(DiscountError::Validation(Duplicate))` - code already taken
    pub fn insert(&self, discount: NewDiscount) -> DiscountResult<Discount> {
        validate_new_discount(&discount)?;

        let mut records = self.records.write().map_err(|_| poisoned())?;

        for record in records.values() {
            let record = record.lock().map_err(|_| poisoned())?;
            if record.code == discount.code {
                return Err(ValidationError::Duplicate {
                    field: "code".to_string(),
                    value: discount.code,
                }
                .into());
            }
        }

        let stored = discount.into_discount(Uuid::new_v4().to_string(), Utc::now());
        debug!(id = %stored.id, code = %stored.code, "Inserting discount");

        records.insert(stored.id.clone(), Arc::new(Mutex::new(stored.clone())));
        Ok(stored)
    }

    /// Gets a snapshot of a discount by id.
    pub fn get(&self, id: &str) -> StoreResult<Option<Discount>> {
        let Some(record) = self.record(id)? else {
            return Ok(None);
        };
        let record = record.lock().map_err(|_| poisoned())?;
        Ok(Some(record.clone()))
    }

    /// Number of stored discounts.
    pub fn len(&self) -> StoreResult<usize> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.len())
    }

    /// True when no discounts are stored.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn record(&self, id: &str) -> StoreResult<Option<Arc<Mutex<Discount>>>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(id).cloned())
    }

    fn snapshot(&self) -> StoreResult<Vec<Discount>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        records
            .values()
            .map(|record| {
                record
                    .lock()
                    .map(|discount| discount.clone())
                    .map_err(|_| poisoned())
            })
            .collect()
    }
}

#[async_trait]
impl DiscountStore for MemoryDiscountStore {
    async fn find_all_by_codes(&self, codes: &[String]) -> StoreResult<Vec<Discount>> {
        let mut found: Vec<Discount> = self
            .snapshot()?
            .into_iter()
            .filter(|discount| codes.contains(&discount.code))
            .collect();
        found.sort_by(|a, b| a.code.cmp(&b.code));

        debug!(requested = codes.len(), count = found.len(), "Looked up discounts by code");
        Ok(found)
    }

    async fn decrement_if_positive(&self, id: &str) -> StoreResult<bool> {
        let Some(record) = self.record(id)? else {
            debug!(id = %id, "Decrement on unknown discount");
            return Ok(false);
        };

        let mut discount = record.lock().map_err(|_| poisoned())?;
        if discount.remaining_uses <= 0 {
            return Ok(false);
        }

        discount.remaining_uses -= 1;
        discount.updated_at = Utc::now();
        discount.version += 1;

        debug!(id = %id, remaining_uses = discount.remaining_uses, "Decremented discount");
        Ok(true)
    }

    async fn find_all(&self) -> StoreResult<Vec<Discount>> {
        let mut all = self.snapshot()?;
        all.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(all)
    }
}

fn poisoned() -> StoreError {
    StoreError::Internal("discount lock poisoned".to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
