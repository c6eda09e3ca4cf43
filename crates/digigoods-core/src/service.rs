//! # Discount Service
//!
//! The two operations checkout calls: validate, then (after pricing) redeem.
//!
//! ## Checkout Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout (external)                             │
//! │                                                                         │
//! │  1. validate_and_get_discounts(["VALID10", "SPRING5"])                 │
//! │       │  one batch lookup, fail-fast in request order                   │
//! │       ▼                                                                 │
//! │  2. price the order with the returned discounts                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. update_discount_usage(&mut discounts)                              │
//! │       │  one decrement_if_positive per discount (authoritative)         │
//! │       ▼                                                                 │
//! │  4. charge                                                             │
//! │                                                                         │
//! │  Step 1 is an optimistic pre-check for a good error message.           │
//! │  Step 3 can still fail with Exhausted if another checkout won the      │
//! │  last use in between. Rolling back is the caller's job: a failed       │
//! │  batch returns PartialRedemption listing what was consumed.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{DiscountResult, InvalidDiscount, PartialRedemption};
use crate::store::DiscountStore;
use crate::types::Discount;
use crate::validation::{check_discount, distinct_codes};

/// Validator and Redeemer over a [`DiscountStore`].
///
/// ## Usage
/// ```rust,ignore
/// let service = DiscountService::new(store);
///
/// let mut discounts = service.validate_and_get_discounts(&["VALID10"]).await?;
/// // ... price the order ...
/// service.update_discount_usage(&mut discounts).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DiscountService<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: DiscountStore> DiscountService<S> {
    /// Creates a service that reads "today" from the host calendar.
    pub fn new(store: S) -> Self {
        DiscountService {
            store,
            clock: SystemClock,
        }
    }
}

impl<S: DiscountStore, C: Clock> DiscountService<S, C> {
    /// Creates a service with an explicit clock.
    pub fn with_clock(store: S, clock: C) -> Self {
        DiscountService { store, clock }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists every discount (administrative use).
    pub async fn get_all_discounts(&self) -> DiscountResult<Vec<Discount>> {
        Ok(self.store.find_all().await?)
    }

    /// Resolves the requested codes and rejects the whole batch if any one
    /// of them cannot be used today.
    ///
    /// ## Behaviour
    /// - Empty `codes`: returns an empty list without touching the store
    /// - Duplicates are collapsed; the store is queried once
    /// - Unknown code: `CodeNotFound` for the first missing code in request order
    /// - Otherwise each record is checked in request order and the first
    ///   violation is returned (`Expired`, `NotYetValid`, `Exhausted`)
    ///
    /// The returned discounts follow request order. Nothing is mutated.
    pub async fn validate_and_get_discounts<T: AsRef<str>>(
        &self,
        codes: &[T],
    ) -> DiscountResult<Vec<Discount>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let requested = distinct_codes(codes);
        debug!(count = requested.len(), "Validating discount codes");

        let found = self.store.find_all_by_codes(&requested).await?;

        let mut by_code: HashMap<String, Discount> = found
            .into_iter()
            .map(|discount| (discount.code.clone(), discount))
            .collect();

        let mut discounts = Vec::with_capacity(requested.len());
        for code in &requested {
            match by_code.remove(code) {
                Some(discount) => discounts.push(discount),
                None => {
                    warn!(code = %code, "Discount code not found");
                    return Err(InvalidDiscount::CodeNotFound { code: code.clone() }.into());
                }
            }
        }

        if !by_code.is_empty() {
            warn!(
                unexpected = by_code.len(),
                "Store returned discounts for codes that were not requested"
            );
        }

        let today = self.clock.today();
        for discount in &discounts {
            if let Err(invalid) = check_discount(discount, today) {
                warn!(code = %discount.code, reason = invalid.reason(), "Discount rejected");
                return Err(invalid.into());
            }
        }

        Ok(discounts)
    }

    /// Consumes one use of a single discount.
    ///
    /// On success the caller's copy is decremented too, so it mirrors the
    /// store. Returns `Exhausted` when the store had no use left to give.
    pub async fn redeem(&self, discount: &mut Discount) -> DiscountResult<()> {
        if self.store.decrement_if_positive(&discount.id).await? {
            discount.remaining_uses -= 1;
            debug!(code = %discount.code, remaining_uses = discount.remaining_uses, "Discount redeemed");
            Ok(())
        } else {
            warn!(code = %discount.code, id = %discount.id, "Redemption lost: no remaining uses");
            Err(InvalidDiscount::Exhausted {
                code: discount.code.clone(),
            }
            .into())
        }
    }

    /// Attempts one use of every discount and reports each outcome.
    ///
    /// All attempts run concurrently and are independent. The returned
    /// results line up with `discounts`.
    pub async fn redeem_each(&self, discounts: &mut [Discount]) -> Vec<DiscountResult<()>> {
        join_all(discounts.iter_mut().map(|discount| self.redeem(discount))).await
    }

    /// Consumes one use from each discount.
    ///
    /// ## Behaviour
    /// - Empty input: no store calls
    /// - Every discount is attempted (see [`Self::redeem_each`])
    /// - Successful decrements are kept even when another one failed
    /// - A single discount reports its own error unchanged
    /// - A larger batch with any failure returns
    ///   [`DiscountError::PartialRedemption`](crate::DiscountError::PartialRedemption)
    ///   holding the consumed discounts and every failure, in input order
    pub async fn update_discount_usage(&self, discounts: &mut [Discount]) -> DiscountResult<()> {
        if discounts.is_empty() {
            return Ok(());
        }

        let results = self.redeem_each(discounts).await;

        if discounts.len() == 1 {
            return results.into_iter().next().unwrap_or(Ok(()));
        }

        let mut redeemed = Vec::new();
        let mut failures = Vec::new();
        for (discount, result) in discounts.iter().zip(results) {
            match result {
                Ok(()) => redeemed.push(discount.clone()),
                Err(err) => failures.push((discount.code.clone(), err)),
            }
        }

        if failures.is_empty() {
            return Ok(());
        }

        warn!(
            redeemed = redeemed.len(),
            failed = failures.len(),
            "Batch redemption partially failed"
        );
        Err(PartialRedemption { redeemed, failures }.into())
    }

    /// Validates the codes and immediately redeems them.
    ///
    /// For callers that do not need to price between the two steps. The
    /// redemption is still the authoritative check. Validation failures
    /// consume nothing; redemption failures follow
    /// [`Self::update_discount_usage`].
    pub async fn validate_and_redeem<T: AsRef<str>>(
        &self,
        codes: &[T],
    ) -> DiscountResult<Vec<Discount>> {
        let mut discounts = self.validate_and_get_discounts(codes).await?;
        self.update_discount_usage(&mut discounts).await?;
        Ok(discounts)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{Days, NaiveDate};

    use crate::clock::FixedClock;
    use crate::error::{DiscountError, PartialRedemption, StoreError, StoreResult};
    use crate::store::MemoryDiscountStore;
    use crate::types::{DiscountCodesRequest, NewDiscount};

    /// Counts calls before delegating to the memory store.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryDiscountStore,
        lookups: AtomicUsize,
        decrements: AtomicUsize,
        listings: AtomicUsize,
        /// When set, lookups return the records in reverse code order.
        reverse: bool,
        /// Ids whose decrement reports no remaining uses.
        refused: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DiscountStore for RecordingStore {
        async fn find_all_by_codes(&self, codes: &[String]) -> StoreResult<Vec<Discount>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            let mut found = self.inner.find_all_by_codes(codes).await?;
            if self.reverse {
                found.reverse();
            }
            Ok(found)
        }

        async fn decrement_if_positive(&self, id: &str) -> StoreResult<bool> {
            self.decrements.fetch_add(1, Ordering::SeqCst);
            if self.refused.lock().unwrap().iter().any(|refused| refused == id) {
                return Ok(false);
            }
            self.inner.decrement_if_positive(id).await
        }

        async fn find_all(&self) -> StoreResult<Vec<Discount>> {
            self.listings.fetch_add(1, Ordering::SeqCst);
            self.inner.find_all().await
        }
    }

    /// Fails every call, standing in for a dead database.
    struct DownStore;

    #[async_trait]
    impl DiscountStore for DownStore {
        async fn find_all_by_codes(&self, _codes: &[String]) -> StoreResult<Vec<Discount>> {
            Err(StoreError::Timeout)
        }

        async fn decrement_if_positive(&self, _id: &str) -> StoreResult<bool> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }

        async fn find_all(&self) -> StoreResult<Vec<Discount>> {
            Err(StoreError::Timeout)
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn new_discount(code: &str, remaining_uses: i64, from: NaiveDate, until: NaiveDate) -> NewDiscount {
        NewDiscount {
            code: code.to_string(),
            percentage_bps: 1000,
            remaining_uses,
            valid_from: from,
            valid_until: until,
        }
    }

    fn active(code: &str, remaining_uses: i64) -> NewDiscount {
        new_discount(
            code,
            remaining_uses,
            today() - Days::new(1),
            today() + Days::new(30),
        )
    }

    /// VALID10, EXPIRED20, FUTURE15, NOUSE25 around `today()`.
    fn seeded_store() -> Arc<RecordingStore> {
        let store = RecordingStore::default();
        store.inner.insert(active("VALID10", 5)).unwrap();
        store
            .inner
            .insert(new_discount(
                "EXPIRED20",
                3,
                today() - Days::new(30),
                today() - Days::new(1),
            ))
            .unwrap();
        store
            .inner
            .insert(new_discount(
                "FUTURE15",
                2,
                today() + Days::new(1),
                today() + Days::new(30),
            ))
            .unwrap();
        store.inner.insert(active("NOUSE25", 0)).unwrap();
        Arc::new(store)
    }

    fn service(store: Arc<RecordingStore>) -> DiscountService<Arc<RecordingStore>, FixedClock> {
        DiscountService::with_clock(store, FixedClock(today()))
    }

    fn invalid(err: DiscountError) -> InvalidDiscount {
        match err {
            DiscountError::Invalid(invalid) => invalid,
            other => panic!("expected invalid discount, got {other:?}"),
        }
    }

    fn invalid_ref(err: &DiscountError) -> &InvalidDiscount {
        err.as_invalid().expect("expected invalid discount")
    }

    fn partial(err: DiscountError) -> PartialRedemption {
        match err {
            DiscountError::PartialRedemption(partial) => partial,
            other => panic!("expected partial redemption, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_all_discounts() {
        let store = seeded_store();
        let svc = service(store.clone());

        let all = svc.get_all_discounts().await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(store.listings.load(Ordering::SeqCst), 1);

        let empty = service(Arc::new(RecordingStore::default()));
        assert!(empty.get_all_discounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_valid_code_returns_discount() {
        let store = seeded_store();
        let svc = service(store.clone());

        let discounts = svc.validate_and_get_discounts(&["VALID10"]).await.unwrap();
        assert_eq!(discounts.len(), 1);
        assert_eq!(discounts[0].code, "VALID10");
        assert_eq!(discounts[0].remaining_uses, 5);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_codes_skip_lookup() {
        let store = seeded_store();
        let svc = service(store.clone());

        let discounts = svc.validate_and_get_discounts::<&str>(&[]).await.unwrap();
        assert!(discounts.is_empty());

        let request: DiscountCodesRequest =
            serde_json::from_str(r#"{"discount_codes": null}"#).unwrap();
        let discounts = svc.validate_and_get_discounts(request.codes()).await.unwrap();
        assert!(discounts.is_empty());

        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_code_not_found() {
        let svc = service(seeded_store());

        let err = svc
            .validate_and_get_discounts(&["VALID10", "GHOST"])
            .await
            .unwrap_err();
        let err = invalid(err);
        assert_eq!(
            err,
            InvalidDiscount::CodeNotFound {
                code: "GHOST".to_string()
            }
        );
        assert!(err.to_string().contains("discount code not found"));
    }

    #[tokio::test]
    async fn test_expired_code() {
        let store = seeded_store();
        let svc = service(store.clone());

        let err = svc.validate_and_get_discounts(&["EXPIRED20"]).await.unwrap_err();
        assert!(err.to_string().contains("discount has expired"));
        assert!(matches!(invalid(err), InvalidDiscount::Expired { .. }));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_future_code() {
        let svc = service(seeded_store());

        let err = svc.validate_and_get_discounts(&["FUTURE15"]).await.unwrap_err();
        assert!(err.to_string().contains("discount is not yet valid"));
    }

    #[tokio::test]
    async fn test_code_without_uses() {
        let svc = service(seeded_store());

        let err = svc.validate_and_get_discounts(&["NOUSE25"]).await.unwrap_err();
        assert!(err.to_string().contains("discount has no remaining uses"));
        assert!(matches!(invalid(err), InvalidDiscount::Exhausted { .. }));
    }

    #[tokio::test]
    async fn test_duplicates_collapse_into_one_lookup() {
        let store = seeded_store();
        let svc = service(store.clone());

        let discounts = svc
            .validate_and_get_discounts(&["VALID10", "VALID10"])
            .await
            .unwrap();
        assert_eq!(discounts.len(), 1);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_violation_in_request_order_wins() {
        let store = Arc::new(RecordingStore {
            reverse: true,
            ..Default::default()
        });
        store.inner.insert(active("AAA-OK", 1)).unwrap();
        store.inner.insert(active("BBB-EMPTY", 0)).unwrap();
        store
            .inner
            .insert(new_discount(
                "CCC-OLD",
                1,
                today() - Days::new(10),
                today() - Days::new(5),
            ))
            .unwrap();
        let svc = service(store);

        // Store hands back CCC, BBB, AAA; request order decides.
        let err = svc
            .validate_and_get_discounts(&["AAA-OK", "BBB-EMPTY", "CCC-OLD"])
            .await
            .unwrap_err();
        assert_eq!(
            invalid(err),
            InvalidDiscount::Exhausted {
                code: "BBB-EMPTY".to_string()
            }
        );

        let err = svc
            .validate_and_get_discounts(&["CCC-OLD", "BBB-EMPTY"])
            .await
            .unwrap_err();
        assert!(matches!(invalid(err), InvalidDiscount::Expired { .. }));
    }

    #[tokio::test]
    async fn test_result_follows_request_order() {
        let store = Arc::new(RecordingStore {
            reverse: true,
            ..Default::default()
        });
        store.inner.insert(active("ONE", 1)).unwrap();
        store.inner.insert(active("TWO", 1)).unwrap();
        let svc = service(store);

        let discounts = svc.validate_and_get_discounts(&["ONE", "TWO"]).await.unwrap();
        let codes: Vec<_> = discounts.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, ["ONE", "TWO"]);
    }

    #[tokio::test]
    async fn test_update_usage_decrements_and_persists() {
        let store = seeded_store();
        let svc = service(store.clone());

        let mut discounts = svc.validate_and_get_discounts(&["VALID10"]).await.unwrap();
        svc.update_discount_usage(&mut discounts).await.unwrap();

        assert_eq!(discounts[0].remaining_uses, 4);
        let stored = store.inner.get(&discounts[0].id).unwrap().unwrap();
        assert_eq!(stored.remaining_uses, 4);
        assert_eq!(store.decrements.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_update_usage_multiple_discounts() {
        let store = Arc::new(RecordingStore::default());
        store.inner.insert(active("MULTI1", 3)).unwrap();
        store.inner.insert(active("MULTI2", 2)).unwrap();
        let svc = service(store.clone());

        let mut discounts = svc
            .validate_and_get_discounts(&["MULTI1", "MULTI2"])
            .await
            .unwrap();
        svc.update_discount_usage(&mut discounts).await.unwrap();

        assert_eq!(discounts[0].remaining_uses, 2);
        assert_eq!(discounts[1].remaining_uses, 1);
        assert_eq!(store.decrements.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_update_usage_empty_is_noop() {
        let store = seeded_store();
        let svc = service(store.clone());

        svc.update_discount_usage(&mut []).await.unwrap();
        assert_eq!(store.decrements.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_validation_loses_to_redemption_check() {
        let store = Arc::new(RecordingStore::default());
        store.inner.insert(active("LAST1", 1)).unwrap();
        let svc = service(store.clone());

        let mut first = svc.validate_and_get_discounts(&["LAST1"]).await.unwrap();
        let mut second = svc.validate_and_get_discounts(&["LAST1"]).await.unwrap();

        svc.update_discount_usage(&mut first).await.unwrap();
        let err = svc.update_discount_usage(&mut second).await.unwrap_err();

        assert!(matches!(invalid(err), InvalidDiscount::Exhausted { .. }));
        assert_eq!(second[0].remaining_uses, 1);
        let stored = store.inner.get(&first[0].id).unwrap().unwrap();
        assert_eq!(stored.remaining_uses, 0);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_other_decrements() {
        let store = Arc::new(RecordingStore::default());
        store.inner.insert(active("PLENTY", 5)).unwrap();
        store.inner.insert(active("SCARCE", 1)).unwrap();
        let svc = service(store.clone());

        let mut stale = svc
            .validate_and_get_discounts(&["SCARCE", "PLENTY"])
            .await
            .unwrap();
        svc.validate_and_redeem(&["SCARCE"]).await.unwrap();

        let err = svc.update_discount_usage(&mut stale).await.unwrap_err();
        assert!(!err.is_retryable());
        let partial = partial(err);
        assert_eq!(partial.failed_codes().collect::<Vec<_>>(), ["SCARCE"]);
        assert!(matches!(
            partial.failures[0].1,
            DiscountError::Invalid(InvalidDiscount::Exhausted { .. })
        ));

        // PLENTY was attempted and stays decremented.
        assert_eq!(partial.redeemed.len(), 1);
        assert_eq!(partial.redeemed[0].code, "PLENTY");
        assert_eq!(partial.redeemed[0].remaining_uses, 4);
        assert_eq!(stale[1].remaining_uses, 4);
        assert_eq!(store.decrements.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_validate_and_redeem_reports_every_failure() {
        let store = Arc::new(RecordingStore::default());
        let kept = store.inner.insert(active("A", 5)).unwrap();
        let lost_b = store.inner.insert(active("B", 5)).unwrap();
        let lost_c = store.inner.insert(active("C", 5)).unwrap();
        store.refused.lock().unwrap().extend([lost_b.id, lost_c.id]);
        let svc = service(store.clone());

        let err = svc.validate_and_redeem(&["A", "B", "C"]).await.unwrap_err();
        let partial = partial(err);

        assert_eq!(partial.failed_codes().collect::<Vec<_>>(), ["B", "C"]);
        for (code, err) in &partial.failures {
            assert_eq!(invalid_ref(err).code(), code);
        }

        // A's use is gone and handed back for compensation.
        assert_eq!(partial.redeemed.len(), 1);
        assert_eq!(partial.redeemed[0].id, kept.id);
        assert_eq!(partial.redeemed[0].remaining_uses, 4);
        let stored = store.inner.get(&kept.id).unwrap().unwrap();
        assert_eq!(stored.remaining_uses, 4);
    }

    #[tokio::test]
    async fn test_redeem_unknown_id_is_exhausted() {
        let store = seeded_store();
        let svc = service(store);

        let mut ghost = active("GHOST", 3).into_discount("no-such-id".to_string(), chrono::Utc::now());
        let err = svc.redeem(&mut ghost).await.unwrap_err();

        assert!(matches!(invalid(err), InvalidDiscount::Exhausted { .. }));
        assert_eq!(ghost.remaining_uses, 3);
    }

    #[tokio::test]
    async fn test_redeem_each_reports_per_discount() {
        let store = Arc::new(RecordingStore::default());
        store.inner.insert(active("FIRST", 1)).unwrap();
        store.inner.insert(active("SECOND", 1)).unwrap();
        let svc = service(store);

        let mut discounts = svc
            .validate_and_get_discounts(&["FIRST", "SECOND"])
            .await
            .unwrap();
        assert!(svc.redeem_each(&mut discounts).await.iter().all(Result::is_ok));

        let results = svc.redeem_each(&mut discounts).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(Result::is_err));
    }

    #[tokio::test]
    async fn test_store_errors_propagate_unchanged() {
        let svc = DiscountService::with_clock(DownStore, FixedClock(today()));

        let err = svc.validate_and_get_discounts(&["ANY"]).await.unwrap_err();
        assert!(matches!(err, DiscountError::Store(StoreError::Timeout)));
        assert!(err.is_retryable());

        let mut discounts = vec![active("ANY", 1).into_discount("id".to_string(), chrono::Utc::now())];
        let err = svc.update_discount_usage(&mut discounts).await.unwrap_err();
        assert!(matches!(err, DiscountError::Store(StoreError::Unavailable(_))));
        assert_eq!(discounts[0].remaining_uses, 1);

        // Nothing consumed, so the whole batch may be retried.
        let mut batch = vec![
            active("ONE", 1).into_discount("id-1".to_string(), chrono::Utc::now()),
            active("TWO", 1).into_discount("id-2".to_string(), chrono::Utc::now()),
        ];
        let err = svc.update_discount_usage(&mut batch).await.unwrap_err();
        assert!(err.is_retryable());
        let partial = partial(err);
        assert!(partial.redeemed.is_empty());
        assert_eq!(partial.failed_codes().collect::<Vec<_>>(), ["ONE", "TWO"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redemptions_never_oversell() {
        let store = Arc::new(MemoryDiscountStore::new());
        store.insert(active("RACE", 1)).unwrap();
        let svc = Arc::new(DiscountService::with_clock(store.clone(), FixedClock(today())));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                let mut discounts = svc.validate_and_get_discounts(&["RACE"]).await?;
                svc.update_discount_usage(&mut discounts).await
            }));
        }

        let mut succeeded = 0;
        let mut exhausted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => succeeded += 1,
                Err(DiscountError::Invalid(InvalidDiscount::Exhausted { .. })) => exhausted += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(exhausted, 9);
        let all = store.find_all().await.unwrap();
        assert_eq!(all[0].remaining_uses, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redemptions_exactly_k_succeed() {
        const ATTEMPTS: usize = 50;
        const USES: i64 = 7;

        let store = Arc::new(MemoryDiscountStore::new());
        let stored = store.insert(active("QUOTA7", USES)).unwrap();
        let svc = Arc::new(DiscountService::with_clock(store.clone(), FixedClock(today())));

        let handles: Vec<_> = (0..ATTEMPTS)
            .map(|_| {
                let svc = svc.clone();
                let mut discount = stored.clone();
                tokio::spawn(async move { svc.redeem(&mut discount).await })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, USES as usize);
        let after = store.get(&stored.id).unwrap().unwrap();
        assert_eq!(after.remaining_uses, 0);
        assert_eq!(after.version, USES);
    }
}
