//! # digigoods-core: Discount Validation & Redemption Engine
//!
//! Enforces validity windows and finite-use quotas on discount codes applied
//! at checkout, without ever overselling a discount's remaining uses.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     DigiGoods Checkout Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Checkout / HTTP / Admin (outside this workspace)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ digigoods-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  service  │  │validation │  │   store   │  │   clock   │  │   │
//! │  │   │ Validator │  │  window   │  │  contract │  │  today()  │  │   │
//! │  │   │ Redeemer  │  │  quota    │  │  memory   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └─────┬─────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────┼───────────────────────┘   │
//! │                                            │ DiscountStore             │
//! │  ┌─────────────────────────────────────────▼───────────────────────┐   │
//! │  │                digigoods-db (SQLite DiscountStore)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `Discount`, `Percentage`, request DTOs
//! - [`error`] - Error taxonomy
//! - [`validation`] - Pure per-record rules
//! - [`clock`] - Injectable "today"
//! - [`store`] - `DiscountStore` contract and in-memory implementation
//! - [`service`] - `DiscountService` (validate, redeem)
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Days, Local};
//! use digigoods_core::{DiscountService, MemoryDiscountStore, NewDiscount};
//!
//! # tokio_test_block(async {
//! let today = Local::now().date_naive();
//! let store = MemoryDiscountStore::new();
//! store.insert(NewDiscount {
//!     code: "VALID10".to_string(),
//!     percentage_bps: 1000,
//!     remaining_uses: 5,
//!     valid_from: today - Days::new(1),
//!     valid_until: today + Days::new(30),
//! }).unwrap();
//!
//! let service = DiscountService::new(store);
//! let mut discounts = service.validate_and_get_discounts(&["VALID10"]).await.unwrap();
//! service.update_discount_usage(&mut discounts).await.unwrap();
//! assert_eq!(discounts[0].remaining_uses, 4);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{
    DiscountError, DiscountResult, InvalidDiscount, PartialRedemption, StoreError, StoreResult,
    ValidationError,
};
pub use service::DiscountService;
pub use store::{DiscountStore, MemoryDiscountStore};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Longest discount code accepted when creating a discount.
pub const MAX_CODE_LENGTH: usize = 64;
