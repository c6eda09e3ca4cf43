//! # digigoods-db: Database Layer for the Discount Engine
//!
//! SQLite-backed [`DiscountStore`](digigoods_core::DiscountStore) using sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Discount Data Flow                               │
//! │                                                                         │
//! │  DiscountService (digigoods-core)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   digigoods-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌──────────────┐ │   │
//! │  │   │   Database    │    │   Repositories   │   │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │  (discount.rs)   │   │  (embedded)  │ │   │
//! │  │   │               │    │                  │   │              │ │   │
//! │  │   │ SqlitePool    │◄───│ DiscountRepo     │   │ 001_discounts│ │   │
//! │  │   │ StoreConfig   │    │ (DiscountStore)  │   │              │ │   │
//! │  │   └───────────────┘    └──────────────────┘   └──────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (DIGIGOODS_DB_PATH)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment-driven store configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use digigoods_core::DiscountService;
//! use digigoods_db::{Database, StoreConfig};
//!
//! let db = Database::new(StoreConfig::load()?.into_db_config()).await?;
//! let service = DiscountService::new(db.discounts());
//!
//! let mut discounts = service.validate_and_get_discounts(&codes).await?;
//! // ... price the order ...
//! service.update_discount_usage(&mut discounts).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StoreConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::discount::DiscountRepository;

/// Installs the `tracing` subscriber used by binaries in this workspace.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=digigoods_db=trace` - Show trace for this crate only
/// - Default: `info,digigoods=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,digigoods=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
