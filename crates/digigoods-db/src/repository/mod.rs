//! # Repository Module
//!
//! Database repository implementations for the discount engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  DiscountService (digigoods-core)                                      │
//! │       │                                                                 │
//! │       │  store.decrement_if_positive(id)                               │
//! │       ▼                                                                 │
//! │  DiscountRepository (implements DiscountStore)                         │
//! │  ├── get_by_codes(&self, codes)                                        │
//! │  ├── decrement_remaining_uses(&self, id)                               │
//! │  ├── list(&self)                                                       │
//! │  └── insert(&self, new_discount)                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`DiscountRepository`](discount::DiscountRepository) - Discount lookup and consumption

pub mod discount;
