//! # mostrador-core: Pure Domain Logic
//!
//! The heart of Mostrador: domain types and validation rules with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Mostrador Data Flow                            │
//! │                                                                     │
//! │  delivery document ──► mostrador-ingest ──► Vec<DeliveryRecord>    │
//! │                                                   │                 │
//! │                                                   ▼                 │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │              ★ mostrador-core (THIS CRATE) ★                  │ │
//! │  │                                                               │ │
//! │  │   ┌───────────┐      ┌───────────┐      ┌─────────────┐      │ │
//! │  │   │   types   │      │   error   │      │ validation  │      │ │
//! │  │   │  Product  │      │ CoreError │      │   rules     │      │ │
//! │  │   │  Sale     │      │ Validation│      │   checks    │      │ │
//! │  │   └───────────┘      └───────────┘      └─────────────┘      │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │                                                   │                 │
//! │                                                   ▼                 │
//! │                     mostrador-db (ledger, sales, dashboard)         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Expense, DeliveryRecord, ...)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level at or below which a product counts as low-stock on the
/// dashboard.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum number of low-stock products shown on the dashboard.
pub const LOW_STOCK_LIMIT: u32 = 5;

/// Maximum number of top-selling products shown on the dashboard.
pub const TOP_SELLING_LIMIT: u32 = 5;

/// Trailing window, in days, of the dashboard sales history.
pub const SALES_HISTORY_DAYS: u32 = 7;

/// Category assigned to expenses recorded without one.
pub const DEFAULT_EXPENSE_CATEGORY: &str = "General";
