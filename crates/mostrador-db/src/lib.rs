//! # mostrador-db: Ledger Storage Layer
//!
//! SQLite persistence for the Mostrador stock ledger.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repositories (product, sale, expense, dashboard)
//! - [`delivery`] - Bulk application of ingested delivery records
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mostrador_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("mostrador.db")).await?;
//!
//! // Upsert-with-accumulation: ingestion adds stock, metadata is overwritten
//! db.products()
//!     .upsert_accumulate("COKE-330", "Coca-Cola 330ml", 0.45, 1.20, 24)
//!     .await?;
//!
//! // Atomic multi-line sale
//! let outcome = db.sales().process_sale(&lines).await?;
//!
//! // Dashboard aggregates, recomputed per call
//! let snapshot = db.dashboard().snapshot().await?;
//! ```
//!
//! Every mutating operation runs in its own transaction: a failed sale or
//! upsert rolls back completely, and concurrent readers never observe a
//! partially applied state.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod delivery;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use delivery::{DeliveryFailure, DeliveryReport};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::dashboard::DashboardRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
