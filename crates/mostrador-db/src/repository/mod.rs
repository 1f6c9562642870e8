//! # Repository Module
//!
//! Database access behind typed APIs, one repository per concern.
//!
//! - [`product::ProductRepository`] - the product ledger: upsert-with-
//!   accumulation, lookup, search, delete
//! - [`sale::SaleRepository`] - atomic multi-line sale processing and ticket
//!   history
//! - [`expense::ExpenseRepository`] - expense CRUD
//! - [`dashboard::DashboardRepository`] - read-only dashboard aggregates
//!
//! All SQL lives here. Callers get domain types from `mostrador-core` and
//! typed `DbError`s back; raw sqlx errors never cross this boundary.

pub mod dashboard;
pub mod expense;
pub mod product;
pub mod sale;
