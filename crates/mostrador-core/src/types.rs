//! # Domain Types
//!
//! Core domain types used throughout Mostrador.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                               │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐      │
//! │  │    Product     │   │  Sale (ticket) │   │    Expense     │      │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │      │
//! │  │  id (seq)      │   │  id (seq)      │   │  id (seq)      │      │
//! │  │  code (unique) │   │  total         │   │  concept       │      │
//! │  │  cost / price  │   │  lines (JSON   │   │  amount        │      │
//! │  │  stock (delta  │   │   snapshot,    │   │  category      │      │
//! │  │   mutations)   │   │   immutable)   │   │                │      │
//! │  └────────────────┘   └────────────────┘   └────────────────┘      │
//! │                                                                     │
//! │  DeliveryRecord: the canonical `{code,name,cost,price,quantity}`    │
//! │  shape every ingestion path produces, always fed into the ledger's  │
//! │  upsert-with-accumulation.                                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity Pattern
//! Every stored entity has a SQLite sequence `id` for internal relations;
//! products additionally carry `code`, the stable external identifier
//! (SKU / barcode) that upserts and sale lines are keyed on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Product
// =============================================================================

/// A product in the stock ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Auto-assigned sequence number.
    pub id: i64,

    /// Stable external identifier (SKU / barcode). Unique; upserts key on it.
    pub code: String,

    /// Display name shown to the cashier and on tickets.
    pub name: String,

    /// Unit acquisition price.
    pub cost: f64,

    /// Unit sale price.
    pub price: f64,

    /// Current stock. May go negative: sales decrement unconditionally and
    /// oversold inventory is represented rather than blocked.
    pub stock: i64,

    /// When the product was first created.
    pub created_at: DateTime<Utc>,

    /// When the product was last upserted or sold.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale (Ticket)
// =============================================================================

/// A committed sale. Immutable once written: `total` and `lines` are a
/// receipt, not a live view of current prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    /// Auto-assigned sequence number.
    pub id: i64,

    /// When the sale was committed.
    pub created_at: DateTime<Utc>,

    /// Sum of `price * quantity` over the lines that were applied.
    pub total: f64,

    /// JSON snapshot of the submitted lines, serialized at commit time.
    pub lines: String,
}

impl Sale {
    /// Parses the stored line snapshot.
    ///
    /// A ticket written by an older build (or a hand-edited row) may carry a
    /// snapshot that no longer deserializes; that yields an empty list, not
    /// an error, so history listings keep working.
    pub fn parsed_lines(&self) -> Vec<SaleLine> {
        serde_json::from_str(&self.lines).unwrap_or_default()
    }
}

/// One line of a sale snapshot. Product data is frozen at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    /// Product code as submitted.
    pub code: String,
    /// Product name at time of sale. Falls back to the raw code when the
    /// product was unknown at commit time.
    pub name: String,
    /// Unit price as submitted by the till (price overrides are trusted).
    pub price: f64,
    /// Quantity sold.
    pub quantity: i64,
}

/// A sale line as submitted by the till: `{code, quantity, price}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineRequest {
    pub code: String,
    pub quantity: i64,
    pub price: f64,
}

/// Per-line result of sale processing.
///
/// A line referencing an unknown code is skipped rather than aborting the
/// whole ticket; the outcome records that so a stricter caller can reject
/// tickets containing skips without a redesign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    /// Stock was decremented and the line contributed to the total.
    Applied,
    /// No product with this code; line excluded from the total, no stock
    /// touched.
    SkippedMissing,
}

/// Outcome of one submitted line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineOutcome {
    pub code: String,
    pub quantity: i64,
    /// `price * quantity` for applied lines, `0.0` for skipped ones.
    pub line_total: f64,
    pub status: LineStatus,
}

/// Result of a committed sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleOutcome {
    /// Sequence number of the stored ticket.
    pub sale_id: i64,
    /// Total over applied lines.
    pub total: f64,
    /// One outcome per submitted line, in submission order.
    pub lines: Vec<LineOutcome>,
}

impl SaleOutcome {
    /// True when every submitted line was applied.
    pub fn is_clean(&self) -> bool {
        self.lines.iter().all(|l| l.status == LineStatus::Applied)
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A recorded expense, independent of products and sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    /// Auto-assigned sequence number.
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub concept: String,
    pub amount: f64,
    pub category: String,
}

// =============================================================================
// Delivery Record
// =============================================================================

/// The canonical record both ingestion paths produce.
///
/// Transient: never persisted standalone, always fed into the ledger's
/// upsert-with-accumulation (`quantity` is the stock delta to add).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub code: String,
    pub name: String,
    pub cost: f64,
    pub price: f64,
    pub quantity: i64,
}

// =============================================================================
// Upsert Action
// =============================================================================

/// Whether an upsert created a new product or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    Created,
    Updated,
}

// =============================================================================
// Dashboard Types
// =============================================================================

/// Per-day sale total within the trailing history window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DailySales {
    /// Calendar day, `YYYY-MM-DD`.
    pub day: String,
    pub total: f64,
}

/// Aggregate valuation of the whole inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryValue {
    /// Sum of stock across all products.
    pub total_items: i64,
    /// Sum of `stock * cost`.
    pub cost_value: f64,
    /// Sum of `stock * price`.
    pub retail_value: f64,
}

/// One entry of the top-sellers ranking, grouped by snapshot name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TopSeller {
    pub name: String,
    pub quantity: i64,
}

/// The dashboard aggregate, recomputed from ledger state on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Sales total for the local calendar day.
    pub sales_today: f64,
    /// Expense total for the local calendar day.
    pub expenses_today: f64,
    /// `sales_today - expenses_today`.
    pub profit_today: f64,
    /// Products at or below the low-stock threshold, ascending by stock.
    pub low_stock: Vec<Product>,
    /// Per-day totals for the trailing week, ascending by date.
    pub history: Vec<DailySales>,
    pub inventory: InventoryValue,
    /// Top products by quantity sold, descending.
    pub top_selling: Vec<TopSeller>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_parsed_lines_round_trip() {
        let lines = vec![
            SaleLine {
                code: "A-1".to_string(),
                name: "Widget".to_string(),
                price: 10.0,
                quantity: 2,
            },
            SaleLine {
                code: "B-2".to_string(),
                name: "Gadget".to_string(),
                price: 5.0,
                quantity: 1,
            },
        ];
        let sale = Sale {
            id: 1,
            created_at: Utc::now(),
            total: 25.0,
            lines: serde_json::to_string(&lines).unwrap(),
        };

        assert_eq!(sale.parsed_lines(), lines);
    }

    #[test]
    fn test_sale_parsed_lines_tolerates_garbage() {
        let sale = Sale {
            id: 1,
            created_at: Utc::now(),
            total: 0.0,
            lines: "not json".to_string(),
        };
        assert!(sale.parsed_lines().is_empty());
    }

    #[test]
    fn test_sale_outcome_is_clean() {
        let mut outcome = SaleOutcome {
            sale_id: 1,
            total: 10.0,
            lines: vec![LineOutcome {
                code: "A".to_string(),
                quantity: 1,
                line_total: 10.0,
                status: LineStatus::Applied,
            }],
        };
        assert!(outcome.is_clean());

        outcome.lines.push(LineOutcome {
            code: "GHOST".to_string(),
            quantity: 1,
            line_total: 0.0,
            status: LineStatus::SkippedMissing,
        });
        assert!(!outcome.is_clean());
    }
}
