//! # Dashboard Repository
//!
//! Read-only aggregates over the ledger, sale history and expenses.
//! Everything is recomputed on every call - no caching, so the snapshot can
//! never drift from a sale committed a millisecond earlier.
//!
//! ## Snapshot Contents
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  sales_today / expenses_today / profit_today   (local calendar day) │
//! │  low_stock      stock <= 5, ascending, max 5                        │
//! │  history        per-day sale totals, trailing 7 days, ascending     │
//! │  inventory      Σ stock, Σ stock·cost, Σ stock·price                │
//! │  top_selling    sale-line snapshots exploded with json_each,        │
//! │                 grouped by name, top 5 by quantity                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use mostrador_core::{
    DailySales, DashboardSnapshot, InventoryValue, Product, TopSeller, LOW_STOCK_LIMIT,
    LOW_STOCK_THRESHOLD, SALES_HISTORY_DAYS, TOP_SELLING_LIMIT,
};

/// Repository for dashboard aggregation queries.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    /// Creates a new DashboardRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Builds the full dashboard snapshot.
    pub async fn snapshot(&self) -> DbResult<DashboardSnapshot> {
        debug!("building dashboard snapshot");

        let sales_today = self.sales_today().await?;
        let expenses_today = self.expenses_today().await?;
        let low_stock = self.low_stock().await?;
        let history = self.history().await?;
        let inventory = self.inventory_value().await?;
        let top_selling = self.top_selling().await?;

        Ok(DashboardSnapshot {
            sales_today,
            expenses_today,
            profit_today: sales_today - expenses_today,
            low_stock,
            history,
            inventory,
            top_selling,
        })
    }

    /// Sum of sale totals for the local calendar day.
    pub async fn sales_today(&self) -> DbResult<f64> {
        let total: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total), 0.0) FROM sales
            WHERE date(created_at, 'localtime') = date('now', 'localtime')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Sum of expense amounts for the local calendar day.
    pub async fn expenses_today(&self) -> DbResult<f64> {
        let total: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0.0) FROM expenses
            WHERE date(created_at, 'localtime') = date('now', 'localtime')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Products at or below the low-stock threshold, ascending by stock,
    /// capped at [`LOW_STOCK_LIMIT`].
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, cost, price, stock, created_at, updated_at
            FROM products
            WHERE stock <= ?1
            ORDER BY stock ASC
            LIMIT ?2
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .bind(LOW_STOCK_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Per-day sale totals for the trailing week, ascending by date.
    pub async fn history(&self) -> DbResult<Vec<DailySales>> {
        let modifier = format!("-{SALES_HISTORY_DAYS} days");

        let history = sqlx::query_as::<_, DailySales>(
            r#"
            SELECT date(created_at, 'localtime') AS day, SUM(total) AS total
            FROM sales
            WHERE created_at >= datetime('now', ?1)
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(modifier)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }

    /// Aggregate stock count and valuation at cost and at retail price.
    pub async fn inventory_value(&self) -> DbResult<InventoryValue> {
        let inventory = sqlx::query_as::<_, InventoryValue>(
            r#"
            SELECT
                CAST(COALESCE(SUM(stock), 0) AS INTEGER) AS total_items,
                COALESCE(SUM(stock * cost), 0.0)         AS cost_value,
                COALESCE(SUM(stock * price), 0.0)        AS retail_value
            FROM products
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(inventory)
    }

    /// Top products by quantity sold, descending, capped at
    /// [`TOP_SELLING_LIMIT`].
    ///
    /// Every stored ticket's line snapshot is exploded with `json_each` and
    /// grouped by the name frozen at sale time - renaming or deleting a
    /// product never rewrites its sales ranking.
    pub async fn top_selling(&self) -> DbResult<Vec<TopSeller>> {
        let top = sqlx::query_as::<_, TopSeller>(
            r#"
            SELECT
                json_extract(value, '$.name')                         AS name,
                CAST(SUM(json_extract(value, '$.quantity')) AS INTEGER) AS quantity
            FROM sales, json_each(sales.lines)
            WHERE json_extract(value, '$.name') IS NOT NULL
            GROUP BY name
            ORDER BY quantity DESC
            LIMIT ?1
            "#,
        )
        .bind(TOP_SELLING_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(top)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
