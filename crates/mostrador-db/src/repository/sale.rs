//! # Sale Repository
//!
//! Atomic multi-line sale processing and ticket history.
//!
//! ## Sale Processing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  process_sale(lines)                                                │
//! │                                                                     │
//! │  Started ──► Validating ──► Applying ──► Committed                  │
//! │                  │              │                                   │
//! │                  └──────────────┴────────► RolledBack               │
//! │                                                                     │
//! │  BEGIN                                                              │
//! │    for each line:                                                   │
//! │      lookup by code ── missing? ──► skip line (not in total)        │
//! │      UPDATE products SET stock = stock - qty   (no floor check)     │
//! │    INSERT sale (total, JSON snapshot of submitted lines)            │
//! │  COMMIT                                                             │
//! │                                                                     │
//! │  Any failure mid-loop rolls the whole transaction back: no partial  │
//! │  stock decrement ever becomes visible.                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decrement is a single `stock = stock - ?` statement, never a
//! read-then-write, and stock is allowed to go negative: an oversold shelf
//! is recorded rather than blocking the till.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use mostrador_core::validation::{validate_amount, validate_code, validate_quantity};
use mostrador_core::{
    CoreError, LineOutcome, LineStatus, Sale, SaleLine, SaleLineRequest, SaleOutcome,
};

/// Repository for sale operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Validates and atomically applies a multi-line sale.
    ///
    /// ## Semantics
    /// - Empty line list fails immediately with an empty-ticket error.
    /// - A line whose code is unknown is *skipped*: it does not contribute
    ///   to the total and touches no stock, but the ticket still commits.
    ///   The per-line [`LineStatus`] in the outcome records the skip so a
    ///   stricter caller can reject such tickets.
    /// - Found lines decrement stock unconditionally (negative stock passes
    ///   through) and contribute `price * quantity` using the price supplied
    ///   in the request - the till's price override is trusted as-is.
    /// - The stored ticket carries the computed total and an immutable JSON
    ///   snapshot of every submitted line, with name-at-time from the ledger
    ///   where the product was found.
    ///
    /// All of this happens in one transaction; on any failure the
    /// transaction is dropped and SQLite rolls it back.
    pub async fn process_sale(&self, lines: &[SaleLineRequest]) -> DbResult<SaleOutcome> {
        if lines.is_empty() {
            return Err(CoreError::EmptyTicket.into());
        }

        for line in lines {
            validate_code(&line.code).map_err(CoreError::from)?;
            validate_quantity(line.quantity).map_err(CoreError::from)?;
            validate_amount("price", line.price).map_err(CoreError::from)?;
        }

        debug!(lines = lines.len(), "processing sale");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut total = 0.0_f64;
        let mut outcomes = Vec::with_capacity(lines.len());
        let mut snapshot = Vec::with_capacity(lines.len());

        for line in lines {
            let code = line.code.trim();

            let found: Option<(String,)> =
                sqlx::query_as("SELECT name FROM products WHERE code = ?1")
                    .bind(code)
                    .fetch_optional(&mut *tx)
                    .await?;

            match found {
                Some((name,)) => {
                    sqlx::query(
                        "UPDATE products SET stock = stock - ?1, updated_at = ?2 WHERE code = ?3",
                    )
                    .bind(line.quantity)
                    .bind(now)
                    .bind(code)
                    .execute(&mut *tx)
                    .await?;

                    let line_total = line.price * line.quantity as f64;
                    total += line_total;

                    outcomes.push(LineOutcome {
                        code: code.to_string(),
                        quantity: line.quantity,
                        line_total,
                        status: LineStatus::Applied,
                    });
                    snapshot.push(SaleLine {
                        code: code.to_string(),
                        name,
                        price: line.price,
                        quantity: line.quantity,
                    });
                }
                None => {
                    // Permissive policy: an unknown code does not abort the
                    // ticket. The raw code stands in for the display name in
                    // the snapshot.
                    warn!(code = %code, "sale line skipped: no such product");

                    outcomes.push(LineOutcome {
                        code: code.to_string(),
                        quantity: line.quantity,
                        line_total: 0.0,
                        status: LineStatus::SkippedMissing,
                    });
                    snapshot.push(SaleLine {
                        code: code.to_string(),
                        name: code.to_string(),
                        price: line.price,
                        quantity: line.quantity,
                    });
                }
            }
        }

        let lines_json =
            serde_json::to_string(&snapshot).map_err(|e| DbError::Internal(e.to_string()))?;

        let result = sqlx::query("INSERT INTO sales (created_at, total, lines) VALUES (?1, ?2, ?3)")
            .bind(now)
            .bind(total)
            .bind(&lines_json)
            .execute(&mut *tx)
            .await?;

        let sale_id = result.last_insert_rowid();

        tx.commit().await?;

        info!(sale_id = %sale_id, total = %total, lines = outcomes.len(), "sale committed");

        Ok(SaleOutcome {
            sale_id,
            total,
            lines: outcomes,
        })
    }

    /// Gets a sale by its sequence id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, created_at, total, lines FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists recent sales, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, created_at, total, lines
            FROM sales
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn line(code: &str, quantity: i64, price: f64) -> SaleLineRequest {
        SaleLineRequest {
            code: code.to_string(),
            quantity,
            price,
        }
    }

    async fn seed_product(db: &Database, code: &str, name: &str, stock: i64) {
        db.products()
            .upsert_accumulate(code, name, 1.0, 2.0, stock)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_ticket_is_rejected() {
        let db = test_db().await;
        let err = db.sales().process_sale(&[]).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyTicket)));
    }

    #[tokio::test]
    async fn test_total_and_stock_decrement() {
        let db = test_db().await;
        seed_product(&db, "A", "Product A", 10).await;
        seed_product(&db, "B", "Product B", 10).await;

        let outcome = db
            .sales()
            .process_sale(&[line("A", 2, 10.0), line("B", 1, 5.0)])
            .await
            .unwrap();

        assert_eq!(outcome.total, 25.0);
        assert!(outcome.is_clean());

        let a = db.products().get_by_code("A").await.unwrap().unwrap();
        let b = db.products().get_by_code("B").await.unwrap().unwrap();
        assert_eq!(a.stock, 8);
        assert_eq!(b.stock, 9);
    }

    #[tokio::test]
    async fn test_unknown_code_is_skipped_not_fatal() {
        let db = test_db().await;
        seed_product(&db, "A", "Product A", 10).await;

        let outcome = db
            .sales()
            .process_sale(&[line("A", 2, 10.0), line("GHOST", 3, 99.0)])
            .await
            .unwrap();

        // Total only covers the applied line
        assert_eq!(outcome.total, 20.0);
        assert!(!outcome.is_clean());
        assert_eq!(outcome.lines[1].status, LineStatus::SkippedMissing);
        assert_eq!(outcome.lines[1].line_total, 0.0);

        // Applied line moved stock; the ghost touched nothing
        let a = db.products().get_by_code("A").await.unwrap().unwrap();
        assert_eq!(a.stock, 8);
        assert!(db.products().get_by_code("GHOST").await.unwrap().is_none());

        // The snapshot still records every submitted line
        let sale = db
            .sales()
            .get_by_id(outcome.sale_id)
            .await
            .unwrap()
            .unwrap();
        let parsed = sale.parsed_lines();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "Product A");
        assert_eq!(parsed[1].name, "GHOST");
    }

    #[tokio::test]
    async fn test_negative_stock_passes_through() {
        let db = test_db().await;
        seed_product(&db, "A", "Product A", 1).await;

        db.sales()
            .process_sale(&[line("A", 5, 2.0)])
            .await
            .unwrap();

        let a = db.products().get_by_code("A").await.unwrap().unwrap();
        assert_eq!(a.stock, -4);
    }

    #[tokio::test]
    async fn test_snapshot_is_a_receipt_not_a_live_view() {
        let db = test_db().await;
        seed_product(&db, "A", "Original name", 10).await;

        let outcome = db
            .sales()
            .process_sale(&[line("A", 1, 3.0)])
            .await
            .unwrap();

        // Rename the product and change its price after the sale
        db.products()
            .upsert_accumulate("A", "New name", 9.0, 9.0, 0)
            .await
            .unwrap();

        let sale = db
            .sales()
            .get_by_id(outcome.sale_id)
            .await
            .unwrap()
            .unwrap();
        let parsed = sale.parsed_lines();
        assert_eq!(parsed[0].name, "Original name");
        assert_eq!(parsed[0].price, 3.0);
        assert_eq!(sale.total, 3.0);
    }

    #[tokio::test]
    async fn test_failure_rolls_back_all_stock() {
        let db = test_db().await;
        seed_product(&db, "A", "Product A", 10).await;
        seed_product(&db, "B", "Product B", 10).await;

        // Force the final insert to fail so the transaction aborts after the
        // per-line decrements already ran.
        sqlx::query("DROP TABLE sales")
            .execute(db.pool())
            .await
            .unwrap();

        let result = db
            .sales()
            .process_sale(&[line("A", 2, 10.0), line("B", 1, 5.0)])
            .await;
        assert!(result.is_err());

        // No partial decrement survives the rollback
        let a = db.products().get_by_code("A").await.unwrap().unwrap();
        let b = db.products().get_by_code("B").await.unwrap().unwrap();
        assert_eq!(a.stock, 10);
        assert_eq!(b.stock, 10);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let db = test_db().await;
        seed_product(&db, "A", "Product A", 100).await;

        for qty in 1..=3 {
            db.sales()
                .process_sale(&[line("A", qty, 1.0)])
                .await
                .unwrap();
        }

        let sales = db.sales().recent(10).await.unwrap();
        assert_eq!(sales.len(), 3);
        assert!(sales[0].id > sales[1].id && sales[1].id > sales[2].id);
    }
}
