//! # Product Ledger Repository
//!
//! The product table and its sole mutation entry point.
//!
//! ## Upsert-with-Accumulation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  upsert_accumulate(code, name, cost, price, quantity_delta)         │
//! │                                                                     │
//! │  code exists?                                                       │
//! │   ├── yes → overwrite name/cost/price,                              │
//! │   │         stock = stock + quantity_delta   → Updated              │
//! │   └── no  → insert with stock = quantity_delta → Created            │
//! │                                                                     │
//! │  Metadata-only edit: pass quantity_delta = 0.                       │
//! │  Stock is NEVER overwritten wholesale - only sale commits and       │
//! │  ingestion deltas move it.                                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock mutation is a single `stock = stock + ?` statement so two
//! concurrent writers cannot lose a delta to a read-then-write race.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use mostrador_core::validation::{
    validate_amount, validate_code, validate_product_name, validate_search_query,
};
use mostrador_core::{CoreError, Product, UpsertAction};

const PRODUCT_COLUMNS: &str = "id, code, name, cost, price, stock, created_at, updated_at";

/// Repository for product ledger operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts or updates a product, accumulating stock.
    ///
    /// ## Semantics
    /// - Existing `code`: `name`, `cost`, `price` are overwritten and
    ///   `quantity_delta` is *added* to the current stock.
    /// - New `code`: the product is created with `stock = quantity_delta`.
    ///
    /// This is the single mutation entry point shared by manual product
    /// edits and bulk delivery ingestion. Runs in its own transaction; any
    /// persistence failure is returned as a structured error so ingestion
    /// loops can keep processing the remaining rows.
    ///
    /// ## Returns
    /// Whether the call created a new product or updated an existing one.
    pub async fn upsert_accumulate(
        &self,
        code: &str,
        name: &str,
        cost: f64,
        price: f64,
        quantity_delta: i64,
    ) -> DbResult<UpsertAction> {
        validate_code(code).map_err(CoreError::from)?;
        validate_product_name(name).map_err(CoreError::from)?;
        validate_amount("cost", cost).map_err(CoreError::from)?;
        validate_amount("price", price).map_err(CoreError::from)?;

        let code = code.trim();
        let name = name.trim();
        let now = Utc::now();

        debug!(code = %code, delta = %quantity_delta, "upserting product");

        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM products WHERE code = ?1")
            .bind(code)
            .fetch_optional(&mut *tx)
            .await?;

        let action = match existing {
            Some(_) => {
                sqlx::query(
                    r#"
                    UPDATE products SET
                        name = ?2,
                        cost = ?3,
                        price = ?4,
                        stock = stock + ?5,
                        updated_at = ?6
                    WHERE code = ?1
                    "#,
                )
                .bind(code)
                .bind(name)
                .bind(cost)
                .bind(price)
                .bind(quantity_delta)
                .bind(now)
                .execute(&mut *tx)
                .await?;

                UpsertAction::Updated
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO products (code, name, cost, price, stock, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                    "#,
                )
                .bind(code)
                .bind(name)
                .bind(cost)
                .bind(price)
                .bind(quantity_delta)
                .bind(now)
                .execute(&mut *tx)
                .await?;

                UpsertAction::Created
            }
        };

        tx.commit().await?;

        Ok(action)
    }

    /// Gets a product by its external code.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - product found
    /// * `Ok(None)` - no such code (not an error)
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1"
        ))
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products, optionally filtered by a search term.
    ///
    /// The term matches name or code by case-insensitive substring; results
    /// are ordered newest-first by sequence id.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Product>> {
        let term = match search {
            Some(query) => validate_search_query(query).map_err(CoreError::from)?,
            None => String::new(),
        };

        debug!(search = %term, "listing products");

        let products = if term.is_empty() {
            sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id DESC"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            let pattern = format!("%{term}%");
            sqlx::query_as::<_, Product>(&format!(
                r#"
                SELECT {PRODUCT_COLUMNS} FROM products
                WHERE name LIKE ?1 OR code LIKE ?1
                ORDER BY id DESC
                "#
            ))
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(products)
    }

    /// Deletes a product by sequence id.
    ///
    /// Unconditional: deleting an unknown id is a no-op, and historical sale
    /// snapshots are untouched (they denormalize the product data they
    /// need).
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "deleting product");

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Counts products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use mostrador_core::ValidationError;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let db = test_db().await;
        let repo = db.products();

        let action = repo
            .upsert_accumulate("A-1", "Widget", 1.0, 2.0, 10)
            .await
            .unwrap();
        assert_eq!(action, UpsertAction::Created);

        let action = repo
            .upsert_accumulate("A-1", "Widget v2", 1.5, 2.5, 5)
            .await
            .unwrap();
        assert_eq!(action, UpsertAction::Updated);

        let product = repo.get_by_code("A-1").await.unwrap().unwrap();
        assert_eq!(product.name, "Widget v2");
        assert_eq!(product.cost, 1.5);
        assert_eq!(product.price, 2.5);
        assert_eq!(product.stock, 15);
    }

    #[tokio::test]
    async fn test_upsert_metadata_only_is_idempotent_on_stock() {
        let db = test_db().await;
        let repo = db.products();

        repo.upsert_accumulate("A-1", "Widget", 1.0, 2.0, 7)
            .await
            .unwrap();

        // Two metadata edits with delta 0: stock never moves, metadata is
        // the latest call's values.
        repo.upsert_accumulate("A-1", "Renamed", 3.0, 4.0, 0)
            .await
            .unwrap();
        repo.upsert_accumulate("A-1", "Renamed again", 3.5, 4.5, 0)
            .await
            .unwrap();

        let product = repo.get_by_code("A-1").await.unwrap().unwrap();
        assert_eq!(product.stock, 7);
        assert_eq!(product.name, "Renamed again");
        assert_eq!(product.cost, 3.5);
    }

    #[tokio::test]
    async fn test_upsert_accumulates_sum_of_deltas() {
        let db = test_db().await;
        let repo = db.products();

        for delta in [5_i64, -2, 12, 0, -15] {
            repo.upsert_accumulate("A-1", "Widget", 1.0, 2.0, delta)
                .await
                .unwrap();
        }

        let product = repo.get_by_code("A-1").await.unwrap().unwrap();
        assert_eq!(product.stock, 5 - 2 + 12 - 15);
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_input() {
        let db = test_db().await;
        let repo = db.products();

        let err = repo
            .upsert_accumulate("", "Widget", 1.0, 2.0, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::DbError::Domain(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let err = repo
            .upsert_accumulate("A-1", "Widget", -1.0, 2.0, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::DbError::Domain(CoreError::Validation(ValidationError::Negative { .. }))
        ));
    }

    #[tokio::test]
    async fn test_lookup_miss_is_none() {
        let db = test_db().await;
        assert!(db.products().get_by_code("GHOST").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_search_and_order() {
        let db = test_db().await;
        let repo = db.products();

        repo.upsert_accumulate("COKE-330", "Coca-Cola 330ml", 0.4, 1.2, 10)
            .await
            .unwrap();
        repo.upsert_accumulate("PEPSI-330", "Pepsi 330ml", 0.4, 1.1, 10)
            .await
            .unwrap();
        repo.upsert_accumulate("COKE-500", "Coca-Cola 500ml", 0.6, 1.8, 10)
            .await
            .unwrap();

        // Newest-first by id
        let all = repo.list(None).await.unwrap();
        let codes: Vec<&str> = all.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["COKE-500", "PEPSI-330", "COKE-330"]);

        // Substring match on name, case-insensitive
        let cokes = repo.list(Some("coca")).await.unwrap();
        assert_eq!(cokes.len(), 2);

        // Substring match on code
        let by_code = repo.list(Some("PEPSI")).await.unwrap();
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].code, "PEPSI-330");
    }

    #[tokio::test]
    async fn test_list_rejects_over_long_query() {
        let db = test_db().await;
        assert!(db.products().list(Some(&"A".repeat(200))).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_is_unconditional() {
        let db = test_db().await;
        let repo = db.products();

        repo.upsert_accumulate("A-1", "Widget", 1.0, 2.0, 1)
            .await
            .unwrap();
        let product = repo.get_by_code("A-1").await.unwrap().unwrap();

        repo.delete(product.id).await.unwrap();
        assert!(repo.get_by_code("A-1").await.unwrap().is_none());

        // Deleting again is a no-op, not an error
        repo.delete(product.id).await.unwrap();
    }
}
