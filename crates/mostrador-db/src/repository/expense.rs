//! # Expense Repository
//!
//! Expenses are independent of products and sales; they only meet on the
//! dashboard, where today's expenses are subtracted from today's sales.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use mostrador_core::validation::{validate_amount, validate_concept};
use mostrador_core::{CoreError, Expense, DEFAULT_EXPENSE_CATEGORY};

/// Repository for expense operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records an expense. `category` defaults to "General" when absent or
    /// blank.
    pub async fn add(
        &self,
        concept: &str,
        amount: f64,
        category: Option<&str>,
    ) -> DbResult<Expense> {
        validate_concept(concept).map_err(CoreError::from)?;
        validate_amount("amount", amount).map_err(CoreError::from)?;

        let category = match category.map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_EXPENSE_CATEGORY,
        };
        let now = Utc::now();

        debug!(concept = %concept.trim(), amount = %amount, "recording expense");

        let result = sqlx::query(
            "INSERT INTO expenses (created_at, concept, amount, category) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(now)
        .bind(concept.trim())
        .bind(amount)
        .bind(category)
        .execute(&self.pool)
        .await?;

        Ok(Expense {
            id: result.last_insert_rowid(),
            created_at: now,
            concept: concept.trim().to_string(),
            amount,
            category: category.to_string(),
        })
    }

    /// Lists recent expenses, newest first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, created_at, concept, amount, category
            FROM expenses
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Deletes an expense by sequence id. Unknown ids are a no-op.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "deleting expense");

        sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::DbError;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let db = test_db().await;
        let repo = db.expenses();

        let first = repo.add("Rent", 800.0, Some("Fixed")).await.unwrap();
        let second = repo.add("Napkins", 4.5, None).await.unwrap();

        assert_eq!(first.category, "Fixed");
        assert_eq!(second.category, "General");

        let listed = repo.list(10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].concept, "Napkins");
        assert_eq!(listed[1].concept, "Rent");
    }

    #[tokio::test]
    async fn test_blank_category_defaults() {
        let db = test_db().await;
        let expense = db.expenses().add("Ice", 2.0, Some("  ")).await.unwrap();
        assert_eq!(expense.category, "General");
    }

    #[tokio::test]
    async fn test_validation() {
        let db = test_db().await;
        let repo = db.expenses();

        assert!(matches!(
            repo.add("", 1.0, None).await.unwrap_err(),
            DbError::Domain(_)
        ));
        assert!(matches!(
            repo.add("Rent", -1.0, None).await.unwrap_err(),
            DbError::Domain(_)
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let repo = db.expenses();

        let expense = repo.add("Rent", 800.0, None).await.unwrap();
        repo.delete(expense.id).await.unwrap();
        assert!(repo.list(10).await.unwrap().is_empty());

        // Unknown id is a no-op
        repo.delete(999).await.unwrap();
    }
}
