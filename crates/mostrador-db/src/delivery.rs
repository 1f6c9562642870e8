//! # Delivery Application
//!
//! Applies a batch of canonical ingested records to the product ledger.
//!
//! Bulk imports favor throughput: one bad record must not sink the other
//! two hundred on the delivery note. Each record runs through the ledger's
//! upsert-with-accumulation in its own transaction; failures are collected
//! into the report and the loop continues.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::pool::Database;
use mostrador_core::{DeliveryRecord, UpsertAction};

/// One record that failed to apply, with the error as data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryFailure {
    pub code: String,
    pub error: String,
}

/// Accounting for one applied delivery batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Records that created a new product.
    pub created: usize,
    /// Records that accumulated into an existing product.
    pub updated: usize,
    /// Records that failed to persist, in input order.
    pub failures: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    /// Total records successfully applied.
    pub fn applied(&self) -> usize {
        self.created + self.updated
    }
}

impl Database {
    /// Applies ingested delivery records to the ledger, one upsert per
    /// record.
    ///
    /// Never fails as a whole: per-record persistence errors are swallowed
    /// into the report so the rest of the batch still lands.
    pub async fn apply_delivery(&self, records: &[DeliveryRecord]) -> DeliveryReport {
        let products = self.products();
        let mut report = DeliveryReport::default();

        for record in records {
            match products
                .upsert_accumulate(
                    &record.code,
                    &record.name,
                    record.cost,
                    record.price,
                    record.quantity,
                )
                .await
            {
                Ok(UpsertAction::Created) => report.created += 1,
                Ok(UpsertAction::Updated) => report.updated += 1,
                Err(e) => {
                    warn!(code = %record.code, error = %e, "delivery record failed to apply");
                    report.failures.push(DeliveryFailure {
                        code: record.code.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            created = report.created,
            updated = report.updated,
            failed = report.failures.len(),
            "delivery applied"
        );

        report
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
