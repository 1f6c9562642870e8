//! Delimited-text delivery documents.
//!
//! Spanish supplier exports are typically semicolon-delimited with European
//! decimals, so that convention is tried first; plain comma-delimited CSV
//! with dot decimals is the fallback. A parse that yields a single-column
//! header is treated as a wrong-delimiter read and triggers the fallback.

use mostrador_core::DeliveryRecord;
use tracing::{debug, warn};

use crate::error::{IngestError, IngestResult};
use crate::normalize::{clean_cost, clean_quantity, suggested_price, NumberFormat};
use crate::schema::resolve_columns;

struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    format: NumberFormat,
}

fn read_table(bytes: &[u8], delimiter: u8, format: NumberFormat) -> IngestResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|_| IngestError::UnparsableDocument)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    // One column means the delimiter did not split anything.
    if headers.len() < 2 {
        return Err(IngestError::UnparsableDocument);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|_| IngestError::UnparsableDocument)?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(RawTable {
        headers,
        rows,
        format,
    })
}

/// Parse a delimited delivery document into canonical records.
///
/// Rows whose code or name is blank after cleanup are skipped with a warning;
/// unreadable quantity and cost cells fall back to `1` and `0.0`. When the
/// document carries no price column, retail price is suggested from cost.
pub fn parse_tabular(bytes: &[u8]) -> IngestResult<Vec<DeliveryRecord>> {
    let table = read_table(bytes, b';', NumberFormat::European)
        .or_else(|_| read_table(bytes, b',', NumberFormat::Standard))?;

    let map = resolve_columns(&table.headers)?;
    let cell = |row: &[String], idx: usize| row.get(idx).map(|s| s.trim().to_string());

    let mut records = Vec::with_capacity(table.rows.len());
    for (line, row) in table.rows.iter().enumerate() {
        let code = cell(row, map.code).unwrap_or_default();
        let name = cell(row, map.name).unwrap_or_default();
        if code.is_empty() || name.is_empty() {
            warn!(line = line + 2, "skipping row with blank code or name");
            continue;
        }

        let quantity = map
            .quantity
            .and_then(|idx| cell(row, idx))
            .map(|raw| clean_quantity(&raw, table.format))
            .unwrap_or(1);
        let cost = map
            .cost
            .and_then(|idx| cell(row, idx))
            .map(|raw| clean_cost(&raw, table.format))
            .unwrap_or(0.0);

        records.push(DeliveryRecord {
            code,
            name,
            cost,
            price: suggested_price(cost),
            quantity,
        });
    }

    debug!(records = records.len(), "parsed tabular delivery document");
    Ok(records)
}

// =============================================================================
// Tests
// =============================================================================
