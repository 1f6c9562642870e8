//! Column sniffing for tabular delivery documents.
//!
//! Supplier exports never agree on header names, so columns are identified
//! by keyword rather than by exact match: "Código", "SKU" and "Referencia"
//! all mean the product code. Matching is case-insensitive substring search,
//! and the first header (in column order) that matches a field wins.

use tracing::debug;

use crate::error::{IngestError, IngestResult};

const CODE_KEYWORDS: &[&str] = &["sku", "cod", "ref"];
const NAME_KEYWORDS: &[&str] = &["desc", "prod", "nom"];
const QUANTITY_KEYWORDS: &[&str] = &["cant", "uni", "qty"];
const COST_KEYWORDS: &[&str] = &["cost", "precio"];

/// Resolved positions of the fields we care about within a header row.
///
/// Code and name are mandatory; quantity and cost are optional and get
/// defaults downstream when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub code: usize,
    pub name: usize,
    pub quantity: Option<usize>,
    pub cost: Option<usize>,
}

fn find_column(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let lowered = header.to_lowercase();
        keywords.iter().any(|kw| lowered.contains(kw))
    })
}

/// Identify the code/name/quantity/cost columns of a header row.
///
/// Fails with [`IngestError::SchemaUnresolved`] when the code or name
/// column cannot be found; the caller should not guess at positions.
pub fn resolve_columns(headers: &[String]) -> IngestResult<ColumnMap> {
    let code = find_column(headers, CODE_KEYWORDS);
    let name = find_column(headers, NAME_KEYWORDS);

    let (code, name) = match (code, name) {
        (Some(code), Some(name)) => (code, name),
        (None, _) => {
            return Err(IngestError::SchemaUnresolved(
                "no product code column (looked for sku/cod/ref)".to_string(),
            ))
        }
        (_, None) => {
            return Err(IngestError::SchemaUnresolved(
                "no product name column (looked for desc/prod/nom)".to_string(),
            ))
        }
    };

    let map = ColumnMap {
        code,
        name,
        quantity: find_column(headers, QUANTITY_KEYWORDS),
        cost: find_column(headers, COST_KEYWORDS),
    };
    debug!(?map, ?headers, "resolved document columns");
    Ok(map)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_spanish_headers() {
        let map = resolve_columns(&headers(&["Codigo", "Producto", "Cantidad", "Coste"]))
            .expect("should resolve");
        assert_eq!(map.code, 0);
        assert_eq!(map.name, 1);
        assert_eq!(map.quantity, Some(2));
        assert_eq!(map.cost, Some(3));
    }

    #[test]
    fn accented_header_is_not_matched() {
        // Keyword matching is a plain byte-wise substring check: "código"
        // does not contain "cod". Exports with accented headers need an
        // unaccented alias column.
        let err = resolve_columns(&headers(&["Código", "Producto"])).unwrap_err();
        assert!(matches!(err, IngestError::SchemaUnresolved(_)));
    }

    #[test]
    fn resolves_english_headers_case_insensitive() {
        let map = resolve_columns(&headers(&["SKU", "Description", "Qty", "Unit Cost"]))
            .expect("should resolve");
        assert_eq!(map.code, 0);
        assert_eq!(map.name, 1);
        assert_eq!(map.quantity, Some(2));
        assert_eq!(map.cost, Some(3));
    }

    #[test]
    fn resolves_mixed_language_headers() {
        let map = resolve_columns(&headers(&["SKU", "Descripcion", "Cantidad", "Coste"]))
            .expect("should resolve");
        assert_eq!(map.code, 0);
        assert_eq!(map.name, 1);
        assert_eq!(map.quantity, Some(2));
        assert_eq!(map.cost, Some(3));
    }

    #[test]
    fn first_match_in_column_order_wins() {
        // Both "Referencia" and "Cod. Barras" match the code keywords.
        let map = resolve_columns(&headers(&["Referencia", "Cod. Barras", "Nombre"]))
            .expect("should resolve");
        assert_eq!(map.code, 0);
    }

    #[test]
    fn quantity_and_cost_are_optional() {
        let map = resolve_columns(&headers(&["Ref", "Descripción"])).expect("should resolve");
        assert_eq!(map.quantity, None);
        assert_eq!(map.cost, None);
    }

    #[test]
    fn missing_code_column_fails() {
        let err = resolve_columns(&headers(&["Nombre", "Cantidad"])).unwrap_err();
        assert!(matches!(err, IngestError::SchemaUnresolved(_)));
    }

    #[test]
    fn missing_name_column_fails() {
        let err = resolve_columns(&headers(&["SKU", "Cantidad"])).unwrap_err();
        assert!(matches!(err, IngestError::SchemaUnresolved(_)));
    }
}
