//! Numeric cleanup for supplier documents.
//!
//! Supplier exports are messy: currency symbols glued to amounts, European
//! decimal commas, thousands separators, quantities written as decimals.
//! Everything here is total: a cell that cannot be read falls back to a
//! safe default instead of sinking the whole document.

use tracing::debug;

/// Margin applied over cost when a tabular document carries no sale price.
pub const TABULAR_MARGIN: f64 = 1.3;

/// Decimal convention a document was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// Comma decimal separator, optional dot thousands separator ("1.234,56").
    European,
    /// Dot decimal separator ("1234.56").
    Standard,
}

/// Round to two decimals (currency precision).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Suggested retail price for a tabular row that only carries cost.
pub fn suggested_price(cost: f64) -> f64 {
    round2(cost * TABULAR_MARGIN)
}

/// Parse a raw cell into a number under the given convention.
///
/// Strips currency symbols and whitespace first. Under [`NumberFormat::European`]
/// thousands dots are removed before the decimal comma becomes a dot, so
/// `"1.234,56"` reads as `1234.56`. Returns `None` when nothing numeric remains.
pub fn clean_decimal(raw: &str, format: NumberFormat) -> Option<f64> {
    let stripped: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€' && *c != '$' && *c != '£')
        .collect();
    if stripped.is_empty() {
        return None;
    }

    let normalized = match format {
        NumberFormat::European => stripped.replace('.', "").replace(',', "."),
        NumberFormat::Standard => stripped.replace(',', "."),
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Read a cost cell, defaulting to `0.0` when unreadable.
pub fn clean_cost(raw: &str, format: NumberFormat) -> f64 {
    match clean_decimal(raw, format) {
        Some(value) => value,
        None => {
            debug!(cell = raw, "unreadable cost cell, defaulting to 0.0");
            0.0
        }
    }
}

/// Read a quantity cell, defaulting to `1` when unreadable.
///
/// Suppliers sometimes write quantities as decimals ("3,0"); the fractional
/// part is truncated.
pub fn clean_quantity(raw: &str, format: NumberFormat) -> i64 {
    match clean_decimal(raw, format) {
        Some(value) => value.trunc() as i64,
        None => {
            debug!(cell = raw, "unreadable quantity cell, defaulting to 1");
            1
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn european_comma_decimal() {
        assert_eq!(clean_decimal("12,50", NumberFormat::European), Some(12.5));
    }

    #[test]
    fn european_thousands_dot() {
        assert_eq!(
            clean_decimal("1.234,56", NumberFormat::European),
            Some(1234.56)
        );
    }

    #[test]
    fn standard_dot_decimal() {
        assert_eq!(clean_decimal("12.50", NumberFormat::Standard), Some(12.5));
    }

    #[test]
    fn currency_symbols_and_spaces_stripped() {
        assert_eq!(
            clean_decimal(" 3,20 € ", NumberFormat::European),
            Some(3.2)
        );
        assert_eq!(clean_decimal("$4.99", NumberFormat::Standard), Some(4.99));
    }

    #[test]
    fn garbage_cost_defaults_to_zero() {
        assert_eq!(clean_cost("n/a", NumberFormat::European), 0.0);
        assert_eq!(clean_cost("", NumberFormat::Standard), 0.0);
    }

    #[test]
    fn garbage_quantity_defaults_to_one() {
        assert_eq!(clean_quantity("varios", NumberFormat::European), 1);
        assert_eq!(clean_quantity("", NumberFormat::Standard), 1);
    }

    #[test]
    fn decimal_quantity_truncates() {
        assert_eq!(clean_quantity("3,0", NumberFormat::European), 3);
        assert_eq!(clean_quantity("2.9", NumberFormat::Standard), 2);
    }

    #[test]
    fn suggested_price_applies_margin() {
        assert_eq!(suggested_price(10.0), 13.0);
        assert_eq!(suggested_price(0.0), 0.0);
        // rounding to cents
        assert_eq!(suggested_price(1.11), 1.44);
    }
}
