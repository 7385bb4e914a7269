//! JSON snapshot of the cart ledger.
//!
//! The current format is an envelope:
//!
//! ```json
//! {"version":1,"saved_at":"2026-10-19T12:00:00Z","lines":[{"id":1,"quantity":2,...}]}
//! ```
//!
//! A bare JSON array of lines (the older format) is still accepted on load.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use shopfront_core::Catalog;
use tracing::{debug, warn};

use crate::line::CartLine;

/// Name of the snapshot record in the key-value store.
pub const DEFAULT_SNAPSHOT_KEY: &str = "shoppingCart";

/// Envelope version written by [`encode`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors from encoding or decoding a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found} (expected <= {SNAPSHOT_VERSION})")]
    UnsupportedVersion { found: u32 },
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    lines: &'a [CartLine],
}

/// A decoded snapshot envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: Option<DateTime<Utc>>,
    pub lines: Vec<CartLine>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSnapshot {
    Envelope(Snapshot),
    Legacy(Vec<CartLine>),
}

/// Serialize ledger lines into the envelope format.
///
/// # Errors
///
/// Returns `SnapshotError::Json` if serialization fails.
pub fn encode(lines: &[CartLine]) -> Result<String, SnapshotError> {
    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        saved_at: Utc::now(),
        lines,
    };
    Ok(serde_json::to_string(&snapshot)?)
}

/// Parse a stored snapshot into raw lines, in stored order.
///
/// The lines are not yet checked against ledger invariants; see [`sanitize`].
///
/// # Errors
///
/// Returns `SnapshotError` if the input is neither format or the envelope
/// version is newer than this build understands.
pub fn decode(raw: &str) -> Result<Vec<CartLine>, SnapshotError> {
    match serde_json::from_str::<StoredSnapshot>(raw)? {
        StoredSnapshot::Envelope(snapshot) if snapshot.version > SNAPSHOT_VERSION => {
            Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
            })
        }
        StoredSnapshot::Envelope(snapshot) => Ok(snapshot.lines),
        StoredSnapshot::Legacy(lines) => Ok(lines),
    }
}

/// Reconcile decoded lines with the catalog and the ledger invariants.
///
/// - lines for products missing from the catalog are dropped
/// - each line's product is replaced by the catalog's current record
/// - lines with quantity 0, or whose product has no stock, are dropped
/// - quantities above the catalog stock are clamped to it
/// - for duplicate IDs the first line wins
///
/// Returns the cleaned lines and whether anything had to change.
#[must_use]
pub fn sanitize(lines: Vec<CartLine>, catalog: &Catalog) -> (Vec<CartLine>, bool) {
    let mut seen = HashSet::with_capacity(lines.len());
    let mut changed = false;
    let mut clean = Vec::with_capacity(lines.len());

    for line in lines {
        let Some(product) = catalog.get(line.id()) else {
            warn!(product_id = %line.id(), "Dropping snapshot line for unknown product");
            changed = true;
            continue;
        };
        if line.quantity() == 0 || product.stock == 0 {
            warn!(product_id = %line.id(), "Dropping empty snapshot line");
            changed = true;
            continue;
        }
        if !seen.insert(line.id()) {
            warn!(product_id = %line.id(), "Dropping duplicate snapshot line");
            changed = true;
            continue;
        }
        if line.product() != product {
            debug!(product_id = %line.id(), "Refreshing snapshot line from catalog");
            changed = true;
        }

        let quantity = line.quantity().min(product.stock);
        if quantity != line.quantity() {
            warn!(
                product_id = %line.id(),
                quantity = line.quantity(),
                stock = product.stock,
                "Clamping snapshot quantity to stock"
            );
            changed = true;
        }
        clean.push(CartLine::with_quantity(product.clone(), quantity));
    }

    (clean, changed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shopfront_core::{Category, Product, ProductId};

    fn line(id: i32, quantity: u32) -> CartLine {
        let catalog = Catalog::demo();
        let product = catalog.get(ProductId::new(id)).unwrap().clone();
        CartLine::with_quantity(product, quantity)
    }

    #[test]
    fn test_encode_decode_preserves_lines_and_order() {
        let lines = vec![line(3, 1), line(1, 2)];
        let raw = encode(&lines).unwrap();
        assert_eq!(decode(&raw).unwrap(), lines);
    }

    #[test]
    fn test_encode_writes_envelope() {
        let raw = encode(&[line(1, 1)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], SNAPSHOT_VERSION);
        assert!(value["saved_at"].is_string());
        assert_eq!(value["lines"][0]["id"], 1);
    }

    #[test]
    fn test_decode_legacy_array() {
        let raw = r#"[{"id":5,"name":"Backpack","price":"49.99","image":"img","category":"Fashion","stock":25,"quantity":4}]"#;
        let lines = decode(raw).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id(), ProductId::new(5));
        assert_eq!(lines[0].quantity(), 4);
        assert_eq!(lines[0].product().image, "img");
    }

    #[test]
    fn test_decode_empty_array() {
        assert!(decode("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(decode("{not json"), Err(SnapshotError::Json(_))));
        assert!(decode("null").is_err());
        assert!(decode(r#"{"lines":"nope"}"#).is_err());
    }

    #[test]
    fn test_decode_future_version() {
        let raw = r#"{"version":99,"saved_at":null,"lines":[]}"#;
        assert!(matches!(
            decode(raw),
            Err(SnapshotError::UnsupportedVersion { found: 99 })
        ));
    }

    #[test]
    fn test_sanitize_clean_input_unchanged() {
        let lines = vec![line(1, 2), line(3, 1)];
        let (clean, changed) = sanitize(lines.clone(), &Catalog::demo());
        assert_eq!(clean, lines);
        assert!(!changed);
    }

    #[test]
    fn test_sanitize_repairs_invariants() {
        let lines = vec![line(1, 0), line(4, 50), line(2, 1), line(4, 1)];
        let (clean, changed) = sanitize(lines, &Catalog::demo());
        assert!(changed);
        let summary: Vec<(i32, u32)> = clean
            .iter()
            .map(|l| (l.id().as_i32(), l.quantity()))
            .collect();
        assert_eq!(summary, vec![(4, 8), (2, 1)]);
    }

    #[test]
    fn test_sanitize_reconciles_with_catalog() {
        let stale_coffee = Product::new(
            ProductId::new(4),
            "Coffee Maker",
            Decimal::new(12999, 2),
            "coffee.jpg",
            Category::Home,
            50,
        );
        let discontinued = Product::new(
            ProductId::new(99),
            "Discontinued",
            Decimal::ONE,
            "gone.jpg",
            Category::Home,
            5,
        );
        let lines = vec![
            CartLine::with_quantity(stale_coffee, 20),
            CartLine::with_quantity(discontinued, 1),
        ];

        let catalog = Catalog::demo();
        let (clean, changed) = sanitize(lines, &catalog);
        assert!(changed);
        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].id(), ProductId::new(4));
        assert_eq!(clean[0].quantity(), 8);
        assert_eq!(clean[0].product(), catalog.get(ProductId::new(4)).unwrap());
    }
}
