//! Cart ledger commands: add, remove, qty, clear, show.

use std::io::Write;

use shopfront_cart::{CartError, CartLedger, CartView, KeyValueStore};
use shopfront_core::ProductId;
use tracing::warn;

use crate::render;

/// Add one unit of a catalog product.
///
/// # Errors
///
/// Returns `CartError::UnknownProduct` if the ID is not in the catalog, or an
/// I/O error from writing the output.
pub fn add<W: Write, S: KeyValueStore>(
    out: &mut W,
    ledger: &mut CartLedger<S>,
    id: ProductId,
) -> Result<(), Box<dyn std::error::Error>> {
    let product = ledger
        .catalog()
        .get(id)
        .cloned()
        .ok_or(CartError::UnknownProduct(id))?;
    let before = ledger.quantity_of(id);
    let after = ledger.add_to_cart(&product)?;

    if after == 0 {
        writeln!(out, "{} is out of stock", product.name)?;
    } else if after == before {
        writeln!(
            out,
            "{} is at its stock limit ({})",
            product.name, product.stock
        )?;
    } else {
        writeln!(out, "Added {} (quantity {after})", product.name)?;
    }
    report_persist_failure(out, ledger)?;
    render::badge(out, ledger.total_items())?;
    Ok(())
}

/// Remove a line. Removing something not in the cart is not an error.
///
/// # Errors
///
/// Returns an error if writing the output fails.
pub fn remove<W: Write, S: KeyValueStore>(
    out: &mut W,
    ledger: &mut CartLedger<S>,
    id: ProductId,
) -> Result<(), Box<dyn std::error::Error>> {
    match ledger.remove_from_cart(id) {
        Some(line) => writeln!(out, "Removed {}", line.product().name)?,
        None => writeln!(out, "Product {id} is not in the cart")?,
    }
    report_persist_failure(out, ledger)?;
    render::badge(out, ledger.total_items())?;
    Ok(())
}

/// Set a line's quantity; 0 removes it.
///
/// # Errors
///
/// Returns `CartError::NegativeQuantity` for negative input, or an I/O error
/// from writing the output.
pub fn set_quantity<W: Write, S: KeyValueStore>(
    out: &mut W,
    ledger: &mut CartLedger<S>,
    id: ProductId,
    quantity: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let had_line = ledger.line(id).is_some();
    match ledger.set_quantity(id, quantity)? {
        Some(q) => writeln!(out, "Product {id} quantity is now {q}")?,
        None if had_line => writeln!(out, "Removed product {id}")?,
        None => writeln!(out, "Product {id} is not in the cart")?,
    }
    report_persist_failure(out, ledger)?;
    render::badge(out, ledger.total_items())?;
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if writing the output fails.
pub fn clear<W: Write, S: KeyValueStore>(
    out: &mut W,
    ledger: &mut CartLedger<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    ledger.clear();
    writeln!(out, "Cart cleared")?;
    report_persist_failure(out, ledger)?;
    Ok(())
}

/// Render the sidebar contents.
///
/// # Errors
///
/// Returns an error if writing the output fails.
pub fn show<W: Write, S: KeyValueStore>(
    out: &mut W,
    ledger: &CartLedger<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    render::cart(out, &CartView::from(ledger))?;
    Ok(())
}

fn report_persist_failure<W: Write, S: KeyValueStore>(
    out: &mut W,
    ledger: &CartLedger<S>,
) -> std::io::Result<()> {
    if let Some(error) = ledger.last_persist_error() {
        warn!(%error, "Cart change not saved");
        writeln!(out, "Warning: cart could not be saved ({error})")?;
    }
    Ok(())
}
