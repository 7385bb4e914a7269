//! `shopfront catalog` - browse the filtered catalog.

use std::io::Write;

use shopfront_cart::{CartLedger, KeyValueStore};
use shopfront_core::FilterState;

use crate::render;

/// Render the catalog under `state`.
///
/// # Errors
///
/// Returns an error if writing the output fails.
pub fn list<W: Write, S: KeyValueStore>(
    out: &mut W,
    ledger: &CartLedger<S>,
    state: &FilterState,
) -> Result<(), Box<dyn std::error::Error>> {
    render::catalog(out, ledger, state)?;
    writeln!(out)?;
    render::badge(out, ledger.total_items())?;
    Ok(())
}
