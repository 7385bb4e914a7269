//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod shell;

use std::sync::Arc;

use shopfront_cart::{CartLedger, FileStore};
use shopfront_core::Catalog;
use tracing::debug;

use crate::config::ShopConfig;

/// Open the ledger backed by the configured data directory.
///
/// Never fails: a missing or corrupt snapshot yields an empty cart.
pub fn open_ledger(config: &ShopConfig, catalog: Arc<Catalog>) -> CartLedger<FileStore> {
    debug!(data_dir = %config.data_dir.display(), key = %config.snapshot_key, "Opening cart");
    CartLedger::load_or_default_with_key(
        catalog,
        FileStore::new(&config.data_dir),
        config.snapshot_key.clone(),
    )
}
