//! Error types for cart and checkout operations.
//!
//! Ledger operations are total apart from two invalid-argument cases. Snapshot
//! and store failures have their own types in [`crate::snapshot`] and
//! [`crate::store`]; the ledger recovers from them instead of propagating and
//! keeps the last one as a [`PersistError`].

use shopfront_core::ProductId;
use thiserror::Error;

use crate::snapshot::SnapshotError;
use crate::store::StoreError;

/// Invalid-argument errors from [`crate::CartLedger`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product is not part of the catalog.
    #[error("unknown product id: {0}")]
    UnknownProduct(ProductId),

    /// A quantity below zero was requested. Zero itself means "remove".
    #[error("quantity cannot be negative (got {0})")]
    NegativeQuantity(i64),
}

/// Errors from starting a checkout.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// There is nothing to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// A checkout is already waiting on its confirmation delay.
    #[error("checkout already in progress")]
    AlreadyConfirming,

    /// Checkout is only available from the open cart sidebar.
    #[error("cart sidebar is closed")]
    SidebarClosed,

    /// No async runtime is available to run the confirmation delay.
    #[error("no async runtime available for the checkout timer")]
    NoRuntime,
}

/// Why the most recent snapshot write-through failed.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode cart snapshot: {0}")]
    Encode(#[from] SnapshotError),

    #[error("failed to save cart snapshot: {0}")]
    Store(#[from] StoreError),
}
