//! Shopfront Cart - the cart ledger and everything that hangs off it.
//!
//! # Architecture
//!
//! - [`CartLedger`] owns the cart lines and writes a snapshot through to a
//!   [`KeyValueStore`] after every change. It is constructed once and passed
//!   by reference to whoever needs it; there is no global cart.
//! - [`CartSidebar`] holds the view state (open/closed) and drives the
//!   simulated [`Checkout`], whose delayed completion arrives as a
//!   [`CheckoutEvent`] on a channel owned by the caller's event loop.
//! - [`CartView`] is the display projection of a ledger.
//!
//! # Modules
//!
//! - [`line`] - A product snapshot plus quantity
//! - [`ledger`] - Add / remove / set-quantity / clear and totals
//! - [`snapshot`] - JSON encoding of the ledger
//! - [`store`] - Key-value stores (in-memory and file-backed)
//! - [`checkout`] - Cancellable delayed checkout keyed by session
//! - [`sidebar`] - Cart sidebar view state
//! - [`view`] - Display data for rendering the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod error;
pub mod ledger;
pub mod line;
pub mod sidebar;
pub mod snapshot;
pub mod store;
pub mod view;

pub use checkout::{Checkout, CheckoutEvent, CheckoutPhase, CheckoutSessionId, Receipt};
pub use error::{CartError, CheckoutError, PersistError};
pub use ledger::CartLedger;
pub use line::CartLine;
pub use sidebar::CartSidebar;
pub use snapshot::{DEFAULT_SNAPSHOT_KEY, SnapshotError};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, is_valid_key};
pub use view::{CartItemView, CartView};
