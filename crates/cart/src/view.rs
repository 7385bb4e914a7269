//! Cart display data.
//!
//! Plain, pre-formatted values for whatever renders the sidebar. Prices are
//! formatted once here so every renderer shows `$0.00` the same way.

use shopfront_core::{Price, ProductId};

use crate::ledger::CartLedger;
use crate::line::CartLine;
use crate::store::KeyValueStore;

/// One cart line, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub image: String,
    pub quantity: u32,
    pub stock: u32,
    /// Unit price, e.g. `$79.99`.
    pub price: String,
    /// Price times quantity.
    pub line_price: String,
    /// The "+" control is disabled at stock.
    pub can_increment: bool,
}

/// The whole cart, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: KeyValueStore> From<&CartLedger<S>> for CartView {
    fn from(ledger: &CartLedger<S>) -> Self {
        Self {
            items: ledger.lines().iter().map(CartItemView::from).collect(),
            subtotal: Price::usd(ledger.total_price()).display(),
            item_count: ledger.total_items(),
        }
    }
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        let product = line.product();
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.to_string(),
            image: product.image.clone(),
            quantity: line.quantity(),
            stock: product.stock,
            price: product.unit_price().display(),
            line_price: line.line_price().display(),
            can_increment: !line.at_stock_limit(),
        }
    }
}
