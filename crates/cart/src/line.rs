//! Cart lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{Price, Product, ProductId};

/// One product-plus-quantity entry in the cart.
///
/// Serialized flat, so a snapshot line reads
/// `{"id":1,"name":"...","price":"79.99","image":"...","category":"Electronics","stock":15,"quantity":2}`.
///
/// Inside a [`crate::CartLedger`] the quantity always satisfies
/// `1 <= quantity <= product.stock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    product: Product,
    quantity: u32,
}

impl CartLine {
    /// A line for `product` with quantity 1.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    /// A line with an explicit quantity. Callers outside the ledger can build
    /// any quantity; the ledger clamps on the way in.
    #[must_use]
    pub const fn with_quantity(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Product ID.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// The product as it was when added to the cart.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Stock recorded on the product snapshot.
    #[must_use]
    pub const fn stock(&self) -> u32 {
        self.product.stock
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }

    /// Line total with currency, for display.
    #[must_use]
    pub fn line_price(&self) -> Price {
        Price::usd(self.line_total())
    }

    /// Whether the quantity has reached the stock limit.
    #[must_use]
    pub const fn at_stock_limit(&self) -> bool {
        self.quantity >= self.product.stock
    }

    pub(crate) const fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }
}
