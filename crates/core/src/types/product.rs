//! Product records and categories.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Product category.
///
/// Serialized as its display name (`"Electronics"`), which is also how it
/// appears in persisted cart snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Fashion,
    Home,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 3] = [Self::Electronics, Self::Fashion, Self::Home];

    /// Display name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Fashion => "Fashion",
            Self::Home => "Home",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known category.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct CategoryParseError(pub String);

impl core::str::FromStr for Category {
    type Err = CategoryParseError;

    /// Case-insensitive match on the display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

/// A catalog product.
///
/// Products are immutable once the catalog is built. Cart lines hold a copy
/// of the product as it was when first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in USD, two decimal places.
    pub price: Decimal,
    /// Opaque image reference (usually a URL).
    pub image: String,
    pub category: Category,
    /// Maximum purchasable quantity.
    pub stock: u32,
}

impl Product {
    /// Create a new product.
    #[must_use]
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Decimal,
        image: impl Into<String>,
        category: Category,
        stock: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            image: image.into(),
            category,
            stock,
        }
    }

    /// Unit price with currency, for display.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// Whether at least one unit can be purchased.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
