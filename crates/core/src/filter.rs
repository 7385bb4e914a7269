//! Catalog filtering by category and price ceiling.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;

use crate::types::{Category, CategoryParseError, Product};

/// Category selection, with `All` as the "no restriction" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Whether a product in `category` passes this filter.
    #[must_use]
    pub fn matches(&self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => *selected == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(category) => fmt::Display::fmt(category, f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        Self::Only(category)
    }
}

/// Filter parameters held by the presentation layer.
///
/// The price range is `0..=price_ceiling`; the lower bound is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState {
    pub category: CategoryFilter,
    price_ceiling: Decimal,
}

impl FilterState {
    /// Upper end of the price slider.
    pub const PRICE_CEILING_MAX: Decimal = Decimal::from_parts(300, 0, 0, false, 0);

    /// Create a filter, clamping the ceiling into `0..=PRICE_CEILING_MAX`.
    #[must_use]
    pub fn new(category: CategoryFilter, price_ceiling: Decimal) -> Self {
        Self {
            category,
            price_ceiling: clamp_ceiling(price_ceiling),
        }
    }

    /// Current inclusive price ceiling.
    #[must_use]
    pub const fn price_ceiling(&self) -> Decimal {
        self.price_ceiling
    }

    /// Move the price slider, clamping into `0..=PRICE_CEILING_MAX`.
    pub fn set_price_ceiling(&mut self, price_ceiling: Decimal) {
        self.price_ceiling = clamp_ceiling(price_ceiling);
    }

    /// Whether a single product passes the filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category.matches(product.category)
            && product.price >= Decimal::ZERO
            && product.price <= self.price_ceiling
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: CategoryFilter::All,
            price_ceiling: Self::PRICE_CEILING_MAX,
        }
    }
}

fn clamp_ceiling(price_ceiling: Decimal) -> Decimal {
    price_ceiling.clamp(Decimal::ZERO, FilterState::PRICE_CEILING_MAX)
}

/// Products passing `state`, in catalog order.
///
/// An empty input or no matches yields an empty vector.
#[must_use]
pub fn filter<'a, I>(products: I, state: &FilterState) -> Vec<&'a Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    products
        .into_iter()
        .filter(|product| state.matches(product))
        .collect()
}
