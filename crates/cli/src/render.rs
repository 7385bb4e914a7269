//! Plain-text rendering of the catalog and cart.
//!
//! Everything writes to an `io::Write` so output can be captured in tests;
//! stdout is only chosen in `main`.

use std::io::{self, Write};

use shopfront_cart::{CartItemView, CartLedger, CartView, KeyValueStore, Receipt};
use shopfront_core::{FilterState, Price, Product, filter};

/// Catalog card display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: u32,
    /// Quantity already in the cart ("In Cart (n)"), if any.
    pub in_cart: Option<u32>,
}

impl ProductCardView {
    fn new<S: KeyValueStore>(product: &Product, ledger: &CartLedger<S>) -> Self {
        let quantity = ledger.quantity_of(product.id);
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            category: product.category.to_string(),
            price: product.unit_price().display(),
            stock: product.stock,
            in_cart: (quantity > 0).then_some(quantity),
        }
    }
}

/// Filter controls plus the visible product cards.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn catalog<W: Write, S: KeyValueStore>(
    out: &mut W,
    ledger: &CartLedger<S>,
    state: &FilterState,
) -> io::Result<()> {
    let categories: Vec<String> = std::iter::once("All".to_string())
        .chain(ledger.catalog().categories().iter().map(ToString::to_string))
        .collect();

    writeln!(out, "Featured Products")?;
    writeln!(
        out,
        "Category: {} (of {})",
        state.category,
        categories.join(", ")
    )?;
    writeln!(
        out,
        "Price Range: {} - {}",
        Price::usd(rust_decimal::Decimal::ZERO).display(),
        Price::usd(state.price_ceiling()).display()
    )?;
    writeln!(out)?;

    let visible = filter(ledger.catalog(), state);
    if visible.is_empty() {
        writeln!(out, "No products found matching your filters.")?;
        return Ok(());
    }

    for product in visible {
        let card = ProductCardView::new(product, ledger);
        let badge = card
            .in_cart
            .map_or_else(|| "Add to Cart".to_string(), |q| format!("In Cart ({q})"));
        writeln!(
            out,
            "[{}] {:<20} {:<12} {:>9}  Stock: {:<3} {}",
            card.id, card.name, card.category, card.price, card.stock, badge
        )?;
    }
    Ok(())
}

/// The cart sidebar contents.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn cart<W: Write>(out: &mut W, view: &CartView) -> io::Result<()> {
    writeln!(out, "Shopping Cart")?;
    if view.is_empty() {
        writeln!(out, "Your cart is empty")?;
        return Ok(());
    }

    for item in &view.items {
        cart_item(out, item)?;
    }
    writeln!(out, "Items ({})  {}", view.item_count, view.subtotal)?;
    writeln!(out, "Total  {}", view.subtotal)?;
    Ok(())
}

fn cart_item<W: Write>(out: &mut W, item: &CartItemView) -> io::Result<()> {
    let plus = if item.can_increment { "+" } else { " " };
    writeln!(
        out,
        "[{}] {:<20} {} per unit  [-] {:>3} [{}]  {}",
        item.id, item.name, item.price, item.quantity, plus, item.line_price
    )
}

/// Header cart badge: total item count, hidden when zero.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn badge<W: Write>(out: &mut W, item_count: u64) -> io::Result<()> {
    if item_count > 0 {
        writeln!(out, "Cart ({item_count})")
    } else {
        writeln!(out, "Cart")
    }
}

/// The "order confirmed" panel shown while the checkout delay runs.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn confirming<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Order Confirmed!")?;
    writeln!(out, "Thank you for your purchase.")
}

/// Summary once the cart has been cleared.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn receipt<W: Write>(out: &mut W, receipt: &Receipt) -> io::Result<()> {
    writeln!(
        out,
        "Checked out {} item(s) for {} (session {})",
        receipt.items,
        Price::usd(receipt.total).display(),
        receipt.session
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use rust_decimal::Decimal;
    use shopfront_cart::MemoryStore;
    use shopfront_core::{Catalog, Category, ProductId};

    fn ledger() -> CartLedger<MemoryStore> {
        CartLedger::new(Arc::new(Catalog::demo()), MemoryStore::new())
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_catalog_lists_filtered_products() {
        let ledger = ledger();
        let state = FilterState::new(Category::Electronics.into(), Decimal::new(300, 0));
        let text = render(|out| catalog(out, &ledger, &state));
        assert!(text.contains("Wireless Headphones"));
        assert!(text.contains("Smart Watch"));
        assert!(!text.contains("Backpack"));
        assert!(text.contains("All, Electronics, Fashion, Home"));
        assert!(text.contains("$0.00 - $300.00"));
    }

    #[test]
    fn test_catalog_shows_in_cart_badge() {
        let mut ledger = ledger();
        let lamp = ledger.catalog().get(ProductId::new(6)).unwrap().clone();
        ledger.add_to_cart(&lamp).unwrap();
        ledger.add_to_cart(&lamp).unwrap();
        let text = render(|out| catalog(out, &ledger, &FilterState::default()));
        assert!(text.contains("In Cart (2)"));
    }

    #[test]
    fn test_catalog_no_matches() {
        let ledger = ledger();
        let state = FilterState::new(Category::Home.into(), Decimal::new(10, 0));
        let text = render(|out| catalog(out, &ledger, &state));
        assert!(text.contains("No products found matching your filters."));
    }

    #[test]
    fn test_empty_cart() {
        let text = render(|out| cart(out, &CartView::empty()));
        assert!(text.contains("Your cart is empty"));
    }

    #[test]
    fn test_cart_totals() {
        let mut ledger = ledger();
        let shoes = ledger.catalog().get(ProductId::new(3)).unwrap().clone();
        ledger.add_to_cart(&shoes).unwrap();
        ledger.add_to_cart(&shoes).unwrap();
        let text = render(|out| cart(out, &CartView::from(&ledger)));
        assert!(text.contains("Running Shoes"));
        assert!(text.contains("Items (2)  $179.98"));
        assert!(text.contains("Total  $179.98"));
    }

    #[test]
    fn test_badge_hidden_when_empty() {
        assert_eq!(render(|out| badge(out, 0)), "Cart\n");
        assert_eq!(render(|out| badge(out, 3)), "Cart (3)\n");
    }
}
