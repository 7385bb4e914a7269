//! The cart ledger.
//!
//! An ordered set of [`CartLine`]s, one per product, in the order products
//! were first added. Every change is written through to a [`KeyValueStore`]
//! before the mutating call returns.
//!
//! # Quantity rules
//!
//! | call | effect |
//! |---|---|
//! | `add_to_cart(p)` | new line at 1, or `min(q + 1, p.stock)` |
//! | `set_quantity(id, 0)` | same as `remove_from_cart(id)` |
//! | `set_quantity(id, n)` | `min(n, line.stock)` |
//! | `set_quantity(id, -1)` | `CartError::NegativeQuantity`, no change |
//! | `set_quantity(unknown, n)` | no-op |
//!
//! # Persistence
//!
//! Persistence is best-effort. A failed snapshot write is logged and recorded
//! in [`CartLedger::last_persist_error`]; the in-memory ledger stays
//! authoritative and the call still succeeds.

use std::sync::Arc;

use rust_decimal::Decimal;
use shopfront_core::{Catalog, Product, ProductId};
use tracing::{debug, info, instrument, warn};

use crate::error::{CartError, PersistError};
use crate::line::CartLine;
use crate::snapshot::{self, DEFAULT_SNAPSHOT_KEY};
use crate::store::KeyValueStore;

/// The authoritative record of what the user intends to buy.
#[derive(Debug)]
pub struct CartLedger<S> {
    catalog: Arc<Catalog>,
    lines: Vec<CartLine>,
    store: S,
    key: String,
    last_persist_error: Option<PersistError>,
}

impl<S: KeyValueStore> CartLedger<S> {
    /// An empty ledger that ignores whatever the store already holds.
    ///
    /// Nothing is written until the first mutation.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, store: S) -> Self {
        Self {
            catalog,
            lines: Vec::new(),
            store,
            key: DEFAULT_SNAPSHOT_KEY.to_string(),
            last_persist_error: None,
        }
    }

    /// Rehydrate from the snapshot under [`DEFAULT_SNAPSHOT_KEY`], falling
    /// back to an empty ledger.
    #[must_use]
    pub fn load_or_default(catalog: Arc<Catalog>, store: S) -> Self {
        Self::load_or_default_with_key(catalog, store, DEFAULT_SNAPSHOT_KEY)
    }

    /// Rehydrate from the snapshot under `key`, falling back to an empty
    /// ledger.
    ///
    /// Never fails: a missing record yields an empty ledger, and an unreadable
    /// or unparsable one is logged, replaced with an empty ledger and
    /// overwritten. Lines are reconciled with the catalog (unknown products
    /// dropped, quantities clamped to current stock) and any repaired state
    /// is written back.
    #[must_use]
    pub fn load_or_default_with_key(
        catalog: Arc<Catalog>,
        store: S,
        key: impl Into<String>,
    ) -> Self {
        let mut ledger = Self::new(catalog, store);
        ledger.key = key.into();

        let raw = match ledger.store.load(&ledger.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %ledger.key, "No cart snapshot, starting empty");
                return ledger;
            }
            Err(e) => {
                warn!(key = %ledger.key, error = %e, "Failed to read cart snapshot, starting empty");
                return ledger;
            }
        };

        match snapshot::decode(&raw) {
            Ok(lines) => {
                let (lines, repaired) = snapshot::sanitize(lines, &ledger.catalog);
                ledger.lines = lines;
                info!(
                    key = %ledger.key,
                    lines = ledger.lines.len(),
                    items = ledger.total_items(),
                    "Cart restored from snapshot"
                );
                if repaired {
                    ledger.persist();
                }
            }
            Err(e) => {
                warn!(key = %ledger.key, error = %e, "Discarding unreadable cart snapshot");
                ledger.persist();
            }
        }

        ledger
    }

    /// Add one unit of `product`.
    ///
    /// Inserts a new line with quantity 1 at the end, or increments the
    /// existing line up to the product's stock. Adding beyond stock leaves the
    /// quantity unchanged. A product with no stock is not added.
    ///
    /// Returns the line's quantity afterwards (0 if nothing was added).
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownProduct` if the product is not in the
    /// catalog.
    #[instrument(level = "debug", skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_cart(&mut self, product: &Product) -> Result<u32, CartError> {
        self.last_persist_error = None;
        let product = self
            .catalog
            .get(product.id)
            .ok_or(CartError::UnknownProduct(product.id))?;
        let stock = product.stock;

        if let Some(line) = self.lines.iter_mut().find(|line| line.id() == product.id) {
            let quantity = line.quantity().saturating_add(1).min(stock);
            if quantity == line.quantity() {
                debug!(quantity, stock, "Already at stock limit");
                return Ok(quantity);
            }
            line.set_quantity(quantity);
            debug!(quantity, "Incremented cart line");
            self.persist();
            return Ok(quantity);
        }

        if stock == 0 {
            debug!("Out of stock, not added");
            return Ok(0);
        }

        self.lines.push(CartLine::new(product.clone()));
        debug!("Added cart line");
        self.persist();
        Ok(1)
    }

    /// Remove the line for `product_id`, returning it. No-op if absent.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_from_cart(&mut self, product_id: ProductId) -> Option<CartLine> {
        self.last_persist_error = None;
        let index = self.lines.iter().position(|line| line.id() == product_id)?;
        let removed = self.lines.remove(index);
        debug!("Removed cart line");
        self.persist();
        Some(removed)
    }

    /// Set the quantity of an existing line.
    ///
    /// Zero removes the line; anything above the line's stock is clamped.
    /// Unknown IDs are a no-op and never create a line.
    ///
    /// Returns the line's quantity afterwards, or `None` if no line remains.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NegativeQuantity` if `quantity < 0`.
    #[instrument(level = "debug", skip(self))]
    pub fn set_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Option<u32>, CartError> {
        self.last_persist_error = None;
        if quantity < 0 {
            return Err(CartError::NegativeQuantity(quantity));
        }
        if quantity == 0 {
            self.remove_from_cart(product_id);
            return Ok(None);
        }

        let Some(line) = self.lines.iter_mut().find(|line| line.id() == product_id) else {
            debug!("No cart line for product, ignoring");
            return Ok(None);
        };

        let clamped = u32::try_from(quantity)
            .unwrap_or(u32::MAX)
            .min(line.stock());
        if clamped == line.quantity() {
            return Ok(Some(clamped));
        }
        line.set_quantity(clamped);
        debug!(quantity = clamped, "Updated cart line quantity");
        self.persist();
        Ok(Some(clamped))
    }

    /// Empty the ledger.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) {
        self.last_persist_error = None;
        if self.lines.is_empty() {
            return;
        }
        self.lines.clear();
        debug!("Cleared cart");
        self.persist();
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity()))
            .sum()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `product_id`, if any.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id() == product_id)
    }

    /// Quantity of `product_id` in the cart, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.line(product_id).map_or(0, CartLine::quantity)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The catalog this ledger validates against.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot record name.
    #[must_use]
    pub fn snapshot_key(&self) -> &str {
        &self.key
    }

    /// Why the most recent mutation's write-through failed.
    ///
    /// Reset by every mutation, so it is `None` after a successful write and
    /// after a mutation that changed nothing.
    #[must_use]
    pub const fn last_persist_error(&self) -> Option<&PersistError> {
        self.last_persist_error.as_ref()
    }

    /// Write the full ledger to the store.
    fn persist(&mut self) {
        let result = snapshot::encode(&self.lines)
            .map_err(PersistError::from)
            .and_then(|raw| {
                self.store
                    .save(&self.key, &raw)
                    .map_err(PersistError::from)
            });

        match result {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to persist cart snapshot");
                self.last_persist_error = Some(e);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use shopfront_core::Category;

    fn ledger() -> CartLedger<MemoryStore> {
        CartLedger::new(Arc::new(Catalog::demo()), MemoryStore::new())
    }

    fn product(ledger: &CartLedger<MemoryStore>, id: i32) -> Product {
        ledger.catalog().get(ProductId::new(id)).unwrap().clone()
    }

    fn persisted_ids(ledger: &CartLedger<MemoryStore>) -> Vec<(i32, u32)> {
        let raw = ledger.store().get(DEFAULT_SNAPSHOT_KEY).unwrap();
        snapshot::decode(raw)
            .unwrap()
            .iter()
            .map(|line| (line.id().as_i32(), line.quantity()))
            .collect()
    }

    #[test]
    fn test_add_twice_makes_one_line_of_two() {
        let mut ledger = ledger();
        let headphones = product(&ledger, 1);
        assert_eq!(ledger.add_to_cart(&headphones).unwrap(), 1);
        assert_eq!(ledger.add_to_cart(&headphones).unwrap(), 2);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.quantity_of(headphones.id), 2);
    }

    #[test]
    fn test_add_clamps_at_stock() {
        let mut ledger = ledger();
        let coffee = product(&ledger, 4);
        for _ in 0..20 {
            ledger.add_to_cart(&coffee).unwrap();
        }
        assert_eq!(ledger.quantity_of(coffee.id), coffee.stock);
    }

    #[test]
    fn test_add_single_stock_product_twice() {
        let catalog = Catalog::new(vec![Product::new(
            ProductId::new(9),
            "Last One",
            Decimal::new(10, 0),
            "img",
            Category::Home,
            1,
        )])
        .unwrap();
        let mut ledger = CartLedger::new(Arc::new(catalog), MemoryStore::new());
        let last = ledger.catalog().products()[0].clone();
        ledger.add_to_cart(&last).unwrap();
        assert_eq!(ledger.add_to_cart(&last).unwrap(), 1);
    }

    #[test]
    fn test_add_out_of_stock_is_noop() {
        let catalog = Catalog::new(vec![Product::new(
            ProductId::new(9),
            "Sold Out",
            Decimal::new(10, 0),
            "img",
            Category::Home,
            0,
        )])
        .unwrap();
        let mut ledger = CartLedger::new(Arc::new(catalog), MemoryStore::new());
        let sold_out = ledger.catalog().products()[0].clone();
        assert_eq!(ledger.add_to_cart(&sold_out).unwrap(), 0);
        assert!(ledger.is_empty());
        assert!(ledger.store().get(DEFAULT_SNAPSHOT_KEY).is_none());
    }

    #[test]
    fn test_add_unknown_product_rejected() {
        let mut ledger = ledger();
        let stranger = Product::new(
            ProductId::new(42),
            "Not For Sale",
            Decimal::ONE,
            "img",
            Category::Fashion,
            5,
        );
        assert_eq!(
            ledger.add_to_cart(&stranger),
            Err(CartError::UnknownProduct(ProductId::new(42)))
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_insertion_order_is_display_order() {
        let mut ledger = ledger();
        for id in [3, 1, 5] {
            let p = product(&ledger, id);
            ledger.add_to_cart(&p).unwrap();
        }
        let p = product(&ledger, 1);
        ledger.add_to_cart(&p).unwrap();
        let order: Vec<i32> = ledger.lines().iter().map(|l| l.id().as_i32()).collect();
        assert_eq!(order, vec![3, 1, 5]);
    }

    #[test]
    fn test_remove() {
        let mut ledger = ledger();
        let shoes = product(&ledger, 3);
        ledger.add_to_cart(&shoes).unwrap();
        let removed = ledger.remove_from_cart(shoes.id).unwrap();
        assert_eq!(removed.id(), shoes.id);
        assert!(ledger.is_empty());
        assert!(persisted_ids(&ledger).is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut ledger = ledger();
        let shoes = product(&ledger, 3);
        ledger.add_to_cart(&shoes).unwrap();
        assert!(ledger.remove_from_cart(ProductId::new(99)).is_none());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut ledger = ledger();
        let lamp = product(&ledger, 6);
        ledger.add_to_cart(&lamp).unwrap();
        assert_eq!(ledger.set_quantity(lamp.id, 0).unwrap(), None);
        assert!(ledger.line(lamp.id).is_none());
    }

    #[test]
    fn test_set_quantity_clamps_to_stock() {
        let mut ledger = ledger();
        let watch = product(&ledger, 2);
        ledger.add_to_cart(&watch).unwrap();
        assert_eq!(ledger.set_quantity(watch.id, 4).unwrap(), Some(4));
        assert_eq!(ledger.set_quantity(watch.id, 500).unwrap(), Some(10));
        assert_eq!(ledger.set_quantity(watch.id, i64::MAX).unwrap(), Some(10));
    }

    #[test]
    fn test_set_quantity_negative_rejected() {
        let mut ledger = ledger();
        let watch = product(&ledger, 2);
        ledger.add_to_cart(&watch).unwrap();
        assert_eq!(
            ledger.set_quantity(watch.id, -1),
            Err(CartError::NegativeQuantity(-1))
        );
        assert_eq!(ledger.quantity_of(watch.id), 1);
    }

    #[test]
    fn test_set_quantity_unknown_id_creates_nothing() {
        let mut ledger = ledger();
        assert_eq!(ledger.set_quantity(ProductId::new(2), 3).unwrap(), None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut ledger = ledger();
        assert_eq!(ledger.total_price(), Decimal::ZERO);
        assert_eq!(ledger.total_items(), 0);

        let headphones = product(&ledger, 1);
        let lamp = product(&ledger, 6);
        ledger.add_to_cart(&headphones).unwrap();
        ledger.add_to_cart(&headphones).unwrap();
        ledger.add_to_cart(&lamp).unwrap();

        // 2 * 79.99 + 39.99
        assert_eq!(ledger.total_price(), Decimal::new(19997, 2));
        assert_eq!(ledger.total_items(), 3);
    }

    #[test]
    fn test_clear() {
        let mut ledger = ledger();
        for id in 1..=6 {
            let p = product(&ledger, id);
            ledger.add_to_cart(&p).unwrap();
        }
        ledger.clear();
        assert_eq!(ledger.total_items(), 0);
        assert_eq!(ledger.total_price(), Decimal::ZERO);
        assert!(persisted_ids(&ledger).is_empty());
    }

    #[test]
    fn test_every_mutation_writes_through() {
        let mut ledger = ledger();
        let headphones = product(&ledger, 1);
        let shoes = product(&ledger, 3);

        ledger.add_to_cart(&headphones).unwrap();
        assert_eq!(persisted_ids(&ledger), vec![(1, 1)]);
        ledger.add_to_cart(&shoes).unwrap();
        assert_eq!(persisted_ids(&ledger), vec![(1, 1), (3, 1)]);
        ledger.set_quantity(headphones.id, 2).unwrap();
        assert_eq!(persisted_ids(&ledger), vec![(1, 2), (3, 1)]);
        ledger.remove_from_cart(shoes.id);
        assert_eq!(persisted_ids(&ledger), vec![(1, 2)]);
    }

    #[test]
    fn test_load_missing_snapshot_is_empty() {
        let ledger = CartLedger::load_or_default(Arc::new(Catalog::demo()), MemoryStore::new());
        assert!(ledger.is_empty());
        assert!(ledger.store().get(DEFAULT_SNAPSHOT_KEY).is_none());
    }

    #[test]
    fn test_load_corrupt_snapshot_is_empty_and_overwritten() {
        let store = MemoryStore::new().with_record(DEFAULT_SNAPSHOT_KEY, "{{{");
        let ledger = CartLedger::load_or_default(Arc::new(Catalog::demo()), store);
        assert!(ledger.is_empty());
        assert!(persisted_ids(&ledger).is_empty());
    }

    #[test]
    fn test_load_roundtrip() {
        let mut first = ledger();
        let headphones = product(&first, 1);
        let shoes = product(&first, 3);
        first.add_to_cart(&headphones).unwrap();
        first.add_to_cart(&headphones).unwrap();
        first.add_to_cart(&shoes).unwrap();

        let store = first.store().clone();
        let second = CartLedger::load_or_default(Arc::new(Catalog::demo()), store);
        assert_eq!(second.lines(), first.lines());
    }

    #[test]
    fn test_load_custom_key() {
        let mut first = CartLedger::load_or_default_with_key(
            Arc::new(Catalog::demo()),
            MemoryStore::new(),
            "guestCart",
        );
        let lamp = product_from(&first, 6);
        first.add_to_cart(&lamp).unwrap();
        assert!(first.store().get("guestCart").is_some());
        assert!(first.store().get(DEFAULT_SNAPSHOT_KEY).is_none());
        assert_eq!(first.snapshot_key(), "guestCart");
    }

    fn product_from<S: KeyValueStore>(ledger: &CartLedger<S>, id: i32) -> Product {
        ledger.catalog().get(ProductId::new(id)).unwrap().clone()
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::InvalidKey(key.to_string()))
        }

        fn save(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey(key.to_string()))
        }
    }

    #[test]
    fn test_store_failures_do_not_fail_operations() {
        let mut ledger = CartLedger::load_or_default(Arc::new(Catalog::demo()), FailingStore);
        assert!(ledger.is_empty());

        let lamp = product_from(&ledger, 6);
        assert_eq!(ledger.add_to_cart(&lamp).unwrap(), 1);
        assert!(ledger.last_persist_error().is_some());
        assert_eq!(ledger.total_items(), 1);
    }

    #[test]
    fn test_persist_error_is_typed_and_reset_by_noop() {
        let mut ledger = CartLedger::new(Arc::new(Catalog::demo()), FailingStore);
        let lamp = product_from(&ledger, 6);
        ledger.add_to_cart(&lamp).unwrap();
        assert!(matches!(
            ledger.last_persist_error(),
            Some(PersistError::Store(StoreError::InvalidKey(_)))
        ));

        // Nothing to write, so nothing failed.
        assert!(ledger.remove_from_cart(ProductId::new(2)).is_none());
        assert!(ledger.last_persist_error().is_none());
    }

    #[test]
    fn test_load_reconciles_snapshot_with_catalog() {
        let raw = r#"{"version":1,"saved_at":null,"lines":[
            {"id":4,"name":"Coffee Maker","price":"129.99","image":"coffee.jpg","category":"Home","stock":50,"quantity":20},
            {"id":99,"name":"Ghost","price":"1.00","image":"ghost.jpg","category":"Home","stock":5,"quantity":1}
        ]}"#;
        let store = MemoryStore::new().with_record(DEFAULT_SNAPSHOT_KEY, raw);
        let mut ledger = CartLedger::load_or_default(Arc::new(Catalog::demo()), store);

        assert!(ledger.line(ProductId::new(99)).is_none());
        assert_eq!(ledger.quantity_of(ProductId::new(4)), 8);
        assert_eq!(persisted_ids(&ledger), vec![(4, 8)]);

        // Already at stock: adding again must not change the quantity.
        let coffee = product(&ledger, 4);
        assert_eq!(ledger.add_to_cart(&coffee).unwrap(), 8);
        assert_eq!(ledger.quantity_of(ProductId::new(4)), 8);
    }
}
