//! The product catalog.
//!
//! A closed, immutable list of products. It is built once at startup and
//! shared by reference; nothing mutates it afterwards.

use std::collections::HashSet;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{Category, Product, ProductId};

/// Errors that can occur when building a [`Catalog`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two products share an ID.
    #[error("duplicate product id: {0}")]
    DuplicateId(ProductId),
    /// A product has a price below zero.
    #[error("product {id} has a negative price: {price}")]
    NegativePrice { id: ProductId, price: Decimal },
}

/// Immutable product list, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog, checking that IDs are unique and prices non-negative.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on the first duplicate ID or negative price.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateId(product.id));
            }
            if product.price.is_sign_negative() && !product.price.is_zero() {
                return Err(CatalogError::NegativePrice {
                    id: product.id,
                    price: product.price,
                });
            }
        }
        Ok(Self { products })
    }

    /// The six-product demo catalog.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            products: demo_products(),
        }
    }

    /// All products in display order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::new();
        for product in &self.products {
            if !categories.contains(&product.category) {
                categories.push(product.category);
            }
        }
        categories
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

fn demo_products() -> Vec<Product> {
    vec![
        Product::new(
            ProductId::new(1),
            "Wireless Headphones",
            Decimal::new(7999, 2),
            "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=300&h=300&fit=crop",
            Category::Electronics,
            15,
        ),
        Product::new(
            ProductId::new(2),
            "Smart Watch",
            Decimal::new(19999, 2),
            "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=300&h=300&fit=crop",
            Category::Electronics,
            10,
        ),
        Product::new(
            ProductId::new(3),
            "Running Shoes",
            Decimal::new(8999, 2),
            "https://images.unsplash.com/photo-1542291026-7eec264c27ff?w=300&h=300&fit=crop",
            Category::Fashion,
            20,
        ),
        Product::new(
            ProductId::new(4),
            "Coffee Maker",
            Decimal::new(12999, 2),
            "https://images.unsplash.com/photo-1517668808822-9ebb02f2a0e6?w=300&h=300&fit=crop",
            Category::Home,
            8,
        ),
        Product::new(
            ProductId::new(5),
            "Backpack",
            Decimal::new(4999, 2),
            "https://images.unsplash.com/photo-1553062407-98eeb64c6a62?w=300&h=300&fit=crop",
            Category::Fashion,
            25,
        ),
        Product::new(
            ProductId::new(6),
            "Desk Lamp",
            Decimal::new(3999, 2),
            "https://images.unsplash.com/photo-1507473885765-e6ed057f782c?w=300&h=300&fit=crop",
            Category::Home,
            12,
        ),
    ]
}
