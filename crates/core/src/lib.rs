//! Shopfront Core - Catalog types and filtering.
//!
//! This crate provides the read-only half of Shopfront, shared by:
//! - `shopfront-cart` - Cart ledger, snapshot persistence and checkout flow
//! - `shopfront-cli` - Terminal presentation layer
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! persistence, no timers. The catalog is built once and never mutated.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs and prices, plus the product record
//! - [`catalog`] - The immutable product list
//! - [`filter`] - Category and price-ceiling filtering of the catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod filter;
pub mod types;

pub use catalog::{Catalog, CatalogError};
pub use filter::{CategoryFilter, FilterState, filter};
pub use types::*;
