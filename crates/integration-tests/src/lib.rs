//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_filter` - Demo catalog browsing through the filter
//! - `cart_persistence` - Ledger snapshots through the file-backed store
//! - `checkout_flow` - Sidebar checkout with the confirmation timer
