//! Integration tests for browsing the demo catalog.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use shopfront_core::{Catalog, Category, CategoryFilter, FilterState, ProductId, filter};

fn ids(products: &[&shopfront_core::Product]) -> Vec<i32> {
    products.iter().map(|p| p.id.as_i32()).collect()
}

#[test]
fn test_default_filter_shows_everything_in_order() {
    let catalog = Catalog::demo();
    let visible = filter(&catalog, &FilterState::default());
    assert_eq!(ids(&visible), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_category_and_ceiling_combine() {
    let catalog = Catalog::demo();

    let electronics = FilterState::new(Category::Electronics.into(), Decimal::new(300, 0));
    assert_eq!(ids(&filter(&catalog, &electronics)), vec![1, 2]);

    let cheap = FilterState::new(CategoryFilter::All, Decimal::new(50, 0));
    assert_eq!(ids(&filter(&catalog, &cheap)), vec![5, 6]);

    let cheap_home = FilterState::new(Category::Home.into(), Decimal::new(50, 0));
    assert_eq!(ids(&filter(&catalog, &cheap_home)), vec![6]);
}

#[test]
fn test_ceiling_is_inclusive() {
    let catalog = Catalog::demo();
    let state = FilterState::new(CategoryFilter::All, Decimal::new(8999, 2));
    let visible = filter(&catalog, &state);
    assert!(visible.iter().any(|p| p.id == ProductId::new(3)));
    assert!(!visible.iter().any(|p| p.id == ProductId::new(4)));
}

#[test]
fn test_no_matches_is_empty() {
    let catalog = Catalog::demo();
    let state = FilterState::new(Category::Home.into(), Decimal::new(10, 0));
    assert!(filter(&catalog, &state).is_empty());
}

#[test]
fn test_category_names_parse_from_user_input() {
    assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
    assert_eq!(
        " fashion ".parse::<CategoryFilter>().unwrap(),
        CategoryFilter::Only(Category::Fashion)
    );
    assert!("Toys".parse::<CategoryFilter>().is_err());
}

#[test]
fn test_categories_follow_catalog_order() {
    let catalog = Catalog::demo();
    assert_eq!(
        catalog.categories(),
        vec![Category::Electronics, Category::Fashion, Category::Home]
    );
}
