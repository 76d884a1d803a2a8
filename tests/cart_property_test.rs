//! Property-based tests for the cart normalizer.
//!
//! The normalizer is pure, so proptest can sweep wide input ranges: the
//! consolidated quantities must always equal the per-product input sums,
//! independent of line order.

use proptest::prelude::*;
use std::collections::HashMap;
use tienda_api::services::cart::{self, CartItemInput};
use uuid::Uuid;

fn pool_of_ids() -> Vec<Uuid> {
    (0..8).map(|_| Uuid::new_v4()).collect()
}

fn items_strategy() -> impl Strategy<Value = Vec<(usize, i64)>> {
    prop::collection::vec((0usize..8, 1i64..10_000), 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn consolidation_preserves_per_product_sums(raw in items_strategy()) {
        let ids = pool_of_ids();
        let items: Vec<CartItemInput> = raw
            .iter()
            .map(|&(idx, qty)| CartItemInput { product_id: ids[idx], quantity: qty })
            .collect();

        let mut expected: HashMap<Uuid, i64> = HashMap::new();
        for item in &items {
            *expected.entry(item.product_id).or_insert(0) += item.quantity;
        }

        let cart = cart::normalize(&items).expect("valid cart");
        prop_assert_eq!(cart.len(), expected.len());
        for (product_id, total) in expected {
            prop_assert_eq!(cart.quantity_of(&product_id), Some(total as i32));
        }
    }

    #[test]
    fn consolidation_is_order_independent(raw in items_strategy()) {
        let ids = pool_of_ids();
        let items: Vec<CartItemInput> = raw
            .iter()
            .map(|&(idx, qty)| CartItemInput { product_id: ids[idx], quantity: qty })
            .collect();

        let mut reversed = items.clone();
        reversed.reverse();

        let forward = cart::normalize(&items).expect("valid cart");
        let backward = cart::normalize(&reversed).expect("valid cart");
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn any_non_positive_quantity_rejects_the_cart(
        raw in items_strategy(),
        bad_qty in -10_000i64..=0,
        position in 0usize..40,
    ) {
        let ids = pool_of_ids();
        let mut items: Vec<CartItemInput> = raw
            .iter()
            .map(|&(idx, qty)| CartItemInput { product_id: ids[idx], quantity: qty })
            .collect();

        let at = position % items.len();
        items[at].quantity = bad_qty;

        prop_assert!(cart::normalize(&items).is_err());
    }
}

#[test]
fn empty_cart_always_rejected() {
    assert!(cart::normalize(&[]).is_err());
}
