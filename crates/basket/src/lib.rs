//! Market-basket analysis — co-occurrence counts for unordered pairs of
//! distinct products bought in the same order.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::info;

use shoplens_core::snapshot::WarehouseSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPair {
    pub product_a: u64,
    pub product_b: u64,
    pub orders_together: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketReport {
    /// Pairs ranked by co-occurrence descending; ties break by pair id
    /// ascending so the ranking is deterministic.
    pub pairs: Vec<ProductPair>,
    pub orders_analyzed: u64,
}

/// Count, for every unordered pair of distinct products, the number of
/// orders containing both. Pairs are keyed with `product_a < product_b`,
/// which rules out self-pairs and mirrored duplicates by construction.
pub fn co_occurrence(snapshot: &WarehouseSnapshot, top_n: usize) -> BasketReport {
    // Distinct product set per order; BTreeSet gives each basket a
    // sorted, deduplicated view.
    let mut baskets: HashMap<u64, BTreeSet<u64>> = HashMap::new();
    for item in snapshot.order_items() {
        baskets.entry(item.order_id).or_default().insert(item.product_id);
    }

    let mut counts: HashMap<(u64, u64), u64> = HashMap::new();
    for products in baskets.values() {
        let products: Vec<u64> = products.iter().copied().collect();
        for i in 0..products.len() {
            for j in (i + 1)..products.len() {
                // products is sorted ascending, so a < b holds.
                *counts.entry((products[i], products[j])).or_insert(0) += 1;
            }
        }
    }

    let mut pairs: Vec<ProductPair> = counts
        .into_iter()
        .map(|((a, b), n)| ProductPair {
            product_a: a,
            product_b: b,
            orders_together: n,
        })
        .collect();
    pairs.sort_by(|x, y| {
        y.orders_together
            .cmp(&x.orders_together)
            .then(x.product_a.cmp(&y.product_a))
            .then(x.product_b.cmp(&y.product_b))
    });
    pairs.truncate(top_n);

    info!(
        orders = baskets.len(),
        pairs = pairs.len(),
        "Market-basket co-occurrence computed"
    );

    BasketReport {
        pairs,
        orders_analyzed: baskets.len() as u64,
    }
}
