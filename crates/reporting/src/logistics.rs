//! Logistics metrics per distribution center — shipping and delivery
//! latency plus return rates, joined through the product dimension.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use shoplens_core::snapshot::WarehouseSnapshot;
use shoplens_core::types::OrderStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CenterRow {
    pub center_id: u64,
    pub center_name: String,
    pub total_items: u64,
    pub shipped_items: u64,
    pub returned_items: u64,
    /// Mean created→shipped hours; None if nothing shipped from here.
    pub avg_hours_to_ship: Option<f64>,
    /// Mean shipped→delivered hours; None if nothing was delivered.
    pub avg_hours_to_deliver: Option<f64>,
    /// returned / total; None if the center has no items at all.
    pub return_rate: Option<f64>,
}

#[derive(Default)]
struct Accum {
    total: u64,
    shipped: u64,
    returned: u64,
    ship_hours: f64,
    ship_samples: u64,
    deliver_hours: f64,
    deliver_samples: u64,
}

/// Per-center rollup. Items missing the relevant timestamps stay in the
/// counts but are excluded from the latency averages.
pub fn logistics_report(snapshot: &WarehouseSnapshot) -> Vec<CenterRow> {
    let mut per_center: HashMap<u64, Accum> = snapshot
        .distribution_centers()
        .iter()
        .map(|c| (c.id, Accum::default()))
        .collect();

    for item in snapshot.order_items() {
        let Some(center_id) = snapshot
            .product(item.product_id)
            .map(|p| p.distribution_center_id)
        else {
            continue;
        };
        let Some(acc) = per_center.get_mut(&center_id) else {
            continue;
        };

        acc.total += 1;
        if item.status == OrderStatus::Returned {
            acc.returned += 1;
        }
        if let Some(shipped) = item.shipped_at {
            acc.shipped += 1;
            acc.ship_hours += (shipped - item.created_at).num_minutes() as f64 / 60.0;
            acc.ship_samples += 1;
            if let Some(delivered) = item.delivered_at {
                acc.deliver_hours += (delivered - shipped).num_minutes() as f64 / 60.0;
                acc.deliver_samples += 1;
            }
        }
    }

    let mut rows: Vec<CenterRow> = per_center
        .into_iter()
        .map(|(center_id, acc)| {
            let center_name = snapshot
                .distribution_center(center_id)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            CenterRow {
                center_id,
                center_name,
                total_items: acc.total,
                shipped_items: acc.shipped,
                returned_items: acc.returned,
                avg_hours_to_ship: mean(acc.ship_hours, acc.ship_samples),
                avg_hours_to_deliver: mean(acc.deliver_hours, acc.deliver_samples),
                return_rate: if acc.total == 0 {
                    None
                } else {
                    Some(acc.returned as f64 / acc.total as f64)
                },
            }
        })
        .collect();
    rows.sort_by_key(|r| r.center_id);
    rows
}

fn mean(sum: f64, samples: u64) -> Option<f64> {
    if samples == 0 {
        None
    } else {
        Some(sum / samples as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shoplens_core::types::{DistributionCenter, OrderItem, Product};

    fn center(id: u64, name: &str) -> DistributionCenter {
        DistributionCenter {
            id,
            name: name.into(),
            latitude: 41.8,
            longitude: -87.6,
        }
    }

    fn product(id: u64, center_id: u64) -> Product {
        Product {
            id,
            category: "Jeans".into(),
            name: None,
            brand: None,
            department: "Men".into(),
            cost: 10.0,
            retail_price: 20.0,
            distribution_center_id: center_id,
        }
    }

    fn shipped_item(id: u64, product_id: u64, ship_hours: i64) -> OrderItem {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        OrderItem {
            id,
            order_id: id,
            user_id: 1,
            product_id,
            inventory_item_id: id,
            status: OrderStatus::Shipped,
            sale_price: 20.0,
            created_at: created,
            shipped_at: Some(created + chrono::Duration::hours(ship_hours)),
            delivered_at: None,
            returned_at: None,
        }
    }

    #[test]
    fn test_latency_averages_and_null_guards() {
        let snapshot = WarehouseSnapshot::new(
            vec![],
            vec![shipped_item(1, 100, 12), shipped_item(2, 100, 36)],
            vec![],
            vec![product(100, 1), product(200, 2)],
            vec![center(1, "Chicago IL"), center(2, "Memphis TN")],
        );

        let rows = logistics_report(&snapshot);
        let chicago = &rows[0];
        assert_eq!(chicago.shipped_items, 2);
        assert_eq!(chicago.avg_hours_to_ship, Some(24.0));
        // Nothing delivered yet.
        assert!(chicago.avg_hours_to_deliver.is_none());

        // Memphis shipped nothing: all rates and averages are null.
        let memphis = &rows[1];
        assert_eq!(memphis.total_items, 0);
        assert!(memphis.avg_hours_to_ship.is_none());
        assert!(memphis.return_rate.is_none());
    }

    #[test]
    fn test_unshipped_items_counted_but_not_averaged() {
        let mut item = shipped_item(1, 100, 12);
        item.shipped_at = None;
        let snapshot = WarehouseSnapshot::new(
            vec![],
            vec![item],
            vec![],
            vec![product(100, 1)],
            vec![center(1, "Chicago IL")],
        );

        let rows = logistics_report(&snapshot);
        assert_eq!(rows[0].total_items, 1);
        assert_eq!(rows[0].shipped_items, 0);
        assert!(rows[0].avg_hours_to_ship.is_none());
    }
}
