//! The aggregator: per-grouping-key revenue, profit, and distinct-order
//! counts over the order-item fact set.

use std::collections::{HashMap, HashSet};

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::info;

use shoplens_core::snapshot::WarehouseSnapshot;
use shoplens_core::types::{round_money, OrderStatus};

/// Grouping dimensions used across the revenue reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Year,
    Month,
    DayOfWeek,
    User,
    Product,
    Category,
    Brand,
    DistributionCenter,
    Country,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::DayOfWeek => "day_of_week",
            Self::User => "user_id",
            Self::Product => "product_id",
            Self::Category => "category",
            Self::Brand => "brand",
            Self::DistributionCenter => "distribution_center",
            Self::Country => "country",
        }
    }

    /// Temporal dimensions sort by key; entity dimensions by revenue.
    fn is_temporal(&self) -> bool {
        matches!(self, Self::Year | Self::Month | Self::DayOfWeek)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueRow {
    pub key: String,
    pub distinct_orders: u64,
    pub items: u64,
    pub revenue: f64,
    pub profit: f64,
    /// revenue / distinct_orders; None when the group has no orders.
    pub avg_order_value: Option<f64>,
}

#[derive(Default)]
struct Accum {
    orders: HashSet<u64>,
    items: u64,
    revenue: f64,
    profit: f64,
    // Fixed ordering for day-of-week keys; 0 elsewhere.
    sort_hint: u32,
}

/// Aggregate the fact set, filtered to `statuses`, by one dimension.
///
/// An item whose dimension key requires a missing joined entity (user,
/// product, distribution center) is excluded from that rollup — inner
/// join semantics. Profit needs the product's cost, so items with no
/// resolvable product contribute revenue but not profit.
pub fn revenue_by(
    snapshot: &WarehouseSnapshot,
    dimension: Dimension,
    statuses: &[OrderStatus],
) -> Vec<RevenueRow> {
    let mut groups: HashMap<String, Accum> = HashMap::new();

    for item in snapshot.order_items() {
        if !statuses.contains(&item.status) {
            continue;
        }

        let mut sort_hint = 0u32;
        let key = match dimension {
            Dimension::Year => item.created_at.year().to_string(),
            Dimension::Month => format!("{}", item.created_at.format("%Y-%m")),
            Dimension::DayOfWeek => {
                let weekday = item.created_at.weekday();
                sort_hint = weekday.num_days_from_monday();
                format!("{}", item.created_at.format("%A"))
            }
            Dimension::User => item.user_id.to_string(),
            Dimension::Product => item.product_id.to_string(),
            Dimension::Category => match snapshot.product(item.product_id) {
                Some(p) => p.category.clone(),
                None => continue,
            },
            Dimension::Brand => match snapshot.product(item.product_id).and_then(|p| p.brand.clone()) {
                Some(brand) => brand,
                None => continue,
            },
            Dimension::DistributionCenter => {
                match snapshot
                    .product(item.product_id)
                    .and_then(|p| snapshot.distribution_center(p.distribution_center_id))
                {
                    Some(center) => center.name.clone(),
                    None => continue,
                }
            }
            Dimension::Country => match snapshot.user(item.user_id) {
                Some(u) => u.country.clone(),
                None => continue,
            },
        };

        let group = groups.entry(key).or_default();
        group.orders.insert(item.order_id);
        group.items += 1;
        group.revenue += item.sale_price;
        if let Some(product) = snapshot.product(item.product_id) {
            group.profit += item.sale_price - product.cost;
        }
        group.sort_hint = sort_hint;
    }

    let mut rows: Vec<(u32, RevenueRow)> = groups
        .into_iter()
        .map(|(key, g)| {
            let distinct_orders = g.orders.len() as u64;
            let avg_order_value = if distinct_orders == 0 {
                None
            } else {
                Some(round_money(g.revenue / distinct_orders as f64))
            };
            (
                g.sort_hint,
                RevenueRow {
                    key,
                    distinct_orders,
                    items: g.items,
                    revenue: round_money(g.revenue),
                    profit: round_money(g.profit),
                    avg_order_value,
                },
            )
        })
        .collect();

    if dimension.is_temporal() {
        rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.key.cmp(&b.1.key)));
    } else {
        rows.sort_by(|a, b| {
            b.1.revenue
                .partial_cmp(&a.1.revenue)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.key.cmp(&b.1.key))
        });
    }

    let rows: Vec<RevenueRow> = rows.into_iter().map(|(_, r)| r).collect();
    info!(dimension = dimension.label(), groups = rows.len(), "Revenue rollup computed");
    rows
}

// ─── Return rate ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRateRow {
    pub category: String,
    pub total_items: u64,
    pub returned_items: u64,
    /// returned / total; None for categories with no sold items.
    pub return_rate: Option<f64>,
}

/// Return rate per product category. The category universe comes from the
/// product dimension, so categories with zero sales still appear — with a
/// null rate rather than a division error.
pub fn return_rate_by_category(snapshot: &WarehouseSnapshot) -> Vec<ReturnRateRow> {
    let mut totals: HashMap<String, (u64, u64)> = snapshot
        .products()
        .iter()
        .map(|p| (p.category.clone(), (0, 0)))
        .collect();

    for item in snapshot.order_items() {
        let Some(product) = snapshot.product(item.product_id) else {
            continue;
        };
        let entry = totals.entry(product.category.clone()).or_insert((0, 0));
        entry.0 += 1;
        if item.status == OrderStatus::Returned {
            entry.1 += 1;
        }
    }

    let mut rows: Vec<ReturnRateRow> = totals
        .into_iter()
        .map(|(category, (total, returned))| ReturnRateRow {
            category,
            total_items: total,
            returned_items: returned,
            return_rate: if total == 0 {
                None
            } else {
                Some(returned as f64 / total as f64)
            },
        })
        .collect();
    rows.sort_by(|a, b| {
        b.return_rate
            .partial_cmp(&a.return_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    rows
}

// ─── Running total ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningTotalRow {
    pub month: String,
    pub revenue: f64,
    pub cumulative_revenue: f64,
}

/// Monthly revenue with a cumulative running total over the sorted months.
pub fn monthly_running_total(
    snapshot: &WarehouseSnapshot,
    statuses: &[OrderStatus],
) -> Vec<RunningTotalRow> {
    let monthly = revenue_by(snapshot, Dimension::Month, statuses);

    let mut cumulative = 0.0;
    monthly
        .into_iter()
        .map(|row| {
            cumulative += row.revenue;
            RunningTotalRow {
                month: row.key,
                revenue: row.revenue,
                cumulative_revenue: round_money(cumulative),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shoplens_core::types::{OrderItem, Product, User};

    fn item(id: u64, order_id: u64, product_id: u64, price: f64, status: OrderStatus) -> OrderItem {
        OrderItem {
            id,
            order_id,
            user_id: 1,
            product_id,
            inventory_item_id: id,
            status,
            sale_price: price,
            created_at: Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap(), // a Monday
            shipped_at: None,
            delivered_at: None,
            returned_at: None,
        }
    }

    fn product(id: u64, category: &str, cost: f64) -> Product {
        Product {
            id,
            category: category.into(),
            name: None,
            brand: Some("Acme".into()),
            department: "Women".into(),
            cost,
            retail_price: cost * 2.0,
            distribution_center_id: 1,
        }
    }

    fn user(id: u64, country: &str) -> User {
        User {
            id,
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.c".into(),
            age: None,
            gender: None,
            country: country.into(),
            city: None,
            traffic_source: "Search".into(),
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn fixture() -> WarehouseSnapshot {
        WarehouseSnapshot::new(
            vec![],
            vec![
                item(1, 10, 100, 20.0, OrderStatus::Complete),
                item(2, 10, 101, 30.0, OrderStatus::Complete),
                item(3, 11, 100, 20.0, OrderStatus::Complete),
                item(4, 12, 101, 30.0, OrderStatus::Returned),
            ],
            vec![user(1, "US")],
            vec![product(100, "Jeans", 8.0), product(101, "Tops", 12.0)],
            vec![],
        )
    }

    #[test]
    fn test_multi_item_orders_count_once() {
        let rows = revenue_by(&fixture(), Dimension::Year, &[OrderStatus::Complete]);
        assert_eq!(rows.len(), 1);
        // Items 1 and 2 share order 10.
        assert_eq!(rows[0].distinct_orders, 2);
        assert_eq!(rows[0].items, 3);
        assert_eq!(rows[0].revenue, 70.0);
    }

    #[test]
    fn test_profit_subtracts_cost() {
        let rows = revenue_by(&fixture(), Dimension::Category, &[OrderStatus::Complete]);
        let jeans = rows.iter().find(|r| r.key == "Jeans").unwrap();
        // Two jeans items: 2 * (20 - 8).
        assert_eq!(jeans.profit, 24.0);
    }

    #[test]
    fn test_category_partition_resums_to_grand_total() {
        let snapshot = fixture();
        let by_category = revenue_by(&snapshot, Dimension::Category, &[OrderStatus::Complete]);
        let by_year = revenue_by(&snapshot, Dimension::Year, &[OrderStatus::Complete]);

        let partition_total: f64 = by_category.iter().map(|r| r.revenue).sum();
        assert!((partition_total - by_year[0].revenue).abs() < 1e-9);
    }

    #[test]
    fn test_unsold_category_has_null_return_rate() {
        let mut snapshot_products = vec![product(100, "Jeans", 8.0), product(101, "Tops", 12.0)];
        snapshot_products.push(product(102, "Hats", 5.0));
        let snapshot = WarehouseSnapshot::new(
            vec![],
            vec![item(1, 10, 100, 20.0, OrderStatus::Complete)],
            vec![user(1, "US")],
            snapshot_products,
            vec![],
        );

        let rows = return_rate_by_category(&snapshot);
        let hats = rows.iter().find(|r| r.category == "Hats").unwrap();
        assert_eq!(hats.total_items, 0);
        assert!(hats.return_rate.is_none());
    }

    #[test]
    fn test_day_of_week_key() {
        let rows = revenue_by(&fixture(), Dimension::DayOfWeek, &[OrderStatus::Complete]);
        assert_eq!(rows[0].key, "Monday");
    }

    #[test]
    fn test_running_total_is_cumulative() {
        let mut items = vec![
            item(1, 10, 100, 20.0, OrderStatus::Complete),
            item(2, 11, 100, 30.0, OrderStatus::Complete),
        ];
        items[1].created_at = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let snapshot = WarehouseSnapshot::new(
            vec![],
            items,
            vec![user(1, "US")],
            vec![product(100, "Jeans", 8.0)],
            vec![],
        );

        let rows = monthly_running_total(&snapshot, &[OrderStatus::Complete]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cumulative_revenue, 20.0);
        assert_eq!(rows[1].cumulative_revenue, 50.0);
    }
}
