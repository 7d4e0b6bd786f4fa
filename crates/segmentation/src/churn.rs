//! Churn flagging and signup-to-first-purchase conversion windows.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use shoplens_core::snapshot::WarehouseSnapshot;
use shoplens_core::types::OrderStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnRecord {
    pub user_id: u64,
    pub days_inactive: i64,
    pub at_risk: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnReport {
    pub inactivity_threshold_days: i64,
    pub records: Vec<ChurnRecord>,
    pub at_risk_count: u64,
    pub scored_users: u64,
}

/// Days since each user's last completed order, measured against the
/// dataset's latest order date. Users with no completed order are not
/// scored — they never became active, so they cannot churn.
pub fn churn_report(snapshot: &WarehouseSnapshot, inactivity_threshold_days: i64) -> ChurnReport {
    let mut last_completed: HashMap<u64, DateTime<Utc>> = HashMap::new();
    for order in snapshot.orders() {
        if order.status != OrderStatus::Complete {
            continue;
        }
        last_completed
            .entry(order.user_id)
            .and_modify(|t| {
                if order.created_at > *t {
                    *t = order.created_at;
                }
            })
            .or_insert(order.created_at);
    }

    let Some(reference) = snapshot.max_order_date() else {
        return ChurnReport {
            inactivity_threshold_days,
            records: Vec::new(),
            at_risk_count: 0,
            scored_users: 0,
        };
    };

    let mut records: Vec<ChurnRecord> = last_completed
        .into_iter()
        .map(|(user_id, last)| {
            let days_inactive = (reference - last).num_days();
            ChurnRecord {
                user_id,
                days_inactive,
                at_risk: days_inactive > inactivity_threshold_days,
            }
        })
        .collect();
    records.sort_by_key(|r| std::cmp::Reverse(r.days_inactive));

    let at_risk_count = records.iter().filter(|r| r.at_risk).count() as u64;
    let scored_users = records.len() as u64;

    info!(
        scored = scored_users,
        at_risk = at_risk_count,
        threshold_days = inactivity_threshold_days,
        "Churn report generated"
    );

    ChurnReport {
        inactivity_threshold_days,
        records,
        at_risk_count,
        scored_users,
    }
}

// ─── Conversion latency ─────────────────────────────────────────────────────

/// Fixed year-length windows between account creation and first completed
/// order. `Never` collects users who have not converted at all, so the
/// other six windows partition the converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionWindow {
    SameDay,
    FirstYear,
    SecondYear,
    ThirdYear,
    FourthYear,
    Beyond,
    Never,
}

impl ConversionWindow {
    pub fn from_days(days: i64) -> Self {
        match days {
            0 => Self::SameDay,
            1..=365 => Self::FirstYear,
            366..=730 => Self::SecondYear,
            731..=1095 => Self::ThirdYear,
            1096..=1460 => Self::FourthYear,
            _ => Self::Beyond,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SameDay => "Same-Day",
            Self::FirstYear => "1-365 days",
            Self::SecondYear => "366-730 days",
            Self::ThirdYear => "731-1095 days",
            Self::FourthYear => "1096-1460 days",
            Self::Beyond => ">1460 days",
            Self::Never => "Never converted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// (window, user count), in window order.
    pub windows: Vec<(ConversionWindow, u64)>,
    pub converted_users: u64,
}

/// Bucket every user by the latency between signup and first completed
/// order. Users whose first order predates their signup timestamp are a
/// data inconsistency and land in `SameDay` via clamping to zero.
pub fn conversion_report(snapshot: &WarehouseSnapshot) -> ConversionReport {
    let mut first_completed: HashMap<u64, DateTime<Utc>> = HashMap::new();
    for order in snapshot.orders() {
        if order.status != OrderStatus::Complete {
            continue;
        }
        first_completed
            .entry(order.user_id)
            .and_modify(|t| {
                if order.created_at < *t {
                    *t = order.created_at;
                }
            })
            .or_insert(order.created_at);
    }

    let mut counts: HashMap<ConversionWindow, u64> = HashMap::new();
    let mut converted = 0u64;
    for user in snapshot.users() {
        let window = match first_completed.get(&user.id) {
            Some(first) => {
                converted += 1;
                let days = (*first - user.created_at).num_days().max(0);
                ConversionWindow::from_days(days)
            }
            None => ConversionWindow::Never,
        };
        *counts.entry(window).or_insert(0) += 1;
    }

    let windows = [
        ConversionWindow::SameDay,
        ConversionWindow::FirstYear,
        ConversionWindow::SecondYear,
        ConversionWindow::ThirdYear,
        ConversionWindow::FourthYear,
        ConversionWindow::Beyond,
        ConversionWindow::Never,
    ]
    .into_iter()
    .map(|w| (w, counts.get(&w).copied().unwrap_or(0)))
    .collect();

    ConversionReport {
        windows,
        converted_users: converted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shoplens_core::types::Order;

    fn order(id: u64, user_id: u64, status: OrderStatus, day: u32) -> Order {
        Order {
            id,
            user_id,
            status,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            shipped_at: None,
            delivered_at: None,
            returned_at: None,
            num_items: 1,
        }
    }

    fn snapshot_with_orders(orders: Vec<Order>) -> WarehouseSnapshot {
        WarehouseSnapshot::new(orders, vec![], vec![], vec![], vec![])
    }

    #[test]
    fn test_at_risk_flagging() {
        // Latest order is day 28; user 1 last completed on day 1.
        let snapshot = snapshot_with_orders(vec![
            order(1, 1, OrderStatus::Complete, 1),
            order(2, 2, OrderStatus::Complete, 28),
        ]);

        let report = churn_report(&snapshot, 20);
        assert_eq!(report.scored_users, 2);
        assert_eq!(report.at_risk_count, 1);
        let user1 = report.records.iter().find(|r| r.user_id == 1).unwrap();
        assert_eq!(user1.days_inactive, 27);
        assert!(user1.at_risk);
    }

    #[test]
    fn test_at_risk_count_is_monotone_in_threshold() {
        let snapshot = snapshot_with_orders(vec![
            order(1, 1, OrderStatus::Complete, 1),
            order(2, 2, OrderStatus::Complete, 10),
            order(3, 3, OrderStatus::Complete, 20),
            order(4, 4, OrderStatus::Complete, 28),
        ]);

        let mut previous = u64::MAX;
        for threshold in [0, 5, 10, 20, 30] {
            let count = churn_report(&snapshot, threshold).at_risk_count;
            assert!(count <= previous, "threshold {threshold} raised the count");
            previous = count;
        }
    }

    #[test]
    fn test_cancelled_orders_do_not_count_as_activity() {
        let snapshot = snapshot_with_orders(vec![
            order(1, 1, OrderStatus::Cancelled, 28),
            order(2, 2, OrderStatus::Complete, 28),
        ]);
        let report = churn_report(&snapshot, 180);
        assert_eq!(report.scored_users, 1);
    }

    #[test]
    fn test_conversion_rollup_counts_per_window() {
        let user = |id: u64, year: i32| shoplens_core::types::User {
            id,
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.c".into(),
            age: None,
            gender: None,
            country: "US".into(),
            city: None,
            traffic_source: "Search".into(),
            created_at: Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
        };

        // User 1 converts same-day, user 2 after two years, user 3 never.
        let snapshot = WarehouseSnapshot::new(
            vec![
                order(1, 1, OrderStatus::Complete, 1),
                order(2, 2, OrderStatus::Complete, 1),
            ],
            vec![],
            vec![user(1, 2024), user(2, 2022), user(3, 2024)],
            vec![],
            vec![],
        );

        let report = conversion_report(&snapshot);
        let count = |w: ConversionWindow| {
            report
                .windows
                .iter()
                .find(|(window, _)| *window == w)
                .map(|(_, n)| *n)
                .unwrap()
        };
        assert_eq!(count(ConversionWindow::SameDay), 1);
        assert_eq!(count(ConversionWindow::SecondYear), 1);
        assert_eq!(count(ConversionWindow::Never), 1);
        assert_eq!(report.converted_users, 2);
    }

    #[test]
    fn test_conversion_window_boundaries() {
        assert_eq!(ConversionWindow::from_days(0), ConversionWindow::SameDay);
        assert_eq!(ConversionWindow::from_days(1), ConversionWindow::FirstYear);
        assert_eq!(ConversionWindow::from_days(365), ConversionWindow::FirstYear);
        assert_eq!(ConversionWindow::from_days(366), ConversionWindow::SecondYear);
        assert_eq!(ConversionWindow::from_days(1460), ConversionWindow::FourthYear);
        assert_eq!(ConversionWindow::from_days(1461), ConversionWindow::Beyond);
    }
}
