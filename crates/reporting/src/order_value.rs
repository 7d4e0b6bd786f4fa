//! Order-value segmentation — classifies each order into Low/Mid/High
//! bands by its summed item value, using configurable thresholds.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use shoplens_core::config::OrderValueConfig;
use shoplens_core::snapshot::WarehouseSnapshot;
use shoplens_core::types::round_money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueBand {
    Low,
    Mid,
    High,
}

impl ValueBand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Mid => "Mid",
            Self::High => "High",
        }
    }

    pub fn classify(order_total: f64, config: &OrderValueConfig) -> Self {
        if order_total > config.high_threshold {
            Self::High
        } else if order_total > config.mid_threshold {
            Self::Mid
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandRow {
    pub band: ValueBand,
    pub orders: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderValueReport {
    /// One row per band, Low to High, including empty bands.
    pub bands: Vec<BandRow>,
    pub total_orders: u64,
    pub total_revenue: f64,
}

/// Sum each order's items and classify it. The per-band revenues always
/// re-sum to the total revenue of the analyzed set.
pub fn order_value_report(
    snapshot: &WarehouseSnapshot,
    config: &OrderValueConfig,
) -> OrderValueReport {
    let mut order_totals: HashMap<u64, f64> = HashMap::new();
    for item in snapshot.order_items() {
        *order_totals.entry(item.order_id).or_insert(0.0) += item.sale_price;
    }

    let mut bands: HashMap<ValueBand, (u64, f64)> = HashMap::new();
    let mut total_revenue = 0.0;
    for total in order_totals.values() {
        let band = ValueBand::classify(*total, config);
        let entry = bands.entry(band).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += total;
        total_revenue += total;
    }

    let bands = [ValueBand::Low, ValueBand::Mid, ValueBand::High]
        .into_iter()
        .map(|band| {
            let (orders, revenue) = bands.get(&band).copied().unwrap_or((0, 0.0));
            BandRow {
                band,
                orders,
                revenue: round_money(revenue),
            }
        })
        .collect();

    OrderValueReport {
        bands,
        total_orders: order_totals.len() as u64,
        total_revenue: round_money(total_revenue),
    }
}
