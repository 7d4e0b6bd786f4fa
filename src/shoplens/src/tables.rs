//! Builds `ReportTable`s from the report outputs and registers them in
//! the catalog under stable names (the names double as export filenames).

use serde_json::{json, Value};

use shoplens_core::config::OrderValueConfig;
use shoplens_core::snapshot::WarehouseSnapshot;
use shoplens_core::types::OrderStatus;
use shoplens_reporting::revenue::{monthly_running_total, return_rate_by_category};
use shoplens_reporting::{order_value_report, revenue_by, Dimension, ReportCatalog, ReportTable};
use shoplens_segmentation::{churn_report, conversion_report, score_users};

/// Revenue reports cover completed sales.
const SOLD: &[OrderStatus] = &[OrderStatus::Complete];

fn opt(value: Option<f64>) -> Value {
    match value {
        Some(v) => json!(round4(v)),
        None => Value::Null,
    }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

pub fn revenue_table(snapshot: &WarehouseSnapshot, dimension: Dimension, catalog: &ReportCatalog) {
    let rows = revenue_by(snapshot, dimension, SOLD);
    let mut table = ReportTable::new(
        format!("Revenue by {}", dimension.label()),
        &[dimension.label(), "distinct_orders", "items", "revenue", "profit", "avg_order_value"],
    );
    for row in rows {
        table.push_row(vec![
            json!(row.key),
            json!(row.distinct_orders),
            json!(row.items),
            json!(row.revenue),
            json!(row.profit),
            opt(row.avg_order_value),
        ]);
    }
    catalog.insert(&format!("revenue_by_{}", dimension.label()), table);
}

pub fn running_total_table(snapshot: &WarehouseSnapshot, catalog: &ReportCatalog) {
    let rows = monthly_running_total(snapshot, SOLD);
    let mut table = ReportTable::new(
        "Monthly revenue running total",
        &["month", "revenue", "cumulative_revenue"],
    );
    for row in rows {
        table.push_row(vec![
            json!(row.month),
            json!(row.revenue),
            json!(row.cumulative_revenue),
        ]);
    }
    catalog.insert("monthly_running_total", table);
}

pub fn return_rate_table(snapshot: &WarehouseSnapshot, catalog: &ReportCatalog) {
    let rows = return_rate_by_category(snapshot);
    let mut table = ReportTable::new(
        "Return rate by category",
        &["category", "total_items", "returned_items", "return_rate"],
    );
    for row in rows {
        table.push_row(vec![
            json!(row.category),
            json!(row.total_items),
            json!(row.returned_items),
            opt(row.return_rate),
        ]);
    }
    catalog.insert("return_rate_by_category", table);
}

pub fn order_value_table(
    snapshot: &WarehouseSnapshot,
    config: &OrderValueConfig,
    catalog: &ReportCatalog,
) {
    let report = order_value_report(snapshot, config);
    let mut table = ReportTable::new(
        format!(
            "Order-value segments (High > {}, Mid > {})",
            config.high_threshold, config.mid_threshold
        ),
        &["segment", "orders", "revenue"],
    );
    for band in &report.bands {
        table.push_row(vec![
            json!(band.band.label()),
            json!(band.orders),
            json!(band.revenue),
        ]);
    }
    catalog.insert("order_value_segments", table);
}

pub fn rfm_tables(snapshot: &WarehouseSnapshot, catalog: &ReportCatalog) {
    let report = score_users(snapshot);

    let mut rollup = ReportTable::new("RFM segments", &["segment", "users"]);
    for (segment, count) in &report.segment_counts {
        rollup.push_row(vec![json!(segment.label()), json!(count)]);
    }
    catalog.insert("rfm_segments", rollup);

    let mut scores = ReportTable::new(
        "RFM scores per customer",
        &["user_id", "recency_days", "frequency", "monetary", "rfm_code", "segment"],
    );
    for score in &report.scores {
        scores.push_row(vec![
            json!(score.user_id),
            json!(score.recency_days),
            json!(score.frequency),
            json!(score.monetary),
            json!(score.code),
            json!(score.segment.label()),
        ]);
    }
    catalog.insert("rfm_scores", scores);
}

pub fn churn_table(snapshot: &WarehouseSnapshot, threshold_days: i64, catalog: &ReportCatalog) {
    let report = churn_report(snapshot, threshold_days);
    let mut table = ReportTable::new(
        format!(
            "At-risk customers ({} of {} scored, threshold {} days)",
            report.at_risk_count, report.scored_users, report.inactivity_threshold_days
        ),
        &["user_id", "days_inactive"],
    );
    for record in report.records.iter().filter(|r| r.at_risk) {
        table.push_row(vec![json!(record.user_id), json!(record.days_inactive)]);
    }
    catalog.insert("churn_at_risk", table);
}

pub fn conversion_table(snapshot: &WarehouseSnapshot, catalog: &ReportCatalog) {
    let report = conversion_report(snapshot);
    let mut table = ReportTable::new(
        "Signup to first completed order",
        &["window", "users"],
    );
    for (window, count) in &report.windows {
        table.push_row(vec![json!(window.label()), json!(count)]);
    }
    catalog.insert("conversion_windows", table);
}

pub fn basket_table(snapshot: &WarehouseSnapshot, top_pairs: usize, catalog: &ReportCatalog) {
    let report = shoplens_basket::co_occurrence(snapshot, top_pairs);
    let mut table = ReportTable::new(
        format!("Top co-purchased product pairs ({} orders analyzed)", report.orders_analyzed),
        &["product_a", "product_b", "orders_together"],
    );
    for pair in &report.pairs {
        table.push_row(vec![
            json!(pair.product_a),
            json!(pair.product_b),
            json!(pair.orders_together),
        ]);
    }
    catalog.insert("basket_pairs", table);
}

pub fn logistics_table(snapshot: &WarehouseSnapshot, catalog: &ReportCatalog) {
    let rows = shoplens_reporting::logistics_report(snapshot);
    let mut table = ReportTable::new(
        "Distribution center logistics",
        &[
            "center",
            "total_items",
            "shipped_items",
            "returned_items",
            "avg_hours_to_ship",
            "avg_hours_to_deliver",
            "return_rate",
        ],
    );
    for row in rows {
        table.push_row(vec![
            json!(row.center_name),
            json!(row.total_items),
            json!(row.shipped_items),
            json!(row.returned_items),
            opt(row.avg_hours_to_ship),
            opt(row.avg_hours_to_deliver),
            opt(row.return_rate),
        ]);
    }
    catalog.insert("logistics_by_center", table);
}
