//! Warehouse reporting — revenue and profit rollups across grouping
//! dimensions, order-value segmentation, logistics metrics, and the
//! tabular report model with CSV/JSON export.

pub mod logistics;
pub mod order_value;
pub mod report;
pub mod revenue;

pub use logistics::{logistics_report, CenterRow};
pub use order_value::{order_value_report, OrderValueReport, ValueBand};
pub use report::{ReportCatalog, ReportTable};
pub use revenue::{
    monthly_running_total, return_rate_by_category, revenue_by, Dimension, RevenueRow,
};
