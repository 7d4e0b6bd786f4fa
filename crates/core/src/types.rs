//! Warehouse entities. These are immutable analytical facts: loaded once
//! by the ingest pipeline, then only read by reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an order or order item.
///
/// The source warehouse stored these as free-form text with inconsistent
/// casing ('complete' vs 'Complete'), so parsing is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Complete,
    Returned,
    Cancelled,
    Processing,
    Shipped,
}

impl OrderStatus {
    /// Parse a raw status string, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "complete" => Some(Self::Complete),
            "returned" => Some(Self::Returned),
            "cancelled" => Some(Self::Cancelled),
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Returned => "returned",
            Self::Cancelled => "cancelled",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub user_id: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub num_items: u32,
}

/// One row per line item; an order aggregates one or more items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: u64,
    pub order_id: u64,
    pub user_id: u64,
    pub product_id: u64,
    pub inventory_item_id: u64,
    pub status: OrderStatus,
    pub sale_price: f64,
    pub created_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub country: String,
    pub city: Option<String>,
    pub traffic_source: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub category: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub department: String,
    pub cost: f64,
    pub retail_price: f64,
    pub distribution_center_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionCenter {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Round a monetary value to 2 decimal places.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(OrderStatus::parse("Complete"), Some(OrderStatus::Complete));
        assert_eq!(OrderStatus::parse("complete"), Some(OrderStatus::Complete));
        assert_eq!(OrderStatus::parse(" CANCELLED "), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::parse("pending"), None);
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(12.345), 12.35);
        assert_eq!(round_money(12.344), 12.34);
        assert_eq!(round_money(0.0), 0.0);
    }
}
