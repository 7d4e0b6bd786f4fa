//! Parse-and-validate step: casts staged strings into typed entities and
//! fails closed — every invalid row becomes a `RowRejection` and the rest
//! of the batch proceeds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use shoplens_core::types::{
    round_money, DistributionCenter, Order, OrderItem, OrderStatus, Product, User,
};

/// A staged row that failed validation, with enough context to trace it
/// back to the source file.
#[derive(Debug, Clone, Serialize)]
pub struct RowRejection {
    pub source: String,
    pub line: u64,
    pub reason: String,
}

/// Outcome of a full warehouse load: per-entity accepted counts plus
/// every rejected row.
#[derive(Debug, Default, Serialize)]
pub struct IngestReport {
    pub orders_loaded: usize,
    pub order_items_loaded: usize,
    pub users_loaded: usize,
    pub products_loaded: usize,
    pub distribution_centers_loaded: usize,
    pub rejections: Vec<RowRejection>,
}

impl IngestReport {
    pub fn reject(&mut self, source: &str, line: u64, reason: impl Into<String>) {
        self.rejections.push(RowRejection {
            source: source.to_string(),
            line,
            reason: reason.into(),
        });
    }

    pub fn rejected_count(&self) -> usize {
        self.rejections.len()
    }
}

// ─── Field parsers ──────────────────────────────────────────────────────────

pub fn parse_id(field: &str, name: &str) -> Result<u64, String> {
    field
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid {name}: {field:?}"))
}

/// Accepts RFC 3339 as well as the space-separated datetime and bare date
/// forms the warehouse exports use.
pub fn parse_datetime(field: &str) -> Result<DateTime<Utc>, String> {
    let s = field.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    let stripped = s.strip_suffix(" UTC").unwrap_or(s);
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(stripped, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(stripped, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(format!("invalid timestamp: {field:?}"))
}

/// Empty strings and the usual null markers mean "not present".
pub fn parse_optional_datetime(field: &str) -> Result<Option<DateTime<Utc>>, String> {
    let s = field.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    parse_datetime(s).map(Some)
}

pub fn parse_money(field: &str, name: &str) -> Result<f64, String> {
    let value = field
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid {name}: {field:?}"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("negative {name}: {value}"));
    }
    Ok(round_money(value))
}

fn parse_status(field: &str) -> Result<OrderStatus, String> {
    OrderStatus::parse(field).ok_or_else(|| format!("unknown status: {field:?}"))
}

/// created ≤ shipped ≤ delivered, and created ≤ returned.
fn check_lifecycle(
    created: DateTime<Utc>,
    shipped: Option<DateTime<Utc>>,
    delivered: Option<DateTime<Utc>>,
    returned: Option<DateTime<Utc>>,
) -> Result<(), String> {
    if let Some(s) = shipped {
        if s < created {
            return Err("shipped_at precedes created_at".into());
        }
        if let Some(d) = delivered {
            if d < s {
                return Err("delivered_at precedes shipped_at".into());
            }
        }
    }
    if let Some(r) = returned {
        if r < created {
            return Err("returned_at precedes created_at".into());
        }
    }
    Ok(())
}

// ─── Row parsers ────────────────────────────────────────────────────────────

impl super::staging::RawOrder {
    pub fn parse(&self) -> Result<Order, String> {
        let created_at = parse_datetime(&self.created_at)?;
        let shipped_at = parse_optional_datetime(&self.shipped_at)?;
        let delivered_at = parse_optional_datetime(&self.delivered_at)?;
        let returned_at = parse_optional_datetime(&self.returned_at)?;
        check_lifecycle(created_at, shipped_at, delivered_at, returned_at)?;

        Ok(Order {
            id: parse_id(&self.order_id, "order_id")?,
            user_id: parse_id(&self.user_id, "user_id")?,
            status: parse_status(&self.status)?,
            created_at,
            shipped_at,
            delivered_at,
            returned_at,
            num_items: self
                .num_of_item
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid num_of_item: {:?}", self.num_of_item))?,
        })
    }
}

impl super::staging::RawOrderItem {
    pub fn parse(&self) -> Result<OrderItem, String> {
        let created_at = parse_datetime(&self.created_at)?;
        let shipped_at = parse_optional_datetime(&self.shipped_at)?;
        let delivered_at = parse_optional_datetime(&self.delivered_at)?;
        let returned_at = parse_optional_datetime(&self.returned_at)?;
        check_lifecycle(created_at, shipped_at, delivered_at, returned_at)?;

        Ok(OrderItem {
            id: parse_id(&self.id, "id")?,
            order_id: parse_id(&self.order_id, "order_id")?,
            user_id: parse_id(&self.user_id, "user_id")?,
            product_id: parse_id(&self.product_id, "product_id")?,
            inventory_item_id: parse_id(&self.inventory_item_id, "inventory_item_id")?,
            status: parse_status(&self.status)?,
            sale_price: parse_money(&self.sale_price, "sale_price")?,
            created_at,
            shipped_at,
            delivered_at,
            returned_at,
        })
    }
}

impl super::staging::RawUser {
    pub fn parse(&self) -> Result<User, String> {
        let age = match self.age.trim() {
            "" => None,
            raw => Some(
                raw.parse::<u32>()
                    .map_err(|_| format!("invalid age: {raw:?}"))?,
            ),
        };

        Ok(User {
            id: parse_id(&self.id, "id")?,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            age,
            gender: non_empty(&self.gender),
            country: self.country.trim().to_string(),
            city: non_empty(&self.city),
            traffic_source: self.traffic_source.trim().to_string(),
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl super::staging::RawProduct {
    pub fn parse(&self) -> Result<Product, String> {
        Ok(Product {
            id: parse_id(&self.id, "id")?,
            category: self.category.trim().to_string(),
            name: non_empty(&self.name),
            brand: non_empty(&self.brand),
            department: self.department.trim().to_string(),
            cost: parse_money(&self.cost, "cost")?,
            retail_price: parse_money(&self.retail_price, "retail_price")?,
            distribution_center_id: parse_id(&self.distribution_center_id, "distribution_center_id")?,
        })
    }
}

impl super::staging::RawDistributionCenter {
    pub fn parse(&self) -> Result<DistributionCenter, String> {
        Ok(DistributionCenter {
            id: parse_id(&self.id, "id")?,
            name: self.name.trim().to_string(),
            latitude: parse_coord(&self.latitude, "latitude")?,
            longitude: parse_coord(&self.longitude, "longitude")?,
        })
    }
}

fn parse_coord(field: &str, name: &str) -> Result<f64, String> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid {name}: {field:?}"))
}

fn non_empty(field: &str) -> Option<String> {
    let s = field.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::{RawOrder, RawOrderItem};

    fn raw_item() -> RawOrderItem {
        RawOrderItem {
            id: "1".into(),
            order_id: "10".into(),
            user_id: "100".into(),
            product_id: "1000".into(),
            inventory_item_id: "5000".into(),
            status: "Complete".into(),
            sale_price: "19.999".into(),
            created_at: "2024-03-01 10:00:00".into(),
            shipped_at: "2024-03-02 10:00:00".into(),
            delivered_at: "2024-03-04 10:00:00".into(),
            returned_at: "".into(),
        }
    }

    #[test]
    fn test_item_parses_and_rounds_money() {
        let item = raw_item().parse().unwrap();
        assert_eq!(item.sale_price, 20.0);
        assert_eq!(item.status, OrderStatus::Complete);
        assert!(item.returned_at.is_none());
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut raw = raw_item();
        raw.sale_price = "-5.00".into();
        assert!(raw.parse().unwrap_err().contains("negative sale_price"));
    }

    #[test]
    fn test_non_monotonic_lifecycle_rejected() {
        let mut raw = raw_item();
        raw.shipped_at = "2024-02-01 10:00:00".into();
        assert!(raw.parse().unwrap_err().contains("shipped_at precedes"));
    }

    #[test]
    fn test_mixed_case_status_accepted() {
        let mut raw = raw_item();
        raw.status = "COMPLETE".into();
        assert_eq!(raw.parse().unwrap().status, OrderStatus::Complete);
    }

    #[test]
    fn test_datetime_formats() {
        assert!(parse_datetime("2024-03-01T10:00:00Z").is_ok());
        assert!(parse_datetime("2024-03-01 10:00:00+00:00").is_ok());
        assert!(parse_datetime("2024-03-01 10:00:00 UTC").is_ok());
        assert!(parse_datetime("2024-03-01").is_ok());
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn test_malformed_order_timestamp_is_an_error() {
        let raw = RawOrder {
            order_id: "1".into(),
            user_id: "2".into(),
            status: "processing".into(),
            created_at: "not-a-date".into(),
            shipped_at: "".into(),
            delivered_at: "".into(),
            returned_at: "".into(),
            num_of_item: "1".into(),
        };
        assert!(raw.parse().is_err());
    }
}
