//! Staging records — the warehouse stores every column as text, ids
//! included, so the staging layer mirrors that and defers all casting
//! to the parse step.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RawOrder {
    pub order_id: String,
    pub user_id: String,
    pub status: String,
    pub created_at: String,
    #[serde(default)]
    pub shipped_at: String,
    #[serde(default)]
    pub delivered_at: String,
    #[serde(default)]
    pub returned_at: String,
    pub num_of_item: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOrderItem {
    pub id: String,
    pub order_id: String,
    pub user_id: String,
    pub product_id: String,
    pub inventory_item_id: String,
    pub status: String,
    pub sale_price: String,
    pub created_at: String,
    #[serde(default)]
    pub shipped_at: String,
    #[serde(default)]
    pub delivered_at: String,
    #[serde(default)]
    pub returned_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    pub country: String,
    #[serde(default)]
    pub city: String,
    pub traffic_source: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub department: String,
    pub cost: String,
    pub retail_price: String,
    pub distribution_center_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDistributionCenter {
    pub id: String,
    pub name: String,
    pub latitude: String,
    pub longitude: String,
}
