use serde::Deserialize;

use crate::error::{ShoplensError, ShoplensResult};

/// Root application configuration. Loaded from an optional `shoplens.toml`
/// and environment variables with the prefix `SHOPLENS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub order_value: OrderValueConfig,
    #[serde(default)]
    pub churn: ChurnConfig,
    #[serde(default)]
    pub basket: BasketConfig,
}

/// Paths to the warehouse CSV extracts.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_orders_path")]
    pub orders_path: String,
    #[serde(default = "default_order_items_path")]
    pub order_items_path: String,
    #[serde(default = "default_users_path")]
    pub users_path: String,
    #[serde(default = "default_products_path")]
    pub products_path: String,
    #[serde(default = "default_distribution_centers_path")]
    pub distribution_centers_path: String,
}

/// Thresholds for the Low/Mid/High order-value segmentation, in the same
/// currency unit as `sale_price`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderValueConfig {
    #[serde(default = "default_high_threshold")]
    pub high_threshold: f64,
    #[serde(default = "default_mid_threshold")]
    pub mid_threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChurnConfig {
    /// Days without a completed order (relative to the dataset's latest
    /// order date) after which a customer is flagged at risk.
    #[serde(default = "default_inactivity_days")]
    pub inactivity_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasketConfig {
    #[serde(default = "default_top_pairs")]
    pub top_pairs: usize,
}

impl AppConfig {
    pub fn load() -> ShoplensResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("shoplens").required(false))
            .add_source(config::Environment::with_prefix("SHOPLENS").separator("__"))
            .build()
            .map_err(|e| ShoplensError::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| ShoplensError::Config(e.to_string()))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            order_value: OrderValueConfig::default(),
            churn: ChurnConfig::default(),
            basket: BasketConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            orders_path: default_orders_path(),
            order_items_path: default_order_items_path(),
            users_path: default_users_path(),
            products_path: default_products_path(),
            distribution_centers_path: default_distribution_centers_path(),
        }
    }
}

impl Default for OrderValueConfig {
    fn default() -> Self {
        Self {
            high_threshold: default_high_threshold(),
            mid_threshold: default_mid_threshold(),
        }
    }
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            inactivity_days: default_inactivity_days(),
        }
    }
}

impl Default for BasketConfig {
    fn default() -> Self {
        Self {
            top_pairs: default_top_pairs(),
        }
    }
}

// Default functions
fn default_orders_path() -> String {
    "data/orders.csv".to_string()
}
fn default_order_items_path() -> String {
    "data/order_items.csv".to_string()
}
fn default_users_path() -> String {
    "data/users.csv".to_string()
}
fn default_products_path() -> String {
    "data/products.csv".to_string()
}
fn default_distribution_centers_path() -> String {
    "data/distribution_centers.csv".to_string()
}
fn default_high_threshold() -> f64 {
    870.0
}
fn default_mid_threshold() -> f64 {
    440.0
}
fn default_inactivity_days() -> i64 {
    180
}
fn default_top_pairs() -> usize {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.order_value.high_threshold, 870.0);
        assert_eq!(config.order_value.mid_threshold, 440.0);
        assert_eq!(config.churn.inactivity_days, 180);
        assert_eq!(config.data.orders_path, "data/orders.csv");
    }
}
