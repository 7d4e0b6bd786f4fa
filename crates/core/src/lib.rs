//! Core domain model for the Shoplens warehouse analytics suite —
//! entities, status handling, configuration, errors, and the immutable
//! warehouse snapshot every report reads from.

pub mod config;
pub mod error;
pub mod snapshot;
pub mod types;

pub use config::AppConfig;
pub use error::{ShoplensError, ShoplensResult};
pub use snapshot::WarehouseSnapshot;
pub use types::{DistributionCenter, Order, OrderItem, OrderStatus, Product, User};
