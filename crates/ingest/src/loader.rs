//! CSV loader — reads the warehouse extracts into staging records, runs
//! the parse step, enforces referential integrity, and assembles the
//! immutable snapshot.

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use shoplens_core::config::DataConfig;
use shoplens_core::error::{ShoplensError, ShoplensResult};
use shoplens_core::snapshot::WarehouseSnapshot;
use shoplens_core::types::{DistributionCenter, Order, OrderItem, Product, User};

use crate::parse::IngestReport;
use crate::staging::{RawDistributionCenter, RawOrder, RawOrderItem, RawProduct, RawUser};

/// Load all five extracts and assemble a snapshot. Individual bad rows
/// are excluded and reported; only an unreadable file is a hard error.
pub fn load_warehouse(config: &DataConfig) -> ShoplensResult<(WarehouseSnapshot, IngestReport)> {
    let mut report = IngestReport::default();

    let orders: Vec<Order> = load_entity(&config.orders_path, "orders", &mut report, RawOrder::parse)?;
    let items: Vec<OrderItem> = load_entity(
        &config.order_items_path,
        "order_items",
        &mut report,
        RawOrderItem::parse,
    )?;
    let users: Vec<User> = load_entity(&config.users_path, "users", &mut report, RawUser::parse)?;
    let products: Vec<Product> = load_entity(
        &config.products_path,
        "products",
        &mut report,
        RawProduct::parse,
    )?;
    let centers: Vec<DistributionCenter> = load_entity(
        &config.distribution_centers_path,
        "distribution_centers",
        &mut report,
        RawDistributionCenter::parse,
    )?;

    let items = filter_referential_gaps(items, &orders, &users, &products, &mut report);

    report.orders_loaded = orders.len();
    report.order_items_loaded = items.len();
    report.users_loaded = users.len();
    report.products_loaded = products.len();
    report.distribution_centers_loaded = centers.len();

    info!(
        orders = report.orders_loaded,
        order_items = report.order_items_loaded,
        users = report.users_loaded,
        products = report.products_loaded,
        rejected = report.rejected_count(),
        "Warehouse snapshot loaded"
    );

    Ok((
        WarehouseSnapshot::new(orders, items, users, products, centers),
        report,
    ))
}

/// Read one CSV file into staging records and parse each row, recording
/// rejections for rows that fail deserialization or validation.
fn load_entity<R, T, F>(
    path: &str,
    source: &str,
    report: &mut IngestReport,
    parse: F,
) -> ShoplensResult<Vec<T>>
where
    R: DeserializeOwned,
    F: Fn(&R) -> Result<T, String>,
{
    if !Path::new(path).exists() {
        return Err(ShoplensError::Ingest(format!(
            "{source} file not found: {path}"
        )));
    }

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| ShoplensError::Ingest(format!("{source}: {e}")))?;

    let mut rows = Vec::new();
    for (i, result) in reader.deserialize::<R>().enumerate() {
        // Header is line 1, first record line 2.
        let line = i as u64 + 2;
        match result {
            Ok(raw) => match parse(&raw) {
                Ok(row) => rows.push(row),
                Err(reason) => report.reject(source, line, reason),
            },
            Err(e) => report.reject(source, line, e.to_string()),
        }
    }

    if !report.rejections.is_empty() {
        warn!(
            source,
            rejected = report.rejections.iter().filter(|r| r.source == source).count(),
            "Rows excluded during ingest"
        );
    }

    Ok(rows)
}

/// Inner-join semantics: an order item referencing a missing order, user,
/// or product is dropped from the fact set rather than failing the load.
fn filter_referential_gaps(
    items: Vec<OrderItem>,
    orders: &[Order],
    users: &[User],
    products: &[Product],
    report: &mut IngestReport,
) -> Vec<OrderItem> {
    let order_ids: HashSet<u64> = orders.iter().map(|o| o.id).collect();
    let user_ids: HashSet<u64> = users.iter().map(|u| u.id).collect();
    let product_ids: HashSet<u64> = products.iter().map(|p| p.id).collect();

    items
        .into_iter()
        .filter(|item| {
            let missing = if !order_ids.contains(&item.order_id) {
                Some(("order", item.order_id))
            } else if !user_ids.contains(&item.user_id) {
                Some(("user", item.user_id))
            } else if !product_ids.contains(&item.product_id) {
                Some(("product", item.product_id))
            } else {
                None
            };

            match missing {
                Some((entity, id)) => {
                    report.reject(
                        "order_items",
                        0,
                        format!("item {} references missing {entity} {id}", item.id),
                    );
                    false
                }
                None => true,
            }
        })
        .collect()
}
