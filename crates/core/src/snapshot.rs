//! Immutable warehouse snapshot — the single fact store every report
//! reads from. Built once by the ingest pipeline, then shared read-only.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::types::{DistributionCenter, Order, OrderItem, OrderStatus, Product, User};

#[derive(Debug, Default)]
pub struct WarehouseSnapshot {
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    users: Vec<User>,
    products: Vec<Product>,
    distribution_centers: Vec<DistributionCenter>,

    order_index: HashMap<u64, usize>,
    user_index: HashMap<u64, usize>,
    product_index: HashMap<u64, usize>,
    center_index: HashMap<u64, usize>,
}

impl WarehouseSnapshot {
    pub fn new(
        orders: Vec<Order>,
        order_items: Vec<OrderItem>,
        users: Vec<User>,
        products: Vec<Product>,
        distribution_centers: Vec<DistributionCenter>,
    ) -> Self {
        let order_index = orders.iter().enumerate().map(|(i, o)| (o.id, i)).collect();
        let user_index = users.iter().enumerate().map(|(i, u)| (u.id, i)).collect();
        let product_index = products.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        let center_index = distribution_centers
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();

        Self {
            orders,
            order_items,
            users,
            products,
            distribution_centers,
            order_index,
            user_index,
            product_index,
            center_index,
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order_items(&self) -> &[OrderItem] {
        &self.order_items
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn distribution_centers(&self) -> &[DistributionCenter] {
        &self.distribution_centers
    }

    pub fn order(&self, id: u64) -> Option<&Order> {
        self.order_index.get(&id).map(|&i| &self.orders[i])
    }

    pub fn user(&self, id: u64) -> Option<&User> {
        self.user_index.get(&id).map(|&i| &self.users[i])
    }

    pub fn product(&self, id: u64) -> Option<&Product> {
        self.product_index.get(&id).map(|&i| &self.products[i])
    }

    pub fn distribution_center(&self, id: u64) -> Option<&DistributionCenter> {
        self.center_index
            .get(&id)
            .map(|&i| &self.distribution_centers[i])
    }

    /// Order items carrying the given status.
    pub fn items_with_status(&self, status: OrderStatus) -> impl Iterator<Item = &OrderItem> {
        self.order_items.iter().filter(move |i| i.status == status)
    }

    /// The latest order creation timestamp in the dataset. Recency and
    /// churn are measured against this, never against wall-clock now.
    pub fn max_order_date(&self) -> Option<DateTime<Utc>> {
        self.orders.iter().map(|o| o.created_at).max()
    }

    pub fn is_empty(&self) -> bool {
        self.order_items.is_empty()
    }
}
