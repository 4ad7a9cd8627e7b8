//! Order repository.

use std::sync::Arc;

use nonna_rues_core::types::order::FIRST_ORDER_NUMBER;
use nonna_rues_core::{Customer, Order, OrderItem, OrderStatus, ShippingAddress};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{DbError, JsonCollection};

/// CRUD over placed orders.
#[derive(Clone, Debug)]
pub struct OrderRepository {
    collection: Arc<JsonCollection<Order>>,
}

impl OrderRepository {
    pub(crate) fn new(collection: Arc<JsonCollection<Order>>) -> Self {
        Self { collection }
    }

    /// All orders, newest first.
    pub async fn list(&self) -> Vec<Order> {
        self.collection
            .read(|docs| {
                let mut orders = docs.to_vec();
                orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                orders
            })
            .await
    }

    /// Look up one order by id.
    pub async fn get(&self, id: Uuid) -> Option<Order> {
        self.collection
            .read(|docs| docs.iter().find(|o| o.id == id).cloned())
            .await
    }

    /// Record a new order, assigning the next sequential order number.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the collection cannot be persisted.
    pub async fn create(
        &self,
        customer: Customer,
        items: Vec<OrderItem>,
        total: Decimal,
        shipping_address: ShippingAddress,
    ) -> Result<Order, DbError> {
        self.collection
            .mutate(|docs| {
                let number = docs
                    .iter()
                    .map(|o| o.order_number)
                    .max()
                    .map_or(FIRST_ORDER_NUMBER, |n| n + 1);
                let order = Order::new(number, customer, items, total, shipping_address);
                docs.push(order.clone());
                order
            })
            .await
    }

    /// Change an order's status. Returns `None` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the collection cannot be persisted.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, DbError> {
        self.collection
            .mutate(|docs| {
                let order = docs.iter_mut().find(|o| o.id == id)?;
                order.status = status;
                order.updated_at = chrono::Utc::now();
                Some(order.clone())
            })
            .await
    }
}
