use bazaar_catalog::{Catalog, ProductError};
use bazaar_shared::models::events::{MarketEvent, OrderCompletedEvent};
use bazaar_store::{keys, Collections, EventSink, StoreError};
use std::sync::Arc;
use tracing::info;

use crate::cart::{CartError, CartService};
use crate::models::{NotificationKind, Order, OrderItem, OrderStatus};
use crate::notifications::NotificationService;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Product is sold out: {0}")]
    SoldOut(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Catalog(#[from] ProductError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Turns a cart into an order.
#[derive(Clone)]
pub struct CheckoutService {
    collections: Collections,
    catalog: Catalog,
    cart: CartService,
    notifications: NotificationService,
    events: Option<Arc<dyn EventSink>>,
}

impl CheckoutService {
    pub fn new(
        collections: Collections,
        catalog: Catalog,
        cart: CartService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            collections,
            catalog,
            cart,
            notifications,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Buy everything in the user's cart at today's prices.
    ///
    /// Steps: append the order, mark products sold out, empty the cart,
    /// notify the buyer. Each step is a separate write.
    pub fn checkout(&self, user_id: &str) -> Result<Order, CheckoutError> {
        let lines = self.cart.lines(user_id)?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if let Some(line) = lines.iter().find(|l| l.product.sold_out) {
            return Err(CheckoutError::SoldOut(line.product.id.clone()));
        }

        let mut order = Order::new(user_id.to_string());
        for line in &lines {
            order.add_item(OrderItem {
                product_id: line.product.id.clone(),
                product_name: line.product.name.clone(),
                quantity: line.quantity,
                price: line.product.price,
            });
        }
        order.status = OrderStatus::Completed;

        let key = keys::orders(user_id);
        let mut orders: Vec<Order> = self.collections.load(&key)?;
        orders.push(order.clone());
        self.collections.save(&key, &orders)?;

        let product_ids: Vec<String> = order.items.iter().map(|i| i.product_id.clone()).collect();
        self.catalog.mark_sold_out(&product_ids)?;
        self.cart.clear(user_id)?;
        self.notifications.push(
            user_id,
            NotificationKind::Order,
            format!("Order completed! {} item(s) purchased.", lines.len()),
        )?;

        info!("Order {} completed for {}: total {}", order.id, user_id, order.total);
        if let Some(events) = &self.events {
            events.publish(MarketEvent::OrderCompleted(OrderCompletedEvent {
                order_id: order.id,
                user_id: user_id.to_string(),
                product_ids,
                total: order.total,
                timestamp: order.created_at.timestamp(),
            }));
        }

        Ok(order)
    }

    /// Past orders, newest first
    pub fn orders(&self, user_id: &str) -> Result<Vec<Order>, CheckoutError> {
        let mut orders: Vec<Order> = self.collections.load(&keys::orders(user_id))?;
        orders.reverse();
        Ok(orders)
    }
}
