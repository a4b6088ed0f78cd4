use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product in a user's cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
}

/// A completed purchase. Orders are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(user_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            total: 0,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn add_item(&mut self, item: OrderItem) {
        self.total = self.total.saturating_add(item.line_total());
        self.items.push(item);
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// Order line with the price frozen at purchase time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub price: u64,
}

impl OrderItem {
    pub fn line_total(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SoldOut,
    NewProduct,
    Discount,
    Order,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: String, kind: NotificationKind, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            message,
            kind,
            read: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total_counts_quantity() {
        let mut order = Order::new("user_1".to_string());
        order.add_item(OrderItem {
            product_id: "4".to_string(),
            product_name: "Introduction to Algorithms".to_string(),
            quantity: 2,
            price: 450_000,
        });
        order.add_item(OrderItem {
            product_id: "3".to_string(),
            product_name: "Uniqlo Jacket".to_string(),
            quantity: 1,
            price: 250_000,
        });

        assert_eq!(order.total, 1_150_000);
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_order_total_saturates() {
        let mut order = Order::new("user_1".to_string());
        order.add_item(OrderItem {
            product_id: "1".to_string(),
            product_name: "MacBook Air M1".to_string(),
            quantity: u32::MAX,
            price: u64::MAX / 2,
        });
        order.add_item(OrderItem {
            product_id: "2".to_string(),
            product_name: "Sony WH-1000XM4".to_string(),
            quantity: u32::MAX,
            price: 1,
        });

        assert_eq!(order.items[0].line_total(), u64::MAX);
        assert_eq!(order.total, u64::MAX);
        assert_eq!(order.item_count(), 2 * u64::from(u32::MAX));
    }
}
