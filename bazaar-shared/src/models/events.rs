use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ProductListedEvent {
    pub product_id: String,
    pub seller_id: String,
    pub price: u64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct BargainCreatedEvent {
    pub bargain_id: Uuid,
    pub product_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub original_price: u64,
    pub offered_price: u64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct BargainRespondedEvent {
    pub bargain_id: Uuid,
    pub product_id: String,
    pub accepted: bool,
    pub price_applied: bool,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct OrderCompletedEvent {
    pub order_id: Uuid,
    pub user_id: String,
    pub product_ids: Vec<String>,
    pub total: u64,
    pub timestamp: i64,
}

/// Everything the marketplace announces to the outside world.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    ProductListed(ProductListedEvent),
    BargainCreated(BargainCreatedEvent),
    BargainResponded(BargainRespondedEvent),
    OrderCompleted(OrderCompletedEvent),
}

impl MarketEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            MarketEvent::ProductListed(_) => "product_listed",
            MarketEvent::BargainCreated(_) => "bargain_created",
            MarketEvent::BargainResponded(_) => "bargain_responded",
            MarketEvent::OrderCompleted(_) => "order_completed",
        }
    }
}
