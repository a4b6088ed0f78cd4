use bazaar_catalog::{Catalog, Category, Product, ProductError};
use bazaar_shared::models::events::{BargainCreatedEvent, BargainRespondedEvent, MarketEvent};
use bazaar_store::app_config::BargainRules;
use bazaar_store::{keys, Collections, EventSink, StoreError};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::{BargainRequest, BargainStatus, Party};

// Attempts at writing the bargain collection before giving up on contention.
const MAX_CAS_RETRIES: usize = 8;

/// Lowest acceptable offer: the price minus the largest allowed discount,
/// with the discount rounded down to whole rupiah. Percentages above 100
/// count as 100.
pub fn minimum_offer(price: u64, max_discount_percent: u8) -> u64 {
    let percent = u128::from(max_discount_percent.min(100));
    let max_discount = (u128::from(price) * percent / 100) as u64;
    price.saturating_sub(max_discount)
}

#[derive(Debug, thiserror::Error)]
pub enum BargainError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Bargaining is not available for {0} items")]
    NotEligible(Category),

    #[error("Product is sold out: {0}")]
    SoldOut(String),

    #[error("Offer too low: {offered} is below the minimum of {minimum}")]
    OfferTooLow { offered: u64, minimum: u64 },

    #[error("Invalid offer: {offered} must be lower than the listed price of {price}")]
    InvalidOffer { offered: u64, price: u64 },

    #[error("Bargain request not found: {0}")]
    BargainNotFound(Uuid),

    #[error("Only the seller can respond to bargain {0}")]
    NotSeller(Uuid),

    #[error("Bargain already resolved as {status}")]
    AlreadyResolved { status: BargainStatus },

    #[error("Bargain collection kept changing; gave up after {0} attempts")]
    Conflict(usize),

    #[error(transparent)]
    Catalog(ProductError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ProductError> for BargainError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => BargainError::ProductNotFound(id),
            ProductError::Store(e) => BargainError::Store(e),
            other => BargainError::Catalog(other),
        }
    }
}

/// Result of a seller's answer
#[derive(Debug, Clone, Serialize)]
pub struct RespondOutcome {
    pub bargain: BargainRequest,
    /// `false` when an accepted bargain's product had disappeared.
    pub price_applied: bool,
}

/// Creates bargain requests and moves them through
/// `pending -> accepted | rejected`.
#[derive(Clone)]
pub struct BargainEngine {
    collections: Collections,
    catalog: Catalog,
    rules: BargainRules,
    events: Option<Arc<dyn EventSink>>,
}

impl BargainEngine {
    pub fn new(collections: Collections, catalog: Catalog, rules: BargainRules) -> Self {
        Self {
            collections,
            catalog,
            rules,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn is_eligible(&self, category: Category) -> bool {
        self.rules
            .eligible_categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category.as_str()))
    }

    /// Inclusive bounds of a valid offer for this product.
    pub fn offer_range(&self, product: &Product) -> (u64, u64) {
        (
            minimum_offer(product.price, self.rules.max_discount_percent),
            product.price.saturating_sub(1),
        )
    }

    /// Buyer makes an offer on a listing.
    pub fn create(
        &self,
        product_id: &str,
        buyer: &Party,
        offered_price: u64,
        message: Option<&str>,
    ) -> Result<BargainRequest, BargainError> {
        let product = self
            .catalog
            .get(product_id)?
            .ok_or_else(|| BargainError::ProductNotFound(product_id.to_string()))?;

        if !self.is_eligible(product.category) {
            return Err(BargainError::NotEligible(product.category));
        }
        if product.sold_out {
            return Err(BargainError::SoldOut(product.id));
        }

        let (minimum, _) = self.offer_range(&product);
        if offered_price < minimum {
            return Err(BargainError::OfferTooLow {
                offered: offered_price,
                minimum,
            });
        }
        if offered_price >= product.price {
            return Err(BargainError::InvalidOffer {
                offered: offered_price,
                price: product.price,
            });
        }

        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("I would like to purchase this item for Rp {}", offered_price));

        let bargain = BargainRequest {
            id: Uuid::new_v4(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            original_price: product.price,
            offered_price,
            buyer_id: buyer.id.clone(),
            buyer_name: buyer.name.clone(),
            seller_id: product.seller_id.clone(),
            seller_name: product.seller_name.clone(),
            status: BargainStatus::Pending,
            message,
            created_at: Utc::now(),
            responded_at: None,
        };

        self.update_bargains(|bargains| {
            bargains.push(bargain.clone());
            Ok(())
        })?;

        info!(
            "Bargain {} created: {} offers {} for {} (listed {})",
            bargain.id, bargain.buyer_id, offered_price, bargain.product_id, bargain.original_price
        );
        self.publish(MarketEvent::BargainCreated(BargainCreatedEvent {
            bargain_id: bargain.id,
            product_id: bargain.product_id.clone(),
            buyer_id: bargain.buyer_id.clone(),
            seller_id: bargain.seller_id.clone(),
            original_price: bargain.original_price,
            offered_price,
            timestamp: bargain.created_at.timestamp(),
        }));

        Ok(bargain)
    }

    /// Seller accepts or rejects a pending bargain.
    ///
    /// Acceptance lowers the product's listed price to the offer. The status
    /// write is checked against the collection revision, so two responders
    /// racing on the same request cannot both win. The price write that
    /// follows is separate: a failure there leaves the bargain accepted at
    /// the old price.
    pub fn respond(
        &self,
        bargain_id: Uuid,
        responder_id: &str,
        accept: bool,
    ) -> Result<RespondOutcome, BargainError> {
        let bargain = self.update_bargains(|bargains| {
            let bargain = bargains
                .iter_mut()
                .find(|b| b.id == bargain_id)
                .ok_or(BargainError::BargainNotFound(bargain_id))?;

            if bargain.seller_id != responder_id {
                return Err(BargainError::NotSeller(bargain_id));
            }
            bargain
                .resolve(accept)
                .map_err(|status| BargainError::AlreadyResolved { status })?;

            Ok(bargain.clone())
        })?;

        info!("Bargain {} {} by {}", bargain.id, bargain.status, responder_id);

        let mut price_applied = false;
        if bargain.status == BargainStatus::Accepted {
            price_applied = self
                .catalog
                .set_price(&bargain.product_id, bargain.offered_price)
                .map_err(|e| {
                    error!("Bargain {} accepted but price update failed: {}", bargain.id, e);
                    BargainError::from(e)
                })?;

            if price_applied {
                info!("Product {} repriced to {}", bargain.product_id, bargain.offered_price);
            } else {
                warn!(
                    "Product {} for accepted bargain {} no longer exists; no price change",
                    bargain.product_id, bargain.id
                );
            }
        }

        self.publish(MarketEvent::BargainResponded(BargainRespondedEvent {
            bargain_id: bargain.id,
            product_id: bargain.product_id.clone(),
            accepted: accept,
            price_applied,
            timestamp: Utc::now().timestamp(),
        }));

        Ok(RespondOutcome {
            bargain,
            price_applied,
        })
    }

    pub fn get(&self, bargain_id: Uuid) -> Result<Option<BargainRequest>, BargainError> {
        let bargains: Vec<BargainRequest> = self.collections.load(keys::BARGAINS)?;
        Ok(bargains.into_iter().find(|b| b.id == bargain_id))
    }

    /// Requests a buyer has made, newest first.
    pub fn sent_by(&self, buyer_id: &str) -> Result<Vec<BargainRequest>, BargainError> {
        self.filtered(|b| b.buyer_id == buyer_id)
    }

    /// Requests addressed to a seller, newest first.
    pub fn received_by(&self, seller_id: &str) -> Result<Vec<BargainRequest>, BargainError> {
        self.filtered(|b| b.seller_id == seller_id)
    }

    fn filtered(&self, keep: impl Fn(&BargainRequest) -> bool) -> Result<Vec<BargainRequest>, BargainError> {
        let bargains: Vec<BargainRequest> = self.collections.load(keys::BARGAINS)?;
        let mut selected: Vec<_> = bargains.into_iter().filter(|b| keep(b)).collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(selected)
    }

    /// Read-modify-write on the bargain collection, retried on revision
    /// conflicts. `apply` runs again against fresh data on every attempt.
    fn update_bargains<T>(
        &self,
        mut apply: impl FnMut(&mut Vec<BargainRequest>) -> Result<T, BargainError>,
    ) -> Result<T, BargainError> {
        for attempt in 1..=MAX_CAS_RETRIES {
            let (mut bargains, revision) = self
                .collections
                .load_versioned::<BargainRequest>(keys::BARGAINS)?;
            let result = apply(&mut bargains)?;

            match self.collections.save_if(keys::BARGAINS, revision, &bargains) {
                Ok(_) => return Ok(result),
                Err(StoreError::RevisionMismatch { expected, actual, .. }) => {
                    debug!(
                        "Bargain write conflict (attempt {}): expected revision {}, found {}",
                        attempt, expected, actual
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(BargainError::Conflict(MAX_CAS_RETRIES))
    }

    fn publish(&self, event: MarketEvent) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_store::{Entry, KeyValueStore, MemoryStore, RecordingEventSink, StoreResult};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn engine_on(store: Arc<dyn KeyValueStore>) -> (BargainEngine, Catalog) {
        let collections = Collections::new(store);
        let catalog = Catalog::new(collections.clone());
        let engine = BargainEngine::new(collections, catalog.clone(), BargainRules::default());
        (engine, catalog)
    }

    fn engine() -> (BargainEngine, Catalog) {
        engine_on(Arc::new(MemoryStore::new()))
    }

    fn buyer() -> Party {
        Party::new("user_42", "Dewi")
    }

    // Product "1" is the seeded MacBook listed at 8,500,000 by seller1.
    const MACBOOK: &str = "1";

    #[test]
    fn test_minimum_offer_rounds_discount_down() {
        assert_eq!(minimum_offer(8_500_000, 20), 6_800_000);
        assert_eq!(minimum_offer(999, 20), 800);
        assert_eq!(minimum_offer(1, 20), 1);
    }

    #[test]
    fn test_minimum_offer_with_out_of_range_percent() {
        assert_eq!(minimum_offer(1000, 150), 0);
        assert_eq!(minimum_offer(1000, 100), 0);
        assert_eq!(minimum_offer(u64::MAX, 20), u64::MAX - u64::MAX / 5);
    }

    #[test]
    fn test_offer_bounds_for_listed_macbook() {
        let (engine, catalog) = engine();
        let product = catalog.find(MACBOOK).unwrap();
        assert_eq!(engine.offer_range(&product), (6_800_000, 8_499_999));

        assert!(matches!(
            engine.create(MACBOOK, &buyer(), 6_000_000, None),
            Err(BargainError::OfferTooLow { minimum: 6_800_000, .. })
        ));
        assert!(matches!(
            engine.create(MACBOOK, &buyer(), 6_799_999, None),
            Err(BargainError::OfferTooLow { .. })
        ));
        assert!(matches!(
            engine.create(MACBOOK, &buyer(), 8_500_000, None),
            Err(BargainError::InvalidOffer { price: 8_500_000, .. })
        ));

        assert!(engine.create(MACBOOK, &buyer(), 6_800_000, None).is_ok());
        assert!(engine.create(MACBOOK, &buyer(), 8_499_999, None).is_ok());

        let bargain = engine.create(MACBOOK, &buyer(), 7_200_000, None).unwrap();
        assert_eq!(bargain.status, BargainStatus::Pending);
        assert_eq!(bargain.message, "I would like to purchase this item for Rp 7200000");
        assert_eq!(engine.sent_by("user_42").unwrap().len(), 3);
    }

    #[test]
    fn test_create_succeeds_exactly_inside_window() {
        let (engine, catalog) = engine();
        for price in [1_000u64, 3_200_000, 6_500_000, 1_234_567] {
            catalog.set_price(MACBOOK, price).unwrap();
            let floor = price - price / 5;
            for offer in [floor - 1, floor, floor + 1, price - 1, price, price + 1] {
                let result = engine.create(MACBOOK, &buyer(), offer, Some("offer"));
                let expected_ok = offer >= floor && offer < price;
                assert_eq!(result.is_ok(), expected_ok, "price {} offer {}", price, offer);
            }
        }
    }

    #[test]
    fn test_only_available_electronics_are_bargainable() {
        let (engine, catalog) = engine();

        // "3" is the jacket
        assert!(matches!(
            engine.create("3", &buyer(), 240_000, None),
            Err(BargainError::NotEligible(Category::Fashion))
        ));

        catalog.mark_sold_out(&["2".to_string()]).unwrap();
        assert!(matches!(
            engine.create("2", &buyer(), 3_000_000, None),
            Err(BargainError::SoldOut(_))
        ));

        assert!(matches!(
            engine.create("nope", &buyer(), 1, None),
            Err(BargainError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_snapshot_is_not_resynced() {
        let (engine, catalog) = engine();
        let bargain = engine.create(MACBOOK, &buyer(), 7_000_000, Some("cash today")).unwrap();

        catalog.set_price(MACBOOK, 9_000_000).unwrap();

        let stored = engine.get(bargain.id).unwrap().unwrap();
        assert_eq!(stored.original_price, 8_500_000);
        assert_eq!(stored.product_name, "MacBook Air M1");
        assert_eq!(stored.seller_name, "Ahmad Budi");
        assert_eq!(stored.message, "cash today");
    }

    #[test]
    fn test_accept_reprices_product() {
        let (engine, catalog) = engine();
        let bargain = engine.create(MACBOOK, &buyer(), 7_000_000, None).unwrap();

        let outcome = engine.respond(bargain.id, "seller1", true).unwrap();

        assert!(outcome.price_applied);
        assert_eq!(outcome.bargain.status, BargainStatus::Accepted);
        assert_eq!(engine.get(bargain.id).unwrap().unwrap().status, BargainStatus::Accepted);
        assert_eq!(catalog.find(MACBOOK).unwrap().price, 7_000_000);
    }

    #[test]
    fn test_reject_leaves_price_alone() {
        let (engine, catalog) = engine();
        let bargain = engine.create(MACBOOK, &buyer(), 7_000_000, None).unwrap();

        let outcome = engine.respond(bargain.id, "seller1", false).unwrap();

        assert_eq!(outcome.bargain.status, BargainStatus::Rejected);
        assert!(!outcome.price_applied);
        assert_eq!(catalog.find(MACBOOK).unwrap().price, 8_500_000);
    }

    #[test]
    fn test_second_response_is_rejected() {
        let (engine, catalog) = engine();
        let first = engine.create(MACBOOK, &buyer(), 7_000_000, None).unwrap();
        let second = engine.create(MACBOOK, &buyer(), 7_500_000, None).unwrap();

        engine.respond(first.id, "seller1", true).unwrap();
        assert!(matches!(
            engine.respond(first.id, "seller1", true),
            Err(BargainError::AlreadyResolved { status: BargainStatus::Accepted })
        ));
        assert_eq!(catalog.find(MACBOOK).unwrap().price, 7_000_000);

        engine.respond(second.id, "seller1", false).unwrap();
        assert!(matches!(
            engine.respond(second.id, "seller1", true),
            Err(BargainError::AlreadyResolved { status: BargainStatus::Rejected })
        ));
        assert_eq!(catalog.find(MACBOOK).unwrap().price, 7_000_000);
    }

    #[test]
    fn test_only_the_seller_responds() {
        let (engine, _) = engine();
        let bargain = engine.create(MACBOOK, &buyer(), 7_000_000, None).unwrap();

        assert!(matches!(
            engine.respond(bargain.id, "user_42", true),
            Err(BargainError::NotSeller(_))
        ));
        assert!(matches!(
            engine.respond(Uuid::new_v4(), "seller1", true),
            Err(BargainError::BargainNotFound(_))
        ));
        assert_eq!(engine.received_by("seller1").unwrap().len(), 1);
        assert!(engine.received_by("seller2").unwrap().is_empty());
    }

    #[test]
    fn test_accept_with_vanished_product_still_transitions() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let (engine, catalog) = engine_on(store.clone());
        let bargain = engine.create(MACBOOK, &buyer(), 7_000_000, None).unwrap();

        let remaining: Vec<Product> = catalog
            .all()
            .unwrap()
            .into_iter()
            .filter(|p| p.id != MACBOOK)
            .collect();
        Collections::new(store).save(keys::PRODUCTS, &remaining).unwrap();

        let outcome = engine.respond(bargain.id, "seller1", true).unwrap();
        assert_eq!(outcome.bargain.status, BargainStatus::Accepted);
        assert!(!outcome.price_applied);
        assert!(catalog.get(MACBOOK).unwrap().is_none());
    }

    #[test]
    fn test_events_are_published() {
        let sink = Arc::new(RecordingEventSink::new());
        let (engine, _) = engine();
        let engine = engine.with_events(sink.clone());

        let bargain = engine.create(MACBOOK, &buyer(), 7_000_000, None).unwrap();
        engine.respond(bargain.id, "seller1", true).unwrap();

        let kinds: Vec<_> = sink.events().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["bargain_created", "bargain_responded"]);
    }

    /// Lets a rival responder reject every pending bargain right before the
    /// next guarded write lands.
    struct RivalResponderStore {
        inner: MemoryStore,
        armed: AtomicBool,
    }

    impl KeyValueStore for RivalResponderStore {
        fn get(&self, key: &str) -> StoreResult<Option<Entry>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: String) -> StoreResult<u64> {
            self.inner.set(key, value)
        }

        fn compare_and_set(&self, key: &str, expected_revision: u64, value: String) -> StoreResult<u64> {
            if key == keys::BARGAINS && self.armed.swap(false, Ordering::SeqCst) {
                let current = self.inner.get(key)?.expect("bargains exist");
                let mut bargains: Vec<BargainRequest> = serde_json::from_str(&current.value)?;
                for bargain in bargains.iter_mut() {
                    bargain.resolve(false).ok();
                }
                self.inner.set(key, serde_json::to_string(&bargains)?)?;
            }
            self.inner.compare_and_set(key, expected_revision, value)
        }
    }

    #[test]
    fn test_racing_response_loses_to_earlier_write() {
        let store = Arc::new(RivalResponderStore {
            inner: MemoryStore::new(),
            armed: AtomicBool::new(false),
        });
        let (engine, catalog) = engine_on(store.clone());
        let bargain = engine.create(MACBOOK, &buyer(), 7_000_000, None).unwrap();

        // Our accept reads `pending`, then the rival's reject lands first.
        store.armed.store(true, Ordering::SeqCst);
        let result = engine.respond(bargain.id, "seller1", true);

        assert!(matches!(
            result,
            Err(BargainError::AlreadyResolved { status: BargainStatus::Rejected })
        ));
        assert_eq!(engine.get(bargain.id).unwrap().unwrap().status, BargainStatus::Rejected);
        assert_eq!(catalog.find(MACBOOK).unwrap().price, 8_500_000);
    }
}
