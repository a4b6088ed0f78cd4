use bazaar_catalog::Catalog;
use bazaar_core::IdentityService;
use bazaar_offer::{BargainEngine, Recommender, ViewHistory};
use bazaar_order::{CartService, CheckoutService, NotificationService};
use bazaar_store::app_config::Config;
use bazaar_store::{Collections, EventSink, KeyValueStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub bargains: BargainEngine,
    pub recommender: Arc<Recommender>,
    pub history: ViewHistory,
    pub cart: CartService,
    pub checkout: CheckoutService,
    pub notifications: NotificationService,
    pub identity: IdentityService,
    pub auth: AuthConfig,
}

impl AppState {
    /// Wire every service onto one store.
    pub fn new(config: &Config, store: Arc<dyn KeyValueStore>, events: Arc<dyn EventSink>) -> Self {
        let collections = Collections::new(store);
        let catalog = Catalog::new(collections.clone()).with_events(events.clone());
        let cart = CartService::new(collections.clone(), catalog.clone());
        let notifications = NotificationService::new(collections.clone());

        Self {
            bargains: BargainEngine::new(collections.clone(), catalog.clone(), config.bargain.clone())
                .with_events(events.clone()),
            recommender: Arc::new(Recommender::new(config.recommendation.clone())),
            history: ViewHistory::new(collections.clone(), config.history.capacity),
            checkout: CheckoutService::new(collections.clone(), catalog.clone(), cart.clone(), notifications.clone())
                .with_events(events),
            identity: IdentityService::new(collections),
            auth: AuthConfig {
                secret: config.auth.jwt_secret.clone(),
                expiration: config.auth.jwt_expiration_seconds,
            },
            catalog,
            cart,
            notifications,
        }
    }
}
