use bazaar_shared::models::events::{MarketEvent, ProductListedEvent};
use bazaar_store::{keys, Collections, EventSink};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::product::{NewListing, Product, ProductError};
use crate::seed::demo_products;

/// The full set of listed products across all sellers.
#[derive(Clone)]
pub struct Catalog {
    collections: Collections,
    seed_demo: bool,
    events: Option<Arc<dyn EventSink>>,
}

impl Catalog {
    /// A catalog that falls back to the demo listings while empty.
    pub fn new(collections: Collections) -> Self {
        Self {
            collections,
            seed_demo: true,
            events: None,
        }
    }

    pub fn without_seed(mut self) -> Self {
        self.seed_demo = false;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn all(&self) -> Result<Vec<Product>, ProductError> {
        let products: Vec<Product> = self.collections.load(keys::PRODUCTS)?;
        if products.is_empty() && self.seed_demo {
            let seeded = demo_products();
            self.collections.save(keys::PRODUCTS, &seeded)?;
            info!("Seeded catalog with {} demo products", seeded.len());
            return Ok(seeded);
        }
        Ok(products)
    }

    pub fn get(&self, product_id: &str) -> Result<Option<Product>, ProductError> {
        Ok(self.all()?.into_iter().find(|p| p.id == product_id))
    }

    pub fn find(&self, product_id: &str) -> Result<Product, ProductError> {
        self.get(product_id)?
            .ok_or_else(|| ProductError::NotFound(product_id.to_string()))
    }

    pub fn by_seller(&self, seller_id: &str) -> Result<Vec<Product>, ProductError> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|p| p.seller_id == seller_id)
            .collect())
    }

    /// List a new item for sale on behalf of a seller.
    pub fn list_product(
        &self,
        seller_id: &str,
        seller_name: &str,
        listing: NewListing,
    ) -> Result<Product, ProductError> {
        listing.validate()?;

        let mut products = self.all()?;
        let next_seq = products.iter().map(|p| p.listing_seq).max().unwrap_or(0) + 1;
        let image_url = listing.image_url.filter(|url| !url.trim().is_empty()).unwrap_or_else(|| {
            format!("/placeholder.svg?height=400&width=400&query={}", listing.name.replace(' ', "+"))
        });

        let product = Product {
            id: format!("product_{}", Uuid::new_v4().simple()),
            name: listing.name,
            description: listing.description,
            price: listing.price,
            category: listing.category,
            condition: listing.condition,
            image_url,
            seller_id: seller_id.to_string(),
            seller_name: seller_name.to_string(),
            sold_out: false,
            created_at: Utc::now(),
            listing_seq: next_seq,
        };

        products.push(product.clone());
        self.collections.save(keys::PRODUCTS, &products)?;
        info!("Product {} listed by {} at {}", product.id, seller_id, product.price);

        if let Some(events) = &self.events {
            events.publish(MarketEvent::ProductListed(ProductListedEvent {
                product_id: product.id.clone(),
                seller_id: product.seller_id.clone(),
                price: product.price,
                timestamp: product.created_at.timestamp(),
            }));
        }

        Ok(product)
    }

    /// Overwrite a listed price. Returns `false` when the product is gone.
    pub fn set_price(&self, product_id: &str, price: u64) -> Result<bool, ProductError> {
        let mut products = self.all()?;
        let Some(product) = products.iter_mut().find(|p| p.id == product_id) else {
            return Ok(false);
        };
        product.price = price;
        self.collections.save(keys::PRODUCTS, &products)?;
        Ok(true)
    }

    /// Flag the given products as sold. Returns how many were found.
    pub fn mark_sold_out(&self, product_ids: &[String]) -> Result<usize, ProductError> {
        let mut products = self.all()?;
        let mut marked = 0;
        for product in products.iter_mut().filter(|p| product_ids.contains(&p.id)) {
            product.sold_out = true;
            marked += 1;
        }
        self.collections.save(keys::PRODUCTS, &products)?;
        Ok(marked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Category;
    use bazaar_store::{MemoryStore, RecordingEventSink};

    fn catalog() -> Catalog {
        Catalog::new(Collections::new(Arc::new(MemoryStore::new())))
    }

    fn listing(name: &str) -> NewListing {
        NewListing {
            name: name.to_string(),
            price: 150_000,
            category: Category::Home,
            condition: "Used".to_string(),
            description: "Desk lamp".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn test_empty_catalog_is_seeded() {
        let catalog = catalog();
        let products = catalog.all().unwrap();
        assert_eq!(products.len(), 6);
        assert_eq!(catalog.find("1").unwrap().price, 8_500_000);
        assert_eq!(catalog.find("6").unwrap().listing_seq, 6);
    }

    #[test]
    fn test_unseeded_catalog_stays_empty() {
        let catalog = catalog().without_seed();
        assert!(catalog.all().unwrap().is_empty());
        assert!(matches!(catalog.find("1"), Err(ProductError::NotFound(_))));
    }

    #[test]
    fn test_listing_assigns_next_sequence() {
        let sink = Arc::new(RecordingEventSink::new());
        let catalog = catalog().with_events(sink.clone());

        let lamp = catalog.list_product("u1", "Rina", listing("Desk Lamp")).unwrap();
        let chair = catalog.list_product("u1", "Rina", listing("Chair")).unwrap();

        assert_eq!(lamp.listing_seq, 7);
        assert_eq!(chair.listing_seq, 8);
        assert!(lamp.id.starts_with("product_"));
        assert!(lamp.image_url.contains("Desk+Lamp"));
        assert_eq!(catalog.by_seller("u1").unwrap().len(), 2);
        assert_eq!(sink.events().len(), 2);
    }

    #[test]
    fn test_set_price_and_sold_out() {
        let catalog = catalog();
        assert!(catalog.set_price("2", 3_000_000).unwrap());
        assert!(!catalog.set_price("missing", 1).unwrap());
        assert_eq!(catalog.find("2").unwrap().price, 3_000_000);

        let marked = catalog.mark_sold_out(&["3".to_string(), "missing".to_string()]).unwrap();
        assert_eq!(marked, 1);
        assert!(catalog.find("3").unwrap().sold_out);
    }
}
