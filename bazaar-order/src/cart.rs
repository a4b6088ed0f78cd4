use bazaar_catalog::{Catalog, Product, ProductError};
use bazaar_store::{keys, Collections, StoreError};
use serde::Serialize;
use tracing::debug;

use crate::models::CartItem;

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Product is sold out: {0}")]
    SoldOut(String),

    #[error("Product is not in the cart: {0}")]
    NotInCart(String),

    #[error(transparent)]
    Catalog(#[from] ProductError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A cart line joined with its current product
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> u64 {
        self.product.price.saturating_mul(u64::from(self.quantity))
    }
}

#[derive(Clone)]
pub struct CartService {
    collections: Collections,
    catalog: Catalog,
}

impl CartService {
    pub fn new(collections: Collections, catalog: Catalog) -> Self {
        Self {
            collections,
            catalog,
        }
    }

    pub fn items(&self, user_id: &str) -> Result<Vec<CartItem>, CartError> {
        Ok(self.collections.load(&keys::cart(user_id))?)
    }

    /// Add one of a product, or one more if it is already in the cart.
    pub fn add(&self, user_id: &str, product_id: &str) -> Result<Vec<CartItem>, CartError> {
        let product = self
            .catalog
            .get(product_id)?
            .ok_or_else(|| CartError::ProductNotFound(product_id.to_string()))?;
        if product.sold_out {
            return Err(CartError::SoldOut(product.id));
        }

        let mut cart = self.items(user_id)?;
        match cart.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => cart.push(CartItem {
                product_id: product_id.to_string(),
                quantity: 1,
            }),
        }
        self.save(user_id, &cart)?;
        Ok(cart)
    }

    /// Adjust a line's quantity by `delta`, never going below one.
    pub fn change_quantity(&self, user_id: &str, product_id: &str, delta: i64) -> Result<Vec<CartItem>, CartError> {
        let mut cart = self.items(user_id)?;
        let item = cart
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.to_string()))?;

        let quantity = delta.saturating_add(i64::from(item.quantity)).clamp(1, i64::from(u32::MAX));
        item.quantity = quantity as u32;
        self.save(user_id, &cart)?;
        Ok(cart)
    }

    pub fn remove(&self, user_id: &str, product_id: &str) -> Result<Vec<CartItem>, CartError> {
        let mut cart = self.items(user_id)?;
        cart.retain(|i| i.product_id != product_id);
        self.save(user_id, &cart)?;
        Ok(cart)
    }

    pub fn clear(&self, user_id: &str) -> Result<(), CartError> {
        self.save(user_id, &[])
    }

    /// Cart lines with product details. Lines whose product was removed
    /// from the catalog are skipped.
    pub fn lines(&self, user_id: &str) -> Result<Vec<CartLine>, CartError> {
        let products = self.catalog.all()?;
        let lines = self
            .items(user_id)?
            .into_iter()
            .filter_map(|item| {
                products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .map(|p| CartLine {
                        product: p.clone(),
                        quantity: item.quantity,
                    })
            })
            .collect();
        Ok(lines)
    }

    /// Total units in the cart
    pub fn count(&self, user_id: &str) -> Result<u64, CartError> {
        Ok(self.items(user_id)?.iter().map(|i| u64::from(i.quantity)).sum())
    }

    fn save(&self, user_id: &str, cart: &[CartItem]) -> Result<(), CartError> {
        self.collections.save(&keys::cart(user_id), cart)?;
        debug!("Cart for {} now has {} lines", user_id, cart.len());
        Ok(())
    }
}
