use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use bazaar_catalog::{filter_products, Category, NewListing, Product, SearchFilter};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, middleware::UserClaims, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    /// Category name, or "all"
    pub category: Option<String>,
    pub q: Option<String>,
    /// Comma-separated image keywords
    pub keywords: Option<String>,
}

impl ProductQuery {
    fn into_filter(self) -> Result<SearchFilter, AppError> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(c) if c.eq_ignore_ascii_case("all") => None,
            Some(c) => Some(c.parse::<Category>()?),
        };
        let keywords = self
            .keywords
            .map(|k| {
                k.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(SearchFilter {
            category,
            query: self.q,
            keywords,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct OfferRange {
    pub min: u64,
    pub max: u64,
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub bargain_eligible: bool,
    /// Present when a buyer may currently make an offer
    pub offer_range: Option<OfferRange>,
}

/// Seller overview for the signed-in user
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_listings: usize,
    pub active_listings: usize,
    pub sold_items: usize,
    /// Purchases the user has made
    pub orders: usize,
    pub listings: Vec<Product>,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", get(list_products))
        .route("/v1/products/{id}", get(get_product))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/listings", post(create_listing).get(my_listings))
        .route("/v1/products/{id}/view", post(record_view))
        .route("/v1/history", get(view_history))
        .route("/v1/dashboard", get(dashboard))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/products
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let filter = query.into_filter()?;
    let products = state.catalog.all()?;
    Ok(Json(filter_products(products, &filter)))
}

/// GET /v1/products/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>, AppError> {
    let product = state.catalog.find(&id)?;
    let bargain_eligible = state.bargains.is_eligible(product.category);
    let offer_range = (bargain_eligible && product.is_available()).then(|| {
        let (min, max) = state.bargains.offer_range(&product);
        OfferRange { min, max }
    });

    Ok(Json(ProductDetail {
        product,
        bargain_eligible,
        offer_range,
    }))
}

/// POST /v1/listings
async fn create_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Json(listing): Json<NewListing>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state.catalog.list_product(&claims.sub, &claims.name, listing)?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /v1/listings
async fn my_listings(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.catalog.by_seller(&claims.sub)?))
}

/// POST /v1/products/{id}/view
/// Returns the caller's updated view history.
async fn record_view(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    state.catalog.find(&id)?;
    Ok(Json(state.history.record(&claims.sub, &id)?))
}

/// GET /v1/history
async fn view_history(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.history.get(&claims.sub)?))
}

/// GET /v1/dashboard
async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<DashboardResponse>, AppError> {
    let listings = state.catalog.by_seller(&claims.sub)?;
    let sold_items = listings.iter().filter(|p| p.sold_out).count();
    let orders = state.checkout.orders(&claims.sub)?.len();

    Ok(Json(DashboardResponse {
        total_listings: listings.len(),
        active_listings: listings.len() - sold_items,
        sold_items,
        orders,
        listings,
    }))
}
