use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use bazaar_order::{CartLine, Notification, Order};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, middleware::UserClaims, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeQuantityRequest {
    pub delta: i64,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLine>,
    pub count: u64,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
    pub unread: usize,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/cart", get(get_cart).delete(clear_cart))
        .route("/v1/cart/items", post(add_to_cart))
        .route("/v1/cart/items/{product_id}", patch(change_quantity).delete(remove_from_cart))
        .route("/v1/checkout", post(checkout))
        .route("/v1/orders", get(list_orders))
        .route("/v1/notifications", get(list_notifications))
        .route("/v1/notifications/{id}/read", post(mark_notification_read))
}

fn cart_response(state: &AppState, user_id: &str) -> Result<CartResponse, AppError> {
    let items = state.cart.lines(user_id)?;
    let count = items.iter().map(|l| u64::from(l.quantity)).sum();
    let total = items.iter().fold(0u64, |acc, l| acc.saturating_add(l.subtotal()));
    Ok(CartResponse { items, count, total })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/cart
async fn get_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<CartResponse>, AppError> {
    Ok(Json(cart_response(&state, &claims.sub)?))
}

/// POST /v1/cart/items
async fn add_to_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>, AppError> {
    state.cart.add(&claims.sub, &req.product_id)?;
    Ok(Json(cart_response(&state, &claims.sub)?))
}

/// PATCH /v1/cart/items/{product_id}
async fn change_quantity(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(product_id): Path<String>,
    Json(req): Json<ChangeQuantityRequest>,
) -> Result<Json<CartResponse>, AppError> {
    state.cart.change_quantity(&claims.sub, &product_id, req.delta)?;
    Ok(Json(cart_response(&state, &claims.sub)?))
}

/// DELETE /v1/cart/items/{product_id}
async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(product_id): Path<String>,
) -> Result<Json<CartResponse>, AppError> {
    state.cart.remove(&claims.sub, &product_id)?;
    Ok(Json(cart_response(&state, &claims.sub)?))
}

/// DELETE /v1/cart
async fn clear_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<StatusCode, AppError> {
    state.cart.clear(&claims.sub)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/checkout
async fn checkout(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state.checkout.checkout(&claims.sub)?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /v1/orders
async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.checkout.orders(&claims.sub)?))
}

/// GET /v1/notifications
async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<NotificationsResponse>, AppError> {
    let notifications = state.notifications.list(&claims.sub)?;
    let unread = notifications.iter().filter(|n| !n.read).count();
    Ok(Json(NotificationsResponse { notifications, unread }))
}

/// POST /v1/notifications/{id}/read
async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.notifications.mark_read(&claims.sub, id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFoundError(format!("Notification not found: {}", id)))
    }
}
