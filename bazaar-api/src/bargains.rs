use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use bazaar_offer::{BargainRequest, Party, RespondOutcome};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, middleware::UserClaims, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBargainRequest {
    pub product_id: String,
    pub offered_price: u64,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RespondBargainRequest {
    pub accept: bool,
}

#[derive(Debug, Serialize)]
pub struct BargainResponse {
    #[serde(flatten)]
    pub bargain: BargainRequest,
    pub discount_percent: f64,
}

impl From<BargainRequest> for BargainResponse {
    fn from(bargain: BargainRequest) -> Self {
        Self {
            discount_percent: bargain.discount_percent(),
            bargain,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RespondResponse {
    pub bargain: BargainResponse,
    pub price_applied: bool,
}

impl From<RespondOutcome> for RespondResponse {
    fn from(outcome: RespondOutcome) -> Self {
        Self {
            bargain: outcome.bargain.into(),
            price_applied: outcome.price_applied,
        }
    }
}

fn to_responses(bargains: Vec<BargainRequest>) -> Vec<BargainResponse> {
    bargains.into_iter().map(BargainResponse::from).collect()
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bargains", post(create_bargain))
        .route("/v1/bargains/{id}/respond", post(respond_bargain))
        .route("/v1/bargains/sent", get(sent_bargains))
        .route("/v1/bargains/received", get(received_bargains))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bargains
async fn create_bargain(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Json(req): Json<CreateBargainRequest>,
) -> Result<(StatusCode, Json<BargainResponse>), AppError> {
    let buyer = Party::new(claims.sub, claims.name);
    let message = req.message.as_deref().map(str::trim).filter(|m| !m.is_empty());
    let bargain = state
        .bargains
        .create(&req.product_id, &buyer, req.offered_price, message)?;
    Ok((StatusCode::CREATED, Json(bargain.into())))
}

/// POST /v1/bargains/{id}/respond
/// Seller accepts or rejects a pending offer.
async fn respond_bargain(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<Uuid>,
    Json(req): Json<RespondBargainRequest>,
) -> Result<Json<RespondResponse>, AppError> {
    Ok(Json(state.bargains.respond(id, &claims.sub, req.accept)?.into()))
}

/// GET /v1/bargains/sent
async fn sent_bargains(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<Vec<BargainResponse>>, AppError> {
    Ok(Json(to_responses(state.bargains.sent_by(&claims.sub)?)))
}

/// GET /v1/bargains/received
async fn received_bargains(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<Vec<BargainResponse>>, AppError> {
    Ok(Json(to_responses(state.bargains.received_by(&claims.sub)?)))
}
