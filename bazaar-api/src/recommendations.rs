use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use bazaar_catalog::Product;
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;

use crate::{error::AppError, middleware::UserClaims, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    /// Product currently on screen
    pub exclude: Option<String>,
    pub limit: Option<usize>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/recommendations", get(recommendations))
}

/// GET /v1/recommendations
/// Ranks the catalog against the caller's view history.
async fn recommendations(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let history = state.history.get(&claims.sub)?;
    let catalog = state.catalog.all()?;
    let limit = query.limit.unwrap_or_else(|| state.recommender.default_limit());

    let mut rng = StdRng::from_entropy();
    let picks = state
        .recommender
        .recommend(&catalog, query.exclude.as_deref(), &history, limit, &mut rng);

    tracing::debug!("Recommended {} products for {}", picks.len(), claims.sub);
    Ok(Json(picks))
}
