use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use bazaar_catalog::{analyze_image, filter_products, Product, SearchFilter};
use serde::Serialize;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct ImageSearchResponse {
    pub keywords: Vec<String>,
    pub products: Vec<Product>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/search/image", post(search_by_image))
}

/// POST /v1/search/image
/// Body is the raw image.
async fn search_by_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImageSearchResponse>, AppError> {
    if body.is_empty() {
        return Err(AppError::ValidationError("Image body is empty".to_string()));
    }

    let keywords = analyze_image(&body);
    let filter = SearchFilter {
        keywords: keywords.clone(),
        ..SearchFilter::default()
    };
    let products = filter_products(state.catalog.all()?, &filter);

    Ok(Json(ImageSearchResponse { keywords, products }))
}
