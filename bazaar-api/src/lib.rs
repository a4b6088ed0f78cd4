use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod bargains;
pub mod error;
pub mod middleware;
pub mod orders;
pub mod products;
pub mod recommendations;
pub mod search;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Everything below needs a signed-in user.
    let protected = Router::new()
        .merge(products::protected_routes())
        .merge(bargains::routes())
        .merge(recommendations::routes())
        .merge(orders::routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::user_auth_middleware,
        ));

    Router::new()
        .merge(auth::routes())
        .merge(products::routes())
        .merge(search::routes())
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
