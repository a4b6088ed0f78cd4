use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use bazaar_core::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, middleware::auth::UserClaims, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub nim: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user: User,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/signup", post(sign_up))
        .route("/v1/auth/signin", post(sign_in))
}

async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    if req.name.trim().is_empty() || req.nim.trim().is_empty() {
        return Err(AppError::ValidationError("Name and NIM are required".to_string()));
    }
    let user = state.identity.sign_up(&req.name, &req.nim, &req.email, &req.password)?;
    let token = issue_token(&state, &user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user: user.public() })))
}

async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state.identity.sign_in(&req.email, &req.password)?;
    let token = issue_token(&state, &user)?;
    Ok(Json(AuthResponse { token, user: user.public() }))
}

fn issue_token(state: &AppState, user: &User) -> Result<String, AppError> {
    let claims = UserClaims {
        sub: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(state.auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}
