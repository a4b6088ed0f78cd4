use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bazaar_catalog::ProductError;
use bazaar_core::IdentityError;
use bazaar_offer::BargainError;
use bazaar_order::{CartError, CheckoutError};
use bazaar_store::StoreError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            ProductError::Store(e) => e.into(),
            ProductError::MissingField(_) | ProductError::InvalidPrice | ProductError::UnknownCategory(_) => {
                AppError::ValidationError(err.to_string())
            }
        }
    }
}

impl From<BargainError> for AppError {
    fn from(err: BargainError) -> Self {
        match err {
            BargainError::ProductNotFound(_) | BargainError::BargainNotFound(_) => {
                AppError::NotFoundError(err.to_string())
            }
            BargainError::NotEligible(_)
            | BargainError::OfferTooLow { .. }
            | BargainError::InvalidOffer { .. } => AppError::ValidationError(err.to_string()),
            BargainError::NotSeller(_) => AppError::AuthorizationError(err.to_string()),
            BargainError::SoldOut(_) | BargainError::AlreadyResolved { .. } | BargainError::Conflict(_) => {
                AppError::ConflictError(err.to_string())
            }
            BargainError::Catalog(e) => e.into(),
            BargainError::Store(e) => e.into(),
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound(_) | CartError::NotInCart(_) => AppError::NotFoundError(err.to_string()),
            CartError::SoldOut(_) => AppError::ConflictError(err.to_string()),
            CartError::Catalog(e) => e.into(),
            CartError::Store(e) => e.into(),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::EmptyCart => AppError::ValidationError(err.to_string()),
            CheckoutError::SoldOut(_) => AppError::ConflictError(err.to_string()),
            CheckoutError::Cart(e) => e.into(),
            CheckoutError::Catalog(e) => e.into(),
            CheckoutError::Store(e) => e.into(),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::EmailTaken => AppError::ConflictError(err.to_string()),
            IdentityError::InvalidEmail | IdentityError::WeakPassword => AppError::ValidationError(err.to_string()),
            IdentityError::InvalidCredentials => AppError::AuthenticationError(err.to_string()),
            IdentityError::Hashing(msg) => AppError::InternalServerError(msg),
            IdentityError::Store(e) => e.into(),
        }
    }
}
