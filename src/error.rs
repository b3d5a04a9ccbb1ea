use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Everything a storefront request can fail with. Each variant is recovered at
/// the handler boundary and rendered as a `{"success": false, "message": ...}`
/// JSON body with the matching HTTP status.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} does not belong to this user")]
    Forbidden(&'static str),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Insufficient stock for {0}")]
    InsufficientStock(String),
    #[error("Invalid coupon")]
    CouponInvalid,
    #[error("Unknown order status: {0}")]
    InvalidStatus(String),
    #[error("Could not allocate a unique order number")]
    OrderCreationFailed,
    #[error("Could not allocate a unique slug for {0}")]
    SlugGenerationFailed(String),
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Forbidden(_) => StatusCode::FORBIDDEN,
            StoreError::EmptyCart
            | StoreError::InsufficientStock(_)
            | StoreError::CouponInvalid
            | StoreError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            StoreError::OrderCreationFailed
            | StoreError::SlugGenerationFailed(_)
            | StoreError::Database(_)
            | StoreError::Pool(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_client_statuses() {
        assert_eq!(
            StoreError::NotFound("product").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StoreError::Forbidden("address").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(StoreError::EmptyCart.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            StoreError::CouponInvalid.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StoreError::OrderCreationFailed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
