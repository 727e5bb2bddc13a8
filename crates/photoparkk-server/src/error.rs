// crates/photoparkk-server/src/error.rs
// ============================================================================
// Module: PhotoParkk API Errors
// Description: HTTP error taxonomy for the PhotoParkk API.
// Purpose: Map service errors onto status codes and JSON error bodies.
// Dependencies: axum, photoparkk-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Every handler returns [`ApiError`] on failure. The response body is always
//! `{"error": "<message>"}`. Storage faults are reported with a generic
//! message so internal paths and SQL never reach the client.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use photoparkk_core::AdminError;
use photoparkk_core::CheckoutError;
use photoparkk_core::ImageStoreError;
use photoparkk_core::OrderDeskError;
use photoparkk_core::PaymentError;
use photoparkk_core::StoreError;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// API errors with their HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed validation.
    #[error("{0}")]
    BadRequest(String),
    /// Admin credentials missing or invalid.
    #[error("{0}")]
    Unauthorized(String),
    /// Addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Request conflicts with current state.
    #[error("{0}")]
    Conflict(String),
    /// Payload exceeds a size limit.
    #[error("{0}")]
    PayloadTooLarge(String),
    /// Payment proof was rejected or the payment failed.
    #[error("{0}")]
    PaymentRequired(String),
    /// Payment gateway failed.
    #[error("{0}")]
    BadGateway(String),
    /// Feature is not configured.
    #[error("{0}")]
    Unavailable(String),
    /// Unexpected server-side failure.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Unauthorized(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(message) => Self::NotFound(message),
            StoreError::Invalid(message) => Self::BadRequest(message),
            StoreError::Conflict(message) => Self::Conflict(message),
            StoreError::Io(_)
            | StoreError::Corrupt(_)
            | StoreError::VersionMismatch(_)
            | StoreError::Store(_) => Self::Internal("storage failure".to_string()),
        }
    }
}

impl From<ImageStoreError> for ApiError {
    fn from(err: ImageStoreError) -> Self {
        match err {
            ImageStoreError::Rejected(_) => Self::BadRequest(err.to_string()),
            ImageStoreError::TooLarge {
                ..
            } => Self::PayloadTooLarge(err.to_string()),
            ImageStoreError::SlotBusy(_) => Self::Conflict(err.to_string()),
            ImageStoreError::Io(_) => Self::Internal("image storage failure".to_string()),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Disabled => Self::Unavailable(err.to_string()),
            PaymentError::Rejected(_) => Self::PaymentRequired(err.to_string()),
            PaymentError::Transport(_) | PaymentError::Gateway(_) => {
                Self::BadGateway(err.to_string())
            }
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Invalid(_) | AdminError::Edit(_) => Self::BadRequest(err.to_string()),
            AdminError::DuplicateShapeName(_) => Self::Conflict(err.to_string()),
            AdminError::NotFound(_) => Self::NotFound(err.to_string()),
            AdminError::Upload(inner) => inner.into(),
            AdminError::Store(inner) => inner.into(),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Selection(_)
            | CheckoutError::Delivery(_)
            | CheckoutError::Order(_)
            | CheckoutError::PriceCheck(_)
            | CheckoutError::MethodMismatch {
                ..
            } => Self::BadRequest(err.to_string()),
            CheckoutError::PaymentFailed(_) => Self::PaymentRequired(err.to_string()),
            CheckoutError::Payment(inner) => inner.into(),
            CheckoutError::Store(inner) => inner.into(),
        }
    }
}

impl From<OrderDeskError> for ApiError {
    fn from(err: OrderDeskError) -> Self {
        match err {
            OrderDeskError::NotFound(_) => Self::NotFound(err.to_string()),
            OrderDeskError::Transition(_) => Self::Conflict(err.to_string()),
            OrderDeskError::Store(inner) => inner.into(),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
