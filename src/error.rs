use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// Every failure a handler can surface. Raw store or hashing errors are
/// converted into one of these kinds before they cross a component boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Email or username collision. A combined message on purpose, so the
    /// response does not reveal which of the two is taken.
    #[error("Email or username already in use")]
    DuplicateCredential,

    /// Wrong email/password pair. Same message whether the email is unknown
    /// or the password mismatched.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No token, authorization denied")]
    NoToken,

    #[error("Token is not valid")]
    InvalidToken,

    #[error("Not authorized to update this profile")]
    Forbidden,

    #[error("User not found")]
    NotFound,

    #[error("Storage unavailable, try again later")]
    StoreUnavailable,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => ApiError::DuplicateCredential,
            StoreError::Missing => ApiError::NotFound,
            StoreError::Unavailable(reason) => {
                error!(%reason, "user store unavailable");
                ApiError::StoreUnavailable
            }
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateCredential => StatusCode::CONFLICT,
            ApiError::InvalidCredentials
            | ApiError::NoToken
            | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(e) = &self {
            error!(error = %e, "internal error");
            return (status, Json(json!({ "message": "Internal Server Error" }))).into_response();
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_taxonomy_kinds() {
        assert!(matches!(
            ApiError::from(StoreError::Duplicate),
            ApiError::DuplicateCredential
        ));
        assert!(matches!(
            ApiError::from(StoreError::Unavailable("down".into())),
            ApiError::StoreUnavailable
        ));
        assert!(matches!(ApiError::from(StoreError::Missing), ApiError::NotFound));
    }

    #[test]
    fn auth_failures_share_a_status() {
        assert_eq!(ApiError::NoToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_response_does_not_leak_the_cause() {
        let response =
            ApiError::Internal(anyhow::anyhow!("pool exhausted at 10.0.0.3")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
