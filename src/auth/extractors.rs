use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::service::AuthService;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::UserProfile;

/// Authorization gate. Pulls a bearer token off the request, verifies it and
/// resolves the claim to a live user, or rejects with 401. Handlers taking
/// this extractor only ever run with an identified caller.
pub struct CurrentUser(pub UserProfile);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // The dedicated header carries the raw token and takes precedence;
        // otherwise fall back to the standard Bearer scheme.
        let token = match parts.headers.get("x-auth-token").and_then(|v| v.to_str().ok()) {
            Some(t) => t,
            None => parts
                .headers
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or(ApiError::NoToken)?,
        };

        let service = AuthService::from_ref(state);
        let user = service.resolve_token(token).await?;
        Ok(CurrentUser(UserProfile::from(user)))
    }
}
