use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest};
use super::extractors::CurrentUser;
use super::service::AuthService;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::UserProfile;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let service = AuthService::from_ref(&state);
    let (user, token) = service.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let service = AuthService::from_ref(&state);
    let (user, token) = service.login(payload).await?;
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

/// The gate has already resolved the caller; just echo the profile back.
#[instrument(skip_all)]
pub async fn me(CurrentUser(profile): CurrentUser) -> Json<UserProfile> {
    Json(profile)
}
