use axum::{
    extract::{Path, State},
    routing::patch,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{UpdateProfileRequest, UserProfile};
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users/:id", patch(update_profile))
}

/// Profile update, owner only. Username changes re-hit the unique index and
/// surface as a duplicate-credential conflict.
#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    if id != current.id {
        return Err(ApiError::Forbidden);
    }

    let mut user = state
        .store
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(username) = payload.username {
        let username = username.trim().to_string();
        if username.len() < 3 {
            return Err(ApiError::Validation(
                "Username must be at least 3 characters".into(),
            ));
        }
        user.username = username;
    }
    if let Some(first_name) = payload.first_name {
        user.first_name = first_name.trim().to_string();
    }
    if let Some(last_name) = payload.last_name {
        user.last_name = last_name.trim().to_string();
    }
    if let Some(bio) = payload.bio {
        user.bio = bio;
    }
    if let Some(profile_picture) = payload.profile_picture {
        user.profile_picture = profile_picture;
    }

    let user = state.store.update(user).await?;
    info!(user_id = %user.id, "profile updated");
    Ok(Json(UserProfile::from(user)))
}
