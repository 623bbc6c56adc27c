use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::{MaybeSession, RequireSession};
use crate::error::Error;
use crate::profile::{ProfileTarget, load_profile, merge_profile};
use crate::server::AppState;
use crate::server::dto::UpdateProfileResponse;
use crate::server::response::ApiError;
use crate::types::ProfilePatch;

pub async fn get_profile(
    RequireSession(session): RequireSession,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let merged = match load_profile(state.store.as_ref(), &session.email) {
        Ok(merged) => merged,
        // A valid token for an account deleted since login
        Err(Error::NotFound) => return Err(ApiError::not_found("User not found")),
        Err(_) => return Err(ApiError::internal("Failed to load profile")),
    };

    Ok(Json(merged))
}

pub async fn update_profile(
    MaybeSession(session): MaybeSession,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<ProfilePatch>,
) -> impl IntoResponse {
    let target = match (&patch.id, session) {
        (Some(id), _) => ProfileTarget::Id(id.clone()),
        (None, Some(session)) => ProfileTarget::Email(session.email),
        (None, None) => return Err(ApiError::unauthorized("Authentication required")),
    };

    let merged = match merge_profile(state.store.as_ref(), &target, &patch) {
        Ok(merged) => merged,
        Err(Error::NotFound) => return Err(ApiError::not_found("User not found")),
        Err(_) => return Err(ApiError::internal("Failed to update profile")),
    };

    Ok(Json(UpdateProfileResponse {
        success: true,
        user: merged,
    }))
}
