use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::auth::{MaybeSession, is_admin};
use crate::server::AppState;
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_user_id;
use crate::types::User;

/// Full listing for admins; everyone else gets an empty list rather than a
/// 403, so the response shape never changes.
pub async fn list_users(
    MaybeSession(session): MaybeSession,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    if !is_admin(state.store.as_ref(), session.as_ref()) {
        return Ok::<_, ApiError>(Json(Vec::<User>::new()));
    }

    let users = state.store.list_users().api_err("Failed to list users")?;

    Ok(Json(users))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    validate_user_id(&id)?;

    let user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    state
        .store
        .delete_user(&user.id)
        .api_err("Failed to delete user")?;

    Ok::<_, ApiError>(Json(json!({ "success": true })))
}
