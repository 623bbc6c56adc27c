use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{AuthRequest, CredentialHasher, MaybeSession, authenticate};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SessionResponse,
};
use crate::server::response::ApiError;
use crate::server::validation::{validate_email, validate_password};
use crate::types::{Session, User};

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let hasher = CredentialHasher::new();
    let password_hash = hasher
        .hash(&req.password)
        .map_err(|_| ApiError::internal("Failed to hash password"))?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: req.email.trim().to_string(),
        password_hash: Some(password_hash),
        name: None,
        admin: false,
        permissions: false,
        created_at: now,
        updated_at: now,
    };

    match state.store.create_user(&user) {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(RegisterResponse { success: true }),
        )),
        Err(Error::AlreadyExists) => Err(ApiError::conflict("Email already registered")),
        Err(_) => Err(ApiError::internal("Failed to create user")),
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let hasher = CredentialHasher::new();
    let request = AuthRequest::Password {
        email: req.email.trim().to_string(),
        password: req.password,
    };

    // NotFound and InvalidCredentials collapse to one rejection so the
    // login endpoint cannot be used to enumerate accounts.
    let user = match authenticate(state.store.as_ref(), &hasher, request) {
        Ok(user) => user,
        Err(Error::NotFound | Error::InvalidCredentials) => {
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
        Err(_) => return Err(ApiError::internal("Failed to authenticate")),
    };

    let session = Session {
        email: user.email,
        name: user.name,
    };
    let issued = state
        .sessions
        .issue(&session)
        .map_err(|_| ApiError::internal("Failed to issue session"))?;

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: session,
    }))
}

pub async fn session(MaybeSession(session): MaybeSession) -> Json<SessionResponse> {
    match session {
        Some(session) => Json(SessionResponse {
            authenticated: true,
            email: Some(session.email),
            name: session.name,
        }),
        None => Json(SessionResponse {
            authenticated: false,
            email: None,
            name: None,
        }),
    }
}
