use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::Error;
use crate::server::AppState;
use crate::types::Session;

/// Extractor that requires a resolvable session
pub struct RequireSession(pub Session);

/// Extractor that resolves a session when one is present. Unauthenticated,
/// expired, and garbled tokens all read as anonymous; it never rejects.
pub struct MaybeSession(pub Option<Session>);

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
    TokenExpired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid session token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Session expired"),
        };

        let body = json!({ "error": message });

        let mut response = (status, Json(body)).into_response();

        response.headers_mut().insert(
            "WWW-Authenticate",
            "Bearer realm=\"teahouse\"".parse().unwrap(),
        );

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw_token = bearer_token(parts)?.ok_or(AuthError::MissingAuth)?;

        let session = state.sessions.resolve(&raw_token).map_err(|e| match e {
            Error::TokenExpired => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        Ok(RequireSession(session))
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = match bearer_token(parts) {
            Ok(Some(raw_token)) => state.sessions.resolve(&raw_token).ok(),
            _ => None,
        };

        Ok(MaybeSession(session))
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<String>, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            Ok(Some(header.strip_prefix("Bearer ").unwrap().to_string()))
        }
        Some(_) => Err(AuthError::InvalidScheme),
        None => Ok(None),
    }
}
