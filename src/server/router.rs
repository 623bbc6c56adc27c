use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::{auth, profile, users};
use crate::auth::SessionKeys;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: SessionKeys,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, sessions: SessionKeys) -> Self {
        Self { store, sessions }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/session", get(auth::session))
        .route("/api/profile", get(profile::get_profile))
        .route("/api/profile", put(profile::update_profile))
        .route("/api/users", get(users::list_users))
        .route("/api/users/{id}", delete(users::delete_user))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
