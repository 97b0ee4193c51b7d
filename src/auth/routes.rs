//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /auth/sign-up` - Register a password account
/// - `POST /auth/sign-in` - Email/password sign-in
/// - `POST /auth/refresh-tokens` - Exchange a refresh token for a new pair
/// - `POST /auth/google-authentication` - Google OAuth authentication
/// - `GET /auth/me` - Get current user information
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/sign-up", post(handlers::sign_up))
        .route("/auth/sign-in", post(handlers::sign_in))
        .route("/auth/refresh-tokens", post(handlers::refresh_tokens))
        .route("/auth/google-authentication", post(handlers::google_auth))
        .route("/auth/me", get(handlers::me))
}
