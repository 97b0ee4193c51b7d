use super::handlers;
use axum::{routing::get, Router};

/// Creates the notifications router
///
/// # Routes
/// - `GET /notifications` - List the caller's notifications
pub fn notifications_routes() -> Router {
    Router::new().route("/notifications", get(handlers::get_notifications))
}
