use super::handlers;
use axum::{
    routing::{get, patch, post},
    Router,
};

/// Creates the verification router
///
/// # Routes
/// - `POST /verification/request` - Request verification (ownership-checked)
/// - `GET /verification/pending` - Review queue (admin)
/// - `GET /verification/all` - Full history (admin)
/// - `GET /verification/restaurant/:id` - Per-restaurant history (ownership-checked)
/// - `GET /verification/:id` - Single request
/// - `PATCH /verification/:id/approve` - Approve (admin)
/// - `PATCH /verification/:id/reject` - Reject with reason (admin)
pub fn verification_routes() -> Router {
    Router::new()
        .route("/verification/request", post(handlers::request_verification))
        .route("/verification/pending", get(handlers::get_pending))
        .route("/verification/all", get(handlers::get_all))
        .route(
            "/verification/restaurant/:id",
            get(handlers::get_by_restaurant),
        )
        .route("/verification/:id", get(handlers::get_by_id))
        .route("/verification/:id/approve", patch(handlers::approve))
        .route("/verification/:id/reject", patch(handlers::reject))
}
