use super::handlers;
use axum::{
    routing::{get, patch},
    Router,
};

/// Creates the admin router (all routes are admin-role gated by policy)
///
/// # Routes
/// - `GET /admin/users` - List user accounts
/// - `PATCH /admin/users/:id/block` - Set or clear the blocked flag
/// - `PATCH /admin/users/:id/role` - Change a user's role
/// - `GET /admin/dashboard` - Aggregate platform counts
pub fn admin_routes() -> Router {
    Router::new()
        .route("/admin/users", get(handlers::users::get_users))
        .route(
            "/admin/users/:id/block",
            patch(handlers::users::block_user),
        )
        .route(
            "/admin/users/:id/role",
            patch(handlers::users::set_user_role),
        )
        .route(
            "/admin/dashboard",
            get(handlers::dashboard::get_dashboard_metrics),
        )
}
