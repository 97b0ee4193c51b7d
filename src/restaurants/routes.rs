use super::handlers;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};

/// Creates the restaurants router
///
/// # Routes
/// - `GET /restaurants` - List restaurants (public)
/// - `GET /restaurants/:id` - Get restaurant (public)
/// - `POST /restaurants` - Create restaurant (owner or admin)
/// - `PATCH /restaurants/:id` - Update restaurant (ownership-checked)
/// - `DELETE /restaurants/:id` - Delete restaurant (ownership-checked)
pub fn restaurants_routes() -> Router {
    Router::new()
        .route(
            "/restaurants",
            get(handlers::get_restaurants).post(handlers::create_restaurant),
        )
        .route(
            "/restaurants/:id",
            get(handlers::get_restaurant_by_id)
                .patch(handlers::update_restaurant)
                .delete(handlers::delete_restaurant),
        )
}
