use super::models::{CreateRestaurantRequest, MessageResponse, UpdateRestaurantRequest};
use super::services::RestaurantsService;
use crate::auth::{owns_or_admin, Identity};
use crate::common::{ApiError, AppState};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// GET /restaurants - List all restaurants
pub async fn get_restaurants(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let restaurants_service = RestaurantsService::new(state.db.clone());

    let restaurants = restaurants_service.get_all().await?;

    Ok(Json(restaurants))
}

/// GET /restaurants/:id - Get restaurant by ID
pub async fn get_restaurant_by_id(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(restaurant_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let restaurants_service = RestaurantsService::new(state.db.clone());

    let restaurant = restaurants_service.get_by_id(&restaurant_id).await?;

    Ok(Json(restaurant))
}

/// POST /restaurants - Create a restaurant owned by the caller
pub async fn create_restaurant(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
    Json(request): Json<CreateRestaurantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let restaurants_service = RestaurantsService::new(state.db.clone());

    let restaurant = restaurants_service
        .create(&identity.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(restaurant)))
}

/// PATCH /restaurants/:id - Update restaurant (owner-scoped)
pub async fn update_restaurant(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
    Path(restaurant_id): Path<String>,
    Json(request): Json<UpdateRestaurantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let restaurants_service = RestaurantsService::new(state.db.clone());

    let restaurant = restaurants_service.get_by_id(&restaurant_id).await?;
    if !owns_or_admin(&identity, &restaurant) {
        warn!(
            user_id = %identity.user_id,
            restaurant_id = %restaurant_id,
            "Restaurant update denied: not the owner"
        );
        return Err(ApiError::Forbidden(
            "you do not own this restaurant".to_string(),
        ));
    }

    let restaurant = restaurants_service.update(&restaurant_id, request).await?;

    Ok(Json(restaurant))
}

/// DELETE /restaurants/:id - Delete restaurant (owner-scoped)
pub async fn delete_restaurant(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
    Path(restaurant_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let restaurants_service = RestaurantsService::new(state.db.clone());

    let restaurant = restaurants_service.get_by_id(&restaurant_id).await?;
    if !owns_or_admin(&identity, &restaurant) {
        warn!(
            user_id = %identity.user_id,
            restaurant_id = %restaurant_id,
            "Restaurant delete denied: not the owner"
        );
        return Err(ApiError::Forbidden(
            "you do not own this restaurant".to_string(),
        ));
    }

    restaurants_service.delete(&restaurant_id).await?;

    Ok(Json(MessageResponse {
        message: "Restaurant deleted successfully".to_string(),
    }))
}
