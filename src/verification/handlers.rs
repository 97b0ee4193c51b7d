use super::models::{RejectVerificationPayload, RequestVerificationPayload};
use super::services::VerificationService;
use crate::auth::{owns_or_admin, Identity};
use crate::common::{ApiError, AppState};
use crate::restaurants::services::RestaurantsService;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// POST /verification/request - Ask for verification of an owned restaurant
pub async fn request_verification(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
    Json(payload): Json<RequestVerificationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let verification_service =
        VerificationService::new(state.db.clone(), state.notifications.clone());

    let request = verification_service
        .request(&payload.restaurant_id, &identity)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /verification/pending - Review queue (admin only)
pub async fn get_pending(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let verification_service =
        VerificationService::new(state.db.clone(), state.notifications.clone());

    let requests = verification_service.find_pending().await?;

    Ok(Json(requests))
}

/// GET /verification/all - Full request history (admin only)
pub async fn get_all(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let verification_service =
        VerificationService::new(state.db.clone(), state.notifications.clone());

    let requests = verification_service.find_all().await?;

    Ok(Json(requests))
}

/// GET /verification/restaurant/:id - Requests for one restaurant (ownership-checked)
pub async fn get_by_restaurant(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
    Path(restaurant_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let restaurants_service = RestaurantsService::new(state.db.clone());

    // Unknown restaurant surfaces before the ownership comparison
    let restaurant = restaurants_service.get_by_id(&restaurant_id).await?;
    if !owns_or_admin(&identity, &restaurant) {
        warn!(
            user_id = %identity.user_id,
            restaurant_id = %restaurant_id,
            "Verification history access denied: not the owner"
        );
        return Err(ApiError::Forbidden(
            "you do not own this restaurant".to_string(),
        ));
    }

    let verification_service =
        VerificationService::new(state.db.clone(), state.notifications.clone());
    let requests = verification_service
        .find_by_restaurant(&restaurant_id)
        .await?;

    Ok(Json(requests))
}

/// GET /verification/:id - Get a single verification request
pub async fn get_by_id(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(request_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let verification_service =
        VerificationService::new(state.db.clone(), state.notifications.clone());

    let request = verification_service.get_by_id(&request_id).await?;

    Ok(Json(request))
}

/// PATCH /verification/:id/approve - Approve a pending request (admin only)
pub async fn approve(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
    Path(request_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let verification_service =
        VerificationService::new(state.db.clone(), state.notifications.clone());

    let request = verification_service
        .approve(&request_id, &identity.user_id)
        .await?;

    Ok(Json(request))
}

/// PATCH /verification/:id/reject - Reject a pending request (admin only)
pub async fn reject(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
    Path(request_id): Path<String>,
    Json(payload): Json<RejectVerificationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let verification_service =
        VerificationService::new(state.db.clone(), state.notifications.clone());

    let request = verification_service
        .reject(&request_id, &identity.user_id, &payload.rejection_reason)
        .await?;

    Ok(Json(request))
}
