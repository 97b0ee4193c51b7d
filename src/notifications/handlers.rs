use super::models::Notification;
use crate::auth::Identity;
use crate::common::{ApiError, AppState};
use axum::{extract::Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;

/// GET /notifications - List the caller's notifications, newest first
pub async fn get_notifications(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let state = state_lock.read().await.clone();

    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(&identity.user_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(notifications))
}
