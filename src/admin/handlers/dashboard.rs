// src/admin/handlers/dashboard.rs

use axum::{extract::Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::admin::models::DashboardMetrics;
use crate::auth::Identity;
use crate::common::{ApiError, AppState};
use crate::verification::services::VerificationService;

/// GET /admin/dashboard - Aggregate platform counts
pub async fn get_dashboard_metrics(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
) -> Result<Json<DashboardMetrics>, ApiError> {
    let state = state_lock.read().await.clone();

    info!(admin_user_id = %identity.user_id, "Fetching dashboard metrics");

    let total_users = count(&state, "SELECT COUNT(*) FROM users").await?;
    let blocked_users = count(&state, "SELECT COUNT(*) FROM users WHERE is_blocked = 1").await?;
    let total_restaurants = count(&state, "SELECT COUNT(*) FROM restaurants").await?;
    let verified_restaurants = count(
        &state,
        "SELECT COUNT(*) FROM restaurants WHERE is_verified = 1",
    )
    .await?;

    let verification_service =
        VerificationService::new(state.db.clone(), state.notifications.clone());
    let pending_verifications = verification_service.count_pending().await?;

    Ok(Json(DashboardMetrics {
        total_users,
        blocked_users,
        total_restaurants,
        verified_restaurants,
        pending_verifications,
    }))
}

async fn count(state: &AppState, query: &str) -> Result<i64, ApiError> {
    sqlx::query_scalar::<_, i64>(query)
        .fetch_one(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, query = %query, "Database error fetching dashboard count");
            ApiError::DatabaseError(e)
        })
}
