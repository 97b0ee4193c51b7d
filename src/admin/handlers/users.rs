// src/admin/handlers/users.rs

use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::admin::models::{BlockUserRequest, UpdateUserRoleRequest};
use crate::auth::{Identity, Role, User};
use crate::common::{ApiError, AppState};

/// GET /admin/users - List all user accounts
pub async fn get_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
) -> Result<Json<Vec<User>>, ApiError> {
    let state = state_lock.read().await.clone();

    info!(admin_user_id = %identity.user_id, "Fetching users list");

    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching users list");
            ApiError::DatabaseError(e)
        })?;

    Ok(Json(users))
}

/// PATCH /admin/users/:id/block - Set or clear the blocked flag
///
/// The flag is embedded in access tokens at issuance, so a block takes
/// effect at the target's next token refresh or sign-in.
pub async fn block_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
    Path(user_id): Path<String>,
    Json(request): Json<BlockUserRequest>,
) -> Result<Json<User>, ApiError> {
    let state = state_lock.read().await.clone();

    if user_id == identity.user_id {
        warn!(admin_user_id = %identity.user_id, "Admin attempted to block own account");
        return Err(ApiError::BadRequest(
            "you cannot block your own account".to_string(),
        ));
    }

    let result = sqlx::query("UPDATE users SET is_blocked = ? WHERE id = ?")
        .bind(if request.blocked { 1 } else { 0 })
        .bind(&user_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(
        admin_user_id = %identity.user_id,
        target_user_id = %user_id,
        blocked = request.blocked,
        "User block flag updated"
    );

    fetch_user(&state, &user_id).await
}

/// PATCH /admin/users/:id/role - Change a user's role
pub async fn set_user_role(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRoleRequest>,
) -> Result<Json<User>, ApiError> {
    let state = state_lock.read().await.clone();

    let role = Role::parse(&request.role).ok_or_else(|| {
        ApiError::ValidationError("role must be 'user', 'owner', or 'admin'".to_string())
    })?;

    let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
        .bind(role.as_str())
        .bind(&user_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(
        admin_user_id = %identity.user_id,
        target_user_id = %user_id,
        role = %role,
        "User role updated"
    );

    fetch_user(&state, &user_id).await
}

async fn fetch_user(state: &AppState, user_id: &str) -> Result<Json<User>, ApiError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
