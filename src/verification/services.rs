use sqlx::SqlitePool;
use tracing::{info, warn};

use super::models::{VerificationRequest, VerificationStatus};
use crate::auth::{owns_or_admin, Identity};
use crate::common::{generate_verification_id, ApiError};
use crate::notifications::{NotificationEvent, NotificationsService};
use crate::restaurants::services::RestaurantsService;

/// The verification state machine.
///
/// A restaurant accumulates at most one pending request at a time; an admin
/// moves it to approved or rejected exactly once. Approval flips the
/// restaurant's public verified flag in the same transaction.
pub struct VerificationService {
    db: SqlitePool,
    notifications: NotificationsService,
}

impl VerificationService {
    pub fn new(db: SqlitePool, notifications: NotificationsService) -> Self {
        Self { db, notifications }
    }

    /// Create a pending request for a restaurant the caller controls
    pub async fn request(
        &self,
        restaurant_id: &str,
        identity: &Identity,
    ) -> Result<VerificationRequest, ApiError> {
        let restaurants = RestaurantsService::new(self.db.clone());
        let restaurant = restaurants.get_by_id(restaurant_id).await?;

        if !owns_or_admin(identity, &restaurant) {
            warn!(
                user_id = %identity.user_id,
                restaurant_id = %restaurant_id,
                "Verification request denied: not the owner"
            );
            return Err(ApiError::Forbidden(
                "only the restaurant owner may request verification".to_string(),
            ));
        }

        if restaurant.verified() {
            return Err(ApiError::BadRequest(
                "restaurant is already verified".to_string(),
            ));
        }

        let pending_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM verification_requests WHERE restaurant_id = ? AND status = ?",
        )
        .bind(restaurant_id)
        .bind(VerificationStatus::Pending.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        if pending_count > 0 {
            return Err(ApiError::BadRequest(
                "a pending verification request already exists for this restaurant".to_string(),
            ));
        }

        let request_id = generate_verification_id();
        sqlx::query(
            "INSERT INTO verification_requests (id, restaurant_id, status) VALUES (?, ?, ?)",
        )
        .bind(&request_id)
        .bind(restaurant_id)
        .bind(VerificationStatus::Pending.as_str())
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!(
            request_id = %request_id,
            restaurant_id = %restaurant_id,
            requester_id = %identity.user_id,
            "Verification requested"
        );

        self.get_by_id(&request_id).await
    }

    /// Approve a pending request and flip the restaurant's verified flag.
    /// Both writes run in one transaction so a crash cannot observe an
    /// approved request with an unverified restaurant.
    pub async fn approve(
        &self,
        request_id: &str,
        admin_id: &str,
    ) -> Result<VerificationRequest, ApiError> {
        let request = self.get_by_id(request_id).await?;

        if !request.is_pending() {
            return Err(ApiError::BadRequest(
                "verification request is not pending".to_string(),
            ));
        }

        let now = chrono::Utc::now().to_rfc3339();

        let mut tx = self.db.begin().await.map_err(ApiError::DatabaseError)?;

        sqlx::query(
            "UPDATE verification_requests SET status = ?, reviewed_by = ?, reviewed_at = ? WHERE id = ?",
        )
        .bind(VerificationStatus::Approved.as_str())
        .bind(admin_id)
        .bind(&now)
        .bind(request_id)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::DatabaseError)?;

        RestaurantsService::set_verified(&mut tx, &request.restaurant_id, &now).await?;

        tx.commit().await.map_err(ApiError::DatabaseError)?;

        info!(
            request_id = %request_id,
            restaurant_id = %request.restaurant_id,
            admin_id = %admin_id,
            "Verification request approved"
        );

        self.notify_owner(
            &request.restaurant_id,
            "verification_approved",
            "Your restaurant has been verified",
        )
        .await;

        self.get_by_id(request_id).await
    }

    /// Reject a pending request with a non-empty reason
    pub async fn reject(
        &self,
        request_id: &str,
        admin_id: &str,
        reason: &str,
    ) -> Result<VerificationRequest, ApiError> {
        let request = self.get_by_id(request_id).await?;

        if !request.is_pending() {
            return Err(ApiError::BadRequest(
                "verification request is not pending".to_string(),
            ));
        }

        if reason.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "rejection reason is required".to_string(),
            ));
        }

        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE verification_requests SET status = ?, reviewed_by = ?, rejection_reason = ?, reviewed_at = ? WHERE id = ?",
        )
        .bind(VerificationStatus::Rejected.as_str())
        .bind(admin_id)
        .bind(reason)
        .bind(&now)
        .bind(request_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!(
            request_id = %request_id,
            restaurant_id = %request.restaurant_id,
            admin_id = %admin_id,
            "Verification request rejected"
        );

        self.notify_owner(
            &request.restaurant_id,
            "verification_rejected",
            &format!("Your verification request was rejected: {}", reason),
        )
        .await;

        self.get_by_id(request_id).await
    }

    /// Get a verification request by ID
    pub async fn get_by_id(&self, request_id: &str) -> Result<VerificationRequest, ApiError> {
        sqlx::query_as::<_, VerificationRequest>(
            "SELECT * FROM verification_requests WHERE id = ?",
        )
        .bind(request_id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Verification request not found".to_string()))
    }

    /// All pending requests, oldest first (review queue order)
    pub async fn find_pending(&self) -> Result<Vec<VerificationRequest>, ApiError> {
        sqlx::query_as::<_, VerificationRequest>(
            "SELECT * FROM verification_requests WHERE status = ? ORDER BY created_at ASC",
        )
        .bind(VerificationStatus::Pending.as_str())
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    /// Every request regardless of status, newest first
    pub async fn find_all(&self) -> Result<Vec<VerificationRequest>, ApiError> {
        sqlx::query_as::<_, VerificationRequest>(
            "SELECT * FROM verification_requests ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    /// History for one restaurant, newest first
    pub async fn find_by_restaurant(
        &self,
        restaurant_id: &str,
    ) -> Result<Vec<VerificationRequest>, ApiError> {
        sqlx::query_as::<_, VerificationRequest>(
            "SELECT * FROM verification_requests WHERE restaurant_id = ? ORDER BY created_at DESC",
        )
        .bind(restaurant_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    /// Pending request count, consumed by the admin dashboard
    pub async fn count_pending(&self) -> Result<i64, ApiError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM verification_requests WHERE status = ?",
        )
        .bind(VerificationStatus::Pending.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    async fn notify_owner(&self, restaurant_id: &str, kind: &str, message: &str) {
        match sqlx::query_scalar::<_, String>("SELECT owner_id FROM restaurants WHERE id = ?")
            .bind(restaurant_id)
            .fetch_optional(&self.db)
            .await
        {
            Ok(Some(owner_id)) => self.notifications.enqueue(NotificationEvent {
                user_id: owner_id,
                kind: kind.to_string(),
                message: message.to_string(),
                restaurant_id: Some(restaurant_id.to_string()),
            }),
            Ok(None) => warn!(
                restaurant_id = %restaurant_id,
                "Restaurant vanished before notification dispatch"
            ),
            Err(e) => warn!(
                error = %e,
                restaurant_id = %restaurant_id,
                "Could not resolve owner for notification"
            ),
        }
    }
}
