//! Tests for notifications module

#[cfg(test)]
mod tests {
    use super::super::*;
    use models::NotificationEvent;
    use service::NotificationsService;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        crate::common::migrations::run_migrations(&pool)
            .await
            .expect("migrations");
        pool
    }

    fn event(user_id: &str, kind: &str) -> NotificationEvent {
        NotificationEvent {
            user_id: user_id.to_string(),
            kind: kind.to_string(),
            message: "Your restaurant has been verified".to_string(),
            restaurant_id: Some("R_ONE".to_string()),
        }
    }

    async fn count_for_user(pool: &SqlitePool, user_id: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .expect("count")
    }

    #[tokio::test]
    async fn test_enqueue_stores_notification() {
        let pool = test_pool().await;
        let service = NotificationsService::start(pool.clone());

        // enqueue returns immediately; the worker persists in the background
        service.enqueue(event("U_OWNER1", "verification_approved"));

        let mut stored = 0;
        for _ in 0..50 {
            stored = count_for_user(&pool, "U_OWNER1").await;
            if stored > 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(stored, 1);

        let row = sqlx::query_as::<_, models::Notification>(
            "SELECT * FROM notifications WHERE user_id = ?",
        )
        .bind("U_OWNER1")
        .fetch_one(&pool)
        .await
        .expect("row");
        assert_eq!(row.kind, "verification_approved");
        assert_eq!(row.restaurant_id.as_deref(), Some("R_ONE"));
        assert_eq!(row.is_read, 0);
    }

    #[tokio::test]
    async fn test_enqueue_never_blocks_the_caller() {
        let pool = test_pool().await;
        let service = NotificationsService::start(pool.clone());

        // A burst larger than any single request would produce; every call
        // returns synchronously whether or not the worker has caught up
        for i in 0..20 {
            service.enqueue(event("U_OWNER1", &format!("kind_{}", i)));
        }

        let mut stored = 0;
        for _ in 0..100 {
            stored = count_for_user(&pool, "U_OWNER1").await;
            if stored >= 20 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(stored, 20);
    }
}
