//! Fire-and-forget notification dispatch.
//!
//! Business events enqueue onto a bounded channel and return immediately; a
//! background worker drains the channel into the notifications table. The
//! channel is lossy: a full queue drops the event with a warning, and worker
//! insert failures are logged, never retried, never propagated.

use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::models::NotificationEvent;
use crate::common::generate_notification_id;

const QUEUE_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct NotificationsService {
    tx: mpsc::Sender<NotificationEvent>,
}

impl NotificationsService {
    /// Spawn the dispatch worker and return a cloneable handle
    pub fn start(db: SqlitePool) -> Self {
        let (tx, mut rx) = mpsc::channel::<NotificationEvent>(QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = Self::store(&db, &event).await {
                    error!(
                        error = %e,
                        user_id = %event.user_id,
                        kind = %event.kind,
                        "Failed to store notification"
                    );
                }
            }
            debug!("Notification dispatch worker stopped");
        });

        Self { tx }
    }

    /// Enqueue without awaiting; a full queue drops the event
    pub fn enqueue(&self, event: NotificationEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!(error = %e, "Notification queue full, dropping event");
        }
    }

    async fn store(db: &SqlitePool, event: &NotificationEvent) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, kind, message, restaurant_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(generate_notification_id())
        .bind(&event.user_id)
        .bind(&event.kind)
        .bind(&event.message)
        .bind(event.restaurant_id.as_deref())
        .execute(db)
        .await?;

        Ok(())
    }
}
