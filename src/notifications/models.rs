use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::helpers::{deserialize_int_flag, serialize_int_flag_as_bool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub message: String,
    pub restaurant_id: Option<String>,
    #[serde(deserialize_with = "deserialize_int_flag")]
    #[serde(serialize_with = "serialize_int_flag_as_bool")]
    pub is_read: i64,
    pub created_at: Option<String>,
}

/// Event handed to the dispatch worker
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub user_id: String,
    pub kind: String,
    pub message: String,
    pub restaurant_id: Option<String>,
}
