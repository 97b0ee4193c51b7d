use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::helpers::{deserialize_int_flag, serialize_int_flag_as_bool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Restaurant {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub cuisine: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[serde(deserialize_with = "deserialize_int_flag")]
    #[serde(serialize_with = "serialize_int_flag_as_bool")]
    pub is_verified: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Restaurant {
    pub fn verified(&self) -> bool {
        self.is_verified != 0
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub cuisine: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub cuisine: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}
