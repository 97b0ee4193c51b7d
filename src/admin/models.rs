use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct BlockUserRequest {
    pub blocked: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_users: i64,
    pub blocked_users: i64,
    pub total_restaurants: i64,
    pub verified_restaurants: i64,
    pub pending_verifications: i64,
}
