use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Verification request lifecycle states.
/// Pending is the only non-terminal state; approved and rejected are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verification request database model
///
/// `reviewed_by` and `reviewed_at` stay null until an admin decides;
/// `rejection_reason` is set iff the request was rejected.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VerificationRequest {
    pub id: String,
    pub restaurant_id: String,
    pub reviewed_by: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: Option<String>,
    pub reviewed_at: Option<String>,
}

impl VerificationRequest {
    pub fn is_pending(&self) -> bool {
        self.status == VerificationStatus::Pending.as_str()
    }
}

#[derive(Debug, Deserialize)]
pub struct RequestVerificationPayload {
    pub restaurant_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RejectVerificationPayload {
    pub rejection_reason: String,
}
