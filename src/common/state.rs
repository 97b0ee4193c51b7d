// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::guard::PolicyTable;
use crate::auth::tokens::TokenService;
use crate::notifications::NotificationsService;

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub http: Client,
    pub tokens: Arc<TokenService>,
    pub policies: Arc<PolicyTable>,
    pub google_client_id: Option<String>,
    pub notifications: NotificationsService,
}
