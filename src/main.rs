// src/main.rs
use axum::{extract::Extension, http::Method, middleware, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod admin;
mod auth;
mod common;
mod logging_middleware;
mod notifications;
mod restaurants;
mod verification;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::guard::{guard_chain, PolicyTable, RoutePolicy};
use auth::models::Role;
use auth::tokens::TokenService;
use common::AppState;
use notifications::NotificationsService;

// ============================================================================
// ROUTE POLICIES
// ============================================================================

/// The per-route policy table consulted by the guard chain.
/// Literal paths are registered before overlapping `:param` patterns.
fn route_policies() -> PolicyTable {
    const OWNER_OR_ADMIN: &[Role] = &[Role::Owner, Role::Admin];
    const ADMIN_ONLY: &[Role] = &[Role::Admin];

    PolicyTable::new()
        // Auth
        .route(Method::POST, "/auth/sign-up", RoutePolicy::public())
        .route(Method::POST, "/auth/sign-in", RoutePolicy::public())
        .route(Method::POST, "/auth/refresh-tokens", RoutePolicy::public())
        .route(
            Method::POST,
            "/auth/google-authentication",
            RoutePolicy::public(),
        )
        .route(Method::GET, "/auth/me", RoutePolicy::authenticated())
        // Restaurants
        .route(Method::GET, "/restaurants", RoutePolicy::public())
        .route(Method::GET, "/restaurants/:id", RoutePolicy::public())
        .route(Method::POST, "/restaurants", RoutePolicy::roles(OWNER_OR_ADMIN))
        .route(
            Method::PATCH,
            "/restaurants/:id",
            RoutePolicy::roles(OWNER_OR_ADMIN),
        )
        .route(
            Method::DELETE,
            "/restaurants/:id",
            RoutePolicy::roles(OWNER_OR_ADMIN),
        )
        // Verification
        .route(
            Method::POST,
            "/verification/request",
            RoutePolicy::roles(OWNER_OR_ADMIN),
        )
        .route(
            Method::GET,
            "/verification/pending",
            RoutePolicy::roles(ADMIN_ONLY),
        )
        .route(
            Method::GET,
            "/verification/all",
            RoutePolicy::roles(ADMIN_ONLY),
        )
        .route(
            Method::GET,
            "/verification/restaurant/:id",
            RoutePolicy::roles(OWNER_OR_ADMIN),
        )
        .route(
            Method::GET,
            "/verification/:id",
            RoutePolicy::roles(OWNER_OR_ADMIN),
        )
        .route(
            Method::PATCH,
            "/verification/:id/approve",
            RoutePolicy::roles(ADMIN_ONLY),
        )
        .route(
            Method::PATCH,
            "/verification/:id/reject",
            RoutePolicy::roles(ADMIN_ONLY),
        )
        // Notifications
        .route(Method::GET, "/notifications", RoutePolicy::authenticated())
        // Admin
        .route(Method::GET, "/admin/users", RoutePolicy::roles(ADMIN_ONLY))
        .route(
            Method::PATCH,
            "/admin/users/:id/block",
            RoutePolicy::roles(ADMIN_ONLY),
        )
        .route(
            Method::PATCH,
            "/admin/users/:id/role",
            RoutePolicy::roles(ADMIN_ONLY),
        )
        .route(
            Method::GET,
            "/admin/dashboard",
            RoutePolicy::roles(ADMIN_ONLY),
        )
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://resto_api.db".to_string());
    let jwt_secret =
        env::var("JWT_SECRET").unwrap_or_else(|_| "replace_with_strong_secret".to_string());
    let jwt_issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "resto-api".to_string());
    let jwt_audience =
        env::var("JWT_AUDIENCE").unwrap_or_else(|_| "resto-api-clients".to_string());
    let access_ttl_secs = env::var("JWT_ACCESS_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(3600);
    let refresh_ttl_secs = env::var("JWT_REFRESH_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(604_800);
    let google_client_id = env::var("GOOGLE_CLIENT_ID").ok();

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder().no_proxy().build()?;

    let tokens = Arc::new(TokenService::new(
        jwt_secret,
        jwt_issuer,
        jwt_audience,
        access_ttl_secs,
        refresh_ttl_secs,
    ));
    info!("TokenService initialized");

    let notifications = NotificationsService::start(pool.clone());
    info!("Notification dispatch worker started");

    let policies = Arc::new(route_policies());
    info!(route_count = policies.len(), "Route policies registered");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        http: http_client,
        tokens,
        policies,
        google_client_id,
        notifications,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .merge(restaurants::restaurants_routes())
        .merge(verification::verification_routes())
        .merge(notifications::notifications_routes())
        .merge(admin::admin_routes())
        // Guard chain runs after the logging middleware, before handlers
        .layer(middleware::from_fn(guard_chain))
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared.clone()))
        .layer({
            let cors_origins = std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PATCH,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
