//! # Admin Module
//!
//! Admin-facing operations: user management (the role and blocked flags the
//! guard chain consumes) and the dashboard aggregate.

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::admin_routes;
