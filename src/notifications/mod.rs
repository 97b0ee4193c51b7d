//! # Notifications Module
//!
//! Fire-and-forget notification dispatch for business events and a read
//! surface for the resulting rows.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;

#[cfg(test)]
mod tests;

pub use models::NotificationEvent;
pub use routes::notifications_routes;
pub use service::NotificationsService;
