//! # Verification Module
//!
//! The admin-reviewed workflow gating a restaurant's public verified status:
//! - Owners request verification (one pending request at a time)
//! - Admins approve or reject exactly once; both outcomes are terminal
//! - Approval flips the restaurant's verified flag in the same transaction

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;


pub use routes::verification_routes;
