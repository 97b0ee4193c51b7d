//! Request-time policy enforcement.
//!
//! Every route's requirements are declared up front in a [`PolicyTable`]
//! built at startup. A single middleware walks the chain per request:
//! authentication (bearer token verification, blocked-account rejection),
//! then role membership. The resolved identity travels to handlers as an
//! immutable [`RequestContext`] in the request extensions, read back through
//! the [`Identity`] extractor. Ownership checks run at the handler boundary,
//! where the target restaurant is known.

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::models::{AccessClaims, Role};
use crate::common::{ApiError, AppState};
use crate::restaurants::models::Restaurant;

/// Declarative per-route policy descriptor
#[derive(Debug, Clone, Copy)]
pub struct RoutePolicy {
    pub auth_required: bool,
    pub required_roles: &'static [Role],
}

impl RoutePolicy {
    pub const fn public() -> Self {
        Self {
            auth_required: false,
            required_roles: &[],
        }
    }

    pub const fn authenticated() -> Self {
        Self {
            auth_required: true,
            required_roles: &[],
        }
    }

    pub const fn roles(required: &'static [Role]) -> Self {
        Self {
            auth_required: true,
            required_roles: required,
        }
    }
}

struct PolicyEntry {
    method: Method,
    pattern: Vec<String>,
    policy: RoutePolicy,
}

/// Ordered route policy table consulted by the guard middleware.
///
/// First matching entry wins; literal paths must be registered before
/// overlapping `:param` patterns. Requests that match no entry are treated
/// as authenticated-no-role.
pub struct PolicyTable {
    entries: Vec<PolicyEntry>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn route(mut self, method: Method, pattern: &str, policy: RoutePolicy) -> Self {
        self.entries.push(PolicyEntry {
            method,
            pattern: pattern
                .trim_matches('/')
                .split('/')
                .map(str::to_string)
                .collect(),
            policy,
        });
        self
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Option<RoutePolicy> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        self.entries
            .iter()
            .find(|entry| entry.method == *method && Self::matches(&entry.pattern, &segments))
            .map(|entry| entry.policy)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matches(pattern: &[String], segments: &[&str]) -> bool {
        pattern.len() == segments.len()
            && pattern
                .iter()
                .zip(segments)
                .all(|(p, s)| p.starts_with(':') || p == s)
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity resolved from a verified access token
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub is_blocked: bool,
}

impl From<AccessClaims> for Identity {
    fn from(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            is_blocked: claims.is_blocked,
        }
    }
}

/// Immutable per-request context inserted by the guard chain
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub identity: Option<Identity>,
}

/// Role membership test for a policy. An empty requirement set admits any
/// authenticated identity.
pub fn role_permitted(policy: &RoutePolicy, role: Role) -> bool {
    policy.required_roles.is_empty() || policy.required_roles.contains(&role)
}

/// Authentication and role checks, in that order. Any failed check
/// short-circuits; later checks and the handler never run.
pub async fn guard_chain(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();

    let policy = state
        .policies
        .lookup(req.method(), req.uri().path())
        .unwrap_or_else(RoutePolicy::authenticated);

    if !policy.auth_required {
        req.extensions_mut().insert(RequestContext { identity: None });
        return Ok(next.run(req).await);
    }

    // Authentication
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    let token = match token {
        Some(t) => t,
        None => {
            warn!(path = %req.uri().path(), "Authentication failed: missing Authorization header");
            return Err(ApiError::Unauthorized("missing auth".to_string()));
        }
    };

    // Handle "Bearer <token>" format or raw token
    let bare_token = token.strip_prefix("Bearer ").unwrap_or(&token).to_string();

    let claims = state.tokens.verify_access(&bare_token)?;
    let identity = Identity::from(claims);

    // Role
    if !role_permitted(&policy, identity.role) {
        warn!(
            user_id = %identity.user_id,
            role = %identity.role,
            path = %req.uri().path(),
            "Role check failed"
        );
        return Err(ApiError::Forbidden("insufficient role".to_string()));
    }

    debug!(user_id = %identity.user_id, role = %identity.role, "Request authenticated");

    req.extensions_mut().insert(RequestContext {
        identity: Some(identity),
    });
    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<RequestContext>()
            .ok_or_else(|| ApiError::Unauthorized("missing request context".to_string()))?;

        context
            .identity
            .clone()
            .ok_or_else(|| ApiError::Unauthorized("authentication required".to_string()))
    }
}

/// Ownership check for restaurant-scoped routes. Admins always pass; the
/// result is a plain boolean so the boundary decides the response status.
pub fn owns_or_admin(identity: &Identity, restaurant: &Restaurant) -> bool {
    identity.role == Role::Admin || restaurant.owner_id == identity.user_id
}
