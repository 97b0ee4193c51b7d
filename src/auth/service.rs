//! Sign-up, sign-in, token refresh, and federated-identity reconciliation.

use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::models::{GoogleProfile, Role, SignUpRequest, TokenPair, User};
use super::password;
use super::tokens::TokenService;
use crate::common::{generate_user_id, safe_email_log, ApiError, Validator};

/// Identical message for unknown email and wrong password, so callers cannot
/// probe which accounts exist.
const BAD_CREDENTIALS: &str = "incorrect email or password";

pub struct AuthService {
    db: SqlitePool,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(db: SqlitePool, tokens: Arc<TokenService>) -> Self {
        Self { db, tokens }
    }

    /// Register a password account. The admin role is never self-assignable.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<User, ApiError> {
        let validation_result = request.validate(&request);
        if !validation_result.is_valid {
            return Err(ApiError::from(validation_result));
        }

        let role = match request.role.as_deref() {
            None => Role::User,
            Some(value) => match Role::parse(value) {
                Some(Role::Admin) | None => {
                    return Err(ApiError::ValidationError(
                        "role must be 'user' or 'owner'".to_string(),
                    ))
                }
                Some(role) => role,
            },
        };

        if self.find_by_email(&request.email).await?.is_some() {
            return Err(ApiError::BadRequest("email already registered".to_string()));
        }

        let password_hash = password::hash_password(&request.password).map_err(|e| {
            error!(error = %e, "Password hashing failed during sign-up");
            ApiError::InternalServer("could not process password".to_string())
        })?;

        let id = generate_user_id();
        sqlx::query("INSERT INTO users (id, email, name, password_hash, role) VALUES (?, ?, ?, ?, ?)")
            .bind(&id)
            .bind(&request.email)
            .bind(request.name.as_deref())
            .bind(&password_hash)
            .bind(role.as_str())
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        info!(
            user_id = %id,
            email = %safe_email_log(&request.email),
            role = %role,
            "User account created"
        );

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("user not found after insert".to_string()))
    }

    /// Validate an email/password pair and issue a token pair.
    ///
    /// Unknown email and wrong password fail with the identical generic
    /// message. An account with no stored hash cannot be compared at all,
    /// which is reported as a timeout-class error rather than Unauthorized.
    pub async fn sign_in(&self, email: &str, supplied_password: &str) -> Result<TokenPair, ApiError> {
        let user = match self.find_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!(email = %safe_email_log(email), "Sign-in failed: unknown email");
                return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
            }
        };

        let stored_hash = match &user.password_hash {
            Some(hash) => hash.clone(),
            None => {
                warn!(user_id = %user.id, "Sign-in failed: account has no password");
                return Err(ApiError::RequestTimeout(
                    "credentials cannot be compared".to_string(),
                ));
            }
        };

        match password::verify_password(&stored_hash, supplied_password) {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = %user.id, "Sign-in failed: password mismatch");
                return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
            }
            Err(e) => {
                error!(error = %e, user_id = %user.id, "Password comparison failed");
                return Err(ApiError::RequestTimeout(
                    "credentials cannot be compared".to_string(),
                ));
            }
        }

        info!(
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            "User authenticated via password"
        );

        self.tokens.issue_pair(&user)
    }

    /// Exchange a valid refresh token for a brand-new pair.
    ///
    /// The user row is re-read so role and blocked changes since the
    /// original login are honored in the new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let claims = self.tokens.verify_refresh(refresh_token)?;

        let user = self.find_by_id(&claims.sub).await?.ok_or_else(|| {
            warn!(user_id = %claims.sub, "Refresh failed: user not found");
            ApiError::Unauthorized("invalid token".to_string())
        })?;

        debug!(user_id = %user.id, "Refresh token exchanged");
        self.tokens.issue_pair(&user)
    }

    /// Reconcile a verified federated identity against the user directory
    /// and issue tokens.
    ///
    /// Fail-closed: every internal failure surfaces to the caller as a
    /// single Unauthorized; the cause lives only in the logs.
    pub async fn federated_sign_in(&self, profile: GoogleProfile) -> Result<TokenPair, ApiError> {
        let user = self.reconcile_federated(profile).await.map_err(|e| {
            error!(error = %e, "Federated sign-in failed");
            ApiError::Unauthorized("google sign-in failed".to_string())
        })?;

        self.tokens.issue_pair(&user)
    }

    async fn reconcile_federated(&self, profile: GoogleProfile) -> Result<User, ApiError> {
        // Fast path: known federated id, no writes
        if let Some(user) =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE provider = ? AND provider_id = ?")
                .bind("google")
                .bind(&profile.sub)
                .fetch_optional(&self.db)
                .await
                .map_err(ApiError::DatabaseError)?
        {
            debug!(user_id = %user.id, "Found existing federated user");
            return Ok(user);
        }

        // Known email: adopt the federated id and provider name
        if let Some(user) = self.find_by_email(&profile.email).await? {
            sqlx::query(
                "UPDATE users SET provider = ?, provider_id = ?, name = COALESCE(name, ?) WHERE id = ?",
            )
            .bind("google")
            .bind(&profile.sub)
            .bind(profile.name.as_deref())
            .bind(&user.id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

            info!(user_id = %user.id, "Adopted federated identity for existing account");

            return self
                .find_by_id(&user.id)
                .await?
                .ok_or_else(|| ApiError::InternalServer("user vanished during merge".to_string()));
        }

        // Neither matched: create a password-less account
        let id = generate_user_id();
        sqlx::query(
            "INSERT INTO users (id, email, name, role, provider, provider_id) VALUES (?, ?, ?, 'user', 'google', ?)",
        )
        .bind(&id)
        .bind(&profile.email)
        .bind(profile.name.as_deref())
        .bind(&profile.sub)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!(
            user_id = %id,
            email = %safe_email_log(&profile.email),
            "Created new user via federated sign-in"
        );

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("user not found after insert".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }
}
