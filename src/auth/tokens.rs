//! Signed, time-boxed access and refresh tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use super::models::{AccessClaims, RefreshClaims, TokenPair, User};
use crate::common::ApiError;

/// Issues and verifies JWT pairs.
///
/// Verification is pure: signature, expiry, issuer, and audience are checked
/// against the configured values, nothing is looked up elsewhere. Access
/// tokens embed email/role/blocked; refresh tokens carry only the subject id
/// and use their own, longer TTL.
pub struct TokenService {
    secret: String,
    issuer: String,
    audience: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(
        secret: String,
        issuer: String,
        audience: String,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Self {
        Self {
            secret,
            issuer,
            audience,
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Issue an access+refresh pair snapshotting the user's current state
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, ApiError> {
        Ok(TokenPair {
            access_token: self.issue_access(user)?,
            refresh_token: self.issue_refresh(&user.id)?,
        })
    }

    pub fn issue_access(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role(),
            is_blocked: user.blocked(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_ttl_secs)).timestamp(),
        };
        self.encode_claims(&claims)
    }

    pub fn issue_refresh(&self, user_id: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.refresh_ttl_secs)).timestamp(),
        };
        self.encode_claims(&claims)
    }

    /// Verify an access token.
    ///
    /// A token whose claims mark the account blocked fails with Forbidden,
    /// distinct from the Unauthorized of a missing, malformed, or expired
    /// token.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, ApiError> {
        let claims: AccessClaims = self.decode_claims(token)?;
        if claims.is_blocked {
            warn!(user_id = %claims.sub, "Rejected access token for blocked account");
            return Err(ApiError::Forbidden("account is blocked".to_string()));
        }
        Ok(claims)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, ApiError> {
        self.decode_claims(token)
    }

    fn encode_claims<T: serde::Serialize>(&self, claims: &T) -> Result<String, ApiError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            error!(error = %e, "JWT encoding error");
            ApiError::InternalServer("jwt error".to_string())
        })
    }

    fn decode_claims<T: DeserializeOwned>(&self, token: &str) -> Result<T, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<T>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            warn!(error = %e, "JWT token validation failed");
            ApiError::Unauthorized("invalid token".to_string())
        })
    }
}
