//! Authentication handlers

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::guard::Identity;
use super::models::{
    GoogleIdTokenPayload, GoogleProfile, RefreshTokensRequest, SignInRequest, SignUpRequest,
    TokenPair, User,
};
use super::service::AuthService;
use crate::common::{ApiError, AppState};

/// Single client-visible message for every federated sign-in failure
const GOOGLE_SIGN_IN_FAILED: &str = "google sign-in failed";

/// POST /auth/sign-up
/// Registers a password account
pub async fn sign_up(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let auth = AuthService::new(state.db.clone(), state.tokens.clone());

    let user = auth.sign_up(payload).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/sign-in
/// Authenticates an email/password pair and returns a token pair
pub async fn sign_in(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let state = state_lock.read().await.clone();
    let auth = AuthService::new(state.db.clone(), state.tokens.clone());

    let pair = auth.sign_in(&payload.email, &payload.password).await?;

    Ok(Json(pair))
}

/// POST /auth/refresh-tokens
/// Exchanges a valid refresh token for a new token pair
pub async fn refresh_tokens(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<RefreshTokensRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let state = state_lock.read().await.clone();
    let auth = AuthService::new(state.db.clone(), state.tokens.clone());

    let pair = auth.refresh(&payload.refresh_token).await?;

    Ok(Json(pair))
}

/// POST /auth/google-authentication
/// Authenticates a user via a Google OAuth ID token
///
/// The token is verified against Google's tokeninfo endpoint; the resulting
/// profile is reconciled against the user directory (federated id first,
/// then email, then account creation). All failures collapse to a single
/// Unauthorized for the client.
pub async fn google_auth(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<GoogleIdTokenPayload>,
) -> Result<Json<TokenPair>, ApiError> {
    info!("Received Google auth request");
    let state = state_lock.read().await.clone();

    // Verify token with Google's tokeninfo endpoint
    // Docs: https://developers.google.com/identity/sign-in/web/backend-auth
    let tokeninfo_url = format!(
        "https://oauth2.googleapis.com/tokeninfo?id_token={}",
        payload.id_token
    );

    debug!("Initiating Google token validation with tokeninfo endpoint");

    let resp = state.http.get(&tokeninfo_url).send().await;
    let body = match resp {
        Ok(r) => {
            let status = r.status();
            debug!(http_status = %status, "Received response from Google tokeninfo endpoint");

            if status.is_success() {
                match r.json::<serde_json::Value>().await {
                    Ok(json) => json,
                    Err(e) => {
                        error!(error = %e, "Failed to parse Google tokeninfo JSON response");
                        return Err(ApiError::Unauthorized(GOOGLE_SIGN_IN_FAILED.to_string()));
                    }
                }
            } else {
                warn!(http_status = %status, "Google tokeninfo rejected the id_token");
                return Err(ApiError::Unauthorized(GOOGLE_SIGN_IN_FAILED.to_string()));
            }
        }
        Err(e) => {
            error!(
                error = %e,
                endpoint = "https://oauth2.googleapis.com/tokeninfo",
                "HTTP error contacting Google tokeninfo endpoint"
            );
            return Err(ApiError::Unauthorized(GOOGLE_SIGN_IN_FAILED.to_string()));
        }
    };

    // Extract required fields: email, sub
    let email = body
        .get("email")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let sub = body.get("sub").and_then(|v| v.as_str()).map(str::to_string);
    let name = body
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    if email.is_none() || sub.is_none() {
        warn!(
            has_email = email.is_some(),
            has_sub = sub.is_some(),
            "Google token missing required fields (email/sub)"
        );
        return Err(ApiError::Unauthorized(GOOGLE_SIGN_IN_FAILED.to_string()));
    }

    // Check token expiration
    if let Some(exp) = body.get("exp").and_then(|v| v.as_i64()) {
        let current_time = Utc::now().timestamp();
        if exp < current_time {
            warn!(token_exp = exp, current_time = current_time, "Google token has expired");
            return Err(ApiError::Unauthorized(GOOGLE_SIGN_IN_FAILED.to_string()));
        }
    }

    // Validate audience (client id) when configured
    if let Some(client_id) = &state.google_client_id {
        match body.get("aud").and_then(|v| v.as_str()) {
            Some(aud_val) if aud_val == client_id => {
                debug!("Google token audience validation successful");
            }
            Some(aud_val) => {
                warn!(
                    token_audience = %aud_val,
                    expected_client_id = %client_id,
                    "Google token audience validation failed - rejecting token"
                );
                return Err(ApiError::Unauthorized(GOOGLE_SIGN_IN_FAILED.to_string()));
            }
            None => {
                warn!(
                    expected_client_id = %client_id,
                    "Google token missing audience field - rejecting token"
                );
                return Err(ApiError::Unauthorized(GOOGLE_SIGN_IN_FAILED.to_string()));
            }
        }
    }

    let profile = GoogleProfile {
        sub: sub.unwrap(),
        email: email.unwrap(),
        name,
    };

    let auth = AuthService::new(state.db.clone(), state.tokens.clone());
    let pair = auth.federated_sign_in(profile).await?;

    Ok(Json(pair))
}

/// GET /auth/me
/// Returns the current authenticated user's record
pub async fn me(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    identity: Identity,
) -> Result<Json<User>, ApiError> {
    let state = state_lock.read().await.clone();
    let auth = AuthService::new(state.db.clone(), state.tokens.clone());

    let user = auth
        .find_by_id(&identity.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
