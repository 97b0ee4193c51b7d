//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - Token issuance and verification
//! - Password hashing
//! - Route policy lookup
//! - Sign-in, refresh, and federated reconciliation flows

#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::http::Method;
    use guard::{PolicyTable, RoutePolicy};
    use models::{GoogleProfile, Role, SignUpRequest, User};
    use service::AuthService;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use std::sync::Arc;
    use tokens::TokenService;

    use crate::common::ApiError;

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(
            "test_secret_key".to_string(),
            "resto-api".to_string(),
            "resto-api-clients".to_string(),
            3600,
            86400,
        ))
    }

    fn sample_user(role: &str, is_blocked: i64) -> User {
        User {
            id: "U_TEST01".to_string(),
            email: "test@example.com".to_string(),
            name: Some("Test User".to_string()),
            password_hash: None,
            role: role.to_string(),
            is_blocked,
            provider: None,
            provider_id: None,
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
        }
    }

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        crate::common::migrations::run_migrations(&pool)
            .await
            .expect("migrations");
        pool
    }

    async fn auth_service(pool: &SqlitePool) -> AuthService {
        AuthService::new(pool.clone(), token_service())
    }

    fn unauthorized_message(err: ApiError) -> String {
        match err {
            ApiError::Unauthorized(msg) => msg,
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------

    #[test]
    fn test_access_token_roundtrip() {
        let tokens = token_service();
        let user = sample_user("owner", 0);

        let token = tokens.issue_access(&user).expect("issue access token");
        let claims = tokens.verify_access(&token).expect("verify access token");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::Owner);
        assert!(!claims.is_blocked);
        assert_eq!(claims.iss, "resto-api");
        assert_eq!(claims.aud, "resto-api-clients");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verification_fails_with_wrong_secret() {
        let tokens = token_service();
        let other = TokenService::new(
            "a_different_secret".to_string(),
            "resto-api".to_string(),
            "resto-api-clients".to_string(),
            3600,
            86400,
        );

        let token = tokens
            .issue_access(&sample_user("user", 0))
            .expect("issue access token");

        let result = other.verify_access(&token);
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_verification_fails_with_wrong_audience() {
        let tokens = token_service();
        let other = TokenService::new(
            "test_secret_key".to_string(),
            "resto-api".to_string(),
            "some-other-audience".to_string(),
            3600,
            86400,
        );

        let token = tokens
            .issue_access(&sample_user("user", 0))
            .expect("issue access token");

        let result = other.verify_access(&token);
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_access_token_rejected() {
        // Negative TTL puts the expiry far enough in the past to beat leeway
        let tokens = TokenService::new(
            "test_secret_key".to_string(),
            "resto-api".to_string(),
            "resto-api-clients".to_string(),
            -300,
            86400,
        );

        let token = tokens
            .issue_access(&sample_user("user", 0))
            .expect("issue access token");

        let result = tokens.verify_access(&token);
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_blocked_account_token_rejected_with_forbidden() {
        let tokens = token_service();
        let token = tokens
            .issue_access(&sample_user("user", 1))
            .expect("issue access token");

        let result = tokens.verify_access(&token);
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let tokens = token_service();
        let refresh = tokens.issue_refresh("U_TEST01").expect("issue refresh");

        // Refresh claims lack the access-only fields
        assert!(tokens.verify_access(&refresh).is_err());

        let claims = tokens.verify_refresh(&refresh).expect("verify refresh");
        assert_eq!(claims.sub, "U_TEST01");
    }

    // ------------------------------------------------------------------------
    // Password hashing
    // ------------------------------------------------------------------------

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = password::hash_password("correct horse battery").expect("hash");
        assert!(password::verify_password(&hash, "correct horse battery").expect("verify"));
    }

    #[test]
    fn test_wrong_password_does_not_verify() {
        let hash = password::hash_password("correct horse battery").expect("hash");
        assert!(!password::verify_password(&hash, "wrong password").expect("verify"));
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let result = password::verify_password("not-a-phc-string", "anything");
        assert!(result.is_err());
    }

    // ------------------------------------------------------------------------
    // Route policies
    // ------------------------------------------------------------------------

    #[test]
    fn test_policy_literal_paths_win_over_params() {
        let table = PolicyTable::new()
            .route(
                Method::GET,
                "/verification/pending",
                RoutePolicy::roles(&[Role::Admin]),
            )
            .route(
                Method::GET,
                "/verification/:id",
                RoutePolicy::roles(&[Role::Owner, Role::Admin]),
            );

        let pending = table
            .lookup(&Method::GET, "/verification/pending")
            .expect("pending policy");
        assert_eq!(pending.required_roles, &[Role::Admin]);

        let by_id = table
            .lookup(&Method::GET, "/verification/V_ABC123")
            .expect("by-id policy");
        assert_eq!(by_id.required_roles, &[Role::Owner, Role::Admin]);
    }

    #[test]
    fn test_role_membership() {
        use guard::role_permitted;

        let admin_only = RoutePolicy::roles(&[Role::Admin]);
        assert!(role_permitted(&admin_only, Role::Admin));
        assert!(!role_permitted(&admin_only, Role::User));
        assert!(!role_permitted(&admin_only, Role::Owner));

        // No restriction admits any authenticated identity
        let unrestricted = RoutePolicy::authenticated();
        assert!(role_permitted(&unrestricted, Role::User));
        assert!(role_permitted(&unrestricted, Role::Admin));
    }

    #[test]
    fn test_policy_method_and_unknown_paths() {
        let table = PolicyTable::new().route(
            Method::POST,
            "/auth/sign-in",
            RoutePolicy::public(),
        );

        assert!(table.lookup(&Method::POST, "/auth/sign-in").is_some());
        // Same path, different method: no match
        assert!(table.lookup(&Method::GET, "/auth/sign-in").is_none());
        // Unknown path: no match, guard falls back to authenticated
        assert!(table.lookup(&Method::GET, "/nowhere").is_none());
    }

    // ------------------------------------------------------------------------
    // Sign-up / sign-in
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sign_in_failures_share_one_message() {
        let pool = test_pool().await;
        let auth = auth_service(&pool).await;

        auth.sign_up(SignUpRequest {
            email: "owner@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            name: None,
            role: Some("owner".to_string()),
        })
        .await
        .expect("sign up");

        let unknown = auth
            .sign_in("nobody@example.com", "hunter2hunter2")
            .await
            .expect_err("unknown email must fail");
        let mismatch = auth
            .sign_in("owner@example.com", "wrong password")
            .await
            .expect_err("wrong password must fail");

        // Unknown email and wrong password are indistinguishable to the caller
        assert_eq!(
            unauthorized_message(unknown),
            unauthorized_message(mismatch)
        );
    }

    #[tokio::test]
    async fn test_sign_in_without_password_fails_distinctly() {
        let pool = test_pool().await;
        let auth = auth_service(&pool).await;

        // Federation-only account: no password hash
        auth.federated_sign_in(GoogleProfile {
            sub: "google-sub-1".to_string(),
            email: "fed@example.com".to_string(),
            name: Some("Fed User".to_string()),
        })
        .await
        .expect("federated sign-in");

        let result = auth.sign_in("fed@example.com", "whatever-pass").await;
        assert!(matches!(result, Err(ApiError::RequestTimeout(_))));
    }

    #[tokio::test]
    async fn test_sign_in_success_reflects_current_state() {
        let pool = test_pool().await;
        let auth = auth_service(&pool).await;
        let tokens = token_service();

        auth.sign_up(SignUpRequest {
            email: "owner@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            name: Some("Owner".to_string()),
            role: Some("owner".to_string()),
        })
        .await
        .expect("sign up");

        let pair = auth
            .sign_in("owner@example.com", "hunter2hunter2")
            .await
            .expect("sign in");

        let claims = tokens.verify_access(&pair.access_token).expect("claims");
        assert_eq!(claims.email, "owner@example.com");
        assert_eq!(claims.role, Role::Owner);
        assert!(!claims.is_blocked);
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email_rejected() {
        let pool = test_pool().await;
        let auth = auth_service(&pool).await;

        let request = || SignUpRequest {
            email: "dup@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            name: None,
            role: None,
        };

        auth.sign_up(request()).await.expect("first sign up");
        let result = auth.sign_up(request()).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_sign_up_cannot_self_assign_admin() {
        let pool = test_pool().await;
        let auth = auth_service(&pool).await;

        let result = auth
            .sign_up(SignUpRequest {
                email: "sneaky@example.com".to_string(),
                password: "hunter2hunter2".to_string(),
                name: None,
                role: Some("admin".to_string()),
            })
            .await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    // ------------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_refresh_reflects_role_change() {
        let pool = test_pool().await;
        let auth = auth_service(&pool).await;
        let tokens = token_service();

        let user = auth
            .sign_up(SignUpRequest {
                email: "promoted@example.com".to_string(),
                password: "hunter2hunter2".to_string(),
                name: None,
                role: None,
            })
            .await
            .expect("sign up");

        let pair = auth
            .sign_in("promoted@example.com", "hunter2hunter2")
            .await
            .expect("sign in");

        // Role changes after the original login
        sqlx::query("UPDATE users SET role = 'admin' WHERE id = ?")
            .bind(&user.id)
            .execute(&pool)
            .await
            .expect("role update");

        let refreshed = auth.refresh(&pair.refresh_token).await.expect("refresh");
        let claims = tokens
            .verify_access(&refreshed.access_token)
            .expect("claims");
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_refresh_invalid_token_rejected() {
        let pool = test_pool().await;
        let auth = auth_service(&pool).await;

        let result = auth.refresh("not-a-token").await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    // ------------------------------------------------------------------------
    // Federated reconciliation
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_federated_creates_account_once() {
        let pool = test_pool().await;
        let auth = auth_service(&pool).await;

        let profile = GoogleProfile {
            sub: "google-sub-42".to_string(),
            email: "new@example.com".to_string(),
            name: Some("New User".to_string()),
        };

        auth.federated_sign_in(profile.clone())
            .await
            .expect("first federated sign-in");
        // Fast path on the second sign-in: same account, no duplicate
        auth.federated_sign_in(profile)
            .await
            .expect("second federated sign-in");

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(count, 1);

        let user = auth
            .find_by_email("new@example.com")
            .await
            .expect("lookup")
            .expect("user exists");
        assert_eq!(user.provider.as_deref(), Some("google"));
        assert_eq!(user.provider_id.as_deref(), Some("google-sub-42"));
        assert!(user.password_hash.is_none());
    }

    #[tokio::test]
    async fn test_federated_merges_by_email() {
        let pool = test_pool().await;
        let auth = auth_service(&pool).await;

        auth.sign_up(SignUpRequest {
            email: "both@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            name: None,
            role: Some("owner".to_string()),
        })
        .await
        .expect("sign up");

        auth.federated_sign_in(GoogleProfile {
            sub: "google-sub-7".to_string(),
            email: "both@example.com".to_string(),
            name: Some("Merged".to_string()),
        })
        .await
        .expect("federated sign-in");

        let user = auth
            .find_by_email("both@example.com")
            .await
            .expect("lookup")
            .expect("user exists");

        // The federated id is adopted, the password survives the merge
        assert_eq!(user.provider_id.as_deref(), Some("google-sub-7"));
        assert!(user.password_hash.is_some());
        assert_eq!(user.role(), Role::Owner);

        auth.sign_in("both@example.com", "hunter2hunter2")
            .await
            .expect("password sign-in still works");
    }
}
