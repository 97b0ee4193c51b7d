//! Tests for restaurants module
//!
//! These tests verify restaurant CRUD, request validation, and the
//! ownership check used by owner-scoped routes.

#[cfg(test)]
mod tests {
    use super::super::*;
    use models::{CreateRestaurantRequest, Restaurant, UpdateRestaurantRequest};
    use services::RestaurantsService;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    use crate::auth::guard::Identity;
    use crate::auth::{owns_or_admin, Role};
    use crate::common::{ApiError, Validator};

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

    fn identity(user_id: &str, role: Role) -> Identity {
        Identity {
            user_id: user_id.to_string(),
            email: format!("{}@example.com", user_id.to_lowercase()),
            role,
            is_blocked: false,
        }
    }

    fn create_request(name: &str) -> CreateRestaurantRequest {
        CreateRestaurantRequest {
            name: name.to_string(),
            description: Some("Neighborhood trattoria".to_string()),
            address: Some("12 Via Roma".to_string()),
            cuisine: Some("Italian".to_string()),
            phone: None,
            website: Some("https://example.com".to_string()),
        }
    }

    #[test]
    fn test_restaurant_model_structure() {
        let restaurant = Restaurant {
            id: "R_TEST01".to_string(),
            owner_id: "U_OWNER1".to_string(),
            name: "Trattoria Test".to_string(),
            description: None,
            address: None,
            cuisine: Some("Italian".to_string()),
            phone: None,
            website: None,
            is_verified: 0,
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
            updated_at: Some("2024-01-01T00:00:00Z".to_string()),
        };

        assert_eq!(restaurant.name, "Trattoria Test");
        assert!(!restaurant.verified());
    }

    #[test]
    fn test_create_validation_success() {
        let request = create_request("Valid Restaurant");
        let result = request.validate(&request);
        assert!(result.is_valid, "Valid restaurant should pass validation");
    }

    #[test]
    fn test_create_validation_empty_name() {
        let request = create_request("");
        let result = request.validate(&request);
        assert!(!result.is_valid, "Empty name should fail validation");
        assert!(result.errors.iter().any(|e| e.field == "name"));
    }

    #[test]
    fn test_create_validation_name_too_long() {
        let request = create_request(&"a".repeat(256));
        let result = request.validate(&request);
        assert!(!result.is_valid, "Name over 255 chars should fail validation");
        assert!(result.errors.iter().any(|e| e.field == "name"));
    }

    #[test]
    fn test_create_validation_invalid_website() {
        let mut request = create_request("Test Restaurant");
        request.website = Some("not-a-url".to_string());
        let result = request.validate(&request);
        assert!(!result.is_valid, "Invalid website URL should fail validation");
        assert!(result.errors.iter().any(|e| e.field == "website"));
    }

    #[test]
    fn test_ownership_check() {
        let restaurant = Restaurant {
            id: "R_TEST01".to_string(),
            owner_id: "U_OWNER1".to_string(),
            name: "Trattoria Test".to_string(),
            description: None,
            address: None,
            cuisine: None,
            phone: None,
            website: None,
            is_verified: 0,
            created_at: None,
            updated_at: None,
        };

        assert!(owns_or_admin(&identity("U_OWNER1", Role::Owner), &restaurant));
        assert!(owns_or_admin(&identity("U_ADMIN1", Role::Admin), &restaurant));
        assert!(!owns_or_admin(&identity("U_OWNER2", Role::Owner), &restaurant));
        assert!(!owns_or_admin(&identity("U_USER1", Role::User), &restaurant));
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = test_pool().await;
        let service = RestaurantsService::new(pool.clone());

        let created = service
            .create("U_OWNER1", create_request("Trattoria Test"))
            .await
            .expect("create");

        assert!(created.id.starts_with("R_"));
        assert_eq!(created.owner_id, "U_OWNER1");
        assert!(!created.verified());

        let fetched = service.get_by_id(&created.id).await.expect("get");
        assert_eq!(fetched.name, "Trattoria Test");
    }

    #[tokio::test]
    async fn test_get_unknown_not_found() {
        let pool = test_pool().await;
        let service = RestaurantsService::new(pool.clone());

        let result = service.get_by_id("R_MISSING").await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_fields() {
        let pool = test_pool().await;
        let service = RestaurantsService::new(pool.clone());

        let created = service
            .create("U_OWNER1", create_request("Old Name"))
            .await
            .expect("create");

        let updated = service
            .update(
                &created.id,
                UpdateRestaurantRequest {
                    name: Some("New Name".to_string()),
                    description: None,
                    address: None,
                    cuisine: Some("French".to_string()),
                    phone: None,
                    website: None,
                },
            )
            .await
            .expect("update");

        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.cuisine.as_deref(), Some("French"));
        // Untouched fields survive
        assert_eq!(updated.address.as_deref(), Some("12 Via Roma"));
    }

    #[tokio::test]
    async fn test_update_empty_name_rejected() {
        let pool = test_pool().await;
        let service = RestaurantsService::new(pool.clone());

        let created = service
            .create("U_OWNER1", create_request("Trattoria Test"))
            .await
            .expect("create");

        let result = service
            .update(
                &created.id,
                UpdateRestaurantRequest {
                    name: Some("   ".to_string()),
                    description: None,
                    address: None,
                    cuisine: None,
                    phone: None,
                    website: None,
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = test_pool().await;
        let service = RestaurantsService::new(pool.clone());

        let created = service
            .create("U_OWNER1", create_request("Trattoria Test"))
            .await
            .expect("create");

        service.delete(&created.id).await.expect("delete");

        let result = service.get_by_id(&created.id).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
