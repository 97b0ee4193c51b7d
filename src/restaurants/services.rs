use super::models::{CreateRestaurantRequest, Restaurant, UpdateRestaurantRequest};
use crate::common::{generate_restaurant_id, ApiError, Validator};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

pub struct RestaurantsService {
    db: SqlitePool,
}

impl RestaurantsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Get all restaurants
    pub async fn get_all(&self) -> Result<Vec<Restaurant>, ApiError> {
        let restaurants = sqlx::query_as::<_, Restaurant>(
            r#"
            SELECT id, owner_id, name, description, address, cuisine, phone, website,
                   is_verified, created_at, updated_at
            FROM restaurants
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(restaurants)
    }

    /// Get restaurant by ID
    pub async fn get_by_id(&self, restaurant_id: &str) -> Result<Restaurant, ApiError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(
            r#"
            SELECT id, owner_id, name, description, address, cuisine, phone, website,
                   is_verified, created_at, updated_at
            FROM restaurants
            WHERE id = ?
            "#,
        )
        .bind(restaurant_id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Restaurant not found".to_string()))?;

        Ok(restaurant)
    }

    /// Create a new restaurant owned by the given user
    pub async fn create(
        &self,
        owner_id: &str,
        request: CreateRestaurantRequest,
    ) -> Result<Restaurant, ApiError> {
        let validation_result = request.validate(&request);
        if !validation_result.is_valid {
            return Err(ApiError::from(validation_result));
        }

        let restaurant_id = generate_restaurant_id();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO restaurants (
                id, owner_id, name, description, address, cuisine, phone, website,
                is_verified, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&restaurant_id)
        .bind(owner_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.address)
        .bind(&request.cuisine)
        .bind(&request.phone)
        .bind(&request.website)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!("Created restaurant: {} ({})", request.name, restaurant_id);

        self.get_by_id(&restaurant_id).await
    }

    /// Update an existing restaurant
    pub async fn update(
        &self,
        restaurant_id: &str,
        request: UpdateRestaurantRequest,
    ) -> Result<Restaurant, ApiError> {
        // Check if restaurant exists
        self.get_by_id(restaurant_id).await?;

        let now = chrono::Utc::now().to_rfc3339();

        // Build dynamic update query
        let mut updates = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(ApiError::ValidationError(
                    "Restaurant name cannot be empty".to_string(),
                ));
            }
            updates.push("name = ?");
            params.push(name.clone());
        }

        if let Some(description) = &request.description {
            updates.push("description = ?");
            params.push(description.clone());
        }

        if let Some(address) = &request.address {
            updates.push("address = ?");
            params.push(address.clone());
        }

        if let Some(cuisine) = &request.cuisine {
            updates.push("cuisine = ?");
            params.push(cuisine.clone());
        }

        if let Some(phone) = &request.phone {
            updates.push("phone = ?");
            params.push(phone.clone());
        }

        if let Some(website) = &request.website {
            updates.push("website = ?");
            params.push(website.clone());
        }

        if updates.is_empty() {
            return self.get_by_id(restaurant_id).await;
        }

        updates.push("updated_at = ?");
        params.push(now.clone());
        params.push(restaurant_id.to_string());

        let query = format!("UPDATE restaurants SET {} WHERE id = ?", updates.join(", "));

        let mut query_builder = sqlx::query(&query);
        for param in params {
            query_builder = query_builder.bind(param);
        }

        query_builder
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        info!("Updated restaurant: {}", restaurant_id);

        self.get_by_id(restaurant_id).await
    }

    /// Delete a restaurant
    pub async fn delete(&self, restaurant_id: &str) -> Result<(), ApiError> {
        // Check if restaurant exists
        self.get_by_id(restaurant_id).await?;

        let result = sqlx::query("DELETE FROM restaurants WHERE id = ?")
            .bind(restaurant_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Restaurant not found".to_string()));
        }

        info!("Deleted restaurant: {}", restaurant_id);

        Ok(())
    }

    /// Flip the public verified flag inside the caller's transaction.
    /// Only the verification workflow's approve path writes this.
    pub async fn set_verified(
        conn: &mut SqliteConnection,
        restaurant_id: &str,
        now: &str,
    ) -> Result<(), ApiError> {
        sqlx::query("UPDATE restaurants SET is_verified = 1, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(restaurant_id)
            .execute(conn)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(())
    }
}
