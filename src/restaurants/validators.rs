use super::models::CreateRestaurantRequest;
use crate::common::{ValidationResult, Validator};

impl Validator<CreateRestaurantRequest> for CreateRestaurantRequest {
    fn validate(&self, data: &CreateRestaurantRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Restaurant name is required");
        }

        if data.name.len() > 255 {
            result.add_error("name", "Restaurant name must not exceed 255 characters");
        }

        if let Some(website) = &data.website {
            if !website.is_empty()
                && !website.starts_with("http://")
                && !website.starts_with("https://")
            {
                result.add_error(
                    "website",
                    "Website must be a valid URL starting with http:// or https://",
                );
            }
        }

        result
    }
}
