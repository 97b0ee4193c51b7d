use super::models::SignUpRequest;
use crate::common::{ValidationResult, Validator};

impl Validator<SignUpRequest> for SignUpRequest {
    fn validate(&self, data: &SignUpRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.email.trim().is_empty() {
            result.add_error("email", "Email is required");
        } else if !data.email.contains('@') {
            result.add_error("email", "Email must be a valid address");
        }

        if data.email.len() > 255 {
            result.add_error("email", "Email must not exceed 255 characters");
        }

        if data.password.len() < 8 {
            result.add_error("password", "Password must be at least 8 characters");
        }

        if let Some(name) = &data.name {
            if name.len() > 255 {
                result.add_error("name", "Name must not exceed 255 characters");
            }
        }

        result
    }
}
