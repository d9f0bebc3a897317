/*
 * Responsibility
 * - /auth 系 (register / login) の request/response DTO
 */
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::users::UserResponse;
use crate::error::AppError;
use crate::services::input_guard;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !input_guard::validate(&self.name, &input_guard::USER_NAME) {
            return Err(AppError::validation("name", "invalid name format"));
        }
        if !input_guard::validate_email(&self.email)
            || input_guard::contains_injection_pattern(&self.email)
        {
            return Err(AppError::validation("email", "invalid email format"));
        }
        if self.password.len() < 8 {
            return Err(AppError::validation("password", "must be at least 8 characters"));
        }
        if input_guard::contains_injection_pattern(&self.password) {
            return Err(AppError::validation("password", "contains invalid characters"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !input_guard::validate_email(&self.email)
            || input_guard::contains_injection_pattern(&self.email)
            || input_guard::contains_injection_pattern(&self.password)
        {
            return Err(AppError::validation("credentials", "invalid format"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserResponse,
}
