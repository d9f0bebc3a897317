/*
 * Responsibility
 * - Users の request/response DTO
 * - validation (形式チェック) は input_guard の rule に寄せる
 * - password 関連の素材を response に絶対に載せない
 */
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::repos::UserRecord;
use crate::services::auth::Role;
use crate::services::input_guard;

/// 管理者による user 作成。自己登録と違い role を指定できる
/// (指定なしは USER)。
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

impl CreateUserRequest {
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
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name
            && !input_guard::validate(name, &input_guard::USER_NAME)
        {
            return Err(AppError::validation("name", "invalid name format"));
        }
        if let Some(email) = &self.email
            && (!input_guard::validate_email(email)
                || input_guard::contains_injection_pattern(email))
        {
            return Err(AppError::validation("email", "invalid email format"));
        }
        if let Some(password) = &self.password {
            if password.len() < 8 {
                return Err(AppError::validation("password", "must be at least 8 characters"));
            }
            if input_guard::contains_injection_pattern(password) {
                return Err(AppError::validation("password", "contains invalid characters"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<UserRecord> for UserResponse {
    fn from(u: UserRecord) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
        }
    }
}
