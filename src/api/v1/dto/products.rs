/*
 * Responsibility
 * - Products の request/response DTO
 * - create / update 共通の ProductRequest.validate()
 */
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::repos::ProductRecord;
use crate::services::input_guard;

pub const PRICE_MIN: f64 = 0.01;
pub const PRICE_MAX: f64 = 999_999.99;

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

impl ProductRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !input_guard::validate(&self.name, &input_guard::PRODUCT_NAME) {
            return Err(AppError::validation("name", "invalid product name format"));
        }
        if let Some(desc) = &self.description {
            if input_guard::contains_injection_pattern(desc) {
                return Err(AppError::validation("description", "contains invalid characters"));
            }
            // rule は長さ以外 (制御文字など) でも落ちるので理由は一般化
            if !input_guard::validate(desc, &input_guard::PRODUCT_DESCRIPTION) {
                return Err(AppError::validation("description", "invalid description"));
            }
        }
        if !input_guard::validate_number(self.price, PRICE_MIN, PRICE_MAX) {
            return Err(AppError::validation("price", "out of range"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub user_id: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(p: ProductRecord) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            user_id: p.user_id,
        }
    }
}
