/*
 * Responsibility
 * - アプリ共通の ApiError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - token error / policy error / repo error を統一的に変換
 *
 * Notes
 * - 認証失敗の内部原因 (malformed / signature / expired / revoked) は
 *   ここで必ず均一な 401 に潰す。診断は tracing 側にのみ残す。
 * - Validation は field 名のみ返す。拒否した生の値は載せない。
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::policy::PolicyError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("conflict: {message}")]
    Conflict { message: &'static str },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn validation(field: &'static str, reason: &'static str) -> Self {
        Self::Validation { field, reason }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Validation { field, reason } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                format!("{field}: {reason}"),
            ),
            // Uniform body: the internal cause (malformed / bad signature /
            // expired / revoked) must not be distinguishable by the client.
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "unauthorized".into(),
            ),
            // Likewise: never explain which branch of the policy denied
            // (e.g. do not reveal who the owner is).
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", "forbidden".into()),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
            ),
            AppError::Conflict { message } => (StatusCode::CONFLICT, "CONFLICT", message.into()),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::DuplicateEmail => AppError::Conflict {
                message: "email already registered",
            },
            RepoError::Poisoned => AppError::Internal,
        }
    }
}

impl From<PolicyError> for AppError {
    fn from(e: PolicyError) -> Self {
        match e {
            PolicyError::Unauthenticated => AppError::Unauthorized,
            PolicyError::Forbidden => AppError::Forbidden,
        }
    }
}
