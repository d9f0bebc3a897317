/*
 * Responsibility
 * - /auth 系 handler (register / login / logout)
 * - register/login は TokenService で token を mint する唯一の経路
 * - logout は raw credential をそのまま失効させる (parse 失敗でも必ず)
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
};
use tracing::error;

use crate::api::v1::dto::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::services::auth::Role;
use crate::services::{input_guard, password};
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    req.validate()?;

    let name = input_guard::sanitize(&req.name, input_guard::USER_NAME.max_len);
    let email = req.email.trim().to_string();

    let hash = password::hash_password(&req.password).map_err(|e| {
        error!(error = %e, "password hashing failed");
        AppError::Internal
    })?;

    // 自己登録は常に USER。ADMIN は起動時 seed のみ
    let user = state.users.create(&name, &email, &hash, Role::User)?;

    let token = state.tokens.issue(&user.email, user.role).map_err(|e| {
        error!(error = %e, "token issuance failed");
        AppError::Internal
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            token_type: "Bearer",
            expires_in: state.tokens.ttl_seconds(),
            user: user.into(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;

    // 未登録 email と password 不一致は区別せず一様に 401
    let user = state
        .users
        .find_by_email(req.email.trim())?
        .ok_or(AppError::Unauthorized)?;

    if !password::verify_password(&req.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let token = state.tokens.issue(&user.email, user.role).map_err(|e| {
        error!(error = %e, "token issuance failed");
        AppError::Internal
    })?;

    Ok(Json(AuthResponse {
        token,
        token_type: "Bearer",
        expires_in: state.tokens.ttl_seconds(),
        user: user.into(),
    }))
}

/// logout = 提示された credential の失効。ヘッダの存在だけ要求し検証はしない:
/// 期限切れ・壊れたトークンでも raw 値のまま blacklist に入れる。
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    state.revocations.revoke(raw);
    Ok(StatusCode::NO_CONTENT)
}
