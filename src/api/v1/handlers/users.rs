/*
 * Responsibility
 * - /users 系 CRUD handler (管理系)
 * - list/delete は ADMIN のみ。get/update は admin-or-self
 *   (user レコードの owner はその user 自身として OwnerOrRole で評価)
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::error;

use crate::api::v1::dto::users::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::api::v1::extractors::AuthCtxExtractor;
use crate::error::AppError;
use crate::services::auth::Role;
use crate::services::auth::policy::{self, Requirement};
use crate::services::{input_guard, password};
use crate::state::AppState;

fn checked_id(id: &str) -> Result<(), AppError> {
    if input_guard::validate_identifier(id) {
        Ok(())
    } else {
        Err(AppError::validation("id", "invalid identifier format"))
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    policy::authorize(&Requirement::RoleRequired(Role::Admin), Some(&ctx), None)?;

    let rows = state.users.list()?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

pub async fn create_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    policy::authorize(&Requirement::RoleRequired(Role::Admin), Some(&ctx), None)?;
    req.validate()?;

    let name = input_guard::sanitize(&req.name, input_guard::USER_NAME.max_len);
    let email = req.email.trim();

    let hash = password::hash_password(&req.password).map_err(|e| {
        error!(error = %e, "password hashing failed");
        AppError::Internal
    })?;

    let role = req.role.unwrap_or(Role::User);
    let row = state.users.create(&name, email, &hash, role)?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn get_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    checked_id(&user_id)?;

    // 404 より先に認可。存在しない id は owner 不在として評価し、
    // admin 以外には存在有無を 403/404 で区別させない
    let user = state.users.get(&user_id)?;
    policy::authorize(
        &Requirement::OwnerOrRole(Role::Admin),
        Some(&ctx),
        user.as_ref().map(|u| u.email.as_str()),
    )?;

    let user = user.ok_or_else(|| AppError::not_found("user"))?;
    Ok(Json(user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    checked_id(&user_id)?;

    let user = state.users.get(&user_id)?;
    policy::authorize(
        &Requirement::OwnerOrRole(Role::Admin),
        Some(&ctx),
        user.as_ref().map(|u| u.email.as_str()),
    )?;
    user.ok_or_else(|| AppError::not_found("user"))?;

    req.validate()?;

    let name = req
        .name
        .as_deref()
        .map(|n| input_guard::sanitize(n, input_guard::USER_NAME.max_len));
    let email = req.email.as_deref().map(str::trim).map(str::to_string);
    let password_hash = match req.password.as_deref() {
        Some(raw) => Some(password::hash_password(raw).map_err(|e| {
            error!(error = %e, "password hashing failed");
            AppError::Internal
        })?),
        None => None,
    };

    let row = state
        .users
        .update(
            &user_id,
            name.as_deref(),
            email.as_deref(),
            password_hash.as_deref(),
        )?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(Json(row.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    policy::authorize(&Requirement::RoleRequired(Role::Admin), Some(&ctx), None)?;
    checked_id(&user_id)?;

    if state.users.delete(&user_id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("user"))
    }
}
