/*
 * Responsibility
 * - /products 系 CRUD handler
 * - 各 handler は本体処理の前に policy::authorize (pre-check) を通す
 * - 読み取りは取得後に post-check があり、deny なら結果を破棄して 403
 * - id / 検索語 / 保存フィールドは必ず input_guard を通してから使う
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::api::v1::dto::products::{ProductRequest, ProductResponse};
use crate::api::v1::extractors::{AuthCtxExtractor, OptionalAuthCtx};
use crate::error::AppError;
use crate::repos::ProductRecord;
use crate::services::auth::Role;
use crate::services::auth::policy::{self, Requirement};
use crate::services::input_guard;
use crate::state::AppState;

/// Owner 解決 (GetOwner 相当): product の user_id から所有者の subject を引く。
/// 失敗は None (policy 側で fail-closed に deny される)。
fn owner_subject(state: &AppState, product: &ProductRecord) -> Result<Option<String>, AppError> {
    Ok(state.users.get(&product.user_id)?.map(|u| u.email))
}

fn checked_id(id: &str) -> Result<(), AppError> {
    if input_guard::validate_identifier(id) {
        Ok(())
    } else {
        Err(AppError::validation("id", "invalid identifier format"))
    }
}

pub async fn list_products(
    State(state): State<AppState>,
    OptionalAuthCtx(ctx): OptionalAuthCtx,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    policy::authorize(&Requirement::Public, ctx.as_ref(), None)?;

    let rows = state.products.list()?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

pub async fn search_products(
    State(state): State<AppState>,
    OptionalAuthCtx(ctx): OptionalAuthCtx,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    policy::authorize(&Requirement::Public, ctx.as_ref(), None)?;

    let raw = params.q.unwrap_or_default();
    if input_guard::contains_injection_pattern(&raw) {
        // 値そのものはログにも載せない
        return Err(AppError::validation("q", "contains invalid characters"));
    }
    let query = input_guard::sanitize(&raw, input_guard::SEARCH_QUERY_MAX_LEN);

    let rows = state.products.search(&query)?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

pub async fn get_product(
    State(state): State<AppState>,
    OptionalAuthCtx(ctx): OptionalAuthCtx,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    policy::authorize(&Requirement::Public, ctx.as_ref(), None)?;
    checked_id(&id)?;

    let product = state
        .products
        .get(&id)?
        .ok_or_else(|| AppError::not_found("product"))?;

    // post-check: handler は既に実行済みだが、admin / owner / 低価格帯
    // 以外には結果を返さない
    let owner = owner_subject(&state, &product)?;
    policy::authorize_product_read(ctx.as_ref(), owner.as_deref(), product.price)?;

    Ok(Json(product.into()))
}

pub async fn create_product(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    policy::authorize(&Requirement::AuthenticatedAny, Some(&ctx), None)?;
    req.validate()?;

    // subject → user レコード。認証後にアカウントが消えていたら 401
    let user = state
        .users
        .find_by_email(&ctx.subject)?
        .ok_or(AppError::Unauthorized)?;

    let name = input_guard::sanitize(&req.name, input_guard::PRODUCT_NAME.max_len);
    let description = input_guard::sanitize(
        req.description.as_deref().unwrap_or(""),
        input_guard::PRODUCT_DESCRIPTION.max_len,
    );

    let row = state
        .products
        .create(&name, &description, req.price, &user.id)?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_product(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    checked_id(&id)?;

    let product = state
        .products
        .get(&id)?
        .ok_or_else(|| AppError::not_found("product"))?;

    let owner = owner_subject(&state, &product)?;
    policy::authorize(
        &Requirement::OwnerOrRole(Role::Admin),
        Some(&ctx),
        owner.as_deref(),
    )?;

    req.validate()?;
    let name = input_guard::sanitize(&req.name, input_guard::PRODUCT_NAME.max_len);
    let description = input_guard::sanitize(
        req.description.as_deref().unwrap_or(""),
        input_guard::PRODUCT_DESCRIPTION.max_len,
    );

    let row = state
        .products
        .update(&id, &name, &description, req.price)?
        .ok_or_else(|| AppError::not_found("product"))?;

    Ok(Json(row.into()))
}

pub async fn delete_product(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    checked_id(&id)?;

    let product = state
        .products
        .get(&id)?
        .ok_or_else(|| AppError::not_found("product"))?;

    let owner = owner_subject(&state, &product)?;
    policy::authorize(
        &Requirement::OwnerOrRole(Role::Admin),
        Some(&ctx),
        owner.as_deref(),
    )?;

    if state.products.delete(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("product"))
    }
}
