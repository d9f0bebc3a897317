/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /auth, /users, /products を nest/merge
 * - 認証の解決は middleware::auth::apply (app.rs 側) で全体に掛ける。
 *   endpoint ごとの要件は各 handler が policy::authorize で宣言する
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{login, logout, register},
    health::health,
    products::{
        create_product, delete_product, get_product, list_products, search_products,
        update_product,
    },
    users::{create_user, delete_user, get_user, list_users, update_user},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", get(search_products))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}
