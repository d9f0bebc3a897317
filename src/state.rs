/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - プロセス起動時に一度だけ構築し、全 handler が参照共有する
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::{ProductRepo, UserRepo};
use crate::services::auth::{RevocationStore, TokenService};

#[derive(Clone, Debug)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub revocations: Arc<RevocationStore>,
    pub users: Arc<UserRepo>,
    pub products: Arc<ProductRepo>,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenService>,
        revocations: Arc<RevocationStore>,
        users: Arc<UserRepo>,
        products: Arc<ProductRepo>,
    ) -> Self {
        Self {
            tokens,
            revocations,
            users,
            products,
        }
    }
}
