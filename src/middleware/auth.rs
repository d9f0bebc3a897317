//! Bearer credential の解決 → AuthCtx を extensions に入れる
//!
//! 流れ: ヘッダ抽出 → 失効チェック → 署名/期限検証 → AuthCtx 格納
//!
//! ここでは絶対にリクエストを落とさない:
//! - credential が無い / 失効済み / 検証失敗 → 未認証のまま下流へ流す
//! - public endpoint はそのまま成功し、保護された endpoint は
//!   policy 層が fail-closed に deny する
//!
//! 書き込みは request extensions のみ。TokenService / RevocationStore の
//! 状態はここからは一切変更しない。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::state::AppState;

/// `/api/*` 全体に認証解決を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let api = api::v1::routes();
/// let api = middleware::auth::apply(api, state.clone());
/// app = app.nest("/api", api);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, resolve_principal))
}

async fn resolve_principal(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // ヘッダ欠落や "Bearer " でない形式はエラーではなく NoCredential 扱い
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = token {
        if state.revocations.is_revoked(token) {
            // 失効済み。値は出さない
            tracing::warn!("revoked credential presented");
        } else {
            match state.tokens.verify_and_extract(token) {
                Ok((subject, role)) => {
                    // middleware → extractor への受け渡し
                    req.extensions_mut().insert(AuthCtx::new(subject, role));
                }
                Err(err) => {
                    // 原因種別は診断用。クライアントへは下流で一様な 401
                    tracing::warn!(error = %err, "credential verification failed");
                }
            }
        }
    }

    next.run(req).await
}
