/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - token の検証・失効チェックは middleware/services 側の責務
 * - 検証を通った token からのみ構築されること。リクエストをまたいで
 *   キャッシュしない (毎リクエスト再評価)
 */

use crate::services::auth::Role;

/// 認証済みのリクエストに付与される principal
///
/// - `subject` は token の sub (このプロジェクトでは email)
/// - `role` は閉じた役割集合。細かい所有権チェックは policy 層で別途行う
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub subject: String,
    pub role: Role,
}

impl AuthCtx {
    pub fn new(subject: String, role: Role) -> Self {
        Self { subject, role }
    }
}
