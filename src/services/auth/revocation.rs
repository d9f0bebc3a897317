/*
 * Responsibility
 * - logout されたトークンの失効管理 (in-memory, process-local)
 * - 併走する revoke / is_revoked / sweep を内部同期で安全にする
 * - 定期 sweep で自然期限切れの entry を落とし、メモリを有界に保つ
 *
 * Notes
 * - 非永続。プロセス再起動で全 entry が消えるのは設計上の割り切り
 *   (外部共有キャッシュを仮定しないスコープのため)。
 * - 期限は token の encoded exp を署名検証なしで読む。読めないトークンも
 *   raw 値のまま失効できる (fallback 期限を付ける)。
 */
use std::collections::HashMap;
use std::sync::RwLock;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;

const BEARER_PREFIX: &str = "Bearer ";

/// Entry value is the unix timestamp after which the token would be rejected
/// by expiry anyway, so keeping it revoked is dead weight.
pub struct RevocationStore {
    entries: RwLock<HashMap<String, i64>>,
    sweep_threshold: usize,
    fallback_ttl_seconds: i64,
}

impl std::fmt::Debug for RevocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationStore")
            .field("len", &self.len())
            .field("sweep_threshold", &self.sweep_threshold)
            .finish()
    }
}

impl RevocationStore {
    pub fn new(sweep_threshold: usize, fallback_ttl_seconds: i64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            sweep_threshold,
            fallback_ttl_seconds,
        }
    }

    // middleware 側の抽出 (strip → trim) と必ず一致させること。
    // ここがずれると logout 済み token の照合をすり抜ける。
    fn normalize(token: &str) -> &str {
        let token = token.trim();
        token.strip_prefix(BEARER_PREFIX).unwrap_or(token).trim()
    }

    /// Mark a token as unusable regardless of its cryptographic validity.
    /// Idempotent: revoking twice is a no-op.
    ///
    /// A token whose payload cannot be parsed is still revoked by raw value,
    /// with `now + fallback_ttl` as its retention deadline.
    pub fn revoke(&self, token: &str) {
        let token = Self::normalize(token);
        if token.is_empty() {
            return;
        }

        let expires_at = decode_exp_unverified(token)
            .unwrap_or_else(|| Utc::now().timestamp() + self.fallback_ttl_seconds);

        let mut entries = match self.entries.write() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        entries.entry(token.to_string()).or_insert(expires_at);
    }

    /// O(1) membership check on the normalized token.
    pub fn is_revoked(&self, token: &str) -> bool {
        let token = Self::normalize(token);
        if token.is_empty() {
            return false;
        }
        let entries = match self.entries.read() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        entries.contains_key(token)
    }

    pub fn len(&self) -> usize {
        let entries = match self.entries.read() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries whose retention deadline has passed. Only kicks in once
    /// the store grows past the configured threshold; the write lock is held
    /// for a single O(len) retain scan.
    ///
    /// Returns the number of removed entries.
    pub fn sweep(&self, now: i64) -> usize {
        let mut entries = match self.entries.write() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        if entries.len() <= self.sweep_threshold {
            return 0;
        }
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        before - entries.len()
    }
}

/// Read the `exp` claim without verifying the signature. Used only to decide
/// how long a revoked entry must be retained; never for authentication.
fn decode_exp_unverified(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    value.get("exp")?.as_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::services::auth::{Role, TokenService};

    fn token(exp_offset: i64) -> String {
        // 実トークンで exp を encoded のまま持たせる
        let svc = TokenService::new(b"0123456789abcdef0123456789abcdef", exp_offset);
        svc.issue("alice@example.com", Role::User).unwrap()
    }

    #[test]
    fn revoke_then_is_revoked() {
        let store = RevocationStore::new(1000, 3600);
        let t = token(3600);
        assert!(!store.is_revoked(&t));
        store.revoke(&t);
        assert!(store.is_revoked(&t));
    }

    #[test]
    fn revoke_is_idempotent() {
        let store = RevocationStore::new(1000, 3600);
        let t = token(3600);
        store.revoke(&t);
        store.revoke(&t);
        assert!(store.is_revoked(&t));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn bearer_prefix_is_normalized_away() {
        let store = RevocationStore::new(1000, 3600);
        let t = token(3600);
        store.revoke(&format!("Bearer {t}"));
        assert!(store.is_revoked(&t));
        assert!(store.is_revoked(&format!("Bearer {t}")));
    }

    #[test]
    fn padded_bearer_header_matches_bare_token() {
        let store = RevocationStore::new(1000, 3600);
        let t = token(3600);
        // 余分な空白入りヘッダで revoke しても素の token と同一視する
        store.revoke(&format!("Bearer  {t} "));
        assert!(store.is_revoked(&t));
        assert!(store.is_revoked(&format!("Bearer {t}")));
    }

    #[test]
    fn empty_credential_is_ignored() {
        let store = RevocationStore::new(1000, 3600);
        store.revoke("");
        store.revoke("Bearer ");
        assert!(store.is_empty());
        assert!(!store.is_revoked(""));
    }

    #[test]
    fn unparseable_token_is_still_revocable() {
        let store = RevocationStore::new(1000, 3600);
        store.revoke("garbage-not-a-jwt");
        assert!(store.is_revoked("garbage-not-a-jwt"));
    }

    #[test]
    fn sweep_is_a_noop_below_threshold() {
        let store = RevocationStore::new(10, 3600);
        let t = token(-60); // already expired
        store.revoke(&t);
        assert_eq!(store.sweep(Utc::now().timestamp()), 0);
        assert!(store.is_revoked(&t));
    }

    #[test]
    fn sweep_drops_only_expired_entries_above_threshold() {
        let store = RevocationStore::new(0, 3600);
        let stale = token(-60);
        let live = token(3600);
        store.revoke(&stale);
        store.revoke(&live);

        let removed = store.sweep(Utc::now().timestamp());
        assert_eq!(removed, 1);
        assert!(!store.is_revoked(&stale));
        assert!(store.is_revoked(&live));
    }

    #[test]
    fn sweep_honors_fallback_deadline_for_opaque_tokens() {
        let store = RevocationStore::new(0, 0);
        store.revoke("opaque-credential");
        // fallback_ttl = 0 なので即座に掃除対象
        let removed = store.sweep(Utc::now().timestamp() + 1);
        assert_eq!(removed, 1);
        assert!(!store.is_revoked("opaque-credential"));
    }

    #[test]
    fn concurrent_revoke_and_check() {
        let store = Arc::new(RevocationStore::new(10_000, 3600));
        let t = token(3600);
        store.revoke(&t);

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            let t = t.clone();
            handles.push(std::thread::spawn(move || {
                for j in 0..500 {
                    store.revoke(&format!("worker-{i}-token-{j}"));
                    assert!(store.is_revoked(&t));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 1 + 8 * 500);
    }
}
