/*
 * Responsibility
 * - 署名付きトークンの発行 (sub / role / iat / exp) と検証
 * - HMAC-SHA-256 の対称鍵はこの service に閉じ込める (ログ出力禁止)
 * - 副作用なし。検証は入力トークンと鍵だけの純粋関数
 */
use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::auth::Role;

/// Internal failure causes. All of them collapse to a uniform 401 at the
/// HTTP boundary; the distinction exists for diagnostics only.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("signature mismatch")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            // Base64 / JSON / structure errors and everything else
            _ => TokenError::Malformed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies bearer tokens with a process-lifetime symmetric key.
///
/// - Stateless apart from the key; safe for unlimited concurrent use.
/// - No refresh mechanism: an expiring token is replaced by a fresh login.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenService")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_seconds: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // leeway 0 で exp 境界を正確にテストできるようにする
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a signed token for an authenticated subject.
    ///
    /// Claim set is fixed: {sub, role, iat = now, exp = now + ttl}.
    pub fn issue(&self, subject: &str, role: Role) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now,
            exp: now + self.ttl_seconds,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::from)
    }

    /// Verify signature + structure + expiry and return (subject, role).
    ///
    /// The three causes are independent: a well-formed token with a bad
    /// signature is `SignatureInvalid`, a correctly signed token past its
    /// `exp` is `Expired`, anything undecodable is `Malformed`.
    pub fn verify_and_extract(&self, token: &str) -> Result<(String, Role), TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok((data.claims.sub, data.claims.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn service() -> TokenService {
        TokenService::new(SECRET, 24 * 60 * 60)
    }

    fn sign_with(secret: &[u8], claims: &Claims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    #[test]
    fn issue_then_verify_returns_subject_and_role() {
        let svc = service();
        let token = svc.issue("alice@example.com", Role::User).unwrap();
        let (sub, role) = svc.verify_and_extract(&token).unwrap();
        assert_eq!(sub, "alice@example.com");
        assert_eq!(role, Role::User);
    }

    #[test]
    fn admin_role_round_trips() {
        let svc = service();
        let token = svc.issue("root@example.com", Role::Admin).unwrap();
        let (_, role) = svc.verify_and_extract(&token).unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn rejects_token_signed_with_other_key() {
        let svc = service();
        let now = Utc::now().timestamp();
        let forged = sign_with(
            b"another-secret-key-of-enough-len",
            &Claims {
                sub: "alice@example.com".into(),
                role: Role::Admin,
                iat: now,
                exp: now + 3600,
            },
        );
        assert!(matches!(
            svc.verify_and_extract(&forged),
            Err(TokenError::SignatureInvalid)
        ));
    }

    #[test]
    fn rejects_garbage_as_malformed() {
        let svc = service();
        assert!(matches!(
            svc.verify_and_extract("not-a-token"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            svc.verify_and_extract(""),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn expiry_boundary_one_second_each_side() {
        let svc = service();
        let now = Utc::now().timestamp();

        // exp = now + 1: still inside the lifetime
        let live = sign_with(
            SECRET,
            &Claims {
                sub: "alice@example.com".into(),
                role: Role::User,
                iat: now - svc.ttl_seconds() + 1,
                exp: now + 1,
            },
        );
        assert!(svc.verify_and_extract(&live).is_ok());

        // exp = now - 1: one second past the lifetime
        let stale = sign_with(
            SECRET,
            &Claims {
                sub: "alice@example.com".into(),
                role: Role::User,
                iat: now - svc.ttl_seconds() - 1,
                exp: now - 1,
            },
        );
        assert!(matches!(
            svc.verify_and_extract(&stale),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn unknown_role_claim_is_malformed() {
        // role は閉じた集合。それ以外の値は decode 時点で落とす。
        let svc = service();
        #[derive(Serialize)]
        struct LooseClaims<'a> {
            sub: &'a str,
            role: &'a str,
            iat: i64,
            exp: i64,
        }
        let now = Utc::now().timestamp();
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &LooseClaims {
                sub: "alice@example.com",
                role: "SUPERUSER",
                iat: now,
                exp: now + 3600,
            },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(matches!(
            svc.verify_and_extract(&token),
            Err(TokenError::Malformed)
        ));
    }
}
