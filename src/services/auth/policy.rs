/*
 * Responsibility
 * - endpoint ごとの認可要件 (Requirement) を一箇所で評価する
 * - pre-check: handler 実行前の allow/deny
 * - post-check: 取得済みレコードを見てからの二段階目の allow/deny
 *
 * Notes
 * - handler 側に role の if 分岐を散らさない。要件は閉じた enum で宣言し、
 *   評価はこの module の関数だけが行う。
 * - deny の理由クラスは外に漏らさない (owner が誰かを推測させない)。
 */
use thiserror::Error;

use crate::api::v1::extractors::AuthCtx;
use crate::services::auth::Role;

/// Declarative access requirement attached to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    AuthenticatedAny,
    RoleRequired(Role),
    OwnerOrRole(Role),
}

/// Outcome of a denied evaluation.
///
/// - `Unauthenticated`: no usable principal on a requirement that needs one
///   (maps to 401 — a revoked/expired credential lands here too, because the
///   middleware already degraded it to "no principal").
/// - `Forbidden`: a principal exists but the requirement rejects it (403).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
}

/// Records priced under this are visible to anyone on read (post-check).
pub const PUBLIC_PRICE_THRESHOLD: f64 = 100.0;

/// Pre-check, evaluated by every handler before doing any work.
///
/// `resource_owner` is the owner subject resolved by the caller for
/// `OwnerOrRole` endpoints; `None` means the lookup failed and the branch
/// denies (fail-closed).
pub fn authorize(
    requirement: &Requirement,
    principal: Option<&AuthCtx>,
    resource_owner: Option<&str>,
) -> Result<(), PolicyError> {
    match requirement {
        Requirement::Public => Ok(()),
        Requirement::AuthenticatedAny => {
            principal.map(|_| ()).ok_or(PolicyError::Unauthenticated)
        }
        Requirement::RoleRequired(role) => {
            let principal = principal.ok_or(PolicyError::Unauthenticated)?;
            if principal.role == *role {
                Ok(())
            } else {
                Err(PolicyError::Forbidden)
            }
        }
        Requirement::OwnerOrRole(role) => {
            let principal = principal.ok_or(PolicyError::Unauthenticated)?;
            if principal.role == *role {
                return Ok(());
            }
            match resource_owner {
                Some(owner) if owner == principal.subject => Ok(()),
                // owner 解決失敗も deny に倒す
                _ => Err(PolicyError::Forbidden),
            }
        }
    }
}

/// Post-check for product reads: the record was already fetched by the
/// handler; admin, owner, or a sub-threshold price may see it. Everything
/// else discards the result and yields 403.
pub fn authorize_product_read(
    principal: Option<&AuthCtx>,
    resource_owner: Option<&str>,
    price: f64,
) -> Result<(), PolicyError> {
    if price < PUBLIC_PRICE_THRESHOLD {
        return Ok(());
    }
    let principal = principal.ok_or(PolicyError::Forbidden)?;
    if principal.role == Role::Admin {
        return Ok(());
    }
    match resource_owner {
        Some(owner) if owner == principal.subject => Ok(()),
        _ => Err(PolicyError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(subject: &str) -> AuthCtx {
        AuthCtx::new(subject.to_string(), Role::User)
    }

    fn admin(subject: &str) -> AuthCtx {
        AuthCtx::new(subject.to_string(), Role::Admin)
    }

    #[test]
    fn public_allows_anonymous() {
        assert_eq!(authorize(&Requirement::Public, None, None), Ok(()));
    }

    #[test]
    fn authenticated_any_requires_a_principal() {
        assert_eq!(
            authorize(&Requirement::AuthenticatedAny, None, None),
            Err(PolicyError::Unauthenticated)
        );
        let p = user("alice@example.com");
        assert_eq!(
            authorize(&Requirement::AuthenticatedAny, Some(&p), None),
            Ok(())
        );
    }

    #[test]
    fn role_required_denies_wrong_role_with_forbidden() {
        let p = user("alice@example.com");
        assert_eq!(
            authorize(&Requirement::RoleRequired(Role::Admin), Some(&p), None),
            Err(PolicyError::Forbidden)
        );
        let a = admin("root@example.com");
        assert_eq!(
            authorize(&Requirement::RoleRequired(Role::Admin), Some(&a), None),
            Ok(())
        );
    }

    #[test]
    fn owner_or_role_allows_recorded_owner() {
        let p = user("alice@example.com");
        assert_eq!(
            authorize(
                &Requirement::OwnerOrRole(Role::Admin),
                Some(&p),
                Some("alice@example.com")
            ),
            Ok(())
        );
    }

    #[test]
    fn owner_or_role_allows_privileged_role_over_foreign_resource() {
        let a = admin("root@example.com");
        assert_eq!(
            authorize(
                &Requirement::OwnerOrRole(Role::Admin),
                Some(&a),
                Some("alice@example.com")
            ),
            Ok(())
        );
    }

    #[test]
    fn owner_or_role_denies_non_owner_and_failed_lookup() {
        let p = user("mallory@example.com");
        assert_eq!(
            authorize(
                &Requirement::OwnerOrRole(Role::Admin),
                Some(&p),
                Some("alice@example.com")
            ),
            Err(PolicyError::Forbidden)
        );
        // lookup failure is a deny, not an allow
        assert_eq!(
            authorize(&Requirement::OwnerOrRole(Role::Admin), Some(&p), None),
            Err(PolicyError::Forbidden)
        );
    }

    #[test]
    fn post_check_allows_cheap_record_to_anyone() {
        assert_eq!(authorize_product_read(None, None, 50.0), Ok(()));
        let p = user("mallory@example.com");
        assert_eq!(
            authorize_product_read(Some(&p), Some("alice@example.com"), 50.0),
            Ok(())
        );
    }

    #[test]
    fn post_check_threshold_is_exclusive() {
        // price == threshold is not "below"
        assert_eq!(
            authorize_product_read(None, None, PUBLIC_PRICE_THRESHOLD),
            Err(PolicyError::Forbidden)
        );
    }

    #[test]
    fn post_check_allows_admin_and_owner_on_expensive_record() {
        let a = admin("root@example.com");
        assert_eq!(
            authorize_product_read(Some(&a), Some("alice@example.com"), 150.0),
            Ok(())
        );
        let owner = user("alice@example.com");
        assert_eq!(
            authorize_product_read(Some(&owner), Some("alice@example.com"), 150.0),
            Ok(())
        );
    }

    #[test]
    fn post_check_denies_everyone_else_with_forbidden() {
        let p = user("mallory@example.com");
        assert_eq!(
            authorize_product_read(Some(&p), Some("alice@example.com"), 150.0),
            Err(PolicyError::Forbidden)
        );
        assert_eq!(
            authorize_product_read(None, Some("alice@example.com"), 150.0),
            Err(PolicyError::Forbidden)
        );
    }
}
