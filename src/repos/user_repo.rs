/*
 * Responsibility
 * - users ドキュメント向けの in-memory CRUD
 * - email の一意性はここで担保 (DuplicateEmail)
 * - password_hash は外に出す DTO に絶対に載せないこと (handler 側の責務)
 */
use std::collections::HashMap;
use std::sync::RwLock;

use crate::repos::error::RepoError;
use crate::services::auth::Role;
use crate::services::object_id;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Default)]
pub struct UserRepo {
    rows: RwLock<HashMap<String, UserRecord>>,
}

impl std::fmt::Debug for UserRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not dump records (they carry password hashes)
        let len = self.rows.read().map(|r| r.len()).unwrap_or(0);
        f.debug_struct("UserRepo").field("len", &len).finish()
    }
}

impl UserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<UserRecord, RepoError> {
        let mut rows = self.rows.write().map_err(|_| RepoError::Poisoned)?;
        if rows.values().any(|u| u.email == email) {
            return Err(RepoError::DuplicateEmail);
        }
        let row = UserRecord {
            id: object_id::generate(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
        };
        rows.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    pub fn list(&self) -> Result<Vec<UserRecord>, RepoError> {
        let rows = self.rows.read().map_err(|_| RepoError::Poisoned)?;
        Ok(rows.values().cloned().collect())
    }

    pub fn get(&self, id: &str) -> Result<Option<UserRecord>, RepoError> {
        let rows = self.rows.read().map_err(|_| RepoError::Poisoned)?;
        Ok(rows.get(id).cloned())
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let rows = self.rows.read().map_err(|_| RepoError::Poisoned)?;
        Ok(rows.values().find(|u| u.email == email).cloned())
    }

    /// Partial update; `None` fields are left untouched.
    pub fn update(
        &self,
        id: &str,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<Option<UserRecord>, RepoError> {
        let mut rows = self.rows.write().map_err(|_| RepoError::Poisoned)?;
        if let Some(new_email) = email
            && rows.values().any(|u| u.email == new_email && u.id != id)
        {
            return Err(RepoError::DuplicateEmail);
        }
        let Some(row) = rows.get_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            row.name = name.to_string();
        }
        if let Some(email) = email {
            row.email = email.to_string();
        }
        if let Some(hash) = password_hash {
            row.password_hash = hash.to_string();
        }
        Ok(Some(row.clone()))
    }

    pub fn delete(&self, id: &str) -> Result<bool, RepoError> {
        let mut rows = self.rows.write().map_err(|_| RepoError::Poisoned)?;
        Ok(rows.remove(id).is_some())
    }
}
