/*
 * Responsibility
 * - products ドキュメント向けの in-memory CRUD + name 部分一致検索
 * - owner (user_id) はレコード所有権チェックの元データ
 */
use std::collections::HashMap;
use std::sync::RwLock;

use crate::repos::error::RepoError;
use crate::services::object_id;

#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub user_id: String,
}

#[derive(Debug, Default)]
pub struct ProductRepo {
    rows: RwLock<HashMap<String, ProductRecord>>,
}

impl ProductRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &self,
        name: &str,
        description: &str,
        price: f64,
        user_id: &str,
    ) -> Result<ProductRecord, RepoError> {
        let mut rows = self.rows.write().map_err(|_| RepoError::Poisoned)?;
        let row = ProductRecord {
            id: object_id::generate(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            user_id: user_id.to_string(),
        };
        rows.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    pub fn list(&self) -> Result<Vec<ProductRecord>, RepoError> {
        let rows = self.rows.read().map_err(|_| RepoError::Poisoned)?;
        Ok(rows.values().cloned().collect())
    }

    /// Case-insensitive "name contains" search. The query is expected to be
    /// sanitized by the caller before it gets here.
    pub fn search(&self, query: &str) -> Result<Vec<ProductRecord>, RepoError> {
        let needle = query.to_lowercase();
        let rows = self.rows.read().map_err(|_| RepoError::Poisoned)?;
        Ok(rows
            .values()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<Option<ProductRecord>, RepoError> {
        let rows = self.rows.read().map_err(|_| RepoError::Poisoned)?;
        Ok(rows.get(id).cloned())
    }

    /// Full update of the mutable fields; ownership never changes here.
    pub fn update(
        &self,
        id: &str,
        name: &str,
        description: &str,
        price: f64,
    ) -> Result<Option<ProductRecord>, RepoError> {
        let mut rows = self.rows.write().map_err(|_| RepoError::Poisoned)?;
        let Some(row) = rows.get_mut(id) else {
            return Ok(None);
        };
        row.name = name.to_string();
        row.description = description.to_string();
        row.price = price;
        Ok(Some(row.clone()))
    }

    pub fn delete(&self, id: &str) -> Result<bool, RepoError> {
        let mut rows = self.rows.write().map_err(|_| RepoError::Poisoned)?;
        Ok(rows.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_matches_name_case_insensitively() {
        let repo = ProductRepo::new();
        repo.create("Gaming Laptop Pro", "16in", 1499.0, "u1").unwrap();
        repo.create("USB Hub", "4 ports", 19.0, "u1").unwrap();

        let hits = repo.search("laptop").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Gaming Laptop Pro");
        assert!(repo.search("printer").unwrap().is_empty());
    }

    #[test]
    fn update_keeps_the_recorded_owner() {
        let repo = ProductRepo::new();
        let p = repo.create("Hub", "4 ports", 19.0, "u1").unwrap();
        let updated = repo.update(&p.id, "Hub v2", "8 ports", 29.0).unwrap().unwrap();
        assert_eq!(updated.user_id, "u1");
        assert_eq!(updated.price, 29.0);
    }

    #[test]
    fn get_and_delete_unknown_id() {
        let repo = ProductRepo::new();
        assert!(repo.get("ffffffffffffffffffffffff").unwrap().is_none());
        assert!(!repo.delete("ffffffffffffffffffffffff").unwrap());
    }
}
