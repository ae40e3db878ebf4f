//! JSON-file-backed node store.
//!
//! A MemoryStore that writes every mutation through to a JSON file, so the
//! editable tree survives restarts without pulling in a database.

use std::fs;
use std::path::{Path, PathBuf};

use crate::node::{NodeWithAncestors, RouteNode};
use crate::store::{MemoryStore, NodeStore, ReorderChange, StoreError};

pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let inner = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let rows: Vec<RouteNode> = serde_json::from_str(&raw)?;
            MemoryStore::from_rows(rows)?
        } else {
            MemoryStore::new()
        };
        Ok(Self { path, inner })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let rows = self.inner.dump();
        let raw = serde_json::to_string_pretty(&rows)?;
        // Write-then-rename so a crash mid-write cannot truncate the store.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl NodeStore for JsonStore {
    fn get_tree(&self) -> Result<Vec<RouteNode>, StoreError> {
        self.inner.get_tree()
    }

    fn node_with_ancestors(&self, id: i64) -> Result<Option<NodeWithAncestors>, StoreError> {
        self.inner.node_with_ancestors(id)
    }

    fn get(&self, id: i64) -> Result<Option<RouteNode>, StoreError> {
        self.inner.get(id)
    }

    fn list(&self) -> Result<Vec<RouteNode>, StoreError> {
        self.inner.list()
    }

    fn insert(&self, node: RouteNode) -> Result<RouteNode, StoreError> {
        let inserted = self.inner.insert(node)?;
        self.persist()?;
        Ok(inserted)
    }

    fn update(&self, node: RouteNode) -> Result<(), StoreError> {
        self.inner.update(node)?;
        self.persist()
    }

    fn soft_delete(&self, ids: &[i64]) -> Result<(), StoreError> {
        self.inner.soft_delete(ids)?;
        self.persist()
    }

    fn reorder(&self, changes: &[ReorderChange]) -> Result<(), StoreError> {
        self.inner.reorder(changes)?;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");

        let id = {
            let store = JsonStore::open(&path).unwrap();
            let mut node = RouteNode::new(0, NodeKind::Route);
            node.uri = Some("contact".to_string());
            node.methods = ["GET".to_string()].into_iter().collect();
            store.insert(node).unwrap().id
        };

        let reopened = JsonStore::open(&path).unwrap();
        let row = reopened.get(id).unwrap().unwrap();
        assert_eq!(row.uri.as_deref(), Some("contact"));
    }

    #[test]
    fn test_soft_deleted_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");

        let id = {
            let store = JsonStore::open(&path).unwrap();
            let mut node = RouteNode::new(0, NodeKind::Route);
            node.uri = Some("gone".to_string());
            let id = store.insert(node).unwrap().id;
            store.soft_delete(&[id]).unwrap();
            id
        };

        let reopened = JsonStore::open(&path).unwrap();
        assert!(reopened.get(id).unwrap().is_none());
        // Insert after reopen must not reuse the deleted row's id.
        let mut node = RouteNode::new(0, NodeKind::Route);
        node.uri = Some("next".to_string());
        assert_eq!(reopened.insert(node).unwrap().id, id + 1);
    }
}
