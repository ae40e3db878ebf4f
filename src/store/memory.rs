//! In-memory node store.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use crate::node::{NodeWithAncestors, RouteNode};
use crate::store::{NodeStore, ReorderChange, StoreError};

struct Inner {
    rows: BTreeMap<i64, RouteNode>,
    next_id: i64,
}

/// RwLock-protected flat row storage; the default store.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Rehydrate from previously persisted rows.
    ///
    /// This is the boundary where the id-range convention is enforced: a
    /// row with a negative id is refused, not silently accepted.
    pub fn from_rows(rows: Vec<RouteNode>) -> Result<Self, StoreError> {
        let mut map = BTreeMap::new();
        let mut next_id = 1;
        for mut row in rows {
            if row.id < 0 {
                return Err(StoreError::NegativeId(row.id));
            }
            next_id = next_id.max(row.id + 1);
            row.children = Vec::new();
            map.insert(row.id, row);
        }
        Ok(Self {
            inner: RwLock::new(Inner {
                rows: map,
                next_id,
            }),
        })
    }

    /// Every row including soft-deleted ones, for persistence.
    pub fn dump(&self) -> Vec<RouteNode> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.rows.values().cloned().collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn live<'a>(inner: &'a Inner) -> impl Iterator<Item = &'a RouteNode> {
    inner.rows.values().filter(|n| !n.deleted)
}

fn attach_children(inner: &Inner, node: &mut RouteNode) {
    let mut children: Vec<RouteNode> = live(inner)
        .filter(|n| n.parent_id == Some(node.id))
        .cloned()
        .collect();
    RouteNode::sort_siblings(&mut children);
    for child in &mut children {
        attach_children(inner, child);
    }
    node.children = children;
}

fn validate_parent(inner: &Inner, id: i64, parent_id: Option<i64>) -> Result<(), StoreError> {
    let Some(pid) = parent_id else { return Ok(()) };
    if pid < 0 {
        return Err(StoreError::NegativeId(pid));
    }
    match inner.rows.get(&pid) {
        Some(parent) if !parent.deleted => {
            if !parent.is_group() {
                return Err(StoreError::ParentNotGroup(pid));
            }
        }
        _ => return Err(StoreError::UnknownParent(pid)),
    }
    if pid == id {
        return Err(StoreError::Cycle(id));
    }
    Ok(())
}

impl NodeStore for MemoryStore {
    fn get_tree(&self) -> Result<Vec<RouteNode>, StoreError> {
        let inner = self.inner.read().expect("store lock poisoned");
        let mut roots: Vec<RouteNode> = live(&inner)
            .filter(|n| match n.parent_id {
                None => true,
                // A row whose parent row is gone still has to surface.
                Some(pid) => !inner.rows.get(&pid).map(|p| !p.deleted).unwrap_or(false),
            })
            .cloned()
            .collect();
        RouteNode::sort_siblings(&mut roots);
        for root in &mut roots {
            attach_children(&inner, root);
        }
        Ok(roots)
    }

    fn node_with_ancestors(&self, id: i64) -> Result<Option<NodeWithAncestors>, StoreError> {
        let inner = self.inner.read().expect("store lock poisoned");
        let Some(node) = inner.rows.get(&id).filter(|n| !n.deleted).cloned() else {
            return Ok(None);
        };

        let mut ancestors = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut cursor = node.parent_id;
        while let Some(pid) = cursor {
            // The reorder guard keeps the chain acyclic; the seen-set only
            // bounds a corrupted store.
            if !seen.insert(pid) {
                break;
            }
            match inner.rows.get(&pid).filter(|n| !n.deleted) {
                Some(parent) => {
                    cursor = parent.parent_id;
                    ancestors.push(parent.clone());
                }
                None => break,
            }
        }
        Ok(Some(NodeWithAncestors { node, ancestors }))
    }

    fn get(&self, id: i64) -> Result<Option<RouteNode>, StoreError> {
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(inner.rows.get(&id).filter(|n| !n.deleted).cloned())
    }

    fn list(&self) -> Result<Vec<RouteNode>, StoreError> {
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(live(&inner).cloned().collect())
    }

    fn insert(&self, mut node: RouteNode) -> Result<RouteNode, StoreError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        // The row's id is assigned here, so the incoming one is ignored and
        // can never collide with the parent being validated.
        node.id = inner.next_id;
        validate_parent(&inner, node.id, node.parent_id)?;
        inner.next_id += 1;
        node.deleted = false;
        node.children = Vec::new();
        inner.rows.insert(node.id, node.clone());
        Ok(node)
    }

    fn update(&self, mut node: RouteNode) -> Result<(), StoreError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if node.id < 0 {
            return Err(StoreError::NegativeId(node.id));
        }
        if !inner.rows.contains_key(&node.id) {
            return Err(StoreError::NotFound(node.id));
        }
        validate_parent(&inner, node.id, node.parent_id)?;
        node.children = Vec::new();
        inner.rows.insert(node.id, node);
        Ok(())
    }

    fn soft_delete(&self, ids: &[i64]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        for id in ids {
            if !inner.rows.contains_key(id) {
                return Err(StoreError::NotFound(*id));
            }
        }
        for id in ids {
            if let Some(row) = inner.rows.get_mut(id) {
                row.deleted = true;
            }
        }
        Ok(())
    }

    fn reorder(&self, changes: &[ReorderChange]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().expect("store lock poisoned");

        // Validate everything before touching anything.
        let overlay: HashMap<i64, Option<i64>> =
            changes.iter().map(|c| (c.id, c.parent_id)).collect();

        for change in changes {
            if change.id < 0 {
                return Err(StoreError::NegativeId(change.id));
            }
            match inner.rows.get(&change.id) {
                Some(row) if !row.deleted => {}
                _ => return Err(StoreError::NotFound(change.id)),
            }
            if change.sort_order < 0 {
                return Err(StoreError::NegativeSortOrder {
                    id: change.id,
                    sort_order: change.sort_order,
                });
            }
            validate_parent(&inner, change.id, change.parent_id)?;

            // Walk up through the proposed parents; reaching ourselves
            // again means the batch would close a cycle.
            let mut seen = HashSet::from([change.id]);
            let mut cursor = change.parent_id;
            while let Some(pid) = cursor {
                if !seen.insert(pid) {
                    return Err(StoreError::Cycle(change.id));
                }
                cursor = match overlay.get(&pid) {
                    Some(proposed) => *proposed,
                    None => inner.rows.get(&pid).and_then(|p| p.parent_id),
                };
            }
        }

        for change in changes {
            if let Some(row) = inner.rows.get_mut(&change.id) {
                row.parent_id = change.parent_id;
                row.sort_order = change.sort_order as u32;
            }
        }
        Ok(())
    }
}
