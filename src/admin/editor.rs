//! Runtime route editing.
//!
//! # Responsibilities
//! - Create/update/delete/reorder persisted nodes with the guard consulted
//!   before every write
//! - Enforce the readonly rules: declarative nodes and locked rows are
//!   never edited
//! - List both provenances for the admin UI
//!
//! # Design Decisions
//! - One mutex serializes all edits, so "no conflict found" and "row
//!   written" happen as a unit
//! - Parent moves go through `reorder`, not `update`
//! - Every successful mutation recompiles and swaps the live table before
//!   returning

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::compiler::{CompileError, RoutingEngine};
use crate::config::schema::NodeRecord;
use crate::node::{ActionType, NodeKind, NodeSource, RouteNode};
use crate::routing::path::join_paths;
use crate::routing::pattern::normalize_methods;
use crate::store::{ReorderChange, StoreError};
use crate::validate::validate_record;

/// Editing failure, ordered roughly by how early it is caught.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
    #[error("{reason}")]
    Conflict {
        reason: String,
        conflicting_id: i64,
        conflicting_path: String,
        conflict_source: NodeSource,
    },
    #[error("{0}")]
    Rejected(String),
    #[error("node {0} not found")]
    NotFound(i64),
    #[error("node {0} is read-only")]
    Readonly(i64),
    #[error("parent node {0} does not exist")]
    UnknownParent(i64),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("recompile failed: {0}")]
    Compile(#[from] CompileError),
}

/// Create payload: a raw node record plus its attachment point.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateRequest {
    #[serde(flatten)]
    pub record: NodeRecord,
    pub parent_id: Option<i64>,
    pub readonly: Option<bool>,
}

/// Partial update payload; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRequest {
    pub enabled: Option<bool>,
    pub sort_order: Option<i64>,
    /// A node can be locked (true) but never unlocked through the API.
    pub readonly: Option<bool>,
    pub prefix: Option<String>,
    pub domain: Option<String>,
    pub namespace: Option<String>,
    pub middleware: Option<Vec<String>>,
    #[serde(rename = "where")]
    pub wheres: Option<std::collections::BTreeMap<String, String>>,
    pub uri: Option<String>,
    pub methods: Option<Vec<String>>,
    pub name: Option<String>,
    pub action_type: Option<String>,
    pub action: Option<String>,
    pub entry_id: Option<i64>,
    pub defaults: Option<std::collections::BTreeMap<String, String>>,
}

/// One node of the merged listing.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub kind: NodeKind,
    pub source: NodeSource,
    pub readonly: bool,
    pub enabled: bool,
    pub sort_order: u32,
    pub full_path: String,
    pub prefix: Option<String>,
    pub uri: Option<String>,
    pub methods: Vec<String>,
    pub name: Option<String>,
    pub action_type: ActionType,
    pub action: Option<String>,
    pub entry_id: Option<i64>,
}

/// The runtime editing surface over the persisted tree.
pub struct RouteEditor {
    engine: Arc<RoutingEngine>,
    edit_lock: Mutex<()>,
}

impl RouteEditor {
    pub fn new(engine: Arc<RoutingEngine>) -> Self {
        Self {
            engine,
            edit_lock: Mutex::new(()),
        }
    }

    /// Create a persisted node.
    pub fn create(&self, request: CreateRequest) -> Result<RouteNode, EditError> {
        let _serialized = self.edit_lock.lock().expect("edit lock poisoned");

        if request.readonly == Some(true) {
            return Err(EditError::Invalid(vec![
                "readonly cannot be set on created nodes".to_string(),
            ]));
        }
        if request.record.children.is_some() {
            return Err(EditError::Invalid(vec![
                "created nodes take no inline children; create them separately".to_string(),
            ]));
        }
        validate_record(&request.record).map_err(EditError::Invalid)?;

        let store = self.engine.store();
        if let Some(pid) = request.parent_id {
            if pid < 0 {
                return Err(EditError::Readonly(pid));
            }
            let parent = store.get(pid)?.ok_or(EditError::UnknownParent(pid))?;
            if !parent.is_group() {
                return Err(EditError::Invalid(vec![format!(
                    "parent {} is not a group",
                    pid
                )]));
            }
        }

        let snapshot = self.engine.snapshot();
        match request.record.kind.as_deref() {
            Some("route") => {
                let uri = request.record.uri.clone().unwrap_or_default();
                let methods = request.record.methods.clone().unwrap_or_default();
                let check =
                    snapshot
                        .guard
                        .can_create_route(&uri, &methods, None, request.parent_id)?;
                if !check.allowed {
                    return Err(denial_to_error(check));
                }
            }
            Some("group") => {
                // Nested groups inherit their first segment from the root
                // ancestor, which was already admitted.
                if request.parent_id.is_none() {
                    if let Some(prefix) = request.record.prefix.as_deref() {
                        if snapshot.guard.is_prefix_reserved(prefix) {
                            return Err(EditError::Rejected(format!(
                                "group prefix '{}' falls under a reserved prefix",
                                prefix
                            )));
                        }
                    }
                }
            }
            _ => {}
        }

        let node = node_from_record(&request.record, request.parent_id);
        let created = store.insert(node)?;
        self.engine.recompile()?;
        tracing::info!(node_id = created.id, kind = %created.kind, "Created persisted node");
        Ok(created)
    }

    /// Apply a partial update to a persisted node.
    pub fn update(&self, id: i64, patch: UpdateRequest) -> Result<RouteNode, EditError> {
        let _serialized = self.edit_lock.lock().expect("edit lock poisoned");

        if id < 0 {
            return Err(EditError::Readonly(id));
        }
        let store = self.engine.store();
        let current = store.get(id)?.ok_or(EditError::NotFound(id))?;
        if current.readonly {
            return Err(EditError::Readonly(id));
        }

        let mut node = current.clone();
        apply_patch(&mut node, &patch)?;

        validate_record(&record_from_node(&node)).map_err(EditError::Invalid)?;

        if node.is_route() {
            let uri = node.uri.clone().unwrap_or_default();
            let methods: Vec<String> = node.methods.iter().cloned().collect();
            let snapshot = self.engine.snapshot();
            let check = snapshot
                .guard
                .can_create_route(&uri, &methods, Some(id), node.parent_id)?;
            if !check.allowed {
                return Err(denial_to_error(check));
            }
        }

        store.update(node.clone())?;
        self.engine.recompile()?;
        tracing::info!(node_id = id, "Updated persisted node");
        Ok(node)
    }

    /// Soft-delete a node and all of its descendants.
    pub fn delete(&self, id: i64) -> Result<Vec<i64>, EditError> {
        let _serialized = self.edit_lock.lock().expect("edit lock poisoned");

        if id < 0 {
            return Err(EditError::Readonly(id));
        }
        let store = self.engine.store();
        let node = store.get(id)?.ok_or(EditError::NotFound(id))?;
        if node.readonly {
            return Err(EditError::Readonly(id));
        }

        let rows = store.list()?;
        let mut doomed = vec![id];
        collect_descendants(&rows, id, &mut doomed);
        store.soft_delete(&doomed)?;
        self.engine.recompile()?;
        tracing::info!(node_id = id, cascade = doomed.len() - 1, "Deleted persisted node");
        Ok(doomed)
    }

    /// Re-parent and re-order a batch of nodes atomically.
    pub fn reorder(&self, changes: Vec<ReorderChange>) -> Result<(), EditError> {
        let _serialized = self.edit_lock.lock().expect("edit lock poisoned");
        if changes.is_empty() {
            return Ok(());
        }

        let store = self.engine.store();
        for change in &changes {
            if change.id < 0 {
                return Err(EditError::Readonly(change.id));
            }
            let node = store.get(change.id)?.ok_or(EditError::NotFound(change.id))?;
            if node.readonly {
                return Err(EditError::Readonly(change.id));
            }
            if let Some(pid) = change.parent_id {
                if pid < 0 {
                    return Err(EditError::UnknownParent(pid));
                }
            }
        }

        // The store validates the rest (parents, cycles, sort orders) and
        // applies all rows or none.
        store.reorder(&changes)?;
        self.engine.recompile()?;
        tracing::info!(count = changes.len(), "Reordered persisted nodes");
        Ok(())
    }

    /// Every node from both provenances, tagged with source and readonly.
    pub fn list(&self) -> Result<Vec<NodeSummary>, EditError> {
        let snapshot = self.engine.snapshot();
        let mut out = Vec::new();

        let mut prefix = String::new();
        summarize_forest(&snapshot.declarative, &mut prefix, &mut out);

        let persisted = self.engine.store().get_tree()?;
        let mut prefix = String::new();
        summarize_forest(&persisted, &mut prefix, &mut out);

        Ok(out)
    }
}

fn denial_to_error(check: crate::routing::CreateCheck) -> EditError {
    let reason = check.reason.unwrap_or_else(|| "rejected".to_string());
    match check.conflicting {
        Some(conflict) => EditError::Conflict {
            reason,
            conflicting_id: conflict.id,
            conflicting_path: conflict.full_path,
            conflict_source: conflict.source,
        },
        None => EditError::Rejected(reason),
    }
}

fn collect_descendants(rows: &[RouteNode], parent: i64, out: &mut Vec<i64>) {
    for row in rows {
        if row.parent_id == Some(parent) && !out.contains(&row.id) {
            out.push(row.id);
            collect_descendants(rows, row.id, out);
        }
    }
}

fn summarize_forest(nodes: &[RouteNode], prefix: &mut String, out: &mut Vec<NodeSummary>) {
    for node in nodes {
        let full_path = match node.kind {
            NodeKind::Group => join_paths([prefix.as_str(), node.prefix.as_deref().unwrap_or("")]),
            NodeKind::Route => join_paths([prefix.as_str(), node.uri.as_deref().unwrap_or("")]),
        };
        out.push(NodeSummary {
            id: node.id,
            parent_id: node.parent_id,
            kind: node.kind,
            source: node.source(),
            readonly: node.readonly,
            enabled: node.enabled,
            sort_order: node.sort_order,
            full_path,
            prefix: node.prefix.clone(),
            uri: node.uri.clone(),
            methods: node.methods.iter().cloned().collect(),
            name: node.name.clone(),
            action_type: node.action_type,
            action: node.action.clone(),
            entry_id: node.entry_id,
        });
        if node.is_group() {
            let saved = prefix.clone();
            if let Some(p) = node.prefix.as_deref() {
                *prefix = join_paths([prefix.as_str(), p]);
            }
            summarize_forest(&node.children, prefix, out);
            *prefix = saved;
        }
    }
}

/// Materialize a persisted node from a validated record.
fn node_from_record(record: &NodeRecord, parent_id: Option<i64>) -> RouteNode {
    let kind = match record.kind.as_deref() {
        Some("group") => NodeKind::Group,
        _ => NodeKind::Route,
    };
    let mut node = RouteNode::new(0, kind);
    node.parent_id = parent_id;
    node.enabled = record.enabled.unwrap_or(true);
    node.sort_order = record.sort_order.unwrap_or(0).max(0) as u32;
    node.readonly = false;
    node.domain = record.domain.clone();
    node.middleware = record.middleware.clone().unwrap_or_default();
    node.wheres = record.wheres.clone().unwrap_or_default();
    match kind {
        NodeKind::Group => {
            node.prefix = record.prefix.clone();
            node.namespace = record.namespace.clone();
        }
        NodeKind::Route => {
            node.uri = record.uri.clone();
            node.methods = normalize_methods(record.methods.as_deref().unwrap_or_default());
            node.name = record.name.clone();
            node.action_type = match record.action_type.as_deref() {
                Some("entry") => ActionType::Entry,
                _ => ActionType::Controller,
            };
            node.action = record.action.clone();
            node.entry_id = record.entry_id;
            node.defaults = record.defaults.clone().unwrap_or_default();
        }
    }
    node
}

/// Project a node back into record form so update payloads re-validate.
fn record_from_node(node: &RouteNode) -> NodeRecord {
    NodeRecord {
        kind: Some(node.kind.to_string()),
        enabled: Some(node.enabled),
        sort_order: Some(node.sort_order as i64),
        prefix: node.prefix.clone(),
        domain: node.domain.clone(),
        namespace: node.namespace.clone(),
        middleware: if node.middleware.is_empty() {
            None
        } else {
            Some(node.middleware.clone())
        },
        wheres: if node.wheres.is_empty() {
            None
        } else {
            Some(node.wheres.clone())
        },
        children: None,
        uri: node.uri.clone(),
        methods: if node.is_route() {
            Some(node.methods.iter().cloned().collect())
        } else {
            None
        },
        name: node.name.clone(),
        action_type: if node.is_route() {
            Some(node.action_type.to_string())
        } else {
            None
        },
        action: node.action.clone(),
        entry_id: node.entry_id,
        defaults: if node.defaults.is_empty() {
            None
        } else {
            Some(node.defaults.clone())
        },
    }
}

fn apply_patch(node: &mut RouteNode, patch: &UpdateRequest) -> Result<(), EditError> {
    if let Some(enabled) = patch.enabled {
        node.enabled = enabled;
    }
    if let Some(order) = patch.sort_order {
        if order < 0 {
            return Err(EditError::Invalid(vec![format!(
                "sort_order must be non-negative, got {}",
                order
            )]));
        }
        node.sort_order = order as u32;
    }
    if patch.readonly == Some(true) {
        node.readonly = true;
    }
    if let Some(prefix) = &patch.prefix {
        node.prefix = Some(prefix.clone());
    }
    if let Some(domain) = &patch.domain {
        node.domain = Some(domain.clone());
    }
    if let Some(namespace) = &patch.namespace {
        node.namespace = Some(namespace.clone());
    }
    if let Some(middleware) = &patch.middleware {
        node.middleware = middleware.clone();
    }
    if let Some(wheres) = &patch.wheres {
        node.wheres = wheres.clone();
    }
    if let Some(uri) = &patch.uri {
        node.uri = Some(uri.clone());
    }
    if let Some(methods) = &patch.methods {
        node.methods = normalize_methods(methods);
    }
    if let Some(name) = &patch.name {
        node.name = Some(name.clone());
    }
    if let Some(action_type) = &patch.action_type {
        node.action_type = match action_type.as_str() {
            "controller" => ActionType::Controller,
            "entry" => ActionType::Entry,
            other => {
                return Err(EditError::Invalid(vec![format!(
                    "invalid action_type '{}'",
                    other
                )]))
            }
        };
        // Switching families drops the other family's payload.
        match node.action_type {
            ActionType::Controller => node.entry_id = None,
            ActionType::Entry => node.action = None,
        }
    }
    if let Some(action) = &patch.action {
        node.action = Some(action.clone());
    }
    if let Some(entry_id) = patch.entry_id {
        node.entry_id = Some(entry_id);
    }
    if let Some(defaults) = &patch.defaults {
        node.defaults = defaults.clone();
    }
    Ok(())
}
