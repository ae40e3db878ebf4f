//! The route node entity shared by both provenances.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Node kind: a scoping group or a dispatchable route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Group,
    Route,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Group => write!(f, "group"),
            NodeKind::Route => write!(f, "route"),
        }
    }
}

/// How a route dispatches once matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    #[default]
    Controller,
    Entry,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Controller => write!(f, "controller"),
            ActionType::Entry => write!(f, "entry"),
        }
    }
}

/// Which provenance a node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSource {
    Declarative,
    Database,
}

impl NodeSource {
    /// Human-readable provenance for conflict diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            NodeSource::Declarative => "declarative file",
            NodeSource::Database => "persisted store",
        }
    }
}

/// One entry in the route forest.
///
/// Group-only fields are `prefix` and `namespace`; route-only fields are
/// `uri`, `methods`, `name`, `action_type`, `action`, `entry_id` and
/// `defaults`. `domain`, `middleware` and `wheres` apply to both kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteNode {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub kind: NodeKind,
    pub sort_order: u32,
    pub enabled: bool,
    pub readonly: bool,
    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub middleware: Vec<String>,
    #[serde(default)]
    pub wheres: BTreeMap<String, String>,

    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub methods: BTreeSet<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub action_type: ActionType,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub entry_id: Option<i64>,
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    /// Attached when a tree is hydrated; never persisted.
    #[serde(skip)]
    pub children: Vec<RouteNode>,
}

impl RouteNode {
    /// A bare node of the given kind; callers fill in the rest.
    pub fn new(id: i64, kind: NodeKind) -> Self {
        Self {
            id,
            parent_id: None,
            kind,
            sort_order: 0,
            enabled: true,
            readonly: false,
            deleted: false,
            prefix: None,
            namespace: None,
            domain: None,
            middleware: Vec::new(),
            wheres: BTreeMap::new(),
            uri: None,
            methods: BTreeSet::new(),
            name: None,
            action_type: ActionType::default(),
            action: None,
            entry_id: None,
            defaults: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    pub fn is_route(&self) -> bool {
        self.kind == NodeKind::Route
    }

    /// Provenance is encoded in the id sign.
    pub fn source(&self) -> NodeSource {
        if self.id < 0 {
            NodeSource::Declarative
        } else {
            NodeSource::Database
        }
    }

    /// Sort a sibling collection by the stable sibling order, then id.
    pub fn sort_siblings(nodes: &mut [RouteNode]) {
        nodes.sort_by_key(|n| (n.sort_order, n.id));
    }
}

/// A node hydrated together with its full parent chain, nearest first.
#[derive(Debug, Clone)]
pub struct NodeWithAncestors {
    pub node: RouteNode,
    /// Immediate parent first, root last.
    pub ancestors: Vec<RouteNode>,
}

impl NodeWithAncestors {
    /// The node itself followed by its ancestors, nearest first.
    ///
    /// This is the chain the path builder consumes when the node is the
    /// attachment point for a candidate route.
    pub fn chain(&self) -> impl Iterator<Item = &RouteNode> {
        std::iter::once(&self.node).chain(self.ancestors.iter())
    }
}
