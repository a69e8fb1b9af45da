//! The node store: single owner of every node on the canvas.
//!
//! Nodes are kept in insertion order, which is also paint order (later nodes
//! draw on top). An id → index map gives O(1) lookup; it is rebuilt on
//! removal so the order of the remaining nodes never changes.
//!
//! Hosts either call the typed methods directly or replay [`StoreMutation`]s
//! through [`NodeStore::apply`].

use crate::id::NodeId;
use crate::model::{Node, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rejected store operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("node {0} already exists")]
    DuplicateId(NodeId),
    #[error("no node with id {0}")]
    UnknownNode(NodeId),
}

/// A replayable change to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum StoreMutation {
    AddNode { node: Box<Node> },
    /// Replace a node's kind and content, e.g. when a `Loading` placeholder
    /// resolves into a response.
    UpdateContent {
        id: NodeId,
        kind: NodeKind,
        content: String,
    },
    MoveNode { id: NodeId, x: f64, y: f64 },
    RemoveNode { id: NodeId },
    SetLoading { loading: bool },
}

#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    loading: bool,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an ordered list, rejecting duplicate ids.
    ///
    /// # Errors
    /// Returns [`StoreError::DuplicateId`] for the first repeated id.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for node in nodes {
            store.add_node(node)?;
        }
        Ok(store)
    }

    // ─── Mutation API ────────────────────────────────────────────────────

    /// Append a node (it becomes the topmost).
    ///
    /// # Errors
    /// Returns [`StoreError::DuplicateId`] if a node with the same id exists.
    pub fn add_node(&mut self, node: Node) -> Result<(), StoreError> {
        if self.index.contains_key(&node.id) {
            return Err(StoreError::DuplicateId(node.id));
        }
        log::debug!(
            "add {} {} at ({}, {}) parent={:?}",
            node.kind.as_str(),
            node.id,
            node.x,
            node.y,
            node.parent_id
        );
        self.index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Mutate a node in place. The closure must not change the node's id.
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownNode`] if `id` is not in the store.
    pub fn update_node(
        &mut self,
        id: NodeId,
        update: impl FnOnce(&mut Node),
    ) -> Result<(), StoreError> {
        let &idx = self.index.get(&id).ok_or(StoreError::UnknownNode(id))?;
        let node = &mut self.nodes[idx];
        update(&mut *node);
        // Keep the index honest even if the closure misbehaved.
        node.id = id;
        Ok(())
    }

    /// Remove a node, keeping the relative order of the rest.
    ///
    /// Children keep their (now dangling) `parent_id`; their connectors are
    /// simply no longer drawn.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let idx = self.index.remove(&id)?;
        let node = self.nodes.remove(idx);
        for (i, n) in self.nodes.iter().enumerate().skip(idx) {
            self.index.insert(n.id, i);
        }
        log::debug!("remove {id}");
        Some(node)
    }

    /// Commit a node's content-space position (the drag commit).
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownNode`] if the node was removed mid-drag.
    pub fn update_node_position(&mut self, id: NodeId, x: f64, y: f64) -> Result<(), StoreError> {
        self.update_node(id, |node| {
            node.x = x;
            node.y = y;
        })?;
        log::trace!("move {id} → ({x}, {y})");
        Ok(())
    }

    pub fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            log::debug!("loading = {loading}");
        }
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Apply a replayable mutation.
    ///
    /// # Errors
    /// Propagates the error of the underlying operation; removing an unknown
    /// node is reported as [`StoreError::UnknownNode`].
    pub fn apply(&mut self, mutation: StoreMutation) -> Result<(), StoreError> {
        match mutation {
            StoreMutation::AddNode { node } => self.add_node(*node),
            StoreMutation::UpdateContent { id, kind, content } => self.update_node(id, |node| {
                node.kind = kind;
                node.content = content;
            }),
            StoreMutation::MoveNode { id, x, y } => self.update_node_position(id, x, y),
            StoreMutation::RemoveNode { id } => self
                .remove_node(id)
                .map(|_| ())
                .ok_or(StoreError::UnknownNode(id)),
            StoreMutation::SetLoading { loading } => {
                self.set_loading(loading);
                Ok(())
            }
        }
    }

    // ─── Read API ────────────────────────────────────────────────────────

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Nodes in insertion (paint) order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Existing children of `parent`, in insertion order.
    pub fn children_of(&self, parent: NodeId) -> impl Iterator<Item = &Node> + '_ {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id == Some(parent))
    }

    /// The node's parent, if it has one and it still exists.
    pub fn parent_of(&self, id: NodeId) -> Option<&Node> {
        self.get(id)?.parent_id.and_then(|p| self.get(p))
    }
}
