use std::collections::HashMap;
use std::ops::Deref;

use parking_lot::{RwLock, RwLockReadGuard};
use uuid::Uuid;

use super::model::{
    BackboneNode, Character, Edge, EdgeKind, EdgeProps, Label, Node, NodeId, Person, Radical, Word,
};
use super::GraphError;

/// Shared handle over a [`Graph`].
///
/// Every read query runs against one snapshot so it never observes half of a
/// mutation; every mutation runs inside one `write` call, which is the unit of
/// atomicity for multi-step edits such as replacing a knowledge relation.
pub trait GraphStore: Send + Sync {
    type Snapshot<'a>: Deref<Target = Graph>
    where
        Self: 'a;

    fn read(&self) -> Self::Snapshot<'_>;

    fn write<R>(&self, f: impl FnOnce(&mut Graph) -> R) -> R;
}

#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    inner: RwLock<Graph>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graph(graph: Graph) -> Self {
        Self {
            inner: RwLock::new(graph),
        }
    }
}

impl GraphStore for MemoryGraphStore {
    type Snapshot<'a> = RwLockReadGuard<'a, Graph>;

    fn read(&self) -> Self::Snapshot<'_> {
        self.inner.read()
    }

    fn write<R>(&self, f: impl FnOnce(&mut Graph) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }
}

/// Typed nodes plus per-node outgoing and incoming edge lists.
///
/// Edge lists keep insertion order, which is the iteration order every query
/// observes.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<(Label, String), NodeId>,
    by_label: HashMap<Label, Vec<NodeId>>,
    outgoing: HashMap<NodeId, Vec<Edge>>,
    incoming: HashMap<NodeId, Vec<Edge>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Nodes ==========

    pub fn create_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        let label = node.label();
        let key = node.key().to_string();
        if self.index.contains_key(&(label, key.clone())) {
            return Err(GraphError::DuplicateKey { label, key });
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.index.insert((label, key), id);
        self.by_label.entry(label).or_default().push(id);
        Ok(id)
    }

    /// Returns the existing node with the same label and key, or creates it.
    pub fn merge_node(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.lookup(node.label(), node.key()) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        let label = node.label();
        self.index.insert((label, node.key().to_string()), id);
        self.nodes.push(node);
        self.by_label.entry(label).or_default().push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn lookup(&self, label: Label, key: &str) -> Option<NodeId> {
        self.index.get(&(label, key.to_string())).copied()
    }

    /// Node ids with `label`, in creation order.
    pub fn nodes(&self, label: Label) -> impl Iterator<Item = NodeId> + '_ {
        self.by_label
            .get(&label)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    pub fn find_nodes(&self, label: Label, filter: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        self.nodes(label)
            .filter(|id| self.node(*id).is_some_and(&filter))
            .collect()
    }

    pub fn count(&self, label: Label) -> usize {
        self.by_label.get(&label).map_or(0, Vec::len)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn word(&self, id: NodeId) -> Option<&Word> {
        match self.node(id)? {
            Node::Word(word) => Some(word),
            _ => None,
        }
    }

    pub fn character(&self, id: NodeId) -> Option<&Character> {
        match self.node(id)? {
            Node::Character(character) => Some(character),
            _ => None,
        }
    }

    pub fn radical(&self, id: NodeId) -> Option<&Radical> {
        match self.node(id)? {
            Node::Radical(radical) => Some(radical),
            _ => None,
        }
    }

    pub fn backbone(&self, id: NodeId) -> Option<&BackboneNode> {
        match self.node(id)? {
            Node::Backbone(node) => Some(node),
            _ => None,
        }
    }

    pub fn person(&self, id: NodeId) -> Option<&Person> {
        match self.node(id)? {
            Node::Person(person) => Some(person),
            _ => None,
        }
    }

    // ========== Edges ==========

    pub fn create_edge(
        &mut self,
        kind: EdgeKind,
        from: NodeId,
        to: NodeId,
        props: EdgeProps,
    ) -> Result<Uuid, GraphError> {
        let from_label = self.node(from).ok_or(GraphError::UnknownNode(from))?.label();
        let to_label = self.node(to).ok_or(GraphError::UnknownNode(to))?.label();
        if kind.endpoints() != (from_label, to_label) {
            return Err(GraphError::EndpointMismatch {
                kind,
                from: from_label,
                to: to_label,
            });
        }

        let edge = Edge {
            id: Uuid::new_v4(),
            kind,
            from,
            to,
            props,
        };
        let id = edge.id;
        self.incoming.entry(to).or_default().push(edge.clone());
        self.outgoing.entry(from).or_default().push(edge);
        Ok(id)
    }

    pub fn has_edge(&self, kind: EdgeKind, from: NodeId, to: NodeId) -> bool {
        self.outgoing(from, kind).any(|edge| edge.to == to)
    }

    /// Removes every `kind` edge from `from` to `to`, returning how many went.
    pub fn delete_edge(&mut self, kind: EdgeKind, from: NodeId, to: NodeId) -> usize {
        let matches = |edge: &Edge| edge.kind == kind && edge.from == from && edge.to == to;
        let mut removed = 0;
        if let Some(edges) = self.outgoing.get_mut(&from) {
            let before = edges.len();
            edges.retain(|edge| !matches(edge));
            removed = before - edges.len();
        }
        if let Some(edges) = self.incoming.get_mut(&to) {
            edges.retain(|edge| !matches(edge));
        }
        removed
    }

    pub fn remove_edge(&mut self, from: NodeId, id: Uuid) -> Option<Edge> {
        let edges = self.outgoing.get_mut(&from)?;
        let pos = edges.iter().position(|edge| edge.id == id)?;
        let edge = edges.remove(pos);
        if let Some(incoming) = self.incoming.get_mut(&edge.to) {
            incoming.retain(|candidate| candidate.id != id);
        }
        Some(edge)
    }

    pub fn outgoing(&self, from: NodeId, kind: EdgeKind) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing
            .get(&from)
            .map(|edges| edges.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter(move |edge| edge.kind == kind)
    }

    pub fn incoming(&self, to: NodeId, kind: EdgeKind) -> impl Iterator<Item = &Edge> + '_ {
        self.incoming
            .get(&to)
            .map(|edges| edges.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter(move |edge| edge.kind == kind)
    }

    /// All edges from `from` to `to`, of any kind.
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing
            .get(&from)
            .map(|edges| edges.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter(move |edge| edge.to == to)
    }

    pub fn edge_count(&self, kind: EdgeKind) -> usize {
        self.outgoing
            .values()
            .map(|edges| edges.iter().filter(|edge| edge.kind == kind).count())
            .sum()
    }
}
