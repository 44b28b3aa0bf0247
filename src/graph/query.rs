//! Typed traversals over a [`Graph`]. Each function is one fixed path shape.

use std::collections::BTreeMap;

use super::model::{Edge, EdgeKind, Label, NodeId, RelationKind};
use super::store::Graph;

pub fn person_id(graph: &Graph, name: &str) -> Option<NodeId> {
    graph.lookup(Label::Person, name)
}

pub fn word_id(graph: &Graph, unique: &str) -> Option<NodeId> {
    graph.lookup(Label::Word, unique)
}

pub fn backbone_node(graph: &Graph, backbone_id: &str) -> Option<NodeId> {
    graph.lookup(Label::Backbone, backbone_id)
}

/// `(person)-[IGNORES|LEARNING|KNOWS]->(word)` edges, oldest first.
pub fn relation_edges(graph: &Graph, person: NodeId, word: NodeId) -> Vec<&Edge> {
    graph
        .edges_between(person, word)
        .filter(|edge| edge.kind.is_relation())
        .collect()
}

/// The pair's relation for read views. When duplicates exist the most recent
/// edge wins; writers detect that case separately.
pub fn latest_relation(graph: &Graph, person: NodeId, word: NodeId) -> Option<RelationKind> {
    relation_edges(graph, person, word)
        .into_iter()
        .max_by_key(|edge| edge.props.created_at)
        .and_then(|edge| RelationKind::from_edge_kind(edge.kind))
}

/// `(person)-[state]->(word)` targets in edge creation order.
pub fn words_in_state(graph: &Graph, person: NodeId, state: RelationKind) -> Vec<&Edge> {
    graph.outgoing(person, state.edge_kind()).collect()
}

/// `(word)-[HAS_CHARACTER]->(ch)` ordered by position in the word.
pub fn word_characters(graph: &Graph, word: NodeId) -> Vec<NodeId> {
    let mut edges: Vec<&Edge> = graph.outgoing(word, EdgeKind::HasCharacter).collect();
    edges.sort_by_key(|edge| edge.props.position.unwrap_or(usize::MAX));
    edges.into_iter().map(|edge| edge.to).collect()
}

/// `(b:Backbone)-[IS_CHARACTER]->(ch)`.
pub fn backbone_nodes_for_character(graph: &Graph, character: NodeId) -> Vec<NodeId> {
    graph
        .incoming(character, EdgeKind::IsCharacter)
        .map(|edge| edge.from)
        .collect()
}

pub fn character_in_backbone(graph: &Graph, character: NodeId) -> bool {
    graph.incoming(character, EdgeKind::IsCharacter).next().is_some()
}

/// True when every character of the word is represented in the backbone.
pub fn word_in_backbone(graph: &Graph, word: NodeId) -> bool {
    let characters = word_characters(graph, word);
    !characters.is_empty()
        && characters
            .iter()
            .all(|ch| character_in_backbone(graph, *ch))
}

/// True when at least one character of the word is represented in the backbone.
pub fn word_touches_backbone(graph: &Graph, word: NodeId) -> bool {
    word_characters(graph, word)
        .iter()
        .any(|ch| character_in_backbone(graph, *ch))
}

/// Lowest numeric backbone id linked to the word's first character.
pub fn earliest_backbone_id(graph: &Graph, word: NodeId) -> Option<u32> {
    let first = *word_characters(graph, word).first()?;
    backbone_nodes_for_character(graph, first)
        .into_iter()
        .filter_map(|id| graph.backbone(id).and_then(|node| node.numeric_id()))
        .min()
}

/// `(w:Word)-[HAS_CHARACTER]->(ch)`.
pub fn words_with_character(graph: &Graph, character: NodeId) -> Vec<NodeId> {
    graph
        .incoming(character, EdgeKind::HasCharacter)
        .map(|edge| edge.from)
        .collect()
}

/// `(part:Backbone)-[PART_OF]->(node)`.
pub fn backbone_parts(graph: &Graph, node: NodeId) -> Vec<NodeId> {
    graph
        .incoming(node, EdgeKind::PartOf)
        .map(|edge| edge.from)
        .collect()
}

/// `(node)-[PART_OF]->(composite:Backbone)`.
pub fn backbone_composites(graph: &Graph, node: NodeId) -> Vec<NodeId> {
    graph
        .outgoing(node, EdgeKind::PartOf)
        .map(|edge| edge.to)
        .collect()
}

pub fn linked(graph: &Graph, from: NodeId, kind: EdgeKind) -> Option<NodeId> {
    graph.outgoing(from, kind).next().map(|edge| edge.to)
}

pub fn has_any_relation(graph: &Graph, person: NodeId) -> bool {
    RelationKind::ALL
        .iter()
        .any(|kind| graph.outgoing(person, kind.edge_kind()).next().is_some())
}

pub fn node_counts(graph: &Graph) -> BTreeMap<Label, usize> {
    Label::ALL
        .iter()
        .map(|label| (*label, graph.count(*label)))
        .collect()
}
