use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::graph::model::{EdgeKind, Label, NodeId, RelationKind, Word};
use crate::graph::{query, Graph, GraphStore};

pub const DEFAULT_RADIUS: usize = 3;

// ========== Types ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackboneEntry {
    pub backbone_id: String,
    pub numeric_id: u32,
    pub simp: String,
    /// Unique key of the word sharing this node's glyph.
    pub word: Option<String>,
    pub relation: Option<RelationKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackboneRef {
    pub backbone_id: String,
    pub simp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCharacter {
    pub simp: String,
    pub freq_rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordWithRelation {
    pub word: Word,
    pub relation: Option<RelationKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetail {
    pub backbone_id: String,
    pub simp: String,
    /// `None` when no word uses the node's character.
    pub character: Option<RankedCharacter>,
    pub parts: Vec<BackboneRef>,
    pub composites: Vec<BackboneRef>,
    pub words: Vec<WordWithRelation>,
}

// ========== Service Implementation ==========

/// Backbone nodes with numeric ids in ascending order, each annotated with the
/// user's relation to the word sharing its glyph. Suffixed ids (`10a`) are
/// not part of the ordered sequence.
pub fn full_sequence<S: GraphStore>(store: &S, user: Option<&str>) -> Vec<BackboneEntry> {
    let graph = store.read();
    let person_id = user.and_then(|name| query::person_id(&graph, name));

    let mut skipped = 0usize;
    let mut entries: Vec<BackboneEntry> = graph
        .nodes(Label::Backbone)
        .filter_map(|id| {
            let node = graph.backbone(id)?;
            let Some(numeric_id) = node.numeric_id() else {
                skipped += 1;
                return None;
            };
            let word_id = query::linked(&graph, id, EdgeKind::IsWord);
            let relation = match (person_id, word_id) {
                (Some(person_id), Some(word_id)) => {
                    query::latest_relation(&graph, person_id, word_id)
                }
                _ => None,
            };
            Some(BackboneEntry {
                backbone_id: node.backbone_id.clone(),
                numeric_id,
                simp: node.simp.clone(),
                word: word_id.and_then(|w| graph.word(w)).map(|w| w.unique.clone()),
                relation,
            })
        })
        .collect();

    entries.sort_by_key(|entry| entry.numeric_id);
    if skipped > 0 {
        tracing::warn!(skipped, "non-numeric backbone ids left out of sequence");
    }
    tracing::debug!(nodes = entries.len(), "backbone sequence");
    entries
}

/// Slice of `sequence` around the node with numeric id `backbone_id`.
///
/// Ids are 1-based: the target sits at index `backbone_id - 1`, and the slice
/// spans `radius` entries either side, clamped to the sequence. An id of 0 or
/// past the end yields an empty slice.
pub fn window<T>(sequence: &[T], backbone_id: u32, radius: usize) -> &[T] {
    let Some(position) = (backbone_id as usize).checked_sub(1) else {
        return &[];
    };
    if position >= sequence.len() {
        return &[];
    }
    let lower = position.saturating_sub(radius);
    let upper = position.saturating_add(radius).min(sequence.len() - 1);
    &sequence[lower..=upper]
}

/// Detail view of one backbone node for `user` (or a guest).
///
/// An empty id is a caller error; an unknown id gives `Ok(None)`.
pub fn node_detail<S: GraphStore>(
    store: &S,
    user: Option<&str>,
    backbone_id: &str,
) -> CoreResult<Option<NodeDetail>> {
    let backbone_id = backbone_id.trim();
    if backbone_id.is_empty() {
        return Err(CoreError::InvalidInput("backbone id is required".to_string()));
    }

    let graph = store.read();
    let Some(node_id) = query::backbone_node(&graph, backbone_id) else {
        return Ok(None);
    };
    let Some(node) = graph.backbone(node_id) else {
        return Ok(None);
    };
    let person_id = user.and_then(|name| query::person_id(&graph, name));

    let character_id = query::linked(&graph, node_id, EdgeKind::IsCharacter);
    let word_ids = character_id
        .map(|ch| query::words_with_character(&graph, ch))
        .unwrap_or_default();

    let character = match character_id {
        Some(ch) if !word_ids.is_empty() => graph.character(ch).map(|c| RankedCharacter {
            simp: c.simp.clone(),
            freq_rank: c.freq_rank,
        }),
        _ => None,
    };

    let parts = query::backbone_parts(&graph, node_id)
        .into_iter()
        .filter_map(|id| backbone_ref(&graph, id))
        .filter(|part| part.simp != node.simp)
        .collect();
    let composites = query::backbone_composites(&graph, node_id)
        .into_iter()
        .filter_map(|id| backbone_ref(&graph, id))
        .collect();

    let mut words: Vec<WordWithRelation> = word_ids
        .into_iter()
        .filter_map(|id| {
            let word = graph.word(id)?.clone();
            let relation = person_id.and_then(|p| query::latest_relation(&graph, p, id));
            Some(WordWithRelation { word, relation })
        })
        .collect();
    words.sort_by(|a, b| {
        (a.word.level, a.word.char_len(), &a.word.unique).cmp(&(
            b.word.level,
            b.word.char_len(),
            &b.word.unique,
        ))
    });

    Ok(Some(NodeDetail {
        backbone_id: node.backbone_id.clone(),
        simp: node.simp.clone(),
        character,
        parts,
        composites,
        words,
    }))
}

fn backbone_ref(graph: &Graph, id: NodeId) -> Option<BackboneRef> {
    graph.backbone(id).map(|node| BackboneRef {
        backbone_id: node.backbone_id.clone(),
        simp: node.simp.clone(),
    })
}
