use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::model::{Label, RelationKind, Word};
use crate::graph::{query, GraphStore};

// ========== Types ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub word: Word,
    pub relation: RelationKind,
    /// Lowest numeric backbone id linked to the word's first character.
    pub backbone_id: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateLevelCount {
    pub relation: RelationKind,
    pub level: u8,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCount {
    pub level: u8,
    pub count: u64,
}

/// Global curriculum coverage, one list per measure. Levels with a zero count
/// are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackboneCoverage {
    pub connected_characters: Vec<LevelCount>,
    pub disconnected_characters: Vec<LevelCount>,
    pub words_via_backbone: Vec<LevelCount>,
}

// ========== Service Implementation ==========

/// Up to `n` words the user holds in `state`, restricted to words whose every
/// character is in the backbone.
///
/// Ordered by level, then unique-key length, then earliest backbone id of the
/// first character, then unique key.
pub fn top_n<S: GraphStore>(
    store: &S,
    user: &str,
    state: RelationKind,
    n: usize,
) -> Vec<Recommendation> {
    if n == 0 {
        return Vec::new();
    }
    let graph = store.read();
    let Some(person_id) = query::person_id(&graph, user) else {
        return Vec::new();
    };

    let mut candidates: Vec<Recommendation> = query::words_in_state(&graph, person_id, state)
        .into_iter()
        .map(|edge| edge.to)
        .filter(|word_id| query::word_in_backbone(&graph, *word_id))
        .filter_map(|word_id| {
            let word = graph.word(word_id)?.clone();
            Some(Recommendation {
                backbone_id: query::earliest_backbone_id(&graph, word_id),
                word,
                relation: state,
            })
        })
        .collect();

    candidates.sort_by(|a, b| rank_key(a).cmp(&rank_key(b)));
    candidates.truncate(n);

    tracing::debug!(user = %user, state = state.as_str(), returned = candidates.len(), "top words");
    candidates
}

fn rank_key(rec: &Recommendation) -> (u8, usize, u32, &str) {
    (
        rec.word.level,
        rec.word.unique.chars().count(),
        rec.backbone_id.unwrap_or(u32::MAX),
        rec.word.unique.as_str(),
    )
}

/// Counts of the user's relations grouped by (relation, word level).
pub fn user_level_counts<S: GraphStore>(store: &S, user: &str) -> Vec<StateLevelCount> {
    let graph = store.read();
    let Some(person_id) = query::person_id(&graph, user) else {
        return Vec::new();
    };

    let mut counts: BTreeMap<(RelationKind, u8), u64> = BTreeMap::new();
    for state in RelationKind::ALL {
        for edge in query::words_in_state(&graph, person_id, state) {
            if let Some(word) = graph.word(edge.to) {
                *counts.entry((state, word.level)).or_insert(0) += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|((relation, level), count)| StateLevelCount {
            relation,
            level,
            count,
        })
        .collect()
}

/// Per-level counts of backbone coverage, independent of any user.
pub fn backbone_coverage_counts<S: GraphStore>(store: &S) -> BackboneCoverage {
    let graph = store.read();

    let mut connected: BTreeMap<u8, u64> = BTreeMap::new();
    let mut disconnected: BTreeMap<u8, u64> = BTreeMap::new();
    let mut via_backbone: BTreeMap<u8, u64> = BTreeMap::new();

    for word_id in graph.nodes(Label::Word) {
        let Some(word) = graph.word(word_id) else {
            continue;
        };
        if query::word_touches_backbone(&graph, word_id) {
            *via_backbone.entry(word.level).or_insert(0) += 1;
        }
        if word.char_len() == 1 {
            let target = if query::word_in_backbone(&graph, word_id) {
                &mut connected
            } else {
                &mut disconnected
            };
            *target.entry(word.level).or_insert(0) += 1;
        }
    }

    let to_counts = |map: BTreeMap<u8, u64>| -> Vec<LevelCount> {
        map.into_iter()
            .map(|(level, count)| LevelCount { level, count })
            .collect()
    };

    BackboneCoverage {
        connected_characters: to_counts(connected),
        disconnected_characters: to_counts(disconnected),
        words_via_backbone: to_counts(via_backbone),
    }
}
