use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::graph::model::{EdgeProps, Label, Node, Person, RelationKind, Word};
use crate::graph::{query, Graph, GraphStore, NodeId};

const ALLOWED_TRANSITIONS: [(RelationKind, RelationKind); 3] = [
    (RelationKind::Ignores, RelationKind::Learning),
    (RelationKind::Learning, RelationKind::Knows),
    (RelationKind::Knows, RelationKind::Learning),
];

// ========== Types ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeRelation {
    pub id: Uuid,
    pub user: String,
    pub word: String,
    pub kind: RelationKind,
    pub created_at: DateTime<Utc>,
}

/// Most recent activity for a user in one state. `word` is `None` when the
/// user has no word in that state, and `at` is then the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastActivity {
    pub word: Option<Word>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum RepairOutcome {
    Unchanged { kind: RelationKind },
    Recreated { kind: RelationKind },
    Collapsed { kept: RelationKind, removed: usize },
}

// ========== Service Implementation ==========

pub fn is_allowed_transition(from: RelationKind, to: RelationKind) -> bool {
    ALLOWED_TRANSITIONS.contains(&(from, to))
}

/// Creates a Person and gives it an IGNORES relation to every existing word.
pub fn register_user<S: GraphStore>(
    store: &S,
    name: &str,
    password_hash: &str,
) -> CoreResult<Person> {
    let name = name.trim();
    if name.is_empty() || password_hash.is_empty() {
        return Err(CoreError::InvalidInput(
            "user name and password hash are required".to_string(),
        ));
    }

    let person = Person {
        name: name.to_string(),
        password_hash: password_hash.to_string(),
    };

    let words = store.write(|graph| -> CoreResult<usize> {
        if query::person_id(graph, name).is_some() {
            return Err(CoreError::UserExists(name.to_string()));
        }
        let person_id = graph.create_node(Node::Person(person.clone()))?;
        let now = Utc::now();
        let words: Vec<_> = graph.nodes(Label::Word).collect();
        for word_id in &words {
            graph.create_edge(
                RelationKind::Ignores.edge_kind(),
                person_id,
                *word_id,
                EdgeProps::stamped(now),
            )?;
        }
        Ok(words.len())
    })?;

    tracing::info!(user = %name, words, "registered user");
    Ok(person)
}

pub fn find_user<S: GraphStore>(store: &S, name: &str) -> Option<Person> {
    let graph = store.read();
    let id = query::person_id(&graph, name)?;
    graph.person(id).cloned()
}

/// Distinguishes a signed-in learner from a guest.
pub fn has_any_relation<S: GraphStore>(store: &S, name: &str) -> bool {
    let graph = store.read();
    query::person_id(&graph, name).is_some_and(|id| query::has_any_relation(&graph, id))
}

/// Current relation of `user` to the word with unique key `word`.
///
/// Unknown users or words give `Ok(None)`; more than one relation edge is
/// reported as [`CoreError::InconsistentState`].
pub fn relation<S: GraphStore>(
    store: &S,
    user: &str,
    word: &str,
) -> CoreResult<Option<RelationKind>> {
    let graph = store.read();
    let person_id = query::person_id(&graph, user);
    let word_id = query::word_id(&graph, word);
    let (Some(person_id), Some(word_id)) = (person_id, word_id) else {
        return Ok(None);
    };
    let edges = query::relation_edges(&graph, person_id, word_id);
    match edges.as_slice() {
        [] => Ok(None),
        [edge] => Ok(RelationKind::from_edge_kind(edge.kind)),
        _ => Err(CoreError::InconsistentState {
            user: user.to_string(),
            word: word.to_string(),
            found: edges.len(),
        }),
    }
}

/// Replaces the `from` relation with a fresh `to` relation.
///
/// Runs as one store transaction: the current relation is read and compared
/// against `from`, then swapped. A pair holding zero or several relations is
/// refused with [`CoreError::InconsistentState`]; see [`repair`].
pub fn advance<S: GraphStore>(
    store: &S,
    user: &str,
    word: &str,
    from: RelationKind,
    to: RelationKind,
) -> CoreResult<KnowledgeRelation> {
    if user.trim().is_empty() || word.trim().is_empty() {
        return Err(CoreError::InvalidInput(
            "user and word are required".to_string(),
        ));
    }
    if !is_allowed_transition(from, to) {
        return Err(CoreError::InvalidInput(format!(
            "transition {} -> {} is not allowed",
            from.as_str(),
            to.as_str()
        )));
    }

    let relation = store.write(|graph| -> CoreResult<KnowledgeRelation> {
        let person_id = query::person_id(graph, user)
            .ok_or_else(|| CoreError::NotFound(format!("user {user}")))?;
        let word_id = query::word_id(graph, word)
            .ok_or_else(|| CoreError::NotFound(format!("word {word}")))?;

        let current = single_relation(graph, user, word, person_id, word_id)?;
        if current != from {
            return Err(CoreError::StaleTransition {
                expected: from,
                actual: current,
            });
        }

        graph.delete_edge(from.edge_kind(), person_id, word_id);
        let created_at = Utc::now();
        let id = graph.create_edge(
            to.edge_kind(),
            person_id,
            word_id,
            EdgeProps::stamped(created_at),
        )?;

        let after = single_relation(graph, user, word, person_id, word_id)?;
        debug_assert_eq!(after, to);

        Ok(KnowledgeRelation {
            id,
            user: user.to_string(),
            word: word.to_string(),
            kind: to,
            created_at,
        })
    })?;

    tracing::info!(
        user = %user,
        word = %word,
        from = from.as_str(),
        to = to.as_str(),
        "knowledge relation advanced"
    );
    Ok(relation)
}

fn single_relation(
    graph: &Graph,
    user: &str,
    word: &str,
    person_id: NodeId,
    word_id: NodeId,
) -> CoreResult<RelationKind> {
    let edges = query::relation_edges(graph, person_id, word_id);
    match edges.as_slice() {
        [edge] => RelationKind::from_edge_kind(edge.kind).ok_or_else(|| {
            CoreError::InconsistentState {
                user: user.to_string(),
                word: word.to_string(),
                found: 0,
            }
        }),
        _ => Err(CoreError::InconsistentState {
            user: user.to_string(),
            word: word.to_string(),
            found: edges.len(),
        }),
    }
}

/// Restores exactly one relation for the pair.
///
/// Duplicates collapse onto the most recently created edge; a pair with no
/// relation gets a fresh IGNORES.
pub fn repair<S: GraphStore>(store: &S, user: &str, word: &str) -> CoreResult<RepairOutcome> {
    let outcome = store.write(|graph| -> CoreResult<RepairOutcome> {
        let person_id = query::person_id(graph, user)
            .ok_or_else(|| CoreError::NotFound(format!("user {user}")))?;
        let word_id = query::word_id(graph, word)
            .ok_or_else(|| CoreError::NotFound(format!("word {word}")))?;

        let mut edges: Vec<_> = query::relation_edges(graph, person_id, word_id)
            .into_iter()
            .cloned()
            .collect();

        match edges.len() {
            0 => {
                graph.create_edge(
                    RelationKind::Ignores.edge_kind(),
                    person_id,
                    word_id,
                    EdgeProps::stamped(Utc::now()),
                )?;
                Ok(RepairOutcome::Recreated {
                    kind: RelationKind::Ignores,
                })
            }
            1 => Ok(RepairOutcome::Unchanged {
                kind: RelationKind::from_edge_kind(edges[0].kind).unwrap_or(RelationKind::Ignores),
            }),
            _ => {
                edges.sort_by_key(|edge| edge.props.created_at);
                let keep = edges.pop().map(|edge| edge.kind);
                for edge in &edges {
                    graph.remove_edge(person_id, edge.id);
                }
                Ok(RepairOutcome::Collapsed {
                    kept: keep
                        .and_then(RelationKind::from_edge_kind)
                        .unwrap_or(RelationKind::Ignores),
                    removed: edges.len(),
                })
            }
        }
    })?;

    if !matches!(outcome, RepairOutcome::Unchanged { .. }) {
        tracing::warn!(user = %user, word = %word, ?outcome, "repaired knowledge relation");
    }
    Ok(outcome)
}

/// Word most recently moved into `state` by `user`.
pub fn last_activity<S: GraphStore>(store: &S, user: &str, state: RelationKind) -> LastActivity {
    let graph = store.read();
    let latest = query::person_id(&graph, user).and_then(|person_id| {
        query::words_in_state(&graph, person_id, state)
            .into_iter()
            .filter_map(|edge| edge.props.created_at.map(|at| (at, edge.to)))
            .max_by_key(|(at, _)| *at)
    });

    match latest.and_then(|(at, word_id)| graph.word(word_id).map(|word| (at, word.clone()))) {
        Some((at, word)) => LastActivity {
            word: Some(word),
            at,
        },
        None => LastActivity {
            word: None,
            at: DateTime::<Utc>::UNIX_EPOCH,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::seed::{Dataset, Seeder, WordRecord};
    use crate::graph::MemoryGraphStore;

    fn store_with_words(words: &[(&str, u8, &str)]) -> MemoryGraphStore {
        let mut graph = Graph::new();
        let dataset = Dataset {
            words: words
                .iter()
                .map(|(simp, level, pinyin)| WordRecord {
                    simp: simp.to_string(),
                    trad: simp.to_string(),
                    level: *level,
                    pinyin: pinyin.to_string(),
                    pinyin_tonemarks: String::new(),
                    eng: String::new(),
                })
                .collect(),
            ..Default::default()
        };
        Seeder::new(&mut graph).seed(&dataset).unwrap();
        MemoryGraphStore::from_graph(graph)
    }

    #[test]
    fn test_allowed_transitions() {
        assert!(is_allowed_transition(RelationKind::Ignores, RelationKind::Learning));
        assert!(is_allowed_transition(RelationKind::Learning, RelationKind::Knows));
        assert!(is_allowed_transition(RelationKind::Knows, RelationKind::Learning));
        assert!(!is_allowed_transition(RelationKind::Ignores, RelationKind::Knows));
        assert!(!is_allowed_transition(RelationKind::Learning, RelationKind::Ignores));
        assert!(!is_allowed_transition(RelationKind::Knows, RelationKind::Knows));
    }

    #[test]
    fn test_register_user_rejects_empty_and_taken_names() {
        let store = store_with_words(&[("鱼", 1, "yu2")]);
        assert!(matches!(
            register_user(&store, "", "hash"),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            register_user(&store, "Bob", ""),
            Err(CoreError::InvalidInput(_))
        ));
        register_user(&store, "Bob", "hash").unwrap();
        assert!(matches!(
            register_user(&store, "Bob", "other"),
            Err(CoreError::UserExists(_))
        ));
    }

    #[test]
    fn test_advance_rejects_forbidden_and_stale_transitions() {
        let store = store_with_words(&[("鱼", 1, "yu2")]);
        register_user(&store, "Bob", "hash").unwrap();

        let err = advance(&store, "Bob", "鱼yu2", RelationKind::Ignores, RelationKind::Knows)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));

        let err = advance(&store, "Bob", "鱼yu2", RelationKind::Learning, RelationKind::Knows)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::StaleTransition {
                expected: RelationKind::Learning,
                actual: RelationKind::Ignores
            }
        ));
        assert_eq!(
            relation(&store, "Bob", "鱼yu2").unwrap(),
            Some(RelationKind::Ignores)
        );
    }

    #[test]
    fn test_advance_unknown_user_is_not_found() {
        let store = store_with_words(&[("鱼", 1, "yu2")]);
        let err = advance(&store, "Ann", "鱼yu2", RelationKind::Ignores, RelationKind::Learning)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_last_activity_sentinel_when_empty() {
        let store = store_with_words(&[("鱼", 1, "yu2")]);
        register_user(&store, "Bob", "hash").unwrap();
        let activity = last_activity(&store, "Bob", RelationKind::Knows);
        assert!(activity.word.is_none());
        assert_eq!(activity.at, DateTime::<Utc>::UNIX_EPOCH);

        let unknown = last_activity(&store, "Nobody", RelationKind::Ignores);
        assert!(unknown.word.is_none());
    }

    #[test]
    fn test_repair_recreates_missing_relation() {
        let store = store_with_words(&[("鱼", 1, "yu2")]);
        register_user(&store, "Bob", "hash").unwrap();
        store.write(|graph| {
            let bob = query::person_id(graph, "Bob").unwrap();
            let fish = query::word_id(graph, "鱼yu2").unwrap();
            graph.delete_edge(RelationKind::Ignores.edge_kind(), bob, fish);
        });

        let err = advance(&store, "Bob", "鱼yu2", RelationKind::Ignores, RelationKind::Learning)
            .unwrap_err();
        assert!(matches!(err, CoreError::InconsistentState { found: 0, .. }));

        let outcome = repair(&store, "Bob", "鱼yu2").unwrap();
        assert_eq!(
            outcome,
            RepairOutcome::Recreated {
                kind: RelationKind::Ignores
            }
        );
        assert_eq!(
            relation(&store, "Bob", "鱼yu2").unwrap(),
            Some(RelationKind::Ignores)
        );
    }
}
