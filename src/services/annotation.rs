//! Greedy longest-match text annotation against a learner's vocabulary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::graph::model::{Label, RelationKind};
use crate::graph::{query, GraphStore};

/// Longest word, in code points, tried at each position.
pub const MAX_MATCH_LEN: usize = 4;

const PUNCTUATION: &[char] = &['…', '“', '”', '‘', '’', '—', '·'];

// ========== Types ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub simp: String,
    pub pinyin: String,
    pub level: u8,
    pub relation: Option<RelationKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    VocabularyWord,
    Character,
    Punctuation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub word: Option<VocabularyEntry>,
}

/// `score` and `known_proportion` are `None` when undefined (no matched words,
/// or no non-punctuation tokens).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedText {
    pub tokens: Vec<Token>,
    pub score: Option<f64>,
    pub known_proportion: Option<f64>,
    pub vocabulary_words: usize,
    pub total_words: usize,
}

// ========== Service Implementation ==========

/// Whitespace, ASCII punctuation, CJK symbols and full-width punctuation
/// forms, plus a few typographic marks outside those blocks.
pub fn is_punctuation(c: char) -> bool {
    c.is_whitespace()
        || c.is_ascii_punctuation()
        || matches!(
            c,
            '\u{3000}'..='\u{303F}'
                | '\u{FF01}'..='\u{FF0F}'
                | '\u{FF1A}'..='\u{FF20}'
                | '\u{FF3B}'..='\u{FF40}'
                | '\u{FF5B}'..='\u{FF65}'
        )
        || PUNCTUATION.contains(&c)
}

/// Every word in the graph with `user`'s relation to it (`None` for guests).
pub fn vocabulary<S: GraphStore>(store: &S, user: Option<&str>) -> Vec<VocabularyEntry> {
    let graph = store.read();
    let person_id = user.and_then(|name| query::person_id(&graph, name));

    graph
        .nodes(Label::Word)
        .filter_map(|word_id| {
            let word = graph.word(word_id)?;
            Some(VocabularyEntry {
                simp: word.simp.clone(),
                pinyin: word.pinyin.clone(),
                level: word.level,
                relation: person_id.and_then(|p| query::latest_relation(&graph, p, word_id)),
            })
        })
        .collect()
}

/// Segments `text` greedily: at each position the longest vocabulary entry of
/// up to [`MAX_MATCH_LEN`] code points wins, otherwise one code point is
/// emitted as a character or punctuation token. When several entries share a
/// glyph sequence the first one in `vocabulary` is used.
pub fn annotate(text: &str, vocabulary: &[VocabularyEntry]) -> AnnotatedText {
    let mut by_simp: HashMap<&str, &VocabularyEntry> = HashMap::with_capacity(vocabulary.len());
    for entry in vocabulary {
        by_simp.entry(entry.simp.as_str()).or_insert(entry);
    }

    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let longest = MAX_MATCH_LEN.min(chars.len() - i);
        let matched = (1..=longest).rev().find_map(|len| {
            let candidate: String = chars[i..i + len].iter().collect();
            by_simp.get(candidate.as_str()).map(|entry| (candidate, *entry))
        });

        match matched {
            Some((surface, entry)) => {
                i += surface.chars().count();
                tokens.push(Token {
                    text: surface,
                    kind: TokenKind::VocabularyWord,
                    word: Some(entry.clone()),
                });
            }
            None => {
                let c = chars[i];
                i += 1;
                let kind = if is_punctuation(c) {
                    TokenKind::Punctuation
                } else {
                    TokenKind::Character
                };
                tokens.push(Token {
                    text: c.to_string(),
                    kind,
                    word: None,
                });
            }
        }
    }

    summarize(tokens)
}

fn summarize(tokens: Vec<Token>) -> AnnotatedText {
    let levels: Vec<f64> = tokens
        .iter()
        .filter_map(|token| token.word.as_ref())
        .map(|entry| f64::from(entry.level))
        .collect();
    let known = tokens
        .iter()
        .filter_map(|token| token.word.as_ref())
        .filter(|entry| entry.relation == Some(RelationKind::Knows))
        .count();
    let total_words = tokens
        .iter()
        .filter(|token| token.kind != TokenKind::Punctuation)
        .count();

    let score = if levels.is_empty() {
        None
    } else {
        Some(levels.iter().sum::<f64>() / levels.len() as f64)
    };
    let known_proportion = if total_words == 0 {
        None
    } else {
        Some(known as f64 / total_words as f64)
    };

    AnnotatedText {
        vocabulary_words: levels.len(),
        total_words,
        score,
        known_proportion,
        tokens,
    }
}
