use serde::Serialize;

use crate::graph::model::{EdgeKind, Label, RelationKind};
use crate::graph::{query, GraphStore};

/// Example words kept per state in each cell.
pub const EXAMPLES_PER_STATE: usize = 2;
pub const FIRST_TONES: u8 = 4;
/// Second syllable tones, 5 being the neutral tone.
pub const SECOND_TONES: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneWord {
    pub simp: String,
    pub pinyin: String,
    pub tone: String,
    pub relation: RelationKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneCell {
    pub knows: Vec<String>,
    pub learning: Vec<String>,
}

impl ToneCell {
    pub fn is_empty(&self) -> bool {
        self.knows.is_empty() && self.learning.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneRow {
    pub first_tone: u8,
    pub cells: Vec<ToneCell>,
}

/// Tone pairs of two-syllable words: 4 rows by first tone, 5 columns by
/// second tone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneMatrix {
    pub rows: Vec<ToneRow>,
}

impl ToneMatrix {
    pub fn empty() -> Self {
        let rows = (1..=FIRST_TONES)
            .map(|first_tone| ToneRow {
                first_tone,
                cells: vec![ToneCell::default(); SECOND_TONES as usize],
            })
            .collect();
        Self { rows }
    }

    pub fn cell(&self, first: u8, second: u8) -> Option<&ToneCell> {
        let (row, col) = cell_index(first, second)?;
        self.rows.get(row)?.cells.get(col)
    }

    fn cell_mut(&mut self, first: u8, second: u8) -> Option<&mut ToneCell> {
        let (row, col) = cell_index(first, second)?;
        self.rows.get_mut(row)?.cells.get_mut(col)
    }
}

fn cell_index(first: u8, second: u8) -> Option<(usize, usize)> {
    if !(1..=FIRST_TONES).contains(&first) || !(1..=SECOND_TONES).contains(&second) {
        return None;
    }
    Some((usize::from(first - 1), usize::from(second - 1)))
}

fn parse_tone_pair(code: &str) -> Option<(u8, u8)> {
    let mut digits = code.chars().map(|c| c.to_digit(10));
    match (digits.next(), digits.next(), digits.next()) {
        (Some(Some(first)), Some(Some(second)), None) => Some((first as u8, second as u8)),
        _ => None,
    }
}

/// Fills the matrix from words already grouped by tone code and state. Codes
/// other than two digits are ignored, as are IGNORES words.
pub fn build(words: &[ToneWord]) -> ToneMatrix {
    let mut matrix = ToneMatrix::empty();
    for word in words {
        let Some((first, second)) = parse_tone_pair(&word.tone) else {
            continue;
        };
        let Some(cell) = matrix.cell_mut(first, second) else {
            continue;
        };
        let examples = match word.relation {
            RelationKind::Knows => &mut cell.knows,
            RelationKind::Learning => &mut cell.learning,
            RelationKind::Ignores => continue,
        };
        if examples.len() < EXAMPLES_PER_STATE {
            examples.push(word.simp.clone());
        }
    }
    matrix
}

/// The user's LEARNING and KNOWS words with their tone code, ordered by level
/// then unique key.
pub fn words_by_tone_and_state<S: GraphStore>(store: &S, user: &str) -> Vec<ToneWord> {
    let graph = store.read();
    let Some(person_id) = query::person_id(&graph, user) else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for state in [RelationKind::Learning, RelationKind::Knows] {
        for edge in query::words_in_state(&graph, person_id, state) {
            let Some(word) = graph.word(edge.to) else {
                continue;
            };
            let tone = query::linked(&graph, edge.to, EdgeKind::HasTone)
                .and_then(|id| graph.node(id))
                .filter(|node| node.label() == Label::ToneCombo)
                .map(|node| node.key().to_string())
                .unwrap_or_else(|| word.tone_code());
            rows.push((word.level, word.unique.clone(), ToneWord {
                simp: word.simp.clone(),
                pinyin: word.pinyin.clone(),
                tone,
                relation: state,
            }));
        }
    }
    rows.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    rows.into_iter().map(|(_, _, word)| word).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tw(simp: &str, tone: &str, relation: RelationKind) -> ToneWord {
        ToneWord {
            simp: simp.to_string(),
            pinyin: String::new(),
            tone: tone.to_string(),
            relation,
        }
    }

    #[test]
    fn test_empty_matrix_has_every_cell() {
        let matrix = build(&[]);
        assert_eq!(matrix.rows.len(), 4);
        assert!(matrix.rows.iter().all(|row| row.cells.len() == 5));
        assert!(matrix.cell(4, 5).unwrap().is_empty());
        assert!(matrix.cell(5, 1).is_none());
        assert!(matrix.cell(1, 0).is_none());
    }

    #[test]
    fn test_cells_keep_two_examples_per_state() {
        let words = vec![
            tw("正在", "44", RelationKind::Knows),
            tw("现在", "44", RelationKind::Knows),
            tw("再见", "44", RelationKind::Knows),
            tw("电视", "44", RelationKind::Learning),
            tw("东西", "15", RelationKind::Learning),
            tw("不", "4", RelationKind::Knows),
            tw("对不起", "455", RelationKind::Knows),
            tw("什么", "25", RelationKind::Ignores),
            tw("谢谢", "45", RelationKind::Knows),
        ];
        let matrix = build(&words);

        let cell = matrix.cell(4, 4).unwrap();
        assert_eq!(cell.knows, vec!["正在", "现在"]);
        assert_eq!(cell.learning, vec!["电视"]);
        assert_eq!(matrix.cell(1, 5).unwrap().learning, vec!["东西"]);
        assert_eq!(matrix.cell(4, 5).unwrap().knows, vec!["谢谢"]);
        assert!(matrix.cell(2, 5).unwrap().is_empty());
    }

    #[test]
    fn test_tone_pair_parsing() {
        assert_eq!(parse_tone_pair("35"), Some((3, 5)));
        assert_eq!(parse_tone_pair("3"), None);
        assert_eq!(parse_tone_pair("355"), None);
        assert_eq!(parse_tone_pair("3a"), None);
    }
}
