use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::graph::model::RelationKind;
use crate::services::recommendation::{LevelCount, StateLevelCount};

pub const LEVELS: [u8; 6] = [1, 2, 3, 4, 5, 6];
pub const TOTAL_ROW: &str = "Total";
pub const ALL_COLUMN: &str = "All";

// ========== Types ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountsRow {
    pub label: String,
    pub counts: [u64; 6],
    pub all: u64,
}

/// Rows IGNORES, LEARNING, KNOWS, Total; columns levels 1..6 then All.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountsTable {
    pub headings: Vec<String>,
    pub rows: Vec<CountsRow>,
}

impl CountsTable {
    pub fn row(&self, label: &str) -> Option<&CountsRow> {
        self.rows.iter().find(|row| row.label == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRow {
    pub chars_in_backbone: u64,
    pub chars_not_represented: u64,
    pub words_via_backbone: u64,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageTable {
    pub headings: Vec<String>,
    pub rows: Vec<CoverageRow>,
}

impl CoverageTable {
    pub fn row(&self, level: u8) -> Option<&CoverageRow> {
        self.rows.iter().find(|row| row.level == level)
    }
}

// ========== Service Implementation ==========

/// Builds the 3 states x 6 levels matrix with a Total row and an All column.
///
/// Missing (state, level) pairs count 0; repeated pairs are summed; levels
/// outside 1..6 are dropped.
pub fn counts_table(raw: &[StateLevelCount]) -> CountsTable {
    let mut values: HashMap<(RelationKind, u8), u64> = HashMap::new();
    for item in raw {
        if !LEVELS.contains(&item.level) {
            tracing::warn!(
                level = item.level,
                relation = item.relation.as_str(),
                "count outside level range dropped"
            );
            continue;
        }
        *values.entry((item.relation, item.level)).or_insert(0) += item.count;
    }

    let mut rows: Vec<CountsRow> = RelationKind::ALL
        .iter()
        .map(|state| {
            let mut counts = [0u64; 6];
            for (slot, level) in counts.iter_mut().zip(LEVELS) {
                *slot = values.get(&(*state, level)).copied().unwrap_or(0);
            }
            CountsRow {
                label: state.as_str().to_string(),
                all: counts.iter().sum(),
                counts,
            }
        })
        .collect();

    let mut total = CountsRow {
        label: TOTAL_ROW.to_string(),
        counts: [0; 6],
        all: 0,
    };
    for row in &rows {
        for (sum, value) in total.counts.iter_mut().zip(row.counts) {
            *sum += value;
        }
        total.all += row.all;
    }
    rows.push(total);

    let mut headings = vec!["state".to_string()];
    headings.extend(LEVELS.iter().map(|level| level.to_string()));
    headings.push(ALL_COLUMN.to_string());

    CountsTable { headings, rows }
}

/// One row per level, each count looked up by level key (0 when absent), so
/// inputs of different length or order line up correctly.
pub fn backbone_coverage_table(
    disconnected: &[LevelCount],
    connected: &[LevelCount],
    words: &[LevelCount],
) -> CoverageTable {
    let index = |counts: &[LevelCount]| -> HashMap<u8, u64> {
        let mut map = HashMap::new();
        for item in counts {
            *map.entry(item.level).or_insert(0) += item.count;
        }
        map
    };
    let disconnected = index(disconnected);
    let connected = index(connected);
    let words = index(words);

    let rows = LEVELS
        .iter()
        .map(|level| CoverageRow {
            chars_in_backbone: connected.get(level).copied().unwrap_or(0),
            chars_not_represented: disconnected.get(level).copied().unwrap_or(0),
            words_via_backbone: words.get(level).copied().unwrap_or(0),
            level: *level,
        })
        .collect();

    CoverageTable {
        headings: ["chars-in-bb", "chars-not-repr", "words-via-bb", "level"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows,
    }
}

// ========== Plain-text rendering ==========

fn write_table(
    f: &mut fmt::Formatter<'_>,
    headings: &[String],
    rows: &[Vec<String>],
) -> fmt::Result {
    let mut widths: Vec<usize> = headings.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {cell:>w$} ", w = *width))
            .collect::<Vec<_>>()
            .join("|")
    };

    writeln!(f, "+{separator}+")?;
    writeln!(f, "|{}|", line(headings))?;
    writeln!(f, "+{separator}+")?;
    for row in rows {
        writeln!(f, "|{}|", line(row.as_slice()))?;
    }
    write!(f, "+{separator}+")
}

impl fmt::Display for CountsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![row.label.clone()];
                cells.extend(row.counts.iter().map(|c| c.to_string()));
                cells.push(row.all.to_string());
                cells
            })
            .collect();
        write_table(f, &self.headings, &rows)
    }
}

impl fmt::Display for CoverageTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.chars_in_backbone.to_string(),
                    row.chars_not_represented.to_string(),
                    row.words_via_backbone.to_string(),
                    row.level.to_string(),
                ]
            })
            .collect();
        write_table(f, &self.headings, &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(relation: RelationKind, level: u8, count: u64) -> StateLevelCount {
        StateLevelCount {
            relation,
            level,
            count,
        }
    }

    #[test]
    fn test_counts_table_layout() {
        let table = counts_table(&[count(RelationKind::Ignores, 1, 1)]);
        assert_eq!(
            table.headings,
            vec!["state", "1", "2", "3", "4", "5", "6", "All"]
        );
        let labels: Vec<&str> = table.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["IGNORES", "LEARNING", "KNOWS", "Total"]);

        let ignores = table.row("IGNORES").unwrap();
        assert_eq!(ignores.counts, [1, 0, 0, 0, 0, 0]);
        assert_eq!(ignores.all, 1);
        assert_eq!(table.row("Total").unwrap().all, 1);
    }

    #[test]
    fn test_counts_table_without_user_is_all_zero() {
        let table = counts_table(&[]);
        assert_eq!(table.rows.len(), 4);
        assert!(table.rows.iter().all(|row| row.all == 0 && row.counts == [0; 6]));
    }

    #[test]
    fn test_counts_table_drops_unknown_levels() {
        let table = counts_table(&[count(RelationKind::Knows, 9, 4), count(RelationKind::Knows, 6, 2)]);
        assert_eq!(table.row("KNOWS").unwrap().counts, [0, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn test_backbone_table_looks_up_by_level() {
        let table = backbone_coverage_table(
            &[LevelCount { level: 2, count: 10 }],
            &[LevelCount { level: 2, count: 5 }],
            &[],
        );
        assert_eq!(
            table.headings,
            vec!["chars-in-bb", "chars-not-repr", "words-via-bb", "level"]
        );
        assert_eq!(table.rows.len(), 6);
        let row = table.row(2).unwrap();
        assert_eq!(row.chars_in_backbone, 5);
        assert_eq!(row.chars_not_represented, 10);
        assert_eq!(row.words_via_backbone, 0);
        assert_eq!(table.row(1).unwrap().chars_in_backbone, 0);
    }

    #[test]
    fn test_display_renders_every_row() {
        let rendered = counts_table(&[count(RelationKind::Learning, 3, 12)]).to_string();
        assert!(rendered.contains("LEARNING"));
        assert!(rendered.contains("Total"));
        assert!(rendered.contains("12"));
        assert_eq!(rendered.lines().count(), 4 + 4);
    }
}
