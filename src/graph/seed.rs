use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::model::{
    parse_backbone_id, BackboneNode, Character, EdgeKind, EdgeProps, Label, Node, NodeId,
    PinyinBlock, PinyinWord, Radical, ToneCombo, Word,
};
use super::query;
use super::store::Graph;
use super::GraphError;

const NEUTRAL_TONE: u8 = 5;

// ========== Records ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinyinBlockRecord {
    pub block: String,
    #[serde(default)]
    pub cons: String,
    pub vow: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadicalRecord {
    pub simp: String,
    #[serde(default)]
    pub variant_of: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub simp: String,
    #[serde(default)]
    pub trad: String,
    pub level: u8,
    pub pinyin: String,
    #[serde(default)]
    pub pinyin_tonemarks: String,
    #[serde(default)]
    pub eng: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRankRecord {
    pub character: String,
    pub rank: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRadicalsRecord {
    pub character: String,
    pub radicals: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackboneRecord {
    pub backbone_id: String,
    pub simp: String,
    /// Backbone ids of the nodes this one decomposes into.
    #[serde(default)]
    pub parts: Vec<String>,
}

/// Everything needed to build a graph, in import order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub pinyin_blocks: Vec<PinyinBlockRecord>,
    pub radicals: Vec<RadicalRecord>,
    pub words: Vec<WordRecord>,
    pub character_ranks: Vec<CharacterRankRecord>,
    pub character_radicals: Vec<CharacterRadicalsRecord>,
    pub backbone: Vec<BackboneRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub words: usize,
    pub skipped_words: usize,
    pub characters: usize,
    pub radicals: usize,
    pub backbone_nodes: usize,
    pub tone_combos: usize,
}

/// Splits numbered pinyin into syllable blocks and tone digits.
///
/// `zheng4zai4` gives `(["zheng", "zai"], [4, 4])`. A syllable without a digit
/// and the digit `0` both map to the neutral tone 5.
pub fn split_pinyin(pinyin: &str) -> (Vec<String>, Vec<u8>) {
    let mut blocks = Vec::new();
    let mut tones = Vec::new();
    let mut current = String::new();

    for c in pinyin.chars() {
        if let Some(digit) = c.to_digit(10) {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
                let tone = if digit == 0 { NEUTRAL_TONE } else { digit as u8 };
                tones.push(tone);
            }
        } else if c.is_whitespace() || c == '\'' {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
                tones.push(NEUTRAL_TONE);
            }
        } else {
            current.extend(c.to_lowercase());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
        tones.push(NEUTRAL_TONE);
    }

    (blocks, tones)
}

pub fn word_from_record(record: &WordRecord) -> Word {
    let (pinyin_blocks, pinyin_tones) = split_pinyin(&record.pinyin);
    Word {
        simp: record.simp.clone(),
        trad: record.trad.clone(),
        level: record.level,
        pinyin: record.pinyin.clone(),
        pinyin_tonemarks: record.pinyin_tonemarks.clone(),
        pinyin_blocks,
        pinyin_tones,
        eng: record.eng.clone(),
        unique: Word::unique_key(&record.simp, &record.pinyin),
    }
}

// ========== Seeder ==========

pub struct Seeder<'g> {
    graph: &'g mut Graph,
}

impl<'g> Seeder<'g> {
    pub fn new(graph: &'g mut Graph) -> Self {
        Self { graph }
    }

    /// Runs every import step in dependency order.
    pub fn seed(mut self, dataset: &Dataset) -> Result<SeedReport, GraphError> {
        let mut report = SeedReport::default();

        self.add_pinyin_blocks(&dataset.pinyin_blocks);
        report.radicals = self.add_radicals(&dataset.radicals)?;
        let (words, skipped) = self.import_words(&dataset.words)?;
        report.words = words;
        report.skipped_words = skipped;
        self.link_words_with_pinyin_blocks()?;
        self.create_pinyin_from_words()?;
        report.tone_combos = self.create_tone_combos_from_words()?;
        report.characters = self.create_characters_from_words()?;
        self.add_freq_rank_to_characters(&dataset.character_ranks);
        self.link_characters_to_radicals(&dataset.character_radicals)?;
        report.backbone_nodes = self.add_backbone(&dataset.backbone)?;

        tracing::info!(
            words = report.words,
            skipped_words = report.skipped_words,
            characters = report.characters,
            backbone_nodes = report.backbone_nodes,
            "graph seeded"
        );
        Ok(report)
    }

    pub fn add_pinyin_blocks(&mut self, records: &[PinyinBlockRecord]) -> usize {
        for record in records {
            let cons = if record.cons.trim().is_empty() {
                "NA".to_string()
            } else {
                record.cons.clone()
            };
            self.graph.merge_node(Node::PinyinBlock(PinyinBlock {
                block: record.block.clone(),
                cons,
                vow: record.vow.clone(),
            }));
        }
        self.graph.count(Label::PinyinBlock)
    }

    pub fn add_radicals(&mut self, records: &[RadicalRecord]) -> Result<usize, GraphError> {
        for record in records {
            self.graph.merge_node(Node::Radical(Radical {
                simp: record.simp.clone(),
                variant: record.note.clone(),
            }));
        }
        for record in records {
            let Some(canonical) = record.variant_of.as_deref() else {
                continue;
            };
            let from = self.graph.lookup(Label::Radical, &record.simp);
            let to = self.graph.lookup(Label::Radical, canonical);
            match (from, to) {
                (Some(from), Some(to)) => self.link_once(EdgeKind::VariantOf, from, to)?,
                _ => tracing::warn!(radical = %record.simp, canonical, "variant target missing"),
            }
        }
        Ok(self.graph.count(Label::Radical))
    }

    /// Creates one Word per distinct simp + pinyin; returns (created, skipped).
    pub fn import_words(&mut self, records: &[WordRecord]) -> Result<(usize, usize), GraphError> {
        let mut created = 0;
        let mut skipped = 0;
        for record in records {
            if !(1..=6).contains(&record.level) || record.simp.trim().is_empty() {
                tracing::warn!(simp = %record.simp, level = record.level, "skipping malformed word");
                skipped += 1;
                continue;
            }
            let word = word_from_record(record);
            if self.graph.lookup(Label::Word, &word.unique).is_some() {
                tracing::debug!(unique = %word.unique, "duplicate word skipped");
                skipped += 1;
                continue;
            }
            self.graph.create_node(Node::Word(word))?;
            created += 1;
        }
        Ok((created, skipped))
    }

    pub fn link_words_with_pinyin_blocks(&mut self) -> Result<(), GraphError> {
        let words: Vec<NodeId> = self.graph.nodes(Label::Word).collect();
        for word_id in words {
            let blocks = match self.graph.word(word_id) {
                Some(word) => word.pinyin_blocks.clone(),
                None => continue,
            };
            for block in blocks {
                if let Some(block_id) = self.graph.lookup(Label::PinyinBlock, &block) {
                    self.link_once(EdgeKind::HasPinyinBlock, word_id, block_id)?;
                }
            }
        }
        Ok(())
    }

    pub fn create_pinyin_from_words(&mut self) -> Result<usize, GraphError> {
        let words: Vec<NodeId> = self.graph.nodes(Label::Word).collect();
        for word_id in words {
            let pinyin = match self.graph.word(word_id) {
                Some(word) => word.pinyin.clone(),
                None => continue,
            };
            let pinyin_id = self.graph.merge_node(Node::PinyinWord(PinyinWord { pinyin }));
            self.link_once(EdgeKind::HasPinyin, word_id, pinyin_id)?;
        }
        Ok(self.graph.count(Label::PinyinWord))
    }

    pub fn create_tone_combos_from_words(&mut self) -> Result<usize, GraphError> {
        let words: Vec<NodeId> = self.graph.nodes(Label::Word).collect();
        for word_id in words {
            let tone = match self.graph.word(word_id) {
                Some(word) if !word.pinyin_tones.is_empty() => word.tone_code(),
                _ => continue,
            };
            let tone_id = self.graph.merge_node(Node::ToneCombo(ToneCombo { tone }));
            self.link_once(EdgeKind::HasTone, word_id, tone_id)?;
        }
        Ok(self.graph.count(Label::ToneCombo))
    }

    /// One Character per distinct glyph, linked from each word at its first position.
    pub fn create_characters_from_words(&mut self) -> Result<usize, GraphError> {
        let words: Vec<NodeId> = self.graph.nodes(Label::Word).collect();
        for word_id in words {
            let glyphs: Vec<char> = match self.graph.word(word_id) {
                Some(word) => word.simp.chars().collect(),
                None => continue,
            };
            for (position, glyph) in glyphs.into_iter().enumerate() {
                let char_id = self.graph.merge_node(Node::Character(Character {
                    simp: glyph.to_string(),
                    freq_rank: None,
                }));
                if !self.graph.has_edge(EdgeKind::HasCharacter, word_id, char_id) {
                    self.graph.create_edge(
                        EdgeKind::HasCharacter,
                        word_id,
                        char_id,
                        EdgeProps::at_position(position),
                    )?;
                }
            }
        }
        Ok(self.graph.count(Label::Character))
    }

    pub fn add_freq_rank_to_characters(&mut self, records: &[CharacterRankRecord]) -> usize {
        let mut ranked = 0;
        for record in records {
            let Some(id) = self.graph.lookup(Label::Character, &record.character) else {
                continue;
            };
            if let Some(Node::Character(character)) = self.graph.node_mut(id) {
                character.freq_rank = Some(record.rank);
                ranked += 1;
            }
        }
        ranked
    }

    pub fn link_characters_to_radicals(
        &mut self,
        records: &[CharacterRadicalsRecord],
    ) -> Result<(), GraphError> {
        for record in records {
            let Some(char_id) = self.graph.lookup(Label::Character, &record.character) else {
                continue;
            };
            for radical in &record.radicals {
                if let Some(radical_id) = self.graph.lookup(Label::Radical, radical) {
                    self.link_once(EdgeKind::HasRadical, char_id, radical_id)?;
                }
            }
        }
        Ok(())
    }

    /// Adds backbone nodes with their `NEXT`, `PART_OF` and glyph links.
    pub fn add_backbone(&mut self, records: &[BackboneRecord]) -> Result<usize, GraphError> {
        for record in records {
            self.graph.merge_node(Node::Backbone(BackboneNode {
                backbone_id: record.backbone_id.clone(),
                simp: record.simp.clone(),
            }));
        }

        let mut first_word_by_simp: HashMap<String, NodeId> = HashMap::new();
        for word_id in self.graph.nodes(Label::Word) {
            if let Some(word) = self.graph.word(word_id) {
                first_word_by_simp.entry(word.simp.clone()).or_insert(word_id);
            }
        }

        for record in records {
            let Some(node_id) = query::backbone_node(self.graph, &record.backbone_id) else {
                continue;
            };
            let merged_simp = self.graph.backbone(node_id).map(|node| node.simp.as_str());
            if merged_simp != Some(record.simp.as_str()) {
                tracing::warn!(
                    backbone_id = %record.backbone_id,
                    simp = %record.simp,
                    kept = ?merged_simp,
                    "conflicting backbone record skipped"
                );
                continue;
            }

            if let Some(n) = parse_backbone_id(&record.backbone_id) {
                let next = (n + 1).to_string();
                if let Some(next_id) = query::backbone_node(self.graph, &next) {
                    self.link_once(EdgeKind::Next, node_id, next_id)?;
                }
            }

            for part in &record.parts {
                match query::backbone_node(self.graph, part) {
                    Some(part_id) => self.link_once(EdgeKind::PartOf, part_id, node_id)?,
                    None => tracing::warn!(
                        backbone_id = %record.backbone_id,
                        part = %part,
                        "backbone part missing"
                    ),
                }
            }

            if let Some(radical_id) = self.graph.lookup(Label::Radical, &record.simp) {
                self.link_once(EdgeKind::IsRadical, node_id, radical_id)?;
            }
            if let Some(word_id) = first_word_by_simp.get(&record.simp) {
                self.link_once(EdgeKind::IsWord, node_id, *word_id)?;
            }
            if let Some(char_id) = self.graph.lookup(Label::Character, &record.simp) {
                self.link_once(EdgeKind::IsCharacter, node_id, char_id)?;
            }
        }

        Ok(self.graph.count(Label::Backbone))
    }

    fn link_once(&mut self, kind: EdgeKind, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        if !self.graph.has_edge(kind, from, to) {
            self.graph.create_edge(kind, from, to, EdgeProps::default())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(simp: &str, level: u8, pinyin: &str) -> WordRecord {
        WordRecord {
            simp: simp.to_string(),
            trad: simp.to_string(),
            level,
            pinyin: pinyin.to_string(),
            pinyin_tonemarks: String::new(),
            eng: String::new(),
        }
    }

    fn backbone(id: &str, simp: &str, parts: &[&str]) -> BackboneRecord {
        BackboneRecord {
            backbone_id: id.to_string(),
            simp: simp.to_string(),
            parts: parts.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_split_pinyin() {
        let (blocks, tones) = split_pinyin("zheng4zai4");
        assert_eq!(blocks, vec!["zheng", "zai"]);
        assert_eq!(tones, vec![4, 4]);

        let (blocks, tones) = split_pinyin("xie4 xie");
        assert_eq!(blocks, vec!["xie", "xie"]);
        assert_eq!(tones, vec![4, 5]);

        let (_, tones) = split_pinyin("ma0");
        assert_eq!(tones, vec![5]);
    }

    #[test]
    fn test_words_keep_distinct_pronunciations() {
        let mut graph = Graph::new();
        let dataset = Dataset {
            words: vec![
                word("累", 2, "lei4"),
                word("累", 5, "lei3"),
                word("累", 2, "lei4"),
                word("坏", 9, "huai4"),
            ],
            ..Default::default()
        };
        let report = Seeder::new(&mut graph).seed(&dataset).unwrap();
        assert_eq!(report.words, 2);
        assert_eq!(report.skipped_words, 2);
        assert_eq!(report.characters, 1);
        assert!(graph.lookup(Label::Word, "累lei3").is_some());
    }

    #[test]
    fn test_characters_keep_position_order() {
        let mut graph = Graph::new();
        let dataset = Dataset {
            words: vec![word("正在", 4, "zheng4zai4")],
            ..Default::default()
        };
        Seeder::new(&mut graph).seed(&dataset).unwrap();
        let word_id = graph.lookup(Label::Word, "正在zheng4zai4").unwrap();
        let glyphs: Vec<String> = query::word_characters(&graph, word_id)
            .into_iter()
            .map(|id| graph.character(id).unwrap().simp.clone())
            .collect();
        assert_eq!(glyphs, vec!["正", "在"]);
        assert_eq!(graph.count(Label::ToneCombo), 1);
        assert_eq!(graph.count(Label::PinyinWord), 1);
    }

    #[test]
    fn test_backbone_links() {
        let mut graph = Graph::new();
        let dataset = Dataset {
            radicals: vec![
                RadicalRecord {
                    simp: "八".to_string(),
                    variant_of: None,
                    note: None,
                },
                RadicalRecord {
                    simp: "丷".to_string(),
                    variant_of: Some("八".to_string()),
                    note: Some("top form".to_string()),
                },
            ],
            words: vec![word("八", 1, "ba1"), word("十", 1, "shi2")],
            backbone: vec![
                backbone("1", "八", &[]),
                backbone("2", "十", &[]),
                backbone("3", "木", &[]),
                backbone("10a", "丷", &[]),
                backbone("10", "半", &["2", "10a"]),
            ],
            ..Default::default()
        };
        let report = Seeder::new(&mut graph).seed(&dataset).unwrap();
        assert_eq!(report.backbone_nodes, 5);
        assert_eq!(graph.edge_count(EdgeKind::Next), 2);
        assert_eq!(graph.edge_count(EdgeKind::PartOf), 2);
        assert_eq!(graph.edge_count(EdgeKind::IsRadical), 2);
        assert_eq!(graph.edge_count(EdgeKind::IsWord), 2);
        assert_eq!(graph.edge_count(EdgeKind::IsCharacter), 2);
        assert_eq!(graph.edge_count(EdgeKind::VariantOf), 1);

        let composite = query::backbone_node(&graph, "10").unwrap();
        let mut parts: Vec<String> = query::backbone_parts(&graph, composite)
            .into_iter()
            .map(|id| graph.backbone(id).unwrap().backbone_id.clone())
            .collect();
        parts.sort();
        assert_eq!(parts, vec!["10a", "2"]);
    }

    #[test]
    fn test_conflicting_backbone_record_keeps_first_glyph_links() {
        let mut graph = Graph::new();
        let dataset = Dataset {
            words: vec![word("八", 1, "ba1"), word("十", 1, "shi2")],
            backbone: vec![
                backbone("1", "八", &[]),
                backbone("1", "十", &[]),
                backbone("2", "十", &["1"]),
            ],
            ..Default::default()
        };
        let report = Seeder::new(&mut graph).seed(&dataset).unwrap();
        assert_eq!(report.backbone_nodes, 2);

        let first = query::backbone_node(&graph, "1").unwrap();
        assert_eq!(graph.backbone(first).unwrap().simp, "八");
        assert_eq!(graph.outgoing(first, EdgeKind::IsWord).count(), 1);
        assert_eq!(graph.outgoing(first, EdgeKind::IsCharacter).count(), 1);
        let word_id = query::linked(&graph, first, EdgeKind::IsWord).unwrap();
        assert_eq!(graph.word(word_id).unwrap().simp, "八");
        assert_eq!(graph.edge_count(EdgeKind::Next), 1);
        assert_eq!(graph.edge_count(EdgeKind::PartOf), 1);
    }

    #[test]
    fn test_dataset_deserializes_with_missing_sections() {
        let json = r#"{"words":[{"simp":"鱼","level":1,"pinyin":"yu2"}]}"#;
        let dataset: Dataset = serde_json::from_str(json).unwrap();
        assert_eq!(dataset.words.len(), 1);
        assert!(dataset.backbone.is_empty());
    }
}
