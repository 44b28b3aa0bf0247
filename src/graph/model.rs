use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ========== Identifiers ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Word,
    Character,
    Radical,
    Backbone,
    Person,
    PinyinBlock,
    PinyinWord,
    ToneCombo,
}

impl Label {
    pub const ALL: [Label; 8] = [
        Label::Word,
        Label::Character,
        Label::Radical,
        Label::Backbone,
        Label::Person,
        Label::PinyinBlock,
        Label::PinyinWord,
        Label::ToneCombo,
    ];
}

// ========== Knowledge relation ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    Ignores,
    Learning,
    Knows,
}

impl RelationKind {
    /// Display order used by panels: IGNORES, LEARNING, KNOWS.
    pub const ALL: [RelationKind; 3] = [
        RelationKind::Ignores,
        RelationKind::Learning,
        RelationKind::Knows,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "IGNORES" => Some(Self::Ignores),
            "LEARNING" => Some(Self::Learning),
            "KNOWS" => Some(Self::Knows),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignores => "IGNORES",
            Self::Learning => "LEARNING",
            Self::Knows => "KNOWS",
        }
    }

    pub fn edge_kind(self) -> EdgeKind {
        match self {
            Self::Ignores => EdgeKind::Ignores,
            Self::Learning => EdgeKind::Learning,
            Self::Knows => EdgeKind::Knows,
        }
    }

    pub fn from_edge_kind(kind: EdgeKind) -> Option<Self> {
        match kind {
            EdgeKind::Ignores => Some(Self::Ignores),
            EdgeKind::Learning => Some(Self::Learning),
            EdgeKind::Knows => Some(Self::Knows),
            _ => None,
        }
    }
}

// ========== Edges ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    Ignores,
    Learning,
    Knows,
    HasCharacter,
    HasRadical,
    VariantOf,
    Next,
    PartOf,
    IsRadical,
    IsWord,
    IsCharacter,
    HasPinyinBlock,
    HasPinyin,
    HasTone,
}

impl EdgeKind {
    /// Labels an edge of this kind must connect, as (from, to).
    pub fn endpoints(self) -> (Label, Label) {
        match self {
            EdgeKind::Ignores | EdgeKind::Learning | EdgeKind::Knows => (Label::Person, Label::Word),
            EdgeKind::HasCharacter => (Label::Word, Label::Character),
            EdgeKind::HasRadical => (Label::Character, Label::Radical),
            EdgeKind::VariantOf => (Label::Radical, Label::Radical),
            EdgeKind::Next | EdgeKind::PartOf => (Label::Backbone, Label::Backbone),
            EdgeKind::IsRadical => (Label::Backbone, Label::Radical),
            EdgeKind::IsWord => (Label::Backbone, Label::Word),
            EdgeKind::IsCharacter => (Label::Backbone, Label::Character),
            EdgeKind::HasPinyinBlock => (Label::Word, Label::PinyinBlock),
            EdgeKind::HasPinyin => (Label::Word, Label::PinyinWord),
            EdgeKind::HasTone => (Label::Word, Label::ToneCombo),
        }
    }

    pub fn is_relation(self) -> bool {
        RelationKind::from_edge_kind(self).is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeProps {
    pub created_at: Option<DateTime<Utc>>,
    /// Character position inside a word, for `HAS_CHARACTER`.
    pub position: Option<usize>,
}

impl EdgeProps {
    pub fn stamped(at: DateTime<Utc>) -> Self {
        Self {
            created_at: Some(at),
            position: None,
        }
    }

    pub fn at_position(position: usize) -> Self {
        Self {
            created_at: None,
            position: Some(position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: Uuid,
    pub kind: EdgeKind,
    pub from: NodeId,
    pub to: NodeId,
    pub props: EdgeProps,
}

// ========== Nodes ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub simp: String,
    pub trad: String,
    pub level: u8,
    /// Numbered pinyin, e.g. `zheng4zai4`.
    pub pinyin: String,
    pub pinyin_tonemarks: String,
    pub pinyin_blocks: Vec<String>,
    pub pinyin_tones: Vec<u8>,
    pub eng: String,
    pub unique: String,
}

impl Word {
    pub fn unique_key(simp: &str, pinyin: &str) -> String {
        format!("{simp}{pinyin}")
    }

    /// Tone digits joined, e.g. `44` for `zheng4zai4`.
    pub fn tone_code(&self) -> String {
        self.pinyin_tones.iter().map(|t| t.to_string()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.simp.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub simp: String,
    pub freq_rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Radical {
    pub simp: String,
    pub variant: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackboneNode {
    pub backbone_id: String,
    pub simp: String,
}

impl BackboneNode {
    /// `None` for suffixed ids such as `10a`.
    pub fn numeric_id(&self) -> Option<u32> {
        parse_backbone_id(&self.backbone_id)
    }
}

pub fn parse_backbone_id(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u32>().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinyinBlock {
    pub block: String,
    pub cons: String,
    pub vow: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinyinWord {
    pub pinyin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneCombo {
    pub tone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Word(Word),
    Character(Character),
    Radical(Radical),
    Backbone(BackboneNode),
    Person(Person),
    PinyinBlock(PinyinBlock),
    PinyinWord(PinyinWord),
    ToneCombo(ToneCombo),
}

impl Node {
    pub fn label(&self) -> Label {
        match self {
            Node::Word(_) => Label::Word,
            Node::Character(_) => Label::Character,
            Node::Radical(_) => Label::Radical,
            Node::Backbone(_) => Label::Backbone,
            Node::Person(_) => Label::Person,
            Node::PinyinBlock(_) => Label::PinyinBlock,
            Node::PinyinWord(_) => Label::PinyinWord,
            Node::ToneCombo(_) => Label::ToneCombo,
        }
    }

    /// Value the store indexes this node by, unique within its label.
    pub fn key(&self) -> &str {
        match self {
            Node::Word(w) => &w.unique,
            Node::Character(c) => &c.simp,
            Node::Radical(r) => &r.simp,
            Node::Backbone(b) => &b.backbone_id,
            Node::Person(p) => &p.name,
            Node::PinyinBlock(b) => &b.block,
            Node::PinyinWord(p) => &p.pinyin,
            Node::ToneCombo(t) => &t.tone,
        }
    }

    /// Glyph for nodes that carry one.
    pub fn glyph(&self) -> Option<&str> {
        match self {
            Node::Word(w) => Some(&w.simp),
            Node::Character(c) => Some(&c.simp),
            Node::Radical(r) => Some(&r.simp),
            Node::Backbone(b) => Some(&b.simp),
            _ => None,
        }
    }
}
