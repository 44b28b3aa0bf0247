#![allow(dead_code)]

use graphan_core::graph::seed::{
    BackboneRecord, CharacterRadicalsRecord, CharacterRankRecord, Dataset, PinyinBlockRecord,
    RadicalRecord, Seeder, WordRecord,
};
use graphan_core::graph::Graph;
use graphan_core::services::knowledge_state;
use graphan_core::MemoryGraphStore;

pub const BOB: &str = "Bob";

pub fn word(simp: &str, level: u8, pinyin: &str, eng: &str) -> WordRecord {
    WordRecord {
        simp: simp.to_string(),
        trad: simp.to_string(),
        level,
        pinyin: pinyin.to_string(),
        pinyin_tonemarks: String::new(),
        eng: eng.to_string(),
    }
}

pub fn backbone(id: &str, simp: &str, parts: &[&str]) -> BackboneRecord {
    BackboneRecord {
        backbone_id: id.to_string(),
        simp: simp.to_string(),
        parts: parts.iter().map(|p| p.to_string()).collect(),
    }
}

fn radical(simp: &str, variant_of: Option<&str>) -> RadicalRecord {
    RadicalRecord {
        simp: simp.to_string(),
        variant_of: variant_of.map(str::to_string),
        note: None,
    }
}

fn rank(character: &str, rank: u32) -> CharacterRankRecord {
    CharacterRankRecord {
        character: character.to_string(),
        rank,
    }
}

/// Eleven words, seven of them fully inside the backbone.
///
/// Backbone: 1 一, 2 八, 3 人, 4 大 (parts 1, 3), 4a 亻, 5 正 (part 1),
/// 6 在 (part 4a), 7 木 (part 7a), 7a 木.
pub fn dataset() -> Dataset {
    Dataset {
        pinyin_blocks: vec![
            PinyinBlockRecord {
                block: "zheng".to_string(),
                cons: "zh".to_string(),
                vow: "eng".to_string(),
            },
            PinyinBlockRecord {
                block: "zai".to_string(),
                cons: "z".to_string(),
                vow: "ai".to_string(),
            },
        ],
        radicals: vec![
            radical("一", None),
            radical("八", None),
            radical("丷", Some("八")),
            radical("亻", None),
            radical("木", None),
        ],
        words: vec![
            word("一", 1, "yi1", "one"),
            word("八", 1, "ba1", "eight"),
            word("人", 1, "ren2", "person"),
            word("大", 1, "da4", "big"),
            word("在", 1, "zai4", "at"),
            word("正在", 4, "zheng4zai4", "in the process of"),
            word("大人", 2, "da4ren2", "adult"),
            word("鱼", 1, "yu2", "fish"),
            word("累", 2, "lei4", "tired"),
            word("累", 5, "lei3", "to accumulate"),
            word("工作", 1, "gong1zuo4", "work"),
        ],
        character_ranks: vec![rank("一", 2), rank("在", 7), rank("人", 9), rank("大", 21)],
        character_radicals: vec![CharacterRadicalsRecord {
            character: "在".to_string(),
            radicals: vec!["亻".to_string()],
        }],
        backbone: vec![
            backbone("1", "一", &[]),
            backbone("2", "八", &[]),
            backbone("3", "人", &[]),
            backbone("4", "大", &["1", "3"]),
            backbone("4a", "亻", &[]),
            backbone("5", "正", &["1"]),
            backbone("6", "在", &["4a"]),
            backbone("7", "木", &["7a"]),
            backbone("7a", "木", &[]),
        ],
    }
}

pub fn seeded_store(dataset: &Dataset) -> MemoryGraphStore {
    let mut graph = Graph::new();
    Seeder::new(&mut graph)
        .seed(dataset)
        .expect("fixture dataset seeds");
    MemoryGraphStore::from_graph(graph)
}

/// Fixture graph with Bob signed up (IGNORES on every word).
pub fn store_with_bob() -> MemoryGraphStore {
    let store = seeded_store(&dataset());
    knowledge_state::register_user(&store, BOB, "$2b$12$fixturehash").expect("signup");
    store
}
