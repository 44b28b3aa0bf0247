//! Knowledge-state graph for vocabulary learners: word mastery tracking,
//! backbone curriculum navigation, study recommendations, text annotation and
//! panel summaries over an in-memory word/character/radical graph.

pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod services;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use graph::{GraphStore, MemoryGraphStore};
