//! In-memory knowledge graph.
//!
//! `store` holds the adjacency-list graph and the shared handle the services
//! read and write through, `query` the typed traversals the services compose,
//! and `seed` the typed bulk builder used to populate a graph.

pub mod model;
pub mod query;
pub mod seed;
pub mod store;

pub use model::{
    BackboneNode, Character, Edge, EdgeKind, EdgeProps, Label, Node, NodeId, Person, PinyinBlock,
    PinyinWord, Radical, RelationKind, ToneCombo, Word,
};
pub use store::{Graph, GraphStore, MemoryGraphStore};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("duplicate {label:?} key: {key}")]
    DuplicateKey { label: Label, key: String },
    #[error("{kind:?} cannot connect {from:?} to {to:?}")]
    EndpointMismatch {
        kind: EdgeKind,
        from: Label,
        to: Label,
    },
}
