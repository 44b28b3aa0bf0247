use crate::graph::model::RelationKind;
use crate::graph::GraphError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("user already exists: {0}")]
    UserExists(String),
    #[error("inconsistent state: {found} knowledge relations between {user} and {word}")]
    InconsistentState {
        user: String,
        word: String,
        found: usize,
    },
    #[error("stale transition: expected {expected:?}, found {actual:?}")]
    StaleTransition {
        expected: RelationKind,
        actual: RelationKind,
    },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type CoreResult<T> = Result<T, CoreError>;
