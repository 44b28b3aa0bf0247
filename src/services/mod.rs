pub mod annotation;
pub mod backbone;
pub mod knowledge_state;
pub mod panel;
pub mod recommendation;
pub mod tone_matrix;
