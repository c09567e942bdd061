//! Errors raised while parsing or editing a document

use super::tree::NodeId;
use thiserror::Error;

/// The Java grammar could not be loaded or produced no tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("java grammar unavailable: {0}")]
    Language(String),

    #[error("parser produced no syntax tree")]
    NoTree,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("document changed since the fix was computed (version {expected}, now {actual})")]
    Stale { expected: u64, actual: u64 },

    #[error("no node {0} in document")]
    NodeNotFound(NodeId),

    #[error("node {0} is not a variable declaration")]
    NotAVariable(NodeId),

    #[error("invalid import: {0:?}")]
    InvalidImport(String),

    #[error("edited text no longer parses: {0}")]
    Parse(#[from] ParseError),
}

pub type TransactionResult<T> = Result<T, TransactionError>;
