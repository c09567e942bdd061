//! In-memory model of the Java source document being repaired

mod error;
mod parse;
mod transaction;
mod tree;

pub use error::{ParseError, TransactionError, TransactionResult};
pub use transaction::{DeclarationHandle, Document, EditScope, Snapshot};
pub use tree::{
    is_identifier, is_valid_import_path, Expr, ImportDecl, LineEnding, Node, NodeId, NodeKind, Phase,
    SourceDocument, VariableDecl,
};
