//! llmfix Core
//!
//! Repairs broken variable declarations with a large language model and
//! applies the suggested fix to the live document in one atomic edit.
//!
//! Two halves:
//! - `builder` / `providers`: one configuration contract driving many LLM
//!   backends, each honoring the options it supports and ignoring the rest
//! - `repair` / `document`: turns an untrusted JSON answer into a verified
//!   edit of the tree-sitter outline, reconciling imports
//!
//! ```rust,ignore
//! use llmfix_core::{Document, FixOrchestrator, Diagnostic, DiagnosticKind};
//! use llmfix_core::config::{ConfigProvider, FileConfigProvider};
//!
//! let config = FileConfigProvider::user().load().await?.expect("configured");
//! let orchestrator = FixOrchestrator::from_config(document.clone(), &config);
//!
//! if let Some(fix) = orchestrator.fixes_for(&diagnostic) {
//!     println!("{}", fix.title()); // "Fix with AI: cannot find symbol: Foo"
//!     let outcome = fix.invoke().outcome().await?;
//! }
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod catalog;
pub mod builder;
pub mod providers;
pub mod document;
pub mod repair;
pub mod orchestrator;

// Re-export commonly used types
pub use types::{CancellationToken, ChatMessage, MessageRole};

pub use logging::{ConsoleLogger, Logger, MemoryLogger, NoOpLogger, SharedLogger};

pub use config::{ConfigProvider, FileConfigProvider, FixConfig, MemoryConfigProvider};

pub use catalog::{find_by_name, CatalogEntry};

pub use builder::{
    ChatModelBuilder, ConfigurationError, ModelConfiguration, ModelOption, ProviderBuilder,
    ProviderVariant, ResolvedModel,
};

pub use providers::{
    ChatModel, GenaiChatModel, GenaiStreamingChatModel, MockChatModel, ProviderError,
    StreamingChatModel,
};

pub use document::{DeclarationHandle, Document, ParseError, Phase, TransactionError};

pub use repair::{
    FixAction, RepairEngine, RepairError, RepairOutcome, RepairParseError, RepairRequest,
    SkipReason,
};

pub use orchestrator::{
    ChatModelFactory, ConfiguredModelFactory, Diagnostic, DiagnosticKind, FixOrchestrator,
    FixTask, VariableFix,
};
