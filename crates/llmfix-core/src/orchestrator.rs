//! Fix orchestration
//!
//! Decides when a fix is offered for a compiler diagnostic and runs the
//! repair on a background task. Each invocation builds a fresh model, owns
//! its own cancellation token and is abandoned as soon as the document
//! changes underneath it.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::builder::{BuildResult, ChatModelBuilder, ModelConfiguration, ProviderVariant};
use crate::config::FixConfig;
use crate::document::{Document, NodeId};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::providers::{ChatModel, Collected};
use crate::repair::{RepairEngine, RepairError, RepairOutcome, RepairRequest, RepairResult};
use crate::types::CancellationToken;
use crate::{log_debug, log_info, log_warn};

/// Compiler diagnostics a fix can be offered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnresolvedSymbol,
    IncompatibleTypes,
    Other,
}

impl DiagnosticKind {
    /// Classify a javac diagnostic key such as `compiler.err.cant.resolve.location`
    pub fn from_code(code: &str) -> Self {
        if code.starts_with("compiler.err.cant.resolve") {
            DiagnosticKind::UnresolvedSymbol
        } else if code == "compiler.err.prob.found.req" {
            DiagnosticKind::IncompatibleTypes
        } else {
            DiagnosticKind::Other
        }
    }

    pub fn is_fixable(&self) -> bool {
        matches!(self, DiagnosticKind::UnresolvedSymbol | DiagnosticKind::IncompatibleTypes)
    }
}

/// A compiler error attached to a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub node: NodeId,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(node: NodeId, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            node,
            kind,
            message: message.into(),
        }
    }
}

/// Produces a fresh chat model for every fix attempt
pub trait ChatModelFactory: Send + Sync {
    fn create(&self) -> BuildResult<Box<dyn ChatModel>>;
}

impl<F> ChatModelFactory for F
where
    F: Fn() -> BuildResult<Box<dyn ChatModel>> + Send + Sync,
{
    fn create(&self) -> BuildResult<Box<dyn ChatModel>> {
        self()
    }
}

/// Builds models from a provider and its configuration
pub struct ConfiguredModelFactory {
    provider: ProviderVariant,
    config: ModelConfiguration,
    streaming: bool,
    logger: SharedLogger,
}

impl ConfiguredModelFactory {
    pub fn new(provider: ProviderVariant, config: ModelConfiguration) -> Self {
        Self {
            provider,
            config,
            streaming: false,
            logger: Arc::new(NoOpLogger),
        }
    }

    pub fn from_config(config: &FixConfig) -> Self {
        Self::new(config.provider, config.model.clone())
    }

    /// Build streaming models and collect their tokens
    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }
}

impl ChatModelFactory for ConfiguredModelFactory {
    fn create(&self) -> BuildResult<Box<dyn ChatModel>> {
        let builder = self.config.apply(self.provider.builder());
        if self.streaming {
            let model = builder.build_streaming()?.with_logger(self.logger.clone());
            Ok(Box::new(Collected(model)))
        } else {
            Ok(Box::new(builder.build()?.with_logger(self.logger.clone())))
        }
    }
}

/// Offers and runs fixes for one document
pub struct FixOrchestrator {
    document: Document,
    factory: Arc<dyn ChatModelFactory>,
    engine: Arc<RepairEngine>,
    logger: SharedLogger,
}

impl FixOrchestrator {
    pub fn new(document: Document, factory: impl ChatModelFactory + 'static) -> Self {
        let logger: SharedLogger = Arc::new(NoOpLogger);
        Self {
            document,
            factory: Arc::new(factory),
            engine: Arc::new(RepairEngine::with_logger(logger.clone())),
            logger,
        }
    }

    pub fn from_config(document: Document, config: &FixConfig) -> Self {
        Self::new(document, ConfiguredModelFactory::from_config(config))
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.engine = Arc::new(RepairEngine::with_logger(logger.clone()));
        self.logger = logger;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The fix to offer for `diagnostic`, if any
    pub fn fixes_for(&self, diagnostic: &Diagnostic) -> Option<VariableFix> {
        if !diagnostic.kind.is_fixable() {
            return None;
        }
        let snapshot = self.document.snapshot();
        if !snapshot.source.node(diagnostic.node)?.kind().is_variable() {
            return None;
        }

        let target = crate::document::DeclarationHandle {
            node: diagnostic.node,
            version: snapshot.version,
        };
        Some(VariableFix {
            title: format!("Fix with AI: {}", diagnostic.message),
            request: RepairRequest::compilation_error(target, diagnostic.message.clone()),
            document: self.document.clone(),
            factory: self.factory.clone(),
            engine: self.engine.clone(),
            logger: self.logger.clone(),
        })
    }
}

/// A fix offered to the user; nothing runs until [`VariableFix::invoke`]
pub struct VariableFix {
    title: String,
    request: RepairRequest,
    document: Document,
    factory: Arc<dyn ChatModelFactory>,
    engine: Arc<RepairEngine>,
    logger: SharedLogger,
}

impl VariableFix {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn request(&self) -> &RepairRequest {
        &self.request
    }

    /// Start the repair on a tokio task; must be called inside a runtime
    pub fn invoke(self) -> FixTask {
        let cancel_token = CancellationToken::new();
        let done = CancellationToken::new();
        log_info!(self.logger, "{}", self.title);

        spawn_change_watcher(
            &self.document,
            self.request.target.version,
            cancel_token.clone(),
            done.clone(),
        );

        let token = cancel_token.clone();
        let handle = tokio::spawn(async move {
            let result = run_fix(&self, &token).await;
            done.cancel();
            match &result {
                Ok(outcome) => log_debug!(self.logger, "fix finished: {:?}", outcome),
                Err(e) if e.is_user_visible() => log_warn!(self.logger, "fix failed: {}", e),
                Err(e) => log_debug!(self.logger, "fix failed: {}", e),
            }
            result
        });

        FixTask {
            cancel_token,
            handle,
        }
    }
}

async fn run_fix(fix: &VariableFix, cancel_token: &CancellationToken) -> RepairResult<RepairOutcome> {
    let model = fix.factory.create()?;
    fix.engine
        .repair(&fix.document, &fix.request, model.as_ref(), cancel_token)
        .await
}

/// Cancel the attempt once the document moves past `version`
fn spawn_change_watcher(
    document: &Document,
    version: u64,
    cancel_token: CancellationToken,
    done: CancellationToken,
) {
    let mut changes = document.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = done.cancelled() => break,
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if *changes.borrow() != version {
                        cancel_token.cancel();
                        break;
                    }
                }
            }
        }
    });
}

/// A running fix attempt
pub struct FixTask {
    cancel_token: CancellationToken,
    handle: JoinHandle<RepairResult<RepairOutcome>>,
}

impl FixTask {
    /// Abandon the attempt; the document is left untouched unless it already committed
    pub fn dismiss(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn outcome(self) -> RepairResult<RepairOutcome> {
        self.handle
            .await
            .map_err(|e| RepairError::Worker(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConfigurationError;
    use crate::document::Phase;
    use crate::logging::MemoryLogger;
    use crate::providers::MockChatModel;
    use crate::repair::SkipReason;
    use std::time::Duration;

    const SOURCE: &str = "package app;\n\nclass Holder {\n    private Foo foo;\n}\n";
    const FIX: &str = r#"{"imports":["com.example.Foo"],"variableContent":"new Foo()"}"#;

    fn document() -> Document {
        let doc = Document::parse(SOURCE).unwrap();
        doc.set_phase(Phase::Resolved);
        doc
    }

    fn mock_factory(response: &'static str, delay: Duration) -> impl ChatModelFactory {
        move || -> BuildResult<Box<dyn ChatModel>> {
            Ok(Box::new(MockChatModel::fixed(response).with_delay(delay)))
        }
    }

    fn unresolved(doc: &Document) -> Diagnostic {
        let node = doc.handle_for_variable("foo").unwrap().node;
        Diagnostic::new(node, DiagnosticKind::UnresolvedSymbol, "cannot find symbol: Foo")
    }

    #[test]
    fn test_diagnostic_kind_from_code() {
        assert_eq!(DiagnosticKind::from_code("compiler.err.cant.resolve"), DiagnosticKind::UnresolvedSymbol);
        assert_eq!(
            DiagnosticKind::from_code("compiler.err.cant.resolve.location"),
            DiagnosticKind::UnresolvedSymbol
        );
        assert_eq!(DiagnosticKind::from_code("compiler.err.prob.found.req"), DiagnosticKind::IncompatibleTypes);
        assert_eq!(DiagnosticKind::from_code("compiler.err.missing.ret.stmt"), DiagnosticKind::Other);
    }

    #[test]
    fn test_fix_offered_for_variable_diagnostics() {
        let doc = document();
        let orchestrator = FixOrchestrator::new(doc.clone(), mock_factory(FIX, Duration::ZERO));

        let fix = orchestrator.fixes_for(&unresolved(&doc)).unwrap();
        assert_eq!(fix.title(), "Fix with AI: cannot find symbol: Foo");
        assert_eq!(fix.request().diagnostic.as_deref(), Some("cannot find symbol: Foo"));

        let node = doc.handle_for_variable("foo").unwrap().node;
        let incompatible = Diagnostic::new(node, DiagnosticKind::IncompatibleTypes, "incompatible types");
        assert!(orchestrator.fixes_for(&incompatible).is_some());

        let other = Diagnostic::new(node, DiagnosticKind::Other, "missing return");
        assert!(orchestrator.fixes_for(&other).is_none());

        let package = doc.snapshot().source.nodes()[0].id();
        let on_package = Diagnostic::new(package, DiagnosticKind::UnresolvedSymbol, "cannot find symbol");
        assert!(orchestrator.fixes_for(&on_package).is_none());
    }

    #[test]
    fn test_fix_offered_for_real_world_declarations() {
        for decl in [
            "private Foo foo; // TODO inject",
            "@Inject(optional = true) Foo foo;",
            "Map<String, Foo> foo =\n        new HashMap<>();",
            "private Foo foo;\t/* broken */",
        ] {
            let doc = Document::parse(&format!("package app;\n\nclass Holder {{\n    {decl}\n}}\n")).unwrap();
            doc.set_phase(Phase::Resolved);
            let orchestrator = FixOrchestrator::new(doc.clone(), mock_factory(FIX, Duration::ZERO));

            let handle = doc.handle_for_variable("foo");
            assert!(handle.is_some(), "{decl:?} not recognised as a declaration");
            let fix = orchestrator.fixes_for(&unresolved(&doc));
            assert!(fix.is_some(), "no fix offered for {decl:?}");
        }
    }

    #[tokio::test]
    async fn test_multi_line_declaration_is_repaired() {
        let doc = Document::parse(
            "package app;\n\nclass Holder {\n    Map<String, Foo> foo =\n        new HashMap<>();\n}\n",
        )
        .unwrap();
        doc.set_phase(Phase::Resolved);
        let answer = r#"{"imports":["java.util.Map","java.util.TreeMap"],"variableContent":"new TreeMap<>()"}"#;
        let orchestrator = FixOrchestrator::new(doc.clone(), mock_factory(answer, Duration::ZERO));

        let outcome = orchestrator
            .fixes_for(&unresolved(&doc))
            .unwrap()
            .invoke()
            .outcome()
            .await
            .unwrap();

        assert!(outcome.is_applied());
        assert_eq!(
            doc.text(),
            "package app;\n\nimport java.util.Map;\nimport java.util.TreeMap;\n\nclass Holder {\n    Map<String, Foo> foo =\n        new TreeMap<>();\n}\n"
        );
    }

    #[tokio::test]
    async fn test_invoke_applies_fix() {
        let doc = document();
        let logger = Arc::new(MemoryLogger::new());
        let orchestrator =
            FixOrchestrator::new(doc.clone(), mock_factory(FIX, Duration::ZERO)).with_logger(logger.clone());

        let outcome = orchestrator
            .fixes_for(&unresolved(&doc))
            .unwrap()
            .invoke()
            .outcome()
            .await
            .unwrap();

        assert!(outcome.is_applied());
        assert!(doc.text().contains("import com.example.Foo;"));
        assert!(doc.text().contains("private Foo foo = new Foo();"));
        assert!(logger.contains("Fix with AI: cannot find symbol: Foo"));
    }

    #[tokio::test]
    async fn test_dismiss_cancels_attempt() {
        let doc = document();
        let orchestrator = FixOrchestrator::new(doc.clone(), mock_factory(FIX, Duration::from_secs(30)));

        let task = orchestrator.fixes_for(&unresolved(&doc)).unwrap().invoke();
        tokio::time::sleep(Duration::from_millis(20)).await;
        task.dismiss();

        let outcome = task.outcome().await.unwrap();
        assert_eq!(outcome, RepairOutcome::Skipped(SkipReason::Cancelled));
        assert_eq!(doc.text(), SOURCE);
    }

    #[tokio::test]
    async fn test_document_change_abandons_attempt() {
        let doc = document();
        let orchestrator = FixOrchestrator::new(doc.clone(), mock_factory(FIX, Duration::from_secs(30)));

        let task = orchestrator.fixes_for(&unresolved(&doc)).unwrap().invoke();
        tokio::time::sleep(Duration::from_millis(20)).await;
        doc.append_line("// typed while waiting").unwrap();

        let outcome = task.outcome().await.unwrap();
        assert_eq!(outcome, RepairOutcome::Skipped(SkipReason::Cancelled));
        assert_eq!(doc.text(), format!("{SOURCE}// typed while waiting\n"));
    }

    #[tokio::test]
    async fn test_missing_mandatory_field_reported() {
        let doc = document();
        let config = FixConfig::new(ProviderVariant::LocalAi);
        let orchestrator = FixOrchestrator::from_config(doc.clone(), &config);

        let err = orchestrator
            .fixes_for(&unresolved(&doc))
            .unwrap()
            .invoke()
            .outcome()
            .await
            .unwrap_err();

        assert!(matches!(err, RepairError::Configuration(ConfigurationError::MissingField { .. })));
        assert_eq!(doc.text(), SOURCE);
    }

    #[test]
    fn test_configured_factory_builds_without_network() {
        let config = FixConfig::new(ProviderVariant::Ollama).with_model(ModelConfiguration {
            model_name: Some("llama3".into()),
            ..Default::default()
        });

        let model = ConfiguredModelFactory::from_config(&config).create().unwrap();
        assert_eq!(model.model_name(), "llama3");

        let streaming = ConfiguredModelFactory::from_config(&config)
            .streaming(true)
            .create()
            .unwrap();
        assert_eq!(streaming.model_name(), "llama3");
    }
}
