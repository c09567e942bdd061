//! Diagnostic repair engine
//!
//! One attempt runs gate, classify, invoke, parse and apply in that order.
//! Preconditions that do not hold end the attempt as a silent
//! [`RepairOutcome::Skipped`]; only a fully validated answer ever reaches the
//! document, and it lands in a single commit.

use std::sync::Arc;

use super::error::{RepairParseError, RepairResult};
use super::prompt::repair_messages;
use super::response::{parse_response, RepairResponse};
use crate::document::{DeclarationHandle, Document, Expr, NodeKind, Phase};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::providers::ChatModel;
use crate::types::CancellationToken;
use crate::{log_debug, log_info, log_warn};

/// What kind of repair is requested
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixAction {
    /// Fix a declaration the compiler rejects
    CompilationError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairRequest {
    pub target: DeclarationHandle,
    pub diagnostic: Option<String>,
    pub action: FixAction,
}

impl RepairRequest {
    pub fn new(target: DeclarationHandle, action: FixAction) -> Self {
        Self {
            target,
            diagnostic: None,
            action,
        }
    }

    pub fn compilation_error(target: DeclarationHandle, diagnostic: impl Into<String>) -> Self {
        Self {
            target,
            diagnostic: Some(diagnostic.into()),
            action: FixAction::CompilationError,
        }
    }
}

/// Why an attempt ended without touching the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Document not resolved far enough for reliable bindings
    Unresolved,
    /// Target or action kind is not something this engine repairs
    NotApplicable,
    /// The declaration no longer exists
    MissingElement,
    /// The model answered with no content
    EmptyResponse,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    Applied {
        /// Imports actually inserted; already-visible ones are left out
        imports_added: Vec<String>,
        replacement: String,
        /// Document version after the commit
        version: u64,
    },
    Skipped(SkipReason),
}

impl RepairOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RepairOutcome::Applied { .. })
    }
}

pub struct RepairEngine {
    logger: SharedLogger,
}

impl Default for RepairEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RepairEngine {
    pub fn new() -> Self {
        Self {
            logger: Arc::new(NoOpLogger),
        }
    }

    pub fn with_logger(logger: SharedLogger) -> Self {
        Self { logger }
    }

    pub async fn repair(
        &self,
        document: &Document,
        request: &RepairRequest,
        model: &dyn ChatModel,
        cancel_token: &CancellationToken,
    ) -> RepairResult<RepairOutcome> {
        let snapshot = document.snapshot();
        if snapshot.source.phase() < Phase::Resolved {
            log_debug!(self.logger, "repair skipped: document is {:?}", snapshot.source.phase());
            return Ok(RepairOutcome::Skipped(SkipReason::Unresolved));
        }
        if snapshot.version != request.target.version {
            return Err(crate::document::TransactionError::Stale {
                expected: request.target.version,
                actual: snapshot.version,
            }
            .into());
        }

        let Some(node) = snapshot.source.node(request.target.node) else {
            log_debug!(self.logger, "repair skipped: node {} is gone", request.target.node);
            return Ok(RepairOutcome::Skipped(SkipReason::MissingElement));
        };
        let (declaration, diagnostic) = match (node.kind(), request.action, &request.diagnostic) {
            (NodeKind::Variable(var), FixAction::CompilationError, Some(diagnostic))
                if !diagnostic.trim().is_empty() =>
            {
                (var.to_string(), diagnostic.as_str())
            }
            _ => return Ok(RepairOutcome::Skipped(SkipReason::NotApplicable)),
        };

        log_info!(
            self.logger,
            "asking {} to fix `{}` ({})",
            model.model_name(),
            declaration,
            diagnostic
        );
        let messages = repair_messages(&declaration, diagnostic);
        let answer = match cancel_token
            .run_until(model.chat(messages, cancel_token.clone()))
            .await
        {
            None => return Ok(RepairOutcome::Skipped(SkipReason::Cancelled)),
            Some(Err(e)) if e.is_cancelled() => {
                return Ok(RepairOutcome::Skipped(SkipReason::Cancelled))
            }
            Some(result) => result?,
        };
        if cancel_token.is_cancelled() {
            return Ok(RepairOutcome::Skipped(SkipReason::Cancelled));
        }

        let Some(content) = answer.filter(|text| !text.trim().is_empty()) else {
            log_debug!(self.logger, "repair skipped: empty model response");
            return Ok(RepairOutcome::Skipped(SkipReason::EmptyResponse));
        };
        log_debug!(self.logger, "model response: {}", content);

        let response = parse_response(&content).map_err(|e: RepairParseError| {
            log_warn!(self.logger, "unusable model response: {}", e);
            e
        })?;

        self.apply(document, request.target, response)
    }

    fn apply(
        &self,
        document: &Document,
        target: DeclarationHandle,
        response: RepairResponse,
    ) -> RepairResult<RepairOutcome> {
        let mut scope = document.edit_at(target.version)?;

        let mut imports_added = Vec::new();
        for import in response.imports {
            if scope.add_import(&import)? {
                imports_added.push(import);
            }
        }
        scope.replace_initializer(target.node, Expr::QualIdent(response.variable_content.clone()))?;
        let version = scope.commit();

        log_info!(
            self.logger,
            "applied fix at version {}: {} import(s) added, initializer `{}`",
            version,
            imports_added.len(),
            response.variable_content
        );
        Ok(RepairOutcome::Applied {
            imports_added,
            replacement: response.variable_content,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;
    use crate::providers::MockChatModel;
    use crate::repair::RepairError;
    use crate::document::TransactionError;
    use std::time::Duration;

    const SOURCE: &str = "package app;\n\nclass Holder {\n    private Foo foo;\n}\n";
    const FIX: &str = r#"{"imports":["com.example.Foo"],"variableContent":"new Foo()"}"#;

    fn resolved(text: &str) -> Document {
        let doc = Document::parse(text).unwrap();
        doc.set_phase(Phase::Resolved);
        doc
    }

    fn request(doc: &Document) -> RepairRequest {
        let handle = doc.handle_for_variable("foo").unwrap();
        RepairRequest::compilation_error(handle, "cannot find symbol: Foo")
    }

    async fn run(doc: &Document, req: &RepairRequest, model: &MockChatModel) -> RepairResult<RepairOutcome> {
        RepairEngine::new()
            .repair(doc, req, model, &CancellationToken::new())
            .await
    }

    #[tokio::test]
    async fn test_applies_import_and_initializer() {
        let doc = resolved(SOURCE);
        let model = MockChatModel::fixed(FIX);

        let outcome = run(&doc, &request(&doc), &model).await.unwrap();

        assert_eq!(
            outcome,
            RepairOutcome::Applied {
                imports_added: vec!["com.example.Foo".into()],
                replacement: "new Foo()".into(),
                version: 1,
            }
        );
        assert_eq!(
            doc.text(),
            "package app;\n\nimport com.example.Foo;\n\nclass Holder {\n    private Foo foo = new Foo();\n}\n"
        );
        assert_eq!(doc.version(), 1);
    }

    #[tokio::test]
    async fn test_prompt_contains_declaration_and_diagnostic() {
        let doc = resolved(SOURCE);
        let model = MockChatModel::fixed(FIX);
        run(&doc, &request(&doc), &model).await.unwrap();

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        let user = &requests[0][1].content;
        assert!(user.contains("private Foo foo"));
        assert!(user.contains("cannot find symbol: Foo"));
    }

    #[tokio::test]
    async fn test_fenced_response_applies_identically() {
        let plain = resolved(SOURCE);
        let fenced = resolved(SOURCE);

        run(&plain, &request(&plain), &MockChatModel::fixed(FIX)).await.unwrap();
        run(
            &fenced,
            &request(&fenced),
            &MockChatModel::fixed(format!("Sure:\n```json\n{FIX}\n```")),
        )
        .await
        .unwrap();

        assert_eq!(plain.text(), fenced.text());
    }

    #[tokio::test]
    async fn test_unresolved_document_is_skipped() {
        for phase in [Phase::Parsed, Phase::ElementsResolved] {
            let doc = Document::parse(SOURCE).unwrap();
            doc.set_phase(phase);
            let model = MockChatModel::fixed(FIX);

            let outcome = run(&doc, &request(&doc), &model).await.unwrap();

            assert_eq!(outcome, RepairOutcome::Skipped(SkipReason::Unresolved));
            assert_eq!(model.call_count(), 0);
            assert_eq!(doc.text(), SOURCE);
        }
    }

    #[tokio::test]
    async fn test_up_to_date_passes_gate() {
        let doc = Document::parse(SOURCE).unwrap();
        doc.set_phase(Phase::UpToDate);
        let outcome = run(&doc, &request(&doc), &MockChatModel::fixed(FIX)).await.unwrap();
        assert!(outcome.is_applied());
    }

    #[tokio::test]
    async fn test_empty_response_is_silent_noop() {
        let doc = resolved(SOURCE);
        for model in [MockChatModel::empty(), MockChatModel::fixed("  \n ")] {
            let outcome = run(&doc, &request(&doc), &model).await.unwrap();
            assert_eq!(outcome, RepairOutcome::Skipped(SkipReason::EmptyResponse));
        }
        assert_eq!(doc.text(), SOURCE);
        assert_eq!(doc.version(), 0);
    }

    #[tokio::test]
    async fn test_empty_replacement_is_parse_error_without_mutation() {
        let doc = resolved(SOURCE);
        let model = MockChatModel::fixed(r#"{"imports":[],"variableContent":""}"#);

        let err = run(&doc, &request(&doc), &model).await.unwrap_err();

        assert!(matches!(err, RepairError::Parse(RepairParseError::EmptyReplacement)));
        assert!(err.is_user_visible());
        assert_eq!(doc.text(), SOURCE);
    }

    #[tokio::test]
    async fn test_parse_failure_adds_no_imports() {
        let doc = resolved(SOURCE);
        let model = MockChatModel::fixed(
            r#"{"imports":["com.example.Foo","bad import"],"variableContent":"new Foo()"}"#,
        );

        let err = run(&doc, &request(&doc), &model).await.unwrap_err();

        assert!(matches!(err, RepairError::Parse(RepairParseError::InvalidImport(_))));
        assert_eq!(doc.snapshot().source.imports().count(), 0);
        assert_eq!(doc.text(), SOURCE);

        let err = run(&doc, &request(&doc), &MockChatModel::fixed("not json"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepairError::Parse(RepairParseError::Json(_))));
        assert_eq!(doc.text(), SOURCE);
    }

    #[tokio::test]
    async fn test_visible_imports_are_not_duplicated() {
        let doc = resolved(
            "package app;\n\nimport java.util.*;\n\nclass Holder {\n    private List<String> foo;\n}\n",
        );
        let model = MockChatModel::fixed(
            r#"{"imports":["java.util.List","java.util.ArrayList","java.lang.String","app.Local"],"variableContent":"new ArrayList<>()"}"#,
        );

        match run(&doc, &request(&doc), &model).await.unwrap() {
            RepairOutcome::Applied { imports_added, .. } => assert!(imports_added.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(doc.snapshot().source.imports().count(), 1);
        assert!(doc.text().contains("private List<String> foo = new ArrayList<>();"));
    }

    #[tokio::test]
    async fn test_existing_initializer_is_replaced() {
        let doc = resolved("class Holder {\n    Foo foo = new Bar();\n}");
        let model = MockChatModel::fixed(r#"{"imports":[],"variableContent":"Foo.create()"}"#);
        run(&doc, &request(&doc), &model).await.unwrap();
        assert_eq!(doc.text(), "class Holder {\n    Foo foo = Foo.create();\n}");
    }

    #[tokio::test]
    async fn test_not_applicable_targets() {
        let doc = resolved(SOURCE);
        let model = MockChatModel::fixed(FIX);

        let package = doc.snapshot().source.nodes()[0].id();
        let not_variable = RepairRequest::compilation_error(doc.handle(package), "oops");
        let no_diagnostic = RepairRequest::new(doc.handle_for_variable("foo").unwrap(), FixAction::CompilationError);
        let blank_diagnostic = RepairRequest::compilation_error(doc.handle_for_variable("foo").unwrap(), " ");

        for req in [not_variable, no_diagnostic, blank_diagnostic] {
            let outcome = run(&doc, &req, &model).await.unwrap();
            assert_eq!(outcome, RepairOutcome::Skipped(SkipReason::NotApplicable));
        }
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_node_is_skipped() {
        let doc = resolved(SOURCE);
        let gone = DeclarationHandle {
            node: crate::document::NodeId(99),
            version: 0,
        };
        let outcome = run(&doc, &RepairRequest::compilation_error(gone, "x"), &MockChatModel::fixed(FIX))
            .await
            .unwrap();
        assert_eq!(outcome, RepairOutcome::Skipped(SkipReason::MissingElement));
    }

    #[tokio::test]
    async fn test_stale_handle_is_rejected() {
        let doc = resolved(SOURCE);
        let req = request(&doc);
        doc.append_line("// typed").unwrap();

        let err = run(&doc, &req, &MockChatModel::fixed(FIX)).await.unwrap_err();
        assert!(matches!(err, RepairError::Transaction(TransactionError::Stale { .. })));
        assert!(err.is_user_visible());
    }

    #[tokio::test]
    async fn test_edit_during_model_call_discards_answer() {
        let doc = resolved(SOURCE);
        let req = request(&doc);
        let model = MockChatModel::fixed(FIX).with_delay(Duration::from_millis(100));

        let typist = doc.clone();
        let typing = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            typist.append_line("// typed while waiting").unwrap()
        });

        let err = run(&doc, &req, &model).await.unwrap_err();
        assert_eq!(typing.await.unwrap(), 1);

        assert_eq!(model.call_count(), 1);
        assert!(matches!(
            err,
            RepairError::Transaction(TransactionError::Stale {
                expected: 0,
                actual: 1
            })
        ));
        assert_eq!(doc.text(), format!("{SOURCE}// typed while waiting\n"));
        assert_eq!(doc.snapshot().source.imports().count(), 0);
        assert!(!doc.text().contains("new Foo()"));
    }

    #[tokio::test]
    async fn test_cancellation_is_silent() {
        let doc = resolved(SOURCE);
        let model = MockChatModel::fixed(FIX).with_delay(Duration::from_secs(30));
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let outcome = RepairEngine::new()
            .repair(&doc, &request(&doc), &model, &cancel)
            .await
            .unwrap();
        assert_eq!(outcome, RepairOutcome::Skipped(SkipReason::Cancelled));
        assert_eq!(doc.text(), SOURCE);
    }

    #[tokio::test]
    async fn test_model_error_surfaces() {
        let doc = resolved(SOURCE);
        let logger = Arc::new(MemoryLogger::new());
        let engine = RepairEngine::with_logger(logger.clone());

        let err = engine
            .repair(&doc, &request(&doc), &MockChatModel::error("boom"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, RepairError::Model(_)));
        assert!(!err.is_user_visible());
        assert!(logger.contains("asking mock to fix"));
        assert_eq!(doc.text(), SOURCE);
    }
}
