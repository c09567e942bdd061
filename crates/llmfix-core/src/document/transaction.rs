//! Shared, versioned document with single-writer edit scopes
//!
//! All modifications go through an [`EditScope`]. The scope holds the
//! document lock, stages changes on a private copy, and publishes them in
//! one step on [`EditScope::commit`]. Dropping a scope without committing
//! discards everything staged, so readers never observe a partial edit.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tokio::sync::watch;

use super::error::{ParseError, TransactionError, TransactionResult};
use super::tree::{Expr, ImportDecl, NodeId, Phase, SourceDocument};

struct State {
    source: SourceDocument,
    version: u64,
}

struct Inner {
    state: Mutex<State>,
    changes: watch::Sender<u64>,
}

/// Handle to an open document; clones share the same buffer
#[derive(Clone)]
pub struct Document {
    inner: Arc<Inner>,
}

/// A declaration as seen at a given document version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclarationHandle {
    pub node: NodeId,
    pub version: u64,
}

/// Immutable copy of the document at one version
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub source: SourceDocument,
    pub version: u64,
}

impl Document {
    pub fn new(source: SourceDocument) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State { source, version: 0 }),
                changes,
            }),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Ok(Self::new(SourceDocument::parse(text)?))
    }

    pub fn version(&self) -> u64 {
        self.inner.state.lock().version
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.lock().source.phase
    }

    /// Record analysis progress; does not count as an edit
    pub fn set_phase(&self, phase: Phase) {
        self.inner.state.lock().source.phase = phase;
    }

    pub fn text(&self) -> String {
        self.inner.state.lock().source.text().to_string()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.inner.state.lock();
        Snapshot {
            source: state.source.clone(),
            version: state.version,
        }
    }

    /// Receives the new version after every committed edit
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    pub fn handle(&self, node: NodeId) -> DeclarationHandle {
        DeclarationHandle {
            node,
            version: self.version(),
        }
    }

    pub fn handle_for_variable(&self, name: &str) -> Option<DeclarationHandle> {
        let state = self.inner.state.lock();
        state
            .source
            .find_variable(name)
            .map(|node| DeclarationHandle {
                node,
                version: state.version,
            })
    }

    /// Open an edit scope against the current version
    pub fn edit(&self) -> EditScope<'_> {
        let guard = self.inner.state.lock();
        EditScope::new(guard, &self.inner.changes)
    }

    /// Open an edit scope only if the document is still at `version`
    pub fn edit_at(&self, version: u64) -> TransactionResult<EditScope<'_>> {
        let guard = self.inner.state.lock();
        if guard.version != version {
            return Err(TransactionError::Stale {
                expected: version,
                actual: guard.version,
            });
        }
        Ok(EditScope::new(guard, &self.inner.changes))
    }

    /// Append a line as a user keystroke would; returns the new version
    pub fn append_line(&self, line: &str) -> TransactionResult<u64> {
        let mut scope = self.edit();
        scope.staged.append_line(line)?;
        scope.changed = true;
        Ok(scope.commit())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Document")
            .field("version", &state.version)
            .field("phase", &state.source.phase)
            .finish()
    }
}

/// Exclusive edit of a [`Document`]
pub struct EditScope<'a> {
    guard: MutexGuard<'a, State>,
    changes: &'a watch::Sender<u64>,
    staged: SourceDocument,
    changed: bool,
}

impl<'a> EditScope<'a> {
    fn new(guard: MutexGuard<'a, State>, changes: &'a watch::Sender<u64>) -> Self {
        let staged = guard.source.clone();
        Self {
            guard,
            changes,
            staged,
            changed: false,
        }
    }

    /// Working copy including staged changes
    pub fn source(&self) -> &SourceDocument {
        &self.staged
    }

    pub fn version(&self) -> u64 {
        self.guard.version
    }

    /// Stage `spec` as an import; `Ok(false)` when it is already visible
    pub fn add_import(&mut self, spec: &str) -> TransactionResult<bool> {
        let import = ImportDecl::from_specifier(spec)?;
        let added = self.staged.add_import(import)?;
        self.changed |= added;
        Ok(added)
    }

    pub fn replace_initializer(&mut self, node: NodeId, expr: Expr) -> TransactionResult<()> {
        self.staged.replace_initializer(node, expr)?;
        self.changed = true;
        Ok(())
    }

    /// Publish staged changes; returns the resulting version
    pub fn commit(self) -> u64 {
        let EditScope {
            mut guard,
            changes,
            staged,
            changed,
        } = self;
        if !changed {
            return guard.version;
        }
        guard.source = staged;
        guard.version += 1;
        let version = guard.version;
        drop(guard);
        changes.send_replace(version);
        version
    }

    /// Discard staged changes
    pub fn rollback(self) {}
}
