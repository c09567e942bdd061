//! Java compilation unit as text plus an outline of the nodes a fix touches
//!
//! The text is the source of truth. Edits splice it in place and re-parse,
//! so everything outside the edited range, line endings included, is kept
//! byte for byte. A node keeps its id across edits that leave its name or
//! keyword in place.

use std::mem::discriminant;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::error::{ParseError, TransactionError, TransactionResult};
use super::parse::outline;

/// Stable identity of a node within one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How far semantic analysis has progressed; bindings are reliable from `Resolved` on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Parsed,
    ElementsResolved,
    Resolved,
    UpToDate,
}

/// `import [static] a.b.C;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub path: String,
    pub is_static: bool,
}

impl ImportDecl {
    /// Parse an import specifier as returned by a model: `a.b.C`, `a.b.*`
    /// or `static a.b.C.member`. A leading `import` and trailing `;` are tolerated.
    pub fn from_specifier(spec: &str) -> TransactionResult<Self> {
        let mut rest = spec.trim();
        rest = rest.strip_prefix("import ").map(str::trim_start).unwrap_or(rest);
        rest = rest.strip_suffix(';').map(str::trim_end).unwrap_or(rest);

        let (is_static, path) = match rest.strip_prefix("static ") {
            Some(p) => (true, p.trim()),
            None => (false, rest),
        };

        if !is_valid_import_path(path) {
            return Err(TransactionError::InvalidImport(spec.to_string()));
        }
        Ok(Self {
            path: path.to_string(),
            is_static,
        })
    }

    pub fn is_on_demand(&self) -> bool {
        self.path.ends_with(".*")
    }

    /// Package (or enclosing type) part of the path
    pub fn parent(&self) -> Option<&str> {
        self.path.rsplit_once('.').map(|(parent, _)| parent)
    }

    /// Whether this existing import already makes `other` visible
    pub fn covers(&self, other: &ImportDecl) -> bool {
        if self.is_static != other.is_static {
            return false;
        }
        if self.path == other.path {
            return true;
        }
        match (self.path.strip_suffix(".*"), other.is_on_demand()) {
            (Some(pkg), false) => other.parent() == Some(pkg),
            _ => false,
        }
    }
}

impl std::fmt::Display for ImportDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_static {
            write!(f, "import static {};", self.path)
        } else {
            write!(f, "import {};", self.path)
        }
    }
}

/// Identifier per Java rules, ASCII subset plus `$`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// `a.b.C` or `a.b.*`, at least two segments
pub fn is_valid_import_path(path: &str) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() < 2 {
        return false;
    }
    let last = segments.len() - 1;
    segments
        .iter()
        .enumerate()
        .all(|(i, seg)| is_identifier(seg) || (i == last && *seg == "*"))
}

/// Expression on the right-hand side of a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Text as it appeared in the source
    Source(String),
    /// Replacement built by a fix, inserted verbatim as a qualified-identifier expression
    QualIdent(String),
}

impl Expr {
    pub fn text(&self) -> &str {
        match self {
            Expr::Source(s) | Expr::QualIdent(s) => s,
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// `[modifiers] Type name [= initializer]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDecl {
    pub modifiers: Vec<String>,
    pub ty: String,
    pub name: String,
    pub initializer: Option<Expr>,
}

impl std::fmt::Display for VariableDecl {
    /// Declaration text without the trailing semicolon
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for m in &self.modifiers {
            write!(f, "{} ", m)?;
        }
        write!(f, "{} {}", self.ty, self.name)?;
        if let Some(init) = &self.initializer {
            write!(f, " = {}", init)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Package(String),
    Import(ImportDecl),
    Variable(VariableDecl),
}

impl NodeKind {
    pub fn is_variable(&self) -> bool {
        matches!(self, NodeKind::Variable(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    /// Whole declaration for packages and imports, the declarator for variables
    pub(crate) span: Range<usize>,
    /// Position used to recognise the node again after an edit
    pub(crate) anchor: usize,
    pub(crate) value: Option<Range<usize>>,
    pub(crate) line: usize,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Byte range in the document text
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Zero-based line the node starts on
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Line terminator used for inserted lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A parsed compilation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub(crate) text: String,
    pub(crate) line_ending: LineEnding,
    pub(crate) nodes: Vec<Node>,
    pub(crate) preamble_end: usize,
    pub(crate) phase: Phase,
    pub(crate) next_id: u32,
}

impl SourceDocument {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let outline = outline(text)?;
        Ok(Self {
            text: text.to_string(),
            line_ending: LineEnding::detect(text),
            next_id: outline.nodes.len() as u32,
            nodes: outline.nodes,
            preamble_end: outline.preamble_end,
            phase: Phase::Parsed,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn variable(&self, id: NodeId) -> Option<&VariableDecl> {
        match self.node(id).map(Node::kind) {
            Some(NodeKind::Variable(var)) => Some(var),
            _ => None,
        }
    }

    /// First declaration of `name`
    pub fn find_variable(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::Variable(var) if var.name == name => Some(n.id),
            _ => None,
        })
    }

    pub fn package(&self) -> Option<&str> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::Package(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.nodes.iter().filter_map(|n| match &n.kind {
            NodeKind::Import(import) => Some(import),
            _ => None,
        })
    }

    /// Whether `import` is already visible without adding a line: present,
    /// covered by an on-demand import, implicit (`java.lang`) or same package
    pub fn is_imported(&self, import: &ImportDecl) -> bool {
        if !import.is_static && !import.is_on_demand() {
            let parent = import.parent();
            if parent == Some("java.lang") || (parent.is_some() && parent == self.package()) {
                return true;
            }
        }
        self.imports().any(|existing| existing.covers(import))
    }

    /// Insert `import` on its own line; `false` when already visible
    ///
    /// Goes after the last import, else one blank line after the package,
    /// else above the first declaration below any leading comment block.
    pub(crate) fn add_import(&mut self, import: ImportDecl) -> TransactionResult<bool> {
        if self.is_imported(&import) {
            return Ok(false);
        }

        let nl = self.line_ending.as_str();
        let last_import = self
            .nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Import(_)))
            .map(|n| n.span.end)
            .max();
        let package = self
            .nodes
            .iter()
            .find(|n| matches!(n.kind, NodeKind::Package(_)))
            .map(|n| n.span.end);

        let (at, line) = match (last_import, package) {
            (Some(end), _) => (self.line_end(end), format!("{}{}", nl, import)),
            (None, Some(end)) => (self.line_end(end), format!("{}{}{}", nl, nl, import)),
            (None, None) => {
                let at = self.preamble_end;
                if at > 0 && !self.text[..at].ends_with('\n') {
                    (at, format!("{}{}{}", nl, import, nl))
                } else {
                    (at, format!("{}{}{}", import, nl, nl))
                }
            }
        };
        self.splice(at..at, &line)?;
        Ok(true)
    }

    /// Swap the declaration's initializer for `expr` (adding one if absent)
    pub(crate) fn replace_initializer(&mut self, id: NodeId, expr: Expr) -> TransactionResult<()> {
        let node = self.node(id).ok_or(TransactionError::NodeNotFound(id))?;
        if !node.kind.is_variable() {
            return Err(TransactionError::NotAVariable(id));
        }

        match node.value.clone() {
            Some(value) => self.splice(value, expr.text())?,
            None => {
                let end = node.span.end;
                self.splice(end..end, &format!(" = {}", expr))?
            }
        }
        Ok(())
    }

    /// Append a line at the end, e.g. when the user types
    pub(crate) fn append_line(&mut self, line: &str) -> Result<(), ParseError> {
        let nl = self.line_ending.as_str();
        let end = self.text.len();
        let appended = if end == 0 || self.text.ends_with('\n') {
            format!("{}{}", line, nl)
        } else {
            format!("{}{}{}", nl, line, nl)
        };
        self.splice(end..end, &appended)
    }

    /// End of the line containing `pos`, before its terminator
    fn line_end(&self, pos: usize) -> usize {
        let rest = &self.text[pos..];
        match rest.find('\n') {
            Some(i) if rest[..i].ends_with('\r') => pos + i - 1,
            Some(i) => pos + i,
            None => self.text.len(),
        }
    }

    /// Replace `range` with `replacement` and re-outline; nothing changes on error
    fn splice(&mut self, range: Range<usize>, replacement: &str) -> Result<(), ParseError> {
        let mut text = String::with_capacity(self.text.len() + replacement.len());
        text.push_str(&self.text[..range.start]);
        text.push_str(replacement);
        text.push_str(&self.text[range.end..]);
        let outline = outline(&text)?;

        let mut nodes = Vec::with_capacity(outline.nodes.len());
        for mut node in outline.nodes {
            let kept = self.nodes.iter().find(|old| {
                discriminant(&old.kind) == discriminant(&node.kind)
                    && shift(old.anchor, &range, replacement.len()) == Some(node.anchor)
            });
            node.id = match kept {
                Some(old) => old.id,
                None => {
                    let id = NodeId(self.next_id);
                    self.next_id += 1;
                    id
                }
            };
            nodes.push(node);
        }

        self.text = text;
        self.nodes = nodes;
        self.preamble_end = outline.preamble_end;
        Ok(())
    }
}

/// Where `pos` ends up once `range` is replaced by `inserted` bytes; `None` if it was removed
fn shift(pos: usize, range: &Range<usize>, inserted: usize) -> Option<usize> {
    if pos >= range.end {
        Some(pos - range.end + range.start + inserted)
    } else if pos < range.start {
        Some(pos)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(spec: &str) -> ImportDecl {
        ImportDecl::from_specifier(spec).unwrap()
    }

    fn parse(text: &str) -> SourceDocument {
        SourceDocument::parse(text).unwrap()
    }

    #[test]
    fn test_import_specifier_forms() {
        assert_eq!(import("com.example.Foo").path, "com.example.Foo");
        assert_eq!(import("import com.example.Foo;").path, "com.example.Foo");
        assert!(import("com.example.*").is_on_demand());

        let stat = import("static org.junit.Assert.assertEquals");
        assert!(stat.is_static);
        assert_eq!(stat.to_string(), "import static org.junit.Assert.assertEquals;");

        for bad in ["", "Foo", "com..Foo", "com.example.Foo Bar", "1com.Foo", "com.*.Foo"] {
            assert!(
                matches!(ImportDecl::from_specifier(bad), Err(TransactionError::InvalidImport(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_import_coverage() {
        assert!(import("java.util.*").covers(&import("java.util.List")));
        assert!(!import("java.util.*").covers(&import("java.util.concurrent.Future")));
        assert!(!import("java.util.List").covers(&import("java.util.Map")));
        assert!(!import("static a.B.c").covers(&import("a.B.c")));
    }

    #[test]
    fn test_is_imported_rules() {
        let doc = parse("package com.app;\n\nimport java.util.*;\n");
        assert!(doc.is_imported(&import("java.util.List")));
        assert!(doc.is_imported(&import("java.lang.StringBuilder")));
        assert!(doc.is_imported(&import("com.app.Service")));
        assert!(!doc.is_imported(&import("com.app.sub.Service")));
        assert!(!doc.is_imported(&import("java.time.Instant")));
    }

    #[test]
    fn test_add_import_is_idempotent() {
        let mut doc = parse("package a;\n\nimport b.C;\n\nclass X {\n}\n");
        assert!(doc.add_import(import("com.example.Foo")).unwrap());
        assert!(!doc.add_import(import("com.example.Foo")).unwrap());

        let count = doc
            .imports()
            .filter(|i| i.path == "com.example.Foo")
            .count();
        assert_eq!(count, 1);
        assert_eq!(
            doc.text(),
            "package a;\n\nimport b.C;\nimport com.example.Foo;\n\nclass X {\n}\n"
        );
    }

    #[test]
    fn test_add_first_import_after_package() {
        let mut doc = parse("package a;\nclass X {}");
        doc.add_import(import("java.time.Instant")).unwrap();
        assert_eq!(doc.text(), "package a;\n\nimport java.time.Instant;\nclass X {}");

        let mut bare = parse("class X {}");
        bare.add_import(import("java.time.Instant")).unwrap();
        assert_eq!(bare.text(), "import java.time.Instant;\n\nclass X {}");
    }

    #[test]
    fn test_first_import_goes_below_header_comment() {
        let header = "/*\n * Copyright 2024 Example Corp.\n */\n// generated, do not edit\n\n";
        let mut doc = parse(&format!("{header}class X {{\n    Foo foo;\n}}\n"));
        doc.add_import(import("com.example.Foo")).unwrap();
        assert_eq!(
            doc.text(),
            format!("{header}import com.example.Foo;\n\nclass X {{\n    Foo foo;\n}}\n")
        );
        assert_eq!(doc.imports().count(), 1);
    }

    #[test]
    fn test_replace_initializer() {
        let mut doc = parse("package a;\nclass X {\n    private Foo foo;\n}");
        let id = doc.find_variable("foo").unwrap();
        doc.replace_initializer(id, Expr::QualIdent("new Foo()".into())).unwrap();
        assert_eq!(doc.text(), "package a;\nclass X {\n    private Foo foo = new Foo();\n}");
        assert_eq!(doc.find_variable("foo"), Some(id));
        assert_eq!(
            doc.variable(id).unwrap().initializer,
            Some(Expr::Source("new Foo()".into()))
        );

        let package = doc.nodes()[0].id();
        assert_eq!(
            doc.replace_initializer(package, Expr::QualIdent("x".into())),
            Err(TransactionError::NotAVariable(package))
        );
        assert_eq!(
            doc.replace_initializer(NodeId(999), Expr::QualIdent("x".into())),
            Err(TransactionError::NodeNotFound(NodeId(999)))
        );
    }

    #[test]
    fn test_ids_survive_unrelated_edits() {
        let mut doc = parse("package a;\n\nclass X {\n    Foo foo;\n    Bar bar = null;\n}\n");
        let foo = doc.find_variable("foo").unwrap();
        let bar = doc.find_variable("bar").unwrap();

        doc.add_import(import("com.example.Foo")).unwrap();
        doc.replace_initializer(bar, Expr::QualIdent("new Bar()".into())).unwrap();
        doc.append_line("// trailing").unwrap();

        assert_eq!(doc.find_variable("foo"), Some(foo));
        assert_eq!(doc.find_variable("bar"), Some(bar));
        assert_eq!(doc.node(foo).unwrap().line(), 5);
        assert!(doc.text().ends_with("}\n// trailing\n"));
    }

    #[test]
    fn test_crlf_is_preserved() {
        let text = "package app;\r\n\r\nclass Holder {\r\n    private Foo foo;\r\n}\r\n";
        let mut doc = parse(text);
        assert_eq!(doc.line_ending(), LineEnding::CrLf);
        assert_eq!(doc.text(), text);

        doc.add_import(import("com.example.Foo")).unwrap();
        doc.add_import(import("com.example.Bar")).unwrap();
        let id = doc.find_variable("foo").unwrap();
        doc.replace_initializer(id, Expr::QualIdent("new Foo()".into())).unwrap();
        doc.append_line("// done").unwrap();

        assert_eq!(
            doc.text(),
            "package app;\r\n\r\nimport com.example.Foo;\r\nimport com.example.Bar;\r\n\r\nclass Holder {\r\n    private Foo foo = new Foo();\r\n}\r\n// done\r\n"
        );
    }

    #[test]
    fn test_variable_display_matches_declaration_text() {
        let doc = parse("class X {\n    private static final Map<String, Foo> cache = new HashMap<>();\n}");
        let var = doc.variable(doc.find_variable("cache").unwrap()).unwrap();
        assert_eq!(
            var.to_string(),
            "private static final Map<String, Foo> cache = new HashMap<>()"
        );
    }
}
