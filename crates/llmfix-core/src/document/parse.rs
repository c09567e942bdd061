//! Outline of a Java compilation unit, extracted from a tree-sitter parse
//!
//! Only the parts a fix touches are kept: the package, the imports and every
//! variable declarator of field, local and constant declarations. Anything
//! else stays in the document text untouched.

use std::ops::Range;

use tree_sitter::Parser;
use tree_sitter_java::LANGUAGE as JAVA_LANGUAGE;

use super::error::ParseError;
use super::tree::{is_valid_import_path, Expr, ImportDecl, Node, NodeId, NodeKind, VariableDecl};

const DECLARATIONS: &[&str] = &[
    "field_declaration",
    "local_variable_declaration",
    "constant_declaration",
];

pub(crate) struct Outline {
    pub nodes: Vec<Node>,
    /// Start of the first line after the leading comment block
    pub preamble_end: usize,
}

pub(crate) fn outline(text: &str) -> Result<Outline, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&JAVA_LANGUAGE.into())
        .map_err(|e| ParseError::Language(e.to_string()))?;
    let tree = parser.parse(text, None).ok_or(ParseError::NoTree)?;
    let root = tree.root_node();

    let mut nodes = Vec::new();
    traverse_node(root, text, &mut nodes);

    Ok(Outline {
        nodes,
        preamble_end: preamble_end(root, text),
    })
}

fn traverse_node(node: tree_sitter::Node, text: &str, nodes: &mut Vec<Node>) {
    match node.kind() {
        "package_declaration" => {
            if let Some(name) = package_name(node, text) {
                push(nodes, node, NodeKind::Package(name), node.start_byte(), None);
            }
            return;
        }
        "import_declaration" => {
            if let Some(import) = import_decl(node, text) {
                push(nodes, node, NodeKind::Import(import), node.start_byte(), None);
            }
            return;
        }
        kind if DECLARATIONS.contains(&kind) => declarators(node, text, nodes),
        _ => {}
    }

    // Initializers may hold anonymous classes with their own fields
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        traverse_node(child, text, nodes);
    }
}

fn push(
    nodes: &mut Vec<Node>,
    node: tree_sitter::Node,
    kind: NodeKind,
    anchor: usize,
    value: Option<Range<usize>>,
) {
    nodes.push(Node {
        id: NodeId(nodes.len() as u32),
        kind,
        span: node.byte_range(),
        anchor,
        value,
        line: node.start_position().row,
    });
}

/// One variable node per declarator: `int a, b = 2;` yields `a` and `b`
fn declarators(decl: tree_sitter::Node, text: &str, nodes: &mut Vec<Node>) {
    let Some(ty) = decl.child_by_field_name("type") else {
        return;
    };
    let ty = squash(slice(ty, text));
    let modifiers = modifiers(decl, text);

    let mut cursor = decl.walk();
    for declarator in decl.children_by_field_name("declarator", &mut cursor) {
        let Some(name) = declarator.child_by_field_name("name") else {
            continue;
        };
        let dimensions = declarator
            .child_by_field_name("dimensions")
            .map(|d| compact(slice(d, text)))
            .unwrap_or_default();
        let value = declarator.child_by_field_name("value");

        let var = VariableDecl {
            modifiers: modifiers.clone(),
            ty: format!("{}{}", ty, dimensions),
            name: slice(name, text).to_string(),
            initializer: value.map(|v| Expr::Source(slice(v, text).to_string())),
        };
        push(
            nodes,
            declarator,
            NodeKind::Variable(var),
            name.start_byte(),
            value.map(|v| v.byte_range()),
        );
    }
}

/// Keywords and annotations, each with its whitespace squashed
fn modifiers(decl: tree_sitter::Node, text: &str) -> Vec<String> {
    let mut cursor = decl.walk();
    let Some(mods) = decl.children(&mut cursor).find(|c| c.kind() == "modifiers") else {
        return Vec::new();
    };
    let mut cursor = mods.walk();
    mods.children(&mut cursor)
        .filter(|m| !is_comment(m.kind()))
        .map(|m| squash(slice(m, text)))
        .collect()
}

fn package_name(node: tree_sitter::Node, text: &str) -> Option<String> {
    let mut cursor = node.walk();
    let name = node
        .children(&mut cursor)
        .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))?;
    Some(compact(slice(name, text)))
}

fn import_decl(node: tree_sitter::Node, text: &str) -> Option<ImportDecl> {
    let body = slice(node, text).trim().strip_prefix("import")?;
    let body = body.trim_end().strip_suffix(';').unwrap_or(body);

    let (is_static, path) = match body.trim_start().strip_prefix("static") {
        Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest),
        _ => (false, body),
    };
    let path = compact(path);
    if !is_valid_import_path(&path) {
        return None;
    }
    Some(ImportDecl { path, is_static })
}

/// Line start of the first top-level item that is not a comment
fn preamble_end(root: tree_sitter::Node, text: &str) -> usize {
    let mut cursor = root.walk();
    let first = root.children(&mut cursor).find(|c| !is_comment(c.kind()));
    match first {
        Some(item) => text
            .get(..item.start_byte())
            .and_then(|before| before.rfind('\n'))
            .map_or(0, |nl| nl + 1),
        None => text.len(),
    }
}

fn is_comment(kind: &str) -> bool {
    kind.ends_with("comment")
}

fn slice<'t>(node: tree_sitter::Node, text: &'t str) -> &'t str {
    text.get(node.byte_range()).unwrap_or("")
}

fn squash(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn compact(s: &str) -> String {
    s.split_whitespace().collect()
}
