//! Parsed source file model shared by the loader, the oracle and the rewriters.

use std::path::{Path, PathBuf};

use tree_sitter::{Node, Tree};

use crate::core::ast::utils::{children_of_kind, find_child_by_kind, node_text};

/// Result of a header-only parse: the package clause and the import list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Declared package name
    pub package_name: String,
    /// Unquoted import paths, in source order
    pub imports: Vec<String>,
}

/// One `import_spec` of a parsed file.
#[derive(Debug, Clone, Copy)]
pub struct ImportSpecNode<'t> {
    /// The whole spec
    pub spec: Node<'t>,
    /// Explicit local name (`package_identifier`, `.` or `_`), if any
    pub name: Option<Node<'t>>,
    /// The string literal holding the path
    pub path: Node<'t>,
}

/// A fully parsed source file. The tree is never edited; rewrites are
/// recorded against it as byte-range replacements.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path on the filesystem facade
    pub path: PathBuf,
    /// Base file name (`0.go`)
    pub name: String,
    /// Original text
    pub text: String,
    /// Concrete syntax tree of `text`
    pub tree: Tree,
}

impl SourceFile {
    /// Wrap a parsed tree
    pub fn new(path: impl Into<PathBuf>, text: String, tree: Tree) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            text,
            tree,
        }
    }

    /// Root `source_file` node
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Original text covered by a node of this file's tree
    pub fn text_of<'a>(&'a self, node: Node<'a>) -> &'a str {
        node_text(node, &self.text).unwrap_or_default()
    }

    /// Whether the parse produced `ERROR` or missing nodes
    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// 1-based line and column of the first syntax error
    pub fn first_error(&self) -> Option<(usize, usize)> {
        first_error_position(self.root())
    }

    /// The `package_clause` node
    pub fn package_clause(&self) -> Option<Node<'_>> {
        find_child_by_kind(&self.root(), "package_clause")
    }

    /// The identifier naming the package
    pub fn package_name_node(&self) -> Option<Node<'_>> {
        self.package_clause()
            .and_then(|clause| find_child_by_kind(&clause, "package_identifier"))
    }

    /// Declared package name
    pub fn package_name(&self) -> Option<&str> {
        self.package_name_node().map(|node| self.text_of(node))
    }

    /// Every import spec of the file, in source order
    pub fn import_specs(&self) -> Vec<ImportSpecNode<'_>> {
        import_specs(self.root())
    }

    /// Top-level declarations (functions, methods, types, vars, consts)
    pub fn declarations(&self) -> Vec<Node<'_>> {
        let root = self.root();
        let mut cursor = root.walk();
        root.named_children(&mut cursor)
            .filter(|node| {
                matches!(
                    node.kind(),
                    "function_declaration"
                        | "method_declaration"
                        | "type_declaration"
                        | "var_declaration"
                        | "const_declaration"
                )
            })
            .collect()
    }

    /// Directory holding the file
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Collect the import specs below a `source_file` root.
pub fn import_specs(root: Node<'_>) -> Vec<ImportSpecNode<'_>> {
    let mut specs = Vec::new();
    for decl in children_of_kind(root, "import_declaration") {
        let mut spec_nodes = children_of_kind(decl, "import_spec");
        for list in children_of_kind(decl, "import_spec_list") {
            spec_nodes.extend(children_of_kind(list, "import_spec"));
        }
        for spec in spec_nodes {
            if let Some(path) = spec.child_by_field_name("path") {
                specs.push(ImportSpecNode {
                    spec,
                    name: spec.child_by_field_name("name"),
                    path,
                });
            }
        }
    }
    specs
}

/// 1-based position of the first `ERROR` or missing node below `node`.
pub fn first_error_position(node: Node<'_>) -> Option<(usize, usize)> {
    if !node.has_error() {
        return None;
    }
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.is_error() || current.is_missing() {
            let point = current.start_position();
            return Some((point.row + 1, point.column + 1));
        }
        let mut cursor = current.walk();
        let children: Vec<_> = current
            .children(&mut cursor)
            .filter(|child| child.has_error())
            .collect();
        stack.extend(children.into_iter().rev());
    }
    let point = node.start_position();
    Some((point.row + 1, point.column + 1))
}

/// Last `/`-separated segment of an import path
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Decode a Go string literal (interpreted `"..."` or raw `` `...` ``).
/// Returns `None` for anything that is not a well-formed literal.
pub fn unquote_go_string(literal: &str) -> Option<String> {
    if literal.len() >= 2 && literal.starts_with('`') && literal.ends_with('`') {
        let inner = &literal[1..literal.len() - 1];
        if inner.contains('`') {
            return None;
        }
        return Some(inner.replace('\r', ""));
    }

    let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\n' => return None,
            '\\' => {
                let escaped = chars.next()?;
                match escaped {
                    'a' => out.push('\u{7}'),
                    'b' => out.push('\u{8}'),
                    'f' => out.push('\u{c}'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'v' => out.push('\u{b}'),
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    'x' => out.push(hex_char(&mut chars, 2)?),
                    'u' => out.push(hex_char(&mut chars, 4)?),
                    'U' => out.push(hex_char(&mut chars, 8)?),
                    '0'..='7' => {
                        let mut value = escaped.to_digit(8)?;
                        for _ in 0..2 {
                            value = value * 8 + chars.next()?.to_digit(8)?;
                        }
                        if value > 0xff {
                            return None;
                        }
                        out.push(char::from_u32(value)?);
                    }
                    _ => return None,
                }
            }
            other => out.push(other),
        }
    }
    Some(out)
}

fn hex_char(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(value)
}

/// Encode a path as an interpreted Go string literal.
pub fn quote_go_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Re-quote `value` in the same style as `original` (raw literals stay raw
/// when possible).
pub fn requote_like(original: &str, value: &str) -> String {
    if original.starts_with('`') && !value.contains('`') {
        format!("`{}`", value)
    } else {
        quote_go_string(value)
    }
}
