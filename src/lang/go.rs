//! Go language adapter with tree-sitter integration.
//!
//! Two entry points: [`GoAdapter::parse_header`] only looks at the package
//! clause and the import block, so errors further down a file never make it
//! fail; [`GoAdapter::parse_file`] keeps the whole tree for the loader.

use std::path::Path;

use tree_sitter::{Parser, Tree};

use super::common::{first_error_position, import_specs, unquote_go_string, FileHeader, SourceFile};
use super::registry::create_parser_for_language;
use crate::core::ast::utils::{find_child_by_kind, node_text};
use crate::core::errors::{PkgMoveError, Result};

/// Go-specific parsing
pub struct GoAdapter {
    /// Tree-sitter parser for Go
    parser: Parser,
}

impl std::fmt::Debug for GoAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoAdapter").finish_non_exhaustive()
    }
}

impl GoAdapter {
    /// Create a new Go adapter
    pub fn new() -> Result<Self> {
        let parser = create_parser_for_language("go")?;
        Ok(Self { parser })
    }

    fn parse_tree(&mut self, source_code: &str) -> Result<Tree> {
        self.parser
            .parse(source_code, None)
            .ok_or_else(|| PkgMoveError::parse("go", "Failed to parse Go source"))
    }

    /// Package clause and import paths of a file.
    ///
    /// Fails when the clause is missing, when the header region holds a
    /// syntax error, or when an import literal cannot be decoded.
    pub fn parse_header(&mut self, source_code: &str, file_name: &str) -> Result<FileHeader> {
        let tree = self.parse_tree(source_code)?;
        let root = tree.root_node();
        let header_error = |message: String, node: tree_sitter::Node<'_>| {
            let (line, column) = first_error_position(node)
                .unwrap_or((node.start_position().row + 1, node.start_position().column + 1));
            PkgMoveError::parse_with_location("go", message, file_name, Some(line), Some(column))
        };

        let mut package_name = None;
        let mut header_end = root.start_byte();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "comment" => continue,
                "package_clause" => {
                    if child.has_error() {
                        return Err(header_error("malformed package clause".into(), child));
                    }
                    let name = find_child_by_kind(&child, "package_identifier")
                        .and_then(|ident| node_text(ident, source_code))
                        .ok_or_else(|| header_error("package clause has no name".into(), child))?;
                    package_name = Some(name.to_string());
                    header_end = child.end_byte();
                }
                "import_declaration" if package_name.is_some() => {
                    if child.has_error() {
                        return Err(header_error("malformed import declaration".into(), child));
                    }
                    header_end = child.end_byte();
                }
                "ERROR" => {
                    return Err(header_error("syntax error in file header".into(), child));
                }
                _ => break,
            }
        }

        let package_name = package_name
            .ok_or_else(|| header_error("expected 'package' clause".into(), root))?;

        let mut imports = Vec::new();
        for spec in import_specs(root) {
            if spec.spec.end_byte() > header_end {
                break;
            }
            let literal = node_text(spec.path, source_code).unwrap_or_default();
            let path = unquote_go_string(literal)
                .ok_or_else(|| PkgMoveError::malformed_import(literal, file_name))?;
            imports.push(path);
        }

        Ok(FileHeader {
            package_name,
            imports,
        })
    }

    /// Parse a whole file. Syntax errors do not fail the call; callers check
    /// [`SourceFile::has_errors`].
    pub fn parse_file(&mut self, path: &Path, source_code: String) -> Result<SourceFile> {
        let tree = self.parse_tree(&source_code)?;
        Ok(SourceFile::new(path, source_code, tree))
    }
}

#[cfg(test)]
#[path = "go_tests.rs"]
mod tests;
