//! Grammar lookup and parser construction.

use tree_sitter::Language;

use crate::core::errors::{PkgMoveError, Result};

/// Get tree-sitter language for a given language key
pub fn get_tree_sitter_language(language_key: &str) -> Result<Language> {
    match language_key.to_ascii_lowercase().as_str() {
        "go" | "golang" => Ok(tree_sitter_go::LANGUAGE.into()),
        _ => Err(PkgMoveError::config_field(
            format!("No tree-sitter grammar for: {}", language_key),
            "language",
        )),
    }
}

/// Create a new parser for the given language
pub fn create_parser_for_language(language_key: &str) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    let tree_sitter_language = get_tree_sitter_language(language_key)?;
    parser.set_language(&tree_sitter_language).map_err(|e| {
        PkgMoveError::parse(
            language_key,
            format!("Failed to set parser language: {}", e),
        )
    })?;
    Ok(parser)
}
