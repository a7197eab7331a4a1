//! Serialises an edited source file back to text.
//!
//! Every byte outside a recorded replacement is reproduced as-is, so comments
//! and layout survive. Indentation is then normalised according to
//! [`PrinterConfig`]; lines that start inside a raw string literal or a block
//! comment are left exactly as written.

use std::ops::Range;
use std::path::Path;

use crate::core::ast::utils::walk_tree;
use crate::core::ast::EditScript;
use crate::core::config::PrinterConfig;
use crate::core::errors::Result;
use crate::lang::{GoAdapter, SourceFile};

/// Pretty-printer for edited Go files
#[derive(Debug)]
pub struct Printer {
    config: PrinterConfig,
    adapter: GoAdapter,
}

impl Printer {
    pub fn new(config: PrinterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            adapter: GoAdapter::new()?,
        })
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Render `file` with `edits` applied
    pub fn print(&mut self, file: &SourceFile, edits: &EditScript) -> Result<String> {
        let text = edits.apply(&file.text)?;
        if self.config.tab_indent || !self.config.use_spaces {
            return Ok(text);
        }

        let parsed = self.adapter.parse_file(Path::new(&file.name), text)?;
        let protected = protected_ranges(&parsed);
        Ok(expand_indentation(
            &parsed.text,
            self.config.tab_width,
            &protected,
        ))
    }
}

/// Byte ranges whose interior lines must not be re-indented.
fn protected_ranges(file: &SourceFile) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    walk_tree(file.root(), &mut |node| {
        let multi_line = node.start_position().row != node.end_position().row;
        if multi_line && matches!(node.kind(), "raw_string_literal" | "comment") {
            ranges.push(node.start_byte()..node.end_byte());
        }
    });
    ranges
}

/// Replace leading tabs with `tab_width` spaces on every line that does not
/// start inside a protected range.
fn expand_indentation(text: &str, tab_width: usize, protected: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut offset = 0usize;
    for line in text.split_inclusive('\n') {
        let inside = protected
            .iter()
            .any(|range| range.start < offset && offset < range.end);
        if inside {
            out.push_str(line);
        } else {
            let body = line.trim_start_matches(|c: char| c == '\t' || c == ' ');
            let indent = &line[..line.len() - body.len()];
            let mut column = 0usize;
            for c in indent.chars() {
                if c == '\t' {
                    column += tab_width - (column % tab_width);
                } else {
                    column += 1;
                }
            }
            out.extend(std::iter::repeat(' ').take(column));
            out.push_str(body);
        }
        offset += line.len();
    }
    out
}
