//! Byte-range edit scripts recorded against an immutable syntax tree.
//!
//! A rewrite never touches the tree; it records "replace bytes `a..b` with
//! this text". Replacing the same range twice keeps the latest text, which is
//! how a later pass mutates a unit an earlier pass already registered.

use std::collections::BTreeMap;

use tree_sitter::Node;

use crate::core::errors::{PkgMoveError, Result};

/// A single replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// First byte replaced
    pub start: usize,
    /// One past the last byte replaced
    pub end: usize,
    /// Replacement text
    pub text: String,
}

/// Ordered, non-overlapping set of replacements for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    edits: BTreeMap<(usize, usize), String>,
}

impl EditScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the text covered by `node`
    pub fn replace(&mut self, node: Node<'_>, text: impl Into<String>) {
        self.replace_range(node.start_byte(), node.end_byte(), text);
    }

    /// Replace bytes `start..end`
    pub fn replace_range(&mut self, start: usize, end: usize, text: impl Into<String>) {
        self.edits.insert((start, end), text.into());
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Replacements in source order
    pub fn iter(&self) -> impl Iterator<Item = Replacement> + '_ {
        self.edits.iter().map(|(&(start, end), text)| Replacement {
            start,
            end,
            text: text.clone(),
        })
    }

    /// Produce the edited text.
    pub fn apply(&self, source: &str) -> Result<String> {
        let mut out = String::with_capacity(source.len());
        let mut cursor = 0usize;
        for (&(start, end), text) in &self.edits {
            if start < cursor || end < start || end > source.len() {
                return Err(PkgMoveError::internal(format!(
                    "edit {}..{} overlaps a previous edit or leaves the source ({} bytes)",
                    start,
                    end,
                    source.len()
                )));
            }
            let kept = source.get(cursor..start).ok_or_else(|| {
                PkgMoveError::internal(format!("edit boundary {} is not a char boundary", start))
            })?;
            out.push_str(kept);
            out.push_str(text);
            cursor = end;
        }
        out.push_str(source.get(cursor..).unwrap_or(""));
        Ok(out)
    }
}
