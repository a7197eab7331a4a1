//! Renames the moved package's own declarations.

use tracing::{debug, info, warn};
use tree_sitter::Node;

use super::{PackageNames, RelocationRequest};
use crate::core::errors::{PkgMoveError, Result};
use crate::lang::SourceFile;
use crate::loader::Program;

/// Rename the package clause of every file of the moved package to the
/// destination name and point its import comment at the destination path.
/// Files of the external test twin get the suffixed destination name.
/// Returns the number of files touched.
pub fn rename_package_declaration<'p>(
    program: &'p Program,
    request: &mut RelocationRequest<'p>,
    names: &PackageNames,
) -> Result<usize> {
    let moved = program
        .package(&request.from)
        .filter(|p| !p.no_source)
        .ok_or_else(|| PkgMoveError::not_found("pkg", request.from.clone()))?;

    let mut touched = 0;
    for file in &moved.files {
        let Some(name) = file.package_name_node() else {
            warn!("{} has no package clause", file.path.display());
            continue;
        };
        let edits = request.write_set.entry(file, &moved.path, &request.to);
        edits.replace(name, names.to.clone());
        if let Some((start, end)) = import_comment_path(file) {
            debug!("import comment of {} now names {}", file.name, request.to);
            edits.replace_range(start, end, request.to.clone());
        }
        touched += 1;
    }

    let twin_path = format!("{}{}", request.from, request.test_suffix);
    if let Some(twin) = program.package(&twin_path).filter(|p| p.is_external_test) {
        let old_name = format!("{}{}", names.from, request.test_suffix);
        let new_name = format!("{}{}", names.to, request.test_suffix);
        let destination = format!("{}{}", request.to, request.test_suffix);
        for file in &twin.files {
            let Some(name) = file.package_name_node() else {
                continue;
            };
            if file.text_of(name) != old_name {
                continue;
            }
            request
                .write_set
                .entry(file, &twin.path, &destination)
                .replace(name, new_name.clone());
            touched += 1;
        }
    }

    info!("rename package {} -> {} in {} files", names.from, names.to, touched);
    Ok(touched)
}

/// Byte range of the quoted path inside the file's import comment, if any.
///
/// The comment either trails the package clause on its line (before the
/// first declaration) or belongs to the comment group directly above it.
pub fn import_comment_path(file: &SourceFile) -> Option<(usize, usize)> {
    let clause = file.package_clause()?;
    let clause_line = clause.end_position().row;

    let mut next = clause.next_sibling();
    while let Some(node) = next {
        if !node.is_named() {
            next = node.next_sibling();
            continue;
        }
        if node.kind() != "comment" || node.start_position().row != clause_line {
            break;
        }
        if let Some(range) = comment_path(file, node) {
            return Some(range);
        }
        next = node.next_sibling();
    }

    let mut line = clause.start_position().row;
    let mut previous = clause.prev_sibling();
    while let Some(node) = previous {
        if !node.is_named() {
            previous = node.prev_sibling();
            continue;
        }
        if node.kind() != "comment" || node.end_position().row + 1 < line {
            break;
        }
        if let Some(range) = comment_path(file, node) {
            return Some(range);
        }
        line = node.start_position().row;
        previous = node.prev_sibling();
    }
    None
}

fn comment_path(file: &SourceFile, comment: Node<'_>) -> Option<(usize, usize)> {
    let text = file.text_of(comment);
    quoted_import_path(text).map(|(start, end)| (comment.start_byte() + start, comment.start_byte() + end))
}

/// Offsets of the path inside `// import "path"` or `/* import "path" */`.
fn quoted_import_path(comment: &str) -> Option<(usize, usize)> {
    let body = comment
        .strip_prefix("//")
        .or_else(|| comment.strip_prefix("/*"))?;
    let keyword = body.trim_start_matches(' ');
    if keyword.len() == body.len() {
        return None;
    }
    let after = keyword.strip_prefix("import")?;
    let quoted = after.trim_start_matches(' ');
    if quoted.len() == after.len() {
        return None;
    }
    let path = quoted.strip_prefix('"')?;
    let close = path.find('"')?;
    if close == 0 {
        return None;
    }
    let start = comment.len() - path.len();
    Some((start, start + close))
}
