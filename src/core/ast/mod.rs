//! Syntax tree helpers: navigation utilities, the pruning visitor and
//! byte-range edit scripts.

pub mod edits;
pub mod utils;
pub mod visitor;


pub use edits::{EditScript, Replacement};
pub use utils::{find_child_by_kind, node_text, walk_tree};
pub use visitor::{qualified_refs, walk, QualifiedRef, SyntaxVisitor};
