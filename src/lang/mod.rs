//! Language-specific parsing: the Go tree-sitter adapter and the parsed
//! source file model.

pub mod common;
pub mod go;
pub mod registry;

pub use common::{
    last_segment, quote_go_string, requote_like, unquote_go_string, FileHeader, ImportSpecNode,
    SourceFile,
};
pub use go::GoAdapter;
pub use registry::{create_parser_for_language, get_tree_sitter_language};
