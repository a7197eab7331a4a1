//! Symbol resolution over a loaded [`Program`](crate::loader::Program).
//!
//! The rewriters never reason about names textually. They ask a
//! [`SymbolOracle`] which declaration a selected member denotes, which
//! package owns that declaration, and whether an identifier is bound by a
//! local or package-level declaration rather than by an import.

pub mod resolver;
pub mod scope;

use serde::Serialize;
use tree_sitter::Node;

use crate::lang::SourceFile;
use crate::loader::{DeclKind, TypeRef};

pub use resolver::GoResolver;
pub use scope::{is_local, lookup, Binding};

/// A resolved declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    /// Import path of the owning package
    pub package: String,
    pub name: String,
    pub kind: DeclKind,
    /// Named type of the symbol's value, when known
    pub ty: Option<TypeRef>,
}

/// Answers resolution questions about the files of a program.
pub trait SymbolOracle {
    /// Declaration denoted by `member`, the selected identifier of a
    /// `selector_expression` or `qualified_type` in `file`.
    fn resolve(&self, file: &SourceFile, member: Node<'_>) -> Option<Symbol>;

    /// Import path of the package owning `symbol`
    fn owning_package<'s>(&self, symbol: &'s Symbol) -> &'s str {
        &symbol.package
    }

    /// Whether `ident` is bound by a local or package-level declaration of
    /// `file` rather than naming an imported package.
    fn is_locally_bound(&self, file: &SourceFile, ident: Node<'_>) -> bool;
}
