//! Selective program loading.
//!
//! A [`LoadPlan`] names the packages that need full resolution; the
//! [`Loader`] parses them (and, depending on the plan's fidelity, their
//! transitive imports) into a [`Program`] the oracle answers questions from.

pub mod importer;
pub mod plan;
pub mod program;

pub use importer::Loader;
pub use plan::{Fidelity, LoadPlan};
pub use program::{Decl, DeclKind, Member, PackageInfo, Program, TypeRef, TypeResolver};
