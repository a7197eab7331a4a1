//! Declaration-table resolver for Go selectors.

use indexmap::IndexMap;
use tracing::trace;
use tree_sitter::Node;

use super::scope::{self, Binding};
use super::{Symbol, SymbolOracle};
use crate::core::ast::utils::named_children;
use crate::lang::SourceFile;
use crate::loader::{Decl, DeclKind, PackageInfo, Program, TypeRef, TypeResolver};

/// Limit on embedded-field and alias chains followed during member lookup.
const MAX_EMBEDDING_DEPTH: usize = 8;

/// Resolves selectors against the declaration tables of a [`Program`].
#[derive(Debug, Clone, Copy)]
pub struct GoResolver<'p> {
    program: &'p Program,
}

/// Per-file resolution state.
struct FileScope<'a> {
    file: &'a SourceFile,
    package: Option<&'a PackageInfo>,
    bindings: IndexMap<String, String>,
}

impl<'a> FileScope<'a> {
    fn types(&self) -> TypeResolver<'_> {
        TypeResolver {
            file: self.file,
            package: self.package.map_or("", |p| p.path.as_str()),
            bindings: &self.bindings,
        }
    }

    fn own_decl(&self, name: &str) -> Option<&'a Decl> {
        self.package.and_then(|p| p.decls.get(name))
    }
}

impl<'p> GoResolver<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self { program }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    fn scope_for<'f>(&self, file: &'f SourceFile) -> FileScope<'f>
    where
        'p: 'f,
    {
        FileScope {
            file,
            package: self.program.package_of(file),
            bindings: self.program.import_bindings(file),
        }
    }

    fn resolve_in(&self, scope: &FileScope<'_>, member: Node<'_>) -> Option<Symbol> {
        let parent = member.parent()?;
        let member_name = scope.file.text_of(member);
        match parent.kind() {
            "qualified_type" => {
                let qualifier = parent.child_by_field_name("package")?;
                let path = scope.bindings.get(scope.file.text_of(qualifier))?;
                self.package_member(path, member_name)
            }
            "selector_expression" => {
                if parent.child_by_field_name("field")? != member {
                    return None;
                }
                let operand = parent.child_by_field_name("operand")?;
                if operand.kind() == "identifier" {
                    self.resolve_identifier_selector(scope, operand, member_name)
                } else {
                    let ty = self.type_of_expression(scope, operand)?;
                    self.lookup_member(&ty, member_name, 0)
                }
            }
            _ => None,
        }
    }

    /// `x.Member` where `x` is a bare identifier: a local variable, a
    /// package-level declaration of the file's package, or an import.
    fn resolve_identifier_selector(
        &self,
        scope: &FileScope<'_>,
        operand: Node<'_>,
        member: &str,
    ) -> Option<Symbol> {
        if let Some(binding) = scope::lookup(scope.file, operand) {
            let ty = self.binding_type(scope, &binding)?;
            return self.lookup_member(&ty, member, 0);
        }

        let name = scope.file.text_of(operand);
        if let Some(decl) = scope.own_decl(name) {
            let package = scope.package?.path.as_str();
            return match decl.kind {
                DeclKind::Type => self.lookup_member(
                    &TypeRef {
                        package: package.to_string(),
                        name: decl.name.clone(),
                    },
                    member,
                    0,
                ),
                DeclKind::Var | DeclKind::Const => {
                    self.lookup_member(decl.ty.as_ref()?, member, 0)
                }
                _ => None,
            };
        }

        let path = scope.bindings.get(name)?;
        self.package_member(path, member)
    }

    fn package_member(&self, path: &str, member: &str) -> Option<Symbol> {
        let package = self.program.package(path)?;
        if package.no_source {
            trace!("{} is a stand-in; {} unresolved", path, member);
            return None;
        }
        let decl = package.decls.get(member)?;
        Some(symbol(package, decl))
    }

    fn binding_type(&self, scope: &FileScope<'_>, binding: &Binding<'_>) -> Option<TypeRef> {
        let types = scope.types();
        if let Some(ty) = binding.ty {
            return types.type_ref(ty);
        }
        let value = binding.value?;
        types
            .value_type(value)
            .or_else(|| self.type_of_expression(scope, value))
    }

    /// Named type of an expression, when it can be read off declarations.
    fn type_of_expression(&self, scope: &FileScope<'_>, expr: Node<'_>) -> Option<TypeRef> {
        match expr.kind() {
            "identifier" => {
                if let Some(binding) = scope::lookup(scope.file, expr) {
                    return self.binding_type(scope, &binding);
                }
                let decl = scope.own_decl(scope.file.text_of(expr))?;
                match decl.kind {
                    DeclKind::Var | DeclKind::Const => decl.ty.clone(),
                    _ => None,
                }
            }
            "selector_expression" => {
                let field = expr.child_by_field_name("field")?;
                let symbol = self.resolve_in(scope, field)?;
                match symbol.kind {
                    DeclKind::Func | DeclKind::Method { .. } | DeclKind::Type => None,
                    _ => symbol.ty,
                }
            }
            "parenthesized_expression" => named_children(expr)
                .first()
                .and_then(|inner| self.type_of_expression(scope, *inner)),
            "unary_expression" => {
                let operand = expr.child_by_field_name("operand")?;
                scope
                    .types()
                    .value_type(expr)
                    .or_else(|| self.type_of_expression(scope, operand))
            }
            "composite_literal" => scope.types().value_type(expr),
            "call_expression" => {
                if let Some(ty) = scope.types().value_type(expr) {
                    return Some(ty);
                }
                let function = expr.child_by_field_name("function")?;
                match function.kind() {
                    "identifier" => {
                        if scope::is_local(scope.file, function) {
                            return None;
                        }
                        let decl = scope.own_decl(scope.file.text_of(function))?;
                        match decl.kind {
                            DeclKind::Func => decl.ty.clone(),
                            _ => None,
                        }
                    }
                    "selector_expression" => {
                        let field = function.child_by_field_name("field")?;
                        let symbol = self.resolve_in(scope, field)?;
                        match symbol.kind {
                            DeclKind::Func | DeclKind::Method { .. } => symbol.ty,
                            _ => None,
                        }
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Field or method `member` of the named type `ty`, following embedded
    /// fields and type aliases.
    fn lookup_member(&self, ty: &TypeRef, member: &str, depth: usize) -> Option<Symbol> {
        if depth > MAX_EMBEDDING_DEPTH {
            return None;
        }
        let package = self.program.package(&ty.package)?;
        if let Some(method) = package.method(&ty.name, member) {
            return Some(symbol(package, method));
        }

        let decl = package.decls.get(&ty.name)?;
        if decl.kind != DeclKind::Type {
            return None;
        }
        if let Some(found) = decl.members.iter().find(|m| m.name == member) {
            let kind = if found.is_method {
                DeclKind::Method {
                    receiver: ty.name.clone(),
                }
            } else {
                DeclKind::Field {
                    owner: ty.name.clone(),
                }
            };
            return Some(Symbol {
                package: package.path.clone(),
                name: found.name.clone(),
                kind,
                ty: found.ty.clone(),
            });
        }

        let promoted = decl
            .members
            .iter()
            .filter(|m| m.embedded)
            .filter_map(|m| m.ty.as_ref())
            .find_map(|embedded| self.lookup_member(embedded, member, depth + 1));
        if promoted.is_some() {
            return promoted;
        }

        decl.ty
            .as_ref()
            .filter(|base| *base != ty)
            .and_then(|base| self.lookup_member(base, member, depth + 1))
    }
}

fn symbol(package: &PackageInfo, decl: &Decl) -> Symbol {
    Symbol {
        package: package.path.clone(),
        name: decl.name.clone(),
        kind: decl.kind.clone(),
        ty: decl.ty.clone(),
    }
}

impl SymbolOracle for GoResolver<'_> {
    fn resolve(&self, file: &SourceFile, member: Node<'_>) -> Option<Symbol> {
        let scope = self.scope_for(file);
        self.resolve_in(&scope, member)
    }

    fn is_locally_bound(&self, file: &SourceFile, ident: Node<'_>) -> bool {
        if scope::is_local(file, ident) {
            return true;
        }
        self.program
            .package_of(file)
            .map_or(false, |package| package.decls.contains_key(file.text_of(ident)))
    }
}
