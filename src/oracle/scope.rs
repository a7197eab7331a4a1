//! Lexical scope analysis for identifiers inside function bodies.
//!
//! Finds the innermost local declaration an identifier refers to:
//! parameters, receivers and named results; `var`/`const`/`type`
//! declarations and `:=` statements that end before the use; `if`, `for` and
//! `switch` initialisers; `range` clauses; type-switch aliases; `select`
//! receive cases.

use tree_sitter::Node;

use crate::core::ast::utils::{children_of_kind, field_children, named_children};
use crate::lang::SourceFile;
use crate::loader::program::value_specs;

/// A local declaration.
#[derive(Debug, Clone, Copy)]
pub struct Binding<'t> {
    /// The declaring identifier
    pub name: Node<'t>,
    /// Declared type, if written
    pub ty: Option<Node<'t>>,
    /// Initialiser expression, if any
    pub value: Option<Node<'t>>,
}

impl<'t> Binding<'t> {
    fn new(name: Node<'t>) -> Self {
        Self {
            name,
            ty: None,
            value: None,
        }
    }
}

/// Statement containers whose earlier children are in scope for later ones.
const STATEMENT_CONTAINERS: &[&str] = &[
    "block",
    "statement_list",
    "expression_case",
    "type_case",
    "default_case",
    "communication_case",
];

/// Innermost local declaration of `ident` visible at its position.
pub fn lookup<'t>(file: &'t SourceFile, ident: Node<'t>) -> Option<Binding<'t>> {
    let name = file.text_of(ident);
    let mut child = ident;
    while let Some(parent) = child.parent() {
        if parent.kind() == "source_file" {
            return None;
        }
        if let Some(binding) = bindings_visible_from(file, parent, child, name) {
            return Some(binding);
        }
        child = parent;
    }
    None
}

/// Whether `ident` names a local declaration.
pub fn is_local(file: &SourceFile, ident: Node<'_>) -> bool {
    lookup(file, ident).is_some()
}

fn bindings_visible_from<'t>(
    file: &'t SourceFile,
    parent: Node<'t>,
    child: Node<'t>,
    name: &str,
) -> Option<Binding<'t>> {
    let kind = parent.kind();
    if STATEMENT_CONTAINERS.contains(&kind) {
        return named_children(parent)
            .into_iter()
            .filter(|stmt| stmt.end_byte() <= child.start_byte())
            .filter_map(|stmt| declared_by_statement(file, stmt, name))
            .last();
    }

    match kind {
        "function_declaration" | "method_declaration" | "func_literal" => {
            if parent.child_by_field_name("body") != Some(child) {
                return None;
            }
            ["receiver", "parameters", "result"]
                .iter()
                .filter_map(|field| parent.child_by_field_name(field))
                .filter(|list| list.kind() == "parameter_list")
                .find_map(|list| declared_by_parameters(file, list, name))
        }
        "if_statement" | "expression_switch_statement" | "for_clause" => {
            let init = parent.child_by_field_name("initializer")?;
            if init == child {
                return None;
            }
            declared_by_statement(file, init, name)
        }
        "type_switch_statement" => {
            if child.kind() == "type_case" {
                if let Some(alias) = parent.child_by_field_name("alias") {
                    if let Some(ident) = identifiers_named(file, alias, name).into_iter().next() {
                        let case_types = field_children(child, "type");
                        let mut binding = Binding::new(ident);
                        if case_types.len() == 1 {
                            binding.ty = case_types.first().copied();
                        }
                        return Some(binding);
                    }
                }
            }
            let init = parent.child_by_field_name("initializer")?;
            if init == child {
                return None;
            }
            declared_by_statement(file, init, name)
        }
        "for_statement" => {
            if parent.child_by_field_name("body") != Some(child) {
                return None;
            }
            named_children(parent).into_iter().find_map(|clause| match clause.kind() {
                "for_clause" => clause
                    .child_by_field_name("initializer")
                    .and_then(|init| declared_by_statement(file, init, name)),
                "range_clause" if has_token(clause, ":=") => clause
                    .child_by_field_name("left")
                    .and_then(|left| identifiers_named(file, left, name).into_iter().next())
                    .map(Binding::new),
                _ => None,
            })
        }
        _ => None,
    }
}

/// Binding of `name` introduced by a single statement.
fn declared_by_statement<'t>(file: &'t SourceFile, stmt: Node<'t>, name: &str) -> Option<Binding<'t>> {
    match stmt.kind() {
        "short_var_declaration" => {
            let left = stmt.child_by_field_name("left")?;
            let values = stmt
                .child_by_field_name("right")
                .map(named_children)
                .unwrap_or_default();
            named_children(left)
                .into_iter()
                .enumerate()
                .find(|(_, ident)| ident.kind() == "identifier" && file.text_of(*ident) == name)
                .map(|(index, ident)| Binding {
                    name: ident,
                    ty: None,
                    value: values.get(index).copied(),
                })
        }
        "var_declaration" | "const_declaration" => value_specs(stmt)
            .into_iter()
            .filter_map(|spec| {
                let values = spec
                    .child_by_field_name("value")
                    .map(named_children)
                    .unwrap_or_default();
                field_children(spec, "name")
                    .into_iter()
                    .enumerate()
                    .find(|(_, ident)| file.text_of(*ident) == name)
                    .map(|(index, ident)| Binding {
                        name: ident,
                        ty: spec.child_by_field_name("type"),
                        value: values.get(index).copied(),
                    })
            })
            .last(),
        "type_declaration" => named_children(stmt)
            .into_iter()
            .filter_map(|spec| spec.child_by_field_name("name"))
            .find(|ident| file.text_of(*ident) == name)
            .map(Binding::new),
        "receive_statement" if has_token(stmt, ":=") => stmt
            .child_by_field_name("left")
            .and_then(|left| identifiers_named(file, left, name).into_iter().next())
            .map(Binding::new),
        "labeled_statement" => named_children(stmt)
            .into_iter()
            .find_map(|inner| declared_by_statement(file, inner, name)),
        _ => None,
    }
}

fn declared_by_parameters<'t>(file: &'t SourceFile, list: Node<'t>, name: &str) -> Option<Binding<'t>> {
    let mut params = children_of_kind(list, "parameter_declaration");
    params.extend(children_of_kind(list, "variadic_parameter_declaration"));
    params.into_iter().find_map(|param| {
        field_children(param, "name")
            .into_iter()
            .find(|ident| file.text_of(*ident) == name)
            .map(|ident| Binding {
                name: ident,
                ty: param.child_by_field_name("type"),
                value: None,
            })
    })
}

fn identifiers_named<'t>(file: &'t SourceFile, list: Node<'t>, name: &str) -> Vec<Node<'t>> {
    let candidates = if list.kind() == "identifier" {
        vec![list]
    } else {
        named_children(list)
    };
    candidates
        .into_iter()
        .filter(|ident| ident.kind() == "identifier" && file.text_of(*ident) == name)
        .collect()
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == token);
    found
}
