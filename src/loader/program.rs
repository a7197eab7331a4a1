//! The loaded program: parsed packages and their declaration tables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tree_sitter::Node;

use crate::core::ast::utils::{children_of_kind, field_children, named_children};
use crate::lang::{last_segment, unquote_go_string, SourceFile};

/// A named type, with the qualifier already resolved to an import path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeRef {
    /// Import path of the declaring package
    pub package: String,
    /// Type name
    pub name: String,
}

/// What a declaration declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclKind {
    Func,
    Var,
    Const,
    Type,
    Method { receiver: String },
    Field { owner: String },
}

/// A struct field or interface method of a type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub name: String,
    /// Field type, when it names a type
    pub ty: Option<TypeRef>,
    /// Embedded field (promotes the members of `ty`)
    pub embedded: bool,
    /// Interface method rather than a field
    pub is_method: bool,
}

/// A package-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decl {
    pub name: String,
    pub kind: DeclKind,
    /// Declared type of a var, result type of a function, or the named type
    /// a type declaration is based on
    pub ty: Option<TypeRef>,
    /// `type A = B`
    pub is_alias: bool,
    /// Fields and interface methods of a type
    pub members: Vec<Member>,
    /// File name holding the declaration
    pub file: String,
}

/// One package of the program.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    /// Import path (external test packages carry the test suffix)
    pub path: String,
    /// Declared package name
    pub name: String,
    /// Directory on disk; `None` for stand-ins
    pub dir: Option<PathBuf>,
    pub files: Vec<SourceFile>,
    /// Package-level declarations by name
    pub decls: IndexMap<String, Decl>,
    /// Methods by receiver type name
    pub methods: HashMap<String, Vec<Decl>>,
    /// Stand-in without source
    pub no_source: bool,
    pub is_external_test: bool,
}

impl PackageInfo {
    /// A package parsed from source; call [`Program::index_declarations`]
    /// once every package is loaded.
    pub fn from_source(path: &str, name: &str, dir: &Path, files: Vec<SourceFile>) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            dir: Some(dir.to_path_buf()),
            files,
            decls: IndexMap::new(),
            methods: HashMap::new(),
            no_source: false,
            is_external_test: false,
        }
    }

    /// Empty stand-in named after the last path segment
    pub fn stub(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: last_segment(path).to_string(),
            dir: None,
            files: Vec::new(),
            decls: IndexMap::new(),
            methods: HashMap::new(),
            no_source: true,
            is_external_test: false,
        }
    }

    /// File by base name
    pub fn file(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Method `name` declared on receiver type `receiver`
    pub fn method(&self, receiver: &str, name: &str) -> Option<&Decl> {
        self.methods
            .get(receiver)
            .and_then(|methods| methods.iter().find(|m| m.name == name))
    }
}

/// Packages keyed by import path.
#[derive(Debug, Clone, Default)]
pub struct Program {
    packages: IndexMap<String, PackageInfo>,
    file_owners: HashMap<PathBuf, String>,
    /// Problems downgraded to warnings while loading
    pub warnings: Vec<String>,
    /// Loaded with a pruned plan
    pub pruned: bool,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a package
    pub fn insert(&mut self, package: PackageInfo) {
        for file in &package.files {
            self.file_owners.insert(file.path.clone(), package.path.clone());
        }
        self.packages.insert(package.path.clone(), package);
    }

    pub fn package(&self, path: &str) -> Option<&PackageInfo> {
        self.packages.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.packages.contains_key(path)
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageInfo> {
        self.packages.values()
    }

    /// Package owning a parsed file
    pub fn package_of(&self, file: &SourceFile) -> Option<&PackageInfo> {
        self.file_owners
            .get(&file.path)
            .and_then(|path| self.packages.get(path))
    }

    /// Local name -> import path for every named import of `file`.
    /// Unaliased imports bind the imported package's declared name when the
    /// package is loaded, its last path segment otherwise. Blank and dot
    /// imports bind nothing.
    pub fn import_bindings(&self, file: &SourceFile) -> IndexMap<String, String> {
        let mut bindings = IndexMap::new();
        for spec in file.import_specs() {
            let Some(path) = unquote_go_string(file.text_of(spec.path)) else {
                continue;
            };
            let name = match spec.name {
                Some(alias) => file.text_of(alias).to_string(),
                None => self
                    .package(&path)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| last_segment(&path).to_string()),
            };
            if name == "_" || name == "." {
                continue;
            }
            bindings.insert(name, path);
        }
        bindings
    }

    /// Build the declaration tables of every package parsed from source.
    pub fn index_declarations(&mut self) {
        let mut tables = Vec::new();
        for package in self.packages.values().filter(|p| !p.no_source) {
            let mut decls = IndexMap::new();
            let mut methods: HashMap<String, Vec<Decl>> = HashMap::new();
            for file in &package.files {
                let bindings = self.import_bindings(file);
                let resolver = TypeResolver {
                    file,
                    package: &package.path,
                    bindings: &bindings,
                };
                for decl in resolver.declarations() {
                    match &decl.kind {
                        DeclKind::Method { receiver } => {
                            methods.entry(receiver.clone()).or_default().push(decl)
                        }
                        _ => {
                            decls.insert(decl.name.clone(), decl);
                        }
                    }
                }
            }
            tables.push((package.path.clone(), decls, methods));
        }

        for (path, decls, methods) in tables {
            if let Some(package) = self.packages.get_mut(&path) {
                package.decls = decls;
                package.methods = methods;
            }
        }
    }
}

/// Turns type syntax of one file into [`TypeRef`]s.
pub struct TypeResolver<'a> {
    pub file: &'a SourceFile,
    /// Import path of the file's package
    pub package: &'a str,
    pub bindings: &'a IndexMap<String, String>,
}

impl<'a> TypeResolver<'a> {
    /// Named type denoted by a type node, looking through pointers,
    /// parentheses and instantiations.
    pub fn type_ref(&self, node: Node<'_>) -> Option<TypeRef> {
        match node.kind() {
            "type_identifier" => Some(TypeRef {
                package: self.package.to_string(),
                name: self.file.text_of(node).to_string(),
            }),
            "qualified_type" => {
                let qualifier = node.child_by_field_name("package")?;
                let name = node.child_by_field_name("name")?;
                let path = self.bindings.get(self.file.text_of(qualifier))?;
                Some(TypeRef {
                    package: path.clone(),
                    name: self.file.text_of(name).to_string(),
                })
            }
            "pointer_type" | "parenthesized_type" => {
                named_children(node).first().and_then(|inner| self.type_ref(*inner))
            }
            "generic_type" => self.type_ref(node.child_by_field_name("type")?),
            _ => None,
        }
    }

    /// Type of a value expression when it is syntactically obvious:
    /// `T{...}`, `&T{...}`, `new(T)`.
    pub fn value_type(&self, node: Node<'_>) -> Option<TypeRef> {
        match node.kind() {
            "composite_literal" => self.type_ref(node.child_by_field_name("type")?),
            "unary_expression" => self.value_type(node.child_by_field_name("operand")?),
            "parenthesized_expression" => {
                named_children(node).first().and_then(|inner| self.value_type(*inner))
            }
            "call_expression" => {
                let function = node.child_by_field_name("function")?;
                if self.file.text_of(function) != "new" {
                    return None;
                }
                let arguments = node.child_by_field_name("arguments")?;
                named_children(arguments)
                    .first()
                    .and_then(|arg| self.type_ref(*arg))
            }
            _ => None,
        }
    }

    fn decl(&self, name: Node<'_>, kind: DeclKind) -> Decl {
        Decl {
            name: self.file.text_of(name).to_string(),
            kind,
            ty: None,
            is_alias: false,
            members: Vec::new(),
            file: self.file.name.clone(),
        }
    }

    /// Package-level declarations of the file.
    pub fn declarations(&self) -> Vec<Decl> {
        let mut out = Vec::new();
        for node in self.file.declarations() {
            match node.kind() {
                "function_declaration" => {
                    if let Some(name) = node.child_by_field_name("name") {
                        let mut decl = self.decl(name, DeclKind::Func);
                        decl.ty = self.result_type(node);
                        out.push(decl);
                    }
                }
                "method_declaration" => {
                    let receiver = node
                        .child_by_field_name("receiver")
                        .and_then(|list| children_of_kind(list, "parameter_declaration").first().copied())
                        .and_then(|param| param.child_by_field_name("type"))
                        .and_then(|ty| self.type_ref(ty));
                    if let (Some(name), Some(receiver)) = (node.child_by_field_name("name"), receiver) {
                        let mut decl = self.decl(
                            name,
                            DeclKind::Method {
                                receiver: receiver.name,
                            },
                        );
                        decl.ty = self.result_type(node);
                        out.push(decl);
                    }
                }
                "type_declaration" => {
                    for spec in named_children(node) {
                        if let Some(decl) = self.type_spec(spec) {
                            out.push(decl);
                        }
                    }
                }
                "var_declaration" | "const_declaration" => {
                    let kind = if node.kind() == "var_declaration" {
                        DeclKind::Var
                    } else {
                        DeclKind::Const
                    };
                    for spec in value_specs(node) {
                        out.extend(self.value_spec(spec, &kind));
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Named type of a function's single result.
    pub fn result_type(&self, function: Node<'_>) -> Option<TypeRef> {
        let result = function.child_by_field_name("result")?;
        if result.kind() != "parameter_list" {
            return self.type_ref(result);
        }
        match children_of_kind(result, "parameter_declaration").as_slice() {
            [single] if field_children(*single, "name").len() <= 1 => {
                self.type_ref(single.child_by_field_name("type")?)
            }
            _ => None,
        }
    }

    fn type_spec(&self, spec: Node<'_>) -> Option<Decl> {
        if !matches!(spec.kind(), "type_spec" | "type_alias") {
            return None;
        }
        let name = spec.child_by_field_name("name")?;
        let ty = spec.child_by_field_name("type");
        let mut decl = self.decl(name, DeclKind::Type);
        decl.is_alias = spec.kind() == "type_alias";
        if let Some(ty) = ty {
            decl.ty = self.type_ref(ty);
            decl.members = self.members(ty);
        }
        Some(decl)
    }

    /// Fields of a struct type or methods of an interface type.
    pub fn members(&self, ty: Node<'_>) -> Vec<Member> {
        let mut members = Vec::new();
        match ty.kind() {
            "struct_type" => {
                for list in children_of_kind(ty, "field_declaration_list") {
                    for field in children_of_kind(list, "field_declaration") {
                        let field_type = field.child_by_field_name("type");
                        let type_ref = field_type.and_then(|t| self.type_ref(t));
                        let names = field_children(field, "name");
                        if names.is_empty() {
                            if let Some(embedded) = type_ref {
                                members.push(Member {
                                    name: embedded.name.clone(),
                                    ty: Some(embedded),
                                    embedded: true,
                                    is_method: false,
                                });
                            }
                            continue;
                        }
                        for name in names {
                            members.push(Member {
                                name: self.file.text_of(name).to_string(),
                                ty: type_ref.clone(),
                                embedded: false,
                                is_method: false,
                            });
                        }
                    }
                }
            }
            "interface_type" => {
                for elem in named_children(ty) {
                    match elem.kind() {
                        "method_elem" | "method_spec" => {
                            if let Some(name) = elem.child_by_field_name("name") {
                                members.push(Member {
                                    name: self.file.text_of(name).to_string(),
                                    ty: None,
                                    embedded: false,
                                    is_method: true,
                                });
                            }
                        }
                        "type_elem" | "constraint_elem" => {
                            for inner in named_children(elem) {
                                if let Some(embedded) = self.type_ref(inner) {
                                    members.push(Member {
                                        name: embedded.name.clone(),
                                        ty: Some(embedded),
                                        embedded: true,
                                        is_method: false,
                                    });
                                }
                            }
                        }
                        _ => {
                            if let Some(embedded) = self.type_ref(elem) {
                                members.push(Member {
                                    name: embedded.name.clone(),
                                    ty: Some(embedded),
                                    embedded: true,
                                    is_method: false,
                                });
                            }
                        }
                    }
                }
            }
            "pointer_type" | "parenthesized_type" => {
                if let Some(inner) = named_children(ty).first() {
                    members = self.members(*inner);
                }
            }
            _ => {}
        }
        members
    }

    fn value_spec(&self, spec: Node<'_>, kind: &DeclKind) -> Vec<Decl> {
        let declared = spec
            .child_by_field_name("type")
            .and_then(|ty| self.type_ref(ty));
        let values: Vec<Node<'_>> = spec
            .child_by_field_name("value")
            .map(named_children)
            .unwrap_or_default();

        field_children(spec, "name")
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                let mut decl = self.decl(name, kind.clone());
                decl.ty = declared
                    .clone()
                    .or_else(|| values.get(index).and_then(|v| self.value_type(*v)));
                decl
            })
            .collect()
    }
}

/// `var_spec` / `const_spec` nodes of a declaration, flattening
/// parenthesised groups.
pub fn value_specs(decl: Node<'_>) -> Vec<Node<'_>> {
    let mut specs = Vec::new();
    for child in named_children(decl) {
        match child.kind() {
            "var_spec" | "const_spec" => specs.push(child),
            "var_spec_list" | "const_spec_list" => specs.extend(
                named_children(child)
                    .into_iter()
                    .filter(|n| matches!(n.kind(), "var_spec" | "const_spec")),
            ),
            _ => {}
        }
    }
    specs
}
