use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::*;
use crate::core::config::FidelityMode;
use crate::core::context::{BuildContext, PackageMatcher};
use crate::discovery::{collect, collect_directories, locate, Target};
use crate::io::memory::MemoryFileSystem;
use crate::loader::{LoadPlan, Loader};
use crate::oracle::GoResolver;
use crate::rewrite::{PackageNames, RelocationRequest};

const FOO: &str = r#"package foo

type T int

type S struct{ Name string }

func (s *S) Close() error { return nil }

func New() *S { return &S{} }

var Default S
"#;

struct Fixture {
    ctx: BuildContext,
    root: Target,
    units: Vec<AffectedUnit>,
    program: Program,
}

fn fixture(packages: Vec<(&str, Vec<(&str, &str)>)>, matcher: PackageMatcher) -> Fixture {
    let fs = MemoryFileSystem::with_packages("/go/src", packages);
    let ctx = BuildContext::new(Arc::new(fs), vec![PathBuf::from("/go/src")]).with_matcher(matcher);
    let root = locate(&ctx, "").unwrap();
    let dirs = collect_directories(&ctx, &root).unwrap();
    let units = collect(&ctx, "foo", &root, &dirs).unwrap();
    let mut plan = LoadPlan::for_relocation(&ctx, "foo", &units, FidelityMode::Exhaustive);
    plan.import_if_present("bar");
    let program = Loader::new(&ctx).unwrap().load(&plan).unwrap();
    Fixture {
        ctx,
        root,
        units,
        program,
    }
}

fn main_only(main: &str) -> Fixture {
    fixture(
        vec![("foo", vec![("0.go", FOO)]), ("main", vec![("0.go", main)])],
        PackageMatcher::Exact,
    )
}

fn run(fx: &Fixture) -> RelocationRequest<'_> {
    let names = PackageNames::derive(&fx.program, "foo", "bar").unwrap();
    let mut request = RelocationRequest::new(&fx.ctx, "foo", "bar", fx.root.clone(), fx.units.clone());
    rewrite_affected(&GoResolver::new(&fx.program), &fx.program, &mut request, &names).unwrap();
    request
}

fn rendered(request: &RelocationRequest<'_>, path: &str) -> String {
    let pending = request.write_set.get(Path::new(path)).unwrap();
    pending.edits.apply(&pending.file.text).unwrap()
}

#[test]
fn test_unaliased_import_and_references() {
    let fx = main_only("package main\n\nimport \"foo\"\n\nvar _ foo.T\n");
    let request = run(&fx);
    assert_eq!(
        rendered(&request, "/go/src/main/0.go"),
        "package main\n\nimport \"bar\"\n\nvar _ bar.T\n"
    );
    assert_eq!(request.diagnostics.renamed, 1);
    assert!(request.diagnostics.conflicts.is_empty());
    let pending = request.write_set.get(Path::new("/go/src/main/0.go")).unwrap();
    assert_eq!(pending.package, "main");
    assert_eq!(pending.destination, "main");
}

#[test]
fn test_nested_selectors_rename_only_the_package_qualifier() {
    let main = r#"package main

import "foo"

func f() {
	foo.Default.Name = "x"
	_ = foo.New().Close()
}
"#;
    let fx = main_only(main);
    let request = run(&fx);
    assert_eq!(
        rendered(&request, "/go/src/main/0.go"),
        r#"package main

import "bar"

func f() {
	bar.Default.Name = "x"
	_ = bar.New().Close()
}
"#
    );
}

#[test]
fn test_shadowing_local_keeps_its_name() {
    let main = r#"package main

import "foo"

type S struct{ N int }

func f() int {
	foo := S{}
	return foo.N
}

var _ foo.T
"#;
    let fx = main_only(main);
    let request = run(&fx);
    assert_eq!(
        rendered(&request, "/go/src/main/0.go"),
        r#"package main

import "bar"

type S struct{ N int }

func f() int {
	foo := S{}
	return foo.N
}

var _ bar.T
"#
    );
}

#[test]
fn test_custom_alias_is_preserved() {
    let fx = main_only("package main\n\nimport f \"foo\"\n\nvar _ f.T\n");
    let request = run(&fx);
    assert_eq!(
        rendered(&request, "/go/src/main/0.go"),
        "package main\n\nimport f \"bar\"\n\nvar _ f.T\n"
    );
    assert_eq!(request.diagnostics.renamed, 0);
}

#[test]
fn test_alias_matching_old_name_follows_the_move() {
    let fx = main_only("package main\n\nimport foo \"foo\"\n\nvar _ foo.T\n");
    let request = run(&fx);
    assert_eq!(
        rendered(&request, "/go/src/main/0.go"),
        "package main\n\nimport bar \"bar\"\n\nvar _ bar.T\n"
    );
}

#[test]
fn test_conflicting_binding_rewrites_paths_only() {
    let main = r#"package main

import (
	"foo"
	"other/bar"
)

var _ foo.T
var _ bar.X
"#;
    let fx = fixture(
        vec![
            ("foo", vec![("0.go", FOO)]),
            ("other/bar", vec![("0.go", "package bar\n\ntype X int\n")]),
            ("main", vec![("0.go", main)]),
        ],
        PackageMatcher::Exact,
    );
    let request = run(&fx);
    assert_eq!(
        rendered(&request, "/go/src/main/0.go"),
        r#"package main

import (
	"bar"
	"other/bar"
)

var _ foo.T
var _ bar.X
"#
    );
    let conflict = &request.diagnostics.conflicts[0];
    assert_eq!(conflict.name, "bar");
    assert_eq!(conflict.paths, vec!["bar".to_string(), "other/bar".to_string()]);
    assert_eq!(conflict.package, "main");
}

#[test]
fn test_subtree_imports_follow_the_move() {
    let main = r#"package main

import "foo"
import "foo/sub"

var _ foo.T
var _ sub.T
"#;
    let fx = fixture(
        vec![
            ("foo", vec![("0.go", FOO)]),
            ("foo/sub", vec![("0.go", "package sub\n\ntype T int\n")]),
            ("main", vec![("0.go", main)]),
        ],
        PackageMatcher::Subtree,
    );
    let request = run(&fx);
    assert_eq!(
        rendered(&request, "/go/src/main/0.go"),
        r#"package main

import "bar"
import "bar/sub"

var _ bar.T
var _ sub.T
"#
    );
}

#[test]
fn test_missing_file_is_skipped() {
    let mut fx = main_only("package main\n\nimport \"foo\"\n\nvar _ foo.T\n");
    fx.units[0].files.push("9.go".to_string());
    let request = run(&fx);
    assert_eq!(request.write_set.len(), 1);
    assert_eq!(
        request.diagnostics.missing,
        vec![MissingFile {
            package: "main".into(),
            file: "9.go".into()
        }]
    );
}

#[test]
fn test_malformed_import_literal_is_fatal() {
    let fx = main_only("package main\n\nimport (\n\t\"foo\"\n\t\"a\\qb\"\n)\n\nvar _ foo.T\n");
    assert!(fx.units.is_empty());

    let unit = AffectedUnit {
        dir: PathBuf::from("/go/src/main"),
        pkg: "main".into(),
        name: "main".into(),
        files: vec!["0.go".into()],
        ..AffectedUnit::default()
    };
    let names = PackageNames::derive(&fx.program, "foo", "bar").unwrap();
    let mut plan = LoadPlan::for_relocation(&fx.ctx, "foo", &[unit.clone()], FidelityMode::Exhaustive);
    plan.import_if_present("bar");
    let program = Loader::new(&fx.ctx).unwrap().load(&plan).unwrap();
    let mut request = RelocationRequest::new(&fx.ctx, "foo", "bar", fx.root.clone(), vec![unit]);
    let err = rewrite_affected(&GoResolver::new(&program), &program, &mut request, &names).unwrap_err();
    assert!(matches!(err, PkgMoveError::MalformedImport { .. }));
}
