//! End-to-end relocations on an in-memory source tree.

use std::path::PathBuf;
use std::sync::Arc;

use pkgmove_rs::io::MemoryFileSystem;
use pkgmove_rs::{
    BuildContext, FidelityMode, PackageMatcher, PrinterConfig, RelocationEngine, RelocationOptions,
    RelocationReport,
};

fn tree(packages: Vec<(&str, Vec<(&str, &str)>)>) -> Arc<MemoryFileSystem> {
    Arc::new(MemoryFileSystem::with_packages("/go/src", packages))
}

fn engine(fs: &Arc<MemoryFileSystem>, matcher: PackageMatcher) -> RelocationEngine {
    let ctx = BuildContext::new(fs.clone(), vec![PathBuf::from("/go/src")]).with_matcher(matcher);
    RelocationEngine::with_context(ctx, PrinterConfig::default())
}

fn relocate(fs: &Arc<MemoryFileSystem>, matcher: PackageMatcher, options: RelocationOptions) -> RelocationReport {
    engine(fs, matcher).run(&options).unwrap()
}

fn file(fs: &MemoryFileSystem, path: &str) -> String {
    fs.contents(path)
        .unwrap_or_else(|| panic!("{} does not exist", path))
}

#[test]
fn test_simple_move() {
    let fs = tree(vec![
        ("foo", vec![("0.go", "package foo\n\ntype T int\n")]),
        ("main", vec![("0.go", "package main\n\nimport \"foo\"\n\nvar _ foo.T\n")]),
    ]);
    let report = relocate(&fs, PackageMatcher::Exact, RelocationOptions::new("foo", "bar"));

    assert_eq!(file(&fs, "/go/src/main/0.go"), "package main\n\nimport \"bar\"\n\nvar _ bar.T\n");
    assert_eq!(file(&fs, "/go/src/bar/0.go"), "package bar\n\ntype T int\n");
    assert!(fs.contents("/go/src/foo/0.go").is_none());

    assert_eq!(report.written["bar"], vec![PathBuf::from("/go/src/foo/0.go")]);
    assert_eq!(report.written["main"], vec![PathBuf::from("/go/src/main/0.go")]);
    assert_eq!(report.renamed, 1);
    assert!(!report.has_warnings());
}

#[test]
fn test_move_limited_to_a_scope() {
    let fs = tree(vec![
        ("foo", vec![("0.go", "package foo\n\ntype T int\n")]),
        ("main", vec![("0.go", "package main\n\nimport \"foo\"\n\nvar _ foo.T\n")]),
        ("other", vec![("0.go", "package other\n\nimport \"foo\"\n\nvar _ foo.T\n")]),
    ]);
    relocate(&fs, PackageMatcher::Exact, RelocationOptions::new("foo", "bar").within("main"));

    assert_eq!(file(&fs, "/go/src/main/0.go"), "package main\n\nimport \"bar\"\n\nvar _ bar.T\n");
    assert_eq!(file(&fs, "/go/src/other/0.go"), "package other\n\nimport \"foo\"\n\nvar _ foo.T\n");
}

#[test]
fn test_import_comment_follows_the_move() {
    let fs = tree(vec![
        ("foo", vec![("0.go", "package foo // import \"foo\"\n\ntype T int\n")]),
        ("main", vec![("0.go", "package main\n\nimport \"foo\"\n\nvar _ foo.T\n")]),
    ]);
    relocate(&fs, PackageMatcher::Exact, RelocationOptions::new("foo", "x/bar"));

    assert_eq!(file(&fs, "/go/src/x/bar/0.go"), "package bar // import \"x/bar\"\n\ntype T int\n");
    assert_eq!(file(&fs, "/go/src/main/0.go"), "package main\n\nimport \"x/bar\"\n\nvar _ bar.T\n");
}

#[test]
fn test_subtree_move() {
    let main = "package main\n\nimport \"foo\"\nimport \"foo/sub\"\n\nvar _ foo.T\nvar _ sub.T\n";
    let fs = tree(vec![
        ("foo", vec![("0.go", "package foo\n\ntype T int\n")]),
        ("foo/sub", vec![("0.go", "package sub; type T int")]),
        ("main", vec![("0.go", main)]),
    ]);
    relocate(&fs, PackageMatcher::Subtree, RelocationOptions::new("foo", "bar"));

    assert_eq!(
        file(&fs, "/go/src/main/0.go"),
        "package main\n\nimport \"bar\"\nimport \"bar/sub\"\n\nvar _ bar.T\nvar _ sub.T\n"
    );
    assert_eq!(file(&fs, "/go/src/bar/0.go"), "package bar\n\ntype T int\n");
    assert_eq!(file(&fs, "/go/src/bar/sub/0.go"), "package sub; type T int");
    assert!(fs.contents("/go/src/foo/sub/0.go").is_none());
}

#[test]
fn test_references_into_subpackages_of_the_moved_tree() {
    let fs = tree(vec![
        ("foo", vec![("0.go", "package foo\n\nimport \"foo/a\"\n\nvar _ a.T\n")]),
        ("foo/a", vec![("0.go", "package a; type T int")]),
        ("foo/b", vec![("0.go", "package b\n\nimport \"foo/a\"\n\nvar _ a.T\n")]),
    ]);
    let report = relocate(&fs, PackageMatcher::Subtree, RelocationOptions::new("foo", "bar").within("foo"));

    assert_eq!(file(&fs, "/go/src/bar/0.go"), "package bar\n\nimport \"bar/a\"\n\nvar _ a.T\n");
    assert_eq!(file(&fs, "/go/src/bar/a/0.go"), "package a; type T int");
    assert_eq!(file(&fs, "/go/src/bar/b/0.go"), "package b\n\nimport \"bar/a\"\n\nvar _ a.T\n");
    assert_eq!(report.written.keys().collect::<Vec<_>>(), vec!["bar", "bar/b"]);
}

#[test]
fn test_overlapping_directory_names() {
    let fs = tree(vec![
        ("foo", vec![]),
        ("foo/a", vec![("0.go", "package a\n")]),
        ("foo/aa", vec![("0.go", "package bar")]),
        ("foo/c", vec![("0.go", "package c; import _ \"foo/bar\";")]),
    ]);
    relocate(&fs, PackageMatcher::Subtree, RelocationOptions::new("foo/a", "foo/spam").within("foo"));

    assert_eq!(file(&fs, "/go/src/foo/spam/0.go"), "package spam\n");
    assert_eq!(file(&fs, "/go/src/foo/aa/0.go"), "package bar");
    assert_eq!(file(&fs, "/go/src/foo/c/0.go"), "package c; import _ \"foo/bar\";");
    assert!(fs.contents("/go/src/foo/a/0.go").is_none());
}

#[test]
fn test_external_test_packages() {
    let fs = tree(vec![
        (
            "foo",
            vec![
                ("0.go", "package foo\n\ntype T int\n"),
                ("0_test.go", "package foo_test\n\nimport \"foo\"\n\nvar _ foo.T\n"),
            ],
        ),
        ("baz", vec![("0_test.go", "package baz_test\n\nimport \"foo\"\n\nvar _ foo.T\n")]),
    ]);
    let report = relocate(&fs, PackageMatcher::Subtree, RelocationOptions::new("foo", "bar"));

    assert_eq!(file(&fs, "/go/src/bar/0.go"), "package bar\n\ntype T int\n");
    assert_eq!(
        file(&fs, "/go/src/bar/0_test.go"),
        "package bar_test\n\nimport \"bar\"\n\nvar _ bar.T\n"
    );
    assert_eq!(
        file(&fs, "/go/src/baz/0_test.go"),
        "package baz_test\n\nimport \"bar\"\n\nvar _ bar.T\n"
    );
    assert!(report.written.contains_key("bar_test"));
    assert!(report.written.contains_key("baz_test"));
}

#[test]
fn test_external_test_outside_the_scope_is_still_rewritten() {
    let fs = tree(vec![
        (
            "foo",
            vec![
                ("0.go", "package foo\n\ntype T int\n"),
                ("0_test.go", "package foo_test\n\nimport \"foo\"\n\nvar _ foo.T\n"),
            ],
        ),
        ("main", vec![("0.go", "package main\n\nimport \"foo\"\n\nvar _ foo.T\n")]),
    ]);
    relocate(&fs, PackageMatcher::Exact, RelocationOptions::new("foo", "bar").within("main"));

    assert_eq!(
        file(&fs, "/go/src/bar/0_test.go"),
        "package bar_test\n\nimport \"bar\"\n\nvar _ bar.T\n"
    );
}

#[test]
fn test_conflicting_binding_keeps_references() {
    let main = "package main\n\nimport (\n\t\"foo\"\n\t\"other/bar\"\n)\n\nvar _ foo.T\nvar _ bar.X\n";
    let fs = tree(vec![
        ("foo", vec![("0.go", "package foo\n\ntype T int\n")]),
        ("other/bar", vec![("0.go", "package bar\n\ntype X int\n")]),
        ("main", vec![("0.go", main)]),
    ]);
    let report = relocate(&fs, PackageMatcher::Exact, RelocationOptions::new("foo", "bar"));

    assert_eq!(
        file(&fs, "/go/src/main/0.go"),
        "package main\n\nimport (\n\t\"bar\"\n\t\"other/bar\"\n)\n\nvar _ foo.T\nvar _ bar.X\n"
    );
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].file, PathBuf::from("/go/src/main/0.go"));
    assert_eq!(report.conflicts[0].paths, vec!["bar".to_string(), "other/bar".to_string()]);
}

#[test]
fn test_custom_alias_is_preserved() {
    let fs = tree(vec![
        ("foo", vec![("0.go", "package foo\n\ntype T int\n")]),
        ("main", vec![("0.go", "package main\n\nimport f \"foo\"\n\nvar _ f.T\n")]),
    ]);
    let report = relocate(&fs, PackageMatcher::Exact, RelocationOptions::new("foo", "bar"));

    assert_eq!(file(&fs, "/go/src/main/0.go"), "package main\n\nimport f \"bar\"\n\nvar _ f.T\n");
    assert_eq!(report.renamed, 0);
}

#[test]
fn test_nested_destination_does_not_cascade() {
    let fs = tree(vec![
        ("foo", vec![("0.go", "package foo\n\ntype T int\n")]),
        ("foo/v2", vec![("v2.go", "package v2\n\ntype U int\n")]),
        ("main", vec![
            ("0.go", "package main\n\nimport \"foo\"\n\nvar _ foo.T\n"),
            ("1.go", "package main\n\nimport \"foo/v2\"\n\nvar _ v2.U\n"),
        ]),
    ]);
    let report = relocate(&fs, PackageMatcher::Subtree, RelocationOptions::new("foo", "foo/v2"));

    assert_eq!(file(&fs, "/go/src/main/0.go"), "package main\n\nimport \"foo/v2\"\n\nvar _ v2.T\n");
    assert_eq!(file(&fs, "/go/src/main/1.go"), "package main\n\nimport \"foo/v2\"\n\nvar _ v2.U\n");
    assert_eq!(file(&fs, "/go/src/foo/v2/0.go"), "package v2\n\ntype T int\n");
    assert_eq!(file(&fs, "/go/src/foo/v2/v2.go"), "package v2\n\ntype U int\n");
    assert!(report.collisions.is_empty());

    let again = engine(&fs, PackageMatcher::Subtree)
        .run(&RelocationOptions::new("foo", "foo/v2"))
        .unwrap_err();
    assert!(again.is_not_found());
    assert_eq!(file(&fs, "/go/src/main/0.go"), "package main\n\nimport \"foo/v2\"\n\nvar _ v2.T\n");
}

#[test]
fn test_existing_destination_name_comes_from_its_declaration() {
    let fs = tree(vec![
        ("x/foo", vec![("0.go", "package foolib\n\ntype T int\n")]),
        ("y/bar", vec![("1.go", "package baz\n\ntype U int\n")]),
        ("main", vec![("0.go", "package main\n\nimport \"x/foo\"\n\nvar _ foolib.T\n")]),
    ]);
    let report = relocate(&fs, PackageMatcher::Exact, RelocationOptions::new("x/foo", "y/bar"));

    assert_eq!(file(&fs, "/go/src/main/0.go"), "package main\n\nimport \"y/bar\"\n\nvar _ baz.T\n");
    assert_eq!(file(&fs, "/go/src/y/bar/0.go"), "package baz\n\ntype T int\n");
    assert_eq!(file(&fs, "/go/src/y/bar/1.go"), "package baz\n\ntype U int\n");
    assert!(report.collisions.is_empty());
}

#[test]
fn test_new_destination_name_is_its_last_segment() {
    let fs = tree(vec![
        ("x/foo", vec![("0.go", "package foolib\n\ntype T int\n")]),
        ("main", vec![("0.go", "package main\n\nimport \"x/foo\"\n\nvar _ foolib.T\n")]),
    ]);
    relocate(&fs, PackageMatcher::Exact, RelocationOptions::new("x/foo", "z/qux"));

    assert_eq!(file(&fs, "/go/src/main/0.go"), "package main\n\nimport \"z/qux\"\n\nvar _ qux.T\n");
    assert_eq!(file(&fs, "/go/src/z/qux/0.go"), "package qux\n\ntype T int\n");
}

#[test]
fn test_pruned_mode_tolerates_missing_dependencies() {
    let main = "package main\n\nimport (\n\t\"foo\"\n\t\"github.com/acme/gone\"\n)\n\nvar _ foo.T\nvar _ gone.X\n";
    let packages = vec![
        ("foo", vec![("0.go", "package foo\n\ntype T int\n")]),
        ("main", vec![("0.go", main)]),
    ];

    let exhaustive = tree(packages.clone());
    assert!(engine(&exhaustive, PackageMatcher::Exact)
        .run(&RelocationOptions::new("foo", "bar"))
        .is_err());
    assert_eq!(file(&exhaustive, "/go/src/main/0.go"), main);

    let pruned = tree(packages);
    let report = relocate(
        &pruned,
        PackageMatcher::Exact,
        RelocationOptions::new("foo", "bar").fidelity(FidelityMode::Pruned),
    );
    assert_eq!(
        file(&pruned, "/go/src/main/0.go"),
        "package main\n\nimport (\n\t\"bar\"\n\t\"github.com/acme/gone\"\n)\n\nvar _ bar.T\nvar _ gone.X\n"
    );
    assert!(report.warnings.iter().any(|w| w.contains("github.com/acme/gone")));
}

#[test]
fn test_unrelated_files_are_untouched() {
    let fs = tree(vec![
        ("foo", vec![("0.go", "package foo\n\ntype T int\n")]),
        ("main", vec![
            ("0.go", "package main\n\nimport \"foo\"\n\nvar _ foo.T\n"),
            ("1.go", "package main\n\nfunc helper() {}\n"),
        ]),
    ]);
    let report = relocate(&fs, PackageMatcher::Exact, RelocationOptions::new("foo", "bar"));

    assert_eq!(report.files_written(), 2);
    assert_eq!(file(&fs, "/go/src/main/1.go"), "package main\n\nfunc helper() {}\n");
}
