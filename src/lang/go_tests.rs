use super::*;

#[test]
fn test_go_adapter_creation() {
    let adapter = GoAdapter::new();
    assert!(adapter.is_ok());
}

#[test]
fn test_header_of_grouped_imports() {
    let mut adapter = GoAdapter::new().unwrap();
    let source_code = r#"// Package main is the entry point.
package main

import (
    "fmt"
    f "foo"
    _ "foo/sub"
)

import "bar"

func main() { fmt.Println(f.T) }
"#;

    let header = adapter.parse_header(source_code, "0.go").unwrap();
    assert_eq!(header.package_name, "main");
    assert_eq!(header.imports, vec!["fmt", "foo", "foo/sub", "bar"]);
}

#[test]
fn test_header_ignores_body_errors() {
    let mut adapter = GoAdapter::new().unwrap();
    let source_code = "package foo\n\nimport \"bar\"\n\nfunc broken( {\n";

    let header = adapter.parse_header(source_code, "0.go").unwrap();
    assert_eq!(header.package_name, "foo");
    assert_eq!(header.imports, vec!["bar"]);
}

#[test]
fn test_header_single_line_file() {
    let mut adapter = GoAdapter::new().unwrap();
    let header = adapter
        .parse_header("package c; import _ \"foo/bar\";", "0.go")
        .unwrap();
    assert_eq!(header.package_name, "c");
    assert_eq!(header.imports, vec!["foo/bar"]);
}

#[test]
fn test_header_requires_package_clause() {
    let mut adapter = GoAdapter::new().unwrap();
    let err = adapter.parse_header("import \"fmt\"\n", "0.go").unwrap_err();
    assert!(matches!(err, PkgMoveError::Parse { .. }));
}

#[test]
fn test_parse_file_keeps_tree_and_errors() {
    let mut adapter = GoAdapter::new().unwrap();
    let file = adapter
        .parse_file(Path::new("/go/src/foo/0.go"), "package foo; type T int".to_string())
        .unwrap();
    assert_eq!(file.name, "0.go");
    assert_eq!(file.package_name(), Some("foo"));
    assert!(!file.has_errors());
    assert_eq!(file.declarations().len(), 1);

    let broken = adapter
        .parse_file(Path::new("/go/src/foo/1.go"), "package foo\nfunc (".to_string())
        .unwrap();
    assert!(broken.has_errors());
    assert!(broken.first_error().is_some());
}

#[test]
fn test_import_specs_expose_alias_and_path() {
    let mut adapter = GoAdapter::new().unwrap();
    let file = adapter
        .parse_file(
            Path::new("/go/src/main/0.go"),
            "package main\n\nimport (\n\tx \"foo\"\n\t\"bar\"\n)\n".to_string(),
        )
        .unwrap();
    let specs = file.import_specs();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].name.map(|n| file.text_of(n)), Some("x"));
    assert_eq!(file.text_of(specs[0].path), "\"foo\"");
    assert!(specs[1].name.is_none());
}
