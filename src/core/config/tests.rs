use super::*;
use std::path::Path;

fn expect_validation_error<T: std::fmt::Debug>(result: Result<T>) -> PkgMoveError {
    result.expect_err("expected validation failure")
}

#[test]
fn default_config_validates_successfully() {
    MoveConfig::default().validate().expect("move default");
    PrinterConfig::default().validate().expect("printer default");
}

#[test]
fn printer_rejects_zero_tab_width() {
    let mut config = MoveConfig::default();
    config.printer.tab_width = 0;
    let err = expect_validation_error(config.validate());
    assert!(matches!(err, PkgMoveError::Validation { .. }));
    assert!(format!("{err}").contains("tab_width"));
}

#[test]
fn extension_must_not_carry_a_dot() {
    let mut config = MoveConfig::default();
    config.source_extension = ".go".into();
    let err = expect_validation_error(config.validate());
    assert!(matches!(err, PkgMoveError::Config { .. }));
}

#[test]
fn invalid_lenient_glob_is_rejected() {
    let mut config = MoveConfig::default();
    config.lenient_patterns = vec!["[broken".into()];
    assert!(config.validate().is_err());
}

#[test]
fn yaml_round_trip_keeps_modes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".pkgmove.yml");

    let mut config = MoveConfig::default();
    config.match_mode = MatchMode::Subtree;
    config.fidelity = FidelityMode::Pruned;
    config.source_roots = vec![PathBuf::from("/go/src")];
    config.to_yaml_file(&path).unwrap();

    let loaded = MoveConfig::from_yaml_file(&path).unwrap();
    assert_eq!(loaded.match_mode, MatchMode::Subtree);
    assert_eq!(loaded.fidelity, FidelityMode::Pruned);
    assert_eq!(loaded.source_roots, vec![PathBuf::from("/go/src")]);
}

#[test]
fn partial_yaml_fills_defaults() {
    let config: MoveConfig = serde_yaml::from_str("match_mode: subtree\n").unwrap();
    assert_eq!(config.match_mode, MatchMode::Subtree);
    assert_eq!(config.source_extension, "go");
    assert_eq!(config.printer.tab_width, 8);
    assert_eq!(config.lenient_patterns, vec!["**/vendor/**".to_string()]);
}

#[test]
fn default_roots_follow_gopath_then_goroot() {
    let roots = default_source_roots(
        Some(Path::new("/work/go")),
        Some(Path::new("/usr/local/go")),
        None,
    );
    assert_eq!(
        roots,
        vec![PathBuf::from("/work/go/src"), PathBuf::from("/usr/local/go/src")]
    );
}

#[test]
fn default_roots_fall_back_to_home() {
    let roots = default_source_roots(None, None, Some(Path::new("/home/dev")));
    assert_eq!(roots, vec![PathBuf::from("/home/dev/go/src")]);
}

#[test]
fn configured_roots_win_over_environment() {
    let mut config = MoveConfig::default();
    config.source_roots = vec![PathBuf::from("/srv/src")];
    assert_eq!(config.resolved_source_roots(), vec![PathBuf::from("/srv/src")]);
}
