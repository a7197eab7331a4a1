//! Configuration Layer Management
//!
//! Defaults, then the configuration file, then CLI flags.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::cli::args::Cli;
use pkgmove_rs::{FidelityMode, MatchMode, MoveConfig};

/// Names looked up in the working directory when `--config` is absent
pub const IMPLICIT_CONFIG_FILES: &[&str] = &[".pkgmove.yml", ".pkgmove.yaml"];

/// Trait for merging configuration layers
pub trait ConfigMerge<T> {
    /// Merge another layer into this one, with the other taking priority
    fn merge_with(&mut self, other: T);
}

impl ConfigMerge<&Cli> for MoveConfig {
    fn merge_with(&mut self, cli: &Cli) {
        if cli.recursive {
            self.match_mode = MatchMode::Subtree;
        }
        if cli.unsafe_fast {
            self.fidelity = FidelityMode::Pruned;
        }
        if !cli.roots.is_empty() {
            self.source_roots = cli.roots.clone();
        }
    }
}

/// The explicit configuration file, or the first implicit one in `cwd`
pub fn config_path(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    IMPLICIT_CONFIG_FILES
        .iter()
        .map(|name| cwd.join(name))
        .find(|path| path.is_file())
}

/// Build the effective configuration for `cli`
pub fn load_configuration(cli: &Cli, cwd: &Path) -> anyhow::Result<MoveConfig> {
    let mut config = match config_path(cli.config.as_deref(), cwd) {
        Some(path) => {
            debug!("loading configuration from {}", path.display());
            MoveConfig::from_yaml_file(&path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => MoveConfig::default(),
    };
    config.merge_with(cli);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["pkgmove", "--from", "foo", "--to", "bar"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_flags_override_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_configuration(
            &cli(&["--recursive", "--unsafe-fast", "--root", "/go/src"]),
            dir.path(),
        )
        .unwrap();
        assert_eq!(config.match_mode, MatchMode::Subtree);
        assert_eq!(config.fidelity, FidelityMode::Pruned);
        assert_eq!(config.source_roots, vec![PathBuf::from("/go/src")]);
    }

    #[test]
    fn test_implicit_config_file_is_picked_up() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".pkgmove.yml"),
            "source_roots: [/srv/go/src]\nmatch_mode: subtree\nprinter:\n  tab_width: 4\n",
        )
        .unwrap();

        let config = load_configuration(&cli(&[]), dir.path()).unwrap();
        assert_eq!(config.source_roots, vec![PathBuf::from("/srv/go/src")]);
        assert_eq!(config.match_mode, MatchMode::Subtree);
        assert_eq!(config.printer.tab_width, 4);
        assert_eq!(config.fidelity, FidelityMode::Exhaustive);
    }

    #[test]
    fn test_cli_roots_win_over_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("custom.yaml");
        std::fs::write(&file, "source_roots: [/srv/go/src]\n").unwrap();
        let path = file.to_string_lossy().into_owned();

        let config = load_configuration(&cli(&["--config", &path, "--root", "/other"]), dir.path()).unwrap();
        assert_eq!(config.source_roots, vec![PathBuf::from("/other")]);
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".pkgmove.yaml"), "printer:\n  tab_width: 0\n").unwrap();
        assert!(load_configuration(&cli(&[]), dir.path()).is_err());
    }
}
