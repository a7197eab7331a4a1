//! Console output for a finished relocation.

use owo_colors::OwoColorize;
use pkgmove_rs::api::{CollisionKind, RelocationReport};

/// Warning printed before a pruned run
pub fn unsafe_fast_warning() -> String {
    format!(
        "{} {}",
        "warning:".yellow().bold(),
        "--unsafe-fast resolves only the packages around the affected files; \
         packages outside that neighbourhood are stubbed, so references reached \
         through them may be left unrenamed. It is much faster on large trees."
    )
}

/// Per-destination summary lines
pub fn summary(report: &RelocationReport) -> Vec<String> {
    let mut lines = Vec::new();
    let verb = if report.dry_run { "would write" } else { "wrote" };

    for (destination, paths) in &report.written {
        lines.push(format!(
            "{} {} ({} files)",
            verb,
            destination.cyan().bold(),
            paths.len()
        ));
        for path in paths {
            lines.push(format!("  {}", path.display()));
        }
    }

    for conflict in &report.conflicts {
        lines.push(format!(
            "{} {} imports {} under {}; references left unchanged",
            "conflict:".yellow().bold(),
            conflict.file.display(),
            conflict.paths.join(", "),
            conflict.name
        ));
    }
    for skipped in &report.skipped {
        lines.push(format!(
            "{} {}: {}",
            "skipped:".yellow(),
            skipped.path.display(),
            skipped.reason
        ));
    }
    for missing in &report.missing {
        lines.push(format!(
            "{} {}/{} was not loaded",
            "skipped:".yellow(),
            missing.package,
            missing.file
        ));
    }
    for collision in &report.collisions {
        let kind = match collision.kind {
            CollisionKind::Declaration => "declaration",
            CollisionKind::File => "file",
        };
        lines.push(format!(
            "{} {} already has {} {}",
            "collision:".red().bold(),
            report.to,
            kind,
            collision.name
        ));
    }
    for warning in &report.warnings {
        lines.push(format!("{} {}", "warning:".yellow(), warning));
    }

    if let Some((from, to)) = &report.moved {
        let verb = if report.dry_run { "would move" } else { "moved" };
        lines.push(format!("{} {} -> {}", verb, from.display(), to.display()));
    }
    lines
}

/// Print the summary followed by `ok`
pub fn print_summary(report: &RelocationReport) {
    for line in summary(report) {
        println!("{}", line);
    }
    println!("{}", "ok".green().bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn plain(lines: Vec<String>) -> Vec<String> {
        lines
            .into_iter()
            .map(|line| {
                let mut out = String::new();
                let mut chars = line.chars();
                while let Some(c) = chars.next() {
                    if c == '\u{1b}' {
                        for c in chars.by_ref() {
                            if c == 'm' {
                                break;
                            }
                        }
                    } else {
                        out.push(c);
                    }
                }
                out
            })
            .collect()
    }

    #[test]
    fn test_summary_groups_by_destination() {
        let mut report = RelocationReport::new("foo", "bar", false);
        report.add_written("main", Path::new("/go/src/main/0.go"));
        report.add_written("bar", Path::new("/go/src/foo/0.go"));
        report.moved = Some((PathBuf::from("/go/src/foo"), PathBuf::from("/go/src/bar")));

        assert_eq!(
            plain(summary(&report)),
            vec![
                "wrote main (1 files)",
                "  /go/src/main/0.go",
                "wrote bar (1 files)",
                "  /go/src/foo/0.go",
                "moved /go/src/foo -> /go/src/bar",
            ]
        );
    }

    #[test]
    fn test_dry_run_wording() {
        let mut report = RelocationReport::new("foo", "bar", true);
        report.add_written("main", Path::new("/go/src/main/0.go"));
        assert!(plain(summary(&report))[0].starts_with("would write main"));
    }
}
