//! Structural tests for layer boundaries.
//!
//! These scan the source tree so a stray import fails the build's tests
//! rather than slipping through review.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Read a file and strip comment lines to avoid false positives.
fn read_non_comment_lines(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| {
            let trimmed = l.trim();
            !trimmed.starts_with("//") && !trimmed.starts_with("/*") && !trimmed.starts_with('*')
        })
        .map(String::from)
        .collect()
}

fn src(layer: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(layer)
}

/// Every line in `layer` that mentions one of `forbidden`.
fn violations(layer: &str, forbidden: &[&str]) -> Vec<String> {
    let mut found = Vec::new();
    for file in collect_rs_files(&src(layer)) {
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            if let Some(hit) = forbidden.iter().find(|f| line.contains(*f)) {
                found.push(format!("{rel}:{}: `{hit}` in: {}", i + 1, line.trim()));
            }
        }
    }
    found
}

#[test]
fn domain_is_pure() {
    let found = violations(
        "domain",
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
            "tokio",
            "std::fs",
            "std::process",
            "std::net",
        ],
    );
    assert!(found.is_empty(), "domain performs I/O:\n{}", found.join("\n"));
}

#[test]
fn application_depends_only_on_domain() {
    let found = violations(
        "application",
        &["crate::infra", "crate::commands", "crate::output", "crate::app::"],
    );
    assert!(
        found.is_empty(),
        "application reaches outward:\n{}",
        found.join("\n")
    );
}

#[test]
fn infra_does_not_know_presentation() {
    let found = violations("infra", &["crate::commands", "crate::output", "crate::app::"]);
    assert!(found.is_empty(), "infra imports presentation:\n{}", found.join("\n"));
}

#[test]
fn commands_do_not_build_adapters() {
    let found = violations(
        "commands",
        &["TokioCommandRunner::new", "SystemdSupervisor::new", "HttpRemote::new"],
    );
    assert!(
        found.is_empty(),
        "commands construct infrastructure; use AppContext instead:\n{}",
        found.join("\n")
    );
}
