// AuditCrab - GPL-3.0-or-later
// Build script to embed version info at compile time

use std::process::Command;

/// Run a git subcommand, returning its trimmed stdout on success
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn main() {
    let hash = git(&["rev-parse", "--short", "HEAD"]).filter(|h| !h.is_empty());
    let dirty = git(&["status", "--porcelain"]).is_some_and(|s| !s.is_empty());

    // Shown in `--version` and the startup log, e.g. "1a2b3c4-dirty"
    let git_hash = match (hash, dirty) {
        (Some(hash), true) => format!("{hash}-dirty"),
        (Some(hash), false) => hash,
        (None, _) => "unknown".to_string(),
    };
    println!("cargo:rustc-env=GIT_HASH={git_hash}");

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
}
