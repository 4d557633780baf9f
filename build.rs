//! Embeds the commit a binary was built from for `--version`.
//!
//! `GIT_HASH` is the abbreviated commit, empty outside a checkout.
//! `ON_RELEASE_TAG` is `true` when HEAD carries the tag `v<version>` or
//! `<version>` for the version in `Cargo.toml`.

use std::env;
use std::process::Command;

/// Trimmed stdout of a successful `git` call.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_owned())
}

fn main() {
    for watched in [".git/HEAD", ".git/refs/heads", ".git/refs/tags"] {
        println!("cargo:rerun-if-changed={watched}");
    }

    let hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_default();

    let version = env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let on_release_tag = git(&["tag", "--points-at", "HEAD"]).is_some_and(|tags| {
        tags.lines()
            .any(|tag| tag.strip_prefix('v').unwrap_or(tag) == version)
    });

    println!("cargo:rustc-env=GIT_HASH={hash}");
    println!("cargo:rustc-env=ON_RELEASE_TAG={on_release_tag}");
}
