// Build script: exposes UHRI_VERSION to the binary.
//
// Uses the nearest `vX.Y.Z` git tag when building from a clean tag, otherwise
// appends the abbreviated commit to CARGO_PKG_VERSION. Without git, falls back
// to CARGO_PKG_VERSION alone.

use std::process::Command;

fn main() {
    let pkg_version = env!("CARGO_PKG_VERSION");
    let version = git_describe()
        .map(|describe| version_from_describe(pkg_version, &describe))
        .unwrap_or_else(|| pkg_version.to_string());

    println!("cargo:rustc-env=UHRI_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let describe = String::from_utf8(output.stdout).ok()?;
    let describe = describe.trim();
    (!describe.is_empty()).then(|| describe.to_string())
}

fn version_from_describe(pkg_version: &str, describe: &str) -> String {
    match describe.strip_prefix('v') {
        // "v0.2.0" or "v0.2.0-3-gabc123[-dirty]": keep the tag's version
        Some(tagged) => tagged.split('-').next().unwrap_or(tagged).to_string(),
        // bare commit, e.g. "abc123" or "abc123-dirty"
        None => format!("{}+{}", pkg_version, describe),
    }
}
