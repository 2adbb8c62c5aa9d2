#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Repo metadata returned for `gh repo view`.
pub const REPO_JSON: &str =
    r#"{"name":"hello","owner":{"login":"octo"},"url":"https://github.com/octo/hello"}"#;

/// Write an executable stand-in for `gh` that answers from canned JSON.
///
/// `routes` pairs a shell `case` pattern (matched against all arguments
/// joined by spaces) with the JSON to print for it.
#[cfg(unix)]
pub fn fake_gh(dir: &Path, routes: &[(&str, &str)]) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let mut script = String::from("#!/bin/sh\ncase \"$*\" in\n");
    for (pattern, json) in routes {
        script.push_str(&format!("  {pattern}) printf '%s\\n' '{json}' ;;\n"));
    }
    script.push_str("  *) echo \"unexpected gh call: $*\" >&2; exit 1 ;;\nesac\n");

    let path = dir.join("fake-gh");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Write a config file pointing at `gh_binary` and return its path.
pub fn write_config(dir: &Path, gh_binary: &Path) -> PathBuf {
    let path = dir.join("ci-status.toml");
    fs::write(
        &path,
        format!("gh_binary = \"{}\"\nretries = 1\n", gh_binary.display()),
    )
    .unwrap();
    path
}
