// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Creates an empty workspace directory for one test run.
pub fn setup_workspace() -> TempDir {
    tempdir().expect("Failed to create temporary directory")
}

/// Writes a caselist file with the given names, one per line.
pub fn write_caselist(dir: &Path, names: &[&str]) -> PathBuf {
    let path = dir.join("caselist.txt");
    let mut content = names.join("\n");
    content.push('\n');
    fs::write(&path, content).expect("Failed to write caselist");
    path
}

/// Writes a caselist of `count` generated names, `suite.case.0..`.
pub fn write_numbered_caselist(dir: &Path, count: usize) -> PathBuf {
    let path = dir.join("caselist.txt");
    let mut content = String::new();
    for i in 0..count {
        content.push_str(&format!("suite.case.{i}\n"));
    }
    fs::write(&path, content).expect("Failed to write caselist");
    path
}

/// Writes an executable shell script standing in for the test executable.
/// The script receives the caselist flag as its only argument and the case
/// names on stdin, like the real thing.
#[cfg(unix)]
pub fn write_fake_executable(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-suite.sh");
    let script = format!("#!/bin/sh\n{body}\n");
    fs::write(&path, script).expect("Failed to write fake executable");

    let mut perms = fs::metadata(&path)
        .expect("Failed to stat fake executable")
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("Failed to chmod fake executable");
    path
}

/// A script that records each invocation and passes every case it is fed.
pub const PASS_ALL: &str = r#"echo invoked >> "$(dirname "$0")/invocations.log"
while read name; do
  echo "Test case '$name'"
  echo "  running through the motions"
  echo "  Pass (ok)"
done"#;

/// A script that starts the first case it is fed and then dies.
pub const CRASH_FIRST: &str = r#"read name
echo "Test case '$name'"
echo "last words before the crash"
exit 42"#;

/// Writes a `Conformance.toml` pointing at the given executable, with the
/// database and log placed inside the workspace.
pub fn write_config(dir: &Path, executable: &Path, batch_size: usize) -> PathBuf {
    let path = dir.join("Conformance.toml");
    let content = format!(
        r#"executable = "{}"
batch_size = {}
database = "{}"
log_file = "{}"
"#,
        executable.display(),
        batch_size,
        dir.join("cts_database.sqlite").display(),
        dir.join("cts_log.txt").display(),
    );
    fs::write(&path, content).expect("Failed to write Conformance.toml");
    path
}

/// Number of times the fake executable was launched, per `PASS_ALL`'s
/// invocation log.
pub fn invocation_count(dir: &Path) -> usize {
    match fs::read_to_string(dir.join("invocations.log")) {
        Ok(content) => content.lines().count(),
        Err(_) => 0,
    }
}

/// Reads (status, output) for one case from the result database.
pub fn read_case_row(dir: &Path, name: &str) -> (String, String) {
    let conn = rusqlite::Connection::open(dir.join("cts_database.sqlite"))
        .expect("Failed to open result database");
    conn.query_row(
        "SELECT status, output FROM results WHERE name=?1",
        rusqlite::params![name],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .expect("Case row not found")
}
