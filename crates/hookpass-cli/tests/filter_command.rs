//! Filter command tests
//!
//! Runs the `hookpass filter` binary against scratch project trees.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PREPROCESSED: &[u8] = b"# 1 \"/p/a.c\"\n\
# 1 \"/usr/include/stdio.h\" 1 3 4\n\
extern int printf(const char *, ...);\n\
# 2 \"/p/a.c\" 2\n\
const char *s = \"caf\xE9\";\n";

#[test]
fn test_filter_rejects_non_directory_project() {
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("project.txt");
    let input = temp.path().join("a.i");
    fs::write(&not_a_dir, "").unwrap();
    fs::write(&input, PREPROCESSED).unwrap();

    cargo_bin_cmd!("hookpass")
        .arg("filter")
        .arg(&not_a_dir)
        .arg("--input")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid project directory"));
}

#[test]
fn test_filter_requires_some_input() {
    let temp = TempDir::new().unwrap();

    cargo_bin_cmd!("hookpass")
        .arg("filter")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to filter"));
}

#[test]
fn test_filter_input_file_to_output_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("a.i");
    let output = temp.path().join("a.filtered.c");
    fs::write(&input, PREPROCESSED).unwrap();

    cargo_bin_cmd!("hookpass")
        .arg("filter")
        .arg(temp.path())
        .arg("--input")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(
        fs::read(&output).unwrap(),
        b"#include </usr/include/stdio.h>\nconst char *s = \"caf\xE9\";\n".to_vec()
    );
}

#[cfg(unix)]
#[test]
fn test_filter_command_output_on_stdout() {
    let temp = TempDir::new().unwrap();

    cargo_bin_cmd!("hookpass")
        .arg("filter")
        .arg(temp.path())
        .arg("--")
        .args(["sh", "-c", "printf '# 1 \"/p/a.c\"\\nint a;\\n'"])
        .assert()
        .success()
        .stdout("int a;\n");
}

#[cfg(unix)]
#[test]
fn test_failing_command_writes_no_output() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out.c");

    cargo_bin_cmd!("hookpass")
        .arg("filter")
        .arg(temp.path())
        .arg("-o")
        .arg(&output)
        .arg("--")
        .args(["sh", "-c", "echo 'int partial;'; exit 3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("filter-input stage failed"));

    assert!(!output.exists());
}
