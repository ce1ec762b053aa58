//! Integration tests for the `javm` binary.
//!
//! Runs the built binary and checks the driver programs' stdout/stderr.

use std::io::Write;
use std::process::{Command, Output};

fn javm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_javm"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run javm")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// Driver programs
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_class_name_program() {
    let output = javm(&["class-name"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "java.lang.String\nbyte\n[Ljava.lang.Object;\n[J\n[[[[[[[I\n[[[[[[[Ljava.lang.String;\n"
    );
}

#[test]
fn test_class_cast_program() {
    let output = javm(&["class-cast"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Couldn't cast String to Object to Integer\n"));
    assert!(out.contains("Casted RuntimeException to Object to Throwable to RuntimeException\n"));
    assert!(out.ends_with("Done!\n"));
}

#[test]
fn test_thread_exception_program() {
    let output = javm(&["thread-exception", "--count", "3"]);
    assert!(output.status.success(), "uncaught worker failure must not fail the process");
    assert_eq!(stdout(&output), "Thread-0: 0\nThread-0: 1\nThread-0: 2\n");
    assert!(stderr(&output).contains(
        "Exception in thread \"Thread-0\" java.lang.RuntimeException: exception thrown from my thread: Thread-0"
    ));
}

#[test]
fn test_all_runs_every_program() {
    let output = javm(&["all"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Done!\n"));
    assert!(out.contains("[[[[[[[Ljava.lang.String;\n"));
    assert!(out.contains("Thread-0: 9\n"));
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration and errors
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_file_applies_thread_options() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[threads]\nname_prefix = \"worker-\"").unwrap();
    let path = file.path().to_str().unwrap();

    let output = javm(&["--config", path, "thread-exception", "--count", "1"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "worker-0: 0\n");
}

#[test]
fn test_invalid_config_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[threads]\nmin_priority = 0\nmax_priority = -1").unwrap();
    let path = file.path().to_str().unwrap();

    let output = javm(&["--config", path, "class-name"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid config"));
}

#[test]
fn test_out_of_range_priority_fails() {
    let output = javm(&["thread-exception", "--priority", "11"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid priority 11"));
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_cast_chain_with_arrays() {
    let output = javm(&["class-cast", "[I", "java.io.Serializable"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Casted [I to java.io.Serializable\n");
}
