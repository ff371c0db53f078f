use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempdir::TempDir;

fn stix_pattern(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stix-pattern"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run stix-pattern")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_prints_canonical_form() {
    let output = stix_pattern(&["[file:name='a.exe']  and [file:size>10]"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "[file:name = 'a.exe'] AND [file:size > 10]\n");
}

#[test]
fn test_comparisons_output() {
    let output = stix_pattern(&[
        "--output",
        "comparisons",
        "[a:b = 1 OR a:c NOT = 2] FOLLOWEDBY [EXISTS d:e]",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "a:b = 1\na:c NOT = 2\nEXISTS d:e\n");
}

#[test]
fn test_tree_output() {
    let output = stix_pattern(&["-o", "tree", "[a:b = 1] REPEATS 2 TIMES"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Qualified"), "{}", out);
    assert!(out.contains("Repeats("), "{}", out);
}

#[test]
fn test_syntax_error_reports_diagnostic_and_fails() {
    let output = stix_pattern(&["[a:b = 1]", "[a:b=]"]);
    assert!(!output.status.success());
    assert_eq!(stdout(&output), "[a:b = 1]\n");
    let err = stderr(&output);
    assert!(err.contains("Syntax error at line 1, column 6"), "{}", err);
    assert!(err.contains("stix_patterns::syntax"), "{}", err);
}

#[test]
fn test_reads_patterns_from_file() {
    let dir = TempDir::new("stix-pattern").unwrap();
    let path = dir.path().join("patterns.txt");
    fs::write(&path, "[a:b = 1]\n\n  [c:d = 'x']  \n").unwrap();

    let output = stix_pattern(&["--file", path.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "[a:b = 1]\n[c:d = 'x']\n");
}

#[test]
fn test_reads_patterns_from_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_stix-pattern"))
        .args(["-f", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"[a:b=1] or [a:b=2]\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout(&output), "[a:b = 1] OR [a:b = 2]\n");
}

#[test]
fn test_depth_limit_flag() {
    let output = stix_pattern(&["--max-depth", "1", "([a:b = 1])"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("maximum depth of 1"));
}

#[test]
fn test_operator_limit_flag() {
    let output = stix_pattern(&["--max-operators", "1", "[a:b = 1] OR [a:b = 2] OR [a:b = 3]"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("more than 1 operators"));

    let output = stix_pattern(&["--max-operators", "2", "[a:b = 1] OR [a:b = 2] OR [a:b = 3]"]);
    assert!(output.status.success());
}

#[test]
fn test_missing_file_is_an_error() {
    let output = stix_pattern(&["--file", "/nonexistent/patterns.txt"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed to read"));
}

#[test]
fn test_no_patterns_is_an_error() {
    let output = stix_pattern(&[]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no patterns given"));
}
