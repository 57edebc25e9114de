use std::process::Command;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn accql() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_accql"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_converts_to_stdout() {
    let out = accql()
        .arg("SELECT IIF(column = 'value', 'true', 'false') FROM table")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "SELECT (CASE WHEN column = 'value' THEN 'true' ELSE 'false' END) FROM table\n"
    );
}

#[test]
fn test_reads_file_and_writes_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.sql");
    let output = dir.path().join("out.sql");
    std::fs::write(&input, "SELECT Nz(a, 0)\nFROM t;\n").unwrap();

    let out = accql()
        .arg("--file")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--quiet")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "SELECT COALESCE(a, 0) FROM t\n"
    );
}

#[test]
fn test_malformed_input_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("never.sql");
    let out = accql()
        .arg("SELECT IIF(a=1, 'x') FROM t")
        .arg("-o")
        .arg(&output)
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(!output.exists());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Structural error"));
}

#[test]
fn test_unwritable_output_prints_nothing() {
    let out = accql()
        .args(["-o", "/nonexistent/dir/x.sql", "SELECT a FROM t"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("/nonexistent/dir/x.sql"));
}

#[test]
fn test_failed_conversion_keeps_existing_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.sql");
    std::fs::write(&output, "SELECT previous FROM t\n").unwrap();

    let out = accql()
        .arg("SELECT a FROM t WHERE d = #2/31/2024#")
        .arg("-o")
        .arg(&output)
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "SELECT previous FROM t\n"
    );
}

#[test]
fn test_dialect_flag() {
    let out = accql()
        .args(["--dialect", "sqlite", "SELECT True FROM t"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "SELECT 1 FROM t\n");
}

#[test]
fn test_rules_lists_every_kind() {
    let out = accql().arg("rules").output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    for kind in accql::ast::NodeKind::ALL {
        assert!(text.contains(kind.name()), "missing {kind}");
    }
}
