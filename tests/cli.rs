use std::io::Write;
use std::process::{Command, Stdio};

fn monkey() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_monkey"));
    cmd.env_remove("MONKEY_LOG").env_remove("RUST_LOG");
    cmd
}

fn stdout(out: &std::process::Output) -> String {
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

fn stderr(out: &std::process::Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

// --- Running inline code ---

#[test]
fn inline_arithmetic() {
    let out = monkey().args(["1 + 2"]).output().expect("failed to run monkey");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "3");
}

#[test]
fn inline_prints_last_statement() {
    let out = monkey().args(["1 + 2; 3 * 4; 1 < 2"]).output().expect("failed to run monkey");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "true");
}

#[test]
fn inline_boolean_equality() {
    let out = monkey().args(["true == false"]).output().expect("failed to run monkey");
    assert!(out.status.success());
    assert_eq!(stdout(&out), "false");
}

#[test]
fn inline_empty_program_prints_nothing() {
    let out = monkey().args([""]).output().expect("failed to run monkey");
    assert!(out.status.success());
    assert_eq!(stdout(&out), "");
}

// --- File and stdin input ---

#[test]
fn file_source() {
    let out = monkey().args(["tests/fixtures/arithmetic.monkey"]).output().expect("failed to run monkey");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "55");
}

#[test]
fn stdin_source() {
    let mut child = monkey()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run monkey");
    child.stdin.take().expect("stdin piped").write_all(b"6 * 7").expect("write stdin");
    let out = child.wait_with_output().expect("wait for monkey");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "42");
}

// --- Emit ---

#[test]
fn emit_bytecode_disassembly() {
    let out = monkey().args(["1 < 2", "--emit", "bytecode"]).output().expect("failed to run monkey");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "0000 OpConstant 0\n0003 OpConstant 1\n0006 OpGreaterThan\n0007 OpPop\nconstants:\n     0: 2\n     1: 1"
    );
}

#[test]
fn emit_bytecode_json() {
    let out = monkey().args(["1 + 2", "--emit", "bytecode", "--json"]).output().expect("failed to run monkey");
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("valid JSON");
    assert_eq!(v["instructions"], serde_json::json!([0, 0, 0, 0, 0, 1, 1, 5]));
    assert_eq!(v["constants"][0]["Integer"], 1);
}

#[test]
fn emit_ast() {
    let out = monkey().args(["true != false", "--emit", "ast"]).output().expect("failed to run monkey");
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("\"operator\": \"!=\""), "expected AST JSON, got: {}", text);
}

#[test]
fn emit_unknown_target() {
    let out = monkey().args(["1", "--emit", "python"]).output().expect("failed to run monkey");
    assert!(!out.status.success());
    assert!(stderr(&out).contains("invalid value"), "got: {}", stderr(&out));
}

// --- Errors ---

#[test]
fn lex_error_reports_location() {
    let out = monkey().args(["1 = 1"]).output().expect("failed to run monkey");
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("error[MK-L001]"), "got: {}", err);
    assert!(err.contains("--> 1:3"), "got: {}", err);
}

#[test]
fn unknown_operator_is_compile_error() {
    let out = monkey().args(["1 + 2; 3 <= 4"]).output().expect("failed to run monkey");
    assert!(!out.status.success());
    assert_eq!(stdout(&out), "");
    assert!(stderr(&out).contains("unknown operator: <="), "got: {}", stderr(&out));
}

#[test]
fn deep_nesting_is_reported_not_crashed() {
    let depth = 100_000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let mut child = monkey()
        .arg("--json")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run monkey");
    child.stdin.take().expect("stdin piped").write_all(source.as_bytes()).expect("write stdin");
    let out = child.wait_with_output().expect("wait for monkey");
    assert_eq!(out.status.code(), Some(1), "stderr: {}", stderr(&out));
    let v: serde_json::Value = serde_json::from_str(stderr(&out).trim()).expect("valid JSON");
    assert_eq!(v["code"], "MK-P006");
}

#[test]
fn runtime_type_error() {
    let out = monkey().args(["true + 1"]).output().expect("failed to run monkey");
    assert!(!out.status.success());
    assert!(
        stderr(&out).contains("unsupported types for binary operation: BOOLEAN INTEGER"),
        "got: {}",
        stderr(&out)
    );
}

#[test]
fn runtime_error_as_json() {
    let out = monkey().args(["10 / (5 - 5)", "--json"]).output().expect("failed to run monkey");
    assert!(!out.status.success());
    let v: serde_json::Value = serde_json::from_str(stderr(&out).trim()).expect("valid JSON");
    assert_eq!(v["code"], "MK-R003");
    assert_eq!(v["message"], "division by zero");
}

#[test]
fn stack_size_flag() {
    let out = monkey().args(["1 + (2 + 3)", "--stack-size", "2"]).output().expect("failed to run monkey");
    assert!(!out.status.success());
    assert!(stderr(&out).contains("stack overflow"), "got: {}", stderr(&out));

    let out = monkey().args(["1 + (2 + 3)", "--stack-size", "3"]).output().expect("failed to run monkey");
    assert!(out.status.success());
    assert_eq!(stdout(&out), "6");
}

// --- Explain ---

#[test]
fn explain_known_code() {
    let out = monkey().args(["--explain", "MK-C001"]).output().expect("failed to run monkey");
    assert!(out.status.success());
    assert!(stdout(&out).starts_with("## MK-C001: unknown operator"));
}

#[test]
fn explain_unknown_code() {
    let out = monkey().args(["--explain", "MK-Z000"]).output().expect("failed to run monkey");
    assert!(!out.status.success());
    assert!(stderr(&out).contains("unknown error code"));
}
