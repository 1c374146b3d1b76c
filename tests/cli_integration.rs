// CLI integration tests for fmt/get/keys and error reporting.
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

const DOCUMENT: &str = r#"{"name":"widget","count":"42","ratio":0.5,"tags":["a","b"],"flags":{"on":true,"off":false},"nothing":null}"#;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_xson");
    Command::new(exe)
}

fn write_document(dir: &Path, contents: &str) -> String {
    let path = dir.join("doc.json");
    std::fs::write(&path, contents).expect("write document");
    path.to_str().expect("utf8 path").to_string()
}

fn run(args: &[&str]) -> Output {
    cmd().args(args).output().expect("run xson")
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8 stdout")
}

fn parse_error(output: &Output) -> Value {
    let text = String::from_utf8_lossy(&output.stderr);
    let line = text
        .lines()
        .rev()
        .find(|line| line.starts_with('{'))
        .expect("json error line");
    serde_json::from_str(line).expect("valid json")
}

#[test]
fn fmt_sorts_keys_identically_on_both_backends() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = write_document(temp.path(), r#"{"b":1,"a":[true,null],"c":{"z":"x","y":2}}"#);

    let expected = "{\"a\":[true,null],\"b\":1,\"c\":{\"y\":2,\"z\":\"x\"}}\n";
    for backend in ["reference", "compact"] {
        let output = run(&["--backend", backend, "fmt", &file]);
        assert!(output.status.success(), "backend {backend}");
        assert_eq!(stdout_text(&output), expected, "backend {backend}");
    }
}

#[test]
fn fmt_pretty_reparses_to_the_same_document() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = write_document(temp.path(), DOCUMENT);

    let output = run(&["fmt", "--pretty", &file]);
    assert!(output.status.success());
    let text = stdout_text(&output);
    assert!(text.lines().count() > 1);
    let reparsed: Value = serde_json::from_str(&text).expect("pretty output is json");
    let original: Value = serde_json::from_str(DOCUMENT).expect("fixture is json");
    assert_eq!(reparsed, original);
}

#[test]
fn fmt_reads_stdin_when_no_file_is_given() {
    let mut child = cmd()
        .args(["--backend", "compact", "fmt"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"[1, 2.5, \"x\"]")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());
    assert_eq!(stdout_text(&output), "[1,2.5,\"x\"]\n");
}

#[test]
fn get_strict_and_lenient() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = write_document(temp.path(), DOCUMENT);

    for backend in ["reference", "compact"] {
        let output = run(&["--backend", backend, "get", &file, "--path", "tags.1"]);
        assert!(output.status.success());
        assert_eq!(stdout_text(&output), "\"b\"\n");

        let output = run(&[
            "--backend", backend, "get", &file, "--path", "flags.on", "--as", "bool",
        ]);
        assert_eq!(stdout_text(&output), "true\n");

        let strict = run(&["--backend", backend, "get", &file, "--path", "count", "--as", "int"]);
        assert_eq!(strict.status.code(), Some(4), "backend {backend}");
        let err = parse_error(&strict);
        assert_eq!(err["error"]["kind"], "TypeMismatch");

        let lenient = run(&[
            "--backend", backend, "get", &file, "--path", "count", "--as", "int", "--lenient",
        ]);
        assert!(lenient.status.success(), "backend {backend}");
        assert_eq!(stdout_text(&lenient), "42\n");

        let output = run(&[
            "--backend", backend, "get", &file, "--path", "ratio", "--as", "string", "--lenient",
        ]);
        assert_eq!(stdout_text(&output), "0.5\n");
    }
}

#[test]
fn get_reports_lookup_failures() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = write_document(temp.path(), DOCUMENT);

    let missing = run(&["get", &file, "--path", "flags.maybe"]);
    assert_eq!(missing.status.code(), Some(5));
    let err = parse_error(&missing);
    assert_eq!(err["error"]["kind"], "KeyNotFound");
    assert_eq!(err["error"]["key"], "maybe");

    let out_of_range = run(&["get", &file, "--path", "tags.9"]);
    assert_eq!(out_of_range.status.code(), Some(6));
    let err = parse_error(&out_of_range);
    assert_eq!(err["error"]["index"], 9);

    let malformed = run(&["get", &file, "--path", "name", "--as", "float", "--lenient"]);
    assert_eq!(malformed.status.code(), Some(7));
    assert_eq!(parse_error(&malformed)["error"]["kind"], "Coercion");

    let through_null = run(&["--backend", "compact", "get", &file, "--path", "nothing.x"]);
    assert_eq!(through_null.status.code(), Some(4));
}

#[test]
fn keys_lists_members_in_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = write_document(temp.path(), DOCUMENT);

    let output = run(&["--backend", "compact", "keys", &file]);
    assert!(output.status.success());
    assert_eq!(
        stdout_text(&output),
        "count\nflags\nname\nnothing\nratio\ntags\n"
    );

    let nested = run(&["keys", &file, "--path", "flags"]);
    assert_eq!(stdout_text(&nested), "off\non\n");

    let not_object = run(&["keys", &file, "--path", "tags"]);
    assert_eq!(not_object.status.code(), Some(4));
}

#[test]
fn parse_errors_carry_position() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = write_document(temp.path(), "{\n  \"a\": 1,\n  \"b\": \n}");

    for backend in ["reference", "compact"] {
        let output = run(&["--backend", backend, "fmt", &file]);
        assert_eq!(output.status.code(), Some(3), "backend {backend}");
        let err = parse_error(&output);
        assert_eq!(err["error"]["kind"], "Parse");
        assert!(err["error"]["line"].as_u64().is_some());
        assert!(
            err["error"]["hint"]
                .as_str()
                .is_some_and(|hint| hint.starts_with("parse category: "))
        );
    }
}

#[test]
fn usage_and_io_exit_codes() {
    let unknown_flag = run(&["fmt", "--bogus"]);
    assert_eq!(unknown_flag.status.code(), Some(2));
    assert_eq!(parse_error(&unknown_flag)["error"]["kind"], "Usage");

    let no_command = run(&[]);
    assert_eq!(no_command.status.code(), Some(2));

    let temp = tempfile::tempdir().expect("tempdir");
    let missing = temp.path().join("absent.json");
    let output = run(&["fmt", missing.to_str().expect("utf8 path")]);
    assert_eq!(output.status.code(), Some(8));
    assert_eq!(parse_error(&output)["error"]["kind"], "Io");

    let version = run(&["--version"]);
    assert!(version.status.success());
    assert!(stdout_text(&version).starts_with("xson "));
}
