use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};

static TEMP_SEQ: AtomicU64 = AtomicU64::new(1);

fn temp_catalog_path() -> std::path::PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();
    std::env::temp_dir().join(format!("cloudpick-catalog-{pid}-{now}-{seq}.json"))
}

#[test]
fn advisor_evaluate_stdio_flow_works() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cloudpickd"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn cloudpickd");

    let mut child_stdin = child.stdin.take().expect("stdin");
    let child_stdout = child.stdout.take().expect("stdout");
    let mut reader = BufReader::new(child_stdout);

    let req = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {
            "name": "advisor_evaluate",
            "arguments": {
                "scenario": "bursty_low_cost",
                "cost": 1,
                "ops": 1,
                "performance": 1
            }
        }
    });

    writeln!(child_stdin, "{}", req).expect("write request");
    drop(child_stdin);

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");

    let response: Value = serde_json::from_str(&line).expect("parse response json");
    let best = response["result"]["structuredContent"]["best"]
        .as_str()
        .expect("best service");
    assert_eq!(best, "Lambda");
    assert_eq!(
        response["result"]["structuredContent"]["confidence"].as_str(),
        Some("Medium")
    );

    let status = child.wait().expect("wait child");
    assert!(status.success());
}

fn write_framed(stdin: &mut std::process::ChildStdin, payload: &Value) {
    let body = serde_json::to_vec(payload).expect("serialize payload");
    let frame = format!("Content-Length: {}\r\n\r\n", body.len());
    stdin
        .write_all(frame.as_bytes())
        .expect("write frame header");
    stdin.write_all(&body).expect("write frame body");
    stdin.flush().expect("flush frame");
}

fn read_framed(reader: &mut BufReader<std::process::ChildStdout>) -> Value {
    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read frame header");
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse::<usize>().ok();
            }
        }
    }

    let len = content_length.expect("content-length header");
    let mut body = vec![0_u8; len];
    std::io::Read::read_exact(reader, &mut body).expect("read frame body");
    serde_json::from_slice(&body).expect("parse framed response")
}

#[test]
fn stdio_content_length_initialize_and_tools_list_work() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cloudpickd"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn cloudpickd");

    let mut child_stdin = child.stdin.take().expect("stdin");
    let child_stdout = child.stdout.take().expect("stdout");
    let mut reader = BufReader::new(child_stdout);

    write_framed(
        &mut child_stdin,
        &json!({
            "jsonrpc":"2.0",
            "id":1,
            "method":"initialize",
            "params":{
                "protocolVersion":"2024-11-05",
                "capabilities":{},
                "clientInfo":{"name":"stdio-test","version":"1.0.0"}
            }
        }),
    );
    let init = read_framed(&mut reader);
    assert_eq!(
        init["result"]["protocolVersion"].as_str(),
        Some("2024-11-05")
    );
    assert_eq!(
        init["result"]["capabilities"]["tools"]["listChanged"].as_bool(),
        Some(false)
    );

    write_framed(
        &mut child_stdin,
        &json!({
            "jsonrpc":"2.0",
            "id":2,
            "method":"tools/list",
            "params":{}
        }),
    );
    let tools = read_framed(&mut reader);
    let names = tools["result"]["tools"]
        .as_array()
        .expect("tools array")
        .iter()
        .filter_map(|tool| tool.get("name").and_then(Value::as_str))
        .collect::<Vec<_>>();
    assert!(names.contains(&"advisor_evaluate"));
    assert!(names.contains(&"advisor_compare"));

    drop(child_stdin);
    let status = child.wait().expect("wait child");
    assert!(status.success());
}

#[test]
fn catalog_override_from_env_changes_the_recommendation() {
    let path = temp_catalog_path();
    std::fs::write(
        &path,
        r#"{
            "Lambda": {"traffic": 2, "cost": 2, "scalability": 2, "ops": 2, "control": 2, "latency": 2},
            "ECS": {"traffic": 10, "cost": 10, "scalability": 10, "ops": 10, "control": 10, "latency": 10},
            "EC2": {"traffic": 3, "cost": 3, "scalability": 3, "ops": 3, "control": 3, "latency": 3}
        }"#,
    )
    .expect("write catalog override");

    let mut child = Command::new(env!("CARGO_BIN_EXE_cloudpickd"))
        .env("CLOUDPICK_CATALOG", &path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn cloudpickd");

    let mut child_stdin = child.stdin.take().expect("stdin");
    let child_stdout = child.stdout.take().expect("stdout");
    let mut reader = BufReader::new(child_stdout);

    let req = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {
            "name": "advisor_evaluate",
            "arguments": {
                "scenario": "steady_high_traffic",
                "cost": 2,
                "ops": 2,
                "performance": 2
            }
        }
    });
    writeln!(child_stdin, "{}", req).expect("write request");
    drop(child_stdin);

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let response: Value = serde_json::from_str(&line).expect("parse response json");
    assert_eq!(
        response["result"]["structuredContent"]["best"].as_str(),
        Some("ECS")
    );

    let status = child.wait().expect("wait child");
    assert!(status.success());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn interactive_transport_runs_the_questionnaire() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cloudpickd"))
        .env("CLOUDPICK_TRANSPORT", "interactive")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn cloudpickd");

    let mut child_stdin = child.stdin.take().expect("stdin");
    child_stdin
        .write_all(b"1\n1\n1\n1\n")
        .expect("write answers");
    drop(child_stdin);

    let mut rendered = String::new();
    child
        .stdout
        .take()
        .expect("stdout")
        .read_to_string(&mut rendered)
        .expect("read report");

    assert!(rendered.contains("Select traffic pattern:"));
    assert!(rendered.contains("================ DECISION RESULT ================"));
    assert!(rendered.contains("Scenario: bursty_low_cost"));
    assert!(rendered.contains("Recommended Service: Lambda"));
    assert!(rendered.contains("Decision Confidence: Medium"));
    assert!(rendered.contains("Why this service?"));
    assert!(rendered.contains("Alternative: ECS"));
    assert!(rendered.contains("Rejected: EC2"));

    let status = child.wait().expect("wait child");
    assert!(status.success());
}

#[test]
fn unknown_transport_exits_with_an_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_cloudpickd"))
        .env("CLOUDPICK_TRANSPORT", "carrier-pigeon")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .output()
        .expect("run cloudpickd");
    assert!(!output.status.success());
}
