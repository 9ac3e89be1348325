use mockito::{Matcher, Server};
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn run_gq(args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_gq"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn gq");

    {
        let mut pipe = child.stdin.take().unwrap();
        if let Some(data) = stdin {
            pipe.write_all(data.as_bytes()).unwrap();
        }
    }

    child.wait_with_output().unwrap()
}

#[test]
fn test_piped_input_without_question_fails() {
    let output = run_gq(&[], Some("some log lines\n"));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no question provided"), "stderr: {}", stderr);
}

#[test]
fn test_question_without_data_fails() {
    let output = run_gq(&["-q", "what is this?"], None);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no data provided"), "stderr: {}", stderr);
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("missing.yaml");
    let output = run_gq(
        &["-c", config.to_str().unwrap(), "-q", "Summarize", "hello"],
        None,
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error reading config file"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_provider_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join(".gq.yaml");
    std::fs::write(&config, "gemini:\n  apiKey: k\n").unwrap();
    let output = run_gq(
        &["-c", config.to_str().unwrap(), "-p", "cohere", "hello"],
        None,
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported provider: cohere"), "stderr: {}", stderr);
}

#[test]
fn test_verbose_params_go_to_stderr() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", Matcher::Regex(r"^/v1beta/models/gemini-pro:generateContent".to_string()))
        .match_query(Matcher::UrlEncoded("key".into(), "k".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Three words here"}]}}]}"#)
        .create();

    let dir = TempDir::new().unwrap();
    let config = dir.path().join(".gq.yaml");
    std::fs::write(
        &config,
        format!(
            "gemini:\n  apiKey: k\n  modelName: gemini-pro\n  temperature: 0.5\n  baseUrl: {}\n",
            server.url()
        ),
    )
    .unwrap();

    let output = run_gq(
        &["-v", "-c", config.to_str().unwrap(), "-q", "How many words?", "one two three"],
        None,
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "stderr: {}", stderr);
    assert_eq!(stdout, "Three words here\n");
    assert!(stderr.contains("Model Params:"), "stderr: {}", stderr);
    assert!(stderr.contains("Model Name: gemini-pro"), "stderr: {}", stderr);
    assert!(stderr.contains("Temperature: 0.5"), "stderr: {}", stderr);
}
