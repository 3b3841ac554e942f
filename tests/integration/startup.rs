//! Process lifecycle: the binary refuses to start without both artifacts and
//! serves the API once both load.

use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

use crate::fixture;

const CONFIG_VARS: &[&str] = &[
    "HOST",
    "PORT",
    "MODEL_PATH",
    "VECTORIZER_PATH",
    "MAX_QUERY_CHARS",
    "REQUEST_TIMEOUT_SECS",
    "RUST_LOG",
];

/// Binary invocation in `dir` with a clean configuration environment.
fn command(dir: &Path, args: &[&str], env: &[(&str, &Path)]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sqli-detector"));
    cmd.current_dir(dir).args(args);
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd
}

/// Run the binary to completion.
fn run(dir: &Path, args: &[&str], env: &[(&str, &Path)]) -> Output {
    command(dir, args, env).output().expect("binary runs")
}

/// Kills the server process when the test ends, pass or fail.
struct Server(Child);

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[test]
fn serve_exits_when_both_artifacts_are_missing() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["serve", "--port", "18431"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("rf_model.json"), "stderr: {stderr}");
    assert!(stderr.contains("tfidf_vectorizer.json"), "stderr: {stderr}");
}

#[test]
fn serve_exits_when_vectorizer_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(fixture("rf_model.json"), dir.path().join("rf_model.json")).unwrap();

    let output = run(dir.path(), &["serve", "--port", "18432"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tfidf_vectorizer.json"), "stderr: {stderr}");
}

#[test]
fn serve_exits_when_model_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(
        fixture("tfidf_vectorizer.json"),
        dir.path().join("tfidf_vectorizer.json"),
    )
    .unwrap();

    let output = run(dir.path(), &["serve", "--port", "18434"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("rf_model.json"), "stderr: {stderr}");
    assert!(stderr.contains("tfidf_vectorizer.json"), "stderr: {stderr}");
}

#[tokio::test]
async fn serve_answers_root_once_artifacts_load() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["rf_model.json", "tfidf_vectorizer.json"] {
        std::fs::copy(fixture(name), dir.path().join(name)).unwrap();
    }
    let port = free_port().to_string();

    let child = command(dir.path(), &["serve", "--port", &port], &[])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("binary starts");
    let _server = Server(child);

    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{port}/");
    let deadline = Instant::now() + Duration::from_secs(15);

    let body: serde_json::Value = loop {
        match client.get(&url).send().await {
            Ok(response) => {
                assert!(response.status().is_success());
                break response.json().await.unwrap();
            }
            Err(_) if Instant::now() < deadline => {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            Err(e) => panic!("server never answered: {e}"),
        }
    };

    assert_eq!(
        body["message"],
        "Welcome to the SQL Injection Detection API. Use the /docs endpoint to see documentation."
    );
}

#[test]
fn serve_exits_on_corrupt_artifact() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(fixture("rf_model.json"), dir.path().join("rf_model.json")).unwrap();
    std::fs::write(dir.path().join("tfidf_vectorizer.json"), "{ truncated").unwrap();

    let output = run(dir.path(), &["serve", "--port", "18433"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse"), "stderr: {stderr}");
}

#[test]
fn check_artifacts_passes_with_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    let model = fixture("rf_model.json");
    let vectorizer = fixture("tfidf_vectorizer.json");

    let output = run(
        dir.path(),
        &["check-artifacts"],
        &[("MODEL_PATH", model.as_path()), ("VECTORIZER_PATH", vectorizer.as_path())],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ARTIFACT CHECK PASSED"), "stdout: {stdout}");
}

#[test]
fn classify_prints_json_detection() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["rf_model.json", "tfidf_vectorizer.json"] {
        std::fs::copy(fixture(name), dir.path().join(name)).unwrap();
    }

    let output = run(dir.path(), &["classify", "1 OR 1=1 --"], &[]);

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["query"], "1 OR 1=1 --");
    assert_eq!(body["prediction"], 1);
    assert_eq!(body["label"], "Malicious");
}
