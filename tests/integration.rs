//! End-to-end integration tests for the checkout test CLI
//!
//! These tests spawn the mock backend (provider API and WebDriver endpoint in
//! one process) and verify the complete scenario:
//! 1. Running the scenario through the library runner
//! 2. Failure and error classification
//! 3. Exit codes of the released binary

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Output, Stdio};

use checkout_test::api::ApiClient;
use checkout_test::common::config::TestConfig;
use checkout_test::driver::WebDriverClient;
use checkout_test::runner::{CheckoutRunner, ScenarioStatus, Step};
use checkout_test::ScenarioResult;

/// Mock backend process, killed on drop
struct MockBackend {
    child: Child,
    addr: String,
}

impl MockBackend {
    fn spawn(mode: &str) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_mock_backend"))
            .args(["--mode", mode])
            .stdout(Stdio::piped())
            .spawn()
            .expect("failed to spawn mock backend");

        let stdout = child.stdout.take().expect("no stdout");
        let mut line = String::new();
        BufReader::new(stdout)
            .read_line(&mut line)
            .expect("mock backend produced no output");
        let addr = checkout_test::common::parse_listen_address(&line)
            .expect("mock backend did not announce its address");

        Self { child, addr }
    }

    fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn config_toml(backend: &MockBackend) -> String {
    format!(
        r#"
[api]
base_url = "{base}"

[webdriver]
url = "{base}"

[timeouts]
explicit_wait_secs = 2
request_timeout_secs = 5
result_wait_secs = 2
step_timeout_secs = 10
"#,
        base = backend.base_url()
    )
}

fn test_env(key: &str) -> Option<String> {
    match key {
        "SC_CLIENT_ID" => Some("test-client".to_string()),
        "SC_CLIENT_SECRET" => Some("test-secret".to_string()),
        "SC_GCR" => Some("GCR_TEST_1".to_string()),
        _ => None,
    }
}

fn load_config(backend: &MockBackend) -> TestConfig {
    TestConfig::from_parts(Some(&config_toml(backend)), test_env).expect("config should resolve")
}

async fn run_scenario(config: TestConfig) -> ScenarioResult {
    let api = ApiClient::new(&config).expect("api client");
    let driver = WebDriverClient::new(&config.webdriver, config.timeouts.request_timeout())
        .expect("webdriver client");
    CheckoutRunner::new(config, api, driver).run().await
}

#[tokio::test]
async fn full_scenario_passes_against_mock_backend() {
    let backend = MockBackend::spawn("happy");
    let result = run_scenario(load_config(&backend)).await;

    assert_eq!(result.status, ScenarioStatus::Passed, "{}", result.message);
    assert_eq!(result.step_reached, Step::VerifyTransaction);
    assert!(result.message.contains("STX_MOCK_1"));
}

#[tokio::test]
async fn wrong_checkout_path_fails_at_navigation() {
    let backend = MockBackend::spawn("wrong-path");
    let result = run_scenario(load_config(&backend)).await;

    assert_eq!(result.status, ScenarioStatus::Failed);
    assert_eq!(result.step_reached, Step::NavigateToCheckout);
    assert!(result.message.contains("/checkout"), "{}", result.message);
}

#[tokio::test]
async fn declined_payment_fails_at_outcome() {
    let backend = MockBackend::spawn("declined");
    let result = run_scenario(load_config(&backend)).await;

    assert_eq!(result.status, ScenarioStatus::Failed);
    assert_eq!(result.step_reached, Step::AwaitOutcome);
}

#[tokio::test]
async fn unreachable_webdriver_is_errored() {
    let backend = MockBackend::spawn("happy");
    let mut config = load_config(&backend);
    config.webdriver.url = unused_endpoint();

    let result = run_scenario(config).await;

    assert_eq!(result.status, ScenarioStatus::Errored);
    assert_eq!(result.step_reached, Step::LaunchBrowser);
}

/// Bind and immediately release a port so nothing is listening on it
fn unused_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

// === Binary exit codes ===

fn run_binary(backend: &MockBackend, with_credentials: bool, args: &[&str]) -> Output {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, config_toml(backend)).expect("write config");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_checkout-test"));
    cmd.args(args).arg("--config").arg(&config_path);
    cmd.env_remove("SC_CLIENT_ID")
        .env_remove("SC_CLIENT_SECRET")
        .env_remove("SC_GCR");
    if with_credentials {
        cmd.env("SC_CLIENT_ID", "test-client")
            .env("SC_CLIENT_SECRET", "test-secret")
            .env("SC_GCR", "GCR_TEST_1");
    }
    cmd.output().expect("failed to run binary")
}

#[test]
fn binary_exits_zero_on_passed_scenario() {
    let backend = MockBackend::spawn("happy");
    let output = run_binary(&backend, true, &["run"]);

    assert_eq!(output.status.code(), Some(0), "{output:?}");
}

#[test]
fn binary_exits_one_on_failed_scenario() {
    let backend = MockBackend::spawn("declined");
    let output = run_binary(&backend, true, &["run"]);

    assert_eq!(output.status.code(), Some(1), "{output:?}");
}

#[test]
fn binary_exits_two_and_names_the_field_without_credentials() {
    let backend = MockBackend::spawn("happy");
    let output = run_binary(&backend, false, &["run"]);

    assert_eq!(output.status.code(), Some(2), "{output:?}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("client_id"), "stderr: {stderr}");
}

#[test]
fn binary_json_output_carries_the_result() {
    let backend = MockBackend::spawn("happy");
    let output = run_binary(&backend, true, &["run", "--json"]);

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"status\": \"passed\""), "stdout: {stdout}");
    assert!(stdout.contains("\"step_reached\": \"verify-transaction\""));
}

#[test]
fn config_command_redacts_secrets() {
    let backend = MockBackend::spawn("happy");
    let output = run_binary(&backend, true, &["config"]);

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("test****"), "stdout: {stdout}");
    assert!(!stdout.contains("test-secret"), "stdout: {stdout}");
}
