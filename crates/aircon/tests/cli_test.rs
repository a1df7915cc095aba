#![allow(clippy::unwrap_used)]
// End-to-end tests for the `aircon` binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn aircon() -> Command {
    let mut cmd = cargo_bin_cmd!("aircon");
    cmd.env_clear();
    cmd
}

fn with_credentials(cmd: &mut Command, api_link: &str) {
    cmd.env("API_KEY", "cli-key")
        .env("PAT", "cli-pat")
        .env("DEVICE_ID", "dev-cli")
        .env("COUNTRY", "US")
        .env("API_LINK", api_link);
}

#[test]
fn test_missing_config_exits_with_usage_code() {
    aircon()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("API_KEY is not set"));
}

#[test]
fn test_missing_single_var_is_named() {
    let mut cmd = aircon();
    with_credentials(&mut cmd, "https://api.example.com");
    cmd.env_remove("COUNTRY");

    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("COUNTRY is not set"));
}

#[test]
fn test_invalid_api_link() {
    let mut cmd = aircon();
    with_credentials(&mut cmd, "not a url");

    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("API_LINK"));
}

#[test]
fn test_unreachable_api_exits_with_connection_code() {
    let mut cmd = aircon();
    with_credentials(&mut cmd, "http://127.0.0.1:1");

    cmd.assert().failure().code(7);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_turns_device_on_and_prints_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/devices/dev-cli/control"))
        .and(header("authorization", "Bearer cli-pat"))
        .and(header("x-api-key", "cli-key"))
        .and(body_json(json!({"operation": {"airConOperationMode": "POWER_ON"}})))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"response":{}}"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = aircon();
    with_credentials(&mut cmd, &server.uri());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("STATUS CODE: 200"))
        .stdout(predicate::str::contains(r#"RAW RESPONSE: {"response":{}}"#));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_request_still_exits_cleanly() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let mut cmd = aircon();
    with_credentials(&mut cmd, &server.uri());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("STATUS CODE: 403"))
        .stdout(predicate::str::contains("RAW RESPONSE: forbidden"));
}
