//! CLI interaction tests
//!
//! These run the compiled binary and check argument handling, startup
//! failures and exit codes.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;

const ENV_KEYS: &[&str] = &[
    "SPEEDTEST_BIND",
    "SPEEDTEST_API_PATH",
    "SPEEDTEST_DOWNLOAD_PATH",
    "SPEEDTEST_ENV_FILE",
    "SPEEDTEST_TIMEOUT",
    "SPEEDTEST_PING_COUNT",
    "SPEEDTEST_LOG_FORMAT",
    "SPEEDTEST_LOG_LEVEL",
    "RUST_LOG",
];

/// Command running inside an empty directory so no stray .env is picked up
fn create_test_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("speedtest-api").unwrap();
    cmd.current_dir(dir.path());
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn test_help_lists_options() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--bind"))
        .stdout(predicate::str::contains("--verify-tls"))
        .stdout(predicate::str::contains("--log-format"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_log_format_rejected_by_parser() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--log-format", "xml"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn test_invalid_bind_address_is_config_error() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--bind", "not-an-address"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("not-an-address"));
}

#[test]
fn test_missing_env_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--env-file", "missing.env"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing.env"));
}

#[test]
fn test_invalid_value_in_env_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env"), "SPEEDTEST_TIMEOUT=soon\n").unwrap();

    create_test_cmd(&dir)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("SPEEDTEST_TIMEOUT"));
}

#[test]
fn test_api_path_without_slash_rejected() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--api-path", "speedtest"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_wildcard_helper_path_is_config_error() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .env("SPEEDTEST_DOWNLOAD_PATH", "*dl")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("download_path"));
}

#[test]
fn test_env_file_location_from_environment() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("custom.env"), "SPEEDTEST_BIND=nowhere\n").unwrap();

    create_test_cmd(&dir)
        .env("SPEEDTEST_ENV_FILE", "custom.env")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nowhere"));
}

#[test]
fn test_write_env_example() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--write-env-example", "example.env"])
        .assert()
        .success()
        .stdout(predicate::str::contains("example.env"));

    let written = fs::read_to_string(dir.path().join("example.env")).unwrap();
    assert!(written.contains("SPEEDTEST_VERIFY_TLS"));
    assert!(written.contains("SPEEDTEST_BIND"));
}

#[tokio::test]
async fn test_server_answers_on_configured_path() {
    let dir = TempDir::new().unwrap();
    let port = free_port();
    let bind = format!("127.0.0.1:{}", port);

    let mut child = create_test_cmd(&dir)
        .args(["--bind", &bind, "--api-path", "/st", "--log-level", "warn"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let url = format!("http://{}/st?mode=none", bind);
    let mut body = None;
    for _ in 0..50 {
        if let Ok(response) = reqwest::get(&url).await {
            body = Some(response.json::<serde_json::Value>().await.unwrap());
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    child.kill().unwrap();
    let _ = child.wait();

    let body = body.expect("server never came up");
    assert_eq!(body["servers"][0]["name"], "Local Server");
    assert_eq!(body["servers"][0]["url"], format!("http://{}/", bind));
}
