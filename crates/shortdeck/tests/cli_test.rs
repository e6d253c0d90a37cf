//! Integration tests for the `shortdeck` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a server; the end-to-end cases point the binary at wiremock.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `shortdeck` binary with env isolation.
///
/// Clears all `SHORTDECK_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn shortdeck_cmd_in(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("shortdeck");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("SHORTDECK_SERVER")
        .env_remove("SHORTDECK_URL")
        .env_remove("SHORTDECK_API_KEY")
        .env_remove("SHORTDECK_OUTPUT")
        .env_remove("SHORTDECK_INSECURE")
        .env_remove("SHORTDECK_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn shortdeck_cmd() -> assert_cmd::Command {
    shortdeck_cmd_in(Path::new("/tmp/shortdeck-cli-test-nonexistent"))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run `cmd` off the async runtime so wiremock keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = shortdeck_cmd();
    cmd.args(["--url", &server.uri(), "--api-key", "secret-key"]);
    cmd
}

fn short_url_json(short_code: &str, visits: u64) -> serde_json::Value {
    json!({
        "shortCode": short_code,
        "shortUrl": format!("https://s.test/{short_code}"),
        "longUrl": format!("https://example.com/{short_code}"),
        "dateCreated": "2024-06-15T10:30:00+02:00",
        "visitsSummary": { "total": visits, "nonBots": visits, "bots": 0 },
        "tags": [],
        "meta": { "validSince": null, "validUntil": null, "maxVisits": null },
        "domain": null,
        "title": null,
        "crawlable": false,
        "forwardQuery": true
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = shortdeck_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    shortdeck_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Shlink")
            .and(predicate::str::contains("short-urls"))
            .and(predicate::str::contains("domains"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    shortdeck_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shortdeck"));
}

#[test]
fn test_subcommand_alias() {
    shortdeck_cmd()
        .args(["urls", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create").and(predicate::str::contains("delete")));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    shortdeck_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    shortdeck_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shortdeck"));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_missing_config_is_a_usage_error() {
    let output = shortdeck_cmd()
        .args(["short-urls", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("No server configured"));
}

#[test]
fn test_url_without_api_key_is_an_auth_error() {
    let output = shortdeck_cmd()
        .args(["--url", "https://s.test", "domains", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("No API key"));
}

#[test]
fn test_unknown_server_profile() {
    let output = shortdeck_cmd()
        .args(["--server", "nope", "domains", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("'nope' not found"));
}

#[test]
fn test_invalid_url_flag() {
    let output = shortdeck_cmd()
        .args(["--url", "not a url", "--api-key", "k", "domains", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("invalid URL"));
}

#[test]
fn test_edit_without_changes_is_rejected() {
    let output = shortdeck_cmd()
        .args([
            "--url",
            "https://s.test",
            "--api-key",
            "k",
            "short-urls",
            "edit",
            "abc123",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("nothing to change"));
}

#[test]
fn test_delete_requires_yes_when_not_interactive() {
    let output = shortdeck_cmd()
        .args([
            "--url",
            "https://s.test",
            "--api-key",
            "k",
            "short-urls",
            "delete",
            "abc123",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("requires confirmation"));
}

#[test]
fn test_unreachable_server_is_a_connection_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let output = shortdeck_cmd()
        .args([
            "--url",
            &format!("http://127.0.0.1:{port}"),
            "--api-key",
            "k",
            "--timeout",
            "5",
            "short-urls",
            "list",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_init_then_servers_and_show() {
    let home = tempfile::tempdir().unwrap();

    shortdeck_cmd_in(home.path())
        .args([
            "--url",
            "https://s.test",
            "--api-key",
            "secret-key",
            "--yes",
            "config",
            "init",
            "--name",
            "home",
        ])
        .assert()
        .success();

    shortdeck_cmd_in(home.path())
        .args(["config", "servers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("home *").and(predicate::str::contains("https://s.test")));

    shortdeck_cmd_in(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[servers.home]")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("secret-key").not()),
        );
}

#[test]
fn test_config_use_unknown_server() {
    let home = tempfile::tempdir().unwrap();
    let output = shortdeck_cmd_in(home.path())
        .args(["config", "use", "missing"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("(none)"));
}

// ── Against a mocked server ─────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_short_urls_list_plain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v3/short-urls"))
        .and(header("X-Api-Key", "secret-key"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "shortUrls": {
                "data": [short_url_json("abc123", 3), short_url_json("def456", 0)],
                "pagination": {
                    "currentPage": 1,
                    "pagesCount": 1,
                    "itemsPerPage": 10,
                    "itemsInCurrentPage": 2,
                    "totalItems": 2
                }
            }
        })))
        .mount(&server)
        .await;

    let mut cmd = against(&server);
    cmd.args(["-o", "plain", "short-urls", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        "https://s.test/abc123\nhttps://s.test/def456"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_domains_list_applies_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v3/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domains": {
                "data": [
                    { "domain": "s.test", "isDefault": true, "redirects": null },
                    { "domain": "Blog.Example.com", "isDefault": false, "redirects": null },
                    { "domain": "shop.test", "isDefault": false, "redirects": null }
                ],
                "defaultRedirects": null
            }
        })))
        .mount(&server)
        .await;

    let mut cmd = against(&server);
    cmd.args(["-o", "plain", "domains", "list", "--filter", "example"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Blog.Example.com"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_delete_not_found_maps_problem_details() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v3/short-urls/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "type": "https://shlink.io/api/error/short-url-not-found",
            "title": "Short URL not found",
            "detail": "No URL found with short code \"nope\"",
            "status": 404,
            "shortCode": "nope"
        })))
        .mount(&server)
        .await;

    let mut cmd = against(&server);
    cmd.args(["--yes", "short-urls", "delete", "nope"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("No URL found with short code"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_defaults_table_sets_output_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v3/domains"))
        .and(header("X-Api-Key", "profile-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domains": {
                "data": [{ "domain": "s.test", "isDefault": true, "redirects": null }],
                "defaultRedirects": null
            }
        })))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("shortdeck");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            "default_server = \"home\"\n\n\
             [defaults]\noutput = \"plain\"\ntimeout = 30\n\n\
             [servers.home]\nurl = \"{}\"\napi_key = \"profile-key\"\ntimeout = 60\n",
            server.uri()
        ),
    )
    .unwrap();

    let mut cmd = shortdeck_cmd_in(home.path());
    cmd.args(["--timeout", "5", "domains", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "s.test");
}
