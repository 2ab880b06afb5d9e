#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the loyalty-server binary

use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn run_loyalty_server(args: &[&str], env: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_loyalty-server"))
        .args(args)
        .envs(env.iter().copied())
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute loyalty-server")
}

fn write_config(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write config file");
    path.to_str().unwrap().to_owned()
}

fn printed_config(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "print-config failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_saphyr::from_str(&String::from_utf8_lossy(&output.stdout))
        .expect("print-config output should be YAML")
}

#[test]
fn test_cli_help_lists_subcommands() {
    let output = run_loyalty_server(&["--help"], &[]);

    assert!(output.status.success(), "Help command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    for expected in ["run", "check", "migrate", "--config", "--mock"] {
        assert!(stdout.contains(expected), "help should mention {expected}");
    }
}

#[test]
fn test_cli_missing_config_file_fails() {
    let output = run_loyalty_server(&["--config", "/nonexistent/loyalty.yaml", "check"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"), "unexpected stderr: {stderr}");
}

#[test]
fn test_cli_invalid_yaml_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "broken.yaml", "server: [unclosed");

    let output = run_loyalty_server(&["--config", &path, "check"], &[]);

    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn test_cli_check_accepts_valid_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "loyalty.yaml",
        "server:\n  bind_addr: 0.0.0.0\n  port: 9200\nledger:\n  max_page_size: 50\n",
    );

    let output = run_loyalty_server(&["--config", &path, "check"], &[]);

    assert!(
        output.status.success(),
        "check failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration is valid"));
}

#[test]
fn test_cli_check_rejects_bad_bind_address() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "loyalty.yaml", "server:\n  bind_addr: not-an-ip\n");

    let output = run_loyalty_server(&["--config", &path, "check"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bind_addr"), "unexpected stderr: {stderr}");
}

#[test]
fn test_print_config_applies_layers_in_order() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "loyalty.yaml",
        "server:\n  port: 9300\nlogging:\n  level: warn\nledger:\n  default_customer_name: Guest\n",
    );

    let output = run_loyalty_server(
        &["--config", &path, "--print-config"],
        &[("LOYALTY__SERVER__PORT", "9400"), ("LOYALTY__LOGGING__JSON", "true")],
    );
    let config = printed_config(&output);
    assert_eq!(config["server"]["port"], 9400);
    assert_eq!(config["logging"]["json"], true);
    assert_eq!(config["logging"]["level"], "warn");
    assert_eq!(config["ledger"]["default_customer_name"], "Guest");

    let output = run_loyalty_server(
        &["--config", &path, "--port", "9500", "-vv", "--mock", "--print-config"],
        &[("LOYALTY__SERVER__PORT", "9400")],
    );
    let config = printed_config(&output);
    assert_eq!(config["server"]["port"], 9500);
    assert_eq!(config["logging"]["level"], "debug");
    assert_eq!(config["database"]["dsn"], "sqlite::memory:");
}

#[test]
fn test_migrate_against_in_memory_database() {
    let output = run_loyalty_server(&["--mock", "migrate"], &[]);

    assert!(
        output.status.success(),
        "migrate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
