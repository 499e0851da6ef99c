/// End-to-end tests for the CLI
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        cargo_bin_cmd!("threatflow").arg("--help").assert().code(0);
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        cargo_bin_cmd!("threatflow")
            .arg("--version")
            .assert()
            .code(0);
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_option() {
        cargo_bin_cmd!("threatflow")
            .arg("--invalid-option")
            .assert()
            .code(2);
    }

    /// Exit code 2: Unknown subcommand
    #[test]
    fn test_exit_code_unknown_subcommand() {
        cargo_bin_cmd!("threatflow")
            .arg("frobnicate")
            .assert()
            .code(2);
    }

    /// Exit code 2: Missing required component ids
    #[test]
    fn test_exit_code_delete_components_without_ids() {
        cargo_bin_cmd!("threatflow")
            .args(["delete-components", "d-1"])
            .assert()
            .code(2);
    }

    /// Exit code 2: Invalid threat type value
    #[test]
    fn test_exit_code_invalid_threat_type() {
        cargo_bin_cmd!("threatflow")
            .args(["show", "d-1", "--threat-type", "phishing"])
            .assert()
            .code(2);
    }

    /// Exit code 2: Invalid disposition value
    #[test]
    fn test_exit_code_invalid_action() {
        cargo_bin_cmd!("threatflow")
            .args([
                "act", "d-1", "--component", "c-1", "--threat", "t-1", "--action", "shrug",
            ])
            .assert()
            .code(2);
    }
}

/// No config file and no --api-endpoint: the command fails before any
/// network traffic with a pointer at the configuration.
#[test]
fn test_missing_api_endpoint_is_a_config_error() {
    let temp_dir = TempDir::new().unwrap();

    cargo_bin_cmd!("threatflow")
        .current_dir(temp_dir.path())
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no API endpoint configured"));
}

/// Commands that move files also need the storage endpoint.
#[test]
fn test_create_without_storage_endpoint_fails() {
    let temp_dir = TempDir::new().unwrap();

    cargo_bin_cmd!("threatflow")
        .current_dir(temp_dir.path())
        .args([
            "--api-endpoint",
            "https://api.example.com/graphql",
            "create",
            "diagram.png",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no storage endpoint configured"));
}

/// An explicitly passed config path must exist.
#[test]
fn test_explicit_config_path_must_exist() {
    let temp_dir = TempDir::new().unwrap();

    cargo_bin_cmd!("threatflow")
        .current_dir(temp_dir.path())
        .args(["--config", "missing.yml", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("threatflow.config.yml").or(
            predicate::str::contains("missing.yml"),
        ));
}

/// Config values are validated before any command runs.
#[test]
fn test_invalid_endpoint_scheme_in_config_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("threatflow.config.yml"),
        "api_endpoint: ftp://api.example.com/graphql\n",
    )
    .unwrap();

    cargo_bin_cmd!("threatflow")
        .current_dir(temp_dir.path())
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("api_endpoint"));
}

/// A discovered config file supplies the endpoint; the failure then
/// happens at the network layer, not in configuration.
#[test]
fn test_discovered_config_supplies_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    // Port 9 (discard) is never running a GraphQL service locally.
    fs::write(
        temp_dir.path().join("threatflow.config.yml"),
        "api_endpoint: http://127.0.0.1:9/graphql\n",
    )
    .unwrap();

    cargo_bin_cmd!("threatflow")
        .current_dir(temp_dir.path())
        .arg("list")
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("no API endpoint configured").not(),
        );
}
