//! Connection handling: saved settings, environment and flags.

mod common;

use common::{TestEnv, assert_success, file_store_url};

#[test]
fn test_status_without_connection() {
    let env = TestEnv::new();
    let output = env.run_bare(&["status"]);

    assert_success(&["status"], &output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not connected"));
}

#[test]
fn test_record_command_without_connection_fails() {
    let env = TestEnv::new();
    let output = env.run_bare(&["list", "outages"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No store configured"));
}

#[test]
fn test_connect_persists_store() {
    let env = TestEnv::new();
    env.run_success(&["connect"]);
    assert!(env.store_path().is_dir());

    // No --store from here on.
    let output = env.run_bare(&["create-table", "outages"]);
    assert_success(&["create-table"], &output);

    let output = env.run_bare(&["status"]);
    assert_success(&["status"], &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&env.store_url), "stdout: {}", stdout);
    assert!(stdout.contains("saved connection"));
    assert!(stdout.contains("outages"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_connection_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let env = TestEnv::new();
    env.run_success(&["connect"]);

    let path = env.home().join("data").join("lumen").join("connection.json");
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_disconnect_forgets_store() {
    let env = TestEnv::new();
    env.run_success(&["connect"]);

    let output = env.run_bare(&["disconnect"]);
    assert_success(&["disconnect"], &output);

    let output = env.run_bare(&["status"]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not connected"));
}

#[test]
fn test_environment_overrides_saved_connection() {
    let env = TestEnv::new();
    env.run_success(&["connect"]);

    let other = env.home().join("other-store");
    let other_url = file_store_url(&other);
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_lumen"))
        .arg("status")
        .env("HOME", env.home())
        .env("XDG_DATA_HOME", env.home().join("data"))
        .env("LUMEN_STORE_URL", &other_url)
        .env_remove("LUMEN_API_KEY")
        .output()
        .unwrap();

    assert_success(&["status"], &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&other_url), "stdout: {}", stdout);
    assert!(stdout.contains("LUMEN_STORE_URL"));
}

#[test]
fn test_hosted_store_needs_api_key() {
    let env = TestEnv::new();
    let output = env.run_bare(&["list", "outages", "--store", "https://lights.example.org"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("API key"));
}

#[test]
fn test_create_table_refused_for_hosted_store() {
    let env = TestEnv::new();
    let output = env.run_bare(&[
        "create-table",
        "outages",
        "--store",
        "https://lights.example.org",
        "--api-key",
        "anon-key",
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("file://"));
}
