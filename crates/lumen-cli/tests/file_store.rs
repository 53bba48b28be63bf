//! CLI integration tests against a file-backed store.

mod common;

use serde_json::json;

use common::{TestEnv, assert_success, json_lines};

/// A store with an `outages` table holding four records.
fn seeded() -> TestEnv {
    let env = TestEnv::new();
    env.run_success(&["create-table", "outages"]);

    let rows = [
        json!({"id": "OUT-01", "street": "Harbour Rd", "status": "open", "ward": 2}),
        json!({"id": "OUT-02", "street": "Mill Lane", "status": "fixed", "ward": 3}),
        json!({"id": "OUT-03", "street": "Quarry St", "status": "open", "ward": 4}),
        json!({"id": "OUT-04", "street": "Elm Walk", "status": "open", "ward": 2}),
    ];
    for (i, row) in rows.iter().enumerate() {
        let path = env.fixture(&format!("seed-{}.json", i), row);
        env.run_success(&["insert", "outages", "--json", &path]);
    }
    env
}

#[test]
fn test_list_returns_every_record() {
    let env = seeded();
    let rows = json_lines(&env.run_success(&["list", "outages"]));

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["id"], "OUT-01");
}

#[test]
fn test_list_filters_are_conjunctive() {
    let env = seeded();
    let rows = json_lines(&env.run_success(&[
        "list", "outages", "--filter", "status=open", "--filter", "ward=2",
    ]));

    let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["OUT-01", "OUT-04"]);
}

#[test]
fn test_list_order_and_range() {
    let env = seeded();
    let rows = json_lines(&env.run_success(&[
        "list", "outages", "--order", "street:desc", "--range", "1..2",
    ]));

    let streets: Vec<&str> = rows
        .iter()
        .map(|r| r["street"].as_str().unwrap())
        .collect();
    assert_eq!(streets, vec!["Mill Lane", "Harbour Rd"]);
}

#[test]
fn test_list_empty_result_succeeds() {
    let env = seeded();
    let output = env.run(&["list", "outages", "--filter", "status=scheduled"]);

    assert_success(&[], &output);
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No records found"));
}

#[test]
fn test_list_missing_table_fails() {
    let env = TestEnv::new();
    let output = env.run(&["list", "outages"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to list records"), "stderr: {}", stderr);
}

#[test]
fn test_get_by_id() {
    let env = seeded();
    let rows = json_lines(&env.run_success(&["get", "outages", "OUT-03"]));

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["street"], "Quarry St");
}

#[test]
fn test_get_missing_record_is_not_an_error() {
    let env = seeded();
    let output = env.run(&["get", "outages", "OUT-99"]);

    assert_success(&[], &output);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_get_by_custom_column() {
    let env = seeded();
    let rows = json_lines(&env.run_success(&[
        "get", "outages", "Elm Walk", "--id-column", "street",
    ]));

    assert_eq!(rows[0]["id"], "OUT-04");
}

#[test]
fn test_insert_from_stdin_generates_id() {
    let env = seeded();
    let output = env.run_with_stdin(
        &["insert", "outages", "--json", "-"],
        r#"{"street": "Canal Row", "status": "open", "ward": 5}"#,
    );
    assert_success(&["insert"], &output);

    let written = json_lines(&String::from_utf8_lossy(&output.stdout));
    let id = written[0]["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let fetched = json_lines(&env.run_success(&["get", "outages", &id]));
    assert_eq!(fetched[0]["street"], "Canal Row");
}

#[test]
fn test_insert_rejects_non_object() {
    let env = seeded();
    let output = env.run_with_stdin(&["insert", "outages", "--json", "-"], "[1, 2, 3]");

    assert!(!output.status.success());
}

#[test]
fn test_insert_duplicate_id_fails() {
    let env = seeded();
    let path = env.fixture("dup.json", &json!({"id": "OUT-01", "street": "Elsewhere"}));
    let output = env.run(&["insert", "outages", "--json", &path]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("23505"));
}

#[test]
fn test_update_changes_only_given_fields() {
    let env = seeded();
    let patch = env.fixture("patch.json", &json!({"status": "fixed"}));
    env.run_success(&["update", "outages", "OUT-01", "--json", &patch]);

    let fetched = json_lines(&env.run_success(&["get", "outages", "OUT-01"]));
    assert_eq!(fetched[0]["status"], "fixed");
    assert_eq!(fetched[0]["street"], "Harbour Rd");
}

#[test]
fn test_update_missing_record_succeeds_quietly() {
    let env = seeded();
    let patch = env.fixture("patch.json", &json!({"status": "fixed"}));
    let output = env.run(&["update", "outages", "OUT-99", "--json", &patch]);

    assert_success(&[], &output);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_delete_then_get() {
    let env = seeded();
    env.run_success(&["delete", "outages", "OUT-02"]);

    let output = env.run(&["get", "outages", "OUT-02"]);
    assert_success(&[], &output);
    assert!(output.stdout.is_empty());

    let rows = json_lines(&env.run_success(&["list", "outages"]));
    assert_eq!(rows.len(), 3);
}

#[test]
fn test_delete_from_missing_table_fails() {
    let env = TestEnv::new();
    let output = env.run(&["delete", "outages", "OUT-01"]);

    assert!(!output.status.success());
}

#[test]
fn test_invalid_table_name_rejected() {
    let env = TestEnv::new();
    let output = env.run(&["list", "outages;drop"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid table name"));
}
