use std::path::Path;
use std::process::{Command, Output};

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_todo"))
        .args(args)
        .env("TODOAPP_STORE_DIR", dir)
        .env("TODOAPP_CONFIG_PATH", dir.join("config.json"))
        .env("TZ", "UTC")
        .output()
        .expect("failed to run todo")
}

fn write_store(dir: &Path, tasks: serde_json::Value) {
    std::fs::write(dir.join("todos_v1.json"), tasks.to_string()).unwrap();
}

fn sample(dir: &Path) {
    write_store(
        dir,
        serde_json::json!([
            { "id": "done001", "text": "Read a book", "due": null, "done": true },
            { "id": "late001", "text": "Pay bill", "due": "2025-03-01T00:00:00Z", "done": false },
            { "id": "soon001", "text": "Buy milk", "due": "2025-01-01T00:00:00Z", "done": false }
        ]),
    );
}

fn listed_ids(output: &Output) -> Vec<String> {
    let value: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    value["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn list_orders_pending_by_due_then_completed() {
    let dir = tempfile::tempdir().unwrap();
    sample(dir.path());

    let output = run(dir.path(), &["list", "--json"]);

    assert!(output.status.success());
    assert_eq!(listed_ids(&output), vec!["soon001", "late001", "done001"]);
}

#[test]
fn list_filters_pending_and_completed() {
    let dir = tempfile::tempdir().unwrap();
    sample(dir.path());

    let pending = run(dir.path(), &["list", "--filter", "pending", "--json"]);
    assert_eq!(listed_ids(&pending), vec!["soon001", "late001"]);

    let completed = run(dir.path(), &["list", "--filter", "completed", "--json"]);
    assert_eq!(listed_ids(&completed), vec!["done001"]);
}

#[test]
fn list_table_shows_labels() {
    let dir = tempfile::tempdir().unwrap();
    sample(dir.path());

    let output = run(dir.path(), &["list", "--filter", "completed"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FILTER ▾ (Completed)"));
    assert!(stdout.contains("Read a book"));
    assert!(stdout.contains("Mark as pending"));
    assert!(!stdout.contains("Buy milk"));
}

#[test]
fn list_empty_store_shows_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No task found"));
}

#[test]
fn list_recovers_from_malformed_store() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("todos_v1.json"), "{ not valid").unwrap();

    let output = run(dir.path(), &["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No task found"));
}

#[test]
fn list_rejects_unknown_filter() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["list", "--filter", "someday"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}
