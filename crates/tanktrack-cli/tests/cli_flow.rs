use std::path::PathBuf;
use std::process::{Command, Output};

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tanktrack"))
}

fn run(data_dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(bin())
        .env("TANKTRACK_DATA", data_dir)
        .env_remove("TANKTRACK_ENGINE_URL")
        .args(args)
        .output()
        .expect("binary should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_first_run_lists_default_project() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(dir.path(), &["project", "list"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("default"));
    assert!(text.contains("Default Project"));
}

#[test]
fn test_assets_list_shows_seed_assets() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(dir.path(), &["assets", "list"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    for id in ["C-001", "S-001", "S-002", "C-002", "S-003"] {
        assert!(text.contains(id), "missing {id} in:\n{text}");
    }
}

#[test]
fn test_assets_list_json_is_parseable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(dir.path(), &["assets", "list", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let assets: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("valid JSON output");
    assert_eq!(assets.as_array().map(Vec::len), Some(5));
    assert_eq!(assets[0]["assetId"], "C-001");
}

#[test]
fn test_save_switch_delete_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");

    let saved = run(dir.path(), &["--quiet", "project", "save-as", "Survey 2026"]);
    assert!(saved.status.success(), "stderr: {}", stderr(&saved));
    let project_id = stdout(&saved).trim().to_string();
    assert!(project_id.starts_with("PROJ-"));

    // The new project is active across invocations.
    let listed = run(dir.path(), &["project", "list"]);
    assert!(stdout(&listed).contains("Survey 2026"));

    let switched = run(dir.path(), &["project", "switch", "default"]);
    assert!(switched.status.success(), "stderr: {}", stderr(&switched));

    let deleted = run(dir.path(), &["project", "delete", &project_id]);
    assert!(deleted.status.success(), "stderr: {}", stderr(&deleted));
    let listed = run(dir.path(), &["project", "list"]);
    assert!(!stdout(&listed).contains("Survey 2026"));
}

#[test]
fn test_default_project_cannot_be_deleted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(dir.path(), &["project", "delete", "default"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("protected"));
}

#[test]
fn test_project_update_on_default_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(dir.path(), &["project", "update"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("protected"));
}

#[test]
fn test_rule_add_list_delete() {
    let dir = tempfile::tempdir().expect("tempdir");

    let added = run(
        dir.path(),
        &[
            "--quiet",
            "rules",
            "add",
            "--column",
            "overallCondition",
            "--operator",
            "lte",
            "--value",
            "2",
            "--recommend",
            "Schedule a full inspection",
        ],
    );
    assert!(added.status.success(), "stderr: {}", stderr(&added));
    let rule_id = stdout(&added).trim().to_string();
    assert!(rule_id.starts_with("RULE-"));

    let listed = run(dir.path(), &["rules", "list"]);
    let text = stdout(&listed);
    assert!(text.contains("Schedule a full inspection"));
    assert!(text.contains("Overall Condition"));

    let deleted = run(dir.path(), &["rules", "delete", &rule_id]);
    assert!(deleted.status.success(), "stderr: {}", stderr(&deleted));
    let listed = run(dir.path(), &["rules", "list"]);
    assert!(!stdout(&listed).contains("Schedule a full inspection"));
}

#[test]
fn test_rule_add_rejects_bad_operator_for_text_column() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(
        dir.path(),
        &[
            "rules", "add", "--column", "fieldNotes", "--operator", "gt", "--value", "roots",
            "--recommend", "Investigate",
        ],
    );
    assert!(!output.status.success());
}

#[test]
fn test_config_set_engine_url_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let set = run(
        dir.path(),
        &["config", "set-engine-url", "https://engine.example.com"],
    );
    assert!(set.status.success(), "stderr: {}", stderr(&set));

    let shown = run(dir.path(), &["config", "show"]);
    assert!(stdout(&shown).contains("https://engine.example.com"));
}

#[test]
fn test_recommend_without_engine_url_fails_with_hint() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(dir.path(), &["recommend"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("set-engine-url"));
}
