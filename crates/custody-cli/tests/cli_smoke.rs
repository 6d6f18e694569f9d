use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RICH_ANSWER: &str = r#"# Rotation plan

1. Move the api keys behind the database security boundary.
2. Add authentication and encryption for every deployment.
- A novel, innovative design for key scalability.

```python
def rotate_keys(store):
    return store.rotate()
```
"#;

fn custody(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("custody").unwrap();
    cmd.current_dir(dir).env("CUSTODY_LOG", "warn");
    cmd
}

fn json_stdout(cmd: &mut Command) -> (i32, serde_json::Value) {
    let out = cmd.output().unwrap();
    let code = out.status.code().unwrap_or(-1);
    let value = serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}): {}\nstderr: {}",
            e,
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        )
    });
    (code, value)
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    custody(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(contains("custody "));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    custody(dir.path()).arg("init").assert().success();
    assert!(dir.path().join("custody.yaml").exists());

    custody(dir.path())
        .arg("init")
        .assert()
        .code(2)
        .stderr(contains("already exists"));

    custody(dir.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn test_template_answer_fails_custody_test() {
    let dir = TempDir::new().unwrap();
    let (code, result) = json_stdout(custody(dir.path()).args([
        "administer",
        "sandbox",
        "--format",
        "json",
    ]));

    assert_eq!(code, 1);
    assert_eq!(result["ai_type"], "sandbox");
    assert_eq!(result["passed"], false);
    assert_eq!(result["difficulty"], "basic");
    assert_eq!(result["test_category"], "knowledge_verification");
    // 15 (length) + 20 (bullets) at basic
    assert_eq!(result["score"].as_f64().unwrap(), 35.0);
    assert!(dir.path().join(".custody/custody.db").exists());
}

#[test]
fn test_file_answer_passes_and_shows_in_status() {
    let dir = TempDir::new().unwrap();
    let answer = dir.path().join("answer.md");
    fs::write(&answer, RICH_ANSWER).unwrap();

    custody(dir.path())
        .args(["administer", "guardian", "--category", "security_awareness"])
        .args(["--responder", "file", "--response-file"])
        .arg(&answer)
        .assert()
        .success()
        .stderr(contains("1 passed"));

    let (code, status) = json_stdout(custody(dir.path()).args([
        "status", "guardian", "--format", "json",
    ]));
    assert_eq!(code, 0);
    assert_eq!(status["total_tests_given"], 1);
    assert_eq!(status["total_tests_passed"], 1);
    assert_eq!(status["consecutive_successes"], 1);
    assert_eq!(status["can_level_up"], true);

    let (_, analytics) = json_stdout(custody(dir.path()).args(["analytics", "--format", "json"]));
    assert_eq!(analytics["total_tests"], 1);
    assert_eq!(analytics["total_agents"], 1);
    assert_eq!(analytics["recent_tests"].as_array().unwrap().len(), 1);

    let (_, unknown) = json_stdout(custody(dir.path()).args([
        "analytics", "--agent", "nobody", "--format", "json",
    ]));
    assert_eq!(unknown["total_tests"], 0);
    assert_eq!(unknown["average_score"], 0.0);
}

#[test]
fn test_reset_zeroes_counters() {
    let dir = TempDir::new().unwrap();
    custody(dir.path())
        .args(["administer", "conquest"])
        .assert()
        .code(1);

    custody(dir.path())
        .args(["reset", "conquest"])
        .assert()
        .success()
        .stderr(contains("reset custody metrics for conquest"));

    let (_, status) = json_stdout(custody(dir.path()).args([
        "status", "conquest", "--format", "json",
    ]));
    assert_eq!(status["total_tests_given"], 0);
    assert_eq!(status["custody_level"], 1);
}

#[test]
fn test_caller_mistakes_exit_with_config_error() {
    let dir = TempDir::new().unwrap();

    custody(dir.path())
        .args(["administer", "rogue"])
        .assert()
        .code(2)
        .stderr(contains("invalid AI type: rogue"));

    custody(dir.path())
        .args(["administer", "imperium", "--category", "cooking"])
        .assert()
        .code(2)
        .stderr(contains("unknown test category"));

    custody(dir.path())
        .args(["group", "--agents", "imperium,guardian", "--difficulty", "godlike"])
        .assert()
        .code(2)
        .stderr(contains("unknown difficulty"));

    custody(dir.path())
        .args(["administer", "imperium", "--responder", "file"])
        .assert()
        .code(2)
        .stderr(contains("--response-file"));
}

#[test]
fn test_strict_config_rejects_unknown_keys() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("custody.yaml"),
        "configVersion: 1\nsettings:\n  histroy_limit: 5\n",
    )
    .unwrap();

    custody(dir.path())
        .args(["status", "imperium", "--strict"])
        .assert()
        .code(2)
        .stderr(contains("histroy_limit"));

    custody(dir.path())
        .args(["status", "imperium"])
        .assert()
        .success();
}

#[test]
fn test_group_returns_one_result_per_participant() {
    let dir = TempDir::new().unwrap();
    let (code, results) = json_stdout(custody(dir.path()).args([
        "group",
        "--kind",
        "olympic",
        "--agents",
        "imperium,guardian,sandbox",
        "--format",
        "json",
    ]));

    assert_eq!(code, 1);
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 3);
    let agents: Vec<_> = results.iter().map(|r| r["ai_type"].as_str().unwrap()).collect();
    assert_eq!(agents, vec!["imperium", "guardian", "sandbox"]);
    assert!(results.iter().all(|r| r["kind"] == "olympic"));
}

#[test]
fn test_score_needs_context() {
    let dir = TempDir::new().unwrap();

    let (code, out) = json_stdout(custody(dir.path()).args([
        "score",
        "--text",
        RICH_ANSWER,
        "--format",
        "json",
    ]));
    assert_eq!(code, 1);
    assert_eq!(out["score"], 0.0);
    assert_eq!(out["details"]["reason"], "missing test context");

    let (code, out) = json_stdout(custody(dir.path()).args([
        "score",
        "--text",
        RICH_ANSWER,
        "--scenario",
        "Rotate leaked credentials",
        "--difficulty",
        "legendary",
        "--format",
        "json",
    ]));
    assert_eq!(code, 0);
    assert_eq!(out["score"], 100.0);
    assert_eq!(out["passed"], true);
}
