use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskpad-{nanos}-{file_name}"))
}

fn run_with_config(config_path: &Path, args: &[&str], input: &str) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_taskpad");

    let mut child = Command::new(exe)
        .args(args)
        .env("TASKPAD_CONFIG_PATH", config_path)
        .env_remove("TASKPAD_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn session");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    child
        .wait_with_output()
        .expect("failed to read session output")
}

#[test]
fn config_file_aliases_and_ids_are_used() {
    let config_path = temp_path("config.json");
    let content = serde_json::json!({
        "ids": "sequential",
        "aliases": { "ls": "list", "a": "add" }
    });
    std::fs::write(&config_path, serde_json::to_string(&content).unwrap()).unwrap();

    let output = run_with_config(&config_path, &[], "a Walk dog\nls\n");
    std::fs::remove_file(&config_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Walk dog (task-1)"));
    assert!(stdout.contains("Walk dog"));
}

#[test]
fn ignore_policy_keeps_empty_edit_open() {
    let config_path = temp_path("config-policy.json");
    std::fs::write(&config_path, r#"{ "edit_policy": "ignore" }"#).unwrap();

    let output = run_with_config(
        &config_path,
        &["--json"],
        "add keep me\nedit 1\ntype\nsubmit\nstatus\n",
    );
    std::fs::remove_file(&config_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let status: serde_json::Value =
        serde_json::from_str(stdout.lines().last().expect("status output")).unwrap();
    assert_eq!(status["mode"], "editing");
}

#[test]
fn override_wins_over_config_file() {
    let config_path = temp_path("config-override.json");
    std::fs::write(&config_path, r#"{ "edit_policy": "ignore" }"#).unwrap();

    let output = run_with_config(
        &config_path,
        &["--json", "--config-override", "edit_policy=accept"],
        "add keep me\nedit 1\ntype\nsubmit\nstatus\n",
    );
    std::fs::remove_file(&config_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let status: serde_json::Value =
        serde_json::from_str(stdout.lines().last().expect("status output")).unwrap();
    assert_eq!(status["mode"], "creating");
}

#[test]
fn invalid_config_falls_back_with_warning() {
    let config_path = temp_path("config-invalid.json");
    std::fs::write(&config_path, "{ invalid json ").unwrap();

    let output = run_with_config(&config_path, &[], "add still works\n");
    std::fs::remove_file(&config_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Added task: still works"));
    assert!(stderr.contains("using default configuration"));
}
