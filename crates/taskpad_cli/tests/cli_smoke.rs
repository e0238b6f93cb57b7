use std::process::Command;

#[test]
fn cli_smoke_help() {
    let exe = env!("CARGO_BIN_EXE_taskpad");
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .expect("failed to run taskpad --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--json"));
}

#[test]
fn cli_rejects_malformed_override() {
    let exe = env!("CARGO_BIN_EXE_taskpad");
    let output = Command::new(exe)
        .args(["--config-override", "theme"])
        .output()
        .expect("failed to run taskpad");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}
