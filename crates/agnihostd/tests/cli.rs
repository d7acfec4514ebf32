use assert_cmd::Command;

#[test]
fn help_prints_usage_and_exits_zero() {
    let mut cmd = Command::cargo_bin("agnihostd").unwrap();
    cmd.arg("--help").assert().success();
}

#[test]
fn missing_core_config_fails_cleanly_with_a_nonzero_exit() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("agnihostd").unwrap();
    cmd.args(["--main_path", dir.path().to_str().unwrap(), "--cpu_count", "1"]);
    cmd.assert().failure();
}
