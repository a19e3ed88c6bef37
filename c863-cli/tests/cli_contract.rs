//! Integration tests for core CLI contract behavior.

use {predicates::prelude::*, std::fs, tempfile::tempdir};

fn cli_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("c863");
    cmd.env_remove("C863_BAUD")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("c863"))
        .stdout(predicate::str::contains("home"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn version_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("c863"))
        .stderr(predicate::str::is_empty());
}

// ============================================================================
// Usage on wrong argument count: exit 0, usage on stdout
// ============================================================================

#[test]
fn no_arguments_prints_usage_and_exits_zero() {
    let mut cmd = cli_cmd();
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Controller commands:"))
        .stdout(predicate::str::contains("move+"))
        .stdout(predicate::str::contains("sent directly to the motor controller"));
}

#[test]
fn missing_command_prints_usage_and_exits_zero() {
    let mut cmd = cli_cmd();
    cmd.arg("/dev/ttyS0")
        .assert()
        .success()
        .stdout(predicate::str::contains("Controller commands:"));
}

#[test]
fn extra_argument_prints_usage_and_exits_zero() {
    let mut cmd = cli_cmd();
    cmd.args(["/dev/ttyS0", "pos", "extra"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Controller commands:"));
}

#[test]
fn usage_explains_separator_for_hyphen_commands() {
    let mut cmd = cli_cmd();
    cmd.args(["/dev/ttyS0", "-5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c863 /dev/ttyS0 -- -5"));
}

// ============================================================================
// Exit code 1: device cannot be opened
// ============================================================================

#[test]
fn missing_device_exits_one() {
    let dir = tempdir().expect("tempdir should be created");
    let device = dir
        .path()
        .join("ttyNOPE");

    let mut cmd = cli_cmd();
    cmd.arg(device.as_os_str())
        .arg("pos")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Could not open"));
}

#[test]
fn regular_file_device_exits_one() {
    let dir = tempdir().expect("tempdir should be created");
    let device = dir
        .path()
        .join("not-a-tty");
    fs::write(&device, b"").expect("write placeholder");

    let mut cmd = cli_cmd();
    cmd.arg(device.as_os_str())
        .arg("home")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Could not open"));
}

#[test]
fn raw_command_with_carriage_return_is_rejected() {
    let dir = tempdir().expect("tempdir should be created");
    let device = dir
        .path()
        .join("ttyNOPE");

    // Rejected before the device is opened, so the device error never shows.
    let mut cmd = cli_cmd();
    cmd.arg(device.as_os_str())
        .arg("MN\rRT")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("carriage return"))
        .stderr(predicate::str::contains("Could not open").not());
}

#[test]
fn bad_config_file_is_not_fatal() {
    let dir = tempdir().expect("tempdir should be created");
    let config = dir
        .path()
        .join("broken.toml");
    fs::write(&config, "[line\n").expect("write config");
    let device = dir
        .path()
        .join("ttyNOPE");

    // The broken config is skipped; the run still reaches the open failure.
    let mut cmd = cli_cmd();
    cmd.arg("--config")
        .arg(config.as_os_str())
        .arg(device.as_os_str())
        .arg("pos")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not open"));
}
