use assert_cmd::cargo;
use predicates::prelude::*;

#[tokio::test]
async fn test_cli_help() {
    let mut cmd = cargo::cargo_bin_cmd!("rivalscope");
    let assert = cmd.arg("--help").assert();

    // On Windows, the binary name in help might be "rivalscope.exe"
    let expected_pattern = if cfg!(windows) {
        "rivalscope.exe [OPTIONS] <CLIENT>"
    } else {
        "rivalscope [OPTIONS] <CLIENT>"
    };

    assert
        .success()
        .stderr(predicate::str::is_empty())
        .stdout(predicate::str::contains(expected_pattern))
        .stdout(predicate::str::contains("--competitor <DOMAIN>"))
        .stdout(predicate::str::contains("--save-history"));
}

#[test]
fn test_cli_requires_client() {
    let mut cmd = cargo::cargo_bin_cmd!("rivalscope");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("<CLIENT>"));
}

#[test]
fn test_cli_rejects_non_numeric_months() {
    let mut cmd = cargo::cargo_bin_cmd!("rivalscope");
    cmd.args(["client.com", "--months", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--months"));
}
