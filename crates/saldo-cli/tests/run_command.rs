use assert_cmd::Command;
use predicates::prelude::*;

/// A run with no credential source must abort before any browser work,
/// with a non-zero exit status.
#[test]
fn test_run_without_credential_fails_fast() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("saldo").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("SALDO_COOKIE")
        .args([
            "run",
            "--url",
            "https://console.platform.example/account",
            "--cookie-file",
            "absent.json",
            "--cookie-env",
            "SALDO_TEST_RUN_UNSET",
            "--no-sync",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("credential"));

    // Fatal pre-flight: nothing was recorded.
    assert!(!dir.path().join("BALANCE.md").exists());
}

#[test]
fn test_run_requires_a_url() {
    let mut cmd = Command::cargo_bin("saldo").unwrap();
    cmd.env_remove("SALDO_URL")
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("saldo").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("journal"));
}

/// The journal subcommand reads the newest-first document without mutating it.
#[test]
fn test_journal_command_prints_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("BALANCE.md");
    std::fs::write(
        &path,
        "## 2026-08-29 08:00:00 UTC\n\n```json\n{\"kind\":\"empty\"}\n```\n\n---\n\n\
         ## 2026-08-29 07:00:00 UTC\n\n```json\n{\"kind\":\"empty\"}\n```\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("saldo").unwrap();
    cmd.args(["journal", "--path"])
        .arg(&path)
        .arg("--count")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-08-29 08:00:00 UTC"))
        .stdout(predicate::str::contains("2026-08-29 07:00:00 UTC").not());
}
