use saldo_core::Observation;
use std::path::Path;
use std::process::Command;

/// Outcome of the best-effort publish step. Never fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Success,
    SkippedNoChange,
    Failed(String),
}

/// Stage, commit, and push the journal's repository.
///
/// Every failure is reported as `Failed`; the caller logs it and moves on,
/// since the local journal write is the durable source of truth.
pub fn publish(journal_path: &Path, observation: &Observation) -> SyncOutcome {
    let repo_dir = journal_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let status = match git(repo_dir, &["status", "--porcelain"]) {
        Ok(output) => output,
        Err(reason) => return SyncOutcome::Failed(reason),
    };
    if status.trim().is_empty() {
        return SyncOutcome::SkippedNoChange;
    }

    if let Err(reason) = git(repo_dir, &["add", "-A"]) {
        return SyncOutcome::Failed(reason);
    }
    let message = commit_message(observation);
    if let Err(reason) = git(repo_dir, &["commit", "-m", &message]) {
        return SyncOutcome::Failed(reason);
    }
    if let Err(reason) = git(repo_dir, &["push"]) {
        return SyncOutcome::Failed(reason);
    }

    SyncOutcome::Success
}

fn commit_message(observation: &Observation) -> String {
    format!("balance: {}", observation.timestamp())
}

fn git(dir: &Path, args: &[&str]) -> Result<String, String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|err| format!("could not run git {}: {err}", args.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use saldo_core::ExtractionResult;

    fn observation() -> Observation {
        Observation::new(
            Utc.with_ymd_and_hms(2026, 8, 29, 7, 30, 0).unwrap(),
            ExtractionResult::Empty,
        )
    }

    #[test]
    fn test_commit_message_embeds_timestamp() {
        assert_eq!(
            commit_message(&observation()),
            "balance: 2026-08-29 07:30:00 UTC"
        );
    }

    #[test]
    fn test_publish_outside_a_repo_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let journal_path = dir.path().join("BALANCE.md");
        std::fs::write(&journal_path, "## section\n").unwrap();

        let outcome = publish(&journal_path, &observation());

        assert!(matches!(outcome, SyncOutcome::Failed(_)));
    }
}
