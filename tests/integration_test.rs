use std::fs;
use std::path::Path;

use assert_cmd::Command;
use git2::{Repository, Signature};
use predicates::prelude::*;
use tempfile::TempDir;

use git_merge_helper::backup::BackupManager;
use git_merge_helper::config::DEFAULT_BACKUP_DIR;
use git_merge_helper::session::{FixedStrategy, Session, SessionOptions, SessionOutcome};
use git_merge_helper::status::{ConflictStatusProvider, GitStatusProvider};
use git_merge_helper::ResolutionType;

const BASE: &str = "line1\nbase\nline3\n";
const OURS: &str = "line1\nours\nline3\n";
const THEIRS: &str = "line1\ntheirs\nline3\n";

fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@example.com").unwrap()
}

/// Commit `content` as `path` on HEAD through the index and working tree
fn commit_on_head(repo: &Repository, path: &str, content: &str, message: &str) -> git2::Oid {
    let workdir = repo.workdir().unwrap();
    fs::write(workdir.join(path), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(path)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

    let sig = signature();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

/// Repository whose working tree is in the middle of a conflicted merge on `a.txt`
fn conflicted_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let base = commit_on_head(&repo, "a.txt", BASE, "base");
    let base = repo.find_commit(base).unwrap();

    // feature branch commit, written straight to the object database
    let blob = repo.blob(THEIRS.as_bytes()).unwrap();
    let mut builder = repo.treebuilder(None).unwrap();
    builder.insert("a.txt", blob, 0o100644).unwrap();
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();
    let sig = signature();
    repo.commit(
        Some("refs/heads/feature"),
        &sig,
        &sig,
        "theirs",
        &tree,
        &[&base],
    )
    .unwrap();

    commit_on_head(&repo, "a.txt", OURS, "ours");

    let feature = repo.find_reference("refs/heads/feature").unwrap();
    let annotated = repo.reference_to_annotated_commit(&feature).unwrap();
    repo.merge(&[&annotated], None, None).unwrap();

    dir
}

fn clean_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_on_head(&repo, "a.txt", BASE, "base");
    dir
}

fn read(dir: &TempDir, path: &str) -> String {
    fs::read_to_string(dir.path().join(path)).unwrap()
}

fn helper(dir: &TempDir, config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("git-merge-helper").unwrap();
    cmd.arg("-C")
        .arg(dir.path())
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_merge_conflict_is_detected_by_git_status() {
    let dir = conflicted_repo();

    let paths = GitStatusProvider.conflicted_paths(dir.path()).unwrap();
    assert_eq!(paths, vec!["a.txt".to_string()]);

    let content = read(&dir, "a.txt");
    assert!(content.contains("<<<<<<< "));
    assert!(content.contains("=======\n"));
    assert!(content.contains(">>>>>>> "));
}

#[test]
fn test_session_resolves_real_merge_and_rolls_back() {
    let dir = conflicted_repo();
    let conflicted = read(&dir, "a.txt");

    let session = Session::new(dir.path(), SessionOptions::default());
    let mut decider = FixedStrategy(ResolutionType::KeepIncoming);
    let outcome = session.run(&GitStatusProvider, &mut decider).unwrap();

    let SessionOutcome::Completed { result, backup } = outcome else {
        panic!("expected completed session");
    };
    assert_eq!(result.files_resolved, 1);
    assert_eq!(result.manual_resolved, 1);
    assert_eq!(backup.unwrap().entries.len(), 1);
    assert_eq!(read(&dir, "a.txt"), THEIRS);

    let manager = BackupManager::new(dir.path(), DEFAULT_BACKUP_DIR);
    let report = manager.restore().unwrap();
    assert_eq!(report.restored_count, 1);
    assert_eq!(read(&dir, "a.txt"), conflicted);

    assert!(manager.cleanup().unwrap());
    assert!(!manager.has_backup());
}

#[test]
fn test_cli_backup_info_without_backup() {
    let dir = clean_repo();
    let config_home = TempDir::new().unwrap();

    helper(&dir, &config_home)
        .arg("backup-info")
        .assert()
        .success()
        .stdout(predicate::str::contains("No backup found"));
}

#[test]
fn test_cli_reports_no_conflicts() {
    let dir = clean_repo();
    let config_home = TempDir::new().unwrap();

    helper(&dir, &config_home)
        .args(["--strategy", "head", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No merge conflicts detected!"));
}

#[test]
fn test_cli_interactive_mode_needs_terminal() {
    let dir = clean_repo();
    let config_home = TempDir::new().unwrap();

    helper(&dir, &config_home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a terminal"));
}

#[test]
fn test_cli_resolves_with_strategy_then_rolls_back() {
    let dir = conflicted_repo();
    let config_home = TempDir::new().unwrap();
    let conflicted = read(&dir, "a.txt");

    helper(&dir, &config_home)
        .args(["resolve", "--strategy", "incoming", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MERGE RESOLUTION SUMMARY"))
        .stdout(predicate::str::contains("All conflicts resolved successfully!"));
    assert_eq!(read(&dir, "a.txt"), THEIRS);

    helper(&dir, &config_home)
        .arg("backup-info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files in backup: 1"))
        .stdout(predicate::str::contains("a.txt"));

    helper(&dir, &config_home)
        .args(["rollback", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 1/1 files from backup"));
    assert_eq!(read(&dir, "a.txt"), conflicted);

    helper(&dir, &config_home)
        .args(["clean-backup", "--yes"])
        .assert()
        .success();
    assert!(!dir.path().join(DEFAULT_BACKUP_DIR).exists());
}

#[test]
fn test_cli_json_summary() {
    let dir = conflicted_repo();
    let config_home = TempDir::new().unwrap();

    let output = helper(&dir, &config_home)
        .args(["--strategy", "both", "--yes", "--json", "--no-backup"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["outcome"], "completed");
    assert_eq!(json["result"]["files_resolved"], 1);
    assert_eq!(json["result"]["skipped"], 0);
    assert!(json["backup"].is_null());

    assert_eq!(read(&dir, "a.txt"), "line1\nours\ntheirs\nline3\n");
    assert!(!dir.path().join(DEFAULT_BACKUP_DIR).exists());
}

#[test]
fn test_cli_uses_repo_config() {
    let dir = conflicted_repo();
    let config_home = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".git-merge-helper.toml"),
        "[backup]\ndir_name = \".custom-backup\"\n\n[resolve]\ndefault_strategy = \"head\"\n",
    )
    .unwrap();

    helper(&dir, &config_home)
        .arg("--yes")
        .assert()
        .success();

    assert_eq!(read(&dir, "a.txt"), OURS);
    assert!(dir.path().join(".custom-backup/manifest.json").is_file());
    assert!(!dir.path().join(DEFAULT_BACKUP_DIR).exists());
}

#[test]
fn test_cli_rollback_with_corrupt_manifest_fails() {
    let dir = clean_repo();
    let config_home = TempDir::new().unwrap();
    let backup_dir = dir.path().join(DEFAULT_BACKUP_DIR);
    fs::create_dir_all(&backup_dir).unwrap();
    fs::write(backup_dir.join("manifest.json"), "not json").unwrap();

    helper(&dir, &config_home)
        .args(["rollback", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid backup manifest"));
    assert_eq!(read(&dir, "a.txt"), BASE);
}

#[test]
fn test_cli_backup_dir_outside_repo_is_ignored() {
    let outer = TempDir::new().unwrap();
    let work = outer.path().join("work");
    let sibling = outer.path().join("sibling");
    fs::create_dir_all(&sibling).unwrap();
    fs::write(sibling.join("important.rs"), "keep me").unwrap();

    let repo = Repository::init(&work).unwrap();
    commit_on_head(&repo, "a.txt", BASE, "base");
    fs::write(
        work.join(".git-merge-helper.toml"),
        "[backup]\ndir_name = \"../sibling\"\n",
    )
    .unwrap();

    let config_home = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("git-merge-helper").unwrap();
    cmd.arg("-C")
        .arg(&work)
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("NO_COLOR", "1")
        .args(["clean-backup", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backup to clean up"));

    assert_eq!(
        fs::read_to_string(sibling.join("important.rs")).unwrap(),
        "keep me"
    );
}

#[test]
fn test_cli_resolve_flags_before_subcommand_rejected() {
    let dir = clean_repo();
    let config_home = TempDir::new().unwrap();

    helper(&dir, &config_home)
        .args(["--auto", "backup-info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Resolve options must follow"));
}
