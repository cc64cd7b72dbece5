//! Thin wrappers over the `git` executable.

use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::error::GitError;

/// Clone `url` into `directory`.
pub fn clone(url: &str, directory: &Path) -> Result<(), GitError> {
    info!(url, directory = %directory.display(), "Cloning repository");
    let mut command = Command::new("git");
    command.arg("clone").arg("--").arg(url).arg(directory);
    run(command, "clone")?;
    Ok(())
}

/// Full names of the local branches, e.g. `refs/heads/main`.
pub fn list_branches(directory: &Path) -> Result<Vec<String>, GitError> {
    info!(directory = %directory.display(), "Listing branches");
    let mut command = Command::new("git");
    command
        .args(["for-each-ref", "--format=%(refname)", "refs/heads"])
        .current_dir(directory);
    let stdout = run(command, "for-each-ref")?;

    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Full commit messages reachable from `branch`, newest first.
pub fn list_commits(directory: &Path, branch: &str) -> Result<Vec<String>, GitError> {
    info!(branch, directory = %directory.display(), "Listing commits");
    let mut command = Command::new("git");
    command
        .args(["log", "--format=%B%x1e", branch, "--"])
        .current_dir(directory);
    let stdout = run(command, "log")?;

    Ok(stdout
        .split('\u{1e}')
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
        .collect())
}

fn run(mut command: Command, name: &str) -> Result<String, GitError> {
    let output = command.output()?;
    if !output.status.success() {
        return Err(GitError::Command {
            command: name.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    fn run_git(repo_dir: &Path, args: &[&str]) {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(repo_dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn init_repo(dir: &Path) {
        run_git(dir, &["init", "-q", "-b", "main"]);
        run_git(dir, &["config", "user.email", "dev@example.com"]);
        run_git(dir, &["config", "user.name", "Dev"]);
        run_git(dir, &["config", "commit.gpgsign", "false"]);
        fs::write(dir.join("a.txt"), "a").unwrap();
        run_git(dir, &["add", "."]);
        run_git(dir, &["commit", "-q", "-m", "first commit"]);
        fs::write(dir.join("b.txt"), "b").unwrap();
        run_git(dir, &["add", "."]);
        run_git(dir, &["commit", "-q", "-m", "second commit\n\nwith body"]);
    }

    #[test]
    fn test_branches_and_commits() {
        let tmp = TempDir::new().unwrap();
        init_repo(tmp.path());
        run_git(tmp.path(), &["branch", "feature"]);

        let branches = list_branches(tmp.path()).unwrap();
        assert_eq!(branches, vec!["refs/heads/feature", "refs/heads/main"]);

        let commits = list_commits(tmp.path(), "main").unwrap();
        assert_eq!(commits, vec!["second commit\n\nwith body", "first commit"]);
    }

    #[test]
    fn test_clone_local_repository() {
        let tmp = TempDir::new().unwrap();
        let origin = tmp.path().join("origin");
        fs::create_dir_all(&origin).unwrap();
        init_repo(&origin);

        let copy = tmp.path().join("copy");
        clone(origin.to_str().unwrap(), &copy).unwrap();
        assert!(copy.join("a.txt").exists());
    }

    #[test]
    fn test_unknown_branch_fails() {
        let tmp = TempDir::new().unwrap();
        init_repo(tmp.path());

        let err = list_commits(tmp.path(), "does-not-exist").unwrap_err();
        assert!(matches!(err, GitError::Command { .. }));
    }
}
