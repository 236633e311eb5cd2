//! Temporary git worktrees for loading past revisions.
//!
//! [`TmpWorktree`] checks out a reference into a fresh temporary directory
//! as a linked worktree on its own branch. Dropping it removes the
//! worktree registration, prunes stale bookkeeping and deletes the branch,
//! whether the caller's code returned normally, failed, or panicked.
//!
//! Every git invocation passes its arguments directly to the executable;
//! nothing goes through a shell, so references may contain any character.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempDir;
use thiserror::Error;

/// Prefix of the branch and directory created for each worktree.
pub const WORKTREE_PREFIX: &str = "apiscan";

// ============================================================================
// Error Types
// ============================================================================

/// Error type for git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git executable is not on PATH.
    #[error("could not find git executable, please install git")]
    GitNotFound,

    /// The target directory is not inside a git work tree.
    #[error("not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },

    /// `git worktree add` failed.
    #[error("could not create git worktree: {reason}")]
    WorktreeCreationFailed { reason: String },

    /// Any other git command exited with a failure status.
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;

// ============================================================================
// Git CLI wrapper
// ============================================================================

/// Git CLI wrapper bound to one repository.
struct GitCli<'a> {
    git: PathBuf,
    repo: &'a Path,
}

impl<'a> GitCli<'a> {
    /// Locate the git executable; fails before anything touches the disk.
    fn new(repo: &'a Path) -> GitResult<Self> {
        let git = which::which("git").map_err(|_| GitError::GitNotFound)?;
        Ok(GitCli { git, repo })
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.git);
        command.arg("-C").arg(self.repo);
        command
    }

    /// Check `rev-parse --is-inside-work-tree`.
    fn is_inside_work_tree(&self) -> bool {
        self.command()
            .args(["rev-parse", "--is-inside-work-tree"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Add a worktree at `path` on a new branch `branch` pointing at `reference`.
    fn worktree_add(&self, branch: &str, path: &Path, reference: &str) -> GitResult<()> {
        let output = self
            .command()
            .args(["worktree", "add", "-b", branch])
            .arg(path)
            .arg(reference)
            .output()
            .map_err(|e| GitError::WorktreeCreationFailed {
                reason: format!("failed to run git: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::WorktreeCreationFailed {
                reason: stderr.trim().to_string(),
            });
        }

        Ok(())
    }

    /// Run a cleanup command, ignoring its outcome beyond a log line.
    fn run_quietly(&self, args: &[&str]) {
        let result = self
            .command()
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(status) if status.success() => {}
            Ok(status) => {
                tracing::debug!("git {} exited with {}", args.join(" "), status);
            }
            Err(e) => {
                tracing::warn!("failed to run git {}: {}", args.join(" "), e);
            }
        }
    }

    /// Run a query command in `dir` and return its trimmed stdout.
    fn query(&self, dir: &Path, args: &[&str]) -> GitResult<String> {
        let output = Command::new(&self.git).args(args).current_dir(dir).output()?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

// ============================================================================
// Repository queries
// ============================================================================

/// Fail unless git is installed and `repo` is inside a git work tree.
pub fn assert_git_repo(repo: &Path) -> GitResult<()> {
    let git = GitCli::new(repo)?;
    if !git.is_inside_work_tree() {
        return Err(GitError::NotARepository {
            path: repo.to_path_buf(),
        });
    }
    Ok(())
}

/// Directory to run queries from: `path` itself, or its closest existing
/// ancestor for files and paths removed from the checkout.
fn query_dir(path: &Path) -> &Path {
    let mut dir = path;
    while !dir.is_dir() {
        match dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => dir = parent,
            _ => return Path::new("."),
        }
    }
    dir
}

/// Most recent tag reachable from HEAD (`git describe --tags --abbrev=0`).
pub fn latest_tag(path: &Path) -> GitResult<String> {
    let dir = query_dir(path);
    GitCli::new(dir)?.query(dir, &["describe", "--tags", "--abbrev=0"])
}

/// Top-level directory of the repository containing `path`.
pub fn repo_root(path: &Path) -> GitResult<PathBuf> {
    let dir = query_dir(path);
    let root = GitCli::new(dir)?.query(dir, &["rev-parse", "--show-toplevel"])?;
    Ok(PathBuf::from(root))
}

// ============================================================================
// Worktrees
// ============================================================================

/// Branch (and directory) name for a worktree of `reference`.
///
/// Characters git refuses in branch names are replaced with `-`, so
/// references like `HEAD~1` or `v1.0^{}` still produce a valid branch.
pub fn worktree_id(reference: &str) -> String {
    let mut sanitized: String = reference
        .chars()
        .map(|c| match c {
            '~' | '^' | ':' | '?' | '*' | '[' | '\\' | '/' | '{' | '}' | '@' => '-',
            c if c.is_whitespace() || c.is_control() => '-',
            c => c,
        })
        .collect();

    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", "-");
    }
    let sanitized = sanitized.trim_end_matches(['.', '-']).to_string();
    let sanitized = sanitized
        .strip_suffix(".lock")
        .map(str::to_string)
        .unwrap_or(sanitized);

    if sanitized.is_empty() {
        format!("{}_worktree", WORKTREE_PREFIX)
    } else {
        format!("{}_{}", WORKTREE_PREFIX, sanitized)
    }
}

/// A git worktree checked out in a temporary directory.
///
/// Removed on drop. The path must not be used once the value is dropped.
#[derive(Debug)]
pub struct TmpWorktree {
    repo: PathBuf,
    git: PathBuf,
    id: String,
    path: PathBuf,
    // Dropped after `Drop::drop` has unregistered the worktree.
    _root: TempDir,
}

impl TmpWorktree {
    /// Check out `reference` of `repo` into a new temporary worktree.
    ///
    /// # Errors
    ///
    /// - [`GitError::GitNotFound`] if git is not installed
    /// - [`GitError::NotARepository`] if `repo` is not a git work tree
    /// - [`GitError::WorktreeCreationFailed`] for references starting with
    ///   `-`, and with git's diagnostic when `worktree add` fails
    pub fn create(repo: &Path, reference: &str) -> GitResult<Self> {
        let git = GitCli::new(repo)?;
        if !git.is_inside_work_tree() {
            return Err(GitError::NotARepository {
                path: repo.to_path_buf(),
            });
        }

        // git would parse it as an option of `worktree add`.
        if reference.starts_with('-') {
            return Err(GitError::WorktreeCreationFailed {
                reason: format!("invalid reference {:?}", reference),
            });
        }

        let root = tempfile::Builder::new()
            .prefix(&format!("{}-worktree-", WORKTREE_PREFIX))
            .tempdir()?;
        let id = worktree_id(reference);
        let path = root.path().join(&id);

        tracing::debug!(
            "creating worktree {} for {:?} at {}",
            id,
            reference,
            path.display()
        );
        git.worktree_add(&id, &path, reference)?;

        Ok(TmpWorktree {
            repo: repo.to_path_buf(),
            git: git.git,
            id,
            path,
            _root: root,
        })
    }

    /// Root of the checked-out worktree.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the branch backing the worktree.
    pub fn branch(&self) -> &str {
        &self.id
    }
}

impl Drop for TmpWorktree {
    fn drop(&mut self) {
        tracing::debug!("removing worktree {}", self.id);
        let git = GitCli {
            git: self.git.clone(),
            repo: &self.repo,
        };
        git.run_quietly(&["worktree", "remove", "--force", &self.id]);
        git.run_quietly(&["worktree", "prune"]);
        git.run_quietly(&["branch", "-D", &self.id]);
    }
}

/// Run `f` with the path of a temporary worktree of `reference`.
///
/// The worktree is removed when `f` returns or unwinds.
pub fn with_worktree<T, F>(repo: &Path, reference: &str, f: F) -> GitResult<T>
where
    F: FnOnce(&Path) -> T,
{
    let worktree = TmpWorktree::create(repo, reference)?;
    Ok(f(worktree.path()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worktree_id_plain_references() {
        assert_eq!(worktree_id("HEAD"), "apiscan_HEAD");
        assert_eq!(worktree_id("v0.1.0"), "apiscan_v0.1.0");
        assert_eq!(worktree_id("abc123"), "apiscan_abc123");
    }

    #[test]
    fn test_worktree_id_special_characters() {
        assert_eq!(worktree_id("HEAD~1"), "apiscan_HEAD-1");
        assert_eq!(worktree_id("feature/x"), "apiscan_feature-x");
        assert_eq!(worktree_id("a..b"), "apiscan_a-b");
        assert_eq!(worktree_id("v1 ; rm -rf /"), "apiscan_v1-;-rm--rf");
        assert_eq!(worktree_id("~"), "apiscan_worktree");
    }

    #[test]
    fn test_query_dir_uses_parent_of_files() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("mod.py");
        std::fs::write(&file, "").unwrap();
        assert_eq!(query_dir(&file), temp.path());
        assert_eq!(query_dir(temp.path()), temp.path());
        assert_eq!(query_dir(&temp.path().join("gone/old.py")), temp.path());
        assert_eq!(query_dir(Path::new("gone.py")), Path::new("."));
    }
}
