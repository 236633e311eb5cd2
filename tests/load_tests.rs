//! Integration tests for loading packages from disk and from git revisions.

use std::fs;
use std::path::Path;
use std::process::Command;

use apiscan::{load_git, load_path, LoadOptions};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A package `shapes` with a base module and a submodule importing from it.
fn write_package(root: &Path) {
    write(
        root,
        "shapes/__init__.py",
        "\"\"\"Shapes.\"\"\"\n\nfrom .base import Shape\n",
    );
    write(
        root,
        "shapes/base.py",
        "class Shape:\n    \"\"\"A shape.\"\"\"\n\n    def area(self) -> float:\n        return 0.0\n",
    );
    write(
        root,
        "shapes/square.py",
        "class Square(Shape):\n    def __init__(self, side: float = 1.0):\n        self.side = side\n",
    );
    write(root, "shapes/tests/test_square.py", "def test_area():\n    pass\n");
}

#[test]
fn test_load_package_resolves_through_init() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path());

    let modules = load_path(&temp.path().join("shapes"), &LoadOptions::default()).unwrap();
    let paths: Vec<_> = modules.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["shapes", "shapes.base", "shapes.square", "shapes.tests.test_square"]
    );

    let init = &modules[0];
    assert!(init.is_package);
    assert_eq!(init.docstring.as_ref().unwrap().value, "Shapes.");

    let square = modules[2].class("Square").unwrap();
    assert_eq!(square.bases[0].resolved(), "shapes.base.Shape");
    let side = square.attribute("side").unwrap();
    assert!(side.is_instance);
    let init_method = square.method("__init__").unwrap();
    assert_eq!(init_method.parameters[1].default.as_deref(), Some("1.0"));
}

#[test]
fn test_load_with_options() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path());

    let options = LoadOptions {
        module_name: Some("geometry".to_string()),
        exclude: vec!["tests/".to_string()],
    };
    let modules = load_path(&temp.path().join("shapes"), &options).unwrap();
    let paths: Vec<_> = modules.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(paths, vec!["geometry", "geometry.base", "geometry.square"]);

    let single = load_path(
        &temp.path().join("shapes/base.py"),
        &LoadOptions::default(),
    )
    .unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].path, "base");
    assert_eq!(single[0].class("Shape").unwrap().path, "base.Shape");
}

#[test]
fn test_load_missing_path() {
    let temp = TempDir::new().unwrap();
    let err = load_path(&temp.path().join("nothing.py"), &LoadOptions::default()).unwrap_err();
    assert_eq!(apiscan::error::OutputErrorCode::from(&err).code(), 3);
}

#[test]
fn test_load_git_revision() {
    let temp = TempDir::new().unwrap();
    let repo = temp.path();
    git(repo, &["init", "-b", "main"]);
    git(repo, &["config", "user.email", "test@example.com"]);
    git(repo, &["config", "user.name", "Test User"]);
    git(repo, &["config", "commit.gpgsign", "false"]);

    write_package(repo);
    git(repo, &["add", "."]);
    git(repo, &["commit", "-m", "first"]);
    git(repo, &["tag", "v1.0"]);

    write(repo, "shapes/base.py", "class Shape:\n    sides: int = 0\n");
    git(repo, &["commit", "-am", "second"]);

    let old = load_git(&repo.join("shapes"), "v1.0", None, &LoadOptions::default()).unwrap();
    let base = old.iter().find(|m| m.path == "shapes.base").unwrap();
    assert!(base.class("Shape").unwrap().method("area").is_some());
    assert!(base.filepath.starts_with(repo.canonicalize().unwrap()));

    let current = load_git(&repo.join("shapes"), "HEAD", Some(repo), &LoadOptions::default())
        .unwrap();
    let base = current.iter().find(|m| m.path == "shapes.base").unwrap();
    assert!(base.class("Shape").unwrap().method("area").is_none());
    assert!(base.class("Shape").unwrap().attribute("sides").is_some());

    let output = Command::new("git")
        .current_dir(repo)
        .args(["worktree", "list", "--porcelain"])
        .output()
        .unwrap();
    let worktrees = String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| line.starts_with("worktree "))
        .count();
    assert_eq!(worktrees, 1);
}

#[test]
fn test_load_git_module_removed_since_reference() {
    let temp = TempDir::new().unwrap();
    let repo = temp.path();
    git(repo, &["init", "-b", "main"]);
    git(repo, &["config", "user.email", "test@example.com"]);
    git(repo, &["config", "user.name", "Test User"]);
    git(repo, &["config", "commit.gpgsign", "false"]);

    write(repo, "old.py", "X = 1\n");
    write(repo, "legacy/__init__.py", "class Legacy:\n    pass\n");
    git(repo, &["add", "."]);
    git(repo, &["commit", "-m", "first"]);
    git(repo, &["tag", "v1"]);
    git(repo, &["rm", "-r", "-q", "old.py", "legacy"]);
    git(repo, &["commit", "-m", "remove"]);
    assert!(!repo.join("old.py").exists());

    let modules = load_git(&repo.join("old.py"), "v1", Some(repo), &LoadOptions::default())
        .unwrap();
    assert_eq!(modules[0].path, "old");
    assert_eq!(modules[0].attribute("X").unwrap().value.as_deref(), Some("1"));

    let modules = load_git(&repo.join("legacy"), "v1", None, &LoadOptions::default()).unwrap();
    assert!(modules[0].class("Legacy").is_some());

    let err = load_git(&repo.join("old.py"), "HEAD", Some(repo), &LoadOptions::default())
        .unwrap_err();
    assert_eq!(apiscan::error::OutputErrorCode::from(&err).code(), 3);
}
