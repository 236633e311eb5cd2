//! Python source discovery.
//!
//! Collects the `.py` files of a package directory and derives their dotted
//! module paths.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use apiscan_core::error::ApiscanError;
use thiserror::Error;
use walkdir::WalkDir;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// File not found.
    #[error("file not found: {path}")]
    NotFound { path: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for file operations.
pub type FileResult<T> = Result<T, FileError>;

impl From<FileError> for ApiscanError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotFound { path } => ApiscanError::FileNotFound { path },
            FileError::Io(io_err) => ApiscanError::from(io_err),
        }
    }
}

/// Directory names never descended into.
const EXCLUDED_DIRS: &[&str] = &["__pycache__", "node_modules", "venv", "site-packages"];

// ============================================================================
// File Collection
// ============================================================================

/// A Python file of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (or caller-relative) path of the file.
    pub path: PathBuf,
    /// Dotted module path (`pkg.sub.mod`, `pkg` for `pkg/__init__.py`).
    pub module: String,
    pub content: String,
}

/// Collect the Python files of the package rooted at `package_dir`.
///
/// Hidden directories, `__pycache__` and virtualenvs are skipped, as are
/// files matching an exclusion pattern (see [`matches_exclusion`]). Files
/// are returned sorted by path so `__init__.py` precedes its siblings.
pub fn collect_python_files(
    package_dir: &Path,
    exclude_patterns: &[String],
) -> FileResult<Vec<SourceFile>> {
    if !package_dir.is_dir() {
        return Err(FileError::NotFound {
            path: package_dir.display().to_string(),
        });
    }
    let package = package_dir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut files = Vec::new();
    for entry in WalkDir::new(package_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let rel_path = match path.strip_prefix(package_dir) {
            Ok(p) => p,
            Err(_) => continue,
        };

        if rel_path.components().any(|c| {
            let name = c.as_os_str().to_string_lossy();
            name.starts_with('.') || EXCLUDED_DIRS.contains(&&*name)
        }) {
            continue;
        }
        if path.extension().is_none_or(|ext| ext != "py") {
            continue;
        }

        let rel_path_str = rel_path.to_string_lossy().to_string();
        if matches_exclusion(&rel_path_str, exclude_patterns) {
            continue;
        }

        files.push(SourceFile {
            path: path.to_path_buf(),
            module: module_path(&package, rel_path),
            content: fs::read_to_string(path)?,
        });
    }

    files.sort_by(|a, b| sort_key(&a.path).cmp(&sort_key(&b.path)));
    Ok(files)
}

/// Read a single module file; its module path is its file stem.
pub fn read_module_file(path: &Path) -> FileResult<SourceFile> {
    if !path.is_file() {
        return Err(FileError::NotFound {
            path: path.display().to_string(),
        });
    }
    let module = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(SourceFile {
        path: path.to_path_buf(),
        module,
        content: fs::read_to_string(path)?,
    })
}

/// Dotted module path of `rel_path` inside package `package`.
pub fn module_path(package: &str, rel_path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !package.is_empty() {
        parts.push(package.to_string());
    }
    let components: Vec<_> = rel_path.components().collect();
    for (index, component) in components.iter().enumerate() {
        let name = component.as_os_str().to_string_lossy();
        if index + 1 < components.len() {
            parts.push(name.to_string());
            continue;
        }
        let stem = name.strip_suffix(".py").unwrap_or(&name);
        if stem != "__init__" {
            parts.push(stem.to_string());
        }
    }
    parts.join(".")
}

/// `__init__.py` sorts before everything else in its directory.
fn sort_key(path: &Path) -> (PathBuf, bool, PathBuf) {
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let is_init = path.file_name().is_some_and(|name| name == "__init__.py");
    (parent, !is_init, path.to_path_buf())
}

/// Check if a relative path matches any exclusion pattern.
///
/// - `"tests/"`: any directory component named `tests`
/// - `"test_*.py"`: file name glob with a single `*`
/// - `"conftest.py"`: exact file name
pub fn matches_exclusion(path: &str, patterns: &[String]) -> bool {
    let path_obj = Path::new(path);
    let filename = path_obj
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    patterns.iter().any(|pattern| {
        if let Some(dir_name) = pattern.strip_suffix('/') {
            path_obj
                .components()
                .any(|c| c.as_os_str().to_str() == Some(dir_name))
        } else {
            matches_simple_glob(&filename, pattern)
        }
    })
}

fn matches_simple_glob(text: &str, pattern: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            text.len() >= prefix.len() + suffix.len()
                && text.starts_with(prefix)
                && text.ends_with(suffix)
        }
        None => text == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn create_package() -> TempDir {
        let dir = TempDir::new().unwrap();
        let pkg = dir.path().join("pkg");
        write(&pkg, "__init__.py", "");
        write(&pkg, "a_mod.py", "A = 1\n");
        write(&pkg, "sub/__init__.py", "");
        write(&pkg, "sub/inner.py", "");
        write(&pkg, "__pycache__/a_mod.py", "");
        write(&pkg, ".hidden/x.py", "");
        write(&pkg, "tests/test_a.py", "");
        write(&pkg, "notes.txt", "");
        dir
    }

    #[test]
    fn test_collect_package_modules() {
        let dir = create_package();
        let files = collect_python_files(&dir.path().join("pkg"), &[]).unwrap();
        let modules: Vec<_> = files.iter().map(|f| f.module.as_str()).collect();
        assert_eq!(
            modules,
            vec!["pkg", "pkg.a_mod", "pkg.sub", "pkg.sub.inner", "pkg.tests.test_a"]
        );
        assert_eq!(files[1].content, "A = 1\n");
    }

    #[test]
    fn test_exclusion_patterns() {
        let dir = create_package();
        let files =
            collect_python_files(&dir.path().join("pkg"), &["tests/".to_string()]).unwrap();
        assert!(files.iter().all(|f| !f.module.contains("tests")));

        assert!(matches_exclusion("tests/test_a.py", &["test_*.py".to_string()]));
        assert!(matches_exclusion("conftest.py", &["conftest.py".to_string()]));
        assert!(!matches_exclusion("mytest_a.py", &["test_*.py".to_string()]));
    }

    #[test]
    fn test_missing_package() {
        let dir = TempDir::new().unwrap();
        let err = collect_python_files(&dir.path().join("missing"), &[]).unwrap_err();
        assert!(matches!(err, FileError::NotFound { .. }));
    }

    #[test]
    fn test_module_path() {
        assert_eq!(module_path("pkg", Path::new("__init__.py")), "pkg");
        assert_eq!(module_path("pkg", Path::new("a/b.py")), "pkg.a.b");
        assert_eq!(module_path("", Path::new("mod.py")), "mod");
    }
}
