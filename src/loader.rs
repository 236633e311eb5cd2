//! Loading Python modules from disk or from a git revision.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use apiscan_core::error::ApiscanError;
use apiscan_core::git::{repo_root, with_worktree};
use apiscan_core::scope::ModuleScope;
use apiscan_python::files::{collect_python_files, read_module_file, SourceFile};
use apiscan_python::{visit_module, visit_submodule, LinesCollection, ModuleApi};
use tracing::{debug, info};

/// Options for [`load_path`] and [`load_git`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Dotted path of the loaded module or package, instead of the file
    /// stem or directory name.
    pub module_name: Option<String>,
    /// Exclusion patterns for package files (`tests/`, `test_*.py`).
    pub exclude: Vec<String>,
}

/// Load a Python file, or every module of a package directory.
///
/// Package modules are visited in path order, so each `__init__.py` is
/// visited before the modules it contains; names a submodule does not
/// define resolve in its package.
pub fn load_path(path: &Path, options: &LoadOptions) -> Result<Vec<ModuleApi>, ApiscanError> {
    if path.is_dir() {
        load_package(path, options)
    } else {
        let mut file = read_module_file(path)?;
        if let Some(name) = &options.module_name {
            file.module = name.clone();
        }
        let mut lines = LinesCollection::new();
        lines.insert(&file.path, &file.content);
        let module = visit_module(&file.module, &file.path, &file.content, &lines)?;
        Ok(vec![module])
    }
}

fn load_package(dir: &Path, options: &LoadOptions) -> Result<Vec<ModuleApi>, ApiscanError> {
    let mut files = collect_python_files(dir, &options.exclude)?;
    if let Some(name) = &options.module_name {
        for file in &mut files {
            file.module = rename_top_package(&file.module, name);
        }
    }
    info!("loading {} modules from {}", files.len(), dir.display());

    let mut lines = LinesCollection::new();
    for file in &files {
        lines.insert(&file.path, &file.content);
    }

    let mut packages: HashMap<String, Rc<ModuleScope>> = HashMap::new();
    let mut modules = Vec::with_capacity(files.len());
    for file in &files {
        let module = match parent_package(&file.module).and_then(|parent| packages.get(parent)) {
            Some(package) => {
                visit_submodule(&file.module, &file.path, &file.content, &lines, package)?
            }
            None => visit_module(&file.module, &file.path, &file.content, &lines)?,
        };
        if is_init(file) {
            packages.insert(module.path.clone(), Rc::clone(module.scope()));
        }
        modules.push(module);
    }
    Ok(modules)
}

/// Load `path` as it is at `reference`.
///
/// The repository is `repo` when given, else the repository containing
/// `path`. The revision is checked out in a temporary worktree that is
/// removed before returning; file paths of the returned modules point into
/// the repository, not the worktree.
pub fn load_git(
    path: &Path,
    reference: &str,
    repo: Option<&Path>,
    options: &LoadOptions,
) -> Result<Vec<ModuleApi>, ApiscanError> {
    let repo = match repo {
        Some(repo) => repo.to_path_buf(),
        None => repo_root(path)?,
    };
    let relative = relative_to_repo(path, &repo)?;
    debug!(
        "loading {} at {} from {}",
        relative.display(),
        reference,
        repo.display()
    );

    let mut modules = with_worktree(&repo, reference, |worktree| {
        let mut options = options.clone();
        if options.module_name.is_none() && relative.as_os_str().is_empty() {
            // The repository root itself: name the package after it.
            options.module_name = repo
                .file_name()
                .map(|name| name.to_string_lossy().to_string());
        }
        let modules = load_path(&worktree.join(&relative), &options)?;
        Ok::<_, ApiscanError>(
            modules
                .into_iter()
                .map(|mut module| {
                    if let Ok(inner) = module.filepath.strip_prefix(worktree) {
                        module.filepath = repo.join(inner);
                    }
                    module
                })
                .collect::<Vec<_>>(),
        )
    })??;
    modules.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(modules)
}

/// `path` relative to the repository root.
///
/// `path` need not exist in the current checkout: a module removed since
/// `reference` is located lexically. A relative path outside the current
/// directory's view of the repository is taken as relative to the root.
fn relative_to_repo(path: &Path, repo: &Path) -> Result<PathBuf, ApiscanError> {
    let repo_canonical = repo
        .canonicalize()
        .map_err(|_| ApiscanError::file_not_found(repo.display().to_string()))?;
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let absolute = normalize(&absolute);

    for root in [repo_canonical.as_path(), repo] {
        if let Ok(relative) = absolute.strip_prefix(root) {
            return Ok(relative.to_path_buf());
        }
    }
    if path.is_relative() {
        return Ok(path.to_path_buf());
    }
    Err(ApiscanError::invalid_args(format!(
        "{} is not inside repository {}",
        path.display(),
        repo.display()
    )))
}

/// Canonical form of `path`, or of its closest existing ancestor with the
/// remaining components appended.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let mut missing = Vec::new();
    let mut current = path;
    while let Some(parent) = current.parent() {
        if let Some(name) = current.file_name() {
            missing.push(name.to_os_string());
        }
        if let Ok(canonical) = parent.canonicalize() {
            let mut result = canonical;
            for name in missing.iter().rev() {
                result.push(name);
            }
            return result;
        }
        current = parent;
    }
    path.to_path_buf()
}

fn is_init(file: &SourceFile) -> bool {
    file.path
        .file_name()
        .is_some_and(|name| name == "__init__.py")
}

/// Dotted path of the package containing `module`.
fn parent_package(module: &str) -> Option<&str> {
    module.rsplit_once('.').map(|(parent, _)| parent)
}

fn rename_top_package(module: &str, name: &str) -> String {
    match module.split_once('.') {
        Some((_, rest)) => format!("{}.{}", name, rest),
        None => name.to_string(),
    }
}
