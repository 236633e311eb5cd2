//! Lexical scopes able to resolve identifiers to qualified paths.
//!
//! Scopes are shared through `Rc` by the API model, which owns them. Names
//! only hold `Weak` back-references, so a name never keeps its scope alive.
//! Members and imports live behind `RefCell`s: a scope keeps being filled
//! after names referring to it were extracted, and resolution sees the
//! final state.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::expr::{Name, Resolve, ResolutionError};

/// Capability of resolving an identifier in a lexical scope.
pub trait Scope {
    /// Dotted path of the scope itself (`pkg.module`, `pkg.module.Class`).
    fn path(&self) -> String;

    /// Resolve `name` as seen from this scope.
    fn resolve(&self, name: &str) -> Result<String, ResolutionError>;
}

/// Resolves a name through a non-owning reference to its scope.
pub struct ScopeResolver {
    scope: Weak<dyn Scope>,
    name: String,
}

impl ScopeResolver {
    pub fn new(scope: Weak<dyn Scope>, name: impl Into<String>) -> Self {
        ScopeResolver {
            scope,
            name: name.into(),
        }
    }
}

impl Resolve for ScopeResolver {
    fn resolve(&self) -> Result<String, ResolutionError> {
        match self.scope.upgrade() {
            Some(scope) => scope.resolve(&self.name),
            None => Err(ResolutionError::ScopeDropped {
                name: self.name.clone(),
            }),
        }
    }
}

/// Create a [`Name`] resolved lazily in `scope`.
pub fn scoped_name(scope: &Weak<dyn Scope>, spelling: &str) -> Name {
    Name::new(spelling, ScopeResolver::new(scope.clone(), spelling))
}

/// Downgrade a concrete scope into the trait-object form names store.
pub fn downgrade<S: Scope + 'static>(scope: &Rc<S>) -> Weak<dyn Scope> {
    Rc::downgrade(scope) as Weak<dyn Scope>
}

// ============================================================================
// Symbol tables
// ============================================================================

#[derive(Debug, Default)]
struct Symbols {
    /// Local definitions: name -> qualified path.
    members: RefCell<BTreeMap<String, String>>,
    /// Import bindings: alias -> imported path.
    imports: RefCell<BTreeMap<String, String>>,
}

impl Symbols {
    fn lookup(&self, name: &str) -> Option<String> {
        if let Some(path) = self.members.borrow().get(name) {
            return Some(path.clone());
        }
        self.imports.borrow().get(name).cloned()
    }
}

fn not_found(name: &str, scope: String) -> ResolutionError {
    ResolutionError::NotFound {
        name: name.to_string(),
        scope,
    }
}

// ============================================================================
// Module scope
// ============================================================================

/// Scope of a module.
///
/// Lookup order: members, imports, then the enclosing package if any.
#[derive(Default)]
pub struct ModuleScope {
    path: String,
    symbols: Symbols,
    package: Option<Weak<dyn Scope>>,
}

impl ModuleScope {
    pub fn new(path: impl Into<String>) -> Rc<Self> {
        Rc::new(ModuleScope {
            path: path.into(),
            ..Default::default()
        })
    }

    /// A submodule whose unresolved names fall back to `package`.
    pub fn with_package<S: Scope + 'static>(path: impl Into<String>, package: &Rc<S>) -> Rc<Self> {
        Rc::new(ModuleScope {
            path: path.into(),
            symbols: Symbols::default(),
            package: Some(downgrade(package)),
        })
    }

    /// Register a member defined in this module; returns its path.
    pub fn add_member(&self, name: &str) -> String {
        let path = format!("{}.{}", self.path, name);
        self.symbols
            .members
            .borrow_mut()
            .insert(name.to_string(), path.clone());
        path
    }

    /// Register an import binding (`import a.b as alias`, `from a import b`).
    pub fn add_import(&self, alias: &str, target: &str) {
        self.symbols
            .imports
            .borrow_mut()
            .insert(alias.to_string(), target.to_string());
    }

    /// Snapshot of the import bindings.
    pub fn imports(&self) -> BTreeMap<String, String> {
        self.symbols.imports.borrow().clone()
    }
}

impl fmt::Debug for ModuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleScope")
            .field("path", &self.path)
            .field("symbols", &self.symbols)
            .finish()
    }
}

impl Scope for ModuleScope {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn resolve(&self, name: &str) -> Result<String, ResolutionError> {
        if let Some(path) = self.symbols.lookup(name) {
            return Ok(path);
        }
        match self.package.as_ref().and_then(Weak::upgrade) {
            Some(package) => package.resolve(name),
            None => Err(not_found(name, self.path.clone())),
        }
    }
}

// ============================================================================
// Class scope
// ============================================================================

/// Scope of a class body.
///
/// Lookup order: class members, imports made inside the class body, then
/// the enclosing scope (a module, or a class for nested classes).
pub struct ClassScope {
    path: String,
    symbols: Symbols,
    parent: Weak<dyn Scope>,
}

impl ClassScope {
    pub fn new(name: &str, parent: &Weak<dyn Scope>) -> Rc<Self> {
        let path = match parent.upgrade() {
            Some(scope) => format!("{}.{}", scope.path(), name),
            None => name.to_string(),
        };
        Rc::new(ClassScope {
            path,
            symbols: Symbols::default(),
            parent: parent.clone(),
        })
    }

    pub fn add_member(&self, name: &str) -> String {
        let path = format!("{}.{}", self.path, name);
        self.symbols
            .members
            .borrow_mut()
            .insert(name.to_string(), path.clone());
        path
    }

    pub fn add_import(&self, alias: &str, target: &str) {
        self.symbols
            .imports
            .borrow_mut()
            .insert(alias.to_string(), target.to_string());
    }
}

impl fmt::Debug for ClassScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassScope")
            .field("path", &self.path)
            .field("symbols", &self.symbols)
            .finish()
    }
}

impl Scope for ClassScope {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn resolve(&self, name: &str) -> Result<String, ResolutionError> {
        if let Some(path) = self.symbols.lookup(name) {
            return Ok(path);
        }
        match self.parent.upgrade() {
            Some(parent) => parent.resolve(name),
            None => Err(ResolutionError::ScopeDropped {
                name: name.to_string(),
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_scope_resolves_members_then_imports() {
        let module = ModuleScope::new("pkg.mod");
        module.add_import("Path", "pathlib.Path");
        module.add_member("Base");

        assert_eq!(module.resolve("Base").unwrap(), "pkg.mod.Base");
        assert_eq!(module.resolve("Path").unwrap(), "pathlib.Path");
        assert!(matches!(
            module.resolve("missing"),
            Err(ResolutionError::NotFound { .. })
        ));
    }

    #[test]
    fn test_member_shadows_import() {
        let module = ModuleScope::new("m");
        module.add_import("Thing", "other.Thing");
        module.add_member("Thing");
        assert_eq!(module.resolve("Thing").unwrap(), "m.Thing");
    }

    #[test]
    fn test_submodule_falls_back_to_package() {
        let package = ModuleScope::new("pkg");
        package.add_member("shared");
        let module = ModuleScope::with_package("pkg.sub", &package);
        assert_eq!(module.resolve("shared").unwrap(), "pkg.shared");
    }

    #[test]
    fn test_class_scope_delegates_to_module() {
        let module = ModuleScope::new("m");
        module.add_import("Any", "typing.Any");
        let class = ClassScope::new("C", &downgrade(&module));
        class.add_member("method");

        assert_eq!(class.path(), "m.C");
        assert_eq!(class.resolve("method").unwrap(), "m.C.method");
        assert_eq!(class.resolve("Any").unwrap(), "typing.Any");
    }

    #[test]
    fn test_scoped_name_resolves_late() {
        let module = ModuleScope::new("m");
        let name = scoped_name(&downgrade(&module), "Later");
        assert_eq!(name.full(), "Later");

        module.add_member("Later");
        assert_eq!(name.full(), "m.Later");
    }

    #[test]
    fn test_name_does_not_keep_scope_alive() {
        let module = ModuleScope::new("m");
        module.add_member("X");
        let name = scoped_name(&downgrade(&module), "X");
        assert_eq!(Rc::strong_count(&module), 1);

        drop(module);
        assert!(matches!(
            name.try_full(),
            Err(ResolutionError::ScopeDropped { .. })
        ));
        assert_eq!(name.full(), "X");
    }
}
