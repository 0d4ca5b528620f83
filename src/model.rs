//! In-memory coverage model: Package → Class/Method hierarchy populated by
//! the external declaration-discovery pass. The model is mutated only during
//! the declare/mark-used phase and read-only while the report is built.

use std::collections::HashMap;
use std::path::Path;

use crate::config::ReportConfig;

/// Name given to declarations with no resolvable enclosing scope (and to the
/// empty-name package, which normalizes to it).
pub const UNKNOWN_PACKAGE: &str = "unknown";

/// Sentinel `usage_count` for a method that was declared but never observed
/// in use.
pub const DECLARED_UNUSED: i32 = -1;

/// The enclosing context of a declaration or call site, as resolved by the
/// discovery collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// A namespace-like scope, identified by its fully qualified path.
    /// The empty path maps to the [`UNKNOWN_PACKAGE`] bucket.
    Namespace(String),
    /// A type-like scope, identified by the fully qualified type name.
    Type(String),
    /// No enclosing construct was found.
    None,
}

/// Where a declaration was encountered.
#[derive(Debug, Clone)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

/// A single declared method or free function.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    /// Display descriptor built from parameter and return types,
    /// e.g. `(int;float)void`. Disambiguates overloads for display only;
    /// usage matching is by name (see [`CoverageModel::mark_used`]).
    pub desc: String,
    pub line: u32,
    /// `-1` until a usage is observed, positive afterwards. Never reset.
    pub usage_count: i32,
}

impl Method {
    #[must_use]
    pub fn is_covered(&self) -> bool {
        self.usage_count > 0
    }
}

/// A type-like scope and the methods declared inside it.
#[derive(Debug, Clone)]
pub struct Class {
    /// Fully qualified name, e.g. `ns::A`.
    pub name: String,
    /// Root-relative sourcefile attribution. Assigned on the first in-root
    /// declaration and never changed afterwards. `None` when every
    /// declaration so far fell outside the source root.
    pub file_name: Option<String>,
    pub methods: Vec<Method>,
}

impl Class {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            file_name: None,
            methods: Vec::new(),
        }
    }
}

/// A namespace-like scope: classes plus free (non-member) functions.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub classes: Vec<Class>,
    /// Free functions attached directly to the namespace.
    pub methods: Vec<Method>,
    class_index: HashMap<String, usize>,
}

impl Package {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            classes: Vec::new(),
            methods: Vec::new(),
            class_index: HashMap::new(),
        }
    }
}

/// The complete coverage model for one run. Packages keep insertion order;
/// lookups are find-or-create and never duplicate an existing name.
#[derive(Debug)]
pub struct CoverageModel {
    config: ReportConfig,
    packages: Vec<Package>,
    package_index: HashMap<String, usize>,
}

impl CoverageModel {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            packages: Vec::new(),
            package_index: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Packages in model insertion order.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Record a method declaration.
    ///
    /// Namespace scopes take the method directly; type scopes route it into
    /// the class (whose owning package is the qualified name minus its last
    /// `::` component). The class's sourcefile attribution is assigned on
    /// first insertion; a declaration whose file lies outside the configured
    /// source root is dropped outright.
    pub fn add_declaration(
        &mut self,
        scope: &Scope,
        name: &str,
        desc: &str,
        location: &SourceLocation,
    ) {
        let method = Method {
            name: name.to_string(),
            desc: desc.to_string(),
            line: location.line,
            usage_count: DECLARED_UNUSED,
        };

        match scope {
            Scope::Namespace(path) => self.package_mut(path).methods.push(method),
            Scope::None => self.package_mut("").methods.push(method),
            Scope::Type(qualified) => {
                let attribution =
                    relativize(&location.file, self.config.source_root.as_deref());
                let class = self.class_mut(qualified);
                if class.file_name.is_none() {
                    match attribution {
                        Some(rel) => class.file_name = Some(rel),
                        // Not project source: no attribution, no method.
                        None => return,
                    }
                }
                class.methods.push(method);
            }
        }
    }

    /// Record that a declared method was observed in use.
    ///
    /// Scans the resolved scope for the first method whose name matches and
    /// sets its usage positive. Overloads sharing a name resolve to the
    /// first declared one — a carried-over limitation, not a bug to fix.
    /// No match is a silent no-op.
    pub fn mark_used(&mut self, scope: &Scope, name: &str) {
        let methods = match scope {
            Scope::Namespace(path) => &mut self.package_mut(path).methods,
            Scope::None => &mut self.package_mut("").methods,
            Scope::Type(qualified) => &mut self.class_mut(qualified).methods,
        };

        if let Some(method) = methods.iter_mut().find(|m| m.name == name) {
            method.usage_count = 1;
        }
    }

    /// Find-or-create a package by fully qualified path. The empty path
    /// normalizes to [`UNKNOWN_PACKAGE`].
    pub fn package_mut(&mut self, path: &str) -> &mut Package {
        let idx = self.package_idx(path);
        &mut self.packages[idx]
    }

    /// Find-or-create a class by fully qualified name within its owning
    /// package.
    pub fn class_mut(&mut self, qualified: &str) -> &mut Class {
        let pidx = self.package_idx(parent_scope(qualified));
        let package = &mut self.packages[pidx];
        let cidx = match package.class_index.get(qualified) {
            Some(&i) => i,
            None => {
                let i = package.classes.len();
                package.classes.push(Class::new(qualified));
                package.class_index.insert(qualified.to_string(), i);
                i
            }
        };
        &mut package.classes[cidx]
    }

    fn package_idx(&mut self, path: &str) -> usize {
        let name = if path.is_empty() { UNKNOWN_PACKAGE } else { path };
        match self.package_index.get(name) {
            Some(&i) => i,
            None => {
                let i = self.packages.len();
                self.packages.push(Package::new(name));
                self.package_index.insert(name.to_string(), i);
                i
            }
        }
    }
}

/// Build the display descriptor for a signature from its parameter types and
/// return type, e.g. `(int;float)void`.
#[must_use]
pub fn signature_descriptor(params: &[&str], return_type: &str) -> String {
    format!("({}){}", params.join(";"), return_type)
}

/// The qualified name minus its last `::` component (the owning scope of a
/// class, or the empty path when there is none).
fn parent_scope(qualified: &str) -> &str {
    qualified.rsplit_once("::").map_or("", |(parent, _)| parent)
}

/// Relativize `file` against the source root. Returns `None` when the file
/// is not project source: an absolute path outside the root, or any path
/// containing a `../` escape. Paths that are already root-relative pass
/// through unchanged.
fn relativize(file: &str, source_root: Option<&str>) -> Option<String> {
    let Some(root) = source_root else {
        return Some(file.to_string());
    };

    if file.contains("../") {
        return None;
    }

    if let Some(rest) = file.strip_prefix(root) {
        return Some(rest.trim_start_matches('/').to_string());
    }

    if !Path::new(file).is_absolute() {
        // Already root-relative.
        return Some(file.to_string());
    }

    None
}
