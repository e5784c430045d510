//! Import scopes and the heuristic fallback for unresolved type names.
//!
//! When the external resolver fails, a simple name is qualified by, in order:
//! - a dotted name is kept as is
//! - an explicit (non-wildcard) import whose last segment matches
//! - the package of the first wildcard import
//! - [`BUILTIN_NAMESPACE`] for the fixed built-in types
//! - the referencing class's own package (bare name if it has none)
//!
//! The result is tagged [`Resolution::Fallback`] so it is never mistaken for
//! a confirmed resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vocabulary::{is_builtin_type, BUILTIN_NAMESPACE};

/// Outcome of resolving a type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "confidence", content = "name", rename_all = "snake_case")]
pub enum Resolution {
    /// Qualified name confirmed by the resolver
    Resolved(String),
    /// Qualified name guessed by the fallback heuristic
    Fallback(String),
}

impl Resolution {
    pub fn name(&self) -> &str {
        match self {
            Self::Resolved(name) | Self::Fallback(name) => name,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn into_name(self) -> String {
        match self {
            Self::Resolved(name) | Self::Fallback(name) => name,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(name) => f.write_str(name),
            Self::Fallback(name) => write!(f, "{} (fallback)", name),
        }
    }
}

/// One import declaration of a class's compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Imported name; for wildcard imports, the package without `.*`
    pub name: String,
    pub is_static: bool,
    pub is_wildcard: bool,
}

impl ImportDecl {
    /// Builds a declaration, normalizing a trailing `.*` into the wildcard flag.
    pub fn new(name: &str, is_static: bool, is_wildcard: bool) -> Self {
        match name.strip_suffix(".*") {
            Some(base) => Self {
                name: base.to_string(),
                is_static,
                is_wildcard: true,
            },
            None => Self {
                name: name.to_string(),
                is_static,
                is_wildcard,
            },
        }
    }

    fn ends_with_segment(&self, segment: &str) -> bool {
        self.name
            .strip_suffix(segment)
            .is_some_and(|rest| rest.ends_with('.'))
    }
}

/// Ordered import declarations of one class.
#[derive(Debug, Clone, Default)]
pub struct ImportScope {
    imports: Vec<ImportDecl>,
}

impl ImportScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an import. A repeated import name keeps its first declaration.
    ///
    /// Returns false for a duplicate.
    pub fn add(&mut self, decl: ImportDecl) -> bool {
        if self.imports.iter().any(|i| i.name == decl.name) {
            return false;
        }
        self.imports.push(decl);
        true
    }

    pub fn imports(&self) -> &[ImportDecl] {
        &self.imports
    }

    /// True if `name` was imported verbatim (non-wildcard).
    pub fn has_import(&self, name: &str) -> bool {
        self.imports
            .iter()
            .any(|i| !i.is_wildcard && i.name == name)
    }

    /// First non-wildcard import whose last segment is `simple`.
    pub fn explicit_for(&self, simple: &str) -> Option<&ImportDecl> {
        self.imports
            .iter()
            .find(|i| !i.is_wildcard && i.ends_with_segment(simple))
    }

    pub fn first_wildcard(&self) -> Option<&ImportDecl> {
        self.imports.iter().find(|i| i.is_wildcard)
    }

    /// Owning class of the first static import naming member `method`.
    ///
    /// `import static com.x.Util.helper` → `com.x.Util` for `helper`.
    pub fn static_owner_of(&self, method: &str) -> Option<&str> {
        self.imports
            .iter()
            .filter(|i| i.is_static && !i.is_wildcard)
            .find(|i| i.ends_with_segment(method))
            .and_then(|i| i.name.rfind('.').map(|idx| &i.name[..idx]))
    }

    /// First non-wildcard import matching a call or field-access scope.
    ///
    /// A simple scope matches on the last segment; a dotted scope must equal
    /// the import name.
    pub fn import_for_scope(&self, scope: &str) -> Option<&str> {
        self.imports
            .iter()
            .filter(|i| !i.is_wildcard)
            .find(|i| i.name == scope || i.ends_with_segment(scope))
            .map(|i| i.name.as_str())
    }

    /// Qualifies `type_name` with the fallback heuristic.
    pub fn fallback_name(&self, type_name: &str, own_package: &str) -> String {
        if type_name.contains('.') {
            return type_name.to_string();
        }

        if let Some(explicit) = self.explicit_for(type_name) {
            return explicit.name.clone();
        }

        if let Some(wildcard) = self.first_wildcard() {
            return format!("{}.{}", wildcard.name, type_name);
        }

        if is_builtin_type(type_name) {
            return format!("{}.{}", BUILTIN_NAMESPACE, type_name);
        }

        if own_package.is_empty() {
            type_name.to_string()
        } else {
            format!("{}.{}", own_package, type_name)
        }
    }

    /// Wraps [`ImportScope::fallback_name`] in [`Resolution::Fallback`].
    pub fn fallback(&self, type_name: &str, own_package: &str) -> Resolution {
        Resolution::Fallback(self.fallback_name(type_name, own_package))
    }
}
