//! Dependency edge labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label carried by a dependency edge.
///
/// `Reference`, `AnnotationReference` and `StaticImport` are *strong*: their
/// presence alone proves the target is used. `Import` and
/// `UnresolvedReference` are *weak* and need a separate used-import record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeLabel {
    Import,
    StaticImport,
    Reference,
    UnresolvedReference,
    AnnotationReference,
}

impl EdgeLabel {
    /// True for labels that prove actual use of the target.
    pub fn is_strong(self) -> bool {
        matches!(
            self,
            Self::Reference | Self::AnnotationReference | Self::StaticImport
        )
    }

    /// Label the engine keeps when `incoming` evidence meets an edge that
    /// already carries `self`.
    ///
    /// Weak labels are upgraded to strong ones. A strong label is never
    /// replaced and among weak labels the first one stays.
    pub fn merge(self, incoming: EdgeLabel) -> EdgeLabel {
        if !self.is_strong() && incoming.is_strong() {
            incoming
        } else {
            self
        }
    }

    /// Wire name (`IMPORT`, `STATIC_IMPORT`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Import => "IMPORT",
            Self::StaticImport => "STATIC_IMPORT",
            Self::Reference => "REFERENCE",
            Self::UnresolvedReference => "UNRESOLVED_REFERENCE",
            Self::AnnotationReference => "ANNOTATION_REFERENCE",
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
