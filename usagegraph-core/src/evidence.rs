//! Evidence events fed into the classification engine.
//!
//! External producers (source parsers, markup scanners) describe what they
//! saw as a stream of [`Evidence`] values. On disk the stream is JSON Lines,
//! one internally tagged object per line:
//!
//! ```text
//! {"kind":"ClassDeclared","name":"com.x.A"}
//! {"kind":"ImportSeen","className":"com.x.A","import":"com.x.B"}
//! {"kind":"MethodCallResolved","callerClass":"com.x.A","callerMethod":"m","calleeClass":"com.x.B","calleeMethod":"n"}
//! ```
//!
//! Blank lines and lines starting with `#` or `//` are skipped. Malformed
//! lines are logged and skipped; only I/O failures abort loading.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{IoResultExt, UsageGraphError, UsageGraphResult};

/// One piece of evidence about the analyzed code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum Evidence {
    /// A class declaration
    ClassDeclared { name: String },

    /// A class-level annotation (simple or qualified name)
    ClassAnnotated { name: String, annotation: String },

    /// The class was declared in test-designated source
    TestFileMarker { class_name: String },

    /// An import declaration of the class's compilation unit
    ImportSeen {
        class_name: String,
        import: String,
        #[serde(default)]
        is_static: bool,
        #[serde(default)]
        is_wildcard: bool,
    },

    /// A type reference the resolver qualified
    TypeReferenceResolved { class_name: String, referenced: String },

    /// A type reference the resolver failed on; `name` is either the name as
    /// written or a producer-side fallback
    TypeReferenceUnresolved { class_name: String, name: String },

    /// An annotation usage qualified by the resolver
    AnnotationReferenceResolved { class_name: String, annotation: String },

    /// A method declaration
    MethodDeclared { class_name: String, method: String },

    /// A method-level (or parameter-level) annotation
    MethodAnnotated {
        class_name: String,
        method: String,
        annotation: String,
    },

    /// A call whose target method the resolver found
    MethodCallResolved {
        caller_class: String,
        caller_method: String,
        callee_class: String,
        callee_method: String,
        #[serde(default)]
        is_test_code: bool,
    },

    /// A call the resolver failed on. `scope` is the call's receiver text
    /// (or a best-guess owner class); `None` for scope-less calls.
    MethodCallUnresolved {
        caller_class: String,
        caller_method: String,
        callee_method: String,
        #[serde(default)]
        scope: Option<String>,
        #[serde(default)]
        is_test_code: bool,
    },

    /// A template binding `#{bean}`
    MarkupBeanReferenced {
        bean: String,
        #[serde(default)]
        file: Option<String>,
    },

    /// A template binding `#{bean.method}`
    MarkupMethodReferenced {
        bean: String,
        method: String,
        #[serde(default)]
        file: Option<String>,
    },
}

impl Evidence {
    /// Variant name, used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClassDeclared { .. } => "ClassDeclared",
            Self::ClassAnnotated { .. } => "ClassAnnotated",
            Self::TestFileMarker { .. } => "TestFileMarker",
            Self::ImportSeen { .. } => "ImportSeen",
            Self::TypeReferenceResolved { .. } => "TypeReferenceResolved",
            Self::TypeReferenceUnresolved { .. } => "TypeReferenceUnresolved",
            Self::AnnotationReferenceResolved { .. } => "AnnotationReferenceResolved",
            Self::MethodDeclared { .. } => "MethodDeclared",
            Self::MethodAnnotated { .. } => "MethodAnnotated",
            Self::MethodCallResolved { .. } => "MethodCallResolved",
            Self::MethodCallUnresolved { .. } => "MethodCallUnresolved",
            Self::MarkupBeanReferenced { .. } => "MarkupBeanReferenced",
            Self::MarkupMethodReferenced { .. } => "MarkupMethodReferenced",
        }
    }
}

/// Evidence decoded from one JSON Lines document.
#[derive(Debug, Default)]
pub struct EvidenceBatch {
    pub events: Vec<Evidence>,
    /// Lines that failed to decode
    pub rejected: Vec<UsageGraphError>,
}

/// Decodes a JSON Lines document. Never fails; bad lines land in `rejected`.
pub fn parse_evidence_lines(content: &str, path: &Path) -> EvidenceBatch {
    let mut batch = EvidenceBatch::default();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }

        match serde_json::from_str::<Evidence>(trimmed) {
            Ok(event) => batch.events.push(event),
            Err(e) => batch
                .rejected
                .push(UsageGraphError::evidence(path, idx + 1, e.to_string())),
        }
    }

    batch
}

/// Reads and decodes one evidence file, logging and skipping bad lines.
pub fn load_evidence_file(path: &Path) -> UsageGraphResult<Vec<Evidence>> {
    let content = fs::read_to_string(path).with_path(path)?;
    let batch = parse_evidence_lines(&content, path);

    for err in &batch.rejected {
        warn!(error = %err, "skipping malformed evidence line");
    }
    debug!(
        path = %path.display(),
        events = batch.events.len(),
        rejected = batch.rejected.len(),
        "loaded evidence file"
    );

    Ok(batch.events)
}

/// Loads several evidence files in parallel.
///
/// Files are read concurrently but the result is concatenated in sorted path
/// order, so ingestion order does not depend on thread scheduling.
pub fn load_evidence_files(paths: &[PathBuf]) -> UsageGraphResult<Vec<Evidence>> {
    let mut sorted: Vec<&PathBuf> = paths.iter().collect();
    sorted.sort();

    let per_file: Vec<Vec<Evidence>> = sorted
        .par_iter()
        .map(|path| load_evidence_file(path))
        .collect::<Result<_, UsageGraphError>>()?;

    Ok(per_file.into_iter().flatten().collect())
}
