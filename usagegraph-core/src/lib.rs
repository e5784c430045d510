//! usagegraph-core: dependency, usage and change-impact analysis for
//! object-oriented codebases.
//!
//! The library consumes *evidence* about source code (declarations, imports,
//! resolved and unresolved references, annotations, calls, template
//! bindings) and maintains a labeled class dependency graph plus a usage
//! ledger. From those it answers:
//!
//! - which classes and methods are unused
//! - how each method is used (called, framework-invoked, test-only)
//! - which imports are used or unused
//! - what is transitively affected when a class or method changes
//!
//! Source parsing and type resolution are left to evidence producers.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use usagegraph_core::prelude::*;
//!
//! let mut session = AnalysisSession::new();
//! session.apply_all(load_evidence_file(Path::new("evidence.jsonl"))?);
//!
//! for class in session.unused_classes() {
//!     println!("unused: {}", class);
//! }
//! let impact = session.impact_radius("com.example.Member");
//! ```
//!
//! # Module Organization
//!
//! - [`graph`]: Dependency graph store and the method call log
//! - [`ledger`]: Framework/test marks, method usage tags, import bookkeeping
//! - [`session`]: Analysis session and its query surface
//! - `engine`: Classification rules ([`AnalysisSession::apply`])
//! - [`resolve`]: Import scopes and fallback type resolution
//! - [`detect`]: Unused class and method detection
//! - [`impact`]: Impact radius and severity
//! - [`evidence`]: Evidence events and JSON Lines loading
//! - [`markup`]: Template binding scanner
//! - [`report`]: Report building and output
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `markup` (default): Template scanning (needs `regex`)
//! - `full`: Enable all optional features

pub mod common;
pub mod config;
pub mod detect;
mod engine;
pub mod error;
pub mod evidence;
pub mod graph;
pub mod impact;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod session;
pub mod vocabulary;

#[cfg(feature = "markup")]
pub mod markup;

// Common trait re-exports
pub use common::DependentWalk;

// Error types
pub use error::{IoResultExt, UsageGraphError, UsageGraphResult};

// Configuration
pub use config::{
    load_config, load_config_file, MarkupConfig, OutputConfig, UsageGraphConfig,
    VocabularyConfig, CONFIG_FILE,
};

// Model
pub use model::{
    default_bean_name, method_key, package_name, simple_name, split_method_key, EdgeLabel,
    MethodCallFact, MethodUsage, UsageTag, UNRESOLVED_CALLEE,
};

// Core state
pub use graph::{ClassId, DependencyGraph};
pub use ledger::UsageLedger;
pub use session::{AnalysisSession, IngestStats};

// Resolution and vocabularies
pub use resolve::{ImportDecl, ImportScope, Resolution};
pub use vocabulary::{
    Vocabulary, BUILTIN_NAMESPACE, BUILTIN_TYPES, FRAMEWORK_ANNOTATIONS, RESERVED_MARKUP_WORDS,
    TEST_ANNOTATIONS,
};

// Evidence
pub use evidence::{
    load_evidence_file, load_evidence_files, parse_evidence_lines, Evidence, EvidenceBatch,
};

// Detection and impact
pub use detect::{
    find_unused_classes, find_unused_methods, UnusedClass, UnusedMethod, UnusedReason,
};
pub use impact::{CallHierarchy, ImpactKind, ImpactMap, ImpactSummary, Severity};

// Logging
pub use logging::{
    init_compact_logging, init_structured_logging, log_error, log_event, log_info, log_warn,
};

// Reporting
pub use report::{
    build_report, print_json, print_plain, render_impact, render_plain, write_report, CodeReport,
    REPORT_FILE_NAME,
};

// File scanning
pub use scan::{gather_evidence_files, gather_files, gather_markup_files, DEFAULT_MARKUP_DIR};

#[cfg(feature = "markup")]
pub use markup::{page_variables, scan_markup, scan_markup_file, scan_markup_files};

#[cfg(test)]
mod tests;
