//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use usagegraph_core::prelude::*;
//! ```

// Session and evidence
pub use crate::evidence::{load_evidence_file, load_evidence_files, Evidence};
pub use crate::session::AnalysisSession;

// Value types
pub use crate::model::{EdgeLabel, MethodUsage, UsageTag};
pub use crate::vocabulary::Vocabulary;

// Results
pub use crate::detect::UnusedReason;
pub use crate::impact::{ImpactMap, ImpactSummary, Severity};
pub use crate::report::{build_report, CodeReport};

// Errors and configuration
pub use crate::config::{load_config, UsageGraphConfig};
pub use crate::error::{UsageGraphError, UsageGraphResult};
