//! Value types shared by the graph store, ledger and analyzers.
//!
//! - `names`: helpers deriving simple/package/bean names from a qualified name
//! - `label`: the fixed dependency edge label vocabulary
//! - `usage`: method usage tags, method usage records and call facts

mod label;
mod names;
mod usage;

pub use label::EdgeLabel;
pub use names::{default_bean_name, method_key, package_name, simple_name, split_method_key};
pub use usage::{MethodCallFact, MethodUsage, UsageTag, UNRESOLVED_CALLEE};
