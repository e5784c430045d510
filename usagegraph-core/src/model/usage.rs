//! Method usage records and method call facts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::names::method_key;

/// Callee class recorded when a call could not be resolved.
pub const UNRESOLVED_CALLEE: &str = "(unresolved)";

/// How a method is being used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsageTag {
    /// Directly called from source code
    Called,
    /// Used by a framework (annotations, template bindings)
    Framework,
    /// Used from test code
    Test,
}

/// Usage information for one `(class, method)` pair.
///
/// Tags only accumulate; there is no way to remove one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodUsage {
    pub class_name: String,
    pub method_name: String,
    tags: BTreeSet<UsageTag>,
}

impl MethodUsage {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            tags: BTreeSet::new(),
        }
    }

    pub fn add_usage(&mut self, tag: UsageTag) {
        self.tags.insert(tag);
    }

    pub fn has_usage(&self, tag: UsageTag) -> bool {
        self.tags.contains(&tag)
    }

    /// True when no tag at all has been recorded.
    pub fn is_unused(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = UsageTag> + '_ {
        self.tags.iter().copied()
    }

    /// `class.method`
    pub fn full_name(&self) -> String {
        method_key(&self.class_name, &self.method_name)
    }
}

impl fmt::Display for MethodUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class_name, self.method_name)
    }
}

/// One method invocation site: caller `(class, method)` to callee `(class, method)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCallFact {
    pub caller_class: String,
    pub caller_method: String,
    pub callee_class: String,
    pub callee_method: String,
}

impl MethodCallFact {
    pub fn new(
        caller_class: impl Into<String>,
        caller_method: impl Into<String>,
        callee_class: impl Into<String>,
        callee_method: impl Into<String>,
    ) -> Self {
        Self {
            caller_class: caller_class.into(),
            caller_method: caller_method.into(),
            callee_class: callee_class.into(),
            callee_method: callee_method.into(),
        }
    }

    pub fn caller(&self) -> String {
        method_key(&self.caller_class, &self.caller_method)
    }

    pub fn callee(&self) -> String {
        method_key(&self.callee_class, &self.callee_method)
    }

    pub fn is_unresolved(&self) -> bool {
        self.callee_class == UNRESOLVED_CALLEE
    }
}

impl fmt::Display for MethodCallFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.caller(), self.callee())
    }
}
