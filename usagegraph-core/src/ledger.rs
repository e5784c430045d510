//! Usage ledger: framework/test usage marks, method usage tags and
//! per-class import bookkeeping.
//!
//! Every operation is idempotent and nothing is ever removed except an
//! import moving from "unused" to "used".

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::model::{method_key, MethodUsage, UsageTag};

/// Bookkeeping of how classes, methods and imports are used.
#[derive(Debug, Default)]
pub struct UsageLedger {
    classes_by_framework: HashSet<String>,
    methods_by_framework: HashSet<String>,
    classes_by_test: HashSet<String>,
    methods_by_test: HashSet<String>,
    used_imports: HashMap<String, BTreeSet<String>>,
    unused_imports: HashMap<String, BTreeSet<String>>,
    /// Keyed by `class.method`; sorted for deterministic reporting
    method_usages: BTreeMap<String, MethodUsage>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_class_used_by_framework(&mut self, class: &str) {
        self.classes_by_framework.insert(class.to_string());
    }

    pub fn mark_class_used_by_test(&mut self, class: &str) {
        self.classes_by_test.insert(class.to_string());
    }

    pub fn mark_method_used_by_framework(&mut self, class: &str, method: &str) {
        self.methods_by_framework.insert(method_key(class, method));
    }

    pub fn mark_method_used_by_test(&mut self, class: &str, method: &str) {
        self.methods_by_test.insert(method_key(class, method));
    }

    /// Ensures a usage record exists for `(class, method)` without tagging it.
    pub fn register_method(&mut self, class: &str, method: &str) -> &mut MethodUsage {
        self.method_usages
            .entry(method_key(class, method))
            .or_insert_with(|| MethodUsage::new(class, method))
    }

    /// Registers `(class, method)` and adds `tag` to its usage set.
    pub fn mark_method_usage(&mut self, class: &str, method: &str, tag: UsageTag) {
        self.register_method(class, method).add_usage(tag);
    }

    /// Records that `class` imports `import`. Stays in the unused set until
    /// [`UsageLedger::record_import_used`] is called for it.
    pub fn record_import_seen(&mut self, class: &str, import: &str) {
        if self.is_import_used(class, import) {
            return;
        }
        self.unused_imports
            .entry(class.to_string())
            .or_default()
            .insert(import.to_string());
    }

    /// Records `import` as used by `class`, dropping it from the unused set.
    pub fn record_import_used(&mut self, class: &str, import: &str) {
        self.used_imports
            .entry(class.to_string())
            .or_default()
            .insert(import.to_string());

        if let Some(unused) = self.unused_imports.get_mut(class) {
            unused.remove(import);
        }
    }

    pub fn is_class_used_by_framework(&self, class: &str) -> bool {
        self.classes_by_framework.contains(class)
    }

    pub fn is_class_used_by_test(&self, class: &str) -> bool {
        self.classes_by_test.contains(class)
    }

    pub fn is_method_used_by_framework(&self, class: &str, method: &str) -> bool {
        self.methods_by_framework.contains(&method_key(class, method))
    }

    pub fn is_method_used_by_test(&self, class: &str, method: &str) -> bool {
        self.methods_by_test.contains(&method_key(class, method))
    }

    pub fn is_import_used(&self, class: &str, import: &str) -> bool {
        self.used_imports
            .get(class)
            .is_some_and(|imports| imports.contains(import))
    }

    /// Imports of `class` proven used, sorted.
    pub fn used_imports(&self, class: &str) -> Vec<&str> {
        Self::sorted(self.used_imports.get(class))
    }

    /// Imports of `class` seen but not (yet) proven used, sorted.
    pub fn unused_imports(&self, class: &str) -> Vec<&str> {
        Self::sorted(self.unused_imports.get(class))
    }

    pub fn method_usage(&self, class: &str, method: &str) -> Option<&MethodUsage> {
        self.method_usages.get(&method_key(class, method))
    }

    /// All method usage records, ordered by `class.method`.
    pub fn all_method_usages(&self) -> impl Iterator<Item = &MethodUsage> + '_ {
        self.method_usages.values()
    }

    /// Mutable access for the name-based test heuristic, which tags records
    /// across classes.
    pub(crate) fn method_usages_mut(&mut self) -> impl Iterator<Item = &mut MethodUsage> + '_ {
        self.method_usages.values_mut()
    }

    fn sorted(set: Option<&BTreeSet<String>>) -> Vec<&str> {
        set.map(|s| s.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
