//! The analysis session: one graph store, one usage ledger and the
//! per-class import scopes the engine needs while ingesting evidence.
//!
//! All state lives here and is passed explicitly; there is no global
//! registry. Mutation happens through [`AnalysisSession::apply`] (see
//! `engine.rs`) or the direct mutators below, queries through the read-side
//! methods at the bottom of this file.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::detect::{self, UnusedClass, UnusedMethod};
use crate::graph::DependencyGraph;
use crate::impact::{self, CallHierarchy, ImpactMap, ImpactSummary};
use crate::ledger::UsageLedger;
use crate::model::{EdgeLabel, MethodUsage, UsageTag};
use crate::resolve::ImportScope;
use crate::vocabulary::Vocabulary;

/// Counters collected while applying evidence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub events: usize,
    pub fallback_references: usize,
    pub unresolved_calls: usize,
    pub unmatched_beans: usize,
}

/// Mutable analysis state for one run.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    pub(crate) graph: DependencyGraph,
    pub(crate) ledger: UsageLedger,
    pub(crate) vocabulary: Vocabulary,
    /// Import declarations per class, in declaration order
    pub(crate) scopes: HashMap<String, ImportScope>,
    /// Qualified types each class was seen referencing
    pub(crate) referenced: HashMap<String, HashSet<String>>,
    pub(crate) stats: IngestStats,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vocabulary(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            ..Self::default()
        }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Import scope of `class`, if any import was seen for it.
    pub fn import_scope(&self, class: &str) -> Option<&ImportScope> {
        self.scopes.get(class)
    }

    // ---- direct mutators ----

    pub fn add_class(&mut self, class: &str) {
        self.graph.add_class(class);
    }

    /// Store-level edge insertion (last write wins).
    pub fn add_dependency(&mut self, from: &str, to: &str, label: EdgeLabel) {
        self.graph.add_dependency(from, to, label);
    }

    pub fn add_method_call(
        &mut self,
        caller_class: &str,
        caller_method: &str,
        callee_class: &str,
        callee_method: &str,
    ) {
        self.graph
            .add_method_call(caller_class, caller_method, callee_class, callee_method);
    }

    /// Records `import` as used by `class` and relabels an existing
    /// `class -> import` edge as [`EdgeLabel::Reference`].
    ///
    /// A missing edge is not created.
    pub fn mark_import_as_used(&mut self, class: &str, import: &str) {
        self.ledger.record_import_used(class, import);
        self.graph
            .set_label_if_present(class, import, EdgeLabel::Reference);
    }

    pub fn mark_class_used_by_framework(&mut self, class: &str) {
        self.ledger.mark_class_used_by_framework(class);
    }

    pub fn mark_class_used_by_test(&mut self, class: &str) {
        self.ledger.mark_class_used_by_test(class);
    }

    pub fn mark_method_used_by_framework(&mut self, class: &str, method: &str) {
        self.ledger.mark_method_used_by_framework(class, method);
    }

    pub fn mark_method_used_by_test(&mut self, class: &str, method: &str) {
        self.ledger.mark_method_used_by_test(class, method);
    }

    pub fn mark_method_usage(&mut self, class: &str, method: &str, tag: UsageTag) {
        self.ledger.mark_method_usage(class, method, tag);
    }

    // ---- queries ----

    /// Every known class, in first-insertion order.
    pub fn all_classes(&self) -> Vec<&str> {
        self.graph.all_classes().collect()
    }

    pub fn dependencies_of(&self, class: &str) -> Vec<(&str, EdgeLabel)> {
        self.graph.dependencies_of(class)
    }

    pub fn used_imports(&self, class: &str) -> Vec<&str> {
        self.ledger.used_imports(class)
    }

    pub fn unused_imports(&self, class: &str) -> Vec<&str> {
        self.ledger.unused_imports(class)
    }

    pub fn all_method_usages(&self) -> Vec<&MethodUsage> {
        self.ledger.all_method_usages().collect()
    }

    /// Usage tags per `class.method`, sorted by key.
    pub fn method_usage_types(&self) -> BTreeMap<String, BTreeSet<UsageTag>> {
        self.ledger
            .all_method_usages()
            .map(|usage| (usage.full_name(), usage.tags().collect()))
            .collect()
    }

    pub fn is_class_used_by_framework(&self, class: &str) -> bool {
        self.ledger.is_class_used_by_framework(class)
    }

    pub fn is_class_used_by_test(&self, class: &str) -> bool {
        self.ledger.is_class_used_by_test(class)
    }

    /// Caller/callee index built from the call log.
    pub fn call_hierarchy(&self) -> CallHierarchy {
        CallHierarchy::from_facts(self.graph.all_method_calls())
    }

    /// Caller `class.method` to its deduplicated, sorted callees.
    pub fn method_call_hierarchy(&self) -> BTreeMap<String, Vec<String>> {
        self.call_hierarchy().into_callees()
    }

    pub fn unused_classes(&self) -> BTreeSet<String> {
        detect::find_unused_classes(&self.graph, &self.ledger)
    }

    pub fn unused_methods(&self) -> BTreeSet<String> {
        detect::find_unused_methods(&self.ledger)
    }

    /// Unused classes with their report reason.
    pub fn unused_class_report(&self) -> Vec<UnusedClass> {
        detect::unused_class_report(&self.graph, &self.ledger)
    }

    /// Unused methods with their report reason.
    pub fn unused_method_report(&self) -> Vec<UnusedMethod> {
        detect::unused_method_report(&self.ledger)
    }

    pub fn impact_radius(&self, class: &str) -> ImpactMap {
        impact::impact_radius(&self.graph, class)
    }

    pub fn method_impact_radius(&self, method: &str) -> ImpactMap {
        self.call_hierarchy().impact_radius(method)
    }

    pub fn direct_callers_of(&self, method: &str) -> Vec<String> {
        self.call_hierarchy().direct_callers_of(method)
    }

    pub fn class_impact_summary(&self, class: &str) -> ImpactSummary {
        impact::summarize_class_impact(&self.graph, class)
    }

    pub fn method_impact_summary(&self, method: &str) -> ImpactSummary {
        impact::summarize_method_impact(&self.call_hierarchy(), method)
    }
}
