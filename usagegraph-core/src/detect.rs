//! Unused class and method detection.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::graph::DependencyGraph;
use crate::ledger::UsageLedger;

/// Why an entity was reported as unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnusedReason {
    #[serde(rename = "only used in Test")]
    OnlyUsedInTest,
    #[serde(rename = "No other classes depends on this class")]
    NoDependents,
}

impl UnusedReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnlyUsedInTest => "only used in Test",
            Self::NoDependents => "No other classes depends on this class",
        }
    }
}

impl fmt::Display for UnusedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedClass {
    pub id: String,
    pub full_name: String,
    pub reason: UnusedReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedMethod {
    pub id: String,
    pub class_name: String,
    pub method_name: String,
    pub reason: UnusedReason,
}

/// A class is unused when nothing proves otherwise: no strong incoming
/// edge, no weak incoming edge whose source recorded the import as used,
/// and no framework or test mark.
pub fn is_class_unused(graph: &DependencyGraph, ledger: &UsageLedger, class: &str) -> bool {
    if ledger.is_class_used_by_framework(class) || ledger.is_class_used_by_test(class) {
        return false;
    }

    !graph.incoming_of(class).into_iter().any(|(source, label)| {
        label.is_strong() || ledger.is_import_used(source, class)
    })
}

/// Names of all unused classes, sorted.
pub fn find_unused_classes(graph: &DependencyGraph, ledger: &UsageLedger) -> BTreeSet<String> {
    graph
        .all_classes()
        .filter(|class| is_class_unused(graph, ledger, class))
        .map(str::to_string)
        .collect()
}

/// `class.method` names of all methods without any usage tag, sorted.
pub fn find_unused_methods(ledger: &UsageLedger) -> BTreeSet<String> {
    ledger
        .all_method_usages()
        .filter(|usage| usage.is_unused())
        .map(|usage| usage.full_name())
        .collect()
}

/// Test usage without any tag only shows up as a method mark.
pub fn method_unused_reason(ledger: &UsageLedger, class: &str, method: &str) -> UnusedReason {
    if ledger.is_method_used_by_test(class, method) {
        UnusedReason::OnlyUsedInTest
    } else {
        UnusedReason::NoDependents
    }
}

pub fn unused_class_report(graph: &DependencyGraph, ledger: &UsageLedger) -> Vec<UnusedClass> {
    find_unused_classes(graph, ledger)
        .into_iter()
        .map(|class| UnusedClass {
            id: class.clone(),
            full_name: class,
            reason: UnusedReason::NoDependents,
        })
        .collect()
}

pub fn unused_method_report(ledger: &UsageLedger) -> Vec<UnusedMethod> {
    ledger
        .all_method_usages()
        .filter(|usage| usage.is_unused())
        .map(|usage| UnusedMethod {
            id: usage.full_name(),
            class_name: usage.class_name.clone(),
            method_name: usage.method_name.clone(),
            reason: method_unused_reason(ledger, &usage.class_name, &usage.method_name),
        })
        .collect()
}
