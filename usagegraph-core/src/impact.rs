//! Impact-radius analysis: which classes or methods are affected when a
//! given class or method changes.
//!
//! Both walks follow dependents backwards through [`DependentWalk`]: incoming
//! graph edges for classes, the caller index for methods. Each result maps a
//! dependent to one witness path `[dependent, ..., root]`; the root itself is
//! never part of its own radius.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::common::DependentWalk;
use crate::graph::DependencyGraph;
use crate::model::MethodCallFact;

/// Dependent name to its witness path, root last.
pub type ImpactMap = BTreeMap<String, Vec<String>>;

/// Severity bucket for the size of an impact set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// NONE (0), LOW (1-5), MEDIUM (6-10), HIGH (>10)
    pub fn for_classes(affected: usize) -> Self {
        match affected {
            0 => Self::None,
            1..=5 => Self::Low,
            6..=10 => Self::Medium,
            _ => Self::High,
        }
    }

    /// NONE (0), LOW (1-5), MEDIUM (6-10), HIGH (11-15), CRITICAL (>15)
    pub fn for_methods(affected: usize) -> Self {
        match affected {
            0 => Self::None,
            1..=5 => Self::Low,
            6..=10 => Self::Medium,
            11..=15 => Self::High,
            _ => Self::Critical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an impact query was rooted at a class or a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactKind {
    Class,
    Method,
}

/// Impact set of one root, split into direct and indirect dependents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSummary {
    pub root: String,
    pub kind: ImpactKind,
    /// Dependents with a direct edge (or call) into the root
    pub directly_affected: Vec<String>,
    pub indirectly_affected: Vec<String>,
    pub total_impact: usize,
    pub severity_level: Severity,
    pub paths: ImpactMap,
}

impl ImpactSummary {
    fn new(root: &str, kind: ImpactKind, direct: Vec<String>, paths: ImpactMap) -> Self {
        let direct: BTreeSet<String> = direct.into_iter().collect();
        let indirectly_affected = paths
            .keys()
            .filter(|name| !direct.contains(*name))
            .cloned()
            .collect();
        let total_impact = paths.len();
        let severity_level = match kind {
            ImpactKind::Class => Severity::for_classes(total_impact),
            ImpactKind::Method => Severity::for_methods(total_impact),
        };

        Self {
            root: root.to_string(),
            kind,
            directly_affected: direct.into_iter().collect(),
            indirectly_affected,
            total_impact,
            severity_level,
            paths,
        }
    }
}

/// Backward view over the class graph.
struct ClassDependents<'a>(&'a DependencyGraph);

impl DependentWalk for ClassDependents<'_> {
    type Node = String;

    fn dependents(&self, node: &String) -> Vec<String> {
        self.0
            .dependents_of(node)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

/// Classes affected by a change to `class`. Unknown classes yield an empty map.
pub fn impact_radius(graph: &DependencyGraph, class: &str) -> ImpactMap {
    if !graph.contains_class(class) {
        return ImpactMap::new();
    }

    ClassDependents(graph)
        .witness_paths(class.to_string())
        .into_iter()
        .collect()
}

pub fn summarize_class_impact(graph: &DependencyGraph, class: &str) -> ImpactSummary {
    let direct = graph
        .dependents_of(class)
        .into_iter()
        .map(str::to_string)
        .collect();
    ImpactSummary::new(class, ImpactKind::Class, direct, impact_radius(graph, class))
}

pub fn summarize_method_impact(hierarchy: &CallHierarchy, method: &str) -> ImpactSummary {
    ImpactSummary::new(
        method,
        ImpactKind::Method,
        hierarchy.direct_callers_of(method),
        hierarchy.impact_radius(method),
    )
}

/// Method call hierarchy with a reverse (caller) index.
///
/// Keys are `class.method`. Callee lists are deduplicated and sorted; caller
/// lists follow the sorted caller order of the hierarchy.
#[derive(Debug, Clone, Default)]
pub struct CallHierarchy {
    callees: BTreeMap<String, Vec<String>>,
    callers: HashMap<String, Vec<String>>,
}

impl CallHierarchy {
    pub fn from_facts(facts: &[MethodCallFact]) -> Self {
        let mut sets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for fact in facts {
            sets.entry(fact.caller()).or_default().insert(fact.callee());
        }

        let callees: BTreeMap<String, Vec<String>> = sets
            .into_iter()
            .map(|(caller, set)| (caller, set.into_iter().collect()))
            .collect();

        // Callers are visited in sorted order, so each list comes out sorted
        let mut callers: HashMap<String, Vec<String>> = HashMap::new();
        for (caller, list) in &callees {
            for callee in list {
                callers
                    .entry(callee.clone())
                    .or_default()
                    .push(caller.clone());
            }
        }

        Self { callees, callers }
    }

    pub fn callees(&self) -> &BTreeMap<String, Vec<String>> {
        &self.callees
    }

    pub fn into_callees(self) -> BTreeMap<String, Vec<String>> {
        self.callees
    }

    /// Every caller and callee named in the hierarchy, sorted.
    pub fn methods(&self) -> BTreeSet<&str> {
        self.callees
            .iter()
            .flat_map(|(caller, list)| {
                std::iter::once(caller.as_str()).chain(list.iter().map(String::as_str))
            })
            .collect()
    }

    /// Methods whose callee list contains `method`, sorted.
    pub fn direct_callers_of(&self, method: &str) -> Vec<String> {
        self.callers.get(method).cloned().unwrap_or_default()
    }

    /// Methods affected by a change to `method`.
    pub fn impact_radius(&self, method: &str) -> ImpactMap {
        self.witness_paths(method.to_string()).into_iter().collect()
    }
}

impl DependentWalk for CallHierarchy {
    type Node = String;

    fn dependents(&self, node: &String) -> Vec<String> {
        self.direct_callers_of(node)
    }
}
