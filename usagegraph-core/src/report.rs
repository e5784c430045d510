//! Report building and output - plaintext and JSON.
//!
//! [`CodeReport`] is the frontend data document: classes with their
//! dependencies and imports, methods with usage flags, the call graph,
//! unused code and impact analysis per class and method.

use chrono::{SecondsFormat, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::detect::{UnusedClass, UnusedMethod};
use crate::error::{IoResultExt, UsageGraphResult};
use crate::impact::{self, ImpactKind, ImpactSummary, Severity};
use crate::model::{package_name, simple_name, EdgeLabel, UsageTag};
use crate::session::AnalysisSession;

/// File name used when the report target is a directory.
pub const REPORT_FILE_NAME: &str = "code-data.json";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeReport {
    pub generated_at: String,
    pub summary: ReportSummary,
    pub classes: Vec<ClassEntry>,
    pub methods: Vec<MethodEntry>,
    pub call_graph: CallGraphSection,
    pub unused_code: UnusedCodeSection,
    pub impact_analysis: Vec<ImpactEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub classes: usize,
    pub dependencies: usize,
    pub methods: usize,
    pub method_calls: usize,
    pub unused_classes: usize,
    pub unused_methods: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassEntry {
    pub id: String,
    pub full_name: String,
    pub simple_name: String,
    pub package_name: String,
    pub unused: bool,
    pub framework: bool,
    pub test: bool,
    pub depends_on: Vec<DependencyEntry>,
    pub used_imports: Vec<ImportEntry>,
    pub unused_imports: Vec<ImportEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEntry {
    pub target: String,
    #[serde(rename = "type")]
    pub label: EdgeLabel,
}

/// Imports are always reported with type `IMPORT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub label: EdgeLabel,
}

impl ImportEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: EdgeLabel::Import,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodEntry {
    pub declaring_class: String,
    pub name: String,
    pub full_name: String,
    pub called: bool,
    pub framework: bool,
    pub test: bool,
    pub unused: bool,
    pub calls: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CallGraphSection {
    pub nodes: Vec<CallGraphNode>,
    pub edges: Vec<CallGraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallGraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallGraphEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UnusedCodeSection {
    pub classes: Vec<UnusedClass>,
    pub methods: Vec<UnusedMethod>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(rename = "type")]
    pub kind: ImpactKind,
    pub impact_radius: ImpactRadius,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRadius {
    pub directly_affected: Vec<String>,
    pub indirectly_affected: Vec<String>,
    pub total_impact: usize,
    pub severity_level: Severity,
}

impl From<ImpactSummary> for ImpactEntry {
    fn from(summary: ImpactSummary) -> Self {
        let (class, method) = match summary.kind {
            ImpactKind::Class => (Some(summary.root), None),
            ImpactKind::Method => (None, Some(summary.root)),
        };
        Self {
            class,
            method,
            kind: summary.kind,
            impact_radius: ImpactRadius {
                directly_affected: summary.directly_affected,
                indirectly_affected: summary.indirectly_affected,
                total_impact: summary.total_impact,
                severity_level: summary.severity_level,
            },
        }
    }
}

/// Builds the full report from a session.
///
/// Impact summaries are computed in parallel; only roots with a non-empty
/// impact set are listed.
pub fn build_report(session: &AnalysisSession) -> CodeReport {
    let graph = session.graph();
    let ledger = session.ledger();
    let hierarchy = session.call_hierarchy();
    let unused_classes = session.unused_classes();

    let class_names: Vec<&str> = graph.all_classes().collect();

    let classes: Vec<ClassEntry> = class_names
        .iter()
        .map(|&class| {
            let mut depends_on: Vec<DependencyEntry> = graph
                .dependencies_of(class)
                .into_iter()
                .map(|(target, label)| DependencyEntry {
                    target: target.to_string(),
                    label,
                })
                .collect();
            depends_on.sort_by(|a, b| {
                a.label
                    .as_str()
                    .cmp(b.label.as_str())
                    .then_with(|| a.target.cmp(&b.target))
            });

            ClassEntry {
                id: class.to_string(),
                full_name: class.to_string(),
                simple_name: simple_name(class).to_string(),
                package_name: package_name(class).to_string(),
                unused: unused_classes.contains(class),
                framework: ledger.is_class_used_by_framework(class),
                test: ledger.is_class_used_by_test(class),
                depends_on,
                used_imports: ledger.used_imports(class).into_iter().map(ImportEntry::new).collect(),
                unused_imports: ledger
                    .unused_imports(class)
                    .into_iter()
                    .map(ImportEntry::new)
                    .collect(),
            }
        })
        .collect();

    let methods: Vec<MethodEntry> = ledger
        .all_method_usages()
        .map(|usage| {
            let full_name = usage.full_name();
            MethodEntry {
                declaring_class: usage.class_name.clone(),
                name: usage.method_name.clone(),
                called: usage.has_usage(UsageTag::Called),
                framework: usage.has_usage(UsageTag::Framework),
                test: usage.has_usage(UsageTag::Test),
                unused: usage.is_unused(),
                calls: hierarchy
                    .callees()
                    .get(&full_name)
                    .cloned()
                    .unwrap_or_default(),
                full_name,
            }
        })
        .collect();

    let call_graph = build_call_graph(&methods, hierarchy.callees());

    let mut impact_analysis: Vec<ImpactEntry> = class_names
        .par_iter()
        .map(|class| impact::summarize_class_impact(graph, class))
        .filter(|summary| summary.total_impact > 0)
        .map(ImpactEntry::from)
        .collect();
    let method_entries: Vec<ImpactEntry> = methods
        .par_iter()
        .map(|method| impact::summarize_method_impact(&hierarchy, &method.full_name))
        .filter(|summary| summary.total_impact > 0)
        .map(ImpactEntry::from)
        .collect();
    impact_analysis.extend(method_entries);

    let unused_code = UnusedCodeSection {
        classes: session.unused_class_report(),
        methods: session.unused_method_report(),
    };

    let summary = ReportSummary {
        classes: classes.len(),
        dependencies: graph.edge_count(),
        methods: methods.len(),
        method_calls: graph.all_method_calls().len(),
        unused_classes: unused_code.classes.len(),
        unused_methods: unused_code.methods.len(),
    };

    CodeReport {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        summary,
        classes,
        methods,
        call_graph,
        unused_code,
        impact_analysis,
    }
}

/// Method nodes first (usage order), then any caller or callee the
/// hierarchy adds; one edge per distinct caller/callee pair.
fn build_call_graph(
    methods: &[MethodEntry],
    callees: &std::collections::BTreeMap<String, Vec<String>>,
) -> CallGraphSection {
    let mut section = CallGraphSection::default();
    let mut seen = std::collections::HashSet::new();

    let mut add_node = |id: &str, nodes: &mut Vec<CallGraphNode>| {
        if seen.insert(id.to_string()) {
            nodes.push(CallGraphNode {
                id: id.to_string(),
                kind: "method",
            });
        }
    };

    for method in methods {
        add_node(&method.full_name, &mut section.nodes);
    }

    for (caller, list) in callees {
        for callee in list {
            section.edges.push(CallGraphEdge {
                from: caller.clone(),
                to: callee.clone(),
            });
            add_node(callee, &mut section.nodes);
            add_node(caller, &mut section.nodes);
        }
    }

    section
}

/// Renders the console report. `package_prefix` limits the class sections
/// to classes under that prefix.
pub fn render_plain(report: &CodeReport, package_prefix: Option<&str>) -> String {
    let mut out = String::new();
    if let Err(e) = write_plain(&mut out, report, package_prefix) {
        error!(error = %e, "failed to render plain report");
    }
    out
}

fn write_plain(
    out: &mut String,
    report: &CodeReport,
    package_prefix: Option<&str>,
) -> fmt::Result {
    let in_scope = |name: &str| package_prefix.map_or(true, |p| name.starts_with(p));

    writeln!(
        out,
        "CLASSES ({}), DEPENDENCIES ({}), METHODS ({}), CALLS ({})",
        report.summary.classes,
        report.summary.dependencies,
        report.summary.methods,
        report.summary.method_calls
    )?;

    writeln!(out, "\nCLASS DEPENDENCIES:")?;
    for class in report.classes.iter().filter(|c| in_scope(&c.full_name)) {
        let mut flags = Vec::new();
        if class.framework {
            flags.push("framework");
        }
        if class.test {
            flags.push("test");
        }
        if class.unused {
            flags.push("unused");
        }
        if flags.is_empty() {
            writeln!(out, "- {}", class.full_name)?;
        } else {
            writeln!(out, "- {} [{}]", class.full_name, flags.join(", "))?;
        }

        for dep in &class.depends_on {
            writeln!(out, "    -> {} ({})", dep.target, dep.label)?;
        }
        for import in &class.used_imports {
            writeln!(out, "    used import: {}", import.name)?;
        }
        for import in &class.unused_imports {
            writeln!(out, "    unused import: {}", import.name)?;
        }
    }

    writeln!(out, "\nMETHOD CALL HIERARCHY:")?;
    for method in report.methods.iter().filter(|m| !m.calls.is_empty()) {
        writeln!(out, "- {}", method.full_name)?;
        for callee in &method.calls {
            writeln!(out, "    calls {}", callee)?;
        }
    }

    writeln!(out, "\nMETHOD USAGE TYPES:")?;
    for method in report.methods.iter().filter(|m| in_scope(&m.declaring_class)) {
        let mut tags = Vec::new();
        if method.called {
            tags.push("CALLED");
        }
        if method.framework {
            tags.push("FRAMEWORK");
        }
        if method.test {
            tags.push("TEST");
        }
        let tags = if tags.is_empty() {
            "UNUSED".to_string()
        } else {
            tags.join(", ")
        };
        writeln!(out, "- {}: {}", method.full_name, tags)?;
    }

    let unused = &report.unused_code;
    if unused.classes.is_empty() && unused.methods.is_empty() {
        writeln!(out, "\nNo unused code found.")?;
    } else {
        writeln!(out, "\nUNUSED CLASSES ({}):", unused.classes.len())?;
        for class in unused.classes.iter().filter(|c| in_scope(&c.full_name)) {
            writeln!(out, "- {} ({})", class.full_name, class.reason)?;
        }
        writeln!(out, "\nUNUSED METHODS ({}):", unused.methods.len())?;
        for method in unused.methods.iter().filter(|m| in_scope(&m.class_name)) {
            writeln!(out, "- {} ({})", method.id, method.reason)?;
        }
    }

    Ok(())
}

/// Renders one impact summary with its witness paths.
pub fn render_impact(summary: &ImpactSummary) -> String {
    let mut out = String::new();
    if let Err(e) = write_impact(&mut out, summary) {
        error!(error = %e, "failed to render impact summary");
    }
    out
}

fn write_impact(out: &mut String, summary: &ImpactSummary) -> fmt::Result {
    writeln!(
        out,
        "IMPACT OF {} ({} affected, severity {}):",
        summary.root, summary.total_impact, summary.severity_level
    )?;
    for (dependent, path) in &summary.paths {
        let marker = if summary.directly_affected.contains(dependent) {
            "direct"
        } else {
            "indirect"
        };
        writeln!(out, "- {} [{}]: {}", dependent, marker, path.join(" -> "))?;
    }
    Ok(())
}

/// Prints the report in plain text format.
pub fn print_plain(report: &CodeReport, package_prefix: Option<&str>) {
    print!("{}", render_plain(report, package_prefix));
}

/// Prints the report in JSON format.
///
/// Falls back to the summary alone if full serialization fails.
pub fn print_json(report: &CodeReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!(error = %e, "report serialization failed");
            println!("{{\"summary\": {:?}}}", report.summary);
        }
    }
}

/// Writes the report as pretty JSON. A directory target receives
/// [`REPORT_FILE_NAME`].
pub fn write_report(report: &CodeReport, target: &Path) -> UsageGraphResult<PathBuf> {
    let path = if target.is_dir() {
        target.join(REPORT_FILE_NAME)
    } else {
        target.to_path_buf()
    };

    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json).with_path(&path)?;
    info!(path = %path.display(), "report written");
    Ok(path)
}
