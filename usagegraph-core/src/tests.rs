//! End-to-end test suite for usagegraph-core.

use crate::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_file(file: &Path, content: &str) {
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

fn setup_temp_project() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("usagegraph_tests")
        .join(format!("{}_{}", timestamp, id));

    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn chain(edges: &[(&str, &str)]) -> AnalysisSession {
    let mut session = AnalysisSession::new();
    for (from, to) in edges {
        session.add_dependency(from, to, EdgeLabel::Reference);
    }
    session
}

// Store: self edges are absorbed
#[test]
fn test_no_self_edges() {
    let mut session = AnalysisSession::new();
    for label in [
        EdgeLabel::Import,
        EdgeLabel::StaticImport,
        EdgeLabel::Reference,
        EdgeLabel::UnresolvedReference,
        EdgeLabel::AnnotationReference,
    ] {
        session.add_dependency("com.x.A", "com.x.A", label);
    }

    assert!(session.dependencies_of("com.x.A").is_empty());
    assert_eq!(session.graph().edge_count(), 0);
}

// Engine: an IMPORT seen after a REFERENCE keeps REFERENCE
#[test]
fn test_label_upgrade_monotonic() {
    let mut session = AnalysisSession::new();
    session.apply(Evidence::TypeReferenceResolved {
        class_name: "com.x.A".to_string(),
        referenced: "com.x.B".to_string(),
    });
    session.apply(Evidence::ImportSeen {
        class_name: "com.x.A".to_string(),
        import: "com.x.B".to_string(),
        is_static: false,
        is_wildcard: false,
    });
    session.apply(Evidence::TypeReferenceUnresolved {
        class_name: "com.x.A".to_string(),
        name: "com.x.B".to_string(),
    });

    assert_eq!(
        session.dependencies_of("com.x.A"),
        vec![("com.x.B", EdgeLabel::Reference)]
    );
}

#[test]
fn test_idempotent_marking() {
    let mut once = AnalysisSession::new();
    once.mark_class_used_by_framework("com.x.X");

    let mut twice = AnalysisSession::new();
    twice.mark_class_used_by_framework("com.x.X");
    twice.mark_class_used_by_framework("com.x.X");

    assert_eq!(format!("{:?}", once.ledger()), format!("{:?}", twice.ledger()));
}

#[test]
fn test_unused_class_correctness() {
    let session = chain(&[("A", "B")]);
    let unused = session.unused_classes();

    assert!(unused.contains("A"));
    assert!(!unused.contains("B"));
}

#[test]
fn test_unused_method_correctness() {
    let mut session = AnalysisSession::new();
    session.mark_method_usage("A", "m1", UsageTag::Called);
    session.ledger_register("B", "m2");

    let unused = session.unused_methods();
    assert!(!unused.contains("A.m1"));
    assert!(unused.contains("B.m2"));
}

#[test]
fn test_impact_cycle_safety() {
    // B depends on A, C on B, A on C
    let session = chain(&[("B", "A"), ("C", "B"), ("A", "C")]);
    let radius = session.impact_radius("A");

    assert_eq!(radius.keys().cloned().collect::<Vec<_>>(), vec!["B", "C"]);
    assert_eq!(radius["C"].last().map(String::as_str), Some("A"));
}

#[test]
fn test_severity_boundaries_from_graph() {
    for (size, expected) in [
        (0, Severity::None),
        (1, Severity::Low),
        (5, Severity::Low),
        (6, Severity::Medium),
        (10, Severity::Medium),
        (11, Severity::High),
    ] {
        let mut session = AnalysisSession::new();
        session.add_class("root");
        for i in 0..size {
            session.add_dependency(&format!("dep{}", i), "root", EdgeLabel::Reference);
        }

        let summary = session.class_impact_summary("root");
        assert_eq!(summary.total_impact, size);
        assert_eq!(summary.severity_level, expected, "size {}", size);
    }
}

#[test]
fn test_direct_vs_indirect() {
    let session = chain(&[("B", "A"), ("C", "B")]);
    let summary = session.class_impact_summary("A");

    assert_eq!(summary.directly_affected, vec!["B"]);
    assert_eq!(summary.indirectly_affected, vec!["C"]);
    assert_eq!(summary.paths["C"], vec!["C", "B", "A"]);
}

#[test]
fn test_end_to_end_scenario() {
    let mut session = AnalysisSession::new();
    session.add_class("com.x.A");
    session.add_class("com.x.B");
    session.add_dependency("com.x.A", "com.x.B", EdgeLabel::Import);
    session.ledger_seen("com.x.A", "com.x.B");
    session.add_method_call("com.x.A", "m", "com.x.B", "n");
    session.mark_import_as_used("com.x.A", "com.x.B");

    assert_eq!(
        session.graph().label_of("com.x.A", "com.x.B"),
        Some(EdgeLabel::Reference)
    );
    assert_eq!(session.used_imports("com.x.A"), vec!["com.x.B"]);
    assert!(session.unused_imports("com.x.A").is_empty());

    let hierarchy = session.method_call_hierarchy();
    assert_eq!(hierarchy.len(), 1);
    assert_eq!(hierarchy["com.x.A.m"], vec!["com.x.B.n"]);
}

#[test]
fn test_unknown_roots_empty() {
    let session = chain(&[("B", "A")]);
    assert!(session.impact_radius("Nope").is_empty());
    assert!(session.method_impact_radius("Nope.m").is_empty());
    assert!(session.direct_callers_of("Nope.m").is_empty());
}

#[test]
fn test_method_impact_via_session() {
    let mut session = AnalysisSession::new();
    session.add_method_call("C", "c", "B", "b");
    session.add_method_call("B", "b", "A", "a");
    session.add_method_call("D", "d", "A", "a");
    session.add_method_call("B", "b", "A", "a");

    assert_eq!(session.direct_callers_of("A.a"), vec!["B.b", "D.d"]);

    let radius = session.method_impact_radius("A.a");
    assert_eq!(radius.len(), 3);
    assert_eq!(radius["C.c"], vec!["C.c", "B.b", "A.a"]);

    let summary = session.method_impact_summary("A.a");
    assert_eq!(summary.directly_affected, vec!["B.b", "D.d"]);
    assert_eq!(summary.indirectly_affected, vec!["C.c"]);
}

fn import_seen(class: &str, import: &str, is_static: bool) -> Evidence {
    Evidence::ImportSeen {
        class_name: class.to_string(),
        import: import.to_string(),
        is_static,
        is_wildcard: false,
    }
}

fn unresolved_type(class: &str, name: &str) -> Evidence {
    Evidence::TypeReferenceUnresolved {
        class_name: class.to_string(),
        name: name.to_string(),
    }
}

// Engine: a reference and its import give the same result in either order
#[test]
fn test_unresolved_reference_order_independent() {
    let declared = || {
        vec![
            Evidence::ClassDeclared {
                name: "com.x.A".to_string(),
            },
            Evidence::ClassDeclared {
                name: "org.lib.Member".to_string(),
            },
        ]
    };

    let mut import_first = AnalysisSession::new();
    import_first.apply_all(declared());
    import_first.apply(import_seen("com.x.A", "org.lib.Member", false));
    import_first.apply(unresolved_type("com.x.A", "org.lib.Member"));

    let mut reference_first = AnalysisSession::new();
    reference_first.apply_all(declared());
    reference_first.apply(unresolved_type("com.x.A", "org.lib.Member"));
    reference_first.apply(import_seen("com.x.A", "org.lib.Member", false));

    for session in [&import_first, &reference_first] {
        assert_eq!(
            session.dependencies_of("com.x.A"),
            vec![("org.lib.Member", EdgeLabel::Reference)]
        );
        assert_eq!(session.used_imports("com.x.A"), vec!["org.lib.Member"]);
        assert!(session.unused_imports("com.x.A").is_empty());
    }
    assert_eq!(import_first.unused_classes(), reference_first.unused_classes());
    assert!(!reference_first.unused_classes().contains("org.lib.Member"));
}

// Engine: later weak evidence never weakens a strong edge
#[test]
fn test_strong_edges_survive_later_evidence() {
    let mut session = AnalysisSession::new();

    // Static member import is used on sight
    session.apply(import_seen("com.x.A", "com.u.Util.helper", true));
    session.apply(Evidence::MethodCallUnresolved {
        caller_class: "com.x.A".to_string(),
        caller_method: "run".to_string(),
        callee_method: "helper".to_string(),
        scope: None,
        is_test_code: false,
    });
    session.apply(unresolved_type("com.x.A", "com.u.Util"));

    assert_eq!(
        session.graph().label_of("com.x.A", "com.u.Util.helper"),
        Some(EdgeLabel::Reference)
    );
    assert_eq!(
        session.graph().label_of("com.x.A", "com.u.Util"),
        Some(EdgeLabel::Reference)
    );

    session.apply(Evidence::AnnotationReferenceResolved {
        class_name: "com.x.A".to_string(),
        annotation: "com.x.Audited".to_string(),
    });
    session.apply(unresolved_type("com.x.A", "com.x.Audited"));
    assert_eq!(
        session.graph().label_of("com.x.A", "com.x.Audited"),
        Some(EdgeLabel::AnnotationReference)
    );

    session.apply(import_seen("com.x.A", "com.x.Audited", false));
    session.apply(Evidence::MethodCallUnresolved {
        caller_class: "com.x.A".to_string(),
        caller_method: "run".to_string(),
        callee_method: "check".to_string(),
        scope: Some("Audited".to_string()),
        is_test_code: false,
    });
    assert_eq!(
        session.graph().label_of("com.x.A", "com.x.Audited"),
        Some(EdgeLabel::Reference)
    );

    let unused = session.unused_classes();
    assert!(!unused.contains("com.u.Util"));
    assert!(!unused.contains("com.x.Audited"));
}

// Full pipeline: evidence files on disk, markup templates, report
#[test]
fn test_pipeline_from_files() {
    let root = setup_temp_project();
    write_file(
        &root.join("evidence/main.jsonl"),
        r#"# main sources
{"kind":"ClassDeclared","name":"org.demo.controller.MemberController"}
{"kind":"ClassAnnotated","name":"org.demo.controller.MemberController","annotation":"Model"}
{"kind":"ImportSeen","className":"org.demo.controller.MemberController","import":"org.demo.service.MemberRegistration"}
{"kind":"ImportSeen","className":"org.demo.controller.MemberController","import":"java.util.logging.Logger"}
{"kind":"TypeReferenceResolved","className":"org.demo.controller.MemberController","referenced":"org.demo.service.MemberRegistration"}
{"kind":"MethodDeclared","className":"org.demo.controller.MemberController","method":"register"}
{"kind":"MethodDeclared","className":"org.demo.controller.MemberController","method":"unusedHelper"}
{"kind":"MethodCallResolved","callerClass":"org.demo.controller.MemberController","callerMethod":"register","calleeClass":"org.demo.service.MemberRegistration","calleeMethod":"register"}
{"kind":"ClassDeclared","name":"org.demo.service.MemberRegistration"}
{"kind":"MethodDeclared","className":"org.demo.service.MemberRegistration","method":"register"}
{"kind":"ClassDeclared","name":"org.demo.util.Orphan"}
"#,
    );
    write_file(
        &root.join("evidence/test.jsonl"),
        r#"{"kind":"TestFileMarker","className":"org.demo.test.MemberRegistrationTest"}
{"kind":"MethodCallUnresolved","callerClass":"org.demo.test.MemberRegistrationTest","callerMethod":"testRegister","calleeMethod":"unusedHelper","scope":"controller","isTestCode":true}
this line is not json
"#,
    );
    write_file(
        &root.join("webapp/index.xhtml"),
        r##"<h:commandButton action="#{memberController.register}"/>"##,
    );

    let evidence_files = gather_evidence_files(&root.join("evidence")).unwrap();
    assert_eq!(evidence_files.len(), 2);
    let events = load_evidence_files(&evidence_files).unwrap();
    assert_eq!(events.len(), 13);

    let mut session = AnalysisSession::new();
    session.apply_all(events);

    let markup_files = gather_markup_files(&root.join("webapp"), &["xhtml".to_string()]).unwrap();
    let vocabulary = session.vocabulary().clone();
    session.apply_all(scan_markup_files(&markup_files, &vocabulary));

    let controller = "org.demo.controller.MemberController";
    let service = "org.demo.service.MemberRegistration";

    assert!(session.is_class_used_by_framework(controller));
    assert_eq!(session.used_imports(controller), vec![service]);
    assert_eq!(session.unused_imports(controller), vec!["java.util.logging.Logger"]);

    let register = session.ledger().method_usage(controller, "register").unwrap();
    assert!(register.has_usage(UsageTag::Framework));

    // Tagged TEST by the name-only heuristic
    let helper = session.ledger().method_usage(controller, "unusedHelper").unwrap();
    assert!(helper.has_usage(UsageTag::Test));

    let unused = session.unused_classes();
    assert!(unused.contains("org.demo.util.Orphan"));
    assert!(!unused.contains(service));
    assert!(!unused.contains(controller));
    assert!(!unused.contains("org.demo.test.MemberRegistrationTest"));
    // The Logger import is never proven used
    assert!(unused.contains("java.util.logging.Logger"));

    let report = build_report(&session);
    let out = root.join("out");
    fs::create_dir_all(&out).unwrap();
    let written = write_report(&report, &out).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(written).unwrap()).unwrap();
    assert!(json["impactAnalysis"]
        .as_array()
        .unwrap()
        .iter()
        .any(|entry| entry["class"] == service));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_config_vocabulary_drives_engine() {
    let root = setup_temp_project();
    write_file(
        &root.join(CONFIG_FILE),
        "[vocabulary]\nframework_annotations = [\"Scheduled\"]\n",
    );

    let config = load_config(&root).unwrap().unwrap_or_default();
    let mut session = AnalysisSession::with_vocabulary(config.vocabulary());
    session.apply(Evidence::MethodAnnotated {
        class_name: "com.x.Jobs".to_string(),
        method: "nightly".to_string(),
        annotation: "org.springframework.scheduling.annotation.Scheduled".to_string(),
    });

    assert!(session.unused_methods().is_empty());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_only_used_in_test_reason() {
    let mut session = AnalysisSession::new();
    session.ledger_register("com.x.A", "helper");
    session.mark_method_used_by_test("com.x.A", "helper");

    let report = session.unused_method_report();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].reason, UnusedReason::OnlyUsedInTest);
}

// Small helpers to reach ledger-only operations through the session
trait SessionTestExt {
    fn ledger_register(&mut self, class: &str, method: &str);
    fn ledger_seen(&mut self, class: &str, import: &str);
}

impl SessionTestExt for AnalysisSession {
    fn ledger_register(&mut self, class: &str, method: &str) {
        self.ledger.register_method(class, method);
    }

    fn ledger_seen(&mut self, class: &str, import: &str) {
        self.ledger.record_import_seen(class, import);
    }
}
