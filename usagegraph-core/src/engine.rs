//! Classification engine: turns evidence events into graph edges, call
//! facts and usage marks.
//!
//! Rules, per event:
//! - imports add an `IMPORT`/`STATIC_IMPORT` edge and start out unused;
//!   static member imports count as used immediately, wildcards never do
//! - resolved references add `REFERENCE` and mark the matching import used
//! - failed references add `UNRESOLVED_REFERENCE` to a fallback name
//! - annotations from the framework/test vocabularies mark classes and methods
//! - calls append a call fact; resolved ones also tag the callee `CALLED`
//! - markup bindings framework-mark every class whose bean name matches
//!
//! Edges always go through [`DependencyGraph::merge_dependency`], so a label
//! established by stronger evidence is never downgraded by later events.
//!
//! [`DependencyGraph::merge_dependency`]: crate::graph::DependencyGraph::merge_dependency

use tracing::{debug, trace};

use crate::evidence::Evidence;
use crate::model::{default_bean_name, package_name, EdgeLabel, UsageTag, UNRESOLVED_CALLEE};
use crate::resolve::{ImportDecl, ImportScope, Resolution};
use crate::session::AnalysisSession;

impl AnalysisSession {
    /// Applies one evidence event. Never fails; gaps degrade to heuristics.
    pub fn apply(&mut self, event: Evidence) {
        trace!(kind = event.kind(), "applying evidence");
        self.stats.events += 1;

        match event {
            Evidence::ClassDeclared { name } => {
                self.graph.add_class(&name);
            }
            Evidence::ClassAnnotated { name, annotation } => {
                self.graph.add_class(&name);
                self.classify_class_annotation(&name, &annotation);
            }
            Evidence::TestFileMarker { class_name } => {
                self.graph.add_class(&class_name);
                self.ledger.mark_class_used_by_test(&class_name);
            }
            Evidence::ImportSeen {
                class_name,
                import,
                is_static,
                is_wildcard,
            } => self.apply_import(&class_name, ImportDecl::new(&import, is_static, is_wildcard)),
            Evidence::TypeReferenceResolved {
                class_name,
                referenced,
            } => self.apply_type_reference(&class_name, Resolution::Resolved(referenced)),
            Evidence::TypeReferenceUnresolved { class_name, name } => {
                let resolution = self.resolve_fallback(&class_name, &name);
                self.apply_type_reference(&class_name, resolution)
            }
            Evidence::AnnotationReferenceResolved {
                class_name,
                annotation,
            } => {
                self.apply_reference(&class_name, &annotation, EdgeLabel::AnnotationReference);
                self.classify_class_annotation(&class_name, &annotation);
            }
            Evidence::MethodDeclared { class_name, method } => {
                self.graph.add_class(&class_name);
                self.ledger.register_method(&class_name, &method);
            }
            Evidence::MethodAnnotated {
                class_name,
                method,
                annotation,
            } => self.apply_method_annotation(&class_name, &method, &annotation),
            Evidence::MethodCallResolved {
                caller_class,
                caller_method,
                callee_class,
                callee_method,
                is_test_code,
            } => self.apply_resolved_call(
                &caller_class,
                &caller_method,
                &callee_class,
                &callee_method,
                is_test_code,
            ),
            Evidence::MethodCallUnresolved {
                caller_class,
                caller_method,
                callee_method,
                scope,
                is_test_code,
            } => self.apply_unresolved_call(
                &caller_class,
                &caller_method,
                &callee_method,
                scope.as_deref(),
                is_test_code,
            ),
            Evidence::MarkupBeanReferenced { bean, file } => {
                self.apply_markup_binding(&bean, None, file.as_deref())
            }
            Evidence::MarkupMethodReferenced { bean, method, file } => {
                self.apply_markup_binding(&bean, Some(&method), file.as_deref())
            }
        }
    }

    /// Applies events in order.
    pub fn apply_all<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = Evidence>,
    {
        for event in events {
            self.apply(event);
        }
    }

    fn classify_class_annotation(&mut self, class: &str, annotation: &str) {
        if self.vocabulary.is_framework_annotation(annotation) {
            self.ledger.mark_class_used_by_framework(class);
        }
        if self.vocabulary.is_test_annotation(annotation) {
            self.ledger.mark_class_used_by_test(class);
        }
    }

    fn apply_import(&mut self, class: &str, decl: ImportDecl) {
        self.graph.add_class(class);

        let scope = self.scopes.entry(class.to_string()).or_default();
        if !scope.add(decl.clone()) {
            trace!(class, import = %decl.name, "duplicate import ignored");
            return;
        }

        let label = if decl.is_static {
            EdgeLabel::StaticImport
        } else {
            EdgeLabel::Import
        };
        self.graph.merge_dependency(class, &decl.name, label);
        self.ledger.record_import_seen(class, &decl.name);

        if decl.is_wildcard {
            return;
        }

        let referenced_earlier = self
            .referenced
            .get(class)
            .is_some_and(|types| types.contains(&decl.name));
        if decl.is_static || referenced_earlier {
            self.mark_import_as_used(class, &decl.name);
        }
    }

    fn apply_reference(&mut self, class: &str, target: &str, label: EdgeLabel) {
        self.graph.add_class(class);
        self.graph.merge_dependency(class, target, label);
        self.referenced
            .entry(class.to_string())
            .or_default()
            .insert(target.to_string());
        self.mark_import_used_if_declared(class, target);
    }

    fn resolve_fallback(&self, class: &str, name: &str) -> Resolution {
        let own_package = package_name(class);
        match self.scopes.get(class) {
            Some(imports) => imports.fallback(name, own_package),
            None => ImportScope::new().fallback(name, own_package),
        }
    }

    /// Both kinds feed the referenced-types accumulator, so a later import
    /// of the target is marked used whichever kind arrived first.
    fn apply_type_reference(&mut self, class: &str, resolution: Resolution) {
        let label = if resolution.is_resolved() {
            EdgeLabel::Reference
        } else {
            debug!(class, resolution = %resolution, "unresolved type reference");
            self.stats.fallback_references += 1;
            EdgeLabel::UnresolvedReference
        };
        self.apply_reference(class, resolution.name(), label);
    }

    fn apply_method_annotation(&mut self, class: &str, method: &str, annotation: &str) {
        self.graph.add_class(class);
        self.ledger.register_method(class, method);

        if self.vocabulary.is_framework_annotation(annotation) {
            self.ledger.mark_method_used_by_framework(class, method);
            self.ledger.mark_method_usage(class, method, UsageTag::Framework);
        }
        if self.vocabulary.is_test_annotation(annotation) {
            self.ledger.mark_method_used_by_framework(class, method);
            self.ledger.mark_method_usage(class, method, UsageTag::Test);
        }
    }

    fn apply_resolved_call(
        &mut self,
        caller_class: &str,
        caller_method: &str,
        callee_class: &str,
        callee_method: &str,
        is_test_code: bool,
    ) {
        self.graph.add_class(caller_class);
        self.graph.add_class(callee_class);
        self.graph
            .add_method_call(caller_class, caller_method, callee_class, callee_method);
        self.apply_reference(caller_class, callee_class, EdgeLabel::Reference);

        self.ledger
            .mark_method_usage(callee_class, callee_method, UsageTag::Called);

        if is_test_code {
            self.ledger.mark_class_used_by_test(callee_class);
            self.ledger.mark_method_used_by_test(callee_class, callee_method);
            self.ledger
                .mark_method_usage(callee_class, callee_method, UsageTag::Test);
        }
    }

    fn apply_unresolved_call(
        &mut self,
        caller_class: &str,
        caller_method: &str,
        callee_method: &str,
        scope: Option<&str>,
        is_test_code: bool,
    ) {
        self.stats.unresolved_calls += 1;
        self.graph.add_class(caller_class);
        self.graph
            .add_method_call(caller_class, caller_method, UNRESOLVED_CALLEE, callee_method);

        let owner = self.scopes.get(caller_class).and_then(|imports| match scope {
            None => imports.static_owner_of(callee_method),
            Some(scope) => imports.import_for_scope(scope),
        });
        if let Some(owner) = owner.map(str::to_string) {
            debug!(caller_class, callee_method, owner = %owner, "call owner from imports");
            self.apply_reference(caller_class, &owner, EdgeLabel::Reference);
        }

        if is_test_code {
            // Over-approximation: the callee class is unknown, so every known
            // method with that name counts as exercised by tests
            let mut tagged = 0usize;
            for usage in self.ledger.method_usages_mut() {
                if usage.method_name == callee_method {
                    usage.add_usage(UsageTag::Test);
                    tagged += 1;
                }
            }
            trace!(callee_method, tagged, "unresolved test call tagged by name");
        }
    }

    fn apply_markup_binding(&mut self, bean: &str, method: Option<&str>, file: Option<&str>) {
        if self.vocabulary.is_reserved_markup_word(bean) {
            return;
        }

        let matches: Vec<String> = self
            .graph
            .all_classes()
            .filter(|class| default_bean_name(class) == bean)
            .map(str::to_string)
            .collect();

        if matches.is_empty() {
            self.stats.unmatched_beans += 1;
            debug!(bean, file = file.unwrap_or("-"), "no class matches markup bean");
            return;
        }

        for class in &matches {
            self.ledger.mark_class_used_by_framework(class);
            if let Some(method) = method {
                self.ledger.mark_method_used_by_framework(class, method);
                self.ledger
                    .mark_method_usage(class, method, UsageTag::Framework);
            }
        }
        debug!(bean, method = method.unwrap_or("-"), matched = matches.len(), "markup binding");
    }

    fn mark_import_used_if_declared(&mut self, class: &str, name: &str) {
        if self
            .scopes
            .get(class)
            .is_some_and(|imports| imports.has_import(name))
        {
            self.mark_import_as_used(class, name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabulary;

    const A: &str = "com.x.A";
    const B: &str = "com.x.B";

    fn import(class: &str, name: &str) -> Evidence {
        Evidence::ImportSeen {
            class_name: class.to_string(),
            import: name.to_string(),
            is_static: false,
            is_wildcard: false,
        }
    }

    fn resolved(class: &str, referenced: &str) -> Evidence {
        Evidence::TypeReferenceResolved {
            class_name: class.to_string(),
            referenced: referenced.to_string(),
        }
    }

    fn method(class: &str, name: &str) -> Evidence {
        Evidence::MethodDeclared {
            class_name: class.to_string(),
            method: name.to_string(),
        }
    }

    #[test]
    fn test_import_then_reference_upgrades() {
        let mut s = AnalysisSession::new();
        s.apply(import(A, B));
        assert_eq!(s.graph().label_of(A, B), Some(EdgeLabel::Import));
        assert_eq!(s.unused_imports(A), vec![B]);

        s.apply(resolved(A, B));
        assert_eq!(s.graph().label_of(A, B), Some(EdgeLabel::Reference));
        assert_eq!(s.used_imports(A), vec![B]);
        assert!(s.unused_imports(A).is_empty());
    }

    #[test]
    fn test_reference_before_import_marks_import_used() {
        let mut s = AnalysisSession::new();
        s.apply(resolved(A, B));
        s.apply(import(A, B));

        assert_eq!(s.graph().label_of(A, B), Some(EdgeLabel::Reference));
        assert_eq!(s.used_imports(A), vec![B]);
        assert!(s.unused_imports(A).is_empty());
    }

    #[test]
    fn test_reference_without_import_records_nothing() {
        let mut s = AnalysisSession::new();
        s.apply(resolved(A, B));

        assert_eq!(s.graph().label_of(A, B), Some(EdgeLabel::Reference));
        assert!(s.used_imports(A).is_empty());
    }

    #[test]
    fn test_static_import_used_immediately() {
        let mut s = AnalysisSession::new();
        s.apply(Evidence::ImportSeen {
            class_name: A.to_string(),
            import: "org.junit.Assert.assertEquals".to_string(),
            is_static: true,
            is_wildcard: false,
        });

        assert_eq!(
            s.graph().label_of(A, "org.junit.Assert.assertEquals"),
            Some(EdgeLabel::Reference)
        );
        assert_eq!(s.used_imports(A), vec!["org.junit.Assert.assertEquals"]);
    }

    #[test]
    fn test_wildcard_import_never_auto_used() {
        let mut s = AnalysisSession::new();
        s.apply(import(A, "com.lib.*"));
        s.apply(Evidence::TypeReferenceUnresolved {
            class_name: A.to_string(),
            name: "Widget".to_string(),
        });

        assert_eq!(s.graph().label_of(A, "com.lib"), Some(EdgeLabel::Import));
        assert_eq!(
            s.graph().label_of(A, "com.lib.Widget"),
            Some(EdgeLabel::UnresolvedReference)
        );
        assert_eq!(s.unused_imports(A), vec!["com.lib"]);
        assert!(s.used_imports(A).is_empty());
    }

    #[test]
    fn test_unresolved_reference_through_explicit_import() {
        let mut s = AnalysisSession::new();
        s.apply(import(A, "org.lib.Member"));
        s.apply(Evidence::TypeReferenceUnresolved {
            class_name: A.to_string(),
            name: "Member".to_string(),
        });

        assert_eq!(s.used_imports(A), vec!["org.lib.Member"]);
        assert_eq!(
            s.graph().label_of(A, "org.lib.Member"),
            Some(EdgeLabel::Reference)
        );
        assert_eq!(s.stats().fallback_references, 1);
    }

    #[test]
    fn test_unresolved_reference_own_package() {
        let mut s = AnalysisSession::new();
        s.apply(Evidence::TypeReferenceUnresolved {
            class_name: A.to_string(),
            name: "Helper".to_string(),
        });
        assert_eq!(
            s.graph().label_of(A, "com.x.Helper"),
            Some(EdgeLabel::UnresolvedReference)
        );
    }

    #[test]
    fn test_strong_label_never_downgraded() {
        let mut s = AnalysisSession::new();
        s.apply(resolved(A, B));
        s.apply(Evidence::TypeReferenceUnresolved {
            class_name: A.to_string(),
            name: B.to_string(),
        });
        s.apply(import(A, B));

        assert_eq!(s.graph().label_of(A, B), Some(EdgeLabel::Reference));
    }

    #[test]
    fn test_class_annotations() {
        let mut s = AnalysisSession::new();
        s.apply(Evidence::ClassAnnotated {
            name: A.to_string(),
            annotation: "javax.inject.Named".to_string(),
        });
        s.apply(Evidence::ClassAnnotated {
            name: B.to_string(),
            annotation: "RunWith".to_string(),
        });

        assert!(s.is_class_used_by_framework(A));
        assert!(!s.is_class_used_by_test(A));
        assert!(s.is_class_used_by_test(B));
    }

    #[test]
    fn test_annotation_reference_marks_class_and_edge() {
        let mut s = AnalysisSession::new();
        s.apply(import(A, "javax.ws.rs.GET"));
        s.apply(Evidence::AnnotationReferenceResolved {
            class_name: A.to_string(),
            annotation: "javax.ws.rs.GET".to_string(),
        });

        // The used import relabels the annotation edge
        assert_eq!(
            s.graph().label_of(A, "javax.ws.rs.GET"),
            Some(EdgeLabel::Reference)
        );
        assert!(s.is_class_used_by_framework(A));
        assert_eq!(s.used_imports(A), vec!["javax.ws.rs.GET"]);
    }

    #[test]
    fn test_method_annotations() {
        let mut s = AnalysisSession::new();
        s.apply(Evidence::MethodAnnotated {
            class_name: A.to_string(),
            method: "list".to_string(),
            annotation: "GET".to_string(),
        });
        s.apply(Evidence::MethodAnnotated {
            class_name: A.to_string(),
            method: "check".to_string(),
            annotation: "org.junit.Test".to_string(),
        });
        s.apply(Evidence::MethodAnnotated {
            class_name: A.to_string(),
            method: "plain".to_string(),
            annotation: "Override".to_string(),
        });

        let ledger = s.ledger();
        assert!(ledger.method_usage(A, "list").unwrap().has_usage(UsageTag::Framework));
        assert!(ledger.is_method_used_by_framework(A, "list"));
        assert!(ledger.method_usage(A, "check").unwrap().has_usage(UsageTag::Test));
        assert!(ledger.is_method_used_by_framework(A, "check"));
        assert!(ledger.method_usage(A, "plain").unwrap().is_unused());
    }

    #[test]
    fn test_method_annotation_in_both_vocabularies() {
        let vocab = Vocabulary::default().with_test_annotations(["GET"]);
        let mut s = AnalysisSession::with_vocabulary(vocab);
        s.apply(Evidence::MethodAnnotated {
            class_name: A.to_string(),
            method: "list".to_string(),
            annotation: "GET".to_string(),
        });

        let usage = s.ledger().method_usage(A, "list").unwrap();
        assert!(usage.has_usage(UsageTag::Framework));
        assert!(usage.has_usage(UsageTag::Test));
    }

    #[test]
    fn test_resolved_call_in_test_code() {
        let mut s = AnalysisSession::new();
        s.apply(Evidence::MethodCallResolved {
            caller_class: "com.x.ATest".to_string(),
            caller_method: "check".to_string(),
            callee_class: A.to_string(),
            callee_method: "run".to_string(),
            is_test_code: true,
        });

        let usage = s.ledger().method_usage(A, "run").unwrap();
        assert!(usage.has_usage(UsageTag::Called));
        assert!(usage.has_usage(UsageTag::Test));
        assert!(s.is_class_used_by_test(A));
        assert!(s.ledger().is_method_used_by_test(A, "run"));
        assert_eq!(
            s.graph().label_of("com.x.ATest", A),
            Some(EdgeLabel::Reference)
        );
        assert_eq!(s.graph().all_method_calls().len(), 1);
    }

    #[test]
    fn test_unresolved_call_static_owner() {
        let mut s = AnalysisSession::new();
        s.apply(Evidence::ImportSeen {
            class_name: A.to_string(),
            import: "com.util.Strings.isBlank".to_string(),
            is_static: true,
            is_wildcard: false,
        });
        s.apply(Evidence::MethodCallUnresolved {
            caller_class: A.to_string(),
            caller_method: "run".to_string(),
            callee_method: "isBlank".to_string(),
            scope: None,
            is_test_code: false,
        });

        assert_eq!(
            s.graph().label_of(A, "com.util.Strings"),
            Some(EdgeLabel::Reference)
        );
        let fact = &s.graph().all_method_calls()[0];
        assert!(fact.is_unresolved());
        assert_eq!(fact.callee(), "(unresolved).isBlank");
        assert!(s.ledger().method_usage("com.util.Strings", "isBlank").is_none());
    }

    #[test]
    fn test_unresolved_call_scope_import() {
        let mut s = AnalysisSession::new();
        s.apply(import(A, "com.util.Registry"));
        s.apply(Evidence::MethodCallUnresolved {
            caller_class: A.to_string(),
            caller_method: "run".to_string(),
            callee_method: "lookup".to_string(),
            scope: Some("Registry".to_string()),
            is_test_code: false,
        });

        assert_eq!(
            s.graph().label_of(A, "com.util.Registry"),
            Some(EdgeLabel::Reference)
        );
        assert_eq!(s.used_imports(A), vec!["com.util.Registry"]);
    }

    #[test]
    fn test_unresolved_test_call_tags_by_name() {
        let mut s = AnalysisSession::new();
        s.apply(method(A, "save"));
        s.apply(method(B, "save"));
        s.apply(method(B, "load"));
        s.apply(Evidence::MethodCallUnresolved {
            caller_class: "com.x.ATest".to_string(),
            caller_method: "check".to_string(),
            callee_method: "save".to_string(),
            scope: Some("repo".to_string()),
            is_test_code: true,
        });

        let ledger = s.ledger();
        assert!(ledger.method_usage(A, "save").unwrap().has_usage(UsageTag::Test));
        assert!(ledger.method_usage(B, "save").unwrap().has_usage(UsageTag::Test));
        assert!(ledger.method_usage(B, "load").unwrap().is_unused());
    }

    #[test]
    fn test_markup_matches_every_class_with_bean_name() {
        let mut s = AnalysisSession::new();
        s.apply(Evidence::ClassDeclared {
            name: "com.a.MemberController".to_string(),
        });
        s.apply(Evidence::ClassDeclared {
            name: "com.b.MemberController".to_string(),
        });
        s.apply(Evidence::MarkupMethodReferenced {
            bean: "memberController".to_string(),
            method: "register".to_string(),
            file: Some("index.xhtml".to_string()),
        });

        for class in ["com.a.MemberController", "com.b.MemberController"] {
            assert!(s.is_class_used_by_framework(class));
            assert!(s.ledger().is_method_used_by_framework(class, "register"));
            assert!(s
                .ledger()
                .method_usage(class, "register")
                .unwrap()
                .has_usage(UsageTag::Framework));
        }
    }

    #[test]
    fn test_markup_unmatched_and_reserved() {
        let mut s = AnalysisSession::new();
        s.apply(Evidence::MarkupBeanReferenced {
            bean: "ghost".to_string(),
            file: None,
        });
        s.apply(Evidence::MarkupBeanReferenced {
            bean: "empty".to_string(),
            file: None,
        });
        assert_eq!(s.stats().unmatched_beans, 1);
        assert_eq!(s.stats().events, 2);
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocab = Vocabulary::default().with_framework_annotations(["Scheduled"]);
        let mut s = AnalysisSession::with_vocabulary(vocab);
        s.apply(Evidence::ClassAnnotated {
            name: A.to_string(),
            annotation: "Scheduled".to_string(),
        });
        assert!(s.is_class_used_by_framework(A));
    }

    #[test]
    fn test_test_file_marker() {
        let mut s = AnalysisSession::new();
        s.apply(Evidence::TestFileMarker {
            class_name: "com.x.ATest".to_string(),
        });
        assert!(s.is_class_used_by_test("com.x.ATest"));
        assert!(s.graph().contains_class("com.x.ATest"));
    }
}
