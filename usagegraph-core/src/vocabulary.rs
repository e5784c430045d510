//! Fixed vocabularies used by the classification rules.
//!
//! - framework annotations: dependency injection, REST/HTTP, bean validation,
//!   persistence, CDI scopes and events
//! - test annotations: test-runner and lifecycle annotations
//! - built-in types: always-available types qualified with [`BUILTIN_NAMESPACE`]
//! - reserved markup words: EL implicit objects and operators
//!
//! The framework, test and markup sets can be extended from configuration.

use std::collections::HashSet;

/// Annotations that mark a class or method as invoked by a framework.
pub const FRAMEWORK_ANNOTATIONS: &[&str] = &[
    // REST
    "GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH",
    "Path", "Produces", "Consumes", "PathParam", "QueryParam", "FormParam",
    "RestController", "Controller", "RequestMapping", "RequestBody", "ApplicationPath",
    // CDI / injection
    "Autowired", "Inject", "Qualifier", "Named", "Observes",
    "ApplicationScoped", "RequestScoped", "SessionScoped", "ConversationScoped",
    // Bean validation
    "Valid", "NotNull", "NotEmpty", "NotBlank", "Size", "Min", "Max", "Pattern",
    // JPA / persistence
    "Entity", "Stateless", "Stateful", "Singleton", "MessageDriven",
    "Table", "Column", "Id", "GeneratedValue", "ManyToOne", "OneToMany",
    "ManyToMany", "OneToOne", "JoinColumn", "JoinTable", "Transactional",
    // Qualifiers and stereotypes
    "Default", "Alternative", "Model", "Repository", "Service", "Component",
    // Events
    "ObservesAsync", "Reception", "TransactionPhase",
];

/// Annotations that mark a class or method as test code.
pub const TEST_ANNOTATIONS: &[&str] = &[
    "Test", "Before", "After", "BeforeEach", "AfterEach", "BeforeAll", "AfterAll",
    "Deployment", "RunWith", "Rule", "ClassRule", "ExtendWith", "Timeout",
    "DisplayName", "Disabled", "DisabledOnOs", "EnabledOnOs", "Tag",
    "Nested", "ParameterizedTest", "RepeatedTest", "TestFactory",
];

/// Namespace of the always-available built-in types.
pub const BUILTIN_NAMESPACE: &str = "java.lang";

/// Simple names resolved into [`BUILTIN_NAMESPACE`] by the fallback resolver.
pub const BUILTIN_TYPES: &[&str] = &[
    "String", "Object", "Exception", "RuntimeException", "Integer",
    "Boolean", "Long", "Double", "Float", "Byte", "Character",
    "Short", "Void", "Class",
];

/// EL built-in objects and keywords that never name a bean.
pub const RESERVED_MARKUP_WORDS: &[&str] = &[
    "empty", "not", "request", "session", "param", "application", "view", "flash",
    "requestScope", "sessionScope", "applicationScope", "flashScope", "viewScope",
];

/// Strips any qualifier: `javax.inject.Inject` → `Inject`.
pub fn strip_qualifier(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx + 1..],
        _ => name,
    }
}

pub fn is_builtin_type(simple: &str) -> bool {
    BUILTIN_TYPES.contains(&simple)
}

/// Annotation and markup vocabularies in effect for one analysis session.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    framework: HashSet<String>,
    test: HashSet<String>,
    reserved_markup: HashSet<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            framework: to_set(FRAMEWORK_ANNOTATIONS),
            test: to_set(TEST_ANNOTATIONS),
            reserved_markup: to_set(RESERVED_MARKUP_WORDS),
        }
    }
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds extra framework annotation names (simple names).
    pub fn with_framework_annotations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.framework.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds extra test annotation names (simple names).
    pub fn with_test_annotations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.test.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds extra reserved markup words.
    pub fn with_reserved_markup_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_markup.extend(words.into_iter().map(Into::into));
        self
    }

    /// True if the annotation (qualified or simple) is a framework annotation.
    pub fn is_framework_annotation(&self, name: &str) -> bool {
        self.framework.contains(strip_qualifier(name))
    }

    /// True if the annotation (qualified or simple) is a test annotation.
    pub fn is_test_annotation(&self, name: &str) -> bool {
        self.test.contains(strip_qualifier(name))
    }

    pub fn is_reserved_markup_word(&self, word: &str) -> bool {
        self.reserved_markup.contains(word)
    }
}

fn to_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}
