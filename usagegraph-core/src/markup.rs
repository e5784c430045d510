//! Template scanning for expression-language bindings.
//!
//! Finds `#{bean}` and `#{bean.method}` bindings in markup files and turns
//! them into [`Evidence::MarkupBeanReferenced`] and
//! [`Evidence::MarkupMethodReferenced`] events. Reserved EL words and
//! page-local loop variables (`var="row"`) are skipped. Page variables are
//! collected per file.

use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::{IoResultExt, UsageGraphResult};
use crate::evidence::Evidence;
use crate::vocabulary::Vocabulary;

fn bean_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"#\{([a-zA-Z0-9_]+)").expect("Hardcoded regex pattern is valid"))
}

fn method_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"#\{([a-zA-Z0-9_]+)\.([a-zA-Z0-9_]+)\}")
            .expect("Hardcoded regex pattern is valid")
    })
}

fn page_var_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r#"var\s*=\s*"([^"]+)""#).expect("Hardcoded regex pattern is valid"))
}

/// Loop variables declared in the page (`var="..."`).
pub fn page_variables(content: &str) -> HashSet<&str> {
    page_var_regex()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Extracts binding evidence from one template.
///
/// Bean references come first, then method references, each in document
/// order; repeated bindings within the file are reported once.
pub fn scan_markup(content: &str, file: &str, vocabulary: &Vocabulary) -> Vec<Evidence> {
    let page_vars = page_variables(content);
    let skip = |bean: &str| vocabulary.is_reserved_markup_word(bean) || page_vars.contains(bean);

    let mut events = Vec::new();

    let mut beans = HashSet::new();
    for caps in bean_regex().captures_iter(content) {
        let Some(bean) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if skip(bean) || !beans.insert(bean) {
            continue;
        }
        events.push(Evidence::MarkupBeanReferenced {
            bean: bean.to_string(),
            file: Some(file.to_string()),
        });
    }

    let mut methods = HashSet::new();
    for caps in method_regex().captures_iter(content) {
        let (Some(bean), Some(method)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let (bean, method) = (bean.as_str(), method.as_str());
        if skip(bean) || !methods.insert((bean, method)) {
            continue;
        }
        events.push(Evidence::MarkupMethodReferenced {
            bean: bean.to_string(),
            method: method.to_string(),
            file: Some(file.to_string()),
        });
    }

    debug!(file, bindings = events.len(), "scanned markup");
    events
}

/// Reads and scans one template. The file name (not the full path) is
/// recorded on each event.
pub fn scan_markup_file(path: &Path, vocabulary: &Vocabulary) -> UsageGraphResult<Vec<Evidence>> {
    let content = fs::read_to_string(path).with_path(path)?;
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(scan_markup(&content, &file, vocabulary))
}

/// Scans templates in parallel. Unreadable files are logged and skipped.
///
/// Events are concatenated in sorted path order.
pub fn scan_markup_files(paths: &[PathBuf], vocabulary: &Vocabulary) -> Vec<Evidence> {
    let mut sorted: Vec<&PathBuf> = paths.iter().collect();
    sorted.sort();

    let per_file: Vec<Vec<Evidence>> = sorted
        .par_iter()
        .map(|path| match scan_markup_file(path, vocabulary) {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "skipping unreadable markup file");
                Vec::new()
            }
        })
        .collect();

    per_file.into_iter().flatten().collect()
}
