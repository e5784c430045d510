//! Configuration loading from usagegraph.toml.

use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{IoResultExt, UsageGraphError, UsageGraphResult};
use crate::scan::DEFAULT_MARKUP_EXTENSIONS;
use crate::vocabulary::Vocabulary;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE: &str = "usagegraph.toml";

/// Main configuration structure for usagegraph.toml.
#[derive(Debug, Deserialize, Default)]
pub struct UsageGraphConfig {
    /// Extensions to the built-in vocabularies.
    pub vocabulary: Option<VocabularyConfig>,
    /// Template scanning.
    pub markup: Option<MarkupConfig>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Extra annotation and markup words, added to the built-in sets.
#[derive(Debug, Deserialize, Default)]
pub struct VocabularyConfig {
    pub framework_annotations: Option<Vec<String>>,
    pub test_annotations: Option<Vec<String>>,
    pub reserved_markup_words: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MarkupConfig {
    /// Template extensions without the dot, e.g. `xhtml`.
    pub extensions: Option<Vec<String>>,
    /// Template directories, relative to the project root.
    pub dirs: Option<Vec<String>>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
    /// Only list classes under this package prefix in plain output.
    pub package_prefix: Option<String>,
}

impl UsageGraphConfig {
    /// Built-in vocabulary extended with the configured words.
    pub fn vocabulary(&self) -> Vocabulary {
        let vocabulary = Vocabulary::default();
        let Some(extra) = &self.vocabulary else {
            return vocabulary;
        };

        vocabulary
            .with_framework_annotations(extra.framework_annotations.iter().flatten().cloned())
            .with_test_annotations(extra.test_annotations.iter().flatten().cloned())
            .with_reserved_markup_words(extra.reserved_markup_words.iter().flatten().cloned())
    }

    /// Configured template extensions, or the defaults.
    pub fn markup_extensions(&self) -> Vec<String> {
        self.markup
            .as_ref()
            .and_then(|m| m.extensions.clone())
            .unwrap_or_else(|| {
                DEFAULT_MARKUP_EXTENSIONS
                    .iter()
                    .map(|e| e.to_string())
                    .collect()
            })
    }

    /// Configured template directories resolved against `root`.
    pub fn markup_dirs(&self, root: &Path) -> Vec<PathBuf> {
        self.markup
            .as_ref()
            .and_then(|m| m.dirs.as_ref())
            .map(|dirs| dirs.iter().map(|d| root.join(d)).collect())
            .unwrap_or_default()
    }

    /// True when the configured output format is JSON.
    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }

    pub fn package_prefix(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.package_prefix.as_deref())
    }
}

/// Loads configuration from usagegraph.toml in `root` if it exists.
pub fn load_config(root: &Path) -> UsageGraphResult<Option<UsageGraphConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Loads configuration from an explicit file.
pub fn load_config_file(path: &Path) -> UsageGraphResult<UsageGraphConfig> {
    let content = fs::read_to_string(path).with_path(path)?;
    toml::from_str(&content).map_err(|e| UsageGraphError::config(path, e.message()))
}
