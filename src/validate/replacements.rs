//! Replacement registry parsing, token rendering, and consistency checking
//!
//! The replacements registry (`replacements-config.yaml`) declares the
//! `{{ key }}` placeholders available to the other config files. This module
//! parses the registry, renders tokens into raw text, and checks that the
//! referenced and declared key sets match exactly.

use crate::report::Reporter;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// File name of the replacements registry inside the config directory.
pub const REPLACEMENTS_FILE_NAME: &str = "replacements-config.yaml";

/// `{{ key }}` with an alphanumeric/underscore key and arbitrary internal
/// whitespace.
static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("valid pattern"));

/// Declared replacement keys and their literal values.
#[derive(Debug, Clone, Default)]
pub struct Replacements {
    values: BTreeMap<String, String>,
}

impl Replacements {
    /// Parse the registry file.
    ///
    /// Expects a top-level `globalReplacements` list of mappings with a
    /// `key` entry. Entries without a `key` are reported and skipped; a
    /// missing or ill-shaped document is an error.
    pub fn load(path: &Path, reporter: &dyn Reporter) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Error reading {}", path.display()))?;
        let doc: serde_yaml::Value = serde_yaml::from_str(&text)
            .with_context(|| format!("Error parsing {}", path.display()))?;

        let Some(entries) = doc.get("globalReplacements").and_then(|v| v.as_sequence()) else {
            bail!(
                "{} does not contain 'globalReplacements' as a list.",
                path.display()
            );
        };

        let mut values = BTreeMap::new();
        for entry in entries {
            let Some(key) = entry.get("key").and_then(|k| k.as_str()) else {
                reporter.warn(&format!(
                    "Skipping invalid entry in 'globalReplacements': {}",
                    serde_yaml::to_string(entry).unwrap_or_default().trim_end()
                ));
                continue;
            };
            let value = entry
                .get("value")
                .map(value_as_string)
                .unwrap_or_default();
            values.insert(key.to_string(), value);
        }

        Ok(Self { values })
    }

    /// The set of declared key names.
    pub fn declared_keys(&self) -> BTreeSet<String> {
        self.values.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every `{{ key }}` token whose key is declared with its
    /// literal value. Undeclared tokens are left untouched. This operates on
    /// raw text, before any parsing.
    pub fn substitute(&self, text: &str) -> String {
        KEY_PATTERN
            .replace_all(text, |caps: &regex::Captures<'_>| {
                match self.values.get(&caps[1]) {
                    Some(value) => value.clone(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

/// Render a scalar YAML value as the string form used for substitution.
fn value_as_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim_end()
            .to_string(),
    }
}

/// Collect every `{{ key }}` name referenced by the `.yaml` files directly
/// inside `config_dir`, excluding the registry itself. Unreadable files are
/// reported and skipped.
pub fn extract_referenced_keys(config_dir: &Path, reporter: &dyn Reporter) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();

    let Ok(entries) = fs::read_dir(config_dir) else {
        return keys;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "yaml") {
            continue;
        }
        if path.file_name().is_some_and(|n| n == REPLACEMENTS_FILE_NAME) {
            continue;
        }

        match fs::read_to_string(&path) {
            Ok(text) => {
                for caps in KEY_PATTERN.captures_iter(&text) {
                    keys.insert(caps[1].to_string());
                }
            }
            Err(err) => {
                reporter.error(&format!("Error reading {}: {err}", path.display()));
            }
        }
    }

    keys
}

/// Result of comparing referenced keys against declared keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consistency {
    /// Referenced but not declared
    pub missing: BTreeSet<String>,
    /// Declared but never referenced
    pub unused: BTreeSet<String>,
}

impl Consistency {
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.unused.is_empty()
    }
}

/// Compute the two-way difference between referenced and declared keys.
pub fn consistency(referenced: &BTreeSet<String>, declared: &BTreeSet<String>) -> Consistency {
    Consistency {
        missing: referenced.difference(declared).cloned().collect(),
        unused: declared.difference(referenced).cloned().collect(),
    }
}

/// Check that every referenced key is declared and every declared key is
/// referenced. Both offending sets are reported in full, sorted.
pub fn check_consistency(config_dir: &Path, reporter: &dyn Reporter) -> bool {
    let registry_path = config_dir.join(REPLACEMENTS_FILE_NAME);
    let replacements = match Replacements::load(&registry_path, reporter) {
        Ok(replacements) => replacements,
        Err(err) => {
            reporter.error(&format!("{err:#}"));
            return false;
        }
    };

    let referenced = extract_referenced_keys(config_dir, reporter);
    let declared = replacements.declared_keys();
    let result = consistency(&referenced, &declared);

    if !result.missing.is_empty() {
        reporter.error(
            "The following replacement keys are referenced in config/*.yaml but NOT defined \
             in replacements-config.yaml:",
        );
        for key in &result.missing {
            reporter.error(&format!("  - {key}"));
        }
    }
    if !result.unused.is_empty() {
        reporter.error(
            "The following keys are defined in replacements-config.yaml but NOT referenced \
             in any config/*.yaml:",
        );
        for key in &result.unused {
            reporter.error(&format!("  - {key}"));
        }
    }

    if result.is_consistent() {
        reporter.info("All replacement keys are valid and in sync.");
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CapturedReport, Severity};
    use tempfile::TempDir;

    fn keys(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    const REGISTRY: &str = "\
globalReplacements:
  - key: AcceleratorPrefix
    type: String
    value: AWSAccelerator
  - key: LogRetention
    type: Number
    value: 365
";

    #[test]
    fn consistency_of_overlapping_sets() {
        let result = consistency(&keys(&["A", "B"]), &keys(&["B", "C"]));
        assert_eq!(result.missing, keys(&["A"]));
        assert_eq!(result.unused, keys(&["C"]));
        assert!(!result.is_consistent());
    }

    #[test]
    fn consistency_is_symmetric() {
        let referenced = keys(&["A", "B"]);
        let declared = keys(&["B", "C"]);

        let forward = consistency(&referenced, &declared);
        let swapped = consistency(&declared, &referenced);

        assert_eq!(forward.missing, swapped.unused);
        assert_eq!(forward.unused, swapped.missing);
    }

    #[test]
    fn matching_sets_are_consistent() {
        let result = consistency(&keys(&["A", "B"]), &keys(&["A", "B"]));
        assert!(result.is_consistent());
    }

    #[test]
    fn token_whitespace_is_ignored() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "global-config.yaml", "name: '{{  AcceleratorPrefix  }}'\n");
        let report = CapturedReport::new();

        let referenced = extract_referenced_keys(dir.path(), &report);
        assert_eq!(referenced, keys(&["AcceleratorPrefix"]));
    }

    #[test]
    fn registry_file_is_not_scanned_for_references() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), REPLACEMENTS_FILE_NAME, "sample: '{{ SelfRef }}'\n");
        write(dir.path(), "network-config.yaml", "cidr: 10.0.0.0/16\n");
        let report = CapturedReport::new();

        let referenced = extract_referenced_keys(dir.path(), &report);
        assert!(referenced.is_empty());
    }

    #[test]
    fn load_registry_collects_keys_and_values() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), REPLACEMENTS_FILE_NAME, REGISTRY);
        let report = CapturedReport::new();

        let replacements =
            Replacements::load(&dir.path().join(REPLACEMENTS_FILE_NAME), &report).unwrap();
        assert_eq!(
            replacements.declared_keys(),
            keys(&["AcceleratorPrefix", "LogRetention"])
        );
        assert_eq!(
            replacements.substitute("{{ AcceleratorPrefix }}-{{ LogRetention }}"),
            "AWSAccelerator-365"
        );
    }

    #[test]
    fn load_registry_skips_invalid_entries() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            REPLACEMENTS_FILE_NAME,
            "globalReplacements:\n  - value: orphaned\n  - key: Valid\n    value: ok\n",
        );
        let report = CapturedReport::new();

        let replacements =
            Replacements::load(&dir.path().join(REPLACEMENTS_FILE_NAME), &report).unwrap();
        assert_eq!(replacements.declared_keys(), keys(&["Valid"]));
        assert!(report.contains(Severity::Warning, "Skipping invalid entry"));
    }

    #[test]
    fn load_registry_rejects_wrong_shape() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), REPLACEMENTS_FILE_NAME, "something: else\n");
        let report = CapturedReport::new();

        let result = Replacements::load(&dir.path().join(REPLACEMENTS_FILE_NAME), &report);
        assert!(result.is_err());
    }

    #[test]
    fn substitute_leaves_undeclared_tokens() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), REPLACEMENTS_FILE_NAME, REGISTRY);
        let report = CapturedReport::new();
        let replacements =
            Replacements::load(&dir.path().join(REPLACEMENTS_FILE_NAME), &report).unwrap();

        assert_eq!(
            replacements.substitute("{{ AcceleratorPrefix }} and {{ Unknown }}"),
            "AWSAccelerator and {{ Unknown }}"
        );
    }

    #[test]
    fn check_consistency_reports_both_sets_in_full() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), REPLACEMENTS_FILE_NAME, REGISTRY);
        write(
            dir.path(),
            "global-config.yaml",
            "prefix: '{{ AcceleratorPrefix }}'\nemail: '{{ SecurityEmail }}'\nowner: '{{ OwnerTag }}'\n",
        );
        let report = CapturedReport::new();

        assert!(!check_consistency(dir.path(), &report));
        assert!(report.contains(Severity::Error, "- OwnerTag"));
        assert!(report.contains(Severity::Error, "- SecurityEmail"));
        assert!(report.contains(Severity::Error, "- LogRetention"));
    }

    #[test]
    fn check_consistency_passes_when_in_sync() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), REPLACEMENTS_FILE_NAME, REGISTRY);
        write(
            dir.path(),
            "global-config.yaml",
            "prefix: '{{ AcceleratorPrefix }}'\nretention: '{{ LogRetention }}'\n",
        );
        let report = CapturedReport::new();

        assert!(check_consistency(dir.path(), &report));
        assert!(report.contains(Severity::Info, "valid and in sync"));
    }

    #[test]
    fn missing_registry_fails() {
        let dir = TempDir::new().unwrap();
        let report = CapturedReport::new();

        assert!(!check_consistency(dir.path(), &report));
        assert!(report.contains(Severity::Error, "Error reading"));
    }
}
