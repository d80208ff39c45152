//! Local YAML validator with convention-based schema discovery
//!
//! Each input file is checked against a JSON Schema (written in YAML)
//! discovered under the schema directory. Discovery tries a flat
//! `{stem}.schema.yaml` first, then a mirror of the file's parent path.

use crate::report::Reporter;
use crate::validate::schema::{parse_yaml_document, validate_document};
use crate::validate::ValidationSummary;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// How a run treats input files that have no discoverable schema.
#[derive(Debug, Clone)]
pub struct YamlCheckOptions {
    /// Directory holding `*.schema.yaml` documents
    pub schema_dir: PathBuf,
    /// Treat a missing schema as a failure instead of a skip
    pub strict: bool,
}

impl Default for YamlCheckOptions {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("schemas"),
            strict: false,
        }
    }
}

/// Locate the schema for `yaml_file`.
///
/// Tries `{schema_dir}/{stem}.schema.yaml`, then mirrors the file's parent
/// directory (relative to `cwd`) under the schema directory:
/// `{schema_dir}/{parent}/{stem}.schema.yaml`.
pub fn find_schema_for_file(yaml_file: &Path, schema_dir: &Path, cwd: &Path) -> Option<PathBuf> {
    let stem = yaml_file.file_stem()?;
    let schema_name = format!("{}.schema.yaml", stem.to_string_lossy());

    let flat = schema_dir.join(&schema_name);
    if flat.is_file() {
        return Some(flat);
    }

    let parent = yaml_file.parent()?;
    // An absolute parent outside cwd would replace schema_dir when joined;
    // such files have no mirrored schema
    let relative = match parent.strip_prefix(cwd) {
        Ok(relative) => relative,
        Err(_) if parent.is_relative() => parent,
        Err(_) => return None,
    };
    let mirrored = schema_dir.join(relative).join(&schema_name);
    if mirrored.is_file() {
        return Some(mirrored);
    }

    None
}

/// Load a schema document written in YAML.
fn load_schema(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read schema {}", path.display()))?;
    parse_yaml_document(&text).with_context(|| format!("schema {} is not valid YAML", path.display()))
}

/// Validate one YAML file against its discovered schema. Returns `false`
/// on a validation failure or a strict-mode missing schema.
fn check_file(
    yaml_file: &Path,
    options: &YamlCheckOptions,
    cwd: &Path,
    summary: &mut ValidationSummary,
    reporter: &dyn Reporter,
) -> bool {
    let name = yaml_file.display().to_string();

    if !yaml_file.is_file() {
        reporter.warn(&format!("{name} not found, skipping"));
        summary.skipped += 1;
        return true;
    }

    let Some(schema_path) = find_schema_for_file(yaml_file, &options.schema_dir, cwd) else {
        if options.strict {
            reporter.error(&format!("No schema found for {name}"));
            summary.failed += 1;
            return false;
        }
        reporter.warn(&format!("No schema found for {name}, skipping"));
        summary.skipped += 1;
        return true;
    };

    summary.processed += 1;

    let schema = match load_schema(&schema_path) {
        Ok(schema) => schema,
        Err(err) => {
            reporter.error(&format!("{err:#}"));
            summary.failed += 1;
            return false;
        }
    };

    let document = match fs::read_to_string(yaml_file)
        .map_err(anyhow::Error::from)
        .and_then(|text| parse_yaml_document(&text))
    {
        Ok(document) => document,
        Err(err) => {
            reporter.error(&format!("Error loading YAML file {name}: {err:#}"));
            summary.failed += 1;
            return false;
        }
    };

    if validate_document(&document, &schema, &name, reporter) {
        true
    } else {
        summary.failed += 1;
        false
    }
}

/// Validate each input file against its convention-discovered schema.
///
/// Fails fast only when the schema directory itself is unusable; per-file
/// problems never stop the remaining files.
pub fn run(files: &[PathBuf], options: &YamlCheckOptions, reporter: &dyn Reporter) -> Result<bool> {
    if !options.schema_dir.is_dir() {
        bail!(
            "Schema directory {} does not exist or is not a directory",
            options.schema_dir.display()
        );
    }

    let cwd = std::env::current_dir().context("could not determine working directory")?;

    let mut summary = ValidationSummary::default();
    let mut all_valid = true;
    for yaml_file in files {
        if !check_file(yaml_file, options, &cwd, &mut summary, reporter) {
            all_valid = false;
        }
    }

    if all_valid {
        reporter.info(&format!(
            "All YAML files are valid ({} checked, {} skipped).",
            summary.processed, summary.skipped
        ));
    } else {
        reporter.error(&format!(
            "{} YAML file(s) failed validation.",
            summary.failed
        ));
    }
    Ok(all_valid)
}
