//! JSON well-formedness validator
//!
//! Checks that every `.json` file under the subdirectories of the config
//! root parses as valid JSON. No schema is applied.

use crate::report::Reporter;
use std::fs;
use std::path::{Path, PathBuf};

/// Recursively find all `.json` files under the subdirectories of
/// `config_dir`. Files sitting directly in `config_dir` are not included,
/// matching the `config/*/**/*.json` convention. Results are sorted.
pub fn find_json_files(config_dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let Ok(entries) = fs::read_dir(config_dir) else {
        return files;
    };
    for entry in entries.flatten() {
        if entry.path().is_dir() {
            collect_json_files(&entry.path(), &mut files);
        }
    }

    files.sort();
    files
}

fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_json_files(&path, files);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
}

/// Validate a single JSON file. Returns `true` if it parses.
pub fn validate_json_file(path: &Path, reporter: &dyn Reporter) -> bool {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            reporter.error(&format!("ERROR: could not read {}: {err}", path.display()));
            return false;
        }
    };

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(_) => true,
        Err(err) => {
            reporter.error(&format!(
                "ERROR: {} is not valid JSON: {err}",
                path.display()
            ));
            false
        }
    }
}

/// Validate every JSON file under `config_dir`. Returns `true` if all are
/// valid (or none exist).
pub fn run(config_dir: &Path, reporter: &dyn Reporter) -> bool {
    let json_files = find_json_files(config_dir);
    if json_files.is_empty() {
        reporter.info(&format!(
            "No JSON files found under {}/*/.",
            config_dir.display()
        ));
        return true;
    }

    let mut all_valid = true;
    for json_file in &json_files {
        if !validate_json_file(json_file, reporter) {
            all_valid = false;
        }
    }

    if all_valid {
        reporter.info("All JSON files are valid.");
    } else {
        reporter.error("Some JSON files are invalid.");
    }
    all_valid
}
