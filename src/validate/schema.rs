//! Remote JSON Schema validator for the accelerator config files
//!
//! Each known config file is rendered (replacement tokens substituted),
//! parsed as YAML, and validated against the JSON Schema published for it.
//! Schemas come from either the pinned GitHub source tree or a schema
//! registry host.

use crate::report::Reporter;
use crate::validate::replacements::{Replacements, REPLACEMENTS_FILE_NAME};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Mapping between config files and their schema document names.
pub const CONFIG_SCHEMAS: &[(&str, &str)] = &[
    ("accounts-config.yaml", "accounts-config.json"),
    ("customizations-config.yaml", "customizations-config.json"),
    ("global-config.yaml", "global-config.json"),
    ("iam-config.yaml", "iam-config.json"),
    ("network-config.yaml", "network-config.json"),
    ("organization-config.yaml", "organization-config.json"),
    ("replacements-config.yaml", "replacements-config.json"),
    ("security-config.yaml", "security-config.json"),
];

const GITHUB_BASE: &str =
    "https://raw.githubusercontent.com/awslabs/landing-zone-accelerator-on-aws";
const GITHUB_SCHEMA_PATH: &str = "source/packages/@aws-accelerator/config/lib/schemas";
const REGISTRY_BASE: &str = "https://json.schemastore.org";

/// Where schema documents are fetched from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SchemaSource {
    /// Raw files from the awslabs source tree, pinned to a version/branch/commit
    #[default]
    Github,
    /// Schema registry host (not version-pinned)
    Registry,
}

/// Build the URL for one schema document.
pub fn schema_url(source: SchemaSource, version: &str, schema_name: &str) -> String {
    match source {
        SchemaSource::Github => {
            format!("{GITHUB_BASE}/{version}/{GITHUB_SCHEMA_PATH}/{schema_name}")
        }
        SchemaSource::Registry => format!("{REGISTRY_BASE}/{schema_name}"),
    }
}

/// Fetch a schema document over HTTPS.
pub async fn fetch_schema(client: &reqwest::Client, url: &str) -> Result<serde_json::Value> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Error fetching schema {url}"))?
        .error_for_status()
        .with_context(|| format!("Error fetching schema {url}"))?;

    response
        .json()
        .await
        .with_context(|| format!("Error parsing schema {url}"))
}

/// Validate a parsed document against a schema, reporting the path and
/// message of every violation. Returns `true` when the document conforms.
pub fn validate_document(
    document: &serde_json::Value,
    schema: &serde_json::Value,
    name: &str,
    reporter: &dyn Reporter,
) -> bool {
    let validator = match jsonschema::validator_for(schema) {
        Ok(validator) => validator,
        Err(err) => {
            reporter.error(&format!("Schema for {name} is not a valid JSON Schema: {err}"));
            return false;
        }
    };

    let mut valid = true;
    for err in validator.iter_errors(document) {
        if valid {
            reporter.error(&format!("{name} validation error:"));
            valid = false;
        }
        reporter.error(&format!("   Path: {}", err.instance_path));
        reporter.error(&format!("   Message: {err}"));
    }

    if valid {
        reporter.info(&format!("{name} is valid"));
    }
    valid
}

/// Parse YAML text into a JSON value for schema validation.
pub fn parse_yaml_document(text: &str) -> Result<serde_json::Value> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    serde_json::to_value(value).context("YAML document is not representable as JSON")
}

/// Validate every known config file under `config_dir` against its remote
/// schema. Returns `true` if all present files are valid; missing files are
/// skipped with a warning.
///
/// Replacement tokens are rendered into a scoped temporary directory before
/// parsing; the directory is removed on every exit path when the guard
/// drops.
pub async fn run(
    config_dir: &Path,
    source: SchemaSource,
    version: &str,
    reporter: &dyn Reporter,
) -> bool {
    let replacements = match load_replacements(config_dir, reporter) {
        Ok(replacements) => replacements,
        Err(err) => {
            reporter.error(&format!("{err:#}"));
            return false;
        }
    };

    let rendered_dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => {
            reporter.error(&format!("Could not create temporary directory: {err}"));
            return false;
        }
    };

    let client = reqwest::Client::new();
    let mut all_valid = true;

    for (config_file, schema_file) in CONFIG_SCHEMAS {
        let config_path = config_dir.join(config_file);
        if !config_path.exists() {
            reporter.warn(&format!("{config_file} not found, skipping"));
            continue;
        }

        let document = match render_config(&config_path, config_file, &replacements, rendered_dir.path()) {
            Ok(document) => document,
            Err(err) => {
                reporter.error(&format!("Error loading YAML file {config_file}: {err:#}"));
                all_valid = false;
                continue;
            }
        };

        let url = schema_url(source, version, schema_file);
        let schema = match fetch_schema(&client, &url).await {
            Ok(schema) => schema,
            Err(err) => {
                reporter.error(&format!("{err:#}"));
                all_valid = false;
                continue;
            }
        };

        if !validate_document(&document, &schema, config_file, reporter) {
            all_valid = false;
        }
    }

    all_valid
}

/// Load the replacements registry if present. A missing registry disables
/// rendering; an unparsable one fails the run.
fn load_replacements(config_dir: &Path, reporter: &dyn Reporter) -> Result<Replacements> {
    let registry_path = config_dir.join(REPLACEMENTS_FILE_NAME);
    if !registry_path.exists() {
        reporter.warn(&format!(
            "{REPLACEMENTS_FILE_NAME} not found, validating without replacement rendering"
        ));
        return Ok(Replacements::default());
    }

    Replacements::load(&registry_path, reporter)
}

/// Render one config file into the temp directory and parse the result.
///
/// The registry itself is never self-substituted.
fn render_config(
    config_path: &Path,
    config_file: &str,
    replacements: &Replacements,
    rendered_dir: &Path,
) -> Result<serde_json::Value> {
    let raw = fs::read_to_string(config_path)
        .with_context(|| format!("could not read {}", config_path.display()))?;

    let rendered = if config_file == REPLACEMENTS_FILE_NAME {
        raw
    } else {
        replacements.substitute(&raw)
    };

    let rendered_path = rendered_dir.join(config_file);
    fs::write(&rendered_path, &rendered)
        .with_context(|| format!("could not write {}", rendered_path.display()))?;

    let text = fs::read_to_string(&rendered_path)
        .with_context(|| format!("could not read {}", rendered_path.display()))?;
    parse_yaml_document(&text)
}
