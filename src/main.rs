//! lz-preflight: landing zone preflight checks
//!
//! Scans for failed CloudFormation stacks, verifies the Control Tower
//! landing zone, and validates accelerator configuration files before a
//! deployment is attempted.

use anyhow::Result;
use clap::{Parser, Subcommand};
use lz_preflight::aws::{AwsContext, CloudFormationClient, ControlTowerClient};
use lz_preflight::config::PreflightConfig;
use lz_preflight::report::TracingReporter;
use lz_preflight::validate::schema::SchemaSource;
use lz_preflight::validate::yaml::YamlCheckOptions;
use lz_preflight::{checks, validate};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "lz-preflight")]
#[command(about = "Preflight checks for landing zone deployments")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check for failed stacks and verify the landing zone status
    Check,

    /// Check that all JSON files under the config tree parse
    ValidateJson {
        /// Configuration directory
        #[arg(long, default_value = "config")]
        config_dir: PathBuf,
    },

    /// Validate config files against their published JSON Schemas
    ValidateSchema {
        /// Configuration directory
        #[arg(long, default_value = "config")]
        config_dir: PathBuf,

        /// Accelerator version, branch, or commit to pin schemas to
        #[arg(long, default_value = "main")]
        version: String,

        /// Where to fetch schema documents from
        #[arg(long, value_enum, env = "SCHEMA_SOURCE", default_value = "github")]
        schema_source: SchemaSource,
    },

    /// Validate YAML files against locally discovered schemas
    ValidateYaml {
        /// YAML files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory holding *.schema.yaml documents
        #[arg(long, default_value = "schemas")]
        schema_dir: PathBuf,

        /// Fail when a file has no discoverable schema
        #[arg(long)]
        strict: bool,
    },

    /// Check replacement keys are consistent between registry and configs
    ValidateReplacements {
        /// Configuration directory
        #[arg(long, default_value = "config")]
        config_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&e);
            std::process::exit(1);
        }
    }
}

/// Per-check verdict word for the summary block.
fn verdict(passed: bool) -> &'static str {
    if passed {
        "PASSED"
    } else {
        "FAILED"
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    // Print main error message
    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    // Print error chain (causes)
    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    }
}

async fn run() -> Result<bool> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let reporter = TracingReporter;

    match args.command {
        Command::Check => {
            let config = PreflightConfig::from_env()?;
            info!(
                environment = %config.environment,
                check_region = %config.check_region,
                ct_home_region = %config.ct_home_region,
                stack_prefix = %config.stack_prefix,
                "Running preflight checks"
            );

            let check_ctx = AwsContext::new(&config.check_region).await;
            let cloudformation = CloudFormationClient::from_context(&check_ctx);
            let stacks_ok = checks::stacks::scan(
                &cloudformation,
                &reporter,
                &config.check_region,
                &config.stack_prefix,
            )
            .await;

            let ct_ctx = AwsContext::new(&config.ct_home_region).await;
            let controltower = ControlTowerClient::from_context(&ct_ctx);
            let landing_zone_ok =
                checks::landing_zone::check(&controltower, &reporter, &config.ct_home_region)
                    .await;

            info!("--- Preflight Check Summary ---");
            info!("Failed stack scan: {}", verdict(stacks_ok));
            info!("Landing zone status: {}", verdict(landing_zone_ok));

            let all_ok = stacks_ok && landing_zone_ok;
            if all_ok {
                info!("All preflight checks passed.");
            } else {
                tracing::error!("One or more preflight checks failed.");
            }
            Ok(all_ok)
        }

        Command::ValidateJson { config_dir } => Ok(validate::json::run(&config_dir, &reporter)),

        Command::ValidateSchema {
            config_dir,
            version,
            schema_source,
        } => Ok(validate::schema::run(&config_dir, schema_source, &version, &reporter).await),

        Command::ValidateYaml {
            files,
            schema_dir,
            strict,
        } => {
            let options = YamlCheckOptions { schema_dir, strict };
            validate::yaml::run(&files, &options, &reporter)
        }

        Command::ValidateReplacements { config_dir } => {
            Ok(validate::replacements::check_consistency(
                &config_dir,
                &reporter,
            ))
        }
    }
}
