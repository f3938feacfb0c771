//! recflow CLI: validate jobs and run record batches through them.

mod logging;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

use recflow_blocks::Registry;
use recflow_core::config::{parse_block_list, EngineConfig};
use recflow_core::types::{record_from_value, Record};
use recflow_exec::Engine;
use recflow_planner::parse_yaml_job;

#[derive(Parser)]
#[command(name = "recflow")]
#[command(about = "Declarative record transformations with JMESPath and SQL", long_about = None)]
struct Cli {
    /// Log filter when RUST_LOG is unset (overrides RECFLOW_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a job file without running it
    Validate {
        /// Path to the job file (YAML or JSON)
        #[arg(short, long)]
        job: PathBuf,

        /// Comma-separated block kinds the job may use (overrides config)
        #[arg(long)]
        allow: Option<String>,
    },

    /// Run a batch of records through a job and print the result as JSON
    Run {
        /// Path to the job file (YAML or JSON)
        #[arg(short, long)]
        job: PathBuf,

        /// Records as a JSON array or JSON Lines; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Comma-separated block kinds the job may use (overrides config)
        #[arg(long)]
        allow: Option<String>,

        /// Prepared statements cached per SQL expression (overrides config)
        #[arg(long)]
        sql_statement_cache: Option<usize>,

        /// Print the run manifest to stderr
        #[arg(long)]
        manifest: bool,
    },

    /// List the available block kinds
    Blocks,
}

fn main() {
    let cli = Cli::parse();

    let mut config = EngineConfig::from_env();
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    logging::init(&config.log_level);

    let outcome = match cli.command {
        Commands::Validate { job, allow } => {
            apply_overrides(&mut config, allow.as_deref(), None);
            validate_job(&job, &config).map(|_| println!("✓ Job is valid"))
        }
        Commands::Run {
            job,
            input,
            allow,
            sql_statement_cache,
            manifest,
        } => {
            apply_overrides(&mut config, allow.as_deref(), sql_statement_cache);
            run_job(&job, input.as_deref(), config, manifest)
        }
        Commands::Blocks => {
            for kind in Registry::with_builtins().kinds() {
                println!("{kind}");
            }
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// CLI flags take precedence over environment configuration.
fn apply_overrides(cfg: &mut EngineConfig, allow: Option<&str>, sql_statement_cache: Option<usize>) {
    if let Some(list) = allow {
        cfg.allowed_blocks = Some(parse_block_list(list).unwrap_or_default());
    }
    if let Some(n) = sql_statement_cache {
        cfg.sql_statement_cache = n;
    }
}

fn load_job(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let src = fs::read_to_string(path)?;
    Ok(parse_yaml_job(&src)?)
}

fn validate_job(path: &Path, cfg: &EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let decl = load_job(path)?;
    recflow_planner::validate(&decl, cfg.allow_list())?;
    Ok(())
}

fn run_job(
    job_path: &Path,
    input: Option<&Path>,
    cfg: EngineConfig,
    print_manifest: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let decl = load_job(job_path)?;
    let text = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let batch = parse_records(&text)?;

    let engine = Engine::new(cfg);
    let mut job = engine.compile(&decl)?;
    let ctx = engine.context();
    let (result, manifest) = engine.run_with_manifest(&mut job, batch, &ctx);

    info!(
        run = %manifest.id.0,
        succeeded = manifest.succeeded,
        rejected = manifest.rejected,
        filtered = manifest.filtered,
        "batch finished"
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    if print_manifest {
        eprintln!("{}", serde_json::to_string_pretty(&manifest)?);
    }
    Ok(())
}

/// A JSON array of objects, or one object per line.
fn parse_records(text: &str) -> Result<Vec<Record>, String> {
    let trimmed = text.trim_start();
    let values: Vec<Value> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| format!("input: {e}"))?
    } else {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| format!("input line {}: {e}", n + 1))
            })
            .collect::<Result<_, _>>()?
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            record_from_value(v).ok_or_else(|| format!("input record {i} is not a JSON object"))
        })
        .collect()
}
