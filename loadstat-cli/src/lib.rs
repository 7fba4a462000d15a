#![warn(missing_docs)]
//! Loadstat CLI Library
//!
//! Command-line front end: reads `loadstat.toml`, parses the configured result files,
//! links them to the previous build, classifies every run and prints the results.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     loadstat_cli::run()
//! }
//! ```

mod config;
mod pipeline;

pub use config::*;
pub use pipeline::{
    IngestError, Ingested, JsonOutput, PipelineConfig, PipelineOutput, PreviousBuilds,
    classify_set, format_human_output, format_json_output, ingest, parse_files, resolve_files,
    run_pipeline,
};

use clap::{Parser, Subcommand};
use loadstat_logic::Thresholds;
use loadstat_parse::ParserKind;
use loadstat_report::OutputFormat;
use rayon::ThreadPoolBuilder;
use std::io::Write;
use std::path::PathBuf;

/// Loadstat CLI arguments
#[derive(Parser, Debug)]
#[command(name = "loadstat")]
#[command(author, version, about = "Loadstat - load test result analysis")]
pub struct Cli {
    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (discovered from the working directory if not given)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of threads for parallel parsing
    /// 0 = use all available cores (default), 1 = single-threaded
    #[arg(long, short = 'j', default_value = "0", global = true)]
    pub threads: usize,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse result files and classify the build
    Run(RunArgs),
    /// Write a default loadstat.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Arguments of `loadstat run`
#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Result files or glob patterns (replaces the configured parsers)
    pub files: Vec<String>,

    /// Parser for FILES: aggregate, summarizer, jtl-csv, jtl-xml
    #[arg(long)]
    pub parser: Option<ParserKind>,

    /// Previous build's result files or glob patterns, for diffs
    #[arg(long, num_args = 1..)]
    pub previous: Vec<String>,

    /// Error percentage above which the build fails (-1 disables)
    #[arg(long, allow_negative_numbers = true)]
    pub fail: Option<i32>,

    /// Error percentage above which the build is unstable (-1 disables)
    #[arg(long, allow_negative_numbers = true)]
    pub unstable: Option<i32>,

    /// 90th percentile limit in milliseconds
    #[arg(long)]
    pub sla: Option<u64>,

    /// Output format: human, json
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run the Loadstat CLI with the process arguments.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Loadstat CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Logs go to stderr so JSON on stdout stays parseable
    let filter = if cli.verbose {
        "loadstat=debug"
    } else {
        "loadstat=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match &cli.command {
        Commands::Init { force } => init_config(*force),
        Commands::Run(args) => {
            let config = load_config(&cli)?;

            if cli.threads > 0 {
                ThreadPoolBuilder::new()
                    .num_threads(cli.threads)
                    .build_global()
                    .ok();
            }

            let failed = run_build(args, &config)?;
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<LoadstatConfig> {
    match &cli.config {
        Some(path) => LoadstatConfig::load(path).map_err(|e| {
            anyhow::anyhow!("Failed to load configuration {}: {}", path.display(), e)
        }),
        None => Ok(LoadstatConfig::discover().unwrap_or_default()),
    }
}

fn init_config(force: bool) -> anyhow::Result<()> {
    let path = PathBuf::from(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    std::fs::write(&path, LoadstatConfig::default_toml())?;
    println!("Configuration written to: {}", path.display());
    Ok(())
}

/// Layer CLI flags over the configuration file
pub fn build_pipeline_config(
    args: &RunArgs,
    config: &LoadstatConfig,
) -> anyhow::Result<PipelineConfig> {
    let file_thresholds = config.thresholds.to_thresholds();
    let thresholds = Thresholds {
        fail_threshold: args.fail.unwrap_or(file_thresholds.fail_threshold),
        unstable_threshold: args.unstable.unwrap_or(file_thresholds.unstable_threshold),
        sla_millis: args.sla.unwrap_or(file_thresholds.sla_millis),
    };

    let parsers = if args.files.is_empty() {
        let mut parsers = config.parsers.clone();
        if let Some(kind) = args.parser {
            parsers.retain(|p| p.kind == kind);
        }
        if !args.previous.is_empty() {
            for parser in &mut parsers {
                parser.previous = args.previous.clone();
            }
        }
        parsers
    } else {
        let kind = args
            .parser
            .or_else(|| config.parsers.first().map(|p| p.kind))
            .unwrap_or(ParserKind::JtlXml);
        vec![ParserConfig {
            kind,
            files: args.files.clone(),
            previous: args.previous.clone(),
        }]
    };

    if parsers.is_empty() {
        anyhow::bail!(
            "No result files given and no parsers configured in {} (try `loadstat init`)",
            CONFIG_FILE_NAME
        );
    }

    Ok(PipelineConfig {
        thresholds,
        parsers,
    })
}

/// Output format from `--format`, falling back to the configuration file
pub fn output_format(args: &RunArgs, config: &LoadstatConfig) -> anyhow::Result<OutputFormat> {
    args.format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse::<OutputFormat>()
        .map_err(anyhow::Error::msg)
}

/// Run a build and write its output. Returns whether the build failed.
pub fn run_build(args: &RunArgs, config: &LoadstatConfig) -> anyhow::Result<bool> {
    let format = output_format(args, config)?;
    let pipeline_config = build_pipeline_config(args, config)?;

    let output = run_pipeline(&pipeline_config);

    let rendered = match format {
        OutputFormat::Json => format_json_output(&output)?,
        OutputFormat::Human => format_human_output(&output),
    };

    let destination = args.output.as_ref().or(config.output.file.as_ref());
    if let Some(path) = destination {
        let mut file = std::fs::File::create(path)?;
        file.write_all(rendered.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", rendered);
    }

    if output.outcome.is_failure() {
        eprintln!("\nBuild status: {}", output.outcome.verdict());
    }
    Ok(output.outcome.is_failure())
}
