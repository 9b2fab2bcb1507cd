//! Touchline CLI: tokenize StatsBomb match files and validate token files.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use touchline::batch::{run_batch_with_callback, MatchOutcome};
use touchline::export::{read_csv, write_match, ExportFormat};
use touchline::source::{duplicate_stems, MatchSource};
use touchline::{FeatureLayout, Strictness, TokenizerConfig, Validator};

#[derive(Parser)]
#[command(name = "touchline")]
#[command(about = "Tokenize StatsBomb events into fixed-width feature vectors", long_about = None)]
struct Cli {
    /// Config file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize match event files or URLs, one output file per match
    Tokenize {
        /// Event JSON files or http(s) URLs
        #[arg(required = true)]
        sources: Vec<String>,
        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Output format: csv or jsonl
        #[arg(long)]
        format: Option<ExportFormat>,
        /// Row layout: compact or extended
        #[arg(long)]
        layout: Option<FeatureLayout>,
        /// Worker threads
        #[arg(short = 'j', long)]
        threads: Option<usize>,
        /// Validate every tokenized match
        #[arg(long)]
        validate: bool,
    },
    /// Validate token CSV files
    Validate {
        /// CSV files written by `tokenize`
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// strict, moderate or lenient
        #[arg(long)]
        strictness: Option<Strictness>,
        /// Row layout: compact or extended
        #[arg(long)]
        layout: Option<FeatureLayout>,
        /// Match length in minutes used to read the minute slot
        #[arg(long)]
        max_minute: Option<u64>,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, env.as_deref()))
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => TokenizerConfig::load(path)?,
        None => TokenizerConfig::default(),
    };

    match cli.command {
        Commands::Tokenize {
            sources,
            out,
            format,
            layout,
            threads,
            validate,
        } => {
            if let Some(out) = out {
                config.output_dir = out;
            }
            if let Some(format) = format {
                config.format = format;
            }
            if let Some(layout) = layout {
                config.layout = layout;
            }
            if let Some(threads) = threads {
                config.threads = threads;
            }
            config.validate |= validate;
            tokenize(&sources, &config)
        }
        Commands::Validate {
            files,
            strictness,
            layout,
            max_minute,
        } => {
            if let Some(strictness) = strictness {
                config.validator.strictness = strictness;
            }
            if let Some(layout) = layout {
                config.layout = layout;
            }
            if let Some(max_minute) = max_minute {
                config.validator.max_minute = max_minute;
            }
            validate(&files, &config)
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// `info` (`debug` when verbose) unless `RUST_LOG` carries valid directives.
fn log_filter(verbose: bool, env: Option<&str>) -> EnvFilter {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(env.unwrap_or_default())
}

fn tokenize(sources: &[String], config: &TokenizerConfig) -> anyhow::Result<()> {
    let sources: Vec<MatchSource> = sources.iter().map(|s| MatchSource::parse(s)).collect();
    let clashes = duplicate_stems(&sources);
    if !clashes.is_empty() {
        bail!(
            "several sources would write the same output file: {}",
            clashes.join(", ")
        );
    }
    info!(
        "tokenizing {} matches ({} layout, {} threads) into {}",
        sources.len(),
        config.layout,
        config.threads,
        config.output_dir.display()
    );

    let mut written = 0usize;
    let mut failed = 0usize;
    run_batch_with_callback(&sources, config, |outcome| {
        match handle_outcome(outcome, config) {
            Ok(()) => written += 1,
            Err(e) => {
                error!("{:#}", e);
                failed += 1;
            }
        }
    })?;

    info!("{} matches written, {} failed", written, failed);
    if failed > 0 {
        bail!("{} of {} matches failed", failed, sources.len());
    }
    Ok(())
}

fn handle_outcome(outcome: MatchOutcome, config: &TokenizerConfig) -> anyhow::Result<()> {
    let MatchOutcome {
        source,
        max_minute,
        result,
        ..
    } = outcome;
    let matrix = result.with_context(|| format!("tokenizing {}", source))?;
    let path = write_match(&matrix, &config.output_dir, &source.stem(), config.format)
        .with_context(|| format!("writing {}", source))?;
    info!("{} -> {} ({} rows)", source, path.display(), matrix.len());

    if config.validate {
        let validator =
            Validator::new(config.validator.clone(), config.layout).with_max_minute(max_minute);
        let report = validator.validate_matrix(&matrix);
        info!(
            "{}: {} of {} rows valid, {} errors, score {:.2}",
            source,
            report.valid_rows(),
            report.rows.len(),
            report.total_errors(),
            report.score()
        );
    }
    Ok(())
}

fn validate(files: &[PathBuf], config: &TokenizerConfig) -> anyhow::Result<()> {
    let validator = Validator::new(config.validator.clone(), config.layout);
    let mut invalid = 0usize;
    for path in files {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let matrix = read_csv(BufReader::new(file))
            .with_context(|| format!("reading {}", path.display()))?;
        if matrix.width() != config.layout.width() {
            bail!(
                "{}: rows have {} slots, {} layout expects {}",
                path.display(),
                matrix.width(),
                config.layout,
                config.layout.width()
            );
        }
        let report = validator.validate_matrix(&matrix);
        if !report.is_valid() {
            invalid += 1;
        }
        println!("{}: {}", path.display(), report);
    }
    if invalid > 0 {
        bail!("{} of {} files failed validation", invalid, files.len());
    }
    Ok(())
}
