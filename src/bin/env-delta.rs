//! env-delta - Environment-aware YAML synchronization CLI tool
//!
//! Brings a destination environment directory in line with a source
//! environment while keeping environment-specific values in place.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use env_delta::config::load_from_path;
use env_delta::diff::{compute_diff, DiffResult};
use env_delta::validate::{validate_stop_rules, ValidationResult};
use env_delta::{files, logging, sync};

#[derive(Debug, Parser)]
#[command(name = "env-delta")]
#[command(about = "Synchronize YAML configuration between environments", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "env-delta.yaml")]
    config: PathBuf,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Write even when stop rules report violations
    #[arg(long)]
    force: bool,

    /// Print the diff and violations as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    diff: &'a DiffResult,
    validation: &'a ValidationResult,
}

fn run(cli: &Cli) -> Result<bool> {
    let config = load_from_path(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let source = files::collect(config.source(), &config, true)
        .with_context(|| format!("failed to read source {}", config.source().display()))?;
    let destination = files::collect(config.destination(), &config, false)
        .with_context(|| format!("failed to read destination {}", config.destination().display()))?;

    let diff = compute_diff(&source, &destination, &config)?;
    let validation = validate_stop_rules(&diff.changed_files, &config);

    let mut stdout = io::stdout().lock();
    if cli.json {
        let report = Report {
            diff: &diff,
            validation: &validation,
        };
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        print_summary(&mut stdout, &diff, &validation)?;
    }

    if !validation.is_valid {
        if !cli.force {
            warn!(violations = validation.violations.len(), "stop rules violated, nothing written");
            return Ok(false);
        }
        warn!(violations = validation.violations.len(), "stop rules violated, continuing with --force");
    }

    let plan = sync::plan(&diff, &source, &config)?;
    if cli.dry_run {
        info!(writes = plan.writes.len(), deletes = plan.deletes.len(), "dry run, nothing written");
        return Ok(true);
    }
    plan.apply(config.destination())
        .with_context(|| format!("failed to update {}", config.destination().display()))?;
    Ok(true)
}

fn print_summary(out: &mut impl Write, diff: &DiffResult, validation: &ValidationResult) -> io::Result<()> {
    for path in &diff.added_files {
        writeln!(out, "added:     {}", path)?;
    }
    for changed in &diff.changed_files {
        match &changed.original_path {
            Some(original) => writeln!(out, "changed:   {} (from {})", changed.path, original)?,
            None => writeln!(out, "changed:   {}", changed.path)?,
        }
    }
    for path in &diff.deleted_files {
        writeln!(out, "deleted:   {}", path)?;
    }
    writeln!(
        out,
        "{} added, {} changed, {} deleted, {} unchanged",
        diff.added_files.len(),
        diff.changed_files.len(),
        diff.deleted_files.len(),
        diff.unchanged_files.len()
    )?;
    for violation in &validation.violations {
        writeln!(out, "violation: {}", violation)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
