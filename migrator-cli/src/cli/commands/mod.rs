//! Command handlers

pub mod db;
pub mod fixture;

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::*;

use super::RunArgs;
use crate::config::MigrationConfig;
use crate::migrate::{
    CsvSource, DefaultInflector, DynamicEntity, Migrator, RecordSource, RunOptions, RunSummary,
    Sink,
};

pub use db::handle_db_command;
pub use fixture::handle_fixture_command;

/// Everything a run needs, resolved from the config file and CLI overrides
pub(crate) struct Prepared {
    pub config: MigrationConfig,
    pub source: CsvSource,
    pub migrator: Migrator<DynamicEntity>,
    pub options: RunOptions,
}

pub(crate) fn prepare(args: &RunArgs, debug: bool) -> Result<Prepared> {
    let config = MigrationConfig::load(&args.config)?;
    let builder = config
        .entity_builder(&DefaultInflector)
        .context("Failed to set up entity builder")?;

    let file: PathBuf = match &args.file {
        Some(file) => file.clone(),
        None => config.source_file(),
    };
    let source = CsvSource::new(file).with_options(config.csv_options()?);

    log::debug!(
        "Prepared {} migration from {}",
        builder.type_name(),
        source.describe()
    );

    Ok(Prepared {
        config,
        source,
        migrator: Migrator::new(builder),
        options: RunOptions {
            dry: args.dry,
            debug,
        },
    })
}

pub(crate) fn run<K>(prepared: &Prepared, sink: &mut K) -> Result<RunSummary>
where
    K: Sink<DynamicEntity> + ?Sized,
{
    let summary = prepared
        .migrator
        .run(&prepared.source, sink, prepared.options)
        .with_context(|| format!("Migration of {} failed", prepared.migrator.type_name()))?;
    Ok(summary)
}

/// Human summary on stderr, leaving stdout to dry-run documents
pub(crate) fn print_summary(type_name: &str, summary: &RunSummary, dry: bool) {
    let mode = if dry { " (dry run)".yellow().to_string() } else { String::new() };
    eprintln!(
        "{} {} record(s) read for {}{}",
        "✓".green().bold(),
        summary.records.to_string().cyan(),
        type_name.bold(),
        mode
    );
    if summary.persisted > 0 {
        eprintln!("  persisted:   {}", summary.persisted.to_string().green());
    }
    if summary.skipped > 0 {
        eprintln!("  skipped:     {}", summary.skipped.to_string().yellow());
    }
    if summary.accumulated > 0 {
        eprintln!("  accumulated: {}", summary.accumulated.to_string().cyan());
    }
    if let Some(path) = &summary.written_to {
        eprintln!("  written to:  {}", path.display().to_string().cyan());
    }
}
