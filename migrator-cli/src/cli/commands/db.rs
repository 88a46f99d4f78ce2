//! `migrator db` - persist every built entity

use anyhow::Result;

use super::{prepare, print_summary, run};
use crate::cli::DbArgs;
use crate::migrate::{CommitSink, DynamicEntity, RunSummary};
use crate::store::SqliteStore;

pub fn handle_db_command(args: DbArgs, debug: bool) -> Result<RunSummary> {
    let prepared = prepare(&args.run, debug)?;
    let type_name = prepared.migrator.type_name().to_string();

    let summary = if prepared.options.dry {
        // Nothing is saved, so leave the database untouched
        let mut sink = CommitSink::new(|_: &DynamicEntity| -> anyhow::Result<()> { Ok(()) });
        run(&prepared, &mut sink)?
    } else {
        let path = args
            .database
            .clone()
            .unwrap_or_else(|| prepared.config.database_path());
        log::info!("Saving {} entities to {}", type_name, path.display());
        let store = SqliteStore::open(&path)?;
        let mut sink = CommitSink::new(store);
        run(&prepared, &mut sink)?
    };

    print_summary(&type_name, &summary, prepared.options.dry);
    Ok(summary)
}
