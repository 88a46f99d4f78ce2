//! `migrator fixture` - collect built entities into a fixture file

use std::sync::Arc;

use anyhow::Result;

use super::{prepare, print_summary, run};
use crate::cli::FixtureArgs;
use crate::migrate::{DefaultInflector, DynamicEntity, FixtureSink, RunSummary};

pub fn handle_fixture_command(args: FixtureArgs, debug: bool) -> Result<RunSummary> {
    let prepared = prepare(&args.run, debug)?;
    let config = &prepared.config;

    let name = args.name.clone().or_else(|| config.fixture.name.clone());
    let mut sink: FixtureSink<DynamicEntity> = FixtureSink::new(
        config.fixture_dir(),
        config.fixture.format.encoder(),
        Arc::new(DefaultInflector),
    )
    .with_name(name);

    log::debug!(
        "Writing {} fixture to {}",
        config.fixture.format.label(),
        sink.destination(prepared.migrator.type_name()).display()
    );

    let summary = run(&prepared, &mut sink)?;
    print_summary(prepared.migrator.type_name(), &summary, prepared.options.dry);
    Ok(summary)
}
