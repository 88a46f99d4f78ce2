//! Migration driver - moves records from a source through the builder into a sink

use std::path::PathBuf;

use crate::migrate::builder::EntityBuilder;
use crate::migrate::error::Result;
use crate::migrate::sink::{Sink, SinkAction};
use crate::migrate::source::RecordSource;

/// Flags for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Suppress the final commit/write step
    pub dry: bool,
    /// Emit a trace line for every construction, hook and sink decision
    pub debug: bool,
}

/// Counters for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records: u64,
    pub persisted: u64,
    pub skipped: u64,
    pub accumulated: u64,
    /// Fixture file written, if the sink wrote one
    pub written_to: Option<PathBuf>,
}

impl RunSummary {
    fn record(&mut self, action: SinkAction) {
        match action {
            SinkAction::Persisted => self.persisted += 1,
            SinkAction::Skipped => self.skipped += 1,
            SinkAction::Accumulated => self.accumulated += 1,
        }
    }
}

/// Runs migrations for one entity configuration
///
/// Processing is strictly sequential: a record is fully built and handed to
/// the sink before the next one is read. Any error stops the run where it
/// happened; work already done by the sink is not undone.
pub struct Migrator<E> {
    builder: EntityBuilder<E>,
}

impl<E> Migrator<E> {
    pub fn new(builder: EntityBuilder<E>) -> Self {
        Migrator { builder }
    }

    pub fn type_name(&self) -> &str {
        self.builder.type_name()
    }

    /// Migrate every record of `source` into `sink`
    pub fn run<S, K>(&self, source: &S, sink: &mut K, options: RunOptions) -> Result<RunSummary>
    where
        S: RecordSource,
        K: Sink<E> + ?Sized,
    {
        log::info!(
            "Migrating {} into {}{}",
            source.describe(),
            self.type_name(),
            if options.dry { " (dry run)" } else { "" }
        );

        let mut summary = RunSummary::default();
        {
            let cursor = source.open()?;
            sink.begin(self.type_name());
            for record in cursor {
                let record = record?;
                summary.records += 1;

                let entity = self.builder.build(&record, options.debug);
                let action = sink.accept(entity, summary.records, &options)?;
                summary.record(action);
            }
        }

        summary.written_to = sink.close(self.type_name(), &options)?;

        log::info!(
            "Migrated {} record(s): {} persisted, {} skipped, {} accumulated",
            summary.records,
            summary.persisted,
            summary.skipped,
            summary.accumulated
        );
        Ok(summary)
    }
}
