//! Commit sink - persists each entity as it arrives

use std::path::PathBuf;

use crate::migrate::RunOptions;
use crate::migrate::error::{MigrateError, Result};

use super::{Sink, SinkAction};

/// Backing store for committed entities
pub trait Store<E> {
    /// Persist one entity
    fn save(&mut self, entity: &E) -> anyhow::Result<()>;
}

impl<E, F> Store<E> for F
where
    F: FnMut(&E) -> anyhow::Result<()>,
{
    fn save(&mut self, entity: &E) -> anyhow::Result<()> {
        self(entity)
    }
}

/// Persists entities one by one; a no-op in dry mode
///
/// Failures are not retried or rolled back: entities accepted before the
/// failing one stay persisted.
pub struct CommitSink<S> {
    store: S,
    type_name: String,
}

impl<S> CommitSink<S> {
    pub fn new(store: S) -> Self {
        CommitSink {
            store,
            type_name: String::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<E, S: Store<E>> Sink<E> for CommitSink<S> {
    fn begin(&mut self, type_name: &str) {
        self.type_name = type_name.to_string();
    }

    fn accept(&mut self, entity: E, record: u64, options: &RunOptions) -> Result<SinkAction> {
        if options.dry {
            if options.debug {
                log::debug!("Dry run, not saving object from record {}", record);
            }
            return Ok(SinkAction::Skipped);
        }

        if options.debug {
            log::debug!("Saving object");
        }
        self.store
            .save(&entity)
            .map_err(|e| MigrateError::Persistence {
                type_name: self.type_name.clone(),
                record,
                source: e.into(),
            })?;
        Ok(SinkAction::Persisted)
    }

    fn close(&mut self, type_name: &str, _options: &RunOptions) -> Result<Option<PathBuf>> {
        log::debug!("Commit sink closed for {}", type_name);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(dry: bool) -> RunOptions {
        RunOptions { dry, debug: true }
    }

    #[test]
    fn test_persists_when_not_dry() {
        let mut saved = Vec::new();
        let mut sink = CommitSink::new(|e: &i32| -> anyhow::Result<()> {
            saved.push(*e);
            Ok(())
        });

        assert_eq!(sink.accept(7, 1, &opts(false)).unwrap(), SinkAction::Persisted);
        drop(sink);
        assert_eq!(saved, vec![7]);
    }

    #[test]
    fn test_dry_run_never_calls_store() {
        let mut calls = 0;
        let mut sink = CommitSink::new(|_: &i32| -> anyhow::Result<()> {
            calls += 1;
            Ok(())
        });

        assert_eq!(sink.accept(7, 1, &opts(true)).unwrap(), SinkAction::Skipped);
        drop(sink);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_store_failure_is_persistence_error() {
        let mut sink = CommitSink::new(|_: &i32| -> anyhow::Result<()> { anyhow::bail!("disk full") });
        Sink::<i32>::begin(&mut sink, "Person");

        let err = sink.accept(7, 3, &opts(false)).unwrap_err();
        match err {
            MigrateError::Persistence { type_name, record, source } => {
                assert_eq!(type_name, "Person");
                assert_eq!(record, 3);
                assert_eq!(source.to_string(), "disk full");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
