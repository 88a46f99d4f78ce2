//! Migration engine
//!
//! Records come out of a [`RecordSource`], are turned into entities by an
//! [`EntityBuilder`] (field hooks per column, then object hooks on the whole
//! entity) and are handed to a [`Sink`]: either a [`CommitSink`] that
//! persists each one, or a [`FixtureSink`] that writes them all to a
//! fixture document at the end of the run.

pub mod types;
pub mod error;
pub mod inflector;
pub mod library;
pub mod source;
pub mod sink;
mod builder;
mod driver;

pub use types::*;
pub use builder::EntityBuilder;
pub use driver::{Migrator, RunOptions, RunSummary};
pub use error::{MigrateError, Result};
pub use inflector::{DefaultInflector, Inflector};
pub use sink::{CommitSink, FixtureFormat, FixtureSink, Sink, Store};
pub use source::{CsvOptions, CsvSource, MemorySource, RecordSource};
