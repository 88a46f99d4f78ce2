//! Destinations for built entities

mod commit;
mod encoder;
mod fixture;

pub use commit::{CommitSink, Store};
pub use encoder::{FixtureEncoder, FixtureFormat, JsonEncoder, YamlEncoder};
pub use fixture::{FixtureDocument, FixtureSink};

use std::path::PathBuf;

use crate::migrate::RunOptions;
use crate::migrate::error::Result;

/// What a sink did with one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkAction {
    /// Written to the backing store
    Persisted,
    /// Dropped because of dry mode
    Skipped,
    /// Held until the sink is closed
    Accumulated,
}

/// Receives every entity of a run, then is closed once
pub trait Sink<E> {
    /// Start of stream, once the source is open
    fn begin(&mut self, _type_name: &str) {}

    /// Take ownership of one built entity
    ///
    /// `record` is the 1-based number of the record it came from.
    fn accept(&mut self, entity: E, record: u64, options: &RunOptions) -> Result<SinkAction>;

    /// End of stream; returns the file written, if any
    fn close(&mut self, type_name: &str, options: &RunOptions) -> Result<Option<PathBuf>>;
}
