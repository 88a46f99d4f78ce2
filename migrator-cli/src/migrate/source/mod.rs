//! Record sources
//!
//! A source is opened once per run and yields a cursor over its records.
//! Dropping the cursor releases whatever the source holds open, so the
//! driver never has to close anything explicitly.

mod delimited;
mod memory;

pub use delimited::{CsvOptions, CsvSource};
pub use memory::MemorySource;

use crate::migrate::Record;
use crate::migrate::error::Result;

/// Producer of raw records
pub trait RecordSource {
    /// Cursor over records; released on drop
    type Cursor: Iterator<Item = Result<Record>>;

    /// Acquire the underlying resource
    fn open(&self) -> Result<Self::Cursor>;

    /// Short description for log lines
    fn describe(&self) -> String;
}
