//! In-memory record source

use crate::migrate::Record;
use crate::migrate::error::Result;

use super::RecordSource;

/// Records held in memory; every `open` restarts from the first record
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<Record>,
}

impl MemorySource {
    /// Build from string slices, handy for fixtures of small tables
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        MemorySource {
            records: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }
}

impl RecordSource for MemorySource {
    type Cursor = std::iter::Map<std::vec::IntoIter<Record>, fn(Record) -> Result<Record>>;

    fn open(&self) -> Result<Self::Cursor> {
        Ok(self.records.clone().into_iter().map(Ok as fn(Record) -> Result<Record>))
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_is_restartable() {
        let source = MemorySource::from_rows(&[&["a", "b"], &["c"]]);

        let first: Vec<_> = source.open().unwrap().map(|r| r.unwrap()).collect();
        let second: Vec<_> = source.open().unwrap().map(|r| r.unwrap()).collect();

        assert_eq!(first, second);
        assert_eq!(first[1], vec!["c".to_string()]);
    }
}
