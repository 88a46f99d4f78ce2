//! Positional column to field mapping

use serde::{Deserialize, Serialize};

/// Positional mapping from record columns to entity fields
///
/// Slot `i` names the field that column `i` populates. A `None` slot skips
/// that column; columns past the end of the mapping are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FieldMapping {
    slots: Vec<Option<String>>,
}

impl FieldMapping {
    pub fn new(slots: Vec<Option<String>>) -> Self {
        FieldMapping { slots }
    }

    /// Build a mapping where every column is named (no skipped slots)
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldMapping {
            slots: fields.into_iter().map(|f| Some(f.into())).collect(),
        }
    }

    /// Field for column `index`, if the column is mapped
    pub fn field(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|s| s.as_deref())
    }

    /// Number of slots, including skipped ones
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Mapped field names in column order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(|s| s.as_deref())
    }

    /// `(column, field)` pairs for mapped slots
    pub fn columns(&self) -> impl Iterator<Item = (usize, &str)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_deref().map(|f| (i, f)))
    }
}

// An empty string in a configured field list marks a skipped column.
impl From<Vec<String>> for FieldMapping {
    fn from(fields: Vec<String>) -> Self {
        FieldMapping {
            slots: fields
                .into_iter()
                .map(|f| {
                    let f = f.trim().to_string();
                    if f.is_empty() { None } else { Some(f) }
                })
                .collect(),
        }
    }
}

impl From<FieldMapping> for Vec<String> {
    fn from(mapping: FieldMapping) -> Self {
        mapping
            .slots
            .into_iter()
            .map(|s| s.unwrap_or_default())
            .collect()
    }
}
