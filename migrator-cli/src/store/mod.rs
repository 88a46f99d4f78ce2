//! Backing stores for committed entities

mod sqlite;

pub use sqlite::{SqliteStore, StoredEntity};
