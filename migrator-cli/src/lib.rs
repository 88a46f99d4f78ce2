//! CSV migrator
//!
//! Reads delimited text files record by record, turns every record into an
//! entity through a positional field mapping and a hook pipeline, and either
//! saves each entity to a SQLite store or collects them into a YAML/JSON
//! fixture file.

pub mod cli;
pub mod config;
pub mod migrate;
pub mod store;

pub use config::MigrationConfig;
pub use migrate::{MigrateError, Migrator, RunOptions, RunSummary};
pub use store::SqliteStore;
