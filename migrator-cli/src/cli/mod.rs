//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Migrate CSV rows into entities
#[derive(Parser, Debug)]
#[command(name = "migrator")]
#[command(about = "Migrate CSV rows into a SQLite store or YAML/JSON fixtures")]
#[command(version)]
pub struct Cli {
    /// Trace every construction, hook, setter and save decision
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build entities and save each one to the store
    Db(DbArgs),
    /// Build entities and write them to a fixture file
    Fixture(FixtureArgs),
}

/// Options shared by every migration command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Migration config file (TOML)
    pub config: PathBuf,

    /// CSV file to read instead of the one in the config
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Build everything but skip the final save/write
    #[arg(long)]
    pub dry: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// SQLite database to write to instead of the one in the config
    #[arg(long)]
    pub database: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct FixtureArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Fixture file name (without extension)
    #[arg(short, long)]
    pub name: Option<String>,
}
