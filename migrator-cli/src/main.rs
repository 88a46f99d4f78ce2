use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::*;

use migrator::cli::commands::{handle_db_command, handle_fixture_command};
use migrator::cli::{Cli, Commands};

/// Console logger; `--debug` lowers the default level, RUST_LOG still wins
fn init_logger(debug: bool) {
    use env_logger::Builder;
    use std::io::Write;

    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    Builder::new()
        .format(|buf, record| {
            if record.level() == log::Level::Debug {
                writeln!(buf, "{}", record.args())
            } else {
                writeln!(buf, "[{}] {}", record.level(), record.args())
            }
        })
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Db(args) => handle_db_command(args, cli.debug).map(|_| ()),
        Commands::Fixture(args) => handle_fixture_command(args, cli.debug).map(|_| ()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.debug);
    log::debug!("CLI arguments parsed");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
