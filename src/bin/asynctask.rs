// src/bin/asynctask.rs

use anyhow::Result;
use asynctask::cli::{args::Cli, dispatcher};
use asynctask::core::resolver::ResolveError;
use clap::Parser;
use colored::Colorize;

/// Entry point: set up logging, parse arguments, dispatch, and map failures
/// to their exit codes. Resolution failures carry their own code and
/// provenance; everything else is a generic error.
fn main() {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            if let Some(resolve_error) = error.downcast_ref::<ResolveError>() {
                resolve_error.report();
                std::process::exit(resolve_error.exit_code());
            }
            eprintln!("{} {}", "Error:".red().bold(), error);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    dispatcher::dispatch(cli)
}
