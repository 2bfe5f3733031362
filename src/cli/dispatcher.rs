// src/cli/dispatcher.rs

use crate::cli::args::Cli;
use crate::cli::handlers::{self, commons};
use crate::core::settings::Settings;
use anyhow::{Result, bail};

/// Routes one invocation to its handler and returns the process exit code.
///
/// The run mode takes `<task> [path]`; the list/macro/interactive modes take
/// only an optional path, so their first positional is reinterpreted as one.
pub fn dispatch(cli: Cli) -> Result<i32> {
    log::debug!("cli args parsed: {:?}", cli);
    let mut settings = Settings::load();
    if let Some(profile) = &cli.profile {
        settings.profile = profile.clone();
    }
    let shadow = commons::parse_overrides(&cli.define, &cli.env)?;
    let mode_path = cli.task.as_deref().or(cli.path.as_deref());

    if cli.list || cli.list_all || cli.raw {
        handlers::list::handle(mode_path, cli.list_all, cli.raw, &settings)?;
        return Ok(0);
    }
    if cli.macros || cli.wsl_macros {
        handlers::macros::handle(mode_path, cli.wsl_macros, &settings)?;
        return Ok(0);
    }
    if cli.interactive || cli.fzf {
        return handlers::interactive::handle(mode_path, cli.fzf, &settings, &shadow, cli.verbose);
    }

    let Some(task) = cli.task.as_deref() else {
        bail!("require a task name, use --help for usage");
    };
    handlers::run::handle(task, cli.path.as_deref(), &settings, &shadow, cli.verbose)
}
