// src/cli/handlers/run.rs

use crate::core::resolver::{ResolveError, ResolvedCommand, TaskResolver};
use crate::core::settings::Settings;
use crate::core::{commons, context_resolver, macros, merger};
use crate::models::{Context, ShadowOverrides, TaskTable};
use crate::system::executor;
use crate::system::prompt::ConsolePrompt;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Entry point for the run mode: resolves the context and the task table,
/// then runs one named task.
pub fn handle(
    name: &str,
    path: Option<&str>,
    settings: &Settings,
    shadow: &ShadowOverrides,
    verbose: bool,
) -> Result<i32> {
    let context = context_resolver::resolve(path, settings)?;
    let table = merger::load_tasks(settings, &context);
    run_task(name, &context, &table, settings, shadow, verbose)
}

/// Resolves and executes one task against an already-built table. Also used
/// by the interactive modes after a selection.
pub fn run_task(
    name: &str,
    context: &Context,
    table: &TaskTable,
    settings: &Settings,
    shadow: &ShadowOverrides,
    verbose: bool,
) -> Result<i32> {
    let resolver = TaskResolver {
        settings,
        context,
        table,
        shadow,
    };
    let mut provider = ConsolePrompt;
    let resolved = resolver.resolve(name, &mut provider)?;
    execute(&resolved, context, table, shadow, verbose)
}

/// The executor step: expand the `cwd` template, enter it (scoped), refresh
/// the cwd-derived macros, run the remaining substitution passes and hand
/// the command to the shell with the macro table exported into the child
/// environment.
fn execute(
    resolved: &ResolvedCommand,
    context: &Context,
    table: &TaskTable,
    shadow: &ShadowOverrides,
    verbose: bool,
) -> Result<i32> {
    let cwd = match &resolved.cwd {
        Some(template) => {
            let expanded = macros::expand_environ(template, &table.environ, shadow)
                .map_err(ResolveError::from)?;
            let expanded = commons::strip(&expanded).to_string();
            if expanded.is_empty() {
                None
            } else {
                Some(PathBuf::from(expanded))
            }
        }
        None => None,
    };

    let code = executor::with_directory(cwd.as_deref(), || -> Result<i32> {
        let mut macro_table = resolved.macros.clone();
        macros::refresh_cwd_macros(&mut macro_table, context);
        let command = macros::expand_environ(&resolved.command, &table.environ, shadow)
            .map_err(ResolveError::from)?;
        let command = macros::replace_builtin(&command, &macro_table);
        let command = commons::strip(&command).to_string();
        if command.is_empty() {
            return Err(ResolveError::EmptyCommand {
                name: resolved.name.clone(),
                source_path: resolved.source.clone(),
            }
            .into());
        }
        if verbose {
            println!("{}", format!("+ {command}").white());
        }
        let envs: Vec<(String, String)> = macro_table
            .iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), v.to_string())))
            .collect();
        Ok(executor::run_shell(&command, &envs)?)
    })??;
    Ok(code)
}
