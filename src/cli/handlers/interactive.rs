// src/cli/handlers/interactive.rs

use crate::cli::handlers::commons::{self, Row};
use crate::cli::handlers::run;
use crate::core::resolver::TaskResolver;
use crate::core::settings::Settings;
use crate::core::{commons as core_commons, context_resolver, merger};
use crate::models::{ShadowOverrides, TaskTable};
use anyhow::{Context as _, Result, anyhow};
use colored::Color;
use dialoguer::Input;
use std::fs::{self, File};
use std::process::{Command, Stdio};

/// Interactive task selection: a numbered in-terminal menu, or the
/// configured external fuzzy finder. Hidden tasks never appear here.
pub fn handle(
    path: Option<&str>,
    use_fzf: bool,
    settings: &Settings,
    shadow: &ShadowOverrides,
    verbose: bool,
) -> Result<i32> {
    let context = context_resolver::resolve(path, settings)?;
    let table = merger::load_tasks(settings, &context);
    let names: Vec<String> = table
        .names()
        .into_iter()
        .filter(|name| !name.starts_with('.'))
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Ok(0);
    }
    let resolver = TaskResolver {
        settings,
        context: &context,
        table: &table,
        shadow,
    };

    let selection = if use_fzf {
        fzf_select(&names, &resolver, &table, settings)?
    } else {
        menu_select(&names, &resolver, &table)
    };
    match selection {
        Some(name) => run::run_task(&name, &context, &table, settings, shadow, verbose),
        None => Ok(0),
    }
}

/// Numbered menu, listed bottom-up so entry 1 sits next to the prompt. An
/// empty or invalid answer selects nothing.
fn menu_select(names: &[String], resolver: &TaskResolver<'_>, table: &TaskTable) -> Option<String> {
    let mut rows: Vec<Row> = Vec::new();
    for (index, name) in names.iter().enumerate() {
        let command = table
            .get(name)
            .map(|task| resolver.display_command(task))
            .unwrap_or_default();
        rows.push(vec![
            (format!("{}:", index + 1), Some(Color::BrightWhite)),
            (name.clone(), Some(Color::BrightRed)),
            (command, None),
        ]);
    }
    rows.reverse();
    commons::tabulify(&rows);

    let answer: String = Input::new()
        .with_prompt(">")
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();
    let index: usize = answer.trim().parse().ok()?;
    if index < 1 || index > names.len() {
        return None;
    }
    names.get(index - 1).cloned()
}

/// External fuzzy-finder flow: write the candidate rows to a temporary
/// exchange file, pipe them through the configured finder, read back the
/// selected line. Failing to create the temporary directory is fatal.
fn fzf_select(
    names: &[String],
    resolver: &TaskResolver<'_>,
    table: &TaskTable,
    settings: &Settings,
) -> Result<Option<String>> {
    let finder = settings.option("default", "fzf", "fzf");
    let mut flags = settings.option("default", "fzf_flag", "");
    if flags.is_empty() {
        flags = "+s".to_string();
    }
    let cmdline = format!("{finder} --nth 1 --reverse --inline-info --tac {flags} --height 35%");
    let parts =
        shlex::split(&cmdline).ok_or_else(|| anyhow!("cannot parse finder command: {cmdline}"))?;
    let (program, args) = parts
        .split_first()
        .ok_or_else(|| anyhow!("empty finder command"))?;

    let tmpdir = tempfile::Builder::new()
        .prefix("asynctask")
        .tempdir()
        .context("cannot create temporary directory for the finder")?;
    let list_path = tmpdir.path().join("fzf.txt");
    let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
    let mut body = String::new();
    for name in names.iter().rev() {
        let command = table
            .get(name)
            .map(|task| resolver.display_command(task))
            .unwrap_or_default();
        body.push_str(&format!("{name:<width$}  : {command}\r\n"));
    }
    fs::write(&list_path, body)?;

    let input = File::open(&list_path)?;
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::from(input))
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
        .with_context(|| format!("could not launch '{program}'"))?;
    if !output.status.success() {
        return Ok(None);
    }
    let text = String::from_utf8_lossy(&output.stdout);
    let text = core_commons::strip(&text);
    let Some(pos) = text.find(':') else {
        return Ok(None);
    };
    let name = core_commons::strip(&text[..pos]).to_string();
    if name.is_empty() {
        return Ok(None);
    }
    Ok(Some(name))
}
