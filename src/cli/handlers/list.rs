// src/cli/handlers/list.rs

use crate::cli::handlers::commons::{self, Row};
use crate::core::resolver::TaskResolver;
use crate::core::settings::Settings;
use crate::core::{context_resolver, merger};
use crate::models::ShadowOverrides;
use anyhow::Result;
use colored::Color;

/// Prints the merged task table with provenance. Hidden tasks (leading dot)
/// only appear with `all`; `raw` drops the header and the source lines.
pub fn handle(path: Option<&str>, all: bool, raw: bool, settings: &Settings) -> Result<()> {
    let context = context_resolver::resolve(path, settings)?;
    let table = merger::load_tasks(settings, &context);
    let shadow = ShadowOverrides::default();
    let resolver = TaskResolver {
        settings,
        context: &context,
        table: &table,
        shadow: &shadow,
    };

    let mut rows: Vec<Row> = Vec::new();
    if !raw {
        rows.push(vec![
            ("Task".to_string(), Some(Color::Yellow)),
            ("Type".to_string(), Some(Color::Yellow)),
            ("Detail".to_string(), Some(Color::Yellow)),
        ]);
    }
    for name in table.names() {
        if !all && name.starts_with('.') {
            continue;
        }
        let Some(task) = table.get(name) else {
            continue;
        };
        let command = resolver.display_command(task);
        let mode = task.origin.map(|o| o.to_string()).unwrap_or_default();
        rows.push(vec![
            (name.to_string(), Some(Color::BrightRed)),
            (mode, Some(Color::Cyan)),
            (command, Some(Color::White)),
        ]);
        if !raw && let Some(source) = &task.source {
            rows.push(vec![
                (String::new(), None),
                (String::new(), None),
                (source.display().to_string(), Some(Color::BrightBlack)),
            ]);
        }
    }
    commons::tabulify(&rows);
    Ok(())
}
