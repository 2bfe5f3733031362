// src/cli/handlers/macros.rs

use crate::cli::handlers::commons::{self, Row};
use crate::core::macros::{MACROS_HELP, expand_builtin};
use crate::core::settings::Settings;
use crate::core::context_resolver;
use anyhow::Result;
use colored::Color;

/// The display order of the macro inspection view.
const DISPLAY_STEMS: &[&str] = &[
    "FILEPATH", "FILENAME", "FILEDIR", "FILEEXT", "FILETYPE", "FILENOEXT", "PATHNOEXT", "CWD",
    "RELDIR", "RELNAME", "ROOT", "DIRNAME", "PRONAME", "PROFILE",
];

/// Prints the built-in macro table for inspection; `wsl` switches to the
/// `WSL_` view (only populated on Windows).
pub fn handle(path: Option<&str>, wsl: bool, settings: &Settings) -> Result<()> {
    let context = context_resolver::resolve(path, settings)?;
    let macros = expand_builtin(&context, &settings.profile);

    let mut rows: Vec<Row> = vec![vec![
        ("Macro".to_string(), Some(Color::BrightYellow)),
        ("Detail".to_string(), Some(Color::BrightYellow)),
        ("Value".to_string(), Some(Color::BrightYellow)),
    ]];
    let prefix = if wsl { "WSL_" } else { "VIM_" };
    for stem in DISPLAY_STEMS {
        let name = format!("{prefix}{stem}");
        if !macros.contains(&name) {
            continue;
        }
        let Some(help) = MACROS_HELP
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, help)| *help)
        else {
            continue;
        };
        let value = macros.get(&name).unwrap_or("").to_string();
        rows.push(vec![
            (name, Some(Color::BrightRed)),
            (help.to_string(), Some(Color::White)),
            (value, Some(Color::BrightBlack)),
        ]);
    }
    commons::tabulify(&rows);
    Ok(())
}
