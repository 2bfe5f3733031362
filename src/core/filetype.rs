// src/core/filetype.rs

//! File-type detection from glob-pattern tables, mirroring the `&filetype`
//! tags editors assign. The built-in table can be extended or overridden by
//! a `[filetypes]` section in the settings file.

use crate::core::{commons, settings::Settings};
use glob::{MatchOptions, Pattern};
use std::path::Path;

/// Built-in type-tag patterns; a comma separates alternatives.
pub const FILE_TYPES: &[(&str, &str)] = &[
    ("text", "*.txt"),
    ("c", "*.[cChH],.[cChH].in"),
    ("cpp", "*.[cChH]pp,*.hh,*.[ch]xx,*.cc,*.cc.in,*.cpp.in,*.hh.in,*.cxx.in"),
    ("python", "*.py,*.pyw"),
    ("vim", "*.vim"),
    ("asm", "*.asm,*.s,*.S"),
    ("java", "*.java,*.jsp,*.jspx"),
    ("javascript", "*.js"),
    ("json", "*.json"),
    ("perl", "*.pl"),
    ("go", "*.go"),
    ("haskell", "*.hs"),
    ("sh", "*.sh"),
    ("lua", "*.lua"),
    ("bash", "*.bash"),
    ("make", "*.mk,*.mak,[Mm]akefile,[Gg][Nn][Uu]makefile,[Mm]akefile.in"),
    ("cmake", "CMakeLists.txt"),
    ("zsh", "*.zsh"),
    ("fish", "*.fish"),
    ("ruby", "*.rb"),
    ("php", "*.php,*.php4,*.php5"),
    ("ps1", "*.ps1"),
    ("cs", "*.cs"),
    ("erlang", "*.erl,*.hrl"),
    ("html", "*.html,*.htm"),
    ("kotlin", "*.kt,*.kts"),
    ("markdown", "*.md,*.markdown,*.mdown,*.mkdn"),
    ("rust", "*.rs"),
    ("scala", "*.scala"),
    ("swift", "*.swift"),
    ("dosini", "*.ini"),
    ("yaml", "*.yaml,*.yml"),
];

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: !cfg!(windows),
        require_literal_separator: false,
        require_literal_leading_dot: false,
    }
}

/// Classifies a path by its base name. Settings-file `[filetypes]` entries
/// replace same-named built-ins and append new ones, keeping table order.
pub fn classify(path: &Path, settings: &Settings) -> Option<String> {
    let name = commons::absolute(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())?;

    let mut detect: Vec<(String, String)> = FILE_TYPES
        .iter()
        .map(|(ft, rules)| (ft.to_string(), rules.to_string()))
        .collect();
    if let Some(extra) = settings.config.section("filetypes") {
        for (ft, rules) in extra.iter() {
            match detect.iter_mut().find(|(name, _)| name == ft) {
                Some((_, existing)) => *existing = rules.to_string(),
                None => detect.push((ft.to_string(), rules.to_string())),
            }
        }
    }

    let options = match_options();
    for (ft, rules) in &detect {
        for rule in commons::split_list(rules) {
            match Pattern::new(&rule) {
                Ok(pattern) if pattern.matches_with(&name, options) => {
                    return Some(ft.clone());
                }
                Ok(_) => {}
                Err(err) => log::debug!("bad filetype pattern '{}': {}", rule, err),
            }
        }
    }
    None
}
