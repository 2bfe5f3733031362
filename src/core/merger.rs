// src/core/merger.rs

//! Merging of configuration sources into the task table.
//!
//! Sources are applied strictly in caller order: the global tier first (in
//! increasing precedence), then local `.tasks` files from the outermost
//! ancestor down to the target directory. Within one source, section names
//! are task keys; a name qualified by `:profile` and/or `/feature` (a
//! "trinity" key) only applies when the qualifiers match the active
//! settings.

use crate::constants::RESERVED_NAMES;
use crate::core::{commons, ini, rootfind, settings::Settings};
use crate::models::{ConfigSource, Context, Origin, Task, TaskTable};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Splits a conditional key into `(name, profile, feature)`.
///
/// A key holds at most one `:` (profile) and one `/` (feature) qualifier, in
/// either order: `cmd:release/gui` and `cmd/gui:release` both yield
/// `("cmd", "release", "gui")`.
pub fn trinity_split(text: &str) -> (String, String, String) {
    let p1 = text.find(':');
    let p2 = text.find('/');
    if p1.is_none() && p2.is_none() {
        return (text.to_string(), String::new(), String::new());
    }
    let normalized = text.replace('/', ":");
    let mut parts = normalized.split(':').map(str::to_string);
    let name = parts.next().unwrap_or_default();
    let second = parts.next().unwrap_or_default();
    let third = parts.next().unwrap_or_default();
    match (p1, p2) {
        (Some(a), Some(b)) if a < b => (name, second, third),
        (Some(_), Some(_)) => (name, third, second),
        (Some(_), None) => (name, second, String::new()),
        _ => (name, String::new(), second),
    }
}

/// Merges one source into the table.
///
/// Plain section names replace any existing task of that name wholesale and
/// are stamped with provenance. Reserved names (`*`, `+`, `-`, `%`, `#`)
/// merge key-by-key instead. Trinity names are gated on the active profile
/// and feature set, then merged under their plain name.
pub fn merge_source(
    table: &mut TaskTable,
    source: &ConfigSource,
    origin: Origin,
    profile: &str,
    features: &HashSet<String>,
) {
    let mut conditional = Vec::new();
    for (key, section) in &source.sections {
        if key.contains(':') || key.contains('/') {
            conditional.push((key, section));
        } else if RESERVED_NAMES.contains(&key.as_str()) {
            table
                .reserved
                .entry(key.clone())
                .or_default()
                .merge_from(section);
        } else {
            table.tasks.insert(
                key.clone(),
                Task {
                    fields: section.clone(),
                    source: Some(source.path.clone()),
                    origin: Some(origin),
                },
            );
        }
    }
    for (key, section) in conditional {
        let (name, qual_profile, qual_feature) = trinity_split(key);
        let name = commons::strip(&name).to_string();
        let qual_profile = commons::strip(&qual_profile);
        let qual_feature = commons::strip(&qual_feature);
        if !qual_profile.is_empty() && qual_profile != profile {
            continue;
        }
        if !qual_feature.is_empty() && !features.contains(qual_feature) {
            continue;
        }
        table.tasks.insert(
            name,
            Task {
                fields: section.clone(),
                source: Some(source.path.clone()),
                origin: Some(origin),
            },
        );
    }
}

/// Path identity for de-duplication (case-folded on Windows).
fn normcase(path: &Path) -> String {
    let text = path.to_string_lossy();
    if cfg!(windows) {
        text.replace('\\', "/").to_lowercase()
    } else {
        text.into_owned()
    }
}

/// Existing global sources, in application order. Duplicate paths keep the
/// instance closest to the end of the list, i.e. the one applied last.
fn global_sources(settings: &Settings) -> Vec<PathBuf> {
    let mut names: Vec<PathBuf> = settings
        .global_config
        .iter()
        .filter(|path| path.exists())
        .map(|path| commons::absolute(path))
        .collect();
    names.reverse();
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    for name in names {
        if seen.insert(normcase(&name)) {
            kept.push(name);
        }
    }
    kept.reverse();
    kept
}

fn collect_global(table: &mut TaskTable, settings: &Settings) {
    for name in global_sources(settings) {
        log::debug!("global config: {}", name.display());
        let source = ini::load(&name, None);
        merge_source(table, &source, Origin::Global, &settings.profile, &settings.features);
    }
}

fn collect_local(table: &mut TaskTable, settings: &Settings, context: &Context) {
    for dir in rootfind::search_parents(&context.home) {
        for part in commons::split_list(&settings.cfg_name) {
            let candidate = dir.join(&part);
            if candidate.exists() {
                log::debug!("local config: {}", candidate.display());
                let source = ini::load(&candidate, None);
                merge_source(table, &source, Origin::Local, &settings.profile, &settings.features);
            }
        }
    }
}

/// Builds the full task table for one invocation: global tier, then local
/// tier, then the derived task environment (`*` updated by `+`).
pub fn load_tasks(settings: &Settings, context: &Context) -> TaskTable {
    let mut table = TaskTable::default();
    collect_global(&mut table, settings);
    collect_local(&mut table, settings, context);
    let mut environ = table.reserved.get("*").cloned().unwrap_or_default();
    if let Some(plus) = table.reserved.get("+") {
        environ.merge_from(plus);
    }
    table.environ = environ;
    table
}
