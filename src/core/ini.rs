// src/core/ini.rs

//! Loading of a single configuration file into a [`ConfigSource`].
//!
//! The format is INI-like but deliberately hand-parsed: keys may contain `:`
//! and `/` (the conditional-key grammar), which stock INI parsers reject or
//! mangle. Loads are memoized process-wide by normalized absolute path, so
//! repeated lookups of the same file within one resolution are free and
//! order-independent.

use crate::constants::{TOKEN_INIHOME, TOKEN_ININAME};
use crate::core::commons;
use crate::models::ConfigSource;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];

lazy_static! {
    static ref SOURCE_CACHE: Mutex<HashMap<String, Arc<ConfigSource>>> =
        Mutex::new(HashMap::new());
}

/// Cache key: absolute path, case-folded with `\` -> `/` on Windows, where
/// paths differing only in case or separator refer to the same file.
fn cache_key(path: &Path) -> String {
    let text = path.to_string_lossy();
    if cfg!(windows) {
        text.replace('\\', "/").to_lowercase()
    } else {
        text.into_owned()
    }
}

/// Decodes raw file bytes, never failing: UTF-8 BOM first, then the
/// caller-supplied codec, then strict UTF-8, finally lossy UTF-8.
fn decode_text(raw: &[u8], codec: Option<&str>) -> String {
    if let Some(rest) = raw.strip_prefix(UTF8_BOM) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    if let Some(codec) = codec {
        return match codec.to_ascii_lowercase().as_str() {
            "latin-1" | "latin1" | "iso-8859-1" => decode_latin1(raw),
            _ => String::from_utf8_lossy(raw).into_owned(),
        };
    }
    match std::str::from_utf8(raw) {
        Ok(text) => text.to_string(),
        Err(_) => String::from_utf8_lossy(raw).into_owned(),
    }
}

/// Latin-1 is total: every byte maps to the code point of the same value.
fn decode_latin1(raw: &[u8]) -> String {
    raw.iter().map(|&b| char::from(b)).collect()
}

/// Parses configuration text. Blank lines and `#`/`;` comments are skipped,
/// `[section]` opens a section, `key=value` splits on the first `=`. A key
/// seen before any section header lands in the `default` section.
fn parse_text(path: &Path, text: &str) -> ConfigSource {
    let mut source = ConfigSource {
        path: path.to_path_buf(),
        sections: Vec::new(),
    };
    let mut sect = "default".to_string();
    for raw_line in text.split('\n') {
        let line = commons::strip(raw_line);
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            if let Some(inner) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                sect = commons::strip(inner).to_string();
                source.section_mut(&sect);
            }
            // A dangling `[...` line is dropped, same as any other noise.
        } else if let Some(pos) = line.find('=') {
            let key = commons::strip(&line[..pos]);
            let val = commons::strip(&line[pos + 1..]);
            source.section_mut(&sect).insert(key, val);
        }
    }
    source
}

/// Reads and parses one file without touching the cache. A missing or
/// unreadable file yields an empty source, not an error.
pub fn load_file(path: &Path, codec: Option<&str>) -> ConfigSource {
    let abs = commons::absolute(path);
    let raw = match fs::read(&abs) {
        Ok(raw) => raw,
        Err(err) => {
            log::debug!("config source absent: {} ({})", abs.display(), err);
            return ConfigSource {
                path: abs,
                sections: Vec::new(),
            };
        }
    };
    let mut source = parse_text(&abs, &decode_text(&raw, codec));
    // Substitute the file's own identity into every value, so a source can
    // refer to itself and its directory without the macro engine.
    let inihome = abs
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ininame = abs.to_string_lossy().into_owned();
    for (_, section) in &mut source.sections {
        section.map_values(|value| {
            value
                .replace(TOKEN_INIHOME, &inihome)
                .replace(TOKEN_ININAME, &ininame)
        });
    }
    source
}

/// Memoized load. The first call parses and caches; later calls for the same
/// normalized path return the shared object for the process lifetime.
pub fn load(path: &Path, codec: Option<&str>) -> Arc<ConfigSource> {
    let abs = commons::absolute(path);
    let key = cache_key(&abs);
    let mut cache = SOURCE_CACHE.lock().unwrap();
    if let Some(found) = cache.get(&key) {
        return Arc::clone(found);
    }
    let source = Arc::new(load_file(&abs, codec));
    cache.insert(key, Arc::clone(&source));
    source
}
