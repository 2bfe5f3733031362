// src/core/rootfind.rs

//! Project-root discovery: walk a directory and its parents until any marker
//! matches. Markers containing glob metacharacters match against directory
//! contents; plain markers are simple existence tests.

use crate::core::commons;
use std::path::{Path, PathBuf};

fn has_glob_chars(text: &str) -> bool {
    text.contains('*') || text.contains('?') || text.contains('[')
}

fn marker_matches(base: &Path, marker: &str) -> bool {
    let test = base.join(marker);
    if has_glob_chars(marker) {
        let pattern = test.to_string_lossy().into_owned();
        match glob::glob(&pattern) {
            Ok(mut paths) => paths.next().is_some(),
            Err(err) => {
                log::debug!("bad root marker pattern '{}': {}", marker, err);
                false
            }
        }
    } else {
        test.exists()
    }
}

/// Walks `start` and each successive parent, returning the first directory
/// where any marker matches. Marker order within a level has no effect. With
/// `fallback`, a fruitless walk returns the original `start` instead of
/// `None`.
pub fn find_root(start: &Path, markers: &[String], fallback: bool) -> Option<PathBuf> {
    let start = commons::absolute(start);
    let mut base = start.clone();
    loop {
        for marker in markers {
            if marker.is_empty() {
                continue;
            }
            if marker_matches(&base, marker) {
                return Some(base);
            }
        }
        match base.parent() {
            Some(parent) if parent != base => base = parent.to_path_buf(),
            _ => break,
        }
    }
    if fallback { Some(start) } else { None }
}

/// Every directory from the filesystem root down to `path` itself
/// (outermost first).
pub fn search_parents(path: &Path) -> Vec<PathBuf> {
    let mut output = Vec::new();
    let mut current = commons::absolute(path);
    loop {
        output.push(current.clone());
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => break,
        }
    }
    output.reverse();
    output
}
