// src/core/commons.rs

// Small helpers shared across the core modules.

use std::path::{Component, Path, PathBuf};

/// The exact set of characters the configuration format treats as padding.
const TRIM_CHARS: &[char] = &['\r', '\n', '\t', ' '];

/// Trims line-break characters, tabs and spaces from both ends.
pub fn strip(text: &str) -> &str {
    text.trim_matches(TRIM_CHARS)
}

/// Splits a comma-separated setting into trimmed, non-empty items.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(strip)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lexically absolutizes a path against the current working directory,
/// resolving `.` and `..` components without touching the filesystem (the
/// path does not need to exist).
pub fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    let mut result = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push(component.as_os_str());
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    dunce::simplified(&result).to_path_buf()
}

/// Computes `path` relative to `base` (both made absolute first), walking up
/// with `..` components where the prefixes diverge. Returns `.` when equal.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path = absolute(path);
    let base = absolute(base);
    let path_parts: Vec<_> = path.components().collect();
    let base_parts: Vec<_> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let mut result = PathBuf::new();
    for _ in common..base_parts.len() {
        result.push("..");
    }
    for part in path_parts.iter().skip(common) {
        result.push(part.as_os_str());
    }
    if result.as_os_str().is_empty() {
        result.push(".");
    }
    result
}
