// src/models.rs

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

// --- CONFIGURATION SOURCE MODELS ---

/// An insertion-ordered `key = value` mapping, as parsed from one `[section]`
/// of a configuration file. Updating an existing key keeps its position, so
/// iteration always reflects file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    entries: Vec<(String, String)>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Inserts or replaces a key, preserving the original position on replace.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    /// Key-by-key upsert of every entry of `other` into `self`.
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Applies a string transformation to every value in place.
    pub fn map_values(&mut self, f: impl Fn(&str) -> String) {
        for (_, value) in &mut self.entries {
            *value = f(value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One parsed configuration file: a named, ordered collection of sections.
/// Identity is the absolute file path. Immutable after load and shared via
/// the process-wide cache in `core::ini`.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub sections: Vec<(String, Section)>,
}

impl ConfigSource {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// Returns the named section, creating it (in declaration order) when it
    /// does not exist yet. Used by the parser only.
    pub(crate) fn section_mut(&mut self, name: &str) -> &mut Section {
        if let Some(pos) = self.sections.iter().position(|(n, _)| n == name) {
            // Indexing after a successful position lookup.
            &mut self.sections[pos].1
        } else {
            self.sections.push((name.to_string(), Section::new()));
            let last = self.sections.len() - 1;
            &mut self.sections[last].1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|(_, s)| s.is_empty())
    }
}

// --- TASK TABLE MODELS ---

/// Where a merged task came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Global,
    Local,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// A merged task. `fields` keeps the raw section keys, including conditional
/// variants such as `command:c,cpp` or `cwd/win32`, which are resolved per
/// invocation by the task resolver rather than at merge time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    pub fields: Section,
    pub source: Option<PathBuf>,
    pub origin: Option<Origin>,
}

impl Task {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }
}

/// The stable result of merging every configuration source: exactly one task
/// per plain name, plus the reserved-name sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskTable {
    pub tasks: HashMap<String, Task>,
    pub reserved: HashMap<String, Section>,
    /// The task environment: reserved section `*` merged with `+`.
    pub environ: Section,
}

impl TaskTable {
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// All task names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// --- INVOCATION CONTEXT MODELS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    File,
    Directory,
}

/// The invocation-time frame: what is targeted and where we are. Computed
/// once per run and passed explicitly through the pipeline; the cwd-derived
/// macros are refreshed right before execution.
#[derive(Debug, Clone)]
pub struct Context {
    /// Absolute target path (a file or a directory).
    pub target: PathBuf,
    /// The target's directory (the target itself for directory targets).
    pub home: PathBuf,
    pub kind: TargetKind,
    pub filetype: Option<String>,
    /// Project root found by the marker walk (falls back to `home`).
    pub root: PathBuf,
}

impl Context {
    pub fn is_file(&self) -> bool {
        self.kind == TargetKind::File
    }
}

/// Built-in macro values derived from a `Context`. `None` marks a macro as
/// unavailable (no file targeted), which is distinct from an empty string so
/// validation can detect its use.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    map: HashMap<String, Option<String>>,
}

impl MacroTable {
    pub fn set(&mut self, name: &str, value: Option<String>) {
        self.map.insert(name.to_string(), value);
    }

    /// The resolved value, or `None` when the macro is absent or unavailable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).and_then(|v| v.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

/// Caller-supplied answers that bypass prompting: `input` pre-answers the
/// interactive-input placeholders, `environ` shadows the task environment.
/// Built from the command line, consulted read-only during expansion.
#[derive(Debug, Clone, Default)]
pub struct ShadowOverrides {
    pub input: HashMap<String, String>,
    pub environ: HashMap<String, String>,
}
