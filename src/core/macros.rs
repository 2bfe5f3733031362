// src/core/macros.rs

//! The macro engine: the built-in macro table derived from the invocation
//! context, plain literal substitution, and the generic bracket-scan
//! substitution primitive behind the `$(+...)`, `$(VIM:...)`, `$(%...)` and
//! `$(?...)` placeholder families.

use crate::core::commons;
use crate::models::{Context, MacroTable, Section, ShadowOverrides};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use thiserror::Error;

/// Short descriptions for the built-in macros, used by the inspection view.
pub const MACROS_HELP: &[(&str, &str)] = &[
    ("VIM_FILEPATH", "File name of current target with full path"),
    ("VIM_FILENAME", "File name of current target without path"),
    ("VIM_FILEDIR", "Full path of current target without the file name"),
    ("VIM_FILEEXT", "File extension of current target"),
    ("VIM_FILETYPE", "File type of current target"),
    ("VIM_FILENOEXT", "File name of current target without path and extension"),
    ("VIM_PATHNOEXT", "Current target name with full path but without extension"),
    ("VIM_CWD", "Current directory"),
    ("VIM_RELDIR", "File path relativize to current directory"),
    ("VIM_RELNAME", "File name relativize to current directory"),
    ("VIM_ROOT", "Project root directory"),
    ("VIM_PRONAME", "Name of current project root directory"),
    ("VIM_DIRNAME", "Name of current directory"),
    ("VIM_PROFILE", "Current building profile (debug/release/...)"),
    ("WSL_FILEPATH", "(WSL) File name of current target with full path"),
    ("WSL_FILENAME", "(WSL) File name of current target without path"),
    ("WSL_FILEDIR", "(WSL) Full path of current target without the file name"),
    ("WSL_FILEEXT", "(WSL) File extension of current target"),
    ("WSL_FILENOEXT", "(WSL) File name of current target without path and extension"),
    ("WSL_PATHNOEXT", "(WSL) Current target name with full path but without extension"),
    ("WSL_CWD", "(WSL) Current directory"),
    ("WSL_RELDIR", "(WSL) File path relativize to current directory"),
    ("WSL_RELNAME", "(WSL) File name relativize to current directory"),
    ("WSL_ROOT", "(WSL) Project root directory"),
];

/// Failure of a bracket-scan resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("in {mark}: internal variable \"{name}\" is undefined")]
    Undefined { name: String, mark: String },
    #[error("in {mark}: no input provided for \"{name}\"")]
    EmptyInput { name: String, mark: String },
}

/// Splits `text` at the first `sep` into `(head, found, tail)`.
pub(crate) fn partition(text: &str, sep: char) -> (&str, bool, &str) {
    match text.find(sep) {
        Some(pos) => (&text[..pos], true, &text[pos + sep.len_utf8()..]),
        None => (text, false, ""),
    }
}

/// How a resolver answers for one bracketed name.
pub enum Resolution {
    /// Replace the token with this text.
    Value(String),
    /// The name cannot be resolved and no default applies; expansion of the
    /// whole text is abandoned with this error.
    Undefined(ExpandError),
}

/// Generic bracket-scan substitution.
///
/// Finds the next `open` token, the next `close` after it, hands the trimmed
/// enclosed text to the resolver and substitutes the whole bracketed
/// occurrence. The scan resumes *after* the substituted text, and results
/// are memoized per exact token, so duplicate tokens resolve once and
/// resolver output is never re-scanned (a self-referential value cannot
/// loop).
pub fn mark_replace(
    text: &str,
    open: &str,
    close: &str,
    resolver: &mut dyn FnMut(&str, &str) -> Resolution,
) -> Result<String, ExpandError> {
    let mut output = text.to_string();
    let mut pos = 0usize;
    let mut memo: HashMap<String, String> = HashMap::new();
    loop {
        let Some(rel) = output[pos..].find(open) else {
            break;
        };
        let p1 = pos + rel;
        let after_open = p1 + open.len();
        let Some(rel2) = output[after_open..].find(close) else {
            break;
        };
        let p2 = after_open + rel2;
        let name = output[after_open..p2].to_string();
        let mark = format!("{open}{name}{close}");
        let cached = memo.get(&mark).cloned();
        let value = match cached {
            Some(value) => value,
            None => match resolver(commons::strip(&name), &mark) {
                Resolution::Value(value) => {
                    memo.insert(mark, value.clone());
                    value
                }
                Resolution::Undefined(err) => return Err(err),
            },
        };
        output.replace_range(p1..p2 + close.len(), &value);
        pos = p1 + value.len();
    }
    Ok(output)
}

/// Resolver for `$(+name[:default])` and `$(VIM:name[:default])`: the task's
/// own environment table, with `-E` shadow overrides taking precedence.
/// Without a default, a missing name is undefined.
fn resolve_user_environ(
    text: &str,
    mark: &str,
    environ: &Section,
    shadow: &ShadowOverrides,
) -> Resolution {
    let (key, has_default, default) = partition(text, ':');
    let key = commons::strip(key);
    if let Some(value) = shadow.environ.get(key) {
        return Resolution::Value(value.clone());
    }
    match environ.get(key) {
        Some(value) => Resolution::Value(value.to_string()),
        None if has_default => Resolution::Value(default.to_string()),
        None => Resolution::Undefined(ExpandError::Undefined {
            name: key.to_string(),
            mark: mark.to_string(),
        }),
    }
}

/// Resolver for `$(%name[:default])`: the OS environment. Always resolves,
/// defaulting to the (trimmed) default or an empty string.
fn resolve_os_environ(text: &str) -> Resolution {
    let (key, _, default) = partition(text, ':');
    let key = commons::strip(key);
    let value = env::var(key).unwrap_or_else(|_| commons::strip(default).to_string());
    Resolution::Value(value)
}

/// Expands the user-environment and OS-environment placeholder families.
pub fn expand_environ(
    text: &str,
    environ: &Section,
    shadow: &ShadowOverrides,
) -> Result<String, ExpandError> {
    let mut user = |name: &str, mark: &str| resolve_user_environ(name, mark, environ, shadow);
    let text = mark_replace(text, "$(+", ")", &mut user)?;
    let text = mark_replace(&text, "$(VIM:", ")", &mut user)?;
    let mut os = |name: &str, _mark: &str| resolve_os_environ(name);
    mark_replace(&text, "$(%", ")", &mut os)
}

/// `(stem, extension-with-dot)` of a file name, `splitext` style: the
/// extension of `a.tar.gz` is `.gz`, and a bare leading dot is no extension.
fn split_ext(name: &str) -> (String, String) {
    let path = Path::new(name);
    match path.extension() {
        Some(ext) => {
            let ext = format!(".{}", ext.to_string_lossy());
            let stem = name
                .strip_suffix(ext.as_str())
                .unwrap_or(name)
                .to_string();
            (stem, ext)
        }
        None => (name.to_string(), String::new()),
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Translates a Windows path for WSL consumption: `X:/rest` becomes
/// `/mnt/x/rest`, anything else is passed through with forward slashes.
pub fn path_win2unix(path: &str, prefix: &str) -> String {
    let path = path.replace('\\', "/");
    let mut chars = path.chars();
    let drive = chars.next();
    if let Some(drive) = drive
        && drive.is_ascii_alphabetic()
        && path.get(1..3) == Some(":/")
    {
        let rest = path.get(3..).unwrap_or("");
        return format!("{}/{}/{}", prefix, drive.to_ascii_lowercase(), rest);
    }
    path
}

/// The path-bearing macro stems that gain a `WSL_` twin on Windows.
const WSL_STEMS: &[&str] = &[
    "FILEPATH", "FILEDIR", "FILENAME", "FILEEXT", "FILENOEXT", "PATHNOEXT", "CWD", "RELDIR",
    "RELNAME", "ROOT",
];

/// Builds the built-in macro table for one context. File-scoped macros are
/// explicitly unavailable (not empty) when a directory is targeted, so the
/// resolver can reject commands that require a file.
pub fn expand_builtin(context: &Context, profile: &str) -> MacroTable {
    let mut macros = MacroTable::default();
    let cwd = env::current_dir()
        .map(|p| commons::absolute(&p))
        .unwrap_or_default();
    if context.is_file() {
        let name = basename(&context.target);
        let (noext, ext) = split_ext(&name);
        let full = path_str(&context.target);
        let (pathnoext, _) = split_ext(&full);
        macros.set("VIM_FILEPATH", Some(full));
        macros.set("VIM_FILENAME", Some(name));
        macros.set("VIM_FILEDIR", Some(path_str(&commons::absolute(&context.home))));
        macros.set("VIM_FILETYPE", context.filetype.clone());
        macros.set("VIM_FILEEXT", Some(ext));
        macros.set("VIM_FILENOEXT", Some(noext));
        macros.set("VIM_PATHNOEXT", Some(pathnoext));
        macros.set(
            "VIM_RELDIR",
            Some(path_str(&commons::relative_to(&context.home, &cwd))),
        );
        macros.set(
            "VIM_RELNAME",
            Some(path_str(&commons::relative_to(&context.target, &cwd))),
        );
    } else {
        for name in [
            "VIM_FILEPATH", "VIM_FILENAME", "VIM_FILEDIR", "VIM_FILETYPE", "VIM_FILEEXT",
            "VIM_FILENOEXT", "VIM_PATHNOEXT", "VIM_RELDIR", "VIM_RELNAME",
        ] {
            macros.set(name, None);
        }
    }
    macros.set("VIM_CWD", Some(path_str(&cwd)));
    macros.set("VIM_ROOT", Some(path_str(&context.root)));
    macros.set("VIM_DIRNAME", Some(basename(&cwd)));
    macros.set("VIM_PRONAME", Some(basename(&context.root)));
    macros.set("VIM_PROFILE", Some(profile.to_string()));
    if cfg!(windows) {
        mirror_wsl(&mut macros);
    }
    macros
}

/// Recomputes the cwd-derived macros right before execution, after the
/// working directory may have changed.
pub fn refresh_cwd_macros(macros: &mut MacroTable, context: &Context) {
    let cwd = env::current_dir()
        .map(|p| commons::absolute(&p))
        .unwrap_or_default();
    macros.set("VIM_CWD", Some(path_str(&cwd)));
    macros.set("VIM_DIRNAME", Some(basename(&cwd)));
    if context.is_file() {
        macros.set(
            "VIM_RELDIR",
            Some(path_str(&commons::relative_to(&context.home, &cwd))),
        );
        macros.set(
            "VIM_RELNAME",
            Some(path_str(&commons::relative_to(&context.target, &cwd))),
        );
    }
    if cfg!(windows) {
        mirror_wsl(macros);
    }
}

fn mirror_wsl(macros: &mut MacroTable) {
    for stem in WSL_STEMS {
        let src = format!("VIM_{stem}");
        if macros.contains(&src) {
            let translated = macros.get(&src).map(|v| path_win2unix(v, "/mnt"));
            macros.set(&format!("WSL_{stem}"), translated);
        }
    }
}

/// Single-pass literal substitution of the built-in macros (`$(NAME)`) and
/// the two fixed path literals `<root>` and `<cwd>`. Unavailable macros
/// substitute as empty strings; built-in names cannot nest, so one pass
/// always terminates.
pub fn replace_builtin(text: &str, macros: &MacroTable) -> String {
    let mut output = text.to_string();
    for (name, value) in macros.iter() {
        output = output.replace(&format!("$({name})"), value.unwrap_or(""));
    }
    output = output.replace("<root>", macros.get("VIM_ROOT").unwrap_or(""));
    output.replace("<cwd>", macros.get("VIM_CWD").unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TargetKind;
    use std::path::PathBuf;

    fn environ_with(entries: &[(&str, &str)]) -> Section {
        let mut section = Section::new();
        for (k, v) in entries {
            section.insert(k, v);
        }
        section
    }

    #[test]
    fn test_mark_replace_substitutes_and_counts_resolves_once() {
        let mut calls = 0;
        let mut resolver = |name: &str, _mark: &str| {
            calls += 1;
            Resolution::Value(format!("<{name}>"))
        };
        let out = mark_replace("a $(+x) b $(+x) c", "$(+", ")", &mut resolver).unwrap();
        assert_eq!(out, "a <x> b <x> c");
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_mark_replace_undefined_surfaces_name() {
        let environ = environ_with(&[]);
        let shadow = ShadowOverrides::default();
        let err = expand_environ("run $(+missing)", &environ, &shadow).unwrap_err();
        match err {
            ExpandError::Undefined { name, mark } => {
                assert_eq!(name, "missing");
                assert_eq!(mark, "$(+missing)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_environ_default_after_colon() {
        let environ = environ_with(&[("SET", "value")]);
        let shadow = ShadowOverrides::default();
        let out = expand_environ("$(+SET:zz) $(+MISSING:fallback)", &environ, &shadow).unwrap();
        assert_eq!(out, "value fallback");
    }

    #[test]
    fn test_shadow_override_beats_environ_table() {
        let environ = environ_with(&[("NAME", "from-table")]);
        let mut shadow = ShadowOverrides::default();
        shadow
            .environ
            .insert("NAME".to_string(), "from-shadow".to_string());
        let out = expand_environ("$(+NAME)", &environ, &shadow).unwrap();
        assert_eq!(out, "from-shadow");
    }

    #[test]
    fn test_vim_colon_alias_resolves_same_table() {
        let environ = environ_with(&[("CC", "gcc")]);
        let shadow = ShadowOverrides::default();
        let out = expand_environ("$(VIM:CC) -O2", &environ, &shadow).unwrap();
        assert_eq!(out, "gcc -O2");
    }

    #[test]
    fn test_self_referential_default_terminates() {
        let environ = environ_with(&[]);
        let shadow = ShadowOverrides::default();
        // The default reintroduces the open token; the output is not
        // re-scanned, so expansion must terminate without error.
        let out = expand_environ("$(+a:$(+a))", &environ, &shadow).unwrap();
        assert_eq!(out, "$(+a)");
    }

    #[test]
    fn test_os_environ_never_undefined() {
        let out = mark_replace(
            "$(%ASYNCTASK_TEST_SURELY_UNSET: fallback )",
            "$(%",
            ")",
            &mut |name, _| resolve_os_environ(name),
        )
        .unwrap();
        assert_eq!(out, "fallback");
    }

    fn file_context(path: &str, home: &str) -> Context {
        Context {
            target: PathBuf::from(path),
            home: PathBuf::from(home),
            kind: TargetKind::File,
            filetype: Some("c".to_string()),
            root: PathBuf::from(home),
        }
    }

    #[test]
    fn test_builtin_macros_for_file_target() {
        let context = file_context("/proj/src/main.c", "/proj/src");
        let macros = expand_builtin(&context, "debug");
        assert_eq!(macros.get("VIM_FILEPATH"), Some("/proj/src/main.c"));
        assert_eq!(macros.get("VIM_FILENAME"), Some("main.c"));
        assert_eq!(macros.get("VIM_FILEEXT"), Some(".c"));
        assert_eq!(macros.get("VIM_FILENOEXT"), Some("main"));
        assert_eq!(macros.get("VIM_PATHNOEXT"), Some("/proj/src/main"));
        assert_eq!(macros.get("VIM_FILETYPE"), Some("c"));
        assert_eq!(macros.get("VIM_PROFILE"), Some("debug"));
        assert!(macros.get("VIM_CWD").is_some());
    }

    #[test]
    fn test_builtin_macros_unavailable_for_directory_target() {
        let context = Context {
            target: PathBuf::from("/proj"),
            home: PathBuf::from("/proj"),
            kind: TargetKind::Directory,
            filetype: None,
            root: PathBuf::from("/proj"),
        };
        let macros = expand_builtin(&context, "debug");
        // Present in the table, but explicitly unavailable.
        assert!(macros.contains("VIM_FILEPATH"));
        assert_eq!(macros.get("VIM_FILEPATH"), None);
        assert_eq!(macros.get("VIM_PRONAME"), Some("proj"));
    }

    #[test]
    fn test_replace_builtin_substitutes_literals() {
        let context = file_context("/proj/src/main.c", "/proj/src");
        let macros = expand_builtin(&context, "release");
        let out = replace_builtin("gcc $(VIM_FILEPATH) -o $(VIM_FILENOEXT) # <root>", &macros);
        assert!(out.starts_with("gcc /proj/src/main.c -o main"));
        assert!(out.ends_with("# /proj/src"));
    }

    #[test]
    fn test_path_win2unix_drive_mapping() {
        assert_eq!(path_win2unix("D:\\work\\kcp", "/mnt"), "/mnt/d/work/kcp");
        assert_eq!(path_win2unix("C:/x/y", "/mnt"), "/mnt/c/x/y");
        assert_eq!(path_win2unix("relative\\path", "/mnt"), "relative/path");
    }

    #[test]
    fn test_split_ext_variants() {
        assert_eq!(split_ext("main.c"), ("main".into(), ".c".into()));
        assert_eq!(split_ext("archive.tar.gz"), ("archive.tar".into(), ".gz".into()));
        assert_eq!(split_ext("README"), ("README".into(), String::new()));
        assert_eq!(split_ext(".bashrc"), (".bashrc".into(), String::new()));
    }
}
