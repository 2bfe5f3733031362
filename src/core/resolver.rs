// src/core/resolver.rs

//! Task resolution: picks the effective field values for the invocation
//! context, validates macro usage, and expands the interactive-input
//! placeholders. The output is a command string ready for the environment
//! and built-in macro passes of the executor step.

use crate::constants::{CMDLINE_INVALID_MACROS, FILE_SCOPE_MACROS};
use crate::core::macros::{self, ExpandError, Resolution};
use crate::core::settings::Settings;
use crate::core::{commons, merger};
use crate::models::{Context, MacroTable, ShadowOverrides, Task, TaskTable};
use crate::system::prompt::InputProvider;
use colored::Colorize;
use std::path::PathBuf;
use thiserror::Error;

/// A resolution failure. Every variant is recoverable at the top level and
/// maps to its own exit code; where a configuration file is to blame, it is
/// named.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("not find task [{name}]")]
    TaskNotFound { name: String },

    #[error("no command defined in task [{name}]")]
    EmptyCommand {
        name: String,
        source_path: Option<PathBuf>,
    },

    #[error("task {field} requires a file name")]
    RequiresFile {
        field: &'static str,
        value: String,
        source_path: Option<PathBuf>,
    },

    #[error("{token} is invalid in command line")]
    InvalidMacro {
        token: String,
        field: &'static str,
        value: String,
        source_path: Option<PathBuf>,
    },

    #[error("command starting with colon is not allowed here")]
    ColonCommand { source_path: Option<PathBuf> },

    #[error("path not exists: {path}")]
    PathNotFound { path: String },

    #[error(transparent)]
    Expand(#[from] ExpandError),
}

impl ResolveError {
    /// A distinct non-zero status per failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TaskNotFound { .. } => 2,
            Self::EmptyCommand { .. } => 3,
            Self::RequiresFile { .. } | Self::InvalidMacro { .. } | Self::ColonCommand { .. } => 4,
            Self::PathNotFound { .. } => 5,
            Self::Expand(_) => 6,
        }
    }

    /// Prints the failure to stderr with its provenance and the offending
    /// field value.
    pub fn report(&self) {
        eprintln!("{} {}", "Error:".red().bold(), self);
        let source_path = match self {
            Self::EmptyCommand { source_path, .. }
            | Self::RequiresFile { source_path, .. }
            | Self::InvalidMacro { source_path, .. }
            | Self::ColonCommand { source_path } => source_path.as_ref(),
            _ => None,
        };
        if let Some(source_path) = source_path {
            eprintln!("from {}:", source_path.display());
        }
        match self {
            Self::RequiresFile { field, value, .. }
            | Self::InvalidMacro { field, value, .. } => {
                eprintln!("{}", format!("{field}={value}").cyan());
            }
            _ => {}
        }
    }
}

/// Selects the effective value of `field` for the invocation context.
///
/// Conditional variants (`field:filetypes` / `field/os`) are scanned in field
/// order: the `:`-qualifier is a comma-separated file-type list that must
/// contain the context's file type, the `/`-qualifier must equal the OS
/// identifier exactly. The first satisfied variant wins; the plain field is
/// the fallback.
pub fn select_field(task: &Task, field: &str, context: &Context, system: &str) -> Option<String> {
    for (key, value) in task.fields.iter() {
        if !key.contains(':') && !key.contains('/') {
            continue;
        }
        let (name, ft_qualifier, os_qualifier) = merger::trinity_split(key);
        if commons::strip(&name) != field {
            continue;
        }
        let ft_qualifier = commons::strip(&ft_qualifier);
        let os_qualifier = commons::strip(&os_qualifier);
        if !ft_qualifier.is_empty() {
            let satisfied = ft_qualifier
                .split(',')
                .map(commons::strip)
                .any(|ft| context.filetype.as_deref() == Some(ft));
            if !satisfied {
                continue;
            }
        }
        if !os_qualifier.is_empty() && os_qualifier != system {
            continue;
        }
        return Some(value.to_string());
    }
    task.field(field).map(str::to_string)
}

/// Rejects commands that cannot work in this context: file-scoped macros
/// against a directory target, editor-state macros anywhere, and commands
/// reserved for editor-internal syntax (leading colon).
fn command_check(
    command: &str,
    cwd: &str,
    source: Option<&PathBuf>,
    context: &Context,
) -> Result<(), ResolveError> {
    if !context.is_file() {
        for stem in FILE_SCOPE_MACROS {
            for head in ["$(VIM_", "$(WSL_"] {
                let token = format!("{head}{stem})");
                if command.contains(&token) {
                    return Err(ResolveError::RequiresFile {
                        field: "command",
                        value: command.to_string(),
                        source_path: source.cloned(),
                    });
                }
                if cwd.contains(&token) {
                    return Err(ResolveError::RequiresFile {
                        field: "cwd",
                        value: cwd.to_string(),
                        source_path: source.cloned(),
                    });
                }
            }
        }
    }
    for stem in CMDLINE_INVALID_MACROS {
        let token = if *stem == "WSL_CFILE" {
            "$(WSL_CFILE)".to_string()
        } else {
            format!("$(VIM_{stem})")
        };
        if command.contains(&token) {
            return Err(ResolveError::InvalidMacro {
                token,
                field: "command",
                value: command.to_string(),
                source_path: source.cloned(),
            });
        }
        if cwd.contains(&token) {
            return Err(ResolveError::InvalidMacro {
                token,
                field: "cwd",
                value: cwd.to_string(),
                source_path: source.cloned(),
            });
        }
    }
    if command.trim_start().starts_with(':') {
        return Err(ResolveError::ColonCommand {
            source_path: source.cloned(),
        });
    }
    Ok(())
}

/// Resolver for the interactive-input placeholders `$(?...)` and `$(-...)`:
/// `name:default` prompts free text with an editable default, while
/// `name:a,b,c` offers a choice list (`&` accelerator marks are dropped).
/// `-D` shadow overrides answer without prompting. A blank final answer is
/// undefined.
fn resolve_input(
    text: &str,
    mark: &str,
    shadow: &ShadowOverrides,
    provider: &mut dyn InputProvider,
) -> Resolution {
    let (name, _, tail) = macros::partition(text, ':');
    let name = commons::strip(name);
    let tail = commons::strip(tail);
    if let Some(value) = shadow.input.get(name) {
        return Resolution::Value(value.clone());
    }
    let answer = if !tail.contains(',') {
        provider.free_text(&format!("Input argument ({name})"), tail)
    } else {
        let options: Vec<String> = tail
            .split(',')
            .map(|part| part.replace('&', ""))
            .map(|part| commons::strip(&part).to_string())
            .filter(|part| !part.is_empty())
            .collect();
        if options.is_empty() {
            provider.free_text(&format!("Input argument ({name})"), "")
        } else {
            match provider.choice(&format!("Select argument ({name})"), &options) {
                Some(index) => options.get(index).cloned().unwrap_or_default(),
                None => String::new(),
            }
        }
    };
    let answer = commons::strip(&answer).to_string();
    if answer.is_empty() {
        Resolution::Undefined(ExpandError::EmptyInput {
            name: name.to_string(),
            mark: mark.to_string(),
        })
    } else {
        Resolution::Value(answer)
    }
}

/// Expands the interactive-input placeholder families. `$(VIM_CWORD)` is
/// first redirected to `$(?CWORD)`: there is no cursor on a command line, so
/// the word is asked for instead.
pub fn expand_input(
    command: &str,
    shadow: &ShadowOverrides,
    provider: &mut dyn InputProvider,
) -> Result<String, ExpandError> {
    let command = command.replace("$(VIM_CWORD)", "$(?CWORD)");
    let mut handler = |name: &str, mark: &str| resolve_input(name, mark, shadow, provider);
    let command = macros::mark_replace(&command, "$(-", ")", &mut handler)?;
    macros::mark_replace(&command, "$(?", ")", &mut handler)
}

/// A task resolved for one invocation: the command after variant selection,
/// validation and input expansion; the environment and built-in macro passes
/// run at execution time, against the then-current working directory.
#[derive(Debug, Clone)]
pub struct ResolvedCommand {
    pub name: String,
    pub command: String,
    pub cwd: Option<String>,
    pub macros: MacroTable,
    pub source: Option<PathBuf>,
}

pub struct TaskResolver<'a> {
    pub settings: &'a Settings,
    pub context: &'a Context,
    pub table: &'a TaskTable,
    pub shadow: &'a ShadowOverrides,
}

impl TaskResolver<'_> {
    /// The command a listing should display for `task`.
    pub fn display_command(&self, task: &Task) -> String {
        select_field(task, "command", self.context, &self.settings.system).unwrap_or_default()
    }

    pub fn resolve(
        &self,
        name: &str,
        provider: &mut dyn InputProvider,
    ) -> Result<ResolvedCommand, ResolveError> {
        let task = self.table.get(name).ok_or_else(|| ResolveError::TaskNotFound {
            name: name.to_string(),
        })?;
        let source = task.source.clone();

        let command = select_field(task, "command", self.context, &self.settings.system)
            .map(|c| commons::strip(&c).to_string())
            .unwrap_or_default();
        if command.is_empty() {
            return Err(ResolveError::EmptyCommand {
                name: name.to_string(),
                source_path: source,
            });
        }
        let command = match select_field(task, "precmd", self.context, &self.settings.system)
            .map(|p| commons::strip(&p).to_string())
            .filter(|p| !p.is_empty())
        {
            Some(precmd) => format!("{precmd} && {command}"),
            None => command,
        };

        let cwd = select_field(task, "cwd", self.context, &self.settings.system);
        command_check(
            &command,
            cwd.as_deref().unwrap_or(""),
            task.source.as_ref(),
            self.context,
        )?;

        let command = expand_input(&command, self.shadow, provider)?;
        let command = commons::strip(&command).to_string();
        if command.is_empty() {
            return Err(ResolveError::EmptyCommand {
                name: name.to_string(),
                source_path: source,
            });
        }

        let macros = macros::expand_builtin(self.context, &self.settings.profile);
        let cwd = cwd.map(|c| macros::replace_builtin(&c, &macros));
        log::debug!("resolved [{}]: {}", name, command);

        Ok(ResolvedCommand {
            name: name.to_string(),
            command,
            cwd,
            macros,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfigSource, Origin, Section, TargetKind};
    use std::collections::HashSet;
    use std::sync::Arc;

    struct Scripted {
        free_answers: Vec<String>,
        choice_answer: Option<usize>,
        prompts: Vec<String>,
    }

    impl Scripted {
        fn new(free: &[&str], choice: Option<usize>) -> Self {
            Self {
                free_answers: free.iter().rev().map(|s| s.to_string()).collect(),
                choice_answer: choice,
                prompts: Vec::new(),
            }
        }
    }

    impl InputProvider for Scripted {
        fn free_text(&mut self, prompt: &str, initial: &str) -> String {
            self.prompts.push(prompt.to_string());
            self.free_answers
                .pop()
                .unwrap_or_else(|| initial.to_string())
        }

        fn choice(&mut self, prompt: &str, _options: &[String]) -> Option<usize> {
            self.prompts.push(prompt.to_string());
            self.choice_answer
        }
    }

    fn task_with(fields: &[(&str, &str)]) -> Task {
        let mut section = Section::new();
        for (k, v) in fields {
            section.insert(k, v);
        }
        Task {
            fields: section,
            source: Some(PathBuf::from("/tmp/.tasks")),
            origin: Some(Origin::Local),
        }
    }

    fn file_context(filetype: Option<&str>) -> Context {
        Context {
            target: PathBuf::from("/proj/src/main.c"),
            home: PathBuf::from("/proj/src"),
            kind: TargetKind::File,
            filetype: filetype.map(str::to_string),
            root: PathBuf::from("/proj"),
        }
    }

    fn dir_context() -> Context {
        Context {
            target: PathBuf::from("/proj"),
            home: PathBuf::from("/proj"),
            kind: TargetKind::Directory,
            filetype: None,
            root: PathBuf::from("/proj"),
        }
    }

    fn test_settings(system: &str) -> Settings {
        Settings {
            system: system.to_string(),
            profile: "debug".to_string(),
            cfg_name: ".tasks".to_string(),
            rtp_name: "tasks.ini".to_string(),
            global_config: Vec::new(),
            features: HashSet::new(),
            root_markers: Vec::new(),
            config: Arc::new(ConfigSource::default()),
        }
    }

    fn table_with(name: &str, task: Task) -> TaskTable {
        let mut table = TaskTable::default();
        table.tasks.insert(name.to_string(), task);
        table
    }

    #[test]
    fn test_select_field_filetype_variant_wins() {
        let task = task_with(&[
            ("command", "generic"),
            ("command:c,cpp", "compile"),
            ("command:python", "interpret"),
        ]);
        let context = file_context(Some("c"));
        assert_eq!(
            select_field(&task, "command", &context, "linux").as_deref(),
            Some("compile")
        );
        let context = file_context(Some("go"));
        assert_eq!(
            select_field(&task, "command", &context, "linux").as_deref(),
            Some("generic")
        );
    }

    #[test]
    fn test_select_field_os_qualifier_exact_match() {
        let task = task_with(&[("command", "generic"), ("command/win32", "win build")]);
        let context = dir_context();
        assert_eq!(
            select_field(&task, "command", &context, "win32").as_deref(),
            Some("win build")
        );
        assert_eq!(
            select_field(&task, "command", &context, "linux").as_deref(),
            Some("generic")
        );
    }

    #[test]
    fn test_select_field_first_matching_variant_wins() {
        let task = task_with(&[
            ("command:c", "first"),
            ("command:c,cpp", "second"),
            ("command", "plain"),
        ]);
        let context = file_context(Some("c"));
        assert_eq!(
            select_field(&task, "command", &context, "linux").as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_resolve_unknown_task() {
        let settings = test_settings("linux");
        let context = dir_context();
        let table = TaskTable::default();
        let shadow = ShadowOverrides::default();
        let resolver = TaskResolver {
            settings: &settings,
            context: &context,
            table: &table,
            shadow: &shadow,
        };
        let err = resolver
            .resolve("nope", &mut Scripted::new(&[], None))
            .unwrap_err();
        assert!(matches!(err, ResolveError::TaskNotFound { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_resolve_empty_command() {
        let settings = test_settings("linux");
        let context = dir_context();
        let table = table_with("hollow", task_with(&[("cwd", "/tmp")]));
        let shadow = ShadowOverrides::default();
        let resolver = TaskResolver {
            settings: &settings,
            context: &context,
            table: &table,
            shadow: &shadow,
        };
        let err = resolver
            .resolve("hollow", &mut Scripted::new(&[], None))
            .unwrap_err();
        assert!(matches!(err, ResolveError::EmptyCommand { .. }));
    }

    #[test]
    fn test_file_scoped_macro_rejected_for_directory_target() {
        let settings = test_settings("linux");
        let table = table_with("build", task_with(&[("command", "gcc $(VIM_FILEPATH)")]));
        let shadow = ShadowOverrides::default();
        let context = dir_context();
        let resolver = TaskResolver {
            settings: &settings,
            context: &context,
            table: &table,
            shadow: &shadow,
        };
        let err = resolver
            .resolve("build", &mut Scripted::new(&[], None))
            .unwrap_err();
        match err {
            ResolveError::RequiresFile { field, ref source_path, .. } => {
                assert_eq!(field, "command");
                assert_eq!(source_path.as_deref(), Some(std::path::Path::new("/tmp/.tasks")));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The same command against a file target resolves.
        let context = file_context(Some("c"));
        let resolver = TaskResolver {
            settings: &settings,
            context: &context,
            table: &table,
            shadow: &shadow,
        };
        let resolved = resolver
            .resolve("build", &mut Scripted::new(&[], None))
            .unwrap();
        assert_eq!(resolved.command, "gcc $(VIM_FILEPATH)");
        // The literal pass substitutes the actual file name.
        let expanded = macros::replace_builtin(&resolved.command, &resolved.macros);
        assert_eq!(expanded, "gcc /proj/src/main.c");
    }

    #[test]
    fn test_editor_state_macros_always_rejected() {
        let settings = test_settings("linux");
        let table = table_with("bad", task_with(&[("command", "notify $(VIM_GUI)")]));
        let shadow = ShadowOverrides::default();
        let context = file_context(Some("c"));
        let resolver = TaskResolver {
            settings: &settings,
            context: &context,
            table: &table,
            shadow: &shadow,
        };
        let err = resolver
            .resolve("bad", &mut Scripted::new(&[], None))
            .unwrap_err();
        match err {
            ResolveError::InvalidMacro { token, .. } => assert_eq!(token, "$(VIM_GUI)"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_colon_command_rejected() {
        let settings = test_settings("linux");
        let table = table_with("vimish", task_with(&[("command", "  :make")]));
        let shadow = ShadowOverrides::default();
        let context = dir_context();
        let resolver = TaskResolver {
            settings: &settings,
            context: &context,
            table: &table,
            shadow: &shadow,
        };
        let err = resolver
            .resolve("vimish", &mut Scripted::new(&[], None))
            .unwrap_err();
        assert!(matches!(err, ResolveError::ColonCommand { .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_precmd_joined_before_command() {
        let settings = test_settings("linux");
        let table = table_with(
            "build",
            task_with(&[("command", "make"), ("precmd", "mkdir -p out")]),
        );
        let shadow = ShadowOverrides::default();
        let context = dir_context();
        let resolver = TaskResolver {
            settings: &settings,
            context: &context,
            table: &table,
            shadow: &shadow,
        };
        let resolved = resolver
            .resolve("build", &mut Scripted::new(&[], None))
            .unwrap();
        assert_eq!(resolved.command, "mkdir -p out && make");
    }

    #[test]
    fn test_input_placeholder_free_text() {
        let shadow = ShadowOverrides::default();
        let mut provider = Scripted::new(&["target-x"], None);
        let out = expand_input("deploy $(?host:localhost)", &shadow, &mut provider).unwrap();
        assert_eq!(out, "deploy target-x");
        assert_eq!(provider.prompts, vec!["Input argument (host)"]);
    }

    #[test]
    fn test_input_placeholder_default_used_when_kept() {
        let shadow = ShadowOverrides::default();
        // The provider returns the editable initial value untouched.
        let mut provider = Scripted::new(&[], None);
        let out = expand_input("deploy $(?host:localhost)", &shadow, &mut provider).unwrap();
        assert_eq!(out, "deploy localhost");
    }

    #[test]
    fn test_input_placeholder_choice_list() {
        let shadow = ShadowOverrides::default();
        let mut provider = Scripted::new(&[], Some(1));
        let out = expand_input("build --mode $(?mode:&debug,&release)", &shadow, &mut provider)
            .unwrap();
        assert_eq!(out, "build --mode release");
    }

    #[test]
    fn test_input_shadow_override_skips_prompt() {
        let mut shadow = ShadowOverrides::default();
        shadow
            .input
            .insert("host".to_string(), "prefilled".to_string());
        let mut provider = Scripted::new(&["never-used"], None);
        let out = expand_input("ping $(?host)", &shadow, &mut provider).unwrap();
        assert_eq!(out, "ping prefilled");
        assert!(provider.prompts.is_empty());
    }

    #[test]
    fn test_input_empty_answer_is_undefined() {
        let shadow = ShadowOverrides::default();
        let mut provider = Scripted::new(&[""], None);
        let err = expand_input("run $(?arg)", &shadow, &mut provider).unwrap_err();
        assert!(matches!(err, ExpandError::EmptyInput { .. }));
    }

    #[test]
    fn test_duplicate_input_tokens_prompt_once() {
        let shadow = ShadowOverrides::default();
        let mut provider = Scripted::new(&["v1"], None);
        let out = expand_input("echo $(?x) and $(?x)", &shadow, &mut provider).unwrap();
        assert_eq!(out, "echo v1 and v1");
        assert_eq!(provider.prompts.len(), 1);
    }

    #[test]
    fn test_cword_redirected_to_input() {
        let shadow = ShadowOverrides::default();
        let mut provider = Scripted::new(&["keyword"], None);
        let out = expand_input("grep $(VIM_CWORD) .", &shadow, &mut provider).unwrap();
        assert_eq!(out, "grep keyword .");
        assert_eq!(provider.prompts, vec!["Input argument (CWORD)"]);
    }
}
