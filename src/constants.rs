// src/constants.rs

/// The name of the directory holding the global settings file (under the
/// system config directory, e.g. `~/.config/asynctask`).
pub const SETTINGS_DIR_NAME: &str = "asynctask";

/// The name of the global settings file (inside the settings directory).
pub const SETTINGS_FILENAME: &str = "asynctask.ini";

/// Default file name(s) for local task configuration, searched in every
/// ancestor directory. A comma-separated list is accepted.
pub const DEFAULT_CFG_NAME: &str = ".tasks";

/// Default file name for global (runtimepath-style) task configuration.
pub const DEFAULT_RTP_NAME: &str = "tasks.ini";

/// Default comma-separated project-root markers.
pub const DEFAULT_ROOT_MARKERS: &str = ".git,.svn,.project,.hg,.root";

/// Default build profile.
pub const DEFAULT_PROFILE: &str = "debug";

/// Section/key names that never denote tasks: `*` and `+` hold the task
/// environment, `-` and `+` the shadow-override namespaces.
pub const RESERVED_NAMES: &[&str] = &["*", "+", "-", "%", "#"];

/// Self-reference token replaced with the configuration file's directory.
pub const TOKEN_INIHOME: &str = "$(VIM_INIHOME)";

/// Self-reference token replaced with the configuration file's absolute path.
pub const TOKEN_ININAME: &str = "$(VIM_ININAME)";

// Environment variables consulted at startup. All optional.
pub const ENV_SYSTEM: &str = "VIM_TASK_SYSTEM";
pub const ENV_PROFILE: &str = "VIM_TASK_PROFILE";
pub const ENV_CFG_NAME: &str = "VIM_TASK_CFG_NAME";
pub const ENV_RTP_NAME: &str = "VIM_TASK_RTP_NAME";
pub const ENV_EXTRA_CONFIG: &str = "VIM_TASK_EXTRA_CONFIG";
pub const ENV_ROOT_MARKERS: &str = "VIM_TASK_ROOTMARK";

/// Macro stems that only make sense when a file is targeted. Checked as
/// `$(VIM_<stem>)` and `$(WSL_<stem>)` against directory targets.
pub const FILE_SCOPE_MACROS: &[&str] = &[
    "FILEPATH", "FILENAME", "FILEDIR", "FILEEXT", "FILETYPE", "FILENOEXT",
    "PATHNOEXT", "RELDIR", "RELNAME",
];

/// Macro stems that are never valid on a command line (they describe editor
/// state: cursor, GUI flag, version, screen geometry, server name). Checked
/// as `$(VIM_<stem>)`; `WSL_CFILE` is checked as `$(WSL_CFILE)`.
pub const CMDLINE_INVALID_MACROS: &[&str] = &[
    "CFILE", "CLINE", "GUI", "VERSION", "COLUMNS", "LINES", "SVRNAME",
    "WSL_CFILE",
];
