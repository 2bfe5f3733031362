// src/cli/args.rs

use clap::Parser;

/// Execute tasks defined in layered `.tasks` configuration files.
#[derive(Parser, Debug, Default)]
#[command(name = "asynctask", version, about)]
pub struct Cli {
    /// The task to run. In list/macro/interactive modes this positional is
    /// the target path instead.
    pub task: Option<String>,

    /// Target file or directory providing the macro context. Defaults to
    /// the current directory.
    pub path: Option<String>,

    /// List the visible tasks for the target.
    #[arg(short = 'l', long)]
    pub list: bool,

    /// List every task, including hidden ones (names starting with a dot).
    #[arg(short = 'L', long)]
    pub list_all: bool,

    /// With a listing: plain rows, no header or source lines.
    #[arg(long)]
    pub raw: bool,

    /// Display the built-in command macros for the target.
    #[arg(short = 'm', long)]
    pub macros: bool,

    /// Display the WSL view of the command macros.
    #[arg(short = 'M', long = "wsl-macros")]
    pub wsl_macros: bool,

    /// Pick a task from a numbered menu.
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Pick a task with the configured fuzzy finder.
    #[arg(short = 'f', long)]
    pub fzf: bool,

    /// Build profile for this invocation (default: debug).
    #[arg(short = 'p', long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Echo the expanded command before running it.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Pre-answer an interactive-input placeholder (repeatable).
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE")]
    pub define: Vec<String>,

    /// Override a task-environment variable (repeatable).
    #[arg(short = 'E', long = "env", value_name = "NAME=VALUE")]
    pub env: Vec<String>,
}
