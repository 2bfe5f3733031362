// src/system/executor.rs

use std::env;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("command '{command}' could not be executed: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("could not enter directory '{path}': {source}")]
    Chdir {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("current directory is not accessible: {0}")]
    CurrentDir(#[source] io::Error),
}

/// Runs a fully expanded command line through the platform shell, inheriting
/// the terminal, with `envs` added to the child environment. Returns the
/// child's exit code (1 when terminated without one).
pub fn run_shell(command_line: &str, envs: &[(String, String)]) -> Result<i32, ExecutionError> {
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command_line);
        c
    };
    command
        .envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    let status = command.status().map_err(|e| ExecutionError::Spawn {
        command: command_line.to_string(),
        source: e,
    })?;
    Ok(status.code().unwrap_or(1))
}

/// Runs `body` with the working directory changed to `dir` (when given).
/// The previous directory is restored on every exit path, including panics
/// and early returns from `body`.
pub fn with_directory<T>(
    dir: Option<&Path>,
    body: impl FnOnce() -> T,
) -> Result<T, ExecutionError> {
    let saved = env::current_dir().map_err(ExecutionError::CurrentDir)?;
    if let Some(dir) = dir {
        env::set_current_dir(dir).map_err(|e| ExecutionError::Chdir {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    let _restore = scopeguard::guard(saved, |saved| {
        if let Err(err) = env::set_current_dir(&saved) {
            log::warn!("could not restore directory {}: {}", saved.display(), err);
        }
    });
    Ok(body())
}
