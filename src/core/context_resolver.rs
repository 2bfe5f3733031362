// src/core/context_resolver.rs

//! Builds the invocation [`Context`] from the optional target argument:
//! absolute target, file-or-directory kind, detected file type and the
//! project root.

use crate::core::resolver::ResolveError;
use crate::core::{commons, filetype, rootfind, settings::Settings};
use crate::models::{Context, TargetKind};
use std::env;
use std::path::{Path, PathBuf};

pub fn resolve(path_arg: Option<&str>, settings: &Settings) -> Result<Context, ResolveError> {
    let path_arg = path_arg.map(commons::strip).filter(|p| !p.is_empty());
    let target = match path_arg {
        Some(path) => {
            let absolute = commons::absolute(Path::new(path));
            if !absolute.exists() {
                return Err(ResolveError::PathNotFound {
                    path: path.to_string(),
                });
            }
            absolute
        }
        None => commons::absolute(&env::current_dir().unwrap_or_else(|_| PathBuf::from("."))),
    };

    let (kind, home) = if target.is_dir() {
        (TargetKind::Directory, target.clone())
    } else {
        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| target.clone());
        (TargetKind::File, parent)
    };

    let filetype = match kind {
        TargetKind::File => filetype::classify(&target, settings),
        TargetKind::Directory => None,
    };

    let root = rootfind::find_root(&home, &settings.root_markers, true)
        .unwrap_or_else(|| home.clone());
    log::debug!(
        "context: target={} kind={:?} filetype={:?} root={}",
        target.display(),
        kind,
        filetype,
        root.display()
    );

    Ok(Context {
        target,
        home,
        kind,
        filetype,
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_settings() -> Settings {
        Settings {
            system: "linux".to_string(),
            profile: "debug".to_string(),
            cfg_name: ".tasks".to_string(),
            rtp_name: "tasks.ini".to_string(),
            global_config: Vec::new(),
            features: HashSet::new(),
            root_markers: vec![".git".to_string()],
            config: Arc::new(crate::models::ConfigSource::default()),
        }
    }

    #[test]
    fn test_missing_path_is_a_resolve_error() {
        let settings = test_settings();
        let err = resolve(Some("/no/such/target"), &settings).unwrap_err();
        assert!(matches!(err, ResolveError::PathNotFound { .. }));
    }

    #[test]
    fn test_file_target_detects_type_and_root() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        let file = src.join("main.rs");
        fs::write(&file, b"fn main() {}\n").unwrap();

        let settings = test_settings();
        let context = resolve(Some(file.to_str().unwrap()), &settings).unwrap();
        assert_eq!(context.kind, TargetKind::File);
        assert_eq!(context.filetype.as_deref(), Some("rust"));
        assert_eq!(context.home, commons::absolute(&src));
        assert_eq!(context.root, commons::absolute(dir.path()));
    }

    #[test]
    fn test_directory_target_has_no_filetype() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings();
        let context = resolve(Some(dir.path().to_str().unwrap()), &settings).unwrap();
        assert_eq!(context.kind, TargetKind::Directory);
        assert!(context.filetype.is_none());
        assert_eq!(context.home, context.target);
        // No marker anywhere: the walk falls back to the start directory.
        assert_eq!(context.root, commons::absolute(dir.path()));
    }
}
