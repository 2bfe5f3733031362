// src/core/settings.rs

//! Process-level settings: the global settings file (`asynctask.ini`) merged
//! with environment-variable overrides. Everything here has a built-in
//! default; a missing settings file is normal.

use crate::constants::{
    DEFAULT_CFG_NAME, DEFAULT_PROFILE, DEFAULT_ROOT_MARKERS, DEFAULT_RTP_NAME, ENV_CFG_NAME,
    ENV_EXTRA_CONFIG, ENV_PROFILE, ENV_ROOT_MARKERS, ENV_RTP_NAME, ENV_SYSTEM, SETTINGS_DIR_NAME,
    SETTINGS_FILENAME,
};
use crate::core::{commons, ini};
use crate::models::ConfigSource;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Settings {
    /// OS identifier used by `/`-qualified field variants (`win32`/`linux`
    /// unless overridden).
    pub system: String,
    /// Active build profile (`debug` unless overridden).
    pub profile: String,
    /// Comma-separated local config file name(s).
    pub cfg_name: String,
    /// Global (runtimepath-style) config file name.
    pub rtp_name: String,
    /// Global-tier search list, in increasing precedence order.
    pub global_config: Vec<PathBuf>,
    /// Enabled feature flags.
    pub features: HashSet<String>,
    /// Project-root markers for the upward walk.
    pub root_markers: Vec<String>,
    /// The parsed settings file, kept for secondary lookups (`[filetypes]`,
    /// fzf options).
    pub config: Arc<ConfigSource>,
}

/// True when the variable is set to a non-blank value.
fn env_present(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// `~`-expanded absolute path for a configured search entry.
fn expand_path(text: &str) -> PathBuf {
    commons::absolute(Path::new(shellexpand::tilde(text).as_ref()))
}

/// The base config directory: `$XDG_CONFIG_HOME`, else `~/.config`.
fn xdg_config_dir() -> PathBuf {
    if let Some(xdg) = env_present("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
}

impl Settings {
    pub fn load() -> Self {
        let xdg = xdg_config_dir();
        let settings_path = xdg.join(SETTINGS_DIR_NAME).join(SETTINGS_FILENAME);
        let config = if settings_path.exists() {
            ini::load(&settings_path, None)
        } else {
            Arc::new(ConfigSource::default())
        };
        let defaults = config.section("default");
        let lookup = |key: &str| -> Option<String> {
            defaults
                .and_then(|s| s.get(key))
                .map(|v| commons::strip(v).to_string())
                .filter(|v| !v.is_empty())
        };

        let mut system = lookup("system")
            .unwrap_or_else(|| if cfg!(windows) { "win32" } else { "linux" }.to_string());
        let mut profile = DEFAULT_PROFILE.to_string();
        let mut cfg_name = lookup("cfg_name").unwrap_or_else(|| DEFAULT_CFG_NAME.to_string());
        let mut rtp_name = lookup("rtp_name").unwrap_or_else(|| DEFAULT_RTP_NAME.to_string());

        // Environment overrides beat the settings file.
        if let Some(value) = env_present(ENV_SYSTEM) {
            system = value;
        }
        if let Some(value) = env_present(ENV_PROFILE) {
            profile = value;
        }
        if let Some(value) = env_present(ENV_CFG_NAME) {
            cfg_name = value;
        }
        if let Some(value) = env_present(ENV_RTP_NAME) {
            rtp_name = value;
        }

        let mut global_config = vec![
            expand_path(&format!("~/.vim/{rtp_name}")),
            xdg.join("nvim").join(&rtp_name),
            xdg.join(SETTINGS_DIR_NAME).join(&rtp_name),
        ];
        for key in ["global_config", "extra_config"] {
            if let Some(value) = lookup(key) {
                for item in commons::split_list(&value) {
                    let path = expand_path(&item);
                    if path.exists() {
                        global_config.push(path);
                    }
                }
            }
        }
        if let Some(value) = env_present(ENV_EXTRA_CONFIG) {
            for item in commons::split_list(&value) {
                let path = expand_path(&item);
                if path.exists() {
                    global_config.push(path);
                }
            }
        }

        let mut features = HashSet::new();
        if let Some(value) = lookup("feature") {
            features.extend(commons::split_list(&value));
        }

        let mut markers = DEFAULT_ROOT_MARKERS.to_string();
        if let Some(value) = lookup("root_marker") {
            markers = value;
        }
        if let Some(value) = env_present(ENV_ROOT_MARKERS) {
            markers = value;
        }
        let root_markers = commons::split_list(&markers);

        log::debug!(
            "settings: system={} profile={} cfg_name={} rtp_name={} features={:?}",
            system,
            profile,
            cfg_name,
            rtp_name,
            features
        );

        Self {
            system,
            profile,
            cfg_name,
            rtp_name,
            global_config,
            features,
            root_markers,
            config,
        }
    }

    /// A settings-file lookup with a default, for thin consumers (fzf
    /// binary name and flags).
    pub fn option(&self, section: &str, key: &str, default: &str) -> String {
        self.config
            .section(section)
            .and_then(|s| s.get(key))
            .map(|v| commons::strip(v).to_string())
            .unwrap_or_else(|| default.to_string())
    }
}
