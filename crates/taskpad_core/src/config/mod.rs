use crate::controller::{EmptyEditPolicy, TaskListController};
use crate::error::AppError;
use crate::ids::{IdStrategy, id_source_for};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKPAD_CONFIG_PATH";
const APP_DIR: &str = "taskpad";

/// ANSI styles used by the list renderer. Empty strings mean no styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: &'static str,
    pub done: &'static str,
    pub reset: &'static str,
}

const PLAIN: Palette = Palette {
    accent: "",
    done: "",
    reset: "",
};

const NOIR: Palette = Palette {
    accent: "\x1b[38;5;208m",
    done: "\x1b[9;38;5;250m",
    reset: "\x1b[0m",
};

const SOLARIZED: Palette = Palette {
    accent: "\x1b[38;5;108m",
    done: "\x1b[9;38;5;245m",
    reset: "\x1b[0m",
};

impl Palette {
    fn paint(&self, style: &str, text: &str) -> String {
        if style.is_empty() {
            text.to_string()
        } else {
            format!("{style}{text}{}", self.reset)
        }
    }

    pub fn accentize(&self, text: &str) -> String {
        self.paint(self.accent, text)
    }

    /// Styling for completed tasks (struck through where supported).
    pub fn strike(&self, text: &str) -> String {
        self.paint(self.done, text)
    }

    #[cfg(test)]
    pub fn is_plain(&self) -> bool {
        *self == PLAIN
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match canonical_theme_name_option(theme).as_deref() {
        Some("noir") => NOIR,
        Some("solarized") => SOLARIZED,
        _ => PLAIN,
    }
}

fn canonical_theme_name_option(theme: Option<&str>) -> Option<String> {
    theme.and_then(|value| canonical_theme_name(value))
}

/// Lowercases `raw` and folds runs of non-alphanumerics into single
/// underscores. `None` when nothing alphanumeric is left.
pub fn canonical_key(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let name = match canonical_key(raw).as_deref() {
        None | Some("vanilla") | Some("light") => "default".to_string(),
        Some("dark") | Some("dark_mode") | Some("darkmode") => "noir".to_string(),
        Some(other) => other.to_string(),
    };
    Some(name)
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub edit_policy: EmptyEditPolicy,
    #[serde(default)]
    pub ids: IdStrategy,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Config {
    pub fn palette(&self) -> Palette {
        palette_for_theme(self.theme.as_deref())
    }

    /// A fresh, empty controller honoring the edit policy and id strategy.
    pub fn controller(&self) -> TaskListController {
        TaskListController::with_id_source(id_source_for(self.ids))
            .with_edit_policy(self.edit_policy)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub edit_policy: Option<EmptyEditPolicy>,
    pub ids: Option<IdStrategy>,
    pub aliases: HashMap<String, String>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR).join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid config in {}: {}", path.display(), err))
    })?;
    config.theme = canonical_theme_name_option(config.theme.as_deref());
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_deref() {
        merged.theme = canonical_theme_name(theme);
    }

    if let Some(policy) = overrides.edit_policy {
        merged.edit_policy = policy;
    }

    if let Some(ids) = overrides.ids {
        merged.ids = ids;
    }

    for (alias, value) in overrides.aliases.iter() {
        merged.aliases.insert(alias.clone(), value.clone());
    }

    merged
}
