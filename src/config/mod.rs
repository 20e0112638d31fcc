use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::history::DEFAULT_MAX_HISTORY_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "cartographer";
const APP_CONFIG_FILE: &str = "config.json";

/// Editor settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub max_history_size: usize,
    pub default_grid_size: u32,
    pub show_grid: bool,
    pub snap_to_grid: bool,
    pub default_zoom_percent: u16,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            default_grid_size: 1,
            show_grid: true,
            snap_to_grid: false,
            default_zoom_percent: 100,
        }
    }
}

pub fn load_editor_config() -> EditorConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_editor_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_editor_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> EditorConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return EditorConfig::default(),
    };
    if !path.exists() {
        return EditorConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse_editor_config(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            EditorConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            EditorConfig::default()
        }
    }
}

fn parse_editor_config(contents: &str) -> serde_json::Result<EditorConfig> {
    serde_json::from_str(contents)
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "cartographer",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/config-root/cartographer/config.json")
        );
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path(
            "cartographer",
            "config.json",
            None,
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/home/.config/cartographer/config.json")
        );
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("cartographer", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let config =
            parse_editor_config(r#"{"max_history_size": 10, "snap_to_grid": true}"#)
                .expect("valid config");
        assert_eq!(config.max_history_size, 10);
        assert!(config.snap_to_grid);
        assert_eq!(config.default_zoom_percent, 100);
        assert!(config.show_grid);
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let root = std::env::temp_dir().join("cartographer-config-test-missing");
        let config = load_editor_config_with(Some(&root), None);
        assert_eq!(config, EditorConfig::default());
    }
}
