use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const CONFIG_FN: &str = ".ditz-config";
pub const PLUGINS_FN: &str = ".ditz-plugins";
pub const DEFAULT_ISSUE_DIR: &str = ".ditz";

/// Per-user settings read from `.ditz-config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub issue_dir: Option<String>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(&text).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load the config, falling back to an empty one. A missing file is
    /// expected and stays quiet; a broken one is worth a warning.
    pub fn load(path: &Path) -> Config {
        match Config::from_file(path) {
            Ok(config) => config,
            Err(e @ Error::Read { .. }) => {
                tracing::debug!("using default config: {}", e);
                Config::default()
            }
            Err(e) => {
                tracing::warn!("using default config: {}", e);
                Config::default()
            }
        }
    }

    /// Identity stamped on new issues and close events.
    pub fn reporter(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

/// Walk up from `start` until a directory containing `name` is found.
pub fn find_dir_containing(start: &Path, name: impl AsRef<Path>) -> Option<PathBuf> {
    let name = name.as_ref();
    let mut current = start.to_path_buf();
    loop {
        if current.join(name).exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_falls_back_to_empty_identity() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(&tmp.path().join(CONFIG_FN));
        assert_eq!(config, Config::default());
        assert_eq!(config.reporter(), " <>");
    }

    #[test]
    fn reads_identity_and_issue_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FN);
        fs::write(&path, "name: Ann\nemail: ann@example.com\nissue_dir: bugs\n").unwrap();

        let config = Config::load(&path);
        assert_eq!(config.reporter(), "Ann <ann@example.com>");
        assert_eq!(config.issue_dir.as_deref(), Some("bugs"));
    }

    #[test]
    fn unparsable_file_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FN);
        fs::write(&path, "name: [unclosed\n").unwrap();

        assert!(matches!(Config::from_file(&path), Err(Error::Parse { .. })));
        assert_eq!(Config::load(&path), Config::default());
    }

    #[test]
    fn finds_nearest_ancestor() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("a").join(CONFIG_FN), "").unwrap();

        let found = find_dir_containing(&nested, CONFIG_FN).unwrap();
        assert_eq!(found, tmp.path().join("a"));
    }
}
