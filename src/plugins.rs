use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Read the plugin list from a `.ditz-plugins` file (a YAML sequence of names).
pub fn load_plugins(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(&text).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load plugins for startup. Failures never stop the program.
pub fn load_plugins_or_warn(path: &Path) -> Vec<String> {
    match load_plugins(path) {
        Ok(plugins) => {
            for plugin in &plugins {
                tracing::debug!("plugin {} listed; ruby plugins are not run by ditzui", plugin);
            }
            plugins
        }
        Err(e) => {
            tracing::debug!("can't load plugins file: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_plugin_names() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".ditz-plugins");
        fs::write(&path, "- git\n- issue-claiming\n").unwrap();
        assert_eq!(load_plugins(&path).unwrap(), vec!["git", "issue-claiming"]);
    }

    #[test]
    fn missing_file_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".ditz-plugins");
        assert!(load_plugins(&path).is_err());
        assert!(load_plugins_or_warn(&path).is_empty());
    }
}
