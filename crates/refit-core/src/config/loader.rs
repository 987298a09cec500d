//! Configuration file discovery and loading

use super::refit_config::RefitConfig;
use crate::error::RefitError;
use crate::result::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched for, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[".refitrc.json", ".refitrc.toml", "refit.json"];

pub struct ConfigLoader;

impl ConfigLoader {
    /// Search for a config file starting at `start_path`
    ///
    /// Each directory is checked for [`CONFIG_FILE_NAMES`] in order before
    /// moving to its parent, up to the filesystem root.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| RefitError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load a configuration file, choosing the format by extension
    pub fn load_from_file(path: &Path) -> Result<RefitConfig> {
        let content = fs::read_to_string(path).map_err(|e| RefitError::io_error(path, e))?;
        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => RefitConfig::from_json(&content).map_err(|e| e.to_string()),
            Some("toml") => RefitConfig::from_toml(&content).map_err(|e| e.to_string()),
            _ => Err("unsupported file extension (expected .json or .toml)".to_string()),
        };
        parsed.map_err(|message| {
            RefitError::config_error(format!(
                "Failed to load config from '{}': {message}",
                path.display()
            ))
        })
    }

    /// Load from an explicit path, or discover one from `start_dir`
    ///
    /// Without an explicit path a missing config is not an error; the
    /// defaults apply.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<RefitConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(RefitError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(RefitConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleFilter;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_from_file_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "refit.json",
            r#"{ "rules": { "disabled": ["remove-comment"] } }"#,
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert!(!config.rules_config().is_enabled("remove-comment"));
    }

    #[test]
    fn test_auto_discover_from_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("src/nested");
        fs::create_dir_all(&nested).unwrap();
        create_temp_config(temp_dir.path(), ".refitrc.toml", "[rules]\nall = true\n");

        let found = ConfigLoader::auto_discover(&nested).unwrap();
        assert_eq!(found.unwrap().file_name().unwrap(), ".refitrc.toml");
    }

    #[test]
    fn test_auto_discover_priority() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_config(temp_dir.path(), "refit.json", "{}");
        create_temp_config(temp_dir.path(), ".refitrc.toml", "");
        create_temp_config(temp_dir.path(), ".refitrc.json", "{}");

        let found = ConfigLoader::auto_discover(temp_dir.path()).unwrap();
        assert_eq!(found.unwrap().file_name().unwrap(), ".refitrc.json");
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(temp_dir.path(), "refit.json", "{ invalid json }");

        let err = ConfigLoader::load_from_file(&config_path).unwrap_err();
        assert!(matches!(err, RefitError::Config { .. }));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Some(Path::new("nonexistent.json")), None);
        assert!(matches!(result, Err(RefitError::Config { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(temp_dir.path(), "refit.yaml", "rules: {}");
        assert!(ConfigLoader::load_from_file(&config_path).is_err());
    }
}
