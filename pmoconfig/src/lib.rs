//! # PMOTidal Configuration Module
//!
//! This module provides configuration management for PMOTidal, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Path-based getters and setters for configuration values
//!
//! The configuration is an explicit value: build it once and hand it to the
//! components that need it.
//!
//! ## Usage
//!
//! ```no_run
//! use pmoconfig::Config;
//!
//! let config = Config::load_config("")?;
//! let country = config.get_value(&["sources", "tidal", "country_code"])?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Mutex, MutexGuard},
};
use tracing::{debug, info};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmotidal.yaml");

const ENV_CONFIG_DIR: &str = "PMOTIDAL_CONFIG";
const ENV_PREFIX: &str = "PMOTIDAL_CONFIG__";
const DEFAULT_CONFIG_DIR: &str = ".pmotidal";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Configuration manager for PMOTidal
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing path-based getters/setters for configuration values
///
/// # Examples
///
/// ```no_run
/// use pmoconfig::Config;
///
/// let config = Config::load_config("/etc/pmotidal")?;
/// println!("Config file: {:?}", config.path());
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Config {
    config_dir: Option<String>,
    path: Option<String>,
    data: Mutex<Value>,
}

// Implémentation manuelle de Clone
impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self
            .data
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(DEFAULT_CONFIG_DIR).exists() {
            return DEFAULT_CONFIG_DIR.to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(DEFAULT_CONFIG_DIR);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        DEFAULT_CONFIG_DIR.to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("{} is not a directory", path.display()));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PMOTIDAL_CONFIG` environment variable
    /// 3. `.pmotidal` in the current directory
    /// 4. `.pmotidal` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for write permission.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    ///
    /// # Arguments
    ///
    /// * `directory` - The directory containing the config.yaml file, or empty to use defaults
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir=%config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join(CONFIG_FILE_NAME);
        let path = config_file_path.to_string_lossy().to_string();

        let external: Value = match fs::read(&path) {
            Ok(data) => {
                info!(config_file=%path, "Loaded config file");
                serde_yaml::from_slice(&data)?
            }
            Err(_) => {
                info!(config_file=%path, "Config file not found, using default embedded config");
                Value::Mapping(Mapping::new())
            }
        };

        let config = Config {
            config_dir: Some(config_dir),
            path: Some(path),
            data: Mutex::new(Self::build_value(&external)?),
        };

        config.save()?;
        Ok(config)
    }

    /// Builds an in-memory configuration from a YAML document
    ///
    /// The document is merged over the embedded defaults and environment
    /// overrides are applied, exactly as for [`Config::load_config`], but
    /// nothing is ever written to disk.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let external: Value = if yaml.trim().is_empty() {
            Value::Mapping(Mapping::new())
        } else {
            serde_yaml::from_str(yaml)?
        };

        Ok(Config {
            config_dir: None,
            path: None,
            data: Mutex::new(Self::build_value(&external)?),
        })
    }

    fn build_value(external: &Value) -> Result<Value> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        if !external.is_null() {
            merge_yaml(&mut value, &Self::lower_keys_value(external.clone()));
        }
        Self::apply_env_overrides(&mut value);
        Ok(value)
    }

    /// Returns the directory holding `config.yaml`, if file-backed
    pub fn directory(&self) -> Option<&str> {
        self.config_dir.as_deref()
    }

    /// Returns the path of `config.yaml`, if file-backed
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn data(&self) -> Result<MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("Configuration lock poisoned"))
    }

    /// Saves the current configuration to the config.yaml file
    ///
    /// In-memory configurations are left untouched.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let yaml = serde_yaml::to_string(&*self.data()?)?;
        fs::write(path, yaml)?;
        debug!(config_file=%path, "Configuration saved");
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["sources", "tidal", "quality"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.data()?;
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data()?;
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                match map.get(&Value::String(key.to_lowercase())) {
                    Some(next) => current = next,
                    None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
                }
            } else {
                return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    /// Gets a non-empty string value, `None` when absent, empty or not a string
    pub fn get_string(&self, path: &[&str]) -> Option<String> {
        match self.get_value(path) {
            Ok(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                if let Err(e) = Self::set_value_internal(config, &key_path, yaml_value) {
                    debug!(env_var=%key, error=%e, "Ignoring environment override");
                }
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    let new_key = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    new_map.insert(new_key, Self::lower_keys_value(v));
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }
}

/// Merges external YAML configuration into default configuration
///
/// This function recursively merges two YAML value trees:
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_loaded() {
        let config = Config::from_yaml_str("").unwrap();
        assert_eq!(
            config.get_string(&["sources", "tidal", "api_base_url"]).as_deref(),
            Some("https://api.tidal.com/v1")
        );
        assert!(config.get_string(&["accounts", "tidal", "client_id"]).is_none());
        assert!(config.path().is_none());
    }

    #[test]
    fn test_external_values_override_defaults() {
        let config = Config::from_yaml_str(
            "Sources:\n  TIDAL:\n    country_code: NO\n    quality: HI_RES_LOSSLESS\n",
        )
        .unwrap();
        // Les clés sont normalisées en minuscules
        assert_eq!(
            config.get_value(&["sources", "tidal", "quality"]).unwrap(),
            Value::String("HI_RES_LOSSLESS".into())
        );
        assert_eq!(
            config.get_value(&["sources", "tidal", "video_quality"]).unwrap(),
            Value::String("HIGH".into())
        );
    }

    #[test]
    fn test_set_and_get_value() {
        let config = Config::from_yaml_str("").unwrap();
        config
            .set_value(&["accounts", "tidal", "access_token"], Value::String("abc".into()))
            .unwrap();
        assert_eq!(
            config.get_string(&["accounts", "tidal", "access_token"]).as_deref(),
            Some("abc")
        );
        assert!(config.get_value(&["does", "not", "exist"]).is_err());
    }

    #[test]
    fn test_env_override() {
        env::set_var("PMOTIDAL_CONFIG__SOURCES__TIDAL__TIMEOUT_SECS", "12");
        let config = Config::from_yaml_str("").unwrap();
        env::remove_var("PMOTIDAL_CONFIG__SOURCES__TIDAL__TIMEOUT_SECS");
        assert_eq!(
            config.get_value(&["sources", "tidal", "timeout_secs"]).unwrap(),
            Value::Number(12.into())
        );
    }

    #[test]
    fn test_load_config_writes_merged_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "accounts:\n  tidal:\n    client_id: my-client\n",
        )
        .unwrap();

        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(
            config.get_string(&["accounts", "tidal", "client_id"]).as_deref(),
            Some("my-client")
        );

        let saved = fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(saved.contains("api_base_url"));
    }

    #[test]
    fn test_merge_yaml_replaces_scalars() {
        let mut default: Value = serde_yaml::from_str("a: 1\nb:\n  c: 2\n").unwrap();
        let external: Value = serde_yaml::from_str("b:\n  c: 3\n  d: 4\n").unwrap();
        merge_yaml(&mut default, &external);
        let expected: Value = serde_yaml::from_str("a: 1\nb:\n  c: 3\n  d: 4\n").unwrap();
        assert_eq!(default, expected);
    }
}
