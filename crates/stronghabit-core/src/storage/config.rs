//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Storage backend selection (local SQLite or hosted remote)
//! - Daily cycle check interval
//! - Reminder window and spacing
//! - Notification content toggles
//!
//! Configuration is stored at `~/.config/stronghabit/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::reminder::ReminderConfig;

/// Which persistence backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Remote,
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Base URL of the hosted backend; required when backend = "remote".
    #[serde(default)]
    pub remote_url: String,
}

/// Daily cycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// How often the daemon checks for a day boundary, in seconds.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

/// Reminder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_start_hour")]
    pub start_hour: u8,
    #[serde(default = "default_end_hour")]
    pub end_hour: u8,
    #[serde(default = "default_min_interval_mins")]
    pub min_interval_mins: u32,
    #[serde(default = "default_max_interval_mins")]
    pub max_interval_mins: u32,
    /// How often the worker wakes to consider a reminder, in minutes.
    #[serde(default = "default_poll_interval_mins")]
    pub poll_interval_mins: u64,
    /// Random seed for reproducible reminder spacing (optional).
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Notification content toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub celebrations: bool,
    #[serde(default = "default_true")]
    pub milestones: bool,
    #[serde(default = "default_true")]
    pub badge: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/stronghabit/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_backend() -> StorageBackend {
    StorageBackend::Local
}
fn default_check_interval_secs() -> u64 {
    60
}
fn default_start_hour() -> u8 {
    9
}
fn default_end_hour() -> u8 {
    21
}
fn default_min_interval_mins() -> u32 {
    60
}
fn default_max_interval_mins() -> u32 {
    90
}
fn default_poll_interval_mins() -> u64 {
    15
}
fn default_true() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            remote_url: String::new(),
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
            min_interval_mins: default_min_interval_mins(),
            max_interval_mins: default_max_interval_mins(),
            poll_interval_mins: default_poll_interval_mins(),
            seed: None,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            celebrations: true,
            milestones: true,
            badge: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            cycle: CycleConfig::default(),
            reminders: RemindersConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err("config key is empty".into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| format!("unknown config key: {key}"))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| format!("unknown config key: {key}"))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse::<bool>()?),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| format!("cannot parse '{value}' as number"))?
                        } else {
                            return Err(format!("cannot parse '{value}' as number").into());
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value)?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
        }

        Err(format!("unknown config key: {key}").into())
    }

    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()?;
        Ok(())
    }

    /// Reminder engine settings derived from this config.
    pub fn reminder_config(&self) -> ReminderConfig {
        ReminderConfig {
            start_hour: self.reminders.start_hour,
            end_hour: self.reminders.end_hour,
            min_interval_mins: self.reminders.min_interval_mins,
            max_interval_mins: self.reminders.max_interval_mins,
            seed: self.reminders.seed,
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.storage.backend, StorageBackend::Local);
        assert_eq!(parsed.reminders.min_interval_mins, 60);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.cycle.check_interval_secs, 60);
        assert_eq!(cfg.reminders.start_hour, 9);
        assert_eq!(cfg.reminders.end_hour, 21);
        assert_eq!(cfg.reminders.min_interval_mins, 60);
        assert_eq!(cfg.reminders.max_interval_mins, 90);
        assert_eq!(cfg.reminders.poll_interval_mins, 15);
        assert!(cfg.reminders.seed.is_none());
        assert!(cfg.notifications.celebrations);
        assert!(cfg.notifications.badge);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("storage.backend").as_deref(), Some("local"));
        assert_eq!(cfg.get("reminders.start_hour").as_deref(), Some("9"));
        assert_eq!(cfg.get("notifications.badge").as_deref(), Some("true"));
        assert!(cfg.get("reminders.missing_key").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_bool() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "reminders.enabled", "false").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "reminders.enabled").unwrap(),
            &serde_json::Value::Bool(false)
        );
    }

    #[test]
    fn set_json_value_by_path_updates_nested_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "reminders.end_hour", "22").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "reminders.end_hour").unwrap(),
            &serde_json::Value::Number(22.into())
        );
    }

    #[test]
    fn set_json_value_by_path_updates_backend_string() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "storage.backend", "remote").unwrap();
        let parsed: Config = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.storage.backend, StorageBackend::Remote);
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "reminders.nonexistent", "1");
        assert!(result.is_err());
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_type() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "reminders.enabled", "not_a_bool");
        assert!(result.is_err());
    }

    #[test]
    fn reminder_config_mirrors_the_reminders_section() {
        let mut cfg = Config::default();
        cfg.reminders.start_hour = 7;
        cfg.reminders.seed = Some(99);
        let reminder = cfg.reminder_config();
        assert_eq!(reminder.start_hour, 7);
        assert_eq!(reminder.end_hour, 21);
        assert_eq!(reminder.seed, Some(99));
    }
}
