//! Per-module configuration loading.
//!
//! Each module that wants on-disk settings owns one [`ModuleConfig`] object.
//! The registry drives loading during world pre-initialization: the base
//! settings directory is joined with the module-supplied relative filename,
//! the file is parsed as TOML into a flat key/value store, and the module's
//! `on_load` extracts typed values from it. Any failure is logged and turns
//! into `false`; server startup never aborts over a module config.
//!
//! There is no hot reload and no write-back.

use crate::error::ConfigError;
use std::path::Path;
use toml::Value;
use tracing::error;

/// Flat key/value view over a parsed configuration file.
///
/// Lookup mirrors the host config subsystem: every getter takes a default
/// that is returned when the key is absent or has the wrong type.
#[derive(Debug, Clone, Default)]
pub struct ConfigValues {
    table: toml::Table,
}

impl ConfigValues {
    /// Parses TOML text into a value store.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let table = content.parse::<toml::Table>().map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { table })
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.table.get(key) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_str_or(&self, key: &str, default: &str) -> String {
        self.get_str(key).unwrap_or(default).to_string()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.table.get(key) {
            Some(Value::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.table.get(key) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        self.get_i64(key).unwrap_or(default)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.table.get(key) {
            Some(Value::Float(f)) => Some(*f),
            Some(Value::Integer(i)) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn get_f64_or(&self, key: &str, default: f64) -> f64 {
        self.get_f64(key).unwrap_or(default)
    }
}

/// On-disk settings object exclusively owned by one module.
pub trait ModuleConfig {
    /// Relative path fragment under the base settings directory.
    fn filename(&self) -> &str;

    /// Extracts and validates typed values after the file has been parsed.
    fn on_load(&mut self, values: &ConfigValues) -> Result<(), ConfigError>;

    /// Loads the file and applies `on_load`.
    ///
    /// Returns `false` after logging on any failure; the owning module then
    /// runs with the defaults its fields already carry.
    fn load(&mut self, base_dir: &Path) -> bool {
        let path = base_dir.join(self.filename());
        let values = match ConfigValues::load(&path) {
            Ok(values) => values,
            Err(e) => {
                error!("failed to open configuration file {}: {}", path.display(), e);
                return false;
            }
        };
        match self.on_load(&values) {
            Ok(()) => true,
            Err(e) => {
                error!("failed to load configuration file {}: {}", path.display(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    struct TestConfig {
        enabled: bool,
        announce_secs: i64,
        greeting: String,
        rate: f64,
    }

    impl Default for TestConfig {
        fn default() -> Self {
            Self {
                enabled: true,
                announce_secs: 60,
                greeting: "hello".to_string(),
                rate: 1.0,
            }
        }
    }

    impl ModuleConfig for TestConfig {
        fn filename(&self) -> &str {
            "test_module.conf.toml"
        }

        fn on_load(&mut self, values: &ConfigValues) -> Result<(), ConfigError> {
            self.enabled = values.get_bool_or("Enabled", true);
            self.announce_secs = values.get_i64_or("AnnounceSecs", 60);
            self.greeting = values.get_str_or("Greeting", "hello");
            self.rate = values.get_f64_or("Rate", 1.0);
            if self.announce_secs <= 0 {
                return Err(ConfigError::InvalidValue {
                    key: "AnnounceSecs".to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            Ok(())
        }
    }

    fn write_config(dir: &TempDir, contents: &str) {
        let mut file = std::fs::File::create(dir.path().join("test_module.conf.toml")).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn load_populates_typed_fields() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            "Enabled = false\nAnnounceSecs = 30\nGreeting = \"hi\"\nRate = 2.5\n",
        );

        let mut config = TestConfig::default();
        assert!(config.load(dir.path()));
        assert!(!config.enabled);
        assert_eq!(config.announce_secs, 30);
        assert_eq!(config.greeting, "hi");
        assert_eq!(config.rate, 2.5);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "Enabled = false\n");

        let mut config = TestConfig::default();
        assert!(config.load(dir.path()));
        assert!(!config.enabled);
        assert_eq!(config.announce_secs, 60);
        assert_eq!(config.greeting, "hello");
        assert_eq!(config.rate, 1.0);
    }

    #[test]
    fn integer_promotes_to_float() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "Rate = 3\n");

        let mut config = TestConfig::default();
        assert!(config.load(dir.path()));
        assert_eq!(config.rate, 3.0);
    }

    #[test]
    fn wrong_typed_value_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "AnnounceSecs = \"soon\"\n");

        let mut config = TestConfig::default();
        assert!(config.load(dir.path()));
        assert_eq!(config.announce_secs, 60);
    }

    #[test]
    fn missing_file_returns_false_without_panicking() {
        let dir = TempDir::new().unwrap();
        let mut config = TestConfig::default();
        assert!(!config.load(dir.path()));
        // Defaults survive the failed load.
        assert!(config.enabled);
        assert_eq!(config.announce_secs, 60);
    }

    #[test]
    fn malformed_toml_returns_false() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "Enabled = = false\n");

        let mut config = TestConfig::default();
        assert!(!config.load(dir.path()));
    }

    #[test]
    fn on_load_rejection_returns_false() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "AnnounceSecs = -5\n");

        let mut config = TestConfig::default();
        assert!(!config.load(dir.path()));
    }
}
