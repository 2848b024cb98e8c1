//! Run configuration read from the environment
//!
//! Expected environment variables:
//! - ROOT, ROOT_PASSWORD: database user and password (required)
//! - HOST, PORT, DATABASE: database location and schema (required)
//! - SECRET: service-account key file, relative to the working directory (warehouse sync)
//! - PROJECT_ID, DATASET: destination BigQuery project and dataset (warehouse sync)
//! - DATA_DIRECTORY: directory holding the CSV files (CSV load)

use crate::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!(
            "{} environment variable not set",
            name
        ))),
    }
}

/// Like [`required`] but an empty value is accepted
fn present(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    lookup(name).ok_or_else(|| Error::Config(format!("{} environment variable not set", name)))
}

/// Connection settings for a MySQL database
#[derive(Clone, PartialEq)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl DatabaseConfig {
    /// Read ROOT, ROOT_PASSWORD, HOST, PORT and DATABASE from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the settings through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = required(&lookup, "PORT")?;
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|e| Error::Config(format!("Invalid PORT '{}': {}", port, e)))?;

        Ok(Self {
            user: required(&lookup, "ROOT")?,
            // accounts without a password are valid
            password: present(&lookup, "ROOT_PASSWORD")?,
            host: required(&lookup, "HOST")?,
            port,
            database: required(&lookup, "DATABASE")?,
        })
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"********")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Display for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mysql://{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

/// Destination settings for the BigQuery warehouse
#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseConfig {
    /// Service-account key file
    pub key_file: PathBuf,
    pub project_id: String,
    pub dataset: String,
}

impl WarehouseConfig {
    /// Read SECRET, PROJECT_ID and DATASET from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            key_file: Path::new(".").join(required(&lookup, "SECRET")?),
            project_id: required(&lookup, "PROJECT_ID")?,
            dataset: required(&lookup, "DATASET")?,
        })
    }
}

/// Source settings for the CSV load
#[derive(Debug, Clone, PartialEq)]
pub struct CsvConfig {
    pub data_directory: PathBuf,
}

impl CsvConfig {
    /// Read DATA_DIRECTORY from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self::new(required(&lookup, "DATA_DIRECTORY")?))
    }

    /// Use `directory`, relative to the working directory
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            data_directory: Path::new(".").join(directory),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const DATABASE_VARS: &[(&str, &str)] = &[
        ("ROOT", "root"),
        ("ROOT_PASSWORD", "s3cret"),
        ("HOST", "db.internal"),
        ("PORT", "3306"),
        ("DATABASE", "shop"),
    ];

    #[test]
    fn test_database_config() {
        let config = DatabaseConfig::from_lookup(lookup(DATABASE_VARS)).unwrap();
        assert_eq!(config.user, "root");
        assert_eq!(config.port, 3306);
        assert_eq!(config.to_string(), "mysql://root@db.internal:3306/shop");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = DatabaseConfig::from_lookup(lookup(DATABASE_VARS)).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("********"));
    }

    #[test]
    fn test_missing_variable() {
        let err = DatabaseConfig::from_lookup(lookup(&[("ROOT", "root")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_empty_password_is_allowed() {
        let mut vars = DATABASE_VARS.to_vec();
        vars[1] = ("ROOT_PASSWORD", "");
        let config = DatabaseConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.password, "");
    }

    #[test]
    fn test_unset_password_is_missing() {
        let vars: Vec<_> = DATABASE_VARS
            .iter()
            .copied()
            .filter(|(k, _)| *k != "ROOT_PASSWORD")
            .collect();
        let err = DatabaseConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("ROOT_PASSWORD"));
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = DATABASE_VARS.to_vec();
        vars[3] = ("PORT", "mysql");
        let err = DatabaseConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("Invalid PORT 'mysql'"));
    }

    #[test]
    fn test_warehouse_config() {
        let config = WarehouseConfig::from_lookup(lookup(&[
            ("SECRET", "key.json"),
            ("PROJECT_ID", "acme"),
            ("DATASET", "raw"),
        ]))
        .unwrap();
        assert_eq!(config.key_file, Path::new("./key.json"));
        assert_eq!(config.project_id, "acme");
        assert_eq!(config.dataset, "raw");
    }

    #[test]
    fn test_empty_value_is_missing() {
        let err = CsvConfig::from_lookup(lookup(&[("DATA_DIRECTORY", "  ")])).unwrap_err();
        assert!(err.to_string().contains("DATA_DIRECTORY"));
    }

    #[test]
    #[serial]
    fn test_csv_config_from_env() {
        // SAFETY: serialized with every other test that touches the environment
        unsafe { std::env::set_var("DATA_DIRECTORY", "incoming") };
        let config = CsvConfig::from_env().unwrap();
        unsafe { std::env::remove_var("DATA_DIRECTORY") };

        assert_eq!(config.data_directory, Path::new("./incoming"));
    }

    #[test]
    #[serial]
    fn test_csv_config_from_env_missing() {
        unsafe { std::env::remove_var("DATA_DIRECTORY") };
        assert!(CsvConfig::from_env().is_err());
    }
}
