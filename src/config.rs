//! Application configuration.

use std::path::PathBuf;

const DATA_DIR_ENV: &str = "GENTREE_DATA_DIR";
const DB_FILE_ENV: &str = "GENTREE_DB_FILE";
const DEFAULT_DB_FILE: &str = "gentree.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_file_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_file_name: DEFAULT_DB_FILE.to_string(),
        }
    }
}

impl AppConfig {
    /// Build from `GENTREE_DATA_DIR` / `GENTREE_DB_FILE`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let data_dir = lookup(DATA_DIR_ENV)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let db_file_name = lookup(DB_FILE_ENV)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.db_file_name);
        Self {
            data_dir,
            db_file_name,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file_name)
    }
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("gentree")
}
