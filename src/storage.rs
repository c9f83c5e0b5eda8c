//! JSON files for settings and history, plus CSV export.
//!
//! Layout under the data directory:
//! - `config.json`: [`AppConfig`]
//! - `history.json`: array of [`SessionRecord`]
//! - `history_export.csv`: written on demand
//! - `pomo.log`: tracing output

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::StorageError;
use crate::history::{SessionHistory, SessionRecord};

const APP_DIR: &str = "pomo";
const CONFIG_FILE: &str = "config.json";
const HISTORY_FILE: &str = "history.json";
const EXPORT_FILE: &str = "history_export.csv";
pub const LOG_FILE: &str = "pomo.log";

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Opens (and creates) `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Write { path: dir.clone(), source })?;
        Ok(Self { dir })
    }

    /// `$XDG_CONFIG_HOME/pomo` (or the platform equivalent), else `./pomo`.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Missing or unreadable config falls back to defaults.
    pub fn load_config(&self) -> AppConfig {
        load_or_default(&self.path(CONFIG_FILE))
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<(), StorageError> {
        save_json(&self.path(CONFIG_FILE), config)
    }

    pub fn load_history(&self) -> SessionHistory {
        SessionHistory::from_records(load_or_default::<Vec<SessionRecord>>(&self.path(HISTORY_FILE)))
    }

    pub fn save_history(&self, history: &SessionHistory) -> Result<(), StorageError> {
        save_json(&self.path(HISTORY_FILE), history.records())
    }

    /// Writes the export tuples as CSV and returns the file path.
    pub fn export_csv(&self, history: &SessionHistory) -> Result<PathBuf, StorageError> {
        let mut csv = String::from("kind,planned_seconds,actual_seconds,outcome,timestamp\n");
        for (kind, planned, actual, outcome, ts) in history.export_rows() {
            csv.push_str(&format!("{},{:.1},{:.1},{},{}\n", kind.as_str(), planned, actual, outcome, ts));
        }
        let path = self.path(EXPORT_FILE);
        fs::write(&path, csv).map_err(|source| StorageError::Write { path: path.clone(), source })?;
        info!(path = %path.display(), rows = history.len(), "history exported");
        Ok(path)
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(StorageError::Read { path: path.to_path_buf(), source }),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Json { path: path.to_path_buf(), source })
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            warn!(error = %e, "falling back to defaults");
            T::default()
        }
    }
}

fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|source| StorageError::Json { path: path.to_path_buf(), source })?;
    fs::write(path, json).map_err(|source| StorageError::Write { path: path.to_path_buf(), source })
}
