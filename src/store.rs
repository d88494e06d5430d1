// src/store.rs

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::config::{Settings, SETTINGS_SCHEMA_VERSION};
use crate::probe::ConnectionStatusReport;

/// Persistence seam for settings and the last connection-status snapshot.
/// In-memory state stays authoritative when a save fails.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Option<Settings>, String>;
    fn save(&self, settings: &Settings) -> Result<(), String>;
    fn load_status_snapshot(&self) -> Result<Option<ConnectionStatusReport>, String>;
    fn save_status_snapshot(&self, report: &ConnectionStatusReport) -> Result<(), String>;
}

/// Pretty-printed JSON files under the platform data directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new() -> Result<Self, String> {
        let base = dirs::data_dir().ok_or("Could not determine data directory")?;
        Ok(JsonFileStore {
            dir: base.join("shield-core"),
        })
    }

    /// Store rooted at an explicit directory.
    pub fn with_dir(dir: PathBuf) -> Self {
        JsonFileStore { dir }
    }

    fn settings_path(&self) -> PathBuf {
        self.dir.join("settings.json")
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join("connection_status.json")
    }

    fn write_json<T: serde::Serialize>(&self, path: PathBuf, value: &T) -> Result<(), String> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| format!("Failed to create data directory: {}", e))?;
        let json = serde_json::to_vec_pretty(value)
            .map_err(|e| format!("Failed to serialize {}: {}", path.display(), e))?;
        fs::write(&path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        path: PathBuf,
    ) -> Result<Option<T>, String> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes =
            fs::read(&path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Option<Settings>, String> {
        let settings: Option<Settings> = self.read_json(self.settings_path())?;
        match settings {
            Some(settings) if settings.version != SETTINGS_SCHEMA_VERSION => {
                // Stale schema; start over from defaults rather than guess
                // at a migration.
                log::warn!(
                    "discarding settings with schema version {} (expected {})",
                    settings.version,
                    SETTINGS_SCHEMA_VERSION
                );
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), String> {
        self.write_json(self.settings_path(), settings)
    }

    fn load_status_snapshot(&self) -> Result<Option<ConnectionStatusReport>, String> {
        self.read_json(self.snapshot_path())
    }

    fn save_status_snapshot(&self, report: &ConnectionStatusReport) -> Result<(), String> {
        self.write_json(self.snapshot_path(), report)
    }
}

/// Volatile store for embedders that manage persistence themselves.
#[derive(Default)]
pub struct MemoryStore {
    settings: Mutex<Option<Settings>>,
    snapshot: Mutex<Option<ConnectionStatusReport>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<Settings>, String> {
        let guard = match self.settings.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(guard.clone())
    }

    fn save(&self, settings: &Settings) -> Result<(), String> {
        let mut guard = match self.settings.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(settings.clone());
        Ok(())
    }

    fn load_status_snapshot(&self) -> Result<Option<ConnectionStatusReport>, String> {
        let guard = match self.snapshot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(guard.clone())
    }

    fn save_status_snapshot(&self, report: &ConnectionStatusReport) -> Result<(), String> {
        let mut guard = match self.snapshot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(report.clone());
        Ok(())
    }
}
