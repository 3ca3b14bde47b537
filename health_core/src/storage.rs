//! Key-value storage port with file locking.
//!
//! Every tracker persists its state as one serialized value per key. Stores
//! receive a [`StoragePort`] instead of reaching for a global location, so
//! the CLI can hand them a [`FileStorage`] and tests a [`MemoryStorage`].

use crate::{Error, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

pub const WATER_INTAKE_KEY: &str = "waterIntake";
pub const WATER_GOAL_KEY: &str = "waterGoal";
pub const WATER_HISTORY_KEY: &str = "waterHistory";
pub const BP_READINGS_KEY: &str = "bpReadings";
pub const HEART_RATE_KEY: &str = "heartbeatReadings";
pub const APPOINTMENTS_KEY: &str = "appointments";
pub const DOCTORS_KEY: &str = "doctors";
pub const MEDICATIONS_KEY: &str = "medications";
pub const CONTACTS_KEY: &str = "emergencyContacts";
pub const SESSION_TOKEN_KEY: &str = "healthTrackerToken";

/// Persistent string storage addressed by key
pub trait StoragePort {
    /// Read the value stored under `key`, `None` if nothing was ever written
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

impl<P: StoragePort + ?Sized> StoragePort for &P {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// One JSON file per key inside a data directory
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StoragePort for FileStorage {
    /// Read under a shared lock. Writers replace the file by rename, so a
    /// reader sees either the old contents or the new, never a mix.
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            tracing::debug!("No stored value for {} at {:?}", key, path);
            return Ok(None);
        }

        let file = File::open(&path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        file.unlock()?;
        read?;

        tracing::debug!("Read {} bytes for {} from {:?}", contents.len(), key, path);
        Ok(Some(contents))
    }

    /// Atomically writes the value by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn write(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);

        let temp = NamedTempFile::new_in(&self.dir)?;

        // Each writer fills its own temp file; concurrent writers race on the
        // rename and the last one wins
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {} to {:?}", key, path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed {} at {:?}", key, path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage; clones share the same map
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StoragePort for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values().remove(key);
        Ok(())
    }
}
