//! Key/value persistence
//!
//! Saved graphs and settings are stored as JSON strings under a key:
//! - Native: one `<key>.json` file per key in a data directory
//! - Web: LocalStorage
//! - Tests: in memory
//!
//! Corrupt values are copied to `<key>.bak` before callers fall back to
//! defaults.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(target_arch = "wasm32")]
use crate::error::SimError;
use crate::error::Result;

/// Directory name under the user's home for native storage
pub const DATA_DIR_NAME: &str = "ProjectileSimulator";

pub trait Storage {
    /// Value stored under `key`, or `None` if nothing was saved yet
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Copy the current value of `key` to `<key>.bak`
    fn backup(&self, key: &str) -> Result<()> {
        if let Some(value) = self.read(key)? {
            self.write(&backup_key(key), &value)?;
        }
        Ok(())
    }
}

pub fn backup_key(key: &str) -> String {
    format!("{key}.bak")
}

/// JSON files in a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Directory is created lazily on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$HOME/ProjectileSimulator`, falling back to the working directory
    pub fn default_dir() -> PathBuf {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DATA_DIR_NAME)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
            log::info!("Created data directory at {}", self.dir.display());
        }
        // Temp file first, then renamed over the target
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory storage (tests, or when no persistent backend is available)
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser LocalStorage, keys prefixed with the app name
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    const PREFIX: &'static str = "motion_sim_";

    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(&format!("{}{key}", Self::PREFIX))
            .map_err(|e| SimError::from(io::Error::other(format!("LocalStorage read failed: {e:?}"))))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(&format!("{}{key}", Self::PREFIX), value)
            .map_err(|e| SimError::from(io::Error::other(format!("LocalStorage write failed: {e:?}"))))
    }
}
