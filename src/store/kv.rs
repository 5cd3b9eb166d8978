use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::Result;
use crate::store::lock;

/// Durable string-keyed storage. Reads and writes are synchronous; a
/// successful `set` must survive a process restart.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Handle shared by every store opened over the same backing storage.
pub type SharedKv = Rc<dyn KeyValueStore>;

/// Load a JSON record, falling back to `None` when the key is absent or the
/// stored value cannot be parsed. Corruption is logged, never surfaced.
pub fn load_record<T: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = kv.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "discarding corrupt record");
            Ok(None)
        }
    }
}

pub fn save_record<T: Serialize + ?Sized>(
    kv: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    kv.set(key, &json)?;
    debug!(key, bytes = json.len(), "persisted record");
    Ok(())
}

/// One JSON file per key under a data directory.
///
/// Writes go to a temp file that is renamed over the record, under an
/// exclusive lock on `<dir>.lock`.
pub struct FileKv {
    dir: PathBuf,
    lock_path: PathBuf,
}

impl FileKv {
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            lock_path: dir.with_extension("lock"),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        match String::from_utf8(bytes) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) => {
                // Undecodable bytes are corruption, same as unparseable JSON.
                warn!(key, error = %e, "discarding record that is not UTF-8");
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let lock_file = lock::acquire_lock(&self.lock_path)?;

        let path = self.record_path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        lock::release_lock(lock_file)?;
        Ok(())
    }
}

/// Volatile store for tests and embedding. Counts writes so callers can
/// assert that no-op operations stay off the storage path.
#[derive(Default)]
pub struct MemoryKv {
    records: RefCell<BTreeMap<String, String>>,
    writes: Cell<usize>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value without counting it as a write.
    pub fn with_record(self, key: &str, value: &str) -> Self {
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.records.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
