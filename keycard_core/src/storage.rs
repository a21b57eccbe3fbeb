use std::collections::BTreeMap;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::{fmt, fs};

/// Easy alias for storage results
pub type Result<T> = std::result::Result<T, Error>;

/// Things that can go wrong reading or writing durable storage
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// We couldn't read or write the backing file, for example because of
    /// permissions.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The backing file exists but doesn't contain a JSON object of strings.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A flat string-to-string store that survives restarts.
pub trait Storage {
    /// Get the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing whatever was there.
    ///
    /// ## Errors
    ///
    /// Implementation-specific; file-backed stores fail if they can't write.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Forget `key`. Removing a key that isn't there is fine.
    ///
    /// ## Errors
    ///
    /// Same as `set`.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Storage that only lives as long as the process. Useful for tests and for
/// running without touching disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: BTreeMap<String, String>,
}

impl MemoryStorage {
    /// Construct an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON file. Values are read once when the store is
/// opened and the whole file is rewritten on every change.
pub struct FileStorage {
    /// Where the JSON lives
    path: PathBuf,

    /// What we last read or wrote
    values: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open the store at `path`. A missing file is treated as empty; it will
    /// be created (along with any parent directories) on the first write.
    ///
    /// ## Errors
    ///
    /// - `Error::Io` if the file exists but can't be read
    /// - `Error::Json` if the file isn't a JSON object of strings
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values: BTreeMap<String, String> = match fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data)?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "opened session storage");

        Ok(Self { path, values })
    }

    /// Where this store keeps its data
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `values` to disk and only then make them ours, so memory never
    /// holds anything a restart would lose.
    fn commit(&mut self, values: BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_vec(&values)?;
        fs::write(&self.path, data)?;

        self.values = values;
        Ok(())
    }
}

impl fmt::Debug for FileStorage {
    // Values include the bearer token, so keep them out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.clone();
        values.insert(key.to_owned(), value.to_owned());
        self.commit(values)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if !self.values.contains_key(key) {
            return Ok(());
        }

        let mut values = self.values.clone();
        values.remove(key);
        self.commit(values)
    }
}
