use anyhow::{anyhow, Context, Result};
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// String-keyed persistence for card state.
///
/// Writes replace the stored value for `key` as a whole; a reader never
/// observes a partially written value.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Returns whether a value was present.
    fn remove(&mut self, key: &str) -> Result<bool>;
    fn keys(&self) -> Result<Vec<String>>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

/// All keys live in one JSON object file, rewritten through a temp file and
/// renamed over the original.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

type Document = BTreeMap<String, String>;

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        ensure_parent_dir_exists(&path)?;
        let store = Self { path };
        // I/O problems fail here; a corrupt document opens as empty.
        store.read_document()?;
        tracing::debug!(path = %store.path.display(), "opened file store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read store file '{}'", self.path.display())
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(Document::new());
        }

        // The next write replaces whatever could not be parsed.
        match serde_json::from_str(&raw) {
            Ok(document) => Ok(document),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "ignoring store file that is not a JSON object of string values: {err}"
                );
                Ok(Document::new())
            }
        }
    }

    fn write_document(&self, document: &Document) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let encoded =
            serde_json::to_vec_pretty(document).context("failed to encode store document")?;

        let mut staged = NamedTempFile::new_in(dir).with_context(|| {
            format!("failed to create temp file in '{}'", dir.display())
        })?;
        staged
            .write_all(&encoded)
            .context("failed to write staged store document")?;
        staged
            .as_file()
            .sync_all()
            .context("failed to flush staged store document")?;
        staged.persist(&self.path).map_err(|err| {
            anyhow!(
                "failed to replace store file '{}': {}",
                self.path.display(),
                err.error
            )
        })?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_document()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut document = self.read_document()?;
        document.insert(key.to_string(), value.to_string());
        self.write_document(&document)
            .with_context(|| format!("failed to store key '{key}'"))
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let mut document = self.read_document()?;
        if document.remove(key).is_none() {
            return Ok(false);
        }
        self.write_document(&document)
            .with_context(|| format!("failed to remove key '{key}'"))?;
        Ok(true)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read_document()?.into_keys().collect())
    }
}

/// Process-local store. Counts successful writes and can be told to refuse
/// them, which is what the controller tests lean on.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("memory store is refusing writes for key '{key}'"));
        }
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        if self.fail_writes {
            return Err(anyhow!("memory store is refusing writes for key '{key}'"));
        }
        let existed = self.values.remove(key).is_some();
        if existed {
            self.writes += 1;
        }
        Ok(existed)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

fn ensure_parent_dir_exists(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };

    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for store file '{}'",
            parent.display(),
            path.display()
        )
    })?;

    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
