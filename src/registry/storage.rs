//! Registry storage interface and implementations
//!
//! Each pool lives in one JSON document. Saving writes a temporary file next
//! to the target and renames it over the old one, so an interrupted save
//! leaves the previous registry readable.

use crate::error::{LadderError, Result};
use crate::registry::{PoolStats, Registry};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;
use tempfile::NamedTempFile;
use tracing::debug;

/// Trait for loading and saving a whole registry
#[cfg_attr(test, mockall::automock)]
pub trait RegistryStore<S: PoolStats>: Send + Sync {
    /// Stable name of the storage location, used to scope the write lock
    fn location(&self) -> String;

    /// Read the registry. An absent location is an empty registry.
    fn load(&self) -> Result<Registry<S>>;

    /// Replace the stored registry with `registry`
    fn save(&self, registry: &Registry<S>) -> Result<()>;
}

/// JSON file storage with atomic replace
#[derive(Debug)]
pub struct JsonFileStore<S> {
    path: PathBuf,
    _pool: PhantomData<fn() -> S>,
}

impl<S: PoolStats> JsonFileStore<S> {
    /// Bind to `path`. Different spellings of one file resolve to the same location.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: normalize_path(path.into()),
            _pool: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, source: std::io::Error) -> LadderError {
        LadderError::StorageUnavailable {
            location: self.location(),
            source,
        }
    }
}

/// Absolute path with the parent directory canonicalized. When the parent
/// does not exist yet, `.` and `..` are folded lexically instead.
fn normalize_path(path: PathBuf) -> PathBuf {
    let absolute = if path.is_relative() {
        std::env::current_dir()
            .map(|dir| dir.join(&path))
            .unwrap_or(path)
    } else {
        path
    };

    if let (Some(dir), Some(name)) = (absolute.parent(), absolute.file_name()) {
        if let Ok(dir) = dir.canonicalize() {
            return dir.join(name);
        }
    }

    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other),
        }
    }
    lexical
}

impl<S: PoolStats> RegistryStore<S> for JsonFileStore<S> {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Registry<S>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No registry on disk, starting empty");
                return Ok(Registry::new());
            }
            Err(e) => return Err(self.unavailable(e)),
        };

        serde_json::from_str(&raw).map_err(|source| LadderError::CorruptStorage {
            location: self.location(),
            source,
        })
    }

    fn save(&self, registry: &Registry<S>) -> Result<()> {
        let body =
            serde_json::to_vec_pretty(registry).map_err(|source| LadderError::CorruptStorage {
                location: self.location(),
                source,
            })?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.unavailable(e))?;
        tmp.write_all(&body).map_err(|e| self.unavailable(e))?;
        tmp.as_file().sync_all().map_err(|e| self.unavailable(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.unavailable(e.error))?;

        debug!(
            path = %self.path.display(),
            players = registry.len(),
            "Registry saved"
        );
        Ok(())
    }
}

static NEXT_MEMORY_STORE: AtomicU64 = AtomicU64::new(0);

/// In-memory registry storage, for tests and embedding
#[derive(Debug)]
pub struct InMemoryRegistryStore<S> {
    name: String,
    registry: RwLock<Option<Registry<S>>>,
    saves: AtomicUsize,
}

impl<S: PoolStats> InMemoryRegistryStore<S> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            name: format!(
                "memory://{}/{}",
                S::POOL,
                NEXT_MEMORY_STORE.fetch_add(1, Ordering::Relaxed)
            ),
            registry: RwLock::new(None),
            saves: AtomicUsize::new(0),
        }
    }

    /// Create a store preloaded with `registry`
    pub fn with_registry(registry: Registry<S>) -> Self {
        let store = Self::new();
        if let Ok(mut slot) = store.registry.write() {
            *slot = Some(registry);
        }
        store
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn poisoned(&self) -> LadderError {
        LadderError::LockPoisoned {
            location: self.name.clone(),
        }
    }
}

impl<S: PoolStats> Default for InMemoryRegistryStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PoolStats> RegistryStore<S> for InMemoryRegistryStore<S> {
    fn location(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> Result<Registry<S>> {
        let slot = self.registry.read().map_err(|_| self.poisoned())?;
        Ok(slot.clone().unwrap_or_default())
    }

    fn save(&self, registry: &Registry<S>) -> Result<()> {
        let mut slot = self.registry.write().map_err(|_| self.poisoned())?;
        *slot = Some(registry.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
