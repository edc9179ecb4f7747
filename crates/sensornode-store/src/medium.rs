//! Persistent key/value media and scoped namespace sessions.
//!
//! A medium holds named namespaces, each a flat map of string keys to integer
//! scalars (think flash-backed preferences). It has no ordering, no tables and
//! no row identity; the ring backend builds those on top.
//!
//! Access goes through a [`NamespaceSession`], opened read-only for reads and
//! read-write for the duration of one write. Writes are buffered in the
//! session and persisted by [`NamespaceSession::end`]. A session dropped
//! without `end` (an early `?` return, say) is released and its pending
//! changes are discarded.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::config::{ValidationError, namespace_problem};
use crate::error::{Error, Result};

/// Contents of one namespace.
pub type Entries = BTreeMap<String, i64>;

/// A non-volatile key/value store organised in namespaces.
pub trait Medium: Send + Sync {
    /// Make the medium usable, creating whatever backs it if needed.
    ///
    /// Idempotent and cheap when already mounted.
    fn mount(&self) -> Result<()>;

    /// Read a namespace. A namespace that was never written is empty.
    fn load(&self, namespace: &str) -> Result<Entries>;

    /// Replace a namespace with `entries`.
    fn store(&self, namespace: &str, entries: &Entries) -> Result<()>;
}

/// How a namespace session may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Reads only; `put_*` fails.
    ReadOnly,
    /// Reads and buffered writes.
    ReadWrite,
}

/// An open namespace.
pub struct NamespaceSession<'m> {
    medium: &'m dyn Medium,
    namespace: &'m str,
    mode: AccessMode,
    entries: Entries,
    dirty: bool,
    ended: bool,
}

impl<'m> NamespaceSession<'m> {
    /// Mount the medium and open `namespace`.
    pub fn begin(medium: &'m dyn Medium, namespace: &'m str, mode: AccessMode) -> Result<Self> {
        medium.mount()?;
        let entries = medium.load(namespace)?;
        debug!("Opened namespace '{}' ({:?})", namespace, mode);
        Ok(Self {
            medium,
            namespace,
            mode,
            entries,
            dirty: false,
            ended: false,
        })
    }

    /// Read an `i64`, or `default` if the key is absent.
    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.entries.get(key).copied().unwrap_or(default)
    }

    /// Read an `i32`, or `default` if the key is absent or out of range.
    pub fn get_i32(&self, key: &str, default: i32) -> i32 {
        self.entries
            .get(key)
            .and_then(|v| i32::try_from(*v).ok())
            .unwrap_or(default)
    }

    /// Whether `key` holds a value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Buffer an `i64` write.
    pub fn put_i64(&mut self, key: &str, value: i64) -> Result<()> {
        if self.mode == AccessMode::ReadOnly {
            return Err(Error::ReadOnly(self.namespace.to_string()));
        }
        self.entries.insert(key.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    /// Buffer an `i32` write.
    pub fn put_i32(&mut self, key: &str, value: i32) -> Result<()> {
        self.put_i64(key, i64::from(value))
    }

    /// Persist pending writes and release the namespace.
    pub fn end(mut self) -> Result<()> {
        self.ended = true;
        if self.dirty {
            self.medium.store(self.namespace, &self.entries)?;
            self.dirty = false;
        }
        debug!("Closed namespace '{}'", self.namespace);
        Ok(())
    }
}

impl Drop for NamespaceSession<'_> {
    fn drop(&mut self) {
        if !self.ended && self.dirty {
            warn!(
                "Namespace '{}' released without commit, discarding pending writes",
                self.namespace
            );
        }
    }
}

/// A medium backed by a directory, one JSON document per namespace.
///
/// Documents are replaced atomically (write to a temporary file, then
/// rename), so a crash leaves either the old or the new namespace.
#[derive(Debug, Clone)]
pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    /// Use `dir` as the medium root. Nothing touches the disk until `mount`.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Root directory of this medium.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Document path for `namespace`, which must stay inside the root.
    fn namespace_path(&self, namespace: &str) -> Result<PathBuf> {
        if let Some(message) = namespace_problem(namespace) {
            return Err(Error::InvalidConfig(vec![ValidationError {
                field: "storage.namespace".to_string(),
                message,
            }]));
        }
        Ok(self.dir.join(format!("{namespace}.json")))
    }
}

impl Medium for FileMedium {
    fn mount(&self) -> Result<()> {
        if !self.dir.is_dir() {
            std::fs::create_dir_all(&self.dir).map_err(|e| Error::CreateDirectory {
                path: self.dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }

    fn load(&self, namespace: &str) -> Result<Entries> {
        let path = self.namespace_path(namespace)?;
        let content = match std::fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => {
                return Err(Error::Load {
                    namespace: namespace.to_string(),
                    source: e,
                });
            }
        };
        Ok(decode_entries(namespace, &content))
    }

    fn store(&self, namespace: &str, entries: &Entries) -> Result<()> {
        let content = serde_json::to_vec_pretty(entries).map_err(|e| Error::Encode {
            namespace: namespace.to_string(),
            source: e,
        })?;
        let path = self.namespace_path(namespace)?;
        let tmp = path.with_extension("json.tmp");
        let persist = |e| Error::Persist {
            namespace: namespace.to_string(),
            source: e,
        };
        std::fs::write(&tmp, content).map_err(persist)?;
        std::fs::rename(&tmp, &path).map_err(persist)
    }
}

/// Decode a namespace document, keeping every integer entry.
///
/// A document that is not a JSON object reads as empty; non-integer entries
/// are dropped. The next commit overwrites the document either way.
fn decode_entries(namespace: &str, content: &[u8]) -> Entries {
    let document = match serde_json::from_slice::<serde_json::Value>(content) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(_) => {
            warn!(
                "Namespace '{}' is not a key/value document, reading it as empty",
                namespace
            );
            return Entries::new();
        }
        Err(e) => {
            warn!(
                "Namespace '{}' is unreadable ({}), reading it as empty",
                namespace, e
            );
            return Entries::new();
        }
    };

    let mut entries = Entries::new();
    for (key, value) in document {
        match value.as_i64() {
            Some(v) => {
                entries.insert(key, v);
            }
            None => warn!(
                "Dropping non-integer key '{}' = {} from namespace '{}'",
                key, value, namespace
            ),
        }
    }
    entries
}

#[derive(Debug)]
struct MemoryState {
    namespaces: HashMap<String, Entries>,
    available: bool,
    fail_writes: bool,
}

/// An in-process medium.
///
/// Clones share the same contents, so a test can keep a handle for
/// inspection and fault injection while a store owns another.
#[derive(Debug, Clone)]
pub struct MemoryMedium {
    state: Arc<Mutex<MemoryState>>,
}

impl Default for MemoryMedium {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMedium {
    /// Create an empty, available medium.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                namespaces: HashMap::new(),
                available: true,
                fail_writes: false,
            })),
        }
    }

    /// Simulate the medium disappearing (or coming back).
    pub fn set_available(&self, available: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.available = available;
        }
    }

    /// Make every subsequent `store` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_writes = fail;
        }
    }

    /// Copy of a namespace's current contents.
    pub fn snapshot(&self, namespace: &str) -> Entries {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.namespaces.get(namespace).cloned())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::MediumUnavailable("memory medium lock poisoned".to_string()))
    }
}

impl Medium for MemoryMedium {
    fn mount(&self) -> Result<()> {
        if self.lock()?.available {
            Ok(())
        } else {
            Err(Error::MediumUnavailable("memory medium offline".to_string()))
        }
    }

    fn load(&self, namespace: &str) -> Result<Entries> {
        Ok(self
            .lock()?
            .namespaces
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    fn store(&self, namespace: &str, entries: &Entries) -> Result<()> {
        let mut state = self.lock()?;
        if state.fail_writes {
            return Err(Error::Persist {
                namespace: namespace.to_string(),
                source: std::io::Error::other("injected write failure"),
            });
        }
        state
            .namespaces
            .insert(namespace.to_string(), entries.clone());
        Ok(())
    }
}
