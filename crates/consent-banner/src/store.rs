//! The abstract key-value store and its implementations.
//!
//! The banner never owns persistence. It reads and writes two string keys
//! through [`KeyValueStore`] and, when the backend supports it, listens for
//! writes made by *other* execution contexts so that an acceptance given in
//! one tab removes the banner from every other tab.
//!
//! ## Implementations
//!
//! | Type | Cross-context notifications | Use |
//! |------|-----------------------------|-----|
//! | [`MemoryStore`] | yes, between contexts of one [`SharedStorage`] | embedding, tests |
//! | [`FileStore`] | no | persisting across process runs |
//! | [`UnavailableStore`] | no, every call fails | a disabled medium |
//!
//! ```rust
//! use consent_banner::store::{KeyValueStore, SharedStorage};
//!
//! let storage = SharedStorage::new();
//! let tab_a = storage.open_context();
//! let tab_b = storage.open_context();
//!
//! let changes = tab_b.subscribe().unwrap();
//! tab_a.set("cookiesAccepted", "true").unwrap();
//!
//! let change = changes.poll().unwrap();
//! assert_eq!(change.key.as_deref(), Some("cookiesAccepted"));
//! assert_eq!(tab_b.get("cookiesAccepted").unwrap().as_deref(), Some("true"));
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::notify::{ContextId, Notifier, Subscription};

/// Value written under the consent key once the visitor accepts.
pub const CONSENT_ACCEPTED: &str = "true";

/// A change made to the store by another execution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreChange {
    /// Changed key, or `None` when the whole store was cleared.
    pub key: Option<String>,
    /// Value after the change, `None` when removed.
    pub new_value: Option<String>,
}

impl StoreChange {
    /// A key was written.
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            new_value: Some(value.into()),
        }
    }

    /// A key was removed.
    pub fn removed(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            new_value: None,
        }
    }

    /// The store was cleared.
    pub fn reset() -> Self {
        Self {
            key: None,
            new_value: None,
        }
    }

    /// Whether this change signals a full store reset.
    pub fn is_reset(&self) -> bool {
        self.key.is_none()
    }

    /// Whether this change touches `key` (a reset touches every key).
    pub fn affects(&self, key: &str) -> bool {
        match &self.key {
            Some(k) => k == key,
            None => true,
        }
    }
}

/// Shared, externally owned string persistence.
///
/// Reads and writes are synchronous local lookups. [`subscribe`](Self::subscribe)
/// returns `None` when the backend cannot observe writes from other contexts.
pub trait KeyValueStore {
    /// Reads `key`. `Ok(None)` means absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `key`. Last write wins.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Subscribes to changes made by other execution contexts.
    fn subscribe(&self) -> Option<Subscription<StoreChange>> {
        None
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn subscribe(&self) -> Option<Subscription<StoreChange>> {
        (**self).subscribe()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn subscribe(&self) -> Option<Subscription<StoreChange>> {
        (**self).subscribe()
    }
}

// === In-memory store ===

#[derive(Default)]
struct StorageInner {
    entries: RefCell<BTreeMap<String, String>>,
    changes: Notifier<StoreChange>,
    next_context: Cell<ContextId>,
    writes: Cell<usize>,
    set_calls: Cell<usize>,
}

/// One key-value map shared by several execution contexts.
///
/// Cloning is cheap and yields a handle to the same map.
#[derive(Clone, Default)]
pub struct SharedStorage {
    inner: Rc<StorageInner>,
}

impl SharedStorage {
    /// Creates an empty storage area.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new execution context onto this storage.
    pub fn open_context(&self) -> MemoryStore {
        let context = self.inner.next_context.get() + 1;
        self.inner.next_context.set(context);
        MemoryStore {
            storage: self.clone(),
            context,
        }
    }

    /// Copy of every stored entry.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner.entries.borrow().clone()
    }

    /// Number of live change subscriptions across all contexts.
    pub fn listener_count(&self) -> usize {
        self.inner.changes.subscriber_count()
    }

    /// Number of writes that changed the stored data.
    pub fn write_count(&self) -> usize {
        self.inner.writes.get()
    }

    /// Number of `set` calls from any context, including ones that stored
    /// the value already present.
    pub fn set_count(&self) -> usize {
        self.inner.set_calls.get()
    }

    fn record(&self, origin: ContextId, change: StoreChange) {
        self.inner.writes.set(self.inner.writes.get() + 1);
        self.inner.changes.publish_from(Some(origin), change);
    }
}

impl fmt::Debug for SharedStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStorage")
            .field("entries", &self.inner.entries.borrow())
            .field("writes", &self.inner.writes.get())
            .field("set_calls", &self.inner.set_calls.get())
            .finish()
    }
}

/// An execution context's view of a [`SharedStorage`].
///
/// Writes are visible to every context immediately; change notifications
/// are delivered only to the *other* contexts.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    storage: SharedStorage,
    context: ContextId,
}

impl MemoryStore {
    /// Creates a store backed by its own, unshared storage.
    pub fn new() -> Self {
        SharedStorage::new().open_context()
    }

    /// The storage this context belongs to.
    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// This context's identifier.
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Removes `key`, notifying other contexts if it was present.
    pub fn remove(&self, key: &str) {
        let removed = self.storage.inner.entries.borrow_mut().remove(key);
        if removed.is_some() {
            self.storage.record(self.context, StoreChange::removed(key));
        }
    }

    /// Clears every key, notifying other contexts with a reset.
    pub fn clear(&self) {
        let had_entries = {
            let mut entries = self.storage.inner.entries.borrow_mut();
            let had = !entries.is_empty();
            entries.clear();
            had
        };
        if had_entries {
            self.storage.record(self.context, StoreChange::reset());
        }
    }

    /// Number of live change subscriptions across all contexts.
    pub fn listener_count(&self) -> usize {
        self.storage.listener_count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.storage.inner.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let calls = &self.storage.inner.set_calls;
        calls.set(calls.get() + 1);
        let previous = self
            .storage
            .inner
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        if previous.as_deref() != Some(value) {
            self.storage
                .record(self.context, StoreChange::set(key, value));
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<Subscription<StoreChange>> {
        Some(self.storage.inner.changes.subscribe_in(self.context))
    }
}

// === File-backed store ===

/// A store persisted as a flat JSON object in a single file.
///
/// A missing file reads as an empty store. There is no way to observe
/// writes made by other processes, so [`subscribe`](KeyValueStore::subscribe)
/// returns `None`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes `key`.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    /// Deletes every key.
    pub fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }
}

// === Unavailable store ===

/// A store whose medium is disabled; every operation fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::unavailable("storage is disabled"))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::unavailable("storage is disabled"))
    }
}
