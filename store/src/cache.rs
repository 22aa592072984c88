//! Staged write overlay: buffers writes over a parent store and applies
//! them in one step.
//!
//! # Usage
//!
//! ```ignore
//! let staged = CacheStore::new(store.as_ref());
//! staged.put(b"key", b"value")?;
//! run_messages(&staged)?;
//! staged.commit()?;
//! ```
//!
//! Reads and range scans see the staged writes merged over the parent. If
//! the overlay is dropped without calling [`CacheStore::commit`], every
//! staged write is discarded and the parent is untouched.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Mutex, MutexGuard};

use tracing::trace;

use crate::{KvPair, KvStore, StoreError};

/// Staged value: `Some` for a put, `None` for a delete.
type Staged = Option<Vec<u8>>;

/// A copy-on-write overlay over another [`KvStore`].
pub struct CacheStore<'a> {
    parent: &'a dyn KvStore,
    writes: Mutex<BTreeMap<Vec<u8>, Staged>>,
}

impl<'a> CacheStore<'a> {
    /// Begin a new overlay on top of `parent`.
    pub fn new(parent: &'a dyn KvStore) -> Self {
        Self {
            parent,
            writes: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of staged puts and deletes.
    pub fn pending_writes(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// Apply every staged write to the parent, in key order.
    pub fn commit(self) -> Result<(), StoreError> {
        let writes = self
            .writes
            .into_inner()
            .map_err(|_| StoreError::Backend("cache store lock poisoned".into()))?;
        trace!(writes = writes.len(), "committing staged writes");
        for (key, staged) in writes {
            match staged {
                Some(value) => self.parent.put(&key, &value)?,
                None => self.parent.delete(&key)?,
            }
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<Vec<u8>, Staged>>, StoreError> {
        self.writes
            .lock()
            .map_err(|_| StoreError::Backend("cache store lock poisoned".into()))
    }
}

impl KvStore for CacheStore<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(staged) = self.lock()?.get(key) {
            return Ok(staged.clone());
        }
        self.parent.get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_vec(), None);
        Ok(())
    }

    fn iter_range(&self, start: &[u8], end: Option<&[u8]>) -> Result<Vec<KvPair>, StoreError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.iter_range(start, end)?.into_iter().collect();
        let upper = match end {
            Some(e) => Bound::Excluded(e),
            None => Bound::Unbounded,
        };
        let writes = self.lock()?;
        for (key, staged) in writes.range::<[u8], _>((Bound::Included(start), upper)) {
            match staged {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}
