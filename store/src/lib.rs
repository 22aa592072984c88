//! Abstract storage for the agora governance engine.
//!
//! Every storage backend (an on-disk engine in production, an in-memory map
//! for testing) implements [`KvStore`]. The rest of the codebase depends only
//! on the trait and on the ordering guarantee of [`KvStore::iter_range`]:
//! entries come back in ascending byte order of their keys, which is what
//! makes queue scans identical on every replica.

pub mod cache;
pub mod error;

pub use cache::CacheStore;
pub use error::StoreError;

/// A key-value pair returned by range scans.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Ordered byte-keyed storage.
///
/// Methods take `&self`; implementations use interior mutability so a store
/// can be shared by the engine and by staged overlays borrowing it.
pub trait KvStore {
    /// Get the value stored under `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;

    /// All entries with `start <= key < end` in ascending key order.
    /// `end = None` scans to the end of the keyspace.
    fn iter_range(&self, start: &[u8], end: Option<&[u8]>) -> Result<Vec<KvPair>, StoreError>;

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<KvPair>, StoreError> {
        let end = prefix_end(prefix);
        self.iter_range(prefix, end.as_deref())
    }

    /// Whether `key` is present.
    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

/// The smallest key greater than every key starting with `prefix`,
/// or `None` when the prefix is all `0xff` bytes (scan to the end).
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_end() {
        assert_eq!(prefix_end(&[0x01, 0x02]), Some(vec![0x01, 0x03]));
        assert_eq!(prefix_end(&[0x01, 0xff]), Some(vec![0x02]));
        assert_eq!(prefix_end(&[0xff, 0xff]), None);
        assert_eq!(prefix_end(&[]), None);
    }
}
