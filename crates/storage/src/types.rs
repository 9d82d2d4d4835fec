//! Common types used across storage operations.

use bytes::Bytes;

/// Key-value pair returned from range scans.
///
/// Contains the key and its associated value as byte sequences.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use idvault_storage::KeyValue;
///
/// let kv = KeyValue {
///     key: Bytes::from("ann@x.com"),
///     value: Bytes::from(r#"{"name":"Ann"}"#),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// The key identifying this entry.
    pub key: Bytes,

    /// The value stored at this key.
    pub value: Bytes,
}

impl KeyValue {
    /// Creates a new key-value pair.
    pub fn new(key: Bytes, value: Bytes) -> Self {
        Self { key, value }
    }
}
