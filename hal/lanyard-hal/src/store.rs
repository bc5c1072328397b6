//! Persistent configuration storage
//!
//! The badge keeps its settings in a namespaced key-value store (owner
//! nickname, network identity, countdown defaults, boot phase, ...).
//! Values are raw bytes here; typed access lives in `lanyard-core`.

/// Maximum namespace length in bytes
pub const MAX_NAMESPACE_LEN: usize = 15;

/// Maximum key length in bytes
pub const MAX_KEY_LEN: usize = 15;

/// Errors from configuration storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Key not found
    NotFound,
    /// Underlying storage operation failed
    Storage,
    /// Buffer too small for the stored value
    BufferTooSmall,
    /// Stored value has an unexpected size or encoding
    Corrupted,
    /// Storage is full
    Full,
    /// Namespace or key exceeds the supported length
    KeyTooLong,
}

/// Namespaced key-value storage trait
///
/// Implementations should handle:
/// - Wear leveling across flash sectors
/// - Data integrity (CRC or similar)
/// - Last-write-wins semantics per `(namespace, key)`
pub trait ConfigStore {
    /// Read a value into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or [`StoreError::NotFound`] if the key has
    /// never been written.
    fn read(
        &mut self,
        namespace: &str,
        key: &str,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, StoreError>>;

    /// Write a value, replacing any previous value for the key
    fn write(
        &mut self,
        namespace: &str,
        key: &str,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), StoreError>>;
}
