//! Flash-backed configuration store for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage in the last
//! 64KB of flash. Entries are keyed by `namespace/key`.
//!
//! Implements the `ConfigStore` trait from `lanyard-hal`.

use core::fmt::Write;

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use heapless::String;
use lanyard_hal::store::{MAX_KEY_LEN, MAX_NAMESPACE_LEN};
use lanyard_hal::{ConfigStore, StoreError};
use sequential_storage::cache::NoCache;
use sequential_storage::map::{self, Key, SerializationError};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on Pico W
pub const CONFIG_PARTITION_SIZE: usize = 64 * 1024; // 64KB for settings
pub const CONFIG_PARTITION_START: usize = FLASH_SIZE - CONFIG_PARTITION_SIZE;

/// Flash erase size for RP2040
pub const FLASH_ERASE_SIZE: usize = ERASE_SIZE;

/// Flash range for the config partition
pub const CONFIG_RANGE: core::ops::Range<u32> =
    (CONFIG_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Largest value the store accepts
pub const MAX_VALUE_LEN: usize = 128;

/// Scratch space for one serialized item
const ITEM_BUFFER_LEN: usize = 2 * MAX_VALUE_LEN;

const PATH_LEN: usize = MAX_NAMESPACE_LEN + 1 + MAX_KEY_LEN;

/// Storage key: `namespace/key`, stored with a one byte length prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingKey {
    path: String<PATH_LEN>,
}

impl SettingKey {
    /// Build a key, rejecting overlong parts
    pub fn new(namespace: &str, key: &str) -> Result<Self, StoreError> {
        if namespace.len() > MAX_NAMESPACE_LEN || key.len() > MAX_KEY_LEN {
            return Err(StoreError::KeyTooLong);
        }
        let mut path = String::new();
        write!(path, "{}/{}", namespace, key).map_err(|_| StoreError::KeyTooLong)?;
        Ok(Self { path })
    }

    /// Joined path
    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl Key for SettingKey {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let bytes = self.path.as_bytes();
        let len = bytes.len() + 1;
        if buffer.len() < len {
            return Err(SerializationError::BufferTooSmall);
        }
        buffer[0] = bytes.len() as u8;
        buffer[1..len].copy_from_slice(bytes);
        Ok(len)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
        let Some(&len) = buffer.first() else {
            return Err(SerializationError::BufferTooSmall);
        };
        let end = 1 + len as usize;
        let bytes = buffer
            .get(1..end)
            .ok_or(SerializationError::BufferTooSmall)?;
        let text = core::str::from_utf8(bytes).map_err(|_| SerializationError::InvalidFormat)?;
        let path = String::try_from(text).map_err(|_| SerializationError::InvalidFormat)?;
        Ok((Self { path }, end))
    }
}

fn map_storage_error<E>(error: sequential_storage::Error<E>) -> StoreError {
    match error {
        sequential_storage::Error::FullStorage => StoreError::Full,
        sequential_storage::Error::BufferTooSmall(_) => StoreError::BufferTooSmall,
        _ => StoreError::Storage,
    }
}

/// RP2040 flash configuration store
pub struct FlashConfigStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> FlashConfigStore<'d> {
    /// Create a new store over the flash peripheral
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl ConfigStore for FlashConfigStore<'_> {
    async fn read(
        &mut self,
        namespace: &str,
        key: &str,
        buffer: &mut [u8],
    ) -> Result<usize, StoreError> {
        let key = SettingKey::new(namespace, key)?;
        let mut item_buffer = [0u8; ITEM_BUFFER_LEN];

        let data = map::fetch_item::<SettingKey, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut item_buffer,
            &key,
        )
        .await
        .map_err(map_storage_error)?
        .ok_or(StoreError::NotFound)?;

        let len = data.len();
        if buffer.len() < len {
            return Err(StoreError::BufferTooSmall);
        }
        buffer[..len].copy_from_slice(data);
        Ok(len)
    }

    async fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StoreError> {
        if data.len() > MAX_VALUE_LEN {
            return Err(StoreError::Full);
        }
        let key = SettingKey::new(namespace, key)?;
        let mut item_buffer = [0u8; ITEM_BUFFER_LEN];

        map::store_item(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut item_buffer,
            &key,
            &data,
        )
        .await
        .map_err(map_storage_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let key = SettingKey::new("badge", "OTA.ready").unwrap();
        assert_eq!(key.as_str(), "badge/OTA.ready");

        let mut buffer = [0u8; 32];
        let len = key.serialize_into(&mut buffer).unwrap();
        assert_eq!(len, 16);
        assert_eq!(buffer[0], 15);
        assert_eq!(&buffer[1..len], b"badge/OTA.ready");

        let (decoded, used) = SettingKey::deserialize_from(&buffer).unwrap();
        assert_eq!(decoded, key);
        assert_eq!(used, len);
    }

    #[test]
    fn test_overlong_parts_rejected() {
        assert_eq!(
            SettingKey::new("a-much-too-long-namespace", "key"),
            Err(StoreError::KeyTooLong)
        );
        assert_eq!(
            SettingKey::new("badge", "a.much.too.long.key"),
            Err(StoreError::KeyTooLong)
        );
    }

    #[test]
    fn test_truncated_key_rejected() {
        let key = SettingKey::new("owner", "name").unwrap();
        let mut buffer = [0u8; 32];
        assert!(key.serialize_into(&mut buffer[..4]).is_err());

        let len = key.serialize_into(&mut buffer).unwrap();
        assert!(SettingKey::deserialize_from(&buffer[..len - 1]).is_err());
        assert!(SettingKey::deserialize_from(&[]).is_err());
    }
}
