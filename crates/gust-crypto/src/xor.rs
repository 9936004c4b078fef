//! Repeating-XOR obfuscation used by PAK entries.
//!
//! The transform is its own inverse: applying it twice with the same key
//! restores the original bytes. Byte `i` of the buffer is combined with
//! byte `i % 20` of the key.
//!
//! ```rust
//! use gust_crypto::xor::{XorKey, xor_in_place};
//!
//! let key = XorKey::new(*b"0123456789abcdefghij");
//! let mut data = b"payload bytes".to_vec();
//! xor_in_place(&mut data, key.as_bytes());
//! xor_in_place(&mut data, key.as_bytes());
//! assert_eq!(data, b"payload bytes");
//! ```

use std::fmt;

/// Size of a PAK entry key in bytes
pub const KEY_SIZE: usize = 20;

/// XOR `buffer` in place with the repeating `key`.
pub fn xor_in_place(buffer: &mut [u8], key: &[u8; KEY_SIZE]) {
    for (byte, k) in buffer.iter_mut().zip(key.iter().cycle()) {
        *byte ^= k;
    }
}

/// Per-entry obfuscation key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct XorKey([u8; KEY_SIZE]);

impl XorKey {
    /// Wrap raw key bytes
    pub const fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes
    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Hex representation of the key
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// An all-zero key means the entry is stored in clear.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Apply the transform in place.
    pub fn apply_in_place(&self, buffer: &mut [u8]) {
        xor_in_place(buffer, &self.0);
    }

    /// Apply the transform, returning a new buffer.
    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.apply_in_place(&mut out);
        out
    }
}

impl From<[u8; KEY_SIZE]> for XorKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for XorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("XorKey").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for XorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_wraps_every_twenty_bytes() {
        let mut key = [0u8; KEY_SIZE];
        key[0] = 0xff;
        let mut data = vec![0u8; 45];
        xor_in_place(&mut data, &key);

        let hits: Vec<usize> = data
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == 0xff)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(hits, vec![0, 20, 40]);
    }

    #[test]
    fn test_zero_key_is_noop() {
        let key = XorKey::default();
        assert!(key.is_zero());
        assert_eq!(key.apply(b"hello"), b"hello");
    }

    #[test]
    fn test_non_zero_key() {
        let mut bytes = [0u8; KEY_SIZE];
        bytes[19] = 1;
        assert!(!XorKey::new(bytes).is_zero());
    }

    #[test]
    fn test_key_displays_as_hex() {
        let mut bytes = [0u8; KEY_SIZE];
        bytes[0] = 0xab;
        bytes[19] = 0x01;
        let key = XorKey::from(bytes);
        assert_eq!(key.to_string(), format!("ab{}01", "00".repeat(18)));
        assert_eq!(format!("{key:?}"), format!("XorKey(\"{key}\")"));
    }

    proptest! {
        #[test]
        fn xor_is_an_involution(
            key in prop::array::uniform20(any::<u8>()),
            data in prop::collection::vec(any::<u8>(), 0..512)
        ) {
            let key = XorKey::new(key);
            let twice = key.apply(&key.apply(&data));
            prop_assert_eq!(twice, data);
        }
    }
}
