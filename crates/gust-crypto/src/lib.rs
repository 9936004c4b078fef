//! Entry obfuscation primitives for Gust PAK archives
//!
//! Every entry in a Gust PAK archive carries a 20-byte key. The entry's
//! file name and payload are obfuscated by XOR-ing each byte with the key,
//! repeated over the length of the buffer. An all-zero key marks an entry
//! that was stored in clear.
//!
//! # Examples
//!
//! ```
//! use gust_crypto::XorKey;
//!
//! let key = XorKey::new([0x5a; 20]);
//! let encoded = key.apply(b"hello");
//! assert_ne!(&encoded[..], b"hello");
//! assert_eq!(&key.apply(&encoded)[..], b"hello");
//! ```

#![warn(missing_docs)]

pub mod xor;

pub use xor::{KEY_SIZE, XorKey, xor_in_place};
