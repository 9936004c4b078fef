//! EBM message records
//!
//! A record on disk is a run of little-endian u32 words followed by the
//! message text:
//!
//! ```text
//! u32 type          always small (0x00-0x10)
//! u32 voice_id      voice of the speaking character
//! u32 unknown1
//! u32 name_id       name of the speaking character
//! u32 extra_id      -1 for system messages
//! u32 expr_id       expression (serious = 0x09, surprise = 0x0a, ...)
//! u32 0xffffffff    [11-word headers only]
//! u32 0xffffffff    [11-word headers only]
//! u32 msg_id        sequential message id
//! u32 unknown2
//! u32 msg_length    text length including the NUL terminator
//! u8  msg_string[msg_length]
//! u32 extensions    [NOA2/Ryza2 tables, or padded records]
//! ```
//!
//! `msg_length` is never stored in the manifest; it is recomputed from the
//! text when building.

use serde::{Deserialize, Serialize};

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u32) -> bool {
    *value == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// One dialogue record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EbmMessage {
    /// Record type
    #[serde(rename = "type")]
    pub kind: u32,
    /// Voice id of the speaking character
    pub voice_id: u32,
    /// Unknown, omitted from manifests when zero
    #[serde(default, skip_serializing_if = "is_zero")]
    pub unknown1: u32,
    /// Name id of the speaking character
    pub name_id: u32,
    /// Extra id, omitted from manifests when zero
    #[serde(default, skip_serializing_if = "is_zero")]
    pub extra_id: u32,
    /// Expression id
    pub expr_id: u32,
    /// Sequential message id
    pub msg_id: u32,
    /// Unknown, omitted from manifests when zero
    #[serde(default, skip_serializing_if = "is_zero")]
    pub unknown2: u32,
    /// Message text, without its terminator
    pub msg_string: String,
    /// Trailing extension word, present in NOA2/Ryza2 tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<u32>,
    /// Force a trailing extension word on this record only
    #[serde(default, skip_serializing_if = "is_false")]
    pub padding: bool,
}

impl EbmMessage {
    /// Encoded text length, including the NUL terminator
    pub fn msg_length(&self) -> usize {
        self.msg_string.len() + 1
    }
}
