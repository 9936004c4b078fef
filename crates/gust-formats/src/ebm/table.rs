//! EBM table and its JSON manifest form

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::Path;

use crate::ebm::error::{EbmError, Result};
use crate::ebm::message::EbmMessage;

/// Number of u32 words before the message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum HeaderLayout {
    /// 9 words
    #[default]
    Short,
    /// 11 words, with a pair of 0xffffffff sentinels before `msg_id` (Nelke)
    Long,
}

impl HeaderLayout {
    /// Header size in words
    pub const fn words(self) -> u32 {
        match self {
            Self::Short => 9,
            Self::Long => 11,
        }
    }

    /// Header size in bytes
    pub const fn bytes(self) -> usize {
        self.words() as usize * 4
    }
}

impl From<HeaderLayout> for u32 {
    fn from(layout: HeaderLayout) -> Self {
        layout.words()
    }
}

impl TryFrom<u32> for HeaderLayout {
    type Error = EbmError;

    fn try_from(words: u32) -> Result<Self> {
        match words {
            // Tables without messages have no established size
            0 | 9 => Ok(Self::Short),
            11 => Ok(Self::Long),
            other => Err(EbmError::UnsupportedHeaderSize(other)),
        }
    }
}

/// The message count is stored as a signed word. Manifests carry its
/// unsigned 32-bit image and accept either form back.
mod message_count {
    use super::{Deserialize, Deserializer, Serializer};
    use serde::de::Error;

    pub fn serialize<S: Serializer>(count: &i32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(*count as u32)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        let value = i64::deserialize(deserializer)?;
        if let Ok(unsigned) = u32::try_from(value) {
            Ok(unsigned as i32)
        } else {
            i32::try_from(value).map_err(|_| D::Error::custom(format!("message count {value} out of range")))
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// A whole message table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbmTable {
    /// Source file name
    pub name: String,
    /// Declared message count; the sign is kept as found
    #[serde(rename = "nb_messages", with = "message_count")]
    pub message_count: i32,
    /// Whether every record carries a trailing extension word
    #[serde(default, skip_serializing_if = "is_false")]
    pub noa2_extensions: bool,
    /// Header size shared by all records
    #[serde(rename = "header_size", default)]
    pub header_layout: HeaderLayout,
    /// Records in file order
    pub messages: Vec<EbmMessage>,
}

impl EbmTable {
    /// Create an empty table
    pub fn new(name: impl Into<String>, header_layout: HeaderLayout, noa2_extensions: bool) -> Self {
        Self {
            name: name.into(),
            message_count: 0,
            noa2_extensions,
            header_layout,
            messages: Vec::new(),
        }
    }

    /// Append a record, keeping the declared count's sign
    pub fn push(&mut self, message: EbmMessage) {
        self.messages.push(message);
        let count = self.messages.len() as i32;
        self.message_count = if self.message_count < 0 { -count } else { count };
    }

    /// Pretty-printed JSON manifest
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a JSON manifest
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a JSON manifest from disk
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Write the JSON manifest to disk
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
