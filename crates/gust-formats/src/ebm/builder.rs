//! EBM encoding

use binrw::BinWrite;
use std::io::{Cursor, Seek, Write};
use tracing::debug;

use crate::ebm::error::{EbmError, Result};
use crate::ebm::parser::{MAX_STRING_LENGTH, RESERVED_WORD};
use crate::ebm::table::{EbmTable, HeaderLayout};

impl EbmTable {
    /// Encode the table to its binary form
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Encode the table into `writer`
    ///
    /// Records get a trailing extension word when the table has
    /// `noa2_extensions` set, or when the record itself has `padding` set.
    /// Padding words outside NOA2 tables are written as zero.
    pub fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        let declared = self.message_count.unsigned_abs();
        if declared as usize != self.messages.len() {
            return Err(EbmError::CountMismatch {
                declared,
                actual: self.messages.len(),
            });
        }

        self.message_count.write_le(writer)?;

        let mut extensions = 0u32;
        for (index, message) in self.messages.iter().enumerate() {
            let text = message.msg_string.as_bytes();
            if text.contains(&0) {
                return Err(EbmError::EmbeddedNul { index });
            }
            let msg_length = message.msg_length();
            if msg_length > MAX_STRING_LENGTH as usize {
                return Err(EbmError::StringTooLong {
                    index,
                    length: msg_length,
                    max: MAX_STRING_LENGTH,
                });
            }

            let mut words = Vec::with_capacity(HeaderLayout::Long.words() as usize);
            words.extend([
                message.kind,
                message.voice_id,
                message.unknown1,
                message.name_id,
                message.extra_id,
                message.expr_id,
            ]);
            if self.header_layout == HeaderLayout::Long {
                words.extend([RESERVED_WORD, RESERVED_WORD]);
            }
            words.extend([message.msg_id, message.unknown2, msg_length as u32]);
            words.write_le(writer)?;

            writer.write_all(text)?;
            writer.write_all(&[0])?;

            if self.noa2_extensions || message.padding {
                if self.noa2_extensions {
                    extensions = message.extensions.unwrap_or(0);
                }
                extensions.write_le(writer)?;
            }
        }

        debug!(
            "Encoded {} messages with {}-word headers",
            self.messages.len(),
            self.header_layout.words()
        );
        Ok(())
    }
}
