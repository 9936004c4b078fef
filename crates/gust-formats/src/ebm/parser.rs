//! EBM decoding
//!
//! Two properties of a table are not recorded anywhere and have to be
//! inferred while reading:
//!
//! - **Header size**: after `expr_id`, a pair of 0xffffffff words means the
//!   record uses the 11-word header. All records of a table share one size.
//! - **Extension words**: NOA2/Ryza2 tables append one u32 to every record.
//!
//! Decoding starts by assuming no extension words. When that reading runs
//! into an anomaly the whole table is decoded again with extension words
//! enabled. Anomalies are a `type` above 0x10, a header size that changes
//! between records, an impossible string length, a record running past the
//! end of the data, or exactly one unread word per record left at the end.
//! There is at most one restart.

use tracing::{info, warn};

use crate::bytes::{i32_at, u32_at};
use crate::ebm::error::{EbmError, Result};
use crate::ebm::message::EbmMessage;
use crate::ebm::table::{EbmTable, HeaderLayout};

/// Maximum string length, terminator included
pub const MAX_STRING_LENGTH: u32 = 2048;

/// Highest `type` value seen in tables without extension words
pub const MAX_MESSAGE_TYPE: u32 = 0x10;

/// Value of the two sentinel words in 11-word headers
pub const RESERVED_WORD: u32 = 0xffff_ffff;

/// Size of the leading message count
const COUNT_SIZE: usize = 4;

/// How extension words are handled while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExtensionsMode {
    /// Assume none, restart with extensions on the first anomaly
    #[default]
    Unknown,
    /// Records never carry an extension word
    Off,
    /// Every record carries an extension word
    On,
}

/// Byte cursor over the table, reporting the record being read on failure
struct RecordReader<'a> {
    data: &'a [u8],
    pos: usize,
    index: usize,
}

impl<'a> RecordReader<'a> {
    fn ensure(&self, offset: usize, needed: usize) -> Result<()> {
        if offset.checked_add(needed).is_some_and(|end| end <= self.data.len()) {
            Ok(())
        } else {
            Err(EbmError::Truncated {
                index: self.index,
                offset,
                needed,
            })
        }
    }

    fn word(&mut self) -> Result<u32> {
        let value = self.peek(0)?;
        self.pos += 4;
        Ok(value)
    }

    fn peek(&self, ahead: usize) -> Result<u32> {
        let offset = self.pos + ahead * 4;
        self.ensure(offset, 4)?;
        Ok(u32_at(self.data, offset))
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(self.pos, len)?;
        let data = self.data;
        let out = &data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }
}

/// EBM decoder
///
/// The header size is detected per record from the 0xffffffff sentinel pair
/// and must not change within a table. With [`ExtensionsMode::Unknown`], a
/// type above [`MAX_MESSAGE_TYPE`], a header size change, a string length
/// of 0 or above [`MAX_STRING_LENGTH`], a record running past the end of
/// the data, or one leftover word per record restarts decoding once with
/// extension words enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct EbmParser {
    mode: ExtensionsMode,
}

impl EbmParser {
    /// Decoder with extension detection
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder with a fixed extension mode
    pub fn with_extensions(mode: ExtensionsMode) -> Self {
        Self { mode }
    }

    /// Decode `data`, naming the resulting table `name`
    pub fn parse(&self, name: &str, data: &[u8]) -> Result<EbmTable> {
        if data.len() < COUNT_SIZE {
            return Err(EbmError::Truncated {
                index: 0,
                offset: 0,
                needed: COUNT_SIZE,
            });
        }

        let count = i32_at(data, 0);
        let required = (count.unsigned_abs() as usize)
            .saturating_mul(HeaderLayout::Short.bytes())
            .saturating_add(COUNT_SIZE);
        if data.len() < required {
            return Err(EbmError::InvalidMessageCount {
                count,
                required,
                actual: data.len(),
            });
        }

        let mut mode = self.mode;
        loop {
            match decode_table(name, data, count, mode) {
                Err(err) if mode == ExtensionsMode::Unknown && err.is_layout_anomaly() => {
                    info!("Detected NOA2/Ryza2 ebm extensions ({err})");
                    mode = ExtensionsMode::On;
                }
                result => return result,
            }
        }
    }
}

/// Decode with the default extension detection
pub fn parse(name: &str, data: &[u8]) -> Result<EbmTable> {
    EbmParser::new().parse(name, data)
}

fn decode_table(name: &str, data: &[u8], count: i32, mode: ExtensionsMode) -> Result<EbmTable> {
    let extensions = mode == ExtensionsMode::On;
    let mut reader = RecordReader {
        data,
        pos: COUNT_SIZE,
        index: 0,
    };
    let mut established: Option<HeaderLayout> = None;
    let mut messages = Vec::with_capacity(count.unsigned_abs() as usize);

    for index in 0..count.unsigned_abs() as usize {
        reader.index = index;
        let message = decode_message(&mut reader, &mut established, mode)?;
        messages.push(message);
    }

    let trailing = data.len() - reader.pos;
    if trailing > 0 {
        if mode == ExtensionsMode::Unknown && trailing == 4 * messages.len() {
            return Err(EbmError::UnreadExtensions {
                count: messages.len(),
                trailing,
            });
        }
        warn!("{trailing} trailing bytes after message {}", messages.len());
    }

    Ok(EbmTable {
        name: name.to_string(),
        message_count: count,
        noa2_extensions: extensions,
        header_layout: established.unwrap_or_default(),
        messages,
    })
}

fn decode_message(
    reader: &mut RecordReader<'_>,
    established: &mut Option<HeaderLayout>,
    mode: ExtensionsMode,
) -> Result<EbmMessage> {
    let index = reader.index;

    let kind = reader.word()?;
    if kind > MAX_MESSAGE_TYPE {
        if mode == ExtensionsMode::Unknown {
            return Err(EbmError::UnexpectedType { index, kind });
        }
        warn!("Unexpected header type {kind:#010x} in message {index}");
    }

    let voice_id = reader.word()?;
    let unknown1 = reader.word()?;
    let name_id = reader.word()?;
    let extra_id = reader.word()?;
    let expr_id = reader.word()?;

    let layout = if reader.peek(0)? == RESERVED_WORD && reader.peek(1)? == RESERVED_WORD {
        reader.word()?;
        reader.word()?;
        HeaderLayout::Long
    } else {
        HeaderLayout::Short
    };
    match *established {
        None => *established = Some(layout),
        Some(expected) if expected != layout => {
            return Err(EbmError::HeaderSizeMismatch {
                index,
                expected: expected.words(),
                found: layout.words(),
            });
        }
        Some(_) => {}
    }

    let msg_id = reader.word()?;
    let unknown2 = reader.word()?;

    let length = reader.word()?;
    if length == 0 || length > MAX_STRING_LENGTH {
        return Err(EbmError::InvalidStringLength { index, length });
    }
    let raw = reader.bytes(length as usize)?;
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    if end + 1 != raw.len() {
        warn!("Message {index}: text ends at {end} of {length} bytes, the rest is dropped");
    }
    let msg_string = String::from_utf8(raw[..end].to_vec())
        .map_err(|source| EbmError::InvalidUtf8 { index, source })?;

    let extensions = if mode == ExtensionsMode::On {
        Some(reader.word()?)
    } else {
        None
    };

    Ok(EbmMessage {
        kind,
        voice_id,
        unknown1,
        name_id,
        extra_id,
        expr_id,
        msg_id,
        unknown2,
        msg_string,
        extensions,
        padding: false,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Raw record: header words, then the text bytes as stored
    fn record(words: &[u32], text: &[u8]) -> Vec<u8> {
        let mut out: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        out.extend_from_slice(text);
        out
    }

    fn table(count: i32, records: &[Vec<u8>]) -> Vec<u8> {
        let mut out = count.to_le_bytes().to_vec();
        for r in records {
            out.extend_from_slice(r);
        }
        out
    }

    #[test]
    fn test_short_header_record() {
        let data = table(1, &[record(&[2, 7, 0, 3, 0, 9, 42, 0, 3], b"Hi\0")]);
        let parsed = parse("a.ebm", &data).unwrap();

        assert_eq!(parsed.message_count, 1);
        assert_eq!(parsed.header_layout, HeaderLayout::Short);
        assert!(!parsed.noa2_extensions);

        let message = &parsed.messages[0];
        assert_eq!(message.kind, 2);
        assert_eq!(message.voice_id, 7);
        assert_eq!(message.name_id, 3);
        assert_eq!(message.expr_id, 9);
        assert_eq!(message.msg_id, 42);
        assert_eq!(message.msg_string, "Hi");
        assert_eq!(message.extensions, None);

        assert_eq!(parsed.build().unwrap(), data);
    }

    #[test]
    fn test_long_header_record() {
        let data = table(
            2,
            &[
                record(&[1, 0, 0, 0, 0xffff_ffff, 0, RESERVED_WORD, RESERVED_WORD, 5, 0, 4], b"abc\0"),
                record(&[1, 0, 0, 0, 0, 0, RESERVED_WORD, RESERVED_WORD, 6, 0, 4], b"def\0"),
            ],
        );
        let parsed = parse("a.ebm", &data).unwrap();

        assert_eq!(parsed.header_layout, HeaderLayout::Long);
        assert_eq!(parsed.messages[0].extra_id, 0xffff_ffff);
        assert_eq!(parsed.messages[1].msg_id, 6);
        assert_eq!(parsed.build().unwrap(), data);
    }

    #[test]
    fn test_extension_words_detected() {
        // Read without extensions, the first extension word (0x11) lands on
        // the second record's type
        let data = table(
            2,
            &[
                [record(&[2, 0, 0, 0, 0, 0, 1, 0, 4], b"one\0"), 0x11u32.to_le_bytes().to_vec()].concat(),
                [record(&[2, 0, 0, 0, 0, 0, 2, 0, 4], b"two\0"), 0x22u32.to_le_bytes().to_vec()].concat(),
            ],
        );
        let parsed = parse("a.ebm", &data).unwrap();

        assert!(parsed.noa2_extensions);
        assert_eq!(parsed.messages.len(), 2);
        assert_eq!(parsed.messages[0].extensions, Some(0x11));
        assert_eq!(parsed.messages[1].extensions, Some(0x22));
        assert_eq!(parsed.messages[1].msg_string, "two");
        assert_eq!(parsed.build().unwrap(), data);
    }

    #[test]
    fn test_mixed_header_sizes_fail() {
        let data = table(
            2,
            &[
                record(&[2, 1, 0, 3, 0, 9, 0, 0, 4], b"abc\0"),
                record(&[2, 1, 0, 3, 0, 9, RESERVED_WORD, RESERVED_WORD, 1, 0, 4], b"xyz\0"),
            ],
        );

        // The retry with extension words misreads the second record too
        let err = parse("a.ebm", &data).unwrap_err();
        assert!(err.is_layout_anomaly());

        let err = EbmParser::with_extensions(ExtensionsMode::Off)
            .parse("a.ebm", &data)
            .unwrap_err();
        assert!(matches!(
            err,
            EbmError::HeaderSizeMismatch {
                index: 1,
                expected: 9,
                found: 11
            }
        ));
    }

    #[test]
    fn test_string_length_limit() {
        let mut text = vec![b'x'; 2047];
        text.push(0);
        let data = table(1, &[record(&[0, 0, 0, 0, 0, 0, 0, 0, 2048], &text)]);
        let parsed = parse("a.ebm", &data).unwrap();
        assert_eq!(parsed.messages[0].msg_string.len(), 2047);

        let mut text = vec![b'x'; 2048];
        text.push(0);
        let data = table(1, &[record(&[0, 0, 0, 0, 0, 0, 0, 0, 2049], &text)]);
        assert!(matches!(
            parse("a.ebm", &data),
            Err(EbmError::InvalidStringLength { index: 0, length: 2049 })
        ));
    }

    #[test]
    fn test_zero_string_length_rejected() {
        let data = table(1, &[record(&[0, 0, 0, 0, 0, 0, 0, 0, 0], b"")]);
        assert!(matches!(
            parse("a.ebm", &data),
            Err(EbmError::InvalidStringLength { length: 0, .. })
        ));
    }

    #[test]
    fn test_count_larger_than_data() {
        let data = table(3, &[record(&[0, 0, 0, 0, 0, 0, 0, 0, 2], b"a\0")]);
        assert!(matches!(
            parse("a.ebm", &data),
            Err(EbmError::InvalidMessageCount { count: 3, .. })
        ));
        assert!(matches!(
            parse("a.ebm", &[1, 0]),
            Err(EbmError::Truncated { needed: 4, .. })
        ));
    }

    #[test]
    fn test_negative_count() {
        let data = table(-1, &[record(&[3, 0, 0, 0, 0, 0, 0, 0, 2], b"a\0")]);
        let parsed = parse("a.ebm", &data).unwrap();
        assert_eq!(parsed.message_count, -1);
        assert_eq!(parsed.messages.len(), 1);
        assert_eq!(parsed.build().unwrap(), data);
    }

    #[test]
    fn test_empty_table() {
        let parsed = parse("a.ebm", &0i32.to_le_bytes()).unwrap();
        assert!(parsed.messages.is_empty());
        assert_eq!(parsed.header_layout, HeaderLayout::Short);
    }

    #[test]
    fn test_forced_extensions() {
        let data = table(
            1,
            &[[record(&[2, 0, 0, 0, 0, 0, 1, 0, 2], b"a\0"), 5u32.to_le_bytes().to_vec()].concat()],
        );

        // Without extensions the word is only trailing data
        let off = EbmParser::with_extensions(ExtensionsMode::Off)
            .parse("a.ebm", &data)
            .unwrap();
        assert!(!off.noa2_extensions);
        assert_eq!(off.messages[0].extensions, None);

        let on = EbmParser::with_extensions(ExtensionsMode::On)
            .parse("a.ebm", &data)
            .unwrap();
        assert!(on.noa2_extensions);
        assert_eq!(on.messages[0].extensions, Some(5));
    }

    #[test]
    fn test_extension_word_on_every_record_detected() {
        // No anomaly while reading: only the leftover words give it away
        let mut source = EbmTable::new("a.ebm", HeaderLayout::Short, true);
        source.push(EbmMessage {
            kind: 2,
            msg_id: 1,
            msg_string: "a".to_string(),
            extensions: Some(7),
            ..Default::default()
        });
        let data = source.build().unwrap();
        assert_eq!(
            data,
            table(
                1,
                &[[record(&[2, 0, 0, 0, 0, 0, 1, 0, 2], b"a\0"), 7u32.to_le_bytes().to_vec()].concat()]
            )
        );

        let parsed = parse("a.ebm", &data).unwrap();
        assert!(parsed.noa2_extensions);
        assert_eq!(parsed.messages[0].extensions, Some(7));
        assert_eq!(parsed, source);
        assert_eq!(parsed.build().unwrap(), data);
    }

    #[test]
    fn test_odd_trailing_bytes_only_warn() {
        let mut data = table(1, &[record(&[2, 0, 0, 0, 0, 0, 1, 0, 2], b"a\0")]);
        data.extend_from_slice(&[0xaa, 0xbb]);

        let parsed = parse("a.ebm", &data).unwrap();
        assert!(!parsed.noa2_extensions);
        assert_eq!(parsed.messages[0].extensions, None);
        assert_eq!(parsed.messages[0].msg_string, "a");
    }

    #[test]
    fn test_text_after_terminator_is_dropped() {
        let data = table(1, &[record(&[2, 0, 0, 0, 0, 0, 1, 0, 4], b"Hi\0\0")]);
        let parsed = parse("a.ebm", &data).unwrap();
        assert_eq!(parsed.messages[0].msg_string, "Hi");
        assert_eq!(parsed.messages[0].msg_length(), 3);

        let rebuilt = parsed.build().unwrap();
        assert_eq!(rebuilt.len(), data.len() - 1);
    }

    #[test]
    fn test_high_type_tolerated_when_forced() {
        let data = table(1, &[record(&[0x40, 0, 0, 0, 0, 0, 0, 0, 2], b"a\0")]);
        assert!(matches!(
            EbmParser::new().parse("a.ebm", &data),
            Err(EbmError::Truncated { .. })
        ));

        let parsed = EbmParser::with_extensions(ExtensionsMode::Off)
            .parse("a.ebm", &data)
            .unwrap();
        assert_eq!(parsed.messages[0].kind, 0x40);
    }

    #[test]
    fn test_invalid_utf8() {
        let data = table(1, &[record(&[0, 0, 0, 0, 0, 0, 0, 0, 3], &[0xff, 0xfe, 0])]);
        assert!(matches!(
            parse("a.ebm", &data),
            Err(EbmError::InvalidUtf8 { index: 0, .. })
        ));
    }

    fn message_strategy() -> impl Strategy<Value = EbmMessage> {
        (
            0u32..=MAX_MESSAGE_TYPE,
            any::<[u32; 7]>(),
            "[a-zA-Z0-9 ,.!?']{0,64}",
        )
            .prop_map(|(kind, ids, msg_string)| EbmMessage {
                kind,
                voice_id: ids[0],
                unknown1: ids[1],
                name_id: ids[2],
                extra_id: ids[3],
                expr_id: ids[4],
                // msg_id follows expr_id in short headers and must not open a sentinel pair
                msg_id: ids[5] & 0x7fff_ffff,
                unknown2: ids[6],
                msg_string,
                extensions: None,
                padding: false,
            })
    }

    proptest! {
        #[test]
        fn build_then_parse_restores_table(
            messages in prop::collection::vec(message_strategy(), 0..8),
            long in any::<bool>(),
        ) {
            let layout = if long && !messages.is_empty() { HeaderLayout::Long } else { HeaderLayout::Short };
            let mut table = EbmTable::new("p.ebm", layout, false);
            for message in messages {
                table.push(message);
            }

            let data = table.build().unwrap();
            let parsed = parse("p.ebm", &data).unwrap();
            prop_assert_eq!(&parsed, &table);
            prop_assert_eq!(parsed.build().unwrap(), data);
        }
    }
}
