//! Entry layout detection
//!
//! Nothing in a PAK archive says whether its entries use 32-bit or 64-bit
//! data offsets. Payloads are stored back to back, so in a real archive the
//! offsets grow steadily from one entry to the next. Reading the table with
//! the wrong stride lands on name or key bytes instead, which jump around.
//!
//! For the first [`SAMPLE_LIMIT`] entries the detector reads:
//! - the narrow candidate: the 32-bit offset of a 160-byte record
//! - the wide candidate: the upper 32 bits of the 64-bit offset of a
//!   168-byte record
//!
//! and sums the absolute differences between consecutive values, starting
//! from zero. The candidate with the smaller sum wins; ties go to the
//! narrow layout.

use crate::bytes::u32_at;
use crate::pak::entry::{EntryLayout, NAME_SIZE};
use crate::pak::error::{PakError, PakResult};
use gust_crypto::KEY_SIZE;

/// Maximum number of entries sampled
pub const SAMPLE_LIMIT: u32 = 64;

/// Offset of the data offset field within a record
const DATA_OFFSET_FIELD: usize = NAME_SIZE + 4 + KEY_SIZE;

/// Accumulated discontinuity of each candidate layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutScores {
    /// Sum for the 32-bit reading, `None` if the table doesn't fit
    pub narrow: Option<u64>,
    /// Sum for the 64-bit reading, `None` if the table doesn't fit
    pub wide: Option<u64>,
}

impl LayoutScores {
    /// Pick the layout with the smaller discontinuity
    pub fn best(&self) -> Option<EntryLayout> {
        match (self.narrow, self.wide) {
            (Some(narrow), Some(wide)) if narrow <= wide => Some(EntryLayout::Narrow),
            (_, Some(_)) => Some(EntryLayout::Wide),
            (Some(_), None) => Some(EntryLayout::Narrow),
            (None, None) => None,
        }
    }
}

fn table_fits(table: &[u8], entry_count: u32, layout: EntryLayout) -> bool {
    (entry_count as usize)
        .checked_mul(layout.record_size())
        .is_some_and(|size| size <= table.len())
}

fn discontinuity(values: impl Iterator<Item = u32>) -> u64 {
    let mut last = 0u32;
    let mut sum = 0u64;
    for value in values {
        sum += u64::from(value.abs_diff(last));
        last = value;
    }
    sum
}

/// Score both layouts over the sampled entries.
///
/// `table` starts at the first entry record and may extend to the end of
/// the archive. A layout whose full table doesn't fit is not scored.
pub fn score_layouts(table: &[u8], entry_count: u32) -> LayoutScores {
    let sample = entry_count.min(SAMPLE_LIMIT) as usize;

    let narrow = table_fits(table, entry_count, EntryLayout::Narrow).then(|| {
        discontinuity((0..sample).map(|i| {
            u32_at(table, i * EntryLayout::Narrow.record_size() + DATA_OFFSET_FIELD)
        }))
    });
    let wide = table_fits(table, entry_count, EntryLayout::Wide).then(|| {
        discontinuity((0..sample).map(|i| {
            u32_at(table, i * EntryLayout::Wide.record_size() + DATA_OFFSET_FIELD + 4)
        }))
    });

    LayoutScores { narrow, wide }
}

/// Detect the entry layout of a table holding `entry_count` entries.
pub fn detect_layout(table: &[u8], entry_count: u32) -> PakResult<EntryLayout> {
    if entry_count == 0 {
        return Err(PakError::NoEntries);
    }

    let scores = score_layouts(table, entry_count);
    tracing::debug!(
        "Layout scores over {} entries: narrow={:?} wide={:?}",
        entry_count.min(SAMPLE_LIMIT),
        scores.narrow,
        scores.wide
    );

    scores.best().ok_or(PakError::TruncatedTable {
        entry_count,
        available: table.len(),
    })
}
