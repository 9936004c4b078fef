//! EBM message table support
//!
//! EBM files hold the dialogue of Gust games: a signed message count
//! followed by variable-length records. Tables decode to an [`EbmTable`]
//! that serializes to a JSON manifest and encodes back to the identical
//! binary.
//!
//! ```text
//! i32 nb_messages
//! record[|nb_messages|]    see [`message`] for the record layout
//! ```
//!
//! # Example
//!
//! ```
//! use gust_formats::ebm::{self, EbmMessage, EbmTable, HeaderLayout};
//!
//! let mut table = EbmTable::new("event.ebm", HeaderLayout::Short, false);
//! table.push(EbmMessage {
//!     kind: 2,
//!     msg_string: "Hello".to_string(),
//!     ..Default::default()
//! });
//!
//! let data = table.build().unwrap();
//! let decoded = ebm::parse("event.ebm", &data).unwrap();
//! assert_eq!(decoded, table);
//! ```

mod builder;
mod error;
pub mod message;
mod parser;
mod table;

use std::error::Error;

pub use error::{EbmError, Result};
pub use message::EbmMessage;
pub use parser::{EbmParser, ExtensionsMode, MAX_MESSAGE_TYPE, MAX_STRING_LENGTH, RESERVED_WORD, parse};
pub use table::{EbmTable, HeaderLayout};

impl crate::GustFormat for EbmTable {
    const EXTENSION: &'static str = "ebm";

    fn parse(data: &[u8]) -> std::result::Result<Self, Box<dyn Error>> {
        Ok(EbmParser::new().parse("", data)?)
    }

    fn build(&self) -> std::result::Result<Vec<u8>, Box<dyn Error>> {
        Ok(EbmTable::build(self)?)
    }
}
