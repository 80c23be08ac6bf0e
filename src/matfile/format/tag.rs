//! # Tag Decoding
//!
//! Every element starts with a tag in one of two layouts:
//!
//! ```text
//! Regular form (8 bytes):            Small form (4 bytes):
//! ┌──────────────┬──────────────┐    ┌──────────────┬──────────────┐
//! │ type (u32)   │ length (u32) │    │ length (u16) │ type (u16)   │
//! └──────────────┴──────────────┘    └──────────────┴──────────────┘
//! ```
//!
//! The small form is recognized by a non-zero upper half of the first word
//! and is only valid for payloads of 1 to 4 bytes, which then live in the
//! remaining 4 bytes of the 8-byte slot.

use std::io::Read;
use log::trace;

use crate::matfile::types::error::{MatError, Result};
use crate::matfile::types::models::{DataType, Endian, Tag};
use crate::matfile::utils::Source;

/// Reads one tag. Any early end of stream is an error.
pub fn read_tag<R: Read>(source: &mut Source<R>, endian: Endian) -> Result<Tag> {
    let offset = source.position();
    read_tag_or_eof(source, endian)?.ok_or(MatError::TruncatedStream {
        offset,
        context: "element tag",
    })
}

/// Reads one tag, returning `Ok(None)` if the stream ends cleanly before it.
pub fn read_tag_or_eof<R: Read>(source: &mut Source<R>, endian: Endian) -> Result<Option<Tag>> {
    let offset = source.position();
    let Some(word) = source.read_u32_or_eof(endian, "element tag")? else {
        return Ok(None);
    };

    let upper = word >> 16;
    let lower = word & 0xFFFF;

    let tag = if upper > 0 {
        let tag = Tag {
            type_code: lower,
            data_type: DataType::from_code(lower),
            byte_length: upper,
            small: true,
            offset,
        };
        if upper > 4 {
            return Err(MatError::MalformedTag {
                tag,
                reason: format!("small element form declares {} bytes (at most 4 allowed)", upper),
            });
        }
        tag
    } else {
        let length_offset = source.position();
        let byte_length = endian.read_u32(source, length_offset, "element length")?;
        Tag {
            type_code: word,
            data_type: DataType::from_code(word),
            byte_length,
            small: false,
            offset,
        }
    };

    trace!("Read tag {}", tag);
    Ok(Some(tag))
}
