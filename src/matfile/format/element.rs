//! # Element Decoding
//!
//! An element is a tag followed by its payload. Depending on the tag's data
//! type the payload is:
//!
//! - a primitive array, padded with zero bytes so that tag and payload
//!   together end on an 8-byte boundary,
//! - a matrix, decoded by [`matrix::read_matrix`] from exactly
//!   `byte_length` bytes,
//! - a compressed block, kept as raw bytes until its content is requested.
//!
//! Matrix and compressed payloads are never followed by outer padding.

use std::io::Read;
use log::trace;

use super::matrix;
use super::tag::{read_tag, read_tag_or_eof};
use crate::matfile::codec::compression::CompressedBlock;
use crate::matfile::types::error::{MatError, Result};
use crate::matfile::types::models::{DataType, Endian, Tag};
use crate::matfile::types::value::{Element, MatrixData, NumericArray, Payload};
use crate::matfile::utils::Source;

/// Reads one complete element, including any trailing padding.
pub fn read_element<R: Read>(source: &mut Source<R>, endian: Endian) -> Result<Element> {
    let tag = read_tag(source, endian)?;
    read_element_body(source, endian, tag)
}

/// Reads the payload described by an already decoded tag.
pub fn read_element_body<R: Read>(source: &mut Source<R>, endian: Endian, tag: Tag) -> Result<Element> {
    if tag.data_type == DataType::Unrecognized {
        return Err(MatError::UnrecognizedType { tag });
    }
    if tag.byte_length == 0 {
        return Ok(Element { tag, payload: Payload::Empty });
    }

    let payload = match tag.data_type {
        DataType::Compressed => {
            let raw = source.read_bytes(tag.byte_length as usize, "compressed payload")?;
            Payload::Compressed(CompressedBlock::new(raw))
        }
        DataType::Matrix => Payload::Matrix(Box::new(read_matrix_payload(source, endian, &tag)?)),
        _ => {
            let array = read_primitive(source, endian, &tag)?;
            skip_padding(source, &tag)?;
            Payload::Numeric(array)
        }
    };

    Ok(Element { tag, payload })
}

/// Decodes a matrix from a buffer holding exactly its declared payload.
fn read_matrix_payload<R: Read>(
    source: &mut Source<R>,
    endian: Endian,
    tag: &Tag,
) -> Result<MatrixData> {
    let start = source.position();
    let body = source.read_bytes(tag.byte_length as usize, "matrix payload")?;
    let mut inner = Source::at(body.as_slice(), start);
    let matrix = matrix::read_matrix(&mut inner, endian)?;

    let used = inner.position() - start;
    if used != tag.byte_length as u64 {
        return Err(MatError::CountMismatch {
            item_type: "matrix payload bytes",
            expected: tag.byte_length as u64,
            found: used,
        });
    }
    Ok(matrix)
}

fn read_primitive<R: Read>(source: &mut Source<R>, endian: Endian, tag: &Tag) -> Result<NumericArray> {
    let width = tag.data_type.width().ok_or(MatError::UnrecognizedType { tag: *tag })?;
    if tag.byte_length % width != 0 {
        return Err(MatError::MalformedTag {
            tag: *tag,
            reason: format!("{} bytes is not a multiple of the {}-byte element width", tag.byte_length, width),
        });
    }

    let bytes = source.read_bytes(tag.byte_length as usize, "element data")?;
    trace!("Decoding {} values of {}", tag.byte_length / width, tag.data_type.name());

    let array = match tag.data_type {
        DataType::Int8 => NumericArray::Int8(bytes.iter().map(|&b| b as i8).collect()),
        DataType::UInt8 => NumericArray::UInt8(bytes),
        DataType::Int16 => NumericArray::Int16(endian.decode_i16s(&bytes)),
        DataType::UInt16 => NumericArray::UInt16(endian.decode_u16s(&bytes)),
        DataType::Int32 => NumericArray::Int32(endian.decode_i32s(&bytes)),
        DataType::UInt32 => NumericArray::UInt32(endian.decode_u32s(&bytes)),
        DataType::Single => NumericArray::Single(endian.decode_f32s(&bytes)),
        DataType::Double => NumericArray::Double(endian.decode_f64s(&bytes)),
        DataType::Int64 => NumericArray::Int64(endian.decode_i64s(&bytes)),
        DataType::UInt64 => NumericArray::UInt64(endian.decode_u64s(&bytes)),
        DataType::Utf8 => NumericArray::Utf8(bytes),
        DataType::Utf16 => NumericArray::Utf16(endian.decode_u16s(&bytes)),
        DataType::Utf32 => NumericArray::Utf32(endian.decode_u32s(&bytes)),
        DataType::Matrix | DataType::Compressed | DataType::Unrecognized => {
            return Err(MatError::UnrecognizedType { tag: *tag });
        }
    };
    Ok(array)
}

/// Consumes the zero bytes that align a primitive element to 8 bytes.
fn skip_padding<R: Read>(source: &mut Source<R>, tag: &Tag) -> Result<()> {
    let padding = tag.padding();
    if padding == 0 {
        return Ok(());
    }
    let bytes = source.read_bytes(padding as usize, "element padding")?;
    if bytes.iter().any(|&b| b != 0) {
        return Err(MatError::PaddingCorruption { tag: *tag });
    }
    Ok(())
}

/// A sequence of elements read until the underlying stream is exhausted.
///
/// Used for the file body and for the content of compressed blocks. The
/// iterator stops after the first error, since the stream position can no
/// longer be trusted.
#[derive(Debug)]
pub struct ElementStream<R> {
    source: Source<R>,
    endian: Endian,
    finished: bool,
}

impl<R: Read> ElementStream<R> {
    /// Reads elements from the start of `reader`.
    pub fn new(reader: R, endian: Endian) -> Self {
        Self::from_source(Source::new(reader), endian)
    }

    pub(crate) fn from_source(source: Source<R>, endian: Endian) -> Self {
        Self {
            source,
            endian,
            finished: false,
        }
    }

    /// Byte offset of the next element.
    pub fn position(&self) -> u64 {
        self.source.position()
    }

    pub(crate) fn source_mut(&mut self) -> &mut Source<R> {
        &mut self.source
    }
}

impl<R: Read> Iterator for ElementStream<R> {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = match read_tag_or_eof(&mut self.source, self.endian) {
            Ok(None) => {
                self.finished = true;
                return None;
            }
            Ok(Some(tag)) => read_element_body(&mut self.source, self.endian, tag),
            Err(e) => Err(e),
        };

        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}
