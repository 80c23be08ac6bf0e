//! Decompression of `miCOMPRESSED` elements.
//!
//! A compressed element's payload is a zlib stream. Once inflated it holds a
//! further sequence of tagged elements starting at offset 0, which are read
//! with the same element decoder as the file body.

use std::cell::OnceCell;
use std::io::{Cursor, Read};

use flate2::read::ZlibDecoder;
use log::trace;

use crate::matfile::format::element::ElementStream;
use crate::matfile::types::error::{MatError, Result};
use crate::matfile::types::models::Endian;

/// Raw compressed bytes with lazily inflated, cached content.
#[derive(Debug)]
pub struct CompressedBlock {
    raw: Vec<u8>,
    content: OnceCell<Vec<u8>>,
}

impl CompressedBlock {
    pub fn new(raw: Vec<u8>) -> Self {
        Self {
            raw,
            content: OnceCell::new(),
        }
    }

    /// The compressed bytes as stored in the file.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Returns the inflated bytes, decompressing on first use only.
    pub fn content(&self) -> Result<&[u8]> {
        if let Some(content) = self.content.get() {
            return Ok(content);
        }
        let inflated = inflate(&self.raw)?;
        Ok(self.content.get_or_init(|| inflated))
    }

    /// Inflated length rounded up to a multiple of 4.
    pub fn padded_length(&self) -> Result<usize> {
        Ok(self.content()?.len().next_multiple_of(4))
    }

    /// Decodes the inflated content as a stream of elements, borrowing the cache.
    pub fn decode_nested(&self, endian: Endian) -> Result<ElementStream<&[u8]>> {
        Ok(ElementStream::new(self.content()?, endian))
    }

    /// Like [`decode_nested`](Self::decode_nested), but takes ownership of the content.
    pub fn into_nested(self, endian: Endian) -> Result<ElementStream<Cursor<Vec<u8>>>> {
        let content = match self.content.into_inner() {
            Some(content) => content,
            None => inflate(&self.raw)?,
        };
        Ok(ElementStream::new(Cursor::new(content), endian))
    }
}

/// Inflates a zlib-wrapped DEFLATE payload.
pub fn inflate(payload: &[u8]) -> Result<Vec<u8>> {
    trace!("Decompressing with Zlib: {} bytes", payload.len());
    let mut output = Vec::with_capacity(payload.len().saturating_mul(2));
    let mut decoder = ZlibDecoder::new(payload);
    decoder
        .read_to_end(&mut output)
        .map_err(|e| MatError::DecompressionError(format!("Zlib decompression failed: {}", e)))?;
    trace!("Decompressed to {} bytes", output.len());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    use super::*;
    use crate::matfile::types::value::NumericArray;

    fn deflate(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn content_is_cached() {
        let block = CompressedBlock::new(deflate(b"hello, matrix"));
        let first = block.content().unwrap().as_ptr();
        let second = block.content().unwrap().as_ptr();
        assert_eq!(first, second);
        assert_eq!(block.content().unwrap(), b"hello, matrix");
    }

    #[test]
    fn padded_length_rounds_to_four() {
        assert_eq!(CompressedBlock::new(deflate(&[1; 13])).padded_length().unwrap(), 16);
        assert_eq!(CompressedBlock::new(deflate(&[1; 8])).padded_length().unwrap(), 8);
    }

    fn int32_element(values: &[i32]) -> Vec<u8> {
        let mut out = 5u32.to_le_bytes().to_vec();
        out.extend_from_slice(&(values.len() as u32 * 4).to_le_bytes());
        for v in values {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.resize(out.len().next_multiple_of(8), 0);
        out
    }

    #[test]
    fn nested_elements_are_decoded() {
        let mut inner = int32_element(&[1, 2]);
        inner.extend(int32_element(&[3, 4, 5]));
        let block = CompressedBlock::new(deflate(&inner));

        let elements = block
            .decode_nested(Endian::Little)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].payload.as_numeric(), Some(&NumericArray::Int32(vec![1, 2])));
        assert_eq!(elements[1].payload.as_numeric(), Some(&NumericArray::Int32(vec![3, 4, 5])));
        assert_eq!(elements[1].tag.offset, 16);

        // The cached content can be decoded again
        assert_eq!(block.decode_nested(Endian::Little).unwrap().count(), 2);
    }

    #[test]
    fn truncated_nested_stream() {
        let mut inner = int32_element(&[1, 2, 3, 4]);
        inner.truncate(12);
        let block = CompressedBlock::new(deflate(&inner));

        let mut stream = block.decode_nested(Endian::Little).unwrap();
        assert!(matches!(stream.next(), Some(Err(MatError::TruncatedStream { offset: 8, .. }))));
        assert!(stream.next().is_none());
    }

    #[test]
    fn corrupt_payload_fails() {
        let block = CompressedBlock::new(vec![0xde, 0xad, 0xbe, 0xef, 0x00]);
        assert!(matches!(block.content(), Err(MatError::DecompressionError(_))));
    }
}
