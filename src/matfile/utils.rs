//! Low-level byte reading utilities

use std::io::{self, Read};
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

use crate::matfile::types::error::{MatError, Result};
use crate::matfile::types::models::Endian;

/// A reader that counts the bytes consumed through it.
///
/// Offsets are relative to wherever the wrapped reader started, which is
/// either the start of the file or the start of a decompressed block.
#[derive(Debug)]
pub struct Source<R> {
    inner: R,
    position: u64,
}

impl<R: Read> Source<R> {
    pub fn new(inner: R) -> Self {
        Self::at(inner, 0)
    }

    /// Wraps a reader that is already positioned at `position`.
    pub fn at(inner: R, position: u64) -> Self {
        Self { inner, position }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Resets the counter after the wrapped reader has been repositioned.
    pub fn set_position(&mut self, position: u64) {
        self.position = position;
    }

    /// Reads a `u32` that may legitimately not exist.
    ///
    /// Returns `Ok(None)` when the stream is exhausted before the first byte,
    /// and `TruncatedStream` when it ends part way through the word.
    pub fn read_u32_or_eof(&mut self, endian: Endian, context: &'static str) -> Result<Option<u32>> {
        let start = self.position;
        let mut buf = [0u8; 4];
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        match filled {
            0 => Ok(None),
            4 => Ok(Some(endian.read_u32(&mut &buf[..], start, context)?)),
            _ => Err(MatError::TruncatedStream { offset: start, context }),
        }
    }

    /// Reads exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<Vec<u8>> {
        let offset = self.position;
        // `len` comes from the file, so only allocate what is actually read.
        let mut buf = Vec::new();
        self.by_ref().take(len as u64).read_to_end(&mut buf)?;
        if buf.len() < len {
            return Err(MatError::TruncatedStream { offset, context });
        }
        Ok(buf)
    }
}

impl<R: Read> Read for Source<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

/// Maps an early EOF to `TruncatedStream`, passing other I/O errors through.
pub fn truncated(err: io::Error, offset: u64, context: &'static str) -> MatError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        MatError::TruncatedStream { offset, context }
    } else {
        MatError::Io(err)
    }
}

macro_rules! endian_reader {
    ($name:ident, $ty:ty, $method:ident) => {
        pub fn $name(&self, reader: &mut impl Read, offset: u64, context: &'static str) -> Result<$ty> {
            match self {
                Endian::Little => reader.$method::<LittleEndian>(),
                Endian::Big => reader.$method::<BigEndian>(),
            }
            .map_err(|e| truncated(e, offset, context))
        }
    };
}

macro_rules! endian_slice_decoder {
    ($name:ident, $ty:ty, $method:ident, $width:expr) => {
        /// Decodes whole values from `bytes`; a trailing partial value is ignored.
        pub fn $name(&self, bytes: &[u8]) -> Vec<$ty> {
            let mut out = vec![<$ty>::default(); bytes.len() / $width];
            let used = out.len() * $width;
            match self {
                Endian::Little => LittleEndian::$method(&bytes[..used], &mut out),
                Endian::Big => BigEndian::$method(&bytes[..used], &mut out),
            }
            out
        }
    };
}

/// Fixed-width reads in the file's byte order.
impl Endian {
    endian_reader!(read_u16, u16, read_u16);
    endian_reader!(read_u32, u32, read_u32);

    endian_slice_decoder!(decode_u16s, u16, read_u16_into, 2);
    endian_slice_decoder!(decode_i16s, i16, read_i16_into, 2);
    endian_slice_decoder!(decode_u32s, u32, read_u32_into, 4);
    endian_slice_decoder!(decode_i32s, i32, read_i32_into, 4);
    endian_slice_decoder!(decode_u64s, u64, read_u64_into, 8);
    endian_slice_decoder!(decode_i64s, i64, read_i64_into, 8);
    endian_slice_decoder!(decode_f32s, f32, read_f32_into, 4);
    endian_slice_decoder!(decode_f64s, f64, read_f64_into, 8);
}
