//! MAT-file header parsing and byte order detection.
//!
//! # Header Structure
//! ```text
//! [116 bytes] Descriptive text, space or NUL padded
//! [  8 bytes] Subsystem data offset
//! [  2 bytes] Version (file byte order)
//! [  2 bytes] Endian indicator: "IM" for little-endian, "MI" for big-endian
//! ```
//! Element data starts right after, at byte 128.

use std::io::{Read, Seek, SeekFrom};
use log::{debug, info};

use crate::matfile::types::error::Result;
use crate::matfile::types::models::{Endian, MatHeader};
use crate::matfile::utils::truncated;

pub const HEADER_LENGTH: u64 = 128;
pub const DESCRIPTION_LENGTH: usize = 116;
pub const DATA_OFFSET_LENGTH: usize = 8;
pub const BYTE_ORDER_POSITION: u64 = 126;

/// Probes the endian indicator at offset 126, then rewinds to offset 0.
pub fn guess_byte_order<R: Read + Seek>(stream: &mut R) -> Result<Endian> {
    stream.seek(SeekFrom::Start(BYTE_ORDER_POSITION))?;
    let mut marker = [0u8; 2];
    stream
        .read_exact(&mut marker)
        .map_err(|e| truncated(e, BYTE_ORDER_POSITION, "128-byte file header"))?;
    stream.seek(SeekFrom::Start(0))?;

    let endian = Endian::from_marker(marker);
    debug!("Endian indicator {:?} -> {}", String::from_utf8_lossy(&marker), endian);
    Ok(endian)
}

/// Reads and parses the 128-byte header from the start of the stream.
///
/// Leaves the stream positioned at the first element.
pub fn parse<R: Read + Seek>(stream: &mut R) -> Result<MatHeader> {
    let endian = guess_byte_order(stream)?;

    let mut raw = [0u8; HEADER_LENGTH as usize];
    stream
        .read_exact(&mut raw)
        .map_err(|e| truncated(e, 0, "128-byte file header"))?;

    let header = parse_bytes(&raw, endian)?;
    info!(
        "Header parsed: version={:#06x}, {}, description='{}'",
        header.version, header.endian, header.description
    );
    Ok(header)
}

/// Parses header bytes whose byte order is already known.
pub fn parse_bytes(raw: &[u8; HEADER_LENGTH as usize], endian: Endian) -> Result<MatHeader> {
    let description = String::from_utf8_lossy(&raw[..DESCRIPTION_LENGTH]).trim_end_matches(is_filler).to_string();
    let data_offset = String::from_utf8_lossy(&raw[DESCRIPTION_LENGTH..DESCRIPTION_LENGTH + DATA_OFFSET_LENGTH])
        .trim_matches(is_filler)
        .to_string();
    let version_bytes = &raw[DESCRIPTION_LENGTH + DATA_OFFSET_LENGTH..BYTE_ORDER_POSITION as usize];
    let version = endian.read_u16(&mut &version_bytes[..], 124, "header version")?;

    Ok(MatHeader {
        description,
        data_offset: (!data_offset.is_empty()).then_some(data_offset),
        version,
        endian,
    })
}

/// Writers pad fixed-width text fields with spaces or NULs.
fn is_filler(c: char) -> bool {
    c == '\0' || c.is_whitespace()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::matfile::types::error::MatError;

    fn header_bytes(description: &str, version: [u8; 2], marker: &[u8; 2]) -> Vec<u8> {
        let mut raw = vec![b' '; DESCRIPTION_LENGTH];
        raw[..description.len()].copy_from_slice(description.as_bytes());
        raw.extend_from_slice(&[0; DATA_OFFSET_LENGTH]);
        raw.extend_from_slice(&version);
        raw.extend_from_slice(marker);
        raw
    }

    #[test]
    fn little_endian_marker() {
        let mut stream = Cursor::new(header_bytes("MATLAB 5.0 MAT-file", [0x00, 0x01], b"IM"));
        let header = parse(&mut stream).unwrap();
        assert_eq!(header.endian, Endian::Little);
        assert_eq!(header.version, 0x0100);
        assert_eq!(header.description, "MATLAB 5.0 MAT-file");
        assert_eq!(header.data_offset, None);
        assert_eq!(stream.position(), HEADER_LENGTH);
    }

    #[test]
    fn big_endian_marker() {
        let mut stream = Cursor::new(header_bytes("x", [0x01, 0x00], b"MI"));
        let header = parse(&mut stream).unwrap();
        assert_eq!(header.endian, Endian::Big);
        assert_eq!(header.version, 0x0100);
    }

    #[test]
    fn probe_rewinds() {
        let mut stream = Cursor::new(header_bytes("", [0, 1], b"IM"));
        stream.set_position(40);
        assert_eq!(guess_byte_order(&mut stream).unwrap(), Endian::Little);
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn subsystem_offset_is_kept() {
        let mut raw = header_bytes("d", [0, 1], b"IM");
        raw[DESCRIPTION_LENGTH..DESCRIPTION_LENGTH + 4].copy_from_slice(b"1024");
        let header = parse(&mut Cursor::new(raw)).unwrap();
        assert_eq!(header.data_offset.as_deref(), Some("1024"));
    }

    #[test]
    fn short_stream_is_truncated() {
        let mut stream = Cursor::new(vec![0u8; 100]);
        assert!(matches!(parse(&mut stream), Err(MatError::TruncatedStream { .. })));
    }
}
