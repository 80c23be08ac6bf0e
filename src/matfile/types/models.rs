//! Core data structures for MAT-file components.
//!
//! This module defines the fundamental types used throughout the library:
//! - The file header and its byte order
//! - Tag metadata and the data type registry
//! - Matrix class codes and array flags

use std::fmt;

/// Byte order of every multi-byte field after the header's marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Interprets the 2-byte marker stored at offset 126 of the header.
    ///
    /// `"IM"` means the writer was little-endian (it wrote the 16-bit value
    /// `'M' << 8 | 'I'`); anything else is read as big-endian.
    pub fn from_marker(marker: [u8; 2]) -> Self {
        if &marker == b"IM" {
            Endian::Little
        } else {
            Endian::Big
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endian::Little => write!(f, "little-endian"),
            Endian::Big => write!(f, "big-endian"),
        }
    }
}

/// Parsed 128-byte header of a level 5 MAT-file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatHeader {
    /// Free-text description, right-trimmed.
    pub description: String,
    /// Subsystem data offset text. `None` when the field is blank.
    pub data_offset: Option<String>,
    pub version: u16,
    pub endian: Endian,
}

/// Data type codes carried in the type field of a tag.
///
/// Unknown codes resolve to [`DataType::Unrecognized`] so the tag can still
/// be reported; the element decoder rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Single,
    Double,
    Int64,
    UInt64,
    Matrix,
    Compressed,
    Utf8,
    Utf16,
    Utf32,
    Unrecognized,
}

impl DataType {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Int8,
            2 => Self::UInt8,
            3 => Self::Int16,
            4 => Self::UInt16,
            5 => Self::Int32,
            6 => Self::UInt32,
            7 => Self::Single,
            9 => Self::Double,
            12 => Self::Int64,
            13 => Self::UInt64,
            14 => Self::Matrix,
            15 => Self::Compressed,
            16 => Self::Utf8,
            17 => Self::Utf16,
            18 => Self::Utf32,
            _ => Self::Unrecognized,
        }
    }

    /// Width in bytes of one value, for primitive types only.
    pub fn width(&self) -> Option<u32> {
        match self {
            Self::Int8 | Self::UInt8 | Self::Utf8 => Some(1),
            Self::Int16 | Self::UInt16 | Self::Utf16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Single | Self::Utf32 => Some(4),
            Self::Double | Self::Int64 | Self::UInt64 => Some(8),
            Self::Matrix | Self::Compressed | Self::Unrecognized => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "miINT8",
            Self::UInt8 => "miUINT8",
            Self::Int16 => "miINT16",
            Self::UInt16 => "miUINT16",
            Self::Int32 => "miINT32",
            Self::UInt32 => "miUINT32",
            Self::Single => "miSINGLE",
            Self::Double => "miDOUBLE",
            Self::Int64 => "miINT64",
            Self::UInt64 => "miUINT64",
            Self::Matrix => "miMATRIX",
            Self::Compressed => "miCOMPRESSED",
            Self::Utf8 => "miUTF8",
            Self::Utf16 => "miUTF16",
            Self::Utf32 => "miUTF32",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Matrix class encoded in the low 4 bits of the array flags word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatlabClass {
    Cell,
    Sparse,
    Double,
    Single,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    /// Struct, object, char, or a code outside the registry. Carries the raw code.
    Unsupported(u8),
}

impl MatlabClass {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Cell,
            5 => Self::Sparse,
            6 => Self::Double,
            7 => Self::Single,
            8 => Self::Int8,
            9 => Self::UInt8,
            10 => Self::Int16,
            11 => Self::UInt16,
            12 => Self::Int32,
            13 => Self::UInt32,
            14 => Self::Int64,
            15 => Self::UInt64,
            other => Self::Unsupported(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::Sparse => "sparse",
            Self::Double => "double",
            Self::Single => "single",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

/// Boolean attributes from bits 8-10 of the array flags word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrayFlags {
    pub logical: bool,
    pub global: bool,
    pub complex: bool,
}

impl ArrayFlags {
    pub fn from_word(word: u32) -> Self {
        Self {
            logical: word & (1 << 8) != 0,
            global: word & (1 << 9) != 0,
            complex: word & (1 << 10) != 0,
        }
    }
}

/// Type and length header preceding every element's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    /// Raw type code as stored in the file (the low 16 bits in small form).
    pub type_code: u32,
    pub data_type: DataType,
    pub byte_length: u32,
    /// Whether type and length were packed into a single 4-byte word.
    pub small: bool,
    /// Byte offset of the tag within the stream it was read from.
    pub offset: u64,
}

impl Tag {
    pub const REGULAR_SIZE: u32 = 8;
    pub const SMALL_SIZE: u32 = 4;

    /// Number of bytes the tag itself occupies.
    pub fn header_size(&self) -> u32 {
        if self.small { Self::SMALL_SIZE } else { Self::REGULAR_SIZE }
    }

    /// Number of zero bytes that follow the payload to reach an 8-byte boundary.
    pub fn padding(&self) -> u32 {
        let residue = ((self.byte_length as u64 + self.header_size() as u64) % 8) as u32;
        if residue == 0 { 0 } else { 8 - residue }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "<{}[{}] bytes={} form={} offset={}>",
            self.data_type.name(),
            self.type_code,
            self.byte_length,
            if self.small { "small" } else { "regular" },
            self.offset
        )
    }
}
