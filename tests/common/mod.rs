//! In-memory MAT-file fixture builder shared by the integration tests.

#![allow(dead_code)]

use std::io::Write;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use matfile_reader::Endian;

pub const MI_INT8: u32 = 1;
pub const MI_UINT8: u32 = 2;
pub const MI_INT32: u32 = 5;
pub const MI_UINT32: u32 = 6;
pub const MI_DOUBLE: u32 = 9;
pub const MI_MATRIX: u32 = 14;
pub const MI_COMPRESSED: u32 = 15;

pub const MX_CELL: u32 = 1;
pub const MX_STRUCT: u32 = 2;
pub const MX_SPARSE: u32 = 5;
pub const MX_DOUBLE: u32 = 6;
pub const MX_INT32: u32 = 12;

pub const FLAG_COMPLEX: u32 = 1 << 10;
pub const FLAG_GLOBAL: u32 = 1 << 9;
pub const FLAG_LOGICAL: u32 = 1 << 8;

/// Writes tags, primitive arrays and matrices in one byte order.
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    pub endian: Endian,
}

impl Fixture {
    pub fn little() -> Self {
        Self { endian: Endian::Little }
    }

    pub fn big() -> Self {
        Self { endian: Endian::Big }
    }

    fn put_u32(&self, out: &mut Vec<u8>, v: u32) {
        match self.endian {
            Endian::Little => out.write_u32::<LittleEndian>(v),
            Endian::Big => out.write_u32::<BigEndian>(v),
        }
        .unwrap();
    }

    pub fn u32s(&self, values: &[u32]) -> Vec<u8> {
        let mut out = Vec::new();
        for &v in values {
            self.put_u32(&mut out, v);
        }
        out
    }

    pub fn i32s(&self, values: &[i32]) -> Vec<u8> {
        let mut out = Vec::new();
        for &v in values {
            match self.endian {
                Endian::Little => out.write_i32::<LittleEndian>(v),
                Endian::Big => out.write_i32::<BigEndian>(v),
            }
            .unwrap();
        }
        out
    }

    pub fn f64s(&self, values: &[f64]) -> Vec<u8> {
        let mut out = Vec::new();
        for &v in values {
            match self.endian {
                Endian::Little => out.write_f64::<LittleEndian>(v),
                Endian::Big => out.write_f64::<BigEndian>(v),
            }
            .unwrap();
        }
        out
    }

    /// Regular-form element, zero padded to an 8-byte boundary.
    pub fn element(&self, data_type: u32, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        self.put_u32(&mut out, data_type);
        self.put_u32(&mut out, payload.len() as u32);
        out.extend_from_slice(payload);
        pad(&mut out);
        out
    }

    /// Small-form element for payloads of 1 to 4 bytes.
    pub fn small_element(&self, data_type: u32, payload: &[u8]) -> Vec<u8> {
        assert!((1..=4).contains(&payload.len()));
        let mut out = Vec::new();
        self.put_u32(&mut out, ((payload.len() as u32) << 16) | data_type);
        out.extend_from_slice(payload);
        pad(&mut out);
        out
    }

    /// Name element, using the small form when it fits as MATLAB does.
    pub fn name(&self, name: &str) -> Vec<u8> {
        match name.len() {
            1..=4 => self.small_element(MI_INT8, name.as_bytes()),
            _ => self.element(MI_INT8, name.as_bytes()),
        }
    }

    /// Matrix element from its header fields and already encoded class payload.
    pub fn matrix(&self, class_and_flags: u32, nonzero_max: u32, dims: &[i32], name: &str, parts: &[Vec<u8>]) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend(self.element(MI_UINT32, &self.u32s(&[class_and_flags, nonzero_max])));
        payload.extend(self.element(MI_INT32, &self.i32s(dims)));
        payload.extend(self.name(name));
        for part in parts {
            payload.extend_from_slice(part);
        }
        self.element(MI_MATRIX, &payload)
    }

    /// Double matrix from column-major data.
    pub fn dense(&self, name: &str, rows: i32, cols: i32, data: &[f64]) -> Vec<u8> {
        self.matrix(MX_DOUBLE, 0, &[rows, cols], name, &[self.element(MI_DOUBLE, &self.f64s(data))])
    }

    pub fn complex_dense(&self, name: &str, rows: i32, cols: i32, real: &[f64], imag: &[f64]) -> Vec<u8> {
        self.matrix(
            MX_DOUBLE | FLAG_COMPLEX,
            0,
            &[rows, cols],
            name,
            &[self.element(MI_DOUBLE, &self.f64s(real)), self.element(MI_DOUBLE, &self.f64s(imag))],
        )
    }

    pub fn sparse(&self, name: &str, rows: i32, cols: i32, ir: &[i32], jc: &[i32], pr: &[f64]) -> Vec<u8> {
        self.matrix(
            MX_SPARSE,
            ir.len() as u32,
            &[rows, cols],
            name,
            &[
                self.element(MI_INT32, &self.i32s(ir)),
                self.element(MI_INT32, &self.i32s(jc)),
                self.element(MI_DOUBLE, &self.f64s(pr)),
            ],
        )
    }

    pub fn cell(&self, name: &str, dims: &[i32], cells: &[Vec<u8>]) -> Vec<u8> {
        self.matrix(MX_CELL, 0, dims, name, cells)
    }

    /// Compressed element wrapping already encoded elements. No outer padding.
    pub fn compressed(&self, elements: &[Vec<u8>]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        for element in elements {
            encoder.write_all(element).unwrap();
        }
        let deflated = encoder.finish().unwrap();

        let mut out = Vec::new();
        self.put_u32(&mut out, MI_COMPRESSED);
        self.put_u32(&mut out, deflated.len() as u32);
        out.extend(deflated);
        out
    }

    /// Full file: 128-byte header followed by `elements`.
    pub fn file(&self, elements: &[Vec<u8>]) -> Vec<u8> {
        let mut out = header(self.endian, "MATLAB 5.0 MAT-file, created by fixture builder");
        for element in elements {
            out.extend_from_slice(element);
        }
        out
    }
}

/// 128-byte header with version 0x0100 in the given byte order.
pub fn header(endian: Endian, description: &str) -> Vec<u8> {
    let mut out = vec![b' '; 116];
    out[..description.len()].copy_from_slice(description.as_bytes());
    out.extend_from_slice(&[0; 8]);
    match endian {
        Endian::Little => {
            out.extend_from_slice(&[0x00, 0x01]);
            out.extend_from_slice(b"IM");
        }
        Endian::Big => {
            out.extend_from_slice(&[0x01, 0x00]);
            out.extend_from_slice(b"MI");
        }
    }
    out
}

fn pad(out: &mut Vec<u8>) {
    while out.len() % 8 != 0 {
        out.push(0);
    }
}
