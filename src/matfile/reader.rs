use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use log::info;

use super::format::header;
use super::iter::{Elements, Values};
use super::types::error::Result;
use super::types::models::{Endian, MatHeader};
use super::types::value::{MatValue, Payload};

/// The main reader for level 5 MAT-files.
///
/// The header is parsed once when the reader is created. The body is decoded
/// lazily on every pass through [`produce`](Self::produce) or
/// [`elements`](Self::elements); nothing is cached between passes.
#[derive(Debug)]
pub struct MatFileReader<R> {
    stream: R,
    pub header: MatHeader,
}

impl MatFileReader<BufReader<File>> {
    /// Opens a MAT-file from the given path.
    ///
    /// # Errors
    /// Returns an error if:
    /// - File cannot be opened
    /// - File is shorter than the 128-byte header
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening MAT-file: {}", path.display());
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> MatFileReader<R> {
    /// Creates a reader over any seekable byte stream positioned anywhere.
    ///
    /// Detects the byte order, reads the 128-byte header and leaves the
    /// stream at the first element.
    pub fn new(mut stream: R) -> Result<Self> {
        let header = header::parse(&mut stream)?;
        Ok(Self { stream, header })
    }

    pub fn header(&self) -> &MatHeader {
        &self.header
    }

    pub fn endian(&self) -> Endian {
        self.header.endian
    }

    /// Returns the lazy sequence of top-level payloads.
    ///
    /// Compressed blocks are replaced by the payloads they contain. Each call
    /// starts again from the first element.
    pub fn produce(&mut self) -> Values<'_, R> {
        self.elements().payloads()
    }

    /// Like [`produce`](Self::produce), but yields whole elements with their tags.
    pub fn elements(&mut self) -> Elements<'_, R> {
        let endian = self.header.endian;
        Elements::new(&mut self.stream, endian)
    }

    /// Reconstructs every top-level value.
    ///
    /// A file holding a single item returns that item's value directly;
    /// otherwise the values are returned as a [`MatValue::List`] in file order.
    pub fn to_value(&mut self) -> Result<MatValue> {
        let mut values = self
            .produce()
            .map(|payload| payload.and_then(|p| p.to_value()))
            .collect::<Result<Vec<_>>>()?;

        if values.len() == 1 {
            Ok(values.remove(0))
        } else {
            Ok(MatValue::List(values))
        }
    }

    /// Reconstructs every top-level matrix together with its variable name.
    ///
    /// Top-level payloads that are not matrices are skipped.
    pub fn variables(&mut self) -> Result<Vec<(String, MatValue)>> {
        let mut variables = Vec::new();
        for payload in self.produce() {
            if let Payload::Matrix(matrix) = payload? {
                let value = matrix.to_value()?;
                variables.push((matrix.name, value));
            }
        }
        Ok(variables)
    }

    /// Consumes the reader, returning the underlying stream.
    pub fn into_inner(self) -> R {
        self.stream
    }
}
