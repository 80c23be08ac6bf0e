//! Iterators over the top-level contents of a MAT-file.
//!
//! 1. [`Elements`] - Whole elements, with compressed blocks replaced by the
//!    elements they contain
//! 2. [`Values`] - Just the payloads of those elements
//!
//! Both borrow the reader mutably. A pass starts by seeking to the first
//! element (offset 128) and, once the stream is exhausted, seeks back there
//! so the next pass starts over.
//!
//! # Example
//! ```no_run
//! # use matfile_reader::MatFileReader;
//! let mut reader = MatFileReader::open("data.mat").unwrap();
//! for payload in reader.produce() {
//!     let value = payload.and_then(|p| p.to_value()).unwrap();
//!     println!("{:?}", value.shape());
//! }
//! ```

use std::io::{Cursor, Read, Seek, SeekFrom};
use log::{debug, trace};

use super::format::element::ElementStream;
use super::format::header::HEADER_LENGTH;
use super::types::error::Result;
use super::types::models::Endian;
use super::types::value::{Element, Payload};
use super::utils::Source;

/// Iterator over top-level elements, flattening one level of compression.
///
/// Elements that come out of a compressed block carry tag offsets relative
/// to the start of the inflated block.
pub struct Elements<'a, R> {
    outer: ElementStream<&'a mut R>,
    nested: Option<ElementStream<Cursor<Vec<u8>>>>,
    endian: Endian,
    started: bool,
    finished: bool,
}

impl<'a, R: Read + Seek> Elements<'a, R> {
    pub(super) fn new(stream: &'a mut R, endian: Endian) -> Self {
        Self {
            outer: ElementStream::from_source(Source::at(stream, HEADER_LENGTH), endian),
            nested: None,
            endian,
            started: false,
            finished: false,
        }
    }

    /// Transforms this iterator to yield only element payloads.
    pub fn payloads(self) -> Values<'a, R> {
        Values { elements: self }
    }

    fn rewind(&mut self) -> Result<()> {
        let source = self.outer.source_mut();
        source.get_mut().seek(SeekFrom::Start(HEADER_LENGTH))?;
        source.set_position(HEADER_LENGTH);
        Ok(())
    }

    fn advance(&mut self) -> Option<Result<Element>> {
        if !self.started {
            self.started = true;
            if let Err(e) = self.rewind() {
                return Some(Err(e));
            }
        }

        loop {
            // Drain the current compressed block first
            if let Some(nested) = self.nested.as_mut() {
                match nested.next() {
                    Some(result) => return Some(result),
                    None => {
                        trace!("Compressed block exhausted");
                        self.nested = None;
                    }
                }
            }

            let element = match self.outer.next()? {
                Ok(element) => element,
                Err(e) => return Some(Err(e)),
            };

            match element.payload {
                Payload::Compressed(block) => {
                    debug!(
                        "Entering compressed block at offset {} ({} bytes)",
                        element.tag.offset,
                        block.raw().len()
                    );
                    match block.into_nested(self.endian) {
                        Ok(stream) => self.nested = Some(stream),
                        Err(e) => return Some(Err(e)),
                    }
                }
                payload => {
                    return Some(Ok(Element {
                        tag: element.tag,
                        payload,
                    }));
                }
            }
        }
    }
}

impl<'a, R: Read + Seek> Iterator for Elements<'a, R> {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.advance() {
            Some(Ok(element)) => Some(Ok(element)),
            Some(Err(e)) => {
                self.finished = true;
                Some(Err(e))
            }
            None => {
                self.finished = true;
                debug!("End of MAT-file reached at offset {}, rewinding", self.outer.position());
                self.rewind().err().map(Err)
            }
        }
    }
}

/// Iterator over the payloads of top-level elements.
///
/// Created by [`MatFileReader::produce`](crate::MatFileReader::produce).
pub struct Values<'a, R> {
    elements: Elements<'a, R>,
}

impl<'a, R: Read + Seek> Iterator for Values<'a, R> {
    type Item = Result<Payload>;

    fn next(&mut self) -> Option<Self::Item> {
        self.elements.next().map(|result| result.map(|element| element.payload))
    }
}
