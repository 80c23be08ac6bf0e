//! Codec layer for compressed elements.
//!
//! # Submodules
//!
//! - [`compression`][]: Zlib inflation and nested element decoding
//!   for `miCOMPRESSED` blocks

pub mod compression;
