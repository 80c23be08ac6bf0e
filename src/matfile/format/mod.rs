//! File format parsing layer for MAT-files.
//!
//! This module provides the mid-level parsing layer that bridges between
//! raw byte streams and the high-level [`MatFileReader`](crate::matfile::reader::MatFileReader).
//!
//! # Module Organization
//!
//! - [`header`]: Parses the fixed 128-byte header and detects byte order
//! - [`tag`]: Decodes regular and small-form element tags
//! - [`element`]: Decodes tagged elements and enforces 8-byte alignment
//! - [`matrix`]: Decodes matrix elements and reconstructs logical values
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  Header (128)   │ ← header::parse()
//! ├─────────────────┤
//! │  Element        │ ← element::read_element()
//! │  ┌───────────┐  │
//! │  │ Tag       │  │ ← tag::read_tag()
//! │  │ Payload   │  │ ← primitive array | matrix::read_matrix()
//! │  └───────────┘  │   | compressed block (nested elements)
//! ├─────────────────┤
//! │  Element ...    │
//! └─────────────────┘
//! ```

pub mod element;
pub mod header;
pub mod matrix;
pub mod tag;
