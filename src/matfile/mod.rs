//! Core MAT-file reader module

pub mod codec;
pub mod format;
pub mod iter;
pub mod reader;
pub mod types;
pub mod utils;

use std::path::Path;

pub use reader::MatFileReader;
pub use types::error::{MatError, Result};
use types::value::MatValue;

/// Opens the file at `path` and reconstructs its contents.
///
/// Shortcut for `MatFileReader::open(path)?.to_value()`.
pub fn load_mat(path: impl AsRef<Path>) -> Result<MatValue> {
    MatFileReader::open(path)?.to_value()
}
