//! # matfile-reader
//!
//! A reader for MATLAB level 5 MAT-files.
//! Supports numeric dense, sparse, complex and cell arrays, in either byte
//! order, with or without zlib-compressed elements.
//!
//! **Note:** Structs, objects and character arrays are rejected with
//! [`MatError::UnsupportedClass`]. Writing files is not supported.
pub mod matfile;

// Re-export the main types for convenience
pub use matfile::{
    load_mat,
    MatError,
    MatFileReader,
    Result,
    codec::compression::CompressedBlock,
    types::{
        models::{ArrayFlags, DataType, Endian, MatHeader, MatlabClass, Tag},
        value::{Element, MatValue, Matrix, MatrixContent, MatrixData, NumericArray, Payload, SparseMatrix},
    },
};
pub use num_complex::Complex64;
