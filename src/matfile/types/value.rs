//! Decoded element payloads and the logical values reconstructed from them.
//!
//! Decoding produces a raw tree ([`Element`] / [`Payload`] / [`MatrixData`])
//! that mirrors the file. Reconstruction turns that tree into [`MatValue`]s.
//! The two are kept apart so a file whose matrices cannot be reconstructed
//! (e.g. more than two dimensions) can still be inspected.

use std::collections::BTreeMap;
use std::fmt;

use num_complex::Complex64;

use super::error::{MatError, Result};
use super::models::{ArrayFlags, MatlabClass, Tag};
use crate::matfile::codec::compression::CompressedBlock;

/// A primitive array read from one element, typed by the element's tag.
///
/// A single value is stored as an array of length one.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericArray {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Single(Vec<f32>),
    Double(Vec<f64>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Utf8(Vec<u8>),
    Utf16(Vec<u16>),
    Utf32(Vec<u32>),
}

macro_rules! for_each_array {
    ($array:expr, $values:ident => $body:expr) => {
        match $array {
            NumericArray::Int8($values) => $body,
            NumericArray::UInt8($values) => $body,
            NumericArray::Int16($values) => $body,
            NumericArray::UInt16($values) => $body,
            NumericArray::Int32($values) => $body,
            NumericArray::UInt32($values) => $body,
            NumericArray::Single($values) => $body,
            NumericArray::Double($values) => $body,
            NumericArray::Int64($values) => $body,
            NumericArray::UInt64($values) => $body,
            NumericArray::Utf8($values) => $body,
            NumericArray::Utf16($values) => $body,
            NumericArray::Utf32($values) => $body,
        }
    };
}

impl NumericArray {
    pub fn len(&self) -> usize {
        for_each_array!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the element held exactly one value.
    pub fn is_scalar(&self) -> bool {
        self.len() == 1
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int8(_) => "int8",
            Self::UInt8(_) => "uint8",
            Self::Int16(_) => "int16",
            Self::UInt16(_) => "uint16",
            Self::Int32(_) => "int32",
            Self::UInt32(_) => "uint32",
            Self::Single(_) => "single",
            Self::Double(_) => "double",
            Self::Int64(_) => "int64",
            Self::UInt64(_) => "uint64",
            Self::Utf8(_) => "utf8",
            Self::Utf16(_) => "utf16",
            Self::Utf32(_) => "utf32",
        }
    }

    /// Widens every value to `f64`. 64-bit integers beyond 2^53 lose precision.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        for_each_array!(self, values => values.iter().map(|&v| v as f64).collect())
    }

    /// Interprets the values as non-negative integer indices or sizes.
    ///
    /// `what` names the field for the error message.
    pub fn to_indices(&self, what: &str) -> Result<Vec<usize>> {
        match self {
            Self::Int8(v) => integer_indices(v, what),
            Self::UInt8(v) | Self::Utf8(v) => integer_indices(v, what),
            Self::Int16(v) => integer_indices(v, what),
            Self::UInt16(v) | Self::Utf16(v) => integer_indices(v, what),
            Self::Int32(v) => integer_indices(v, what),
            Self::UInt32(v) | Self::Utf32(v) => integer_indices(v, what),
            Self::Int64(v) => integer_indices(v, what),
            Self::UInt64(v) => integer_indices(v, what),
            Self::Single(v) => float_indices(v.iter().map(|&x| x as f64), what),
            Self::Double(v) => float_indices(v.iter().copied(), what),
        }
    }

    /// Decodes the values as text.
    ///
    /// UTF-8 and UTF-16 units are decoded as such; any other integer array is
    /// treated as one code point per value.
    pub fn to_text(&self) -> Result<String> {
        match self {
            Self::Utf8(v) => Ok(String::from_utf8_lossy(v).into_owned()),
            Self::Utf16(v) => Ok(String::from_utf16_lossy(v)),
            other => other
                .to_indices("character")?
                .into_iter()
                .map(|code| {
                    u32::try_from(code)
                        .ok()
                        .and_then(char::from_u32)
                        .ok_or_else(|| MatError::InvalidFormat(format!("Invalid character code {}", code)))
                })
                .collect(),
        }
    }
}

fn integer_indices<T>(values: &[T], what: &str) -> Result<Vec<usize>>
where
    T: Copy + TryInto<usize> + fmt::Display,
{
    values
        .iter()
        .map(|&v| {
            v.try_into()
                .map_err(|_| MatError::InvalidFormat(format!("Invalid {} value: {}", what, v)))
        })
        .collect()
}

fn float_indices(values: impl Iterator<Item = f64>, what: &str) -> Result<Vec<usize>> {
    values
        .map(|v| {
            if v >= 0.0 && v.fract() == 0.0 && v <= usize::MAX as f64 {
                Ok(v as usize)
            } else {
                Err(MatError::InvalidFormat(format!("Invalid {} value: {}", what, v)))
            }
        })
        .collect()
}

/// One tag plus its decoded payload.
#[derive(Debug)]
pub struct Element {
    pub tag: Tag,
    pub payload: Payload,
}

/// The decoded body of an element.
#[derive(Debug)]
pub enum Payload {
    /// Zero-length element.
    Empty,
    Numeric(NumericArray),
    /// Still-compressed block; see [`CompressedBlock::decode_nested`].
    Compressed(CompressedBlock),
    Matrix(Box<MatrixData>),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::Numeric(_) => "numeric",
            Payload::Compressed(_) => "compressed",
            Payload::Matrix(_) => "matrix",
        }
    }

    pub fn as_matrix(&self) -> Option<&MatrixData> {
        match self {
            Payload::Matrix(matrix) => Some(matrix),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericArray> {
        match self {
            Payload::Numeric(array) => Some(array),
            _ => None,
        }
    }

    /// Reconstructs the logical value of a matrix payload.
    ///
    /// An empty payload (how empty cells are stored) becomes [`MatValue::Empty`].
    pub fn to_value(&self) -> Result<MatValue> {
        match self {
            Payload::Empty => Ok(MatValue::Empty),
            Payload::Matrix(matrix) => matrix.to_value(),
            other => Err(MatError::InvalidFormat(format!(
                "A {} element does not hold a matrix",
                other.kind()
            ))),
        }
    }
}

/// Raw, unreconstructed contents of a matrix element.
#[derive(Debug)]
pub struct MatrixData {
    pub class: MatlabClass,
    pub flags: ArrayFlags,
    /// Maximum non-zero count; meaningful for sparse matrices only.
    pub nonzero_max: u32,
    /// Any rank is accepted here; reconstruction rejects more than two.
    pub dimensions: Vec<usize>,
    pub name: String,
    pub content: MatrixContent,
}

/// Class-dependent part of a matrix element.
#[derive(Debug)]
pub enum MatrixContent {
    Dense {
        real: NumericArray,
        imaginary: Option<NumericArray>,
    },
    /// Compressed sparse column storage.
    Sparse {
        row_index: Vec<usize>,
        column_index: Vec<usize>,
        real: NumericArray,
        imaginary: Option<NumericArray>,
    },
    /// Cell contents in column-major order, kept as raw elements.
    Cell(Vec<Element>),
}

/// A reconstructed, language-native value.
#[derive(Debug, Clone, PartialEq)]
pub enum MatValue {
    Empty,
    Dense(Matrix<f64>),
    ComplexDense(Matrix<Complex64>),
    Sparse(SparseMatrix<f64>),
    ComplexSparse(SparseMatrix<Complex64>),
    /// A cell array, or the sequence of top-level values of a file.
    List(Vec<MatValue>),
}

impl MatValue {
    /// `(rows, cols)` for matrix values.
    pub fn shape(&self) -> Option<(usize, usize)> {
        match self {
            MatValue::Empty => Some((0, 0)),
            MatValue::Dense(m) => Some((m.rows(), m.cols())),
            MatValue::ComplexDense(m) => Some((m.rows(), m.cols())),
            MatValue::Sparse(m) => Some((m.rows(), m.cols())),
            MatValue::ComplexSparse(m) => Some((m.rows(), m.cols())),
            MatValue::List(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MatValue::Empty => "empty",
            MatValue::Dense(_) => "dense",
            MatValue::ComplexDense(_) => "complex dense",
            MatValue::Sparse(_) => "sparse",
            MatValue::ComplexSparse(_) => "complex sparse",
            MatValue::List(_) => "list",
        }
    }
}

/// Dense two-dimensional matrix stored in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy> Matrix<T> {
    /// Wraps column-major data. Fails if `data.len() != rows * cols`.
    pub fn from_column_major(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            MatError::InvalidFormat(format!("Matrix size {}x{} overflows", rows, cols))
        })?;
        if data.len() != expected {
            return Err(MatError::CountMismatch {
                item_type: "matrix elements",
                expected: expected as u64,
                found: data.len() as u64,
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(self.rows * col + row).copied()
    }

    pub fn row(&self, row: usize) -> Option<Vec<T>> {
        (row < self.rows).then(|| (0..self.cols).map(|c| self.data[self.rows * c + row]).collect())
    }

    pub fn column_major(&self) -> &[T] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        (0..self.rows).filter_map(|r| self.row(r)).collect()
    }
}

/// Sparse two-dimensional matrix keyed by `(row, col)`.
///
/// Positions without an entry hold the additive identity (`T::default()`).
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix<T> {
    rows: usize,
    cols: usize,
    entries: BTreeMap<(usize, usize), T>,
}

impl<T: Copy + Default> SparseMatrix<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: BTreeMap::new(),
        }
    }

    /// Stores `value` at `(row, col)`. Fails if the position is out of range.
    pub fn insert(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(MatError::InvalidFormat(format!(
                "Sparse entry ({}, {}) is outside a {}x{} matrix",
                row, col, self.rows, self.cols
            )));
        }
        self.entries.insert((row, col), value);
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `None` only when `(row, col)` is out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.entries.get(&(row, col)).copied().unwrap_or_default())
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Stored entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.entries.iter().map(|(&(r, c), &v)| (r, c, v))
    }

    /// Expands to a dense matrix, filling absent positions with `T::default()`.
    pub fn to_dense(&self) -> Result<Matrix<T>> {
        let len = self.rows.checked_mul(self.cols).ok_or_else(|| {
            MatError::InvalidFormat(format!("Matrix size {}x{} overflows", self.rows, self.cols))
        })?;
        let mut data = vec![T::default(); len];
        for (&(r, c), &v) in &self.entries {
            data[self.rows * c + r] = v;
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }
}
