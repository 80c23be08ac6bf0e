//! # Matrix Decoding & Reconstruction
//!
//! A `miMATRIX` payload is itself a sequence of sub-elements:
//!
//! ```text
//! ┌──────────────────────┐
//! │ Array flags          │ ← class (bits 0-3), logical/global/complex (bits 8-10), nzmax
//! ├──────────────────────┤
//! │ Dimensions           │
//! ├──────────────────────┤
//! │ Array name           │
//! ├──────────────────────┤
//! │ Class payload        │ ← dense: real [, imaginary]
//! │                      │   sparse: row index, column index, real [, imaginary]
//! │                      │   cell: one matrix element per cell
//! └──────────────────────┘
//! ```
//!
//! Decoding keeps the raw arrays and accepts any rank. Conversion into a
//! [`MatValue`] is a separate step that rejects more than two dimensions.

use std::io::Read;
use log::{debug, warn};
use num_complex::Complex64;

use super::element::read_element;
use crate::matfile::types::error::{MatError, Result};
use crate::matfile::types::models::{ArrayFlags, Endian, MatlabClass};
use crate::matfile::types::value::{
    MatValue, Matrix, MatrixContent, MatrixData, NumericArray, Payload, SparseMatrix,
};
use crate::matfile::utils::Source;

/// Reads the sub-elements of a matrix payload.
///
/// # Errors
/// - `UnsupportedClass` for struct, object, char and unknown classes
/// - Any error from the nested element reads
pub fn read_matrix<R: Read>(source: &mut Source<R>, endian: Endian) -> Result<MatrixData> {
    // Step 1: Array flags
    let words = read_array(source, endian, "array flags")?.to_indices("array flags")?;
    let [flags_word, nonzero_max] = words[..] else {
        return Err(MatError::CountMismatch {
            item_type: "array flags words",
            expected: 2,
            found: words.len() as u64,
        });
    };
    let flags_word = to_u32(flags_word, "array flags")?;
    let nonzero_max = to_u32(nonzero_max, "nonzero max")?;

    let class_code = (flags_word & 0xF) as u8;
    let class = MatlabClass::from_code(class_code);
    if let MatlabClass::Unsupported(code) = class {
        return Err(MatError::UnsupportedClass { code });
    }
    let flags = ArrayFlags::from_word(flags_word);

    // Step 2: Dimensions
    let dimensions = read_array(source, endian, "dimensions")?.to_indices("dimension")?;

    // Step 3: Name; a short name may arrive as a single small-form value
    let name = read_array(source, endian, "array name")?.to_text()?;

    debug!(
        "Matrix '{}': class={}, dimensions={:?}, flags={:?}, nzmax={}",
        name,
        class.name(),
        dimensions,
        flags,
        nonzero_max
    );

    // Step 4: Class payload
    let content = match class {
        MatlabClass::Cell => {
            let count = element_count(&dimensions)?;
            match non_trivial_axes(&dimensions) {
                axes if axes > 2 => warn!(
                    "Cell array '{}' is {:?} with {} non-trivial axes; it can be inspected but not reconstructed",
                    name, dimensions, axes
                ),
                2 => warn!("Cell array '{}' is {:?}; cells are flattened in column-major order", name, dimensions),
                _ => {}
            }
            let cells = (0..count)
                .map(|_| read_element(source, endian))
                .collect::<Result<Vec<_>>>()?;
            MatrixContent::Cell(cells)
        }
        MatlabClass::Sparse => {
            let row_index = read_array(source, endian, "row index")?.to_indices("row index")?;
            let column_index = read_array(source, endian, "column index")?.to_indices("column index")?;
            let real = read_array(source, endian, "real part")?;
            let imaginary = read_imaginary(source, endian, flags)?;
            MatrixContent::Sparse {
                row_index,
                column_index,
                real,
                imaginary,
            }
        }
        _ => {
            let real = read_array(source, endian, "real part")?;
            let imaginary = read_imaginary(source, endian, flags)?;
            MatrixContent::Dense { real, imaginary }
        }
    };

    Ok(MatrixData {
        class,
        flags,
        nonzero_max,
        dimensions,
        name,
        content,
    })
}

/// Reads one element that must hold primitive data. An empty element yields an empty array.
fn read_array<R: Read>(source: &mut Source<R>, endian: Endian, field: &str) -> Result<NumericArray> {
    let element = read_element(source, endian)?;
    match element.payload {
        Payload::Numeric(array) => Ok(array),
        Payload::Empty => Ok(NumericArray::Double(Vec::new())),
        other => Err(MatError::InvalidFormat(format!(
            "Expected numeric data for {}, found a {} element {}",
            field,
            other.kind(),
            element.tag
        ))),
    }
}

fn read_imaginary<R: Read>(source: &mut Source<R>, endian: Endian, flags: ArrayFlags) -> Result<Option<NumericArray>> {
    if flags.complex {
        read_array(source, endian, "imaginary part").map(Some)
    } else {
        Ok(None)
    }
}

fn to_u32(value: usize, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| MatError::InvalidFormat(format!("{} value {} exceeds 32 bits", field, value)))
}

/// Axes longer than one. Singleton axes do not change the layout of the cells.
fn non_trivial_axes(dimensions: &[usize]) -> usize {
    dimensions.iter().filter(|&&d| d > 1).count()
}

fn element_count(dimensions: &[usize]) -> Result<usize> {
    dimensions.iter().try_fold(1usize, |acc, &d| {
        acc.checked_mul(d)
            .ok_or_else(|| MatError::InvalidFormat(format!("Dimensions {:?} overflow", dimensions)))
    })
}

impl MatrixData {
    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    /// `(rows, cols)`, treating missing trailing dimensions as 1 (or 0 when none are given).
    fn shape(&self) -> (usize, usize) {
        match self.dimensions[..] {
            [] => (0, 0),
            [rows] => (rows, 1),
            [rows, cols, ..] => (rows, cols),
        }
    }

    /// Converts the raw arrays into a logical value.
    ///
    /// Cells are reconstructed recursively. Dense data is read column-major.
    /// Sparse data is expanded from compressed sparse column form.
    ///
    /// # Errors
    /// - `UnsupportedRank` if there are more than two dimensions
    /// - `CountMismatch` / `InvalidFormat` if the arrays disagree with the dimensions
    pub fn to_value(&self) -> Result<MatValue> {
        if self.rank() > 2 {
            return Err(MatError::UnsupportedRank { rank: self.rank() });
        }
        let (rows, cols) = self.shape();

        match &self.content {
            MatrixContent::Cell(cells) => cells
                .iter()
                .map(|cell| cell.payload.to_value())
                .collect::<Result<Vec<_>>>()
                .map(MatValue::List),
            MatrixContent::Dense { real, imaginary } => {
                let real = real.to_f64_vec();
                match imaginary {
                    Some(imaginary) => {
                        let values = pair_complex(real, imaginary.to_f64_vec())?;
                        Ok(MatValue::ComplexDense(Matrix::from_column_major(rows, cols, values)?))
                    }
                    None => Ok(MatValue::Dense(Matrix::from_column_major(rows, cols, real)?)),
                }
            }
            MatrixContent::Sparse {
                row_index,
                column_index,
                real,
                imaginary,
            } => {
                let real = real.to_f64_vec();
                match imaginary {
                    Some(imaginary) => {
                        let values = pair_complex(real, imaginary.to_f64_vec())?;
                        build_sparse(rows, cols, row_index, column_index, &values).map(MatValue::ComplexSparse)
                    }
                    None => build_sparse(rows, cols, row_index, column_index, &real).map(MatValue::Sparse),
                }
            }
        }
    }
}

fn pair_complex(real: Vec<f64>, imaginary: Vec<f64>) -> Result<Vec<Complex64>> {
    if real.len() != imaginary.len() {
        return Err(MatError::CountMismatch {
            item_type: "imaginary part values",
            expected: real.len() as u64,
            found: imaginary.len() as u64,
        });
    }
    Ok(real
        .into_iter()
        .zip(imaginary)
        .map(|(re, im)| Complex64::new(re, im))
        .collect())
}

/// Expands compressed sparse column arrays.
///
/// Entries of column `j` are the positions `p` in
/// `column_index[j]..column_index[j + 1]`, with row `row_index[p]` and value `values[p]`.
fn build_sparse<T: Copy + Default>(
    rows: usize,
    cols: usize,
    row_index: &[usize],
    column_index: &[usize],
    values: &[T],
) -> Result<SparseMatrix<T>> {
    if column_index.len() != cols + 1 {
        return Err(MatError::CountMismatch {
            item_type: "sparse column index entries",
            expected: cols as u64 + 1,
            found: column_index.len() as u64,
        });
    }
    if column_index.windows(2).any(|w| w[0] > w[1]) {
        return Err(MatError::InvalidFormat(format!(
            "Sparse column index is not non-decreasing: {:?}",
            column_index
        )));
    }

    let nnz = column_index[cols];
    if row_index.len() < nnz || values.len() < nnz {
        return Err(MatError::CountMismatch {
            item_type: "sparse entries",
            expected: nnz as u64,
            found: row_index.len().min(values.len()) as u64,
        });
    }

    let mut matrix = SparseMatrix::new(rows, cols);
    for col in 0..cols {
        for p in column_index[col]..column_index[col + 1] {
            matrix.insert(row_index[p], col, values[p])?;
        }
    }
    Ok(matrix)
}
