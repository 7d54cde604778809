use crate::error::{NumericError, NumericResult};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Dense row-major matrix of reals with dimensions fixed at construction.
///
/// Every transformation returns a new value; elimination routines clone
/// their input before working in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    pub fn from_row_slice(rows: usize, cols: usize, data: &[f64]) -> NumericResult<Self> {
        if data.len() != rows * cols {
            return Err(NumericError::DimensionMismatch(format!(
                "expected {} entries for a {rows}x{cols} matrix, got {}.",
                rows * cols,
                data.len()
            )));
        }
        Ok(Self {
            rows,
            cols,
            data: data.to_vec(),
        })
    }

    /// Builds a matrix from nested rows; ragged input is rejected.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> NumericResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(NumericError::DimensionMismatch(format!(
                    "row {i} has {} entries, expected {cols}.",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t[(j, i)] = self[(i, j)];
            }
        }
        t
    }

    fn ensure_same_shape(&self, other: &Matrix, op: &str) -> NumericResult<()> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(NumericError::DimensionMismatch(format!(
                "cannot {op} a {}x{} matrix and a {}x{} matrix.",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(())
    }

    pub fn add(&self, other: &Matrix) -> NumericResult<Matrix> {
        self.ensure_same_shape(other, "add")?;
        Ok(self.zip_with(other, |a, b| a + b))
    }

    pub fn subtract(&self, other: &Matrix) -> NumericResult<Matrix> {
        self.ensure_same_shape(other, "subtract")?;
        Ok(self.zip_with(other, |a, b| a - b))
    }

    fn zip_with(&self, other: &Matrix, op: impl Fn(f64, f64) -> f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| op(a, b))
                .collect(),
        }
    }

    pub fn multiply(&self, other: &Matrix) -> NumericResult<Matrix> {
        if self.cols != other.rows {
            return Err(NumericError::DimensionMismatch(format!(
                "cannot multiply a {}x{} matrix by a {}x{} matrix.",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self[(i, k)];
                if a == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    out[(i, j)] += a * other[(k, j)];
                }
            }
        }
        Ok(out)
    }

    pub fn mul_vector(&self, v: &[f64]) -> NumericResult<Vec<f64>> {
        if self.cols != v.len() {
            return Err(NumericError::DimensionMismatch(format!(
                "cannot multiply a {}x{} matrix by a vector of length {}.",
                self.rows,
                self.cols,
                v.len()
            )));
        }
        Ok((0..self.rows)
            .map(|i| self.row(i).iter().zip(v).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// Entry-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Matrix, tolerance: f64) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    pub(crate) fn ensure_square(&self, operation: &str) -> NumericResult<()> {
        if !self.is_square() {
            return Err(NumericError::DimensionMismatch(format!(
                "{operation} needs a square matrix, got {}x{}.",
                self.rows, self.cols
            )));
        }
        if self.rows == 0 {
            return Err(NumericError::InvalidInput(format!(
                "{operation} needs a non-empty matrix."
            )));
        }
        Ok(())
    }

    pub(crate) fn ensure_rhs(&self, b: &[f64]) -> NumericResult<()> {
        if b.len() != self.rows {
            return Err(NumericError::DimensionMismatch(format!(
                "right-hand side has length {}, expected {}.",
                b.len(),
                self.rows
            )));
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = NumericError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Matrix::from_rows(rows)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(matrix: Matrix) -> Self {
        matrix.to_rows()
    }
}

impl From<&Matrix> for DMatrix<f64> {
    fn from(matrix: &Matrix) -> Self {
        DMatrix::from_row_slice(matrix.rows, matrix.cols, &matrix.data)
    }
}

impl From<&DMatrix<f64>> for Matrix {
    fn from(matrix: &DMatrix<f64>) -> Self {
        let mut out = Matrix::zeros(matrix.nrows(), matrix.ncols());
        for i in 0..matrix.nrows() {
            for j in 0..matrix.ncols() {
                out[(i, j)] = matrix[(i, j)];
            }
        }
        out
    }
}

/// Infinity norm of `A·x - b`.
pub fn residual_norm(a: &Matrix, x: &[f64], b: &[f64]) -> NumericResult<f64> {
    let ax = a.mul_vector(x)?;
    a.ensure_rhs(b)?;
    Ok(ax
        .iter()
        .zip(b)
        .map(|(l, r)| (l - r).abs())
        .fold(0.0, f64::max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[&[f64]]) -> Matrix {
        Matrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).expect("matrix")
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).expect_err("ragged");
        assert!(format!("{err}").contains("row 1 has 1 entries"));
    }

    #[test]
    fn transpose_swaps_shape() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let t = a.transpose();
        assert_eq!(t.rows(), 3);
        assert_eq!(t.cols(), 2);
        assert_eq!(t.to_rows(), vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
    }

    #[test]
    fn add_and_subtract_check_shapes() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = m(&[&[0.5, 0.5], &[0.5, 0.5]]);
        assert_eq!(a.add(&b).expect("add").row(1), &[3.5, 4.5]);
        assert_eq!(a.subtract(&b).expect("sub").row(0), &[0.5, 1.5]);
        let c = m(&[&[1.0, 2.0, 3.0]]);
        assert!(matches!(a.add(&c), Err(NumericError::DimensionMismatch(_))));
    }

    #[test]
    fn multiply_matches_hand_computation() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
        let b = m(&[&[7.0, 8.0, 9.0], &[10.0, 11.0, 12.0]]);
        let c = a.multiply(&b).expect("multiply");
        assert_eq!(c.to_rows()[0], vec![27.0, 30.0, 33.0]);
        assert_eq!(c.to_rows()[2], vec![95.0, 106.0, 117.0]);
        assert!(matches!(a.multiply(&a), Err(NumericError::DimensionMismatch(_))));
    }

    #[test]
    fn nalgebra_round_trip_preserves_layout() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let d = DMatrix::from(&a);
        assert_eq!(d[(1, 0)], 4.0);
        assert_eq!(Matrix::from(&d), a);
    }

    #[test]
    fn swap_rows_and_residual() {
        let mut a = m(&[&[2.0, 0.0], &[0.0, 3.0]]);
        a.swap_rows(0, 1);
        assert_eq!(a.row(0), &[0.0, 3.0]);
        let r = residual_norm(&a, &[1.0, 1.0], &[3.0, 1.0]).expect("residual");
        assert_eq!(r, 1.0);
    }
}
