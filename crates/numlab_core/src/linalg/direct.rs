//! Direct elimination: Gaussian elimination, Gauss-Jordan, inverse and determinant.

use super::matrix::Matrix;
use crate::error::{NumericError, NumericResult};
use serde::{Deserialize, Serialize};

/// A pivot smaller than this, relative to the largest entry of its column in
/// the input matrix, is treated as zero by the solvers.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSolution {
    pub solution: Vec<f64>,
    /// The augmented matrix `[A | b]` after elimination: upper triangular for
    /// Gaussian elimination, reduced row-echelon form for Gauss-Jordan.
    pub reduced: Matrix,
    pub row_swaps: usize,
}

fn augment(a: &Matrix, b: &Matrix) -> Matrix {
    let mut out = Matrix::zeros(a.rows(), a.cols() + b.cols());
    for i in 0..a.rows() {
        for j in 0..a.cols() {
            out[(i, j)] = a[(i, j)];
        }
        for j in 0..b.cols() {
            out[(i, a.cols() + j)] = b[(i, j)];
        }
    }
    out
}

fn column(b: &[f64]) -> Matrix {
    let mut out = Matrix::zeros(b.len(), 1);
    for (i, v) in b.iter().enumerate() {
        out[(i, 0)] = *v;
    }
    out
}

/// Row index of the largest-magnitude entry in column `k` at or below row `k`.
fn pivot_row(m: &Matrix, k: usize) -> usize {
    let mut best = k;
    for i in k + 1..m.rows() {
        if m[(i, k)].abs() > m[(best, k)].abs() {
            best = i;
        }
    }
    best
}

/// Largest magnitude in each column of `a`.
fn column_scales(a: &Matrix) -> Vec<f64> {
    (0..a.cols())
        .map(|j| (0..a.rows()).fold(0.0_f64, |acc, i| acc.max(a[(i, j)].abs())))
        .collect()
}

/// `scale` of zero leaves only an exact zero pivot singular.
fn negligible(pivot: f64, scale: f64) -> bool {
    pivot == 0.0 || pivot.abs() < PIVOT_TOLERANCE * scale
}

/// Forward elimination with partial pivoting over the first `n` columns.
/// Returns the number of row swaps.
fn forward_eliminate(work: &mut Matrix, n: usize, scales: &[f64]) -> NumericResult<usize> {
    let mut swaps = 0;
    for k in 0..n {
        let p = pivot_row(work, k);
        if negligible(work[(p, k)], scales[k]) {
            return Err(NumericError::SingularMatrix { column: k });
        }
        if p != k {
            work.swap_rows(p, k);
            swaps += 1;
        }
        for i in k + 1..n {
            let factor = work[(i, k)] / work[(k, k)];
            if factor == 0.0 {
                continue;
            }
            for j in k..work.cols() {
                work[(i, j)] -= factor * work[(k, j)];
            }
            work[(i, k)] = 0.0;
        }
    }
    Ok(swaps)
}

/// Solves `A·x = b` by Gaussian elimination with partial pivoting and back substitution.
pub fn gaussian_elimination(a: &Matrix, b: &[f64]) -> NumericResult<LinearSolution> {
    a.ensure_square("Gaussian elimination")?;
    a.ensure_rhs(b)?;
    let n = a.rows();
    let mut work = augment(a, &column(b));
    let row_swaps = forward_eliminate(&mut work, n, &column_scales(a))?;

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = (i + 1..n).map(|j| work[(i, j)] * x[j]).sum();
        x[i] = (work[(i, n)] - tail) / work[(i, i)];
    }

    Ok(LinearSolution {
        solution: x,
        reduced: work,
        row_swaps,
    })
}

/// Reduces `[A | B]` to `[I | A⁻¹B]` in place and returns the swap count.
fn gauss_jordan_reduce(work: &mut Matrix, n: usize, scales: &[f64]) -> NumericResult<usize> {
    let mut swaps = 0;
    for k in 0..n {
        let p = pivot_row(work, k);
        if negligible(work[(p, k)], scales[k]) {
            return Err(NumericError::SingularMatrix { column: k });
        }
        if p != k {
            work.swap_rows(p, k);
            swaps += 1;
        }

        let pivot = work[(k, k)];
        for j in 0..work.cols() {
            work[(k, j)] /= pivot;
        }

        for i in 0..n {
            if i == k {
                continue;
            }
            let factor = work[(i, k)];
            if factor == 0.0 {
                continue;
            }
            for j in 0..work.cols() {
                work[(i, j)] -= factor * work[(k, j)];
            }
        }
    }
    Ok(swaps)
}

/// Solves `A·x = b` by Gauss-Jordan elimination; the last column of the
/// reduced matrix is the solution.
pub fn gauss_jordan(a: &Matrix, b: &[f64]) -> NumericResult<LinearSolution> {
    a.ensure_square("Gauss-Jordan elimination")?;
    a.ensure_rhs(b)?;
    let n = a.rows();
    let mut work = augment(a, &column(b));
    let row_swaps = gauss_jordan_reduce(&mut work, n, &column_scales(a))?;
    let solution = (0..n).map(|i| work[(i, n)]).collect();

    Ok(LinearSolution {
        solution,
        reduced: work,
        row_swaps,
    })
}

/// Inverse via Gauss-Jordan on `[A | I]`.
pub fn inverse(a: &Matrix) -> NumericResult<Matrix> {
    a.ensure_square("Matrix inversion")?;
    let n = a.rows();
    let mut work = augment(a, &Matrix::identity(n));
    gauss_jordan_reduce(&mut work, n, &column_scales(a))?;

    let mut inv = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            inv[(i, j)] = work[(i, n + j)];
        }
    }
    Ok(inv)
}

/// Signed product of the pivots of Gaussian elimination with partial pivoting.
/// Only an exactly zero pivot makes the determinant zero; tiny pivots are kept
/// so badly scaled matrices keep their magnitude.
pub fn determinant(a: &Matrix) -> NumericResult<f64> {
    a.ensure_square("Determinant")?;
    let n = a.rows();
    let mut work = a.clone();
    match forward_eliminate(&mut work, n, &vec![0.0; n]) {
        Ok(swaps) => {
            let sign = if swaps % 2 == 0 { 1.0 } else { -1.0 };
            Ok(sign * (0..n).map(|i| work[(i, i)]).product::<f64>())
        }
        Err(NumericError::SingularMatrix { .. }) => Ok(0.0),
        Err(other) => Err(other),
    }
}
