//! LU (Doolittle), Cholesky and QR (modified Gram-Schmidt) factorizations.

use super::direct::PIVOT_TOLERANCE;
use super::matrix::Matrix;
use crate::error::{NumericError, NumericResult};
use serde::{Deserialize, Serialize};

/// Entries of `A` and `Aᵀ` further apart than this make Cholesky refuse the input.
pub const SYMMETRY_TOLERANCE: f64 = 1e-6;
/// A Gram-Schmidt residual column shorter than this is linearly dependent.
pub const DEPENDENCE_TOLERANCE: f64 = 1e-10;

/// Factorization plus the product that reproduces the input, for self-checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decomposition {
    Lu {
        l: Matrix,
        u: Matrix,
        verification: Matrix,
    },
    Cholesky {
        l: Matrix,
        verification: Matrix,
    },
    Qr {
        q: Matrix,
        r: Matrix,
        dependent_columns: Vec<usize>,
        verification: Matrix,
    },
}

impl Decomposition {
    pub fn verification(&self) -> &Matrix {
        match self {
            Decomposition::Lu { verification, .. }
            | Decomposition::Cholesky { verification, .. }
            | Decomposition::Qr { verification, .. } => verification,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LuFactors {
    pub l: Matrix,
    pub u: Matrix,
}

impl LuFactors {
    pub fn product(&self) -> Matrix {
        factor_product(&self.l, &self.u)
    }

    /// Solves `L·U·x = b` by forward then back substitution.
    pub fn solve(&self, b: &[f64]) -> NumericResult<Vec<f64>> {
        self.l.ensure_rhs(b)?;
        let y = forward_substitute(&self.l, b);
        Ok(back_substitute(&self.u, &y))
    }
}

impl From<LuFactors> for Decomposition {
    fn from(factors: LuFactors) -> Self {
        let verification = factors.product();
        Decomposition::Lu {
            l: factors.l,
            u: factors.u,
            verification,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CholeskyFactor {
    pub l: Matrix,
}

impl CholeskyFactor {
    pub fn product(&self) -> Matrix {
        factor_product(&self.l, &self.l.transpose())
    }

    /// Solves `L·Lᵀ·x = b`.
    pub fn solve(&self, b: &[f64]) -> NumericResult<Vec<f64>> {
        self.l.ensure_rhs(b)?;
        let y = forward_substitute(&self.l, b);
        Ok(back_substitute(&self.l.transpose(), &y))
    }
}

impl From<CholeskyFactor> for Decomposition {
    fn from(factor: CholeskyFactor) -> Self {
        let verification = factor.product();
        Decomposition::Cholesky {
            l: factor.l,
            verification,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QrFactors {
    pub q: Matrix,
    pub r: Matrix,
    /// Columns found linearly dependent on earlier ones; `Q` is zero there.
    pub dependent_columns: Vec<usize>,
}

impl QrFactors {
    pub fn product(&self) -> Matrix {
        factor_product(&self.q, &self.r)
    }

    pub fn is_full_rank(&self) -> bool {
        self.dependent_columns.is_empty()
    }
}

impl From<QrFactors> for Decomposition {
    fn from(factors: QrFactors) -> Self {
        let verification = factors.product();
        Decomposition::Qr {
            q: factors.q,
            r: factors.r,
            dependent_columns: factors.dependent_columns,
            verification,
        }
    }
}

// Factors produced here are conformable by construction; `Q` of a tall input is m×n.
fn factor_product(a: &Matrix, b: &Matrix) -> Matrix {
    let mut out = Matrix::zeros(a.rows(), b.cols());
    for i in 0..a.rows() {
        for j in 0..b.cols() {
            out[(i, j)] = (0..a.cols()).map(|k| a[(i, k)] * b[(k, j)]).sum();
        }
    }
    out
}

fn forward_substitute(l: &Matrix, b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let mut y = vec![0.0; n];
    for i in 0..n {
        let head: f64 = (0..i).map(|k| l[(i, k)] * y[k]).sum();
        y[i] = (b[i] - head) / l[(i, i)];
    }
    y
}

fn back_substitute(u: &Matrix, y: &[f64]) -> Vec<f64> {
    let n = y.len();
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = (i + 1..n).map(|k| u[(i, k)] * x[k]).sum();
        x[i] = (y[i] - tail) / u[(i, i)];
    }
    x
}

/// Doolittle LU without pivoting: `L` has a unit diagonal.
///
/// Row `i` of `U` is built first, then column `i` of `L`, each from entries
/// already computed. A zero pivot in `U` is fatal.
pub fn lu(a: &Matrix) -> NumericResult<LuFactors> {
    a.ensure_square("LU decomposition")?;
    let n = a.rows();
    let mut l = Matrix::identity(n);
    let mut u = Matrix::zeros(n, n);

    for i in 0..n {
        for k in i..n {
            let sum: f64 = (0..i).map(|j| l[(i, j)] * u[(j, k)]).sum();
            u[(i, k)] = a[(i, k)] - sum;
        }
        if u[(i, i)].abs() < PIVOT_TOLERANCE {
            return Err(NumericError::SingularMatrix { column: i });
        }
        for k in i + 1..n {
            let sum: f64 = (0..i).map(|j| l[(k, j)] * u[(j, i)]).sum();
            l[(k, i)] = (a[(k, i)] - sum) / u[(i, i)];
        }
    }

    Ok(LuFactors { l, u })
}

/// Cholesky factor `L` with `A = L·Lᵀ`.
pub fn cholesky(a: &Matrix) -> NumericResult<CholeskyFactor> {
    a.ensure_square("Cholesky decomposition")?;
    let n = a.rows();
    for i in 0..n {
        for j in i + 1..n {
            if (a[(i, j)] - a[(j, i)]).abs() > SYMMETRY_TOLERANCE {
                return Err(NumericError::NotPositiveDefinite(format!(
                    "matrix is not symmetric (entries ({i}, {j}) and ({j}, {i}) differ)."
                )));
            }
        }
    }

    let mut l = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[(i, k)] * l[(j, k)]).sum();
            if i == j {
                let residual = a[(i, i)] - sum;
                if residual <= 0.0 {
                    return Err(NumericError::NotPositiveDefinite(format!(
                        "diagonal residual {residual} at row {i} is not positive."
                    )));
                }
                l[(i, i)] = residual.sqrt();
            } else {
                l[(i, j)] = (a[(i, j)] - sum) / l[(j, j)];
            }
        }
    }

    Ok(CholeskyFactor { l })
}

/// Thin QR of an m×n matrix (m ≥ n) by modified Gram-Schmidt: `Q` is m×n
/// with orthonormal columns and `R` is n×n upper triangular.
///
/// A column whose residual norm falls below [`DEPENDENCE_TOLERANCE`] is
/// reported in `dependent_columns`; its `Q` column is zero and `R[j][j] = 0`.
pub fn qr(a: &Matrix) -> NumericResult<QrFactors> {
    let (m, n) = (a.rows(), a.cols());
    if n > m {
        return Err(NumericError::DimensionMismatch(format!(
            "QR decomposition needs at least as many rows as columns, got a {m}x{n} matrix."
        )));
    }
    let mut q = Matrix::zeros(m, n);
    let mut r = Matrix::zeros(n, n);
    let mut dependent_columns = Vec::new();

    for j in 0..n {
        let mut v: Vec<f64> = (0..m).map(|i| a[(i, j)]).collect();
        for k in 0..j {
            let projection: f64 = (0..m).map(|i| q[(i, k)] * v[i]).sum();
            r[(k, j)] = projection;
            for (i, vi) in v.iter_mut().enumerate() {
                *vi -= projection * q[(i, k)];
            }
        }

        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm < DEPENDENCE_TOLERANCE {
            log::debug!("QR: column {j} is linearly dependent (residual norm {norm:e})");
            dependent_columns.push(j);
            continue;
        }
        r[(j, j)] = norm;
        for (i, vi) in v.iter().enumerate() {
            q[(i, j)] = vi / norm;
        }
    }

    Ok(QrFactors {
        q,
        r,
        dependent_columns,
    })
}
