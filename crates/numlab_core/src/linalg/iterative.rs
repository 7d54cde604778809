//! Jacobi and Gauss-Seidel iteration for `A·x = b`.
//!
//! Neither method needs diagonal dominance to run. When the matrix is not
//! dominant the solve still proceeds and a [`SolverWarning`] is attached.

use super::matrix::{residual_norm, Matrix};
use crate::convergence::{
    percent, relative_change, ConvergenceResult, IterationRecorder, IterationSettings,
};
use crate::error::{NumericError, NumericResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum SolverWarning {
    /// Rows where `Σ_{j≠i}|A[i][j]| > |A[i][i]|`; convergence is not guaranteed.
    NotDiagonallyDominant { rows: Vec<usize> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterativeSolution {
    pub result: ConvergenceResult<Vec<f64>>,
    #[serde(default)]
    pub warnings: Vec<SolverWarning>,
}

/// Rows that break diagonal dominance. Empty means the matrix is dominant.
pub fn dominance_violations(a: &Matrix) -> Vec<usize> {
    (0..a.rows())
        .filter(|&i| {
            let off_diagonal: f64 = (0..a.cols())
                .filter(|&j| j != i)
                .map(|j| a[(i, j)].abs())
                .sum();
            i >= a.cols() || off_diagonal > a[(i, i)].abs()
        })
        .collect()
}

pub fn is_diagonally_dominant(a: &Matrix) -> bool {
    dominance_violations(a).is_empty()
}

#[derive(Clone, Copy, PartialEq)]
enum Sweep {
    Jacobi,
    GaussSeidel,
}

impl Sweep {
    fn name(self) -> &'static str {
        match self {
            Sweep::Jacobi => "Jacobi",
            Sweep::GaussSeidel => "Gauss-Seidel",
        }
    }
}

/// Jacobi iteration from `x = 0`. Each sweep reads only the previous sweep's vector.
pub fn jacobi(
    a: &Matrix,
    b: &[f64],
    settings: &IterationSettings,
) -> NumericResult<IterativeSolution> {
    iterate(a, b, settings, Sweep::Jacobi)
}

/// Gauss-Seidel iteration from `x = 0`. Components updated earlier in a sweep
/// are used immediately.
pub fn gauss_seidel(
    a: &Matrix,
    b: &[f64],
    settings: &IterationSettings,
) -> NumericResult<IterativeSolution> {
    iterate(a, b, settings, Sweep::GaussSeidel)
}

fn iterate(
    a: &Matrix,
    b: &[f64],
    settings: &IterationSettings,
    sweep: Sweep,
) -> NumericResult<IterativeSolution> {
    settings.validate()?;
    a.ensure_square(sweep.name())?;
    a.ensure_rhs(b)?;
    let n = a.rows();
    if let Some(i) = (0..n).find(|&i| a[(i, i)] == 0.0) {
        return Err(NumericError::SingularMatrix { column: i });
    }

    let mut warnings = Vec::new();
    let violations = dominance_violations(a);
    if !violations.is_empty() {
        log::warn!(
            "{}: matrix is not diagonally dominant in rows {violations:?}; convergence is not guaranteed",
            sweep.name()
        );
        warnings.push(SolverWarning::NotDiagonallyDominant { rows: violations });
    }

    let mut recorder = IterationRecorder::new();
    let mut x = vec![0.0; n];

    for _ in 0..settings.max_iterations {
        let previous = x.clone();
        for i in 0..n {
            let source = match sweep {
                Sweep::Jacobi => &previous,
                Sweep::GaussSeidel => &x,
            };
            let off_diagonal: f64 = (0..n)
                .filter(|&j| j != i)
                .map(|j| a[(i, j)] * source[j])
                .sum();
            let next = (b[i] - off_diagonal) / a[(i, i)];
            x[i] = next;
        }

        if x.iter().any(|v| !v.is_finite()) {
            let result = recorder.failed(format!("{} iteration diverged.", sweep.name()));
            return Ok(IterativeSolution { result, warnings });
        }

        let change = max_relative_change(&x, &previous);
        let residual = residual_norm(a, &x, b)?;
        recorder.record(x.clone(), residual, Some(percent(change)));

        if change < settings.tolerance {
            return Ok(IterativeSolution {
                result: recorder.converged(x),
                warnings,
            });
        }
    }

    Ok(IterativeSolution {
        result: recorder.exhausted(x),
        warnings,
    })
}

/// Largest per-component relative change; components that land on zero
/// contribute their absolute change.
fn max_relative_change(current: &[f64], previous: &[f64]) -> f64 {
    current
        .iter()
        .zip(previous)
        .map(|(&new, &old)| relative_change(new, old))
        .fold(0.0, f64::max)
}
