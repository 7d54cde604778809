//! Dense linear algebra on [`Matrix`].
//!
//! Direct solvers and matrix utilities live in [`direct`], factorizations in
//! [`decomposition`], stationary iterations in [`iterative`]. Every routine
//! takes its matrix by reference and works on an owned copy.
//!
//! [`solve_linear`] is the single dispatch point over [`LinearMethod`].

pub mod decomposition;
pub mod direct;
pub mod iterative;
pub mod matrix;
pub mod tridiagonal;

pub use decomposition::{
    cholesky, lu, qr, CholeskyFactor, Decomposition, LuFactors, QrFactors, DEPENDENCE_TOLERANCE,
    SYMMETRY_TOLERANCE,
};
pub use direct::{
    determinant, gauss_jordan, gaussian_elimination, inverse, LinearSolution, PIVOT_TOLERANCE,
};
pub use iterative::{
    dominance_violations, gauss_seidel, is_diagonally_dominant, jacobi, IterativeSolution,
    SolverWarning,
};
pub use matrix::{residual_norm, Matrix};
pub use tridiagonal::solve_tridiagonal;

use crate::convergence::IterationSettings;
use crate::error::NumericResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum LinearMethod {
    GaussianElimination {
        rhs: Vec<f64>,
    },
    GaussJordan {
        rhs: Vec<f64>,
    },
    Lu,
    Cholesky,
    Qr,
    Jacobi {
        rhs: Vec<f64>,
        #[serde(default)]
        settings: IterationSettings,
    },
    GaussSeidel {
        rhs: Vec<f64>,
        #[serde(default)]
        settings: IterationSettings,
    },
    Inverse,
    Determinant,
    Transpose,
    Add {
        other: Matrix,
    },
    Subtract {
        other: Matrix,
    },
    Multiply {
        other: Matrix,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output", rename_all = "snake_case")]
pub enum LinearOutput {
    Direct { solution: LinearSolution },
    Decomposition { decomposition: Decomposition },
    Iterative { solution: IterativeSolution },
    Matrix { matrix: Matrix },
    Scalar { value: f64 },
}

pub fn solve_linear(a: &Matrix, method: &LinearMethod) -> NumericResult<LinearOutput> {
    let output = match method {
        LinearMethod::GaussianElimination { rhs } => LinearOutput::Direct {
            solution: gaussian_elimination(a, rhs)?,
        },
        LinearMethod::GaussJordan { rhs } => LinearOutput::Direct {
            solution: gauss_jordan(a, rhs)?,
        },
        LinearMethod::Lu => LinearOutput::Decomposition {
            decomposition: lu(a)?.into(),
        },
        LinearMethod::Cholesky => LinearOutput::Decomposition {
            decomposition: cholesky(a)?.into(),
        },
        LinearMethod::Qr => LinearOutput::Decomposition {
            decomposition: qr(a)?.into(),
        },
        LinearMethod::Jacobi { rhs, settings } => LinearOutput::Iterative {
            solution: jacobi(a, rhs, settings)?,
        },
        LinearMethod::GaussSeidel { rhs, settings } => LinearOutput::Iterative {
            solution: gauss_seidel(a, rhs, settings)?,
        },
        LinearMethod::Inverse => LinearOutput::Matrix {
            matrix: inverse(a)?,
        },
        LinearMethod::Determinant => LinearOutput::Scalar {
            value: determinant(a)?,
        },
        LinearMethod::Transpose => LinearOutput::Matrix {
            matrix: a.transpose(),
        },
        LinearMethod::Add { other } => LinearOutput::Matrix {
            matrix: a.add(other)?,
        },
        LinearMethod::Subtract { other } => LinearOutput::Matrix {
            matrix: a.subtract(other)?,
        },
        LinearMethod::Multiply { other } => LinearOutput::Matrix {
            matrix: a.multiply(other)?,
        },
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NumericError;

    fn spd() -> Matrix {
        Matrix::from_rows(vec![vec![4.0, 2.0], vec![2.0, 3.0]]).expect("matrix")
    }

    #[test]
    fn dispatch_routes_each_family() {
        let a = spd();
        assert!(matches!(
            solve_linear(&a, &LinearMethod::GaussianElimination { rhs: vec![6.0, 5.0] }),
            Ok(LinearOutput::Direct { .. })
        ));
        assert!(matches!(
            solve_linear(&a, &LinearMethod::Cholesky),
            Ok(LinearOutput::Decomposition {
                decomposition: Decomposition::Cholesky { .. }
            })
        ));
        match solve_linear(&a, &LinearMethod::Determinant).expect("det") {
            LinearOutput::Scalar { value } => assert!((value - 8.0).abs() < 1e-12),
            other => panic!("unexpected output {other:?}"),
        }
        match solve_linear(&a, &LinearMethod::Transpose).expect("transpose") {
            LinearOutput::Matrix { matrix } => assert_eq!(matrix, a),
            other => panic!("unexpected output {other:?}"),
        }
    }

    #[test]
    fn iterative_method_defaults_settings() {
        let method: LinearMethod =
            serde_json::from_str(r#"{"method":"gauss_seidel","rhs":[6.0,5.0]}"#)
                .expect("deserialize");
        assert_eq!(
            method,
            LinearMethod::GaussSeidel {
                rhs: vec![6.0, 5.0],
                settings: IterationSettings::default(),
            }
        );
        match solve_linear(&spd(), &method).expect("solve") {
            LinearOutput::Iterative { solution } => assert!(solution.result.is_converged()),
            other => panic!("unexpected output {other:?}"),
        }
    }

    #[test]
    fn shape_errors_propagate() {
        let other = Matrix::identity(3);
        assert!(matches!(
            solve_linear(&spd(), &LinearMethod::Add { other }),
            Err(NumericError::DimensionMismatch(_))
        ));
    }
}
