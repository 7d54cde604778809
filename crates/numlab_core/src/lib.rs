//! The `numlab_core` crate is the numerical-methods engine behind the numlab
//! front end. It is pure and synchronous: every operation takes its inputs
//! by reference and returns a fresh result, so the same request always gives
//! the same answer.
//!
//! Key components:
//! - **Roots**: bracketing (bisection, false position), open (Newton-Raphson,
//!   secant, fixed point) and Muller's method, plus an interval scan.
//! - **Linalg**: a small dense `Matrix`, direct solvers, LU / Cholesky / QR
//!   decompositions, Jacobi and Gauss-Seidel, and a tridiagonal solver.
//! - **Interpolation**: Lagrange, Newton divided differences, splines and the
//!   evenly spaced finite-difference formulas.
//! - **Calculus**: trapezoidal and Simpson quadrature, finite-difference
//!   derivatives.
//! - **ODE**: Euler and RK4 for scalar initial value problems.
//! - **Problem**: the serde-facing request/response layer and [`solve`].
//!
//! The engine never parses expressions. Hosts provide an
//! [`ExpressionEvaluator`] and the engine only calls the compiled functions
//! it hands back.
pub mod calculus;
pub mod convergence;
pub mod error;
pub mod interpolation;
pub mod linalg;
pub mod ode;
pub mod problem;
pub mod roots;
pub mod traits;

pub use convergence::{ConvergenceResult, IterationRecord, IterationSettings};
pub use error::{EvaluationError, NumericError, NumericResult};
pub use linalg::Matrix;
pub use problem::{solve, Problem, Solution};
pub use traits::{CompiledFunction, ExpressionEvaluator, Value};
