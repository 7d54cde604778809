//! Root finding for scalar equations `f(x) = 0`.
//!
//! - [`bracketing`]: bisection, false position and the interval scan.
//! - [`open`]: Newton-Raphson, secant and fixed-point iteration.
//! - [`muller`]: Muller's method in complex arithmetic.
//!
//! [`find_root`] is the single dispatch point over [`RootMethod`].

pub mod bracketing;
pub mod muller;
pub mod open;

pub use bracketing::{
    bisection, false_position, incremental_search, Bracket, BracketScanner, MAX_BRACKETS,
    MAX_SCAN_STEPS,
};
pub use muller::muller;
pub use open::{
    fixed_point, newton_raphson, newton_raphson_with_derivative, secant, DERIVATIVE_FLOOR,
    DERIVATIVE_STEP,
};

use crate::convergence::{ConvergenceResult, IterationSettings};
use crate::error::NumericResult;
use crate::traits::{CompiledFunction, RealFunction, Univariate, Value};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum RootMethod {
    Bisection {
        lower: f64,
        upper: f64,
    },
    FalsePosition {
        lower: f64,
        upper: f64,
    },
    NewtonRaphson {
        x0: f64,
        /// Expression for `f'(x)`; a central difference is used when absent.
        #[serde(default)]
        derivative: Option<String>,
    },
    Secant {
        x0: f64,
        x1: f64,
    },
    /// The function is read as `g` in `x = g(x)`.
    FixedPoint {
        x0: f64,
    },
    Muller {
        x0: Value,
        x1: Value,
        x2: Value,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum RootOutput {
    Real(ConvergenceResult<f64>),
    Complex(ConvergenceResult<Complex64>),
}

impl RootOutput {
    pub fn is_converged(&self) -> bool {
        match self {
            RootOutput::Real(result) => result.is_converged(),
            RootOutput::Complex(result) => result.is_converged(),
        }
    }
}

/// Runs `method` on the compiled function `f` of the free variable `variable`.
///
/// `derivative` is only consulted by Newton-Raphson.
pub fn find_root<C: CompiledFunction + ?Sized>(
    f: &C,
    variable: &str,
    derivative: Option<&dyn RealFunction>,
    method: &RootMethod,
    settings: &IterationSettings,
) -> NumericResult<RootOutput> {
    let function = Univariate::new(f, variable);

    match method {
        RootMethod::Bisection { lower, upper } => {
            bisection(&function, *lower, *upper, settings).map(RootOutput::Real)
        }
        RootMethod::FalsePosition { lower, upper } => {
            false_position(&function, *lower, *upper, settings).map(RootOutput::Real)
        }
        RootMethod::NewtonRaphson { x0, .. } => match derivative {
            Some(df) => {
                newton_raphson_with_derivative(&function, df, *x0, settings).map(RootOutput::Real)
            }
            None => newton_raphson(&function, *x0, settings).map(RootOutput::Real),
        },
        RootMethod::Secant { x0, x1 } => {
            secant(&function, *x0, *x1, settings).map(RootOutput::Real)
        }
        RootMethod::FixedPoint { x0 } => fixed_point(&function, *x0, settings).map(RootOutput::Real),
        RootMethod::Muller { x0, x1, x2 } => muller(
            &function,
            x0.into_complex(),
            x1.into_complex(),
            x2.into_complex(),
            settings,
        )
        .map(RootOutput::Complex),
    }
}
