//! Error taxonomy shared by every numerical method in the engine.
//!
//! Structural problems with the input (a bad bracket, a singular matrix,
//! mismatched shapes) are hard failures. Running out of iterations is not an
//! error; see [`crate::convergence::ConvergenceResult`].

use thiserror::Error;

/// Failure reported by the expression evaluator that backs a function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("Unknown variable `{0}`.")]
    UnknownVariable(String),

    #[error("Expression produced the complex value {re} + {im}i where a real number was required.")]
    ComplexResult { re: f64, im: f64 },

    #[error("Expression evaluated to a non-finite value at {at}.")]
    NonFinite { at: String },

    #[error("Evaluator error: {0}")]
    Host(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericError {
    #[error(
        "Invalid bracket [{low}, {high}]: f(low) = {f_low} and f(high) = {f_high} do not change sign."
    )]
    InvalidBracket {
        low: f64,
        high: f64,
        f_low: f64,
        f_high: f64,
    },

    #[error("Matrix is singular (zero pivot in column {column}).")]
    SingularMatrix { column: usize },

    #[error("Matrix is not positive definite: {0}")]
    NotPositiveDefinite(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Derivative vanished at x = {x}; the iteration cannot continue.")]
    ZeroDerivative { x: f64 },

    #[error("Nodes are not evenly spaced: interval {index} has width {width}, expected {expected}.")]
    UnevenSpacing {
        index: usize,
        width: f64,
        expected: f64,
    },

    #[error("Simpson's rule needs an even number of segments, got {segments}.")]
    OddSegmentCount { segments: usize },

    #[error("Requested {requested} steps, the limit is {limit}.")]
    StepLimitExceeded { requested: usize, limit: usize },

    #[error("Duplicate node at x = {x}.")]
    DuplicateNode { x: f64 },

    #[error("Nodes must be sorted by increasing x (violation at index {index}).")]
    UnsortedNodes { index: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

pub type NumericResult<T> = Result<T, NumericError>;

/// Rejects NaN and infinities in caller-supplied parameters.
pub(crate) fn ensure_finite(name: &str, value: f64) -> NumericResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(NumericError::InvalidInput(format!(
            "{name} must be finite, got {value}."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluation_errors_convert_transparently() {
        let err: NumericError = EvaluationError::UnknownVariable("t".into()).into();
        assert_eq!(format!("{err}"), "Unknown variable `t`.");
    }

    #[test]
    fn ensure_finite_rejects_nan() {
        let err = ensure_finite("step", f64::NAN).expect_err("NaN should be rejected");
        assert!(format!("{err}").contains("step must be finite"));
        assert!(ensure_finite("step", 0.5).is_ok());
    }
}
