//! Iteration bookkeeping shared by every iterative method.
//!
//! Each method owns an [`IterationRecorder`], appends one
//! [`IterationRecord`] per step and finishes with a [`ConvergenceResult`].

use crate::error::{NumericError, NumericResult};
use serde::{Deserialize, Serialize};

/// Settings for every iterative method (root finders, Jacobi, Gauss-Seidel).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationSettings {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for IterationSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

impl IterationSettings {
    pub(crate) fn validate(&self) -> NumericResult<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(NumericError::InvalidInput(format!(
                "tolerance must be positive, got {}.",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(NumericError::InvalidInput(
                "max_iterations must be greater than zero.".to_string(),
            ));
        }
        Ok(())
    }
}

/// One row of an iteration history.
///
/// `iterates` holds whatever the method advances: `[a, b, c]` for bracketing
/// methods, `[x_n, x_{n+1}]` for open methods, `[re, im]` for Muller and the
/// full solution vector for Jacobi / Gauss-Seidel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub step: u32,
    pub iterates: Vec<f64>,
    pub function_value: f64,
    /// Approximate relative error in percent. `None` on the first step.
    pub relative_error: Option<f64>,
    /// Width of the current bracket, bracketing methods only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bracket_width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConvergenceResult<T> {
    Converged {
        value: T,
        history: Vec<IterationRecord>,
    },
    MaxIterationsReached {
        best_estimate: T,
        history: Vec<IterationRecord>,
    },
    Failed {
        reason: String,
    },
}

impl<T> ConvergenceResult<T> {
    pub fn is_converged(&self) -> bool {
        matches!(self, ConvergenceResult::Converged { .. })
    }

    /// The converged value or the best estimate, whichever is available.
    pub fn value(&self) -> Option<&T> {
        match self {
            ConvergenceResult::Converged { value, .. } => Some(value),
            ConvergenceResult::MaxIterationsReached { best_estimate, .. } => Some(best_estimate),
            ConvergenceResult::Failed { .. } => None,
        }
    }

    pub fn history(&self) -> &[IterationRecord] {
        match self {
            ConvergenceResult::Converged { history, .. }
            | ConvergenceResult::MaxIterationsReached { history, .. } => history,
            ConvergenceResult::Failed { .. } => &[],
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ConvergenceResult<U> {
        match self {
            ConvergenceResult::Converged { value, history } => ConvergenceResult::Converged {
                value: f(value),
                history,
            },
            ConvergenceResult::MaxIterationsReached {
                best_estimate,
                history,
            } => ConvergenceResult::MaxIterationsReached {
                best_estimate: f(best_estimate),
                history,
            },
            ConvergenceResult::Failed { reason } => ConvergenceResult::Failed { reason },
        }
    }
}

/// Append-only history builder.
#[derive(Debug, Default)]
pub struct IterationRecorder {
    history: Vec<IterationRecord>,
}

impl IterationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Records the next step; steps are numbered from 1.
    pub fn record(&mut self, iterates: Vec<f64>, function_value: f64, relative_error: Option<f64>) {
        self.push(iterates, function_value, relative_error, None);
    }

    pub fn record_bracket(
        &mut self,
        iterates: Vec<f64>,
        function_value: f64,
        relative_error: Option<f64>,
        bracket_width: f64,
    ) {
        self.push(iterates, function_value, relative_error, Some(bracket_width));
    }

    fn push(
        &mut self,
        iterates: Vec<f64>,
        function_value: f64,
        relative_error: Option<f64>,
        bracket_width: Option<f64>,
    ) {
        let step = self.history.len() as u32 + 1;
        self.history.push(IterationRecord {
            step,
            iterates,
            function_value,
            relative_error,
            bracket_width,
        });
    }

    pub fn converged<T>(self, value: T) -> ConvergenceResult<T> {
        ConvergenceResult::Converged {
            value,
            history: self.history,
        }
    }

    pub fn exhausted<T>(self, best_estimate: T) -> ConvergenceResult<T> {
        log::debug!(
            "iteration budget exhausted after {} steps",
            self.history.len()
        );
        ConvergenceResult::MaxIterationsReached {
            best_estimate,
            history: self.history,
        }
    }

    pub fn failed<T>(self, reason: impl Into<String>) -> ConvergenceResult<T> {
        ConvergenceResult::Failed {
            reason: reason.into(),
        }
    }
}

/// `|new - old| / |new|` as a fraction. Falls back to the absolute change when
/// `new` is exactly zero.
pub fn relative_change(new: f64, old: f64) -> f64 {
    let delta = (new - old).abs();
    if new == 0.0 {
        delta
    } else {
        delta / new.abs()
    }
}

pub(crate) fn percent(fraction: f64) -> f64 {
    fraction * 100.0
}
