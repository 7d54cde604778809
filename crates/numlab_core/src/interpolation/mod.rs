//! Interpolation through tabulated points `(x_i, y_i)`.
//!
//! - [`polynomial`]: Lagrange and Newton divided differences; nodes in any order.
//! - [`spline`]: linear, quadratic and natural cubic splines; nodes sorted by x.
//! - [`finite_difference`]: Newton forward/backward and Gauss forward/backward
//!   over evenly spaced nodes.
//!
//! Every method returns an [`InterpolationResult`] carrying the value and the
//! intermediate data a host can display. [`interpolate`] is the single
//! dispatch point over [`InterpolationMethod`].

pub mod finite_difference;
pub mod polynomial;
pub mod spline;

pub use finite_difference::{
    gauss_backward, gauss_forward, newton_backward, newton_forward, DifferenceTable,
    SPACING_TOLERANCE,
};
pub use polynomial::{divided_differences, lagrange, newton_divided_difference};
pub use spline::{
    cubic_spline, linear_spline, locate_segment, quadratic_spline, spline_value, SplineSegment,
};

use crate::error::{ensure_finite, NumericError, NumericResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for DataPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    Lagrange,
    NewtonDividedDifference,
    LinearSpline,
    QuadraticSpline,
    CubicSpline,
    NewtonForward,
    NewtonBackward,
    GaussForward,
    GaussBackward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolationResult {
    pub value: f64,
    pub detail: InterpolationDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterpolationDetail {
    /// `L_i(x)` for every node, in input order.
    Lagrange { basis: Vec<f64> },
    /// `table[i][k] = f[x_i, …, x_{i+k}]`; `coefficients` is its first row.
    DividedDifference {
        table: Vec<Vec<f64>>,
        coefficients: Vec<f64>,
    },
    Spline {
        segments: Vec<SplineSegment>,
        /// Index of the segment used for the evaluation.
        segment: usize,
    },
    FiniteDifference {
        table: DifferenceTable,
        /// Row of the node the expansion is centered on.
        origin: usize,
        /// `(x - x_origin) / h`
        p: f64,
        /// Contribution of each order, starting with `y_origin`.
        terms: Vec<f64>,
    },
}

pub fn interpolate(
    points: &[DataPoint],
    x: f64,
    method: InterpolationMethod,
) -> NumericResult<InterpolationResult> {
    match method {
        InterpolationMethod::Lagrange => lagrange(points, x),
        InterpolationMethod::NewtonDividedDifference => newton_divided_difference(points, x),
        InterpolationMethod::LinearSpline => spline_value(&linear_spline(points)?, x),
        InterpolationMethod::QuadraticSpline => spline_value(&quadratic_spline(points)?, x),
        InterpolationMethod::CubicSpline => spline_value(&cubic_spline(points)?, x),
        InterpolationMethod::NewtonForward => newton_forward(points, x),
        InterpolationMethod::NewtonBackward => newton_backward(points, x),
        InterpolationMethod::GaussForward => gauss_forward(points, x),
        InterpolationMethod::GaussBackward => gauss_backward(points, x),
    }
}

/// Rejects empty or too-short node sets and non-finite coordinates.
pub(crate) fn validate_points(points: &[DataPoint], minimum: usize) -> NumericResult<()> {
    if points.len() < minimum {
        return Err(NumericError::InvalidInput(format!(
            "at least {minimum} data point(s) required, got {}.",
            points.len()
        )));
    }
    for p in points {
        ensure_finite("node x", p.x)?;
        ensure_finite("node y", p.y)?;
    }
    Ok(())
}

/// Node x-values must be pairwise distinct; order does not matter.
pub(crate) fn ensure_distinct(points: &[DataPoint]) -> NumericResult<()> {
    for (i, a) in points.iter().enumerate() {
        if points[i + 1..].iter().any(|b| b.x == a.x) {
            return Err(NumericError::DuplicateNode { x: a.x });
        }
    }
    Ok(())
}

/// Node x-values must be strictly increasing.
pub(crate) fn ensure_sorted(points: &[DataPoint]) -> NumericResult<()> {
    for (i, pair) in points.windows(2).enumerate() {
        if pair[1].x == pair[0].x {
            return Err(NumericError::DuplicateNode { x: pair[1].x });
        }
        if pair[1].x < pair[0].x {
            return Err(NumericError::UnsortedNodes { index: i + 1 });
        }
    }
    Ok(())
}
