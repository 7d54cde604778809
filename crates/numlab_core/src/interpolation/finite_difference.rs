//! Interpolation over evenly spaced nodes from a forward-difference table.
//!
//! All four methods share [`DifferenceTable`] and differ only in the origin
//! row and in which table entry each order reads:
//!
//! | method          | origin      | order `k` reads row        | factors of `p`            |
//! |-----------------|-------------|----------------------------|---------------------------|
//! | Newton forward  | `0`         | `0`                        | `p, p-1, p-2, …`          |
//! | Newton backward | `n-1`       | `n-1-k`                    | `p, p+1, p+2, …`          |
//! | Gauss forward   | `(n-1)/2`   | `origin - ⌊k/2⌋`           | `p, p-1, p+1, p-2, p+2, …` |
//! | Gauss backward  | `n/2`       | `origin - ⌈k/2⌉`           | `p, p+1, p-1, p+2, p-2, …` |
//!
//! The `k`-th term is `Δᵏy_row · (product of the first k factors) / k!`. The
//! Gauss walks stop at the first order whose entry falls outside the table.

use super::{ensure_sorted, validate_points, DataPoint, InterpolationDetail, InterpolationResult};
use crate::error::{ensure_finite, NumericError, NumericResult};
use serde::{Deserialize, Serialize};

/// Largest relative deviation of a node interval from the first interval.
pub const SPACING_TOLERANCE: f64 = 5e-3;

/// Triangular forward-difference table: `row(i)[k] = Δᵏy_i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferenceTable {
    rows: Vec<Vec<f64>>,
}

impl DifferenceTable {
    pub fn new(ys: &[f64]) -> Self {
        let n = ys.len();
        let mut rows: Vec<Vec<f64>> = ys.iter().map(|y| vec![*y]).collect();
        for k in 1..n {
            for i in 0..n - k {
                let value = rows[i + 1][k - 1] - rows[i][k - 1];
                rows[i].push(value);
            }
        }
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    /// `Δᵏy_row`, or `None` when the entry lies outside the triangle.
    pub fn get(&self, row: isize, order: usize) -> Option<f64> {
        if row < 0 {
            return None;
        }
        self.rows.get(row as usize)?.get(order).copied()
    }
}

/// Returns the common step `h` of evenly spaced, increasing nodes.
fn uniform_step(points: &[DataPoint]) -> NumericResult<f64> {
    validate_points(points, 2)?;
    ensure_sorted(points)?;
    let h = points[1].x - points[0].x;
    for (index, pair) in points.windows(2).enumerate() {
        let width = pair[1].x - pair[0].x;
        if (width - h).abs() > SPACING_TOLERANCE * h {
            return Err(NumericError::UnevenSpacing {
                index,
                width,
                expected: h,
            });
        }
    }
    Ok(h)
}

#[derive(Clone, Copy)]
enum Walk {
    NewtonForward,
    NewtonBackward,
    GaussForward,
    GaussBackward,
}

impl Walk {
    fn origin(self, n: usize) -> usize {
        match self {
            Walk::NewtonForward => 0,
            Walk::NewtonBackward => n - 1,
            Walk::GaussForward => (n - 1) / 2,
            Walk::GaussBackward => n / 2,
        }
    }

    fn row(self, origin: usize, order: usize) -> isize {
        let origin = origin as isize;
        let k = order as isize;
        match self {
            Walk::NewtonForward => 0,
            Walk::NewtonBackward => origin - k,
            Walk::GaussForward => origin - k / 2,
            Walk::GaussBackward => origin - (k + 1) / 2,
        }
    }

    /// The factor that enters the coefficient product at `order` (1-based).
    fn factor(self, p: f64, order: usize) -> f64 {
        let j = (order - 1) as f64;
        let half = (order / 2) as f64;
        match self {
            Walk::NewtonForward => p - j,
            Walk::NewtonBackward => p + j,
            Walk::GaussForward if order % 2 == 0 => p - half,
            Walk::GaussForward => p + half,
            Walk::GaussBackward if order % 2 == 0 => p + half,
            Walk::GaussBackward => p - half,
        }
    }
}

fn expand(points: &[DataPoint], x: f64, walk: Walk) -> NumericResult<InterpolationResult> {
    ensure_finite("x", x)?;
    let h = uniform_step(points)?;
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let table = DifferenceTable::new(&ys);
    let n = table.len();

    let origin = walk.origin(n);
    let p = (x - points[origin].x) / h;

    let mut terms = vec![ys[origin]];
    let mut coefficient = 1.0;
    for order in 1..n {
        let Some(difference) = table.get(walk.row(origin, order), order) else {
            break;
        };
        coefficient *= walk.factor(p, order) / order as f64;
        terms.push(coefficient * difference);
    }

    Ok(InterpolationResult {
        value: terms.iter().sum(),
        detail: InterpolationDetail::FiniteDifference {
            table,
            origin,
            p,
            terms,
        },
    })
}

/// Newton's forward-difference formula, expanded about the first node.
pub fn newton_forward(points: &[DataPoint], x: f64) -> NumericResult<InterpolationResult> {
    expand(points, x, Walk::NewtonForward)
}

/// Newton's backward-difference formula, expanded about the last node.
pub fn newton_backward(points: &[DataPoint], x: f64) -> NumericResult<InterpolationResult> {
    expand(points, x, Walk::NewtonBackward)
}

/// Gauss's forward formula:
/// `y₀ + pΔy₀ + p(p−1)/2!·Δ²y₋₁ + (p+1)p(p−1)/3!·Δ³y₋₁ + …`
pub fn gauss_forward(points: &[DataPoint], x: f64) -> NumericResult<InterpolationResult> {
    expand(points, x, Walk::GaussForward)
}

/// Gauss's backward formula:
/// `y₀ + pΔy₋₁ + (p+1)p/2!·Δ²y₋₁ + (p+1)p(p−1)/3!·Δ³y₋₂ + …`
pub fn gauss_backward(points: &[DataPoint], x: f64) -> NumericResult<InterpolationResult> {
    expand(points, x, Walk::GaussBackward)
}
