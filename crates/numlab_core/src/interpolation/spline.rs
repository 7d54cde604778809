//! Piecewise polynomial splines over sorted nodes.
//!
//! Segment `i` covers `[x_i, x_{i+1}]` and evaluates
//! `S_i(x) = a + b·(x - x_i) + c·(x - x_i)² + d·(x - x_i)³`.
//! Queries outside the nodes extrapolate with the nearest end segment.

use super::{ensure_sorted, validate_points, DataPoint, InterpolationDetail, InterpolationResult};
use crate::error::{ensure_finite, NumericError, NumericResult};
use crate::linalg::solve_tridiagonal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplineSegment {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub x0: f64,
}

impl SplineSegment {
    pub fn eval(&self, x: f64) -> f64 {
        let dx = x - self.x0;
        self.a + dx * (self.b + dx * (self.c + dx * self.d))
    }
}

/// Index of the segment covering `x`, found by a linear scan. `None` only
/// when there are no segments.
pub fn locate_segment(segments: &[SplineSegment], x: f64) -> Option<usize> {
    let last = segments.len().checked_sub(1)?;
    Some(
        segments
            .windows(2)
            .position(|pair| x < pair[1].x0)
            .unwrap_or(last),
    )
}

/// Evaluates a spline built by one of the constructors in this module.
pub fn spline_value(segments: &[SplineSegment], x: f64) -> NumericResult<InterpolationResult> {
    ensure_finite("x", x)?;
    let segment = locate_segment(segments, x)
        .ok_or_else(|| NumericError::InvalidInput("spline has no segments.".to_string()))?;
    Ok(InterpolationResult {
        value: segments[segment].eval(x),
        detail: InterpolationDetail::Spline {
            segments: segments.to_vec(),
            segment,
        },
    })
}

fn prepare(points: &[DataPoint]) -> NumericResult<(Vec<f64>, Vec<f64>)> {
    validate_points(points, 2)?;
    ensure_sorted(points)?;
    let h = points.windows(2).map(|w| w[1].x - w[0].x).collect::<Vec<_>>();
    let slopes = points
        .windows(2)
        .zip(&h)
        .map(|(w, h)| (w[1].y - w[0].y) / h)
        .collect();
    Ok((h, slopes))
}

pub fn linear_spline(points: &[DataPoint]) -> NumericResult<Vec<SplineSegment>> {
    let (_, slopes) = prepare(points)?;
    Ok(points
        .iter()
        .zip(slopes)
        .map(|(p, slope)| SplineSegment {
            a: p.y,
            b: slope,
            c: 0.0,
            d: 0.0,
            x0: p.x,
        })
        .collect())
}

/// Quadratic spline with a linear first segment (`c_0 = 0`).
///
/// Each later segment inherits the end slope of the one before it:
/// `b_{i+1} = b_i + 2·c_i·h_i`, and `c_i` is fixed by passing through `y_{i+1}`.
pub fn quadratic_spline(points: &[DataPoint]) -> NumericResult<Vec<SplineSegment>> {
    let (h, slopes) = prepare(points)?;
    let mut segments = Vec::with_capacity(h.len());
    let mut b = slopes[0];
    for i in 0..h.len() {
        let c = (slopes[i] - b) / h[i];
        segments.push(SplineSegment {
            a: points[i].y,
            b,
            c,
            d: 0.0,
            x0: points[i].x,
        });
        b += 2.0 * c * h[i];
    }
    Ok(segments)
}

/// Natural cubic spline (`S''` vanishes at both ends).
///
/// The interior second derivatives `m_1 … m_{n-2}` solve
/// `h_{i-1}·m_{i-1} + 2(h_{i-1} + h_i)·m_i + h_i·m_{i+1} = 6(δ_i - δ_{i-1})`,
/// a tridiagonal system handled by [`solve_tridiagonal`].
pub fn cubic_spline(points: &[DataPoint]) -> NumericResult<Vec<SplineSegment>> {
    let (h, slopes) = prepare(points)?;
    let n = points.len();
    let mut m = vec![0.0; n];

    if n > 2 {
        let interior = n - 2;
        let mut sub = vec![0.0; interior];
        let mut diag = vec![0.0; interior];
        let mut sup = vec![0.0; interior];
        let mut rhs = vec![0.0; interior];
        for k in 0..interior {
            let i = k + 1;
            sub[k] = h[i - 1];
            diag[k] = 2.0 * (h[i - 1] + h[i]);
            sup[k] = h[i];
            rhs[k] = 6.0 * (slopes[i] - slopes[i - 1]);
        }
        let solved = solve_tridiagonal(&sub, &diag, &sup, &rhs)?;
        m[1..n - 1].copy_from_slice(&solved);
    }

    Ok((0..n - 1)
        .map(|i| SplineSegment {
            a: points[i].y,
            b: slopes[i] - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0,
            c: m[i] / 2.0,
            d: (m[i + 1] - m[i]) / (6.0 * h[i]),
            x0: points[i].x,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(data: &[(f64, f64)]) -> Vec<DataPoint> {
        data.iter().copied().map(DataPoint::from).collect()
    }

    #[test]
    fn linear_spline_interpolates_and_extrapolates() {
        let segments = linear_spline(&pts(&[(0.0, 0.0), (1.0, 2.0), (3.0, 3.0)])).expect("spline");
        assert_eq!(segments.len(), 2);
        assert_eq!(spline_value(&segments, 0.5).expect("value").value, 1.0);
        assert_eq!(spline_value(&segments, 2.0).expect("value").value, 2.5);
        assert_eq!(spline_value(&segments, -1.0).expect("value").value, -2.0);
        assert_eq!(spline_value(&segments, 5.0).expect("value").value, 4.0);
    }

    #[test]
    fn locate_segment_scans_intervals() {
        let segments = linear_spline(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)]))
            .expect("spline");
        assert_eq!(locate_segment(&segments, -4.0), Some(0));
        assert_eq!(locate_segment(&segments, 0.5), Some(0));
        assert_eq!(locate_segment(&segments, 1.0), Some(1));
        assert_eq!(locate_segment(&segments, 2.9), Some(2));
        assert_eq!(locate_segment(&segments, 3.0), Some(2));
        assert_eq!(locate_segment(&segments, 8.0), Some(2));
    }

    #[test]
    fn empty_spline_has_no_segment() {
        assert_eq!(locate_segment(&[], 1.0), None);
        let err = spline_value(&[], 1.0).expect_err("no segments");
        assert!(matches!(err, NumericError::InvalidInput(_)));
    }

    #[test]
    fn quadratic_spline_has_linear_first_segment_and_smooth_joints() {
        let points = pts(&[(0.0, 1.0), (1.0, 3.0), (2.0, 2.0), (4.0, 5.0)]);
        let segments = quadratic_spline(&points).expect("spline");
        assert_eq!(segments[0].c, 0.0);
        for (i, pair) in segments.windows(2).enumerate() {
            let h = points[i + 1].x - points[i].x;
            let left_value = pair[0].eval(points[i + 1].x);
            let left_slope = pair[0].b + 2.0 * pair[0].c * h;
            assert!((left_value - pair[1].a).abs() < 1e-12);
            assert!((left_slope - pair[1].b).abs() < 1e-12);
        }
    }

    #[test]
    fn natural_cubic_spline_matches_reference_values() {
        // Knots of (0,0), (1,1), (2,0), (3,1): m_1 = -4, m_2 = 4.
        let points = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)]);
        let segments = cubic_spline(&points).expect("spline");
        assert!((segments[1].c - -2.0).abs() < 1e-12);
        assert!((segments[2].c - 2.0).abs() < 1e-12);
        assert_eq!(segments[0].c, 0.0);
        let end_curvature = 2.0 * segments[2].c + 6.0 * segments[2].d;
        assert!(end_curvature.abs() < 1e-12);
        let mid = spline_value(&segments, 1.5).expect("value").value;
        assert!((mid - 0.5).abs() < 1e-12);
    }

    #[test]
    fn cubic_spline_with_two_points_is_linear() {
        let segments = cubic_spline(&pts(&[(0.0, 1.0), (2.0, 5.0)])).expect("spline");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].b, 2.0);
        assert_eq!(segments[0].c, 0.0);
        assert_eq!(segments[0].d, 0.0);
    }

    #[test]
    fn splines_require_sorted_nodes() {
        let err = cubic_spline(&pts(&[(0.0, 0.0), (2.0, 1.0), (1.0, 2.0)])).expect_err("order");
        assert_eq!(err, NumericError::UnsortedNodes { index: 2 });
        let err = linear_spline(&pts(&[(0.0, 0.0)])).expect_err("single node");
        assert!(matches!(err, NumericError::InvalidInput(_)));
    }
}
