//! Numerical integration (trapezoidal, Simpson) and finite-difference
//! differentiation.

use crate::error::{ensure_finite, NumericError, NumericResult};
use crate::traits::RealFunction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationMethod {
    Trapezoidal,
    Simpson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceScheme {
    Forward,
    Backward,
    Central,
    SecondCentral,
}

/// One node of a quadrature rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadratureSample {
    pub x: f64,
    pub fx: f64,
    /// Rule weight before scaling: `½`/`1` for trapezoidal, `1`/`4`/`2` for Simpson.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quadrature {
    pub value: f64,
    pub h: f64,
    pub samples: Vec<QuadratureSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StencilPoint {
    pub x: f64,
    pub fx: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivativeEstimate {
    pub value: f64,
    /// Exponent of `h` in the truncation error.
    pub error_order: u32,
    pub stencil: Vec<StencilPoint>,
}

pub fn integrate<F: RealFunction + ?Sized>(
    f: &F,
    lower: f64,
    upper: f64,
    segments: usize,
    method: IntegrationMethod,
) -> NumericResult<Quadrature> {
    match method {
        IntegrationMethod::Trapezoidal => trapezoidal(f, lower, upper, segments),
        IntegrationMethod::Simpson => simpson(f, lower, upper, segments),
    }
}

fn sample<F: RealFunction + ?Sized>(
    f: &F,
    lower: f64,
    upper: f64,
    segments: usize,
    weight: impl Fn(usize) -> f64,
) -> NumericResult<(f64, Vec<QuadratureSample>)> {
    ensure_finite("lower limit", lower)?;
    ensure_finite("upper limit", upper)?;
    if segments == 0 {
        return Err(NumericError::InvalidInput(
            "number of segments must be at least 1.".to_string(),
        ));
    }
    let h = (upper - lower) / segments as f64;
    let samples = (0..=segments)
        .map(|i| -> NumericResult<QuadratureSample> {
            // The last node is pinned to `upper` so rounding never shifts it.
            let x = if i == segments {
                upper
            } else {
                lower + i as f64 * h
            };
            Ok(QuadratureSample {
                x,
                fx: f.eval(x)?,
                weight: weight(i),
            })
        })
        .collect::<NumericResult<Vec<_>>>()?;
    Ok((h, samples))
}

fn weighted_sum(samples: &[QuadratureSample]) -> f64 {
    samples.iter().map(|s| s.weight * s.fx).sum()
}

/// Composite trapezoidal rule: `h·(½f₀ + f₁ + … + f_{n-1} + ½fₙ)`.
pub fn trapezoidal<F: RealFunction + ?Sized>(
    f: &F,
    lower: f64,
    upper: f64,
    segments: usize,
) -> NumericResult<Quadrature> {
    let (h, samples) = sample(f, lower, upper, segments, |i| {
        if i == 0 || i == segments {
            0.5
        } else {
            1.0
        }
    })?;
    Ok(Quadrature {
        value: h * weighted_sum(&samples),
        h,
        samples,
    })
}

/// Composite Simpson's 1/3 rule; `segments` must be even.
pub fn simpson<F: RealFunction + ?Sized>(
    f: &F,
    lower: f64,
    upper: f64,
    segments: usize,
) -> NumericResult<Quadrature> {
    if segments % 2 != 0 {
        return Err(NumericError::OddSegmentCount { segments });
    }
    let (h, samples) = sample(f, lower, upper, segments, |i| {
        if i == 0 || i == segments {
            1.0
        } else if i % 2 == 1 {
            4.0
        } else {
            2.0
        }
    })?;
    Ok(Quadrature {
        value: h / 3.0 * weighted_sum(&samples),
        h,
        samples,
    })
}

/// Finite-difference derivative of `f` at `x` with step `h`.
///
/// No guard against cancellation: for [`DifferenceScheme::SecondCentral`] the
/// rounding error grows like `ε/h²`, so `h` around `1e-4` is usually a better
/// choice than `1e-8`.
pub fn differentiate<F: RealFunction + ?Sized>(
    f: &F,
    x: f64,
    h: f64,
    scheme: DifferenceScheme,
) -> NumericResult<DerivativeEstimate> {
    ensure_finite("x", x)?;
    ensure_finite("h", h)?;
    if h == 0.0 {
        return Err(NumericError::InvalidInput(
            "step size h must be non-zero.".to_string(),
        ));
    }

    let point = |x: f64| -> NumericResult<StencilPoint> {
        Ok(StencilPoint { x, fx: f.eval(x)? })
    };

    let (value, error_order, stencil) = match scheme {
        DifferenceScheme::Forward => {
            let (p0, p1) = (point(x)?, point(x + h)?);
            ((p1.fx - p0.fx) / h, 1, vec![p0, p1])
        }
        DifferenceScheme::Backward => {
            let (m1, p0) = (point(x - h)?, point(x)?);
            ((p0.fx - m1.fx) / h, 1, vec![m1, p0])
        }
        DifferenceScheme::Central => {
            let (m1, p1) = (point(x - h)?, point(x + h)?);
            ((p1.fx - m1.fx) / (2.0 * h), 2, vec![m1, p1])
        }
        DifferenceScheme::SecondCentral => {
            let (m1, p0, p1) = (point(x - h)?, point(x)?, point(x + h)?);
            ((p1.fx - 2.0 * p0.fx + m1.fx) / (h * h), 2, vec![m1, p0, p1])
        }
    };

    Ok(DerivativeEstimate {
        value,
        error_order,
        stencil,
    })
}

pub fn forward_difference<F: RealFunction + ?Sized>(f: &F, x: f64, h: f64) -> NumericResult<f64> {
    Ok(differentiate(f, x, h, DifferenceScheme::Forward)?.value)
}

pub fn backward_difference<F: RealFunction + ?Sized>(f: &F, x: f64, h: f64) -> NumericResult<f64> {
    Ok(differentiate(f, x, h, DifferenceScheme::Backward)?.value)
}

pub fn central_difference<F: RealFunction + ?Sized>(f: &F, x: f64, h: f64) -> NumericResult<f64> {
    Ok(differentiate(f, x, h, DifferenceScheme::Central)?.value)
}

pub fn second_central_difference<F: RealFunction + ?Sized>(
    f: &F,
    x: f64,
    h: f64,
) -> NumericResult<f64> {
    Ok(differentiate(f, x, h, DifferenceScheme::SecondCentral)?.value)
}
