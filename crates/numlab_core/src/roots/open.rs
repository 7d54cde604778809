//! Open root finders: no bracket, one or two starting guesses.

use crate::convergence::{
    percent, relative_change, ConvergenceResult, IterationRecorder, IterationSettings,
};
use crate::error::{ensure_finite, NumericError, NumericResult};
use crate::traits::RealFunction;

/// Step of the central difference used when no analytic derivative is given.
pub const DERIVATIVE_STEP: f64 = 1e-7;
/// Below this magnitude a derivative (or secant slope denominator) counts as zero.
pub const DERIVATIVE_FLOOR: f64 = 1e-18;

fn central_derivative<F: RealFunction + ?Sized>(f: &F, x: f64) -> NumericResult<f64> {
    let h = DERIVATIVE_STEP;
    Ok((f.eval(x + h)? - f.eval(x - h)?) / (2.0 * h))
}

/// Newton-Raphson with the derivative approximated by a central difference.
pub fn newton_raphson<F: RealFunction + ?Sized>(
    f: &F,
    x0: f64,
    settings: &IterationSettings,
) -> NumericResult<ConvergenceResult<f64>> {
    newton_iterate(f, x0, settings, |x| central_derivative(f, x))
}

/// Newton-Raphson with a caller-supplied derivative `df`.
pub fn newton_raphson_with_derivative<F, D>(
    f: &F,
    df: &D,
    x0: f64,
    settings: &IterationSettings,
) -> NumericResult<ConvergenceResult<f64>>
where
    F: RealFunction + ?Sized,
    D: RealFunction + ?Sized,
{
    newton_iterate(f, x0, settings, |x| Ok(df.eval(x)?))
}

fn newton_iterate<F: RealFunction + ?Sized>(
    f: &F,
    x0: f64,
    settings: &IterationSettings,
    derivative: impl Fn(f64) -> NumericResult<f64>,
) -> NumericResult<ConvergenceResult<f64>> {
    settings.validate()?;
    ensure_finite("initial guess", x0)?;

    let mut recorder = IterationRecorder::new();
    let mut x = x0;
    let mut fx = f.eval(x)?;

    for _ in 0..settings.max_iterations {
        let slope = derivative(x)?;
        if slope.abs() < DERIVATIVE_FLOOR {
            return Err(NumericError::ZeroDerivative { x });
        }

        let next = x - fx / slope;
        if !next.is_finite() {
            return Ok(recorder.failed(format!("Newton-Raphson diverged after x = {x}.")));
        }
        let f_next = f.eval(next)?;
        let change = relative_change(next, x);
        recorder.record(vec![x, next], f_next, Some(percent(change)));

        x = next;
        fx = f_next;
        if change < settings.tolerance || fx.abs() < settings.tolerance {
            return Ok(recorder.converged(x));
        }
    }

    Ok(recorder.exhausted(x))
}

/// Secant method from two starting guesses.
pub fn secant<F: RealFunction + ?Sized>(
    f: &F,
    x0: f64,
    x1: f64,
    settings: &IterationSettings,
) -> NumericResult<ConvergenceResult<f64>> {
    settings.validate()?;
    ensure_finite("first guess", x0)?;
    ensure_finite("second guess", x1)?;

    let mut recorder = IterationRecorder::new();
    let (mut x_prev, mut x) = (x0, x1);
    let (mut f_prev, mut fx) = (f.eval(x_prev)?, f.eval(x)?);

    for _ in 0..settings.max_iterations {
        let denominator = fx - f_prev;
        if denominator.abs() < DERIVATIVE_FLOOR {
            return Err(NumericError::ZeroDerivative { x });
        }

        let next = x - fx * (x - x_prev) / denominator;
        if !next.is_finite() {
            return Ok(recorder.failed(format!("Secant method diverged after x = {x}.")));
        }
        let f_next = f.eval(next)?;
        let change = relative_change(next, x);
        recorder.record(vec![x, next], f_next, Some(percent(change)));

        x_prev = x;
        f_prev = fx;
        x = next;
        fx = f_next;
        if change < settings.tolerance || fx.abs() < settings.tolerance {
            return Ok(recorder.converged(x));
        }
    }

    Ok(recorder.exhausted(x))
}

/// Iterates `x_{n+1} = g(x_n)` until the relative change drops below the tolerance.
///
/// The recorded function value is the residual `g(x_n) - x_n`.
pub fn fixed_point<G: RealFunction + ?Sized>(
    g: &G,
    x0: f64,
    settings: &IterationSettings,
) -> NumericResult<ConvergenceResult<f64>> {
    settings.validate()?;
    ensure_finite("initial guess", x0)?;

    let mut recorder = IterationRecorder::new();
    let mut x = x0;

    for _ in 0..settings.max_iterations {
        let next = g.eval(x)?;
        if !next.is_finite() {
            return Ok(recorder.failed(format!("Fixed-point iteration diverged after x = {x}.")));
        }
        let change = relative_change(next, x);
        recorder.record(vec![x, next], next - x, Some(percent(change)));

        x = next;
        if change < settings.tolerance {
            return Ok(recorder.converged(x));
        }
    }

    Ok(recorder.exhausted(x))
}
