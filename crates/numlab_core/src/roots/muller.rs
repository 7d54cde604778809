use crate::convergence::{percent, ConvergenceResult, IterationRecorder, IterationSettings};
use crate::error::{NumericError, NumericResult};
use crate::traits::ComplexFunction;
use num_complex::Complex64;
use num_traits::Zero;

/// Muller's method: fits a parabola through the last three iterates and steps
/// to the nearer root of that parabola.
///
/// Works in complex arithmetic throughout, so real starting guesses can lead
/// to a complex root. The quadratic is solved with the denominator
/// `b ± sqrt(b² - 4ac)` of larger magnitude to avoid cancellation.
///
/// Each history record stores `[re, im]` of the new iterate and `|f|` there.
pub fn muller<F: ComplexFunction + ?Sized>(
    f: &F,
    x0: impl Into<Complex64>,
    x1: impl Into<Complex64>,
    x2: impl Into<Complex64>,
    settings: &IterationSettings,
) -> NumericResult<ConvergenceResult<Complex64>> {
    settings.validate()?;
    let (mut x0, mut x1, mut x2) = (x0.into(), x1.into(), x2.into());
    for (name, z) in [("x0", x0), ("x1", x1), ("x2", x2)] {
        if !z.re.is_finite() || !z.im.is_finite() {
            return Err(NumericError::InvalidInput(format!("{name} must be finite.")));
        }
    }
    if x0 == x1 || x1 == x2 || x0 == x2 {
        return Err(NumericError::InvalidInput(
            "Muller's method needs three distinct starting points.".to_string(),
        ));
    }

    let mut f0 = f.eval(x0)?;
    let mut f1 = f.eval(x1)?;
    let mut f2 = f.eval(x2)?;
    let mut recorder = IterationRecorder::new();

    for _ in 0..settings.max_iterations {
        let h0 = x1 - x0;
        let h1 = x2 - x1;
        if h0.is_zero() || h1.is_zero() || (h0 + h1).is_zero() {
            return Ok(recorder.failed("Muller iterates collapsed onto each other."));
        }
        let d0 = (f1 - f0) / h0;
        let d1 = (f2 - f1) / h1;
        let a = (d1 - d0) / (h1 + h0);
        let b = a * h1 + d1;
        let c = f2;

        let discriminant = (b * b - a * c * 4.0).sqrt();
        let plus = b + discriminant;
        let minus = b - discriminant;
        let denominator = if plus.norm() > minus.norm() { plus } else { minus };
        if denominator.is_zero() {
            return Ok(recorder.failed(format!("Muller denominator vanished at x = {x2}.")));
        }

        let dx = c * -2.0 / denominator;
        let x3 = x2 + dx;
        if !x3.re.is_finite() || !x3.im.is_finite() {
            return Ok(recorder.failed(format!("Muller's method diverged after x = {x2}.")));
        }
        let f3 = f.eval(x3)?;
        let change = if x3.is_zero() {
            dx.norm()
        } else {
            dx.norm() / x3.norm()
        };
        recorder.record(vec![x3.re, x3.im], f3.norm(), Some(percent(change)));

        if change < settings.tolerance || f3.norm() < settings.tolerance {
            return Ok(recorder.converged(x3));
        }

        x0 = x1;
        x1 = x2;
        x2 = x3;
        f0 = f1;
        f1 = f2;
        f2 = f3;
    }

    Ok(recorder.exhausted(x2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn muller_finds_real_root() {
        let f = |z: Complex64| z * z * z - z - 2.0;
        let result = muller(&f, 1.0_f64, 1.5_f64, 2.0_f64, &IterationSettings::default())
            .expect("muller");
        assert!(result.is_converged());
        let root = result.value().expect("root");
        assert!((root.re - 1.5213797068).abs() < 1e-6);
        assert!(root.im.abs() < 1e-9);
    }

    #[test]
    fn muller_reaches_complex_root_from_real_guesses() {
        let f = |z: Complex64| z * z + 1.0;
        let result = muller(&f, 0.5_f64, 1.0_f64, 1.5_f64, &IterationSettings::default())
            .expect("muller");
        assert!(result.is_converged());
        let root = *result.value().expect("root");
        assert!((root * root + 1.0).norm() < 1e-6);
        assert!((root.im.abs() - 1.0).abs() < 1e-6);
        let first = &result.history()[0];
        assert_eq!(first.iterates.len(), 2);
        assert!(first.iterates[1] != 0.0, "first step should leave the real axis");
    }

    #[test]
    fn muller_accepts_complex_guesses() {
        let f = |z: Complex64| z * z - Complex64::new(0.0, 2.0);
        let result = muller(
            &f,
            Complex64::new(0.5, 0.5),
            Complex64::new(1.2, 0.8),
            Complex64::new(0.9, 1.1),
            &IterationSettings::default(),
        )
        .expect("muller");
        let root = *result.value().expect("root");
        assert!((root * root - Complex64::new(0.0, 2.0)).norm() < 1e-6);
    }

    #[test]
    fn muller_rejects_repeated_guesses() {
        let f = |z: Complex64| z;
        let err = muller(&f, 1.0_f64, 1.0_f64, 2.0_f64, &IterationSettings::default())
            .expect_err("x0 == x1");
        assert!(format!("{err}").contains("three distinct"));
    }
}
