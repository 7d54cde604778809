//! Fixed-step integrators for scalar initial value problems `dy/dx = f(x, y)`.

use crate::error::{ensure_finite, EvaluationError, NumericError, NumericResult};
use crate::traits::OdeFunction;
use serde::{Deserialize, Serialize};

/// Largest step count a single call may request.
pub const MAX_ODE_STEPS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OdeMethod {
    Euler,
    Rk4,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdePoint {
    pub step: usize,
    pub x: f64,
    pub y: f64,
    /// Slopes evaluated on the step that produced this point; empty for the
    /// initial condition.
    pub slopes: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdeSolution {
    pub method: OdeMethod,
    pub points: Vec<OdePoint>,
}

impl OdeSolution {
    /// `(x, y)` at the end of the trajectory.
    pub fn end(&self) -> Option<(f64, f64)> {
        self.points.last().map(|p| (p.x, p.y))
    }
}

/// One fixed step of an explicit method.
pub trait Stepper {
    /// Advances `(x, y)` by `h` and returns the slopes it evaluated.
    fn step<F: OdeFunction + ?Sized>(
        &mut self,
        f: &F,
        x: &mut f64,
        y: &mut f64,
        h: f64,
    ) -> Result<Vec<f64>, EvaluationError>;
}

/// Forward Euler: `y_{n+1} = y_n + h·f(x_n, y_n)`.
pub struct Euler;

impl Stepper for Euler {
    fn step<F: OdeFunction + ?Sized>(
        &mut self,
        f: &F,
        x: &mut f64,
        y: &mut f64,
        h: f64,
    ) -> Result<Vec<f64>, EvaluationError> {
        let k1 = f.eval(*x, *y)?;
        *y += h * k1;
        *x += h;
        Ok(vec![k1])
    }
}

/// Classic Runge-Kutta 4th order.
pub struct Rk4;

impl Stepper for Rk4 {
    fn step<F: OdeFunction + ?Sized>(
        &mut self,
        f: &F,
        x: &mut f64,
        y: &mut f64,
        h: f64,
    ) -> Result<Vec<f64>, EvaluationError> {
        let x0 = *x;
        let y0 = *y;
        let half = 0.5 * h;

        // k1 = f(x, y)
        let k1 = f.eval(x0, y0)?;
        // k2 = f(x + h/2, y + h*k1/2)
        let k2 = f.eval(x0 + half, y0 + half * k1)?;
        // k3 = f(x + h/2, y + h*k2/2)
        let k3 = f.eval(x0 + half, y0 + half * k2)?;
        // k4 = f(x + h, y + h*k3)
        let k4 = f.eval(x0 + h, y0 + h * k3)?;

        *y = y0 + h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
        *x = x0 + h;
        Ok(vec![k1, k2, k3, k4])
    }
}

pub fn solve_ode<F: OdeFunction + ?Sized>(
    f: &F,
    x0: f64,
    y0: f64,
    h: f64,
    steps: usize,
    method: OdeMethod,
) -> NumericResult<OdeSolution> {
    match method {
        OdeMethod::Euler => run(&mut Euler, method, f, x0, y0, h, steps),
        OdeMethod::Rk4 => run(&mut Rk4, method, f, x0, y0, h, steps),
    }
}

pub fn euler<F: OdeFunction + ?Sized>(
    f: &F,
    x0: f64,
    y0: f64,
    h: f64,
    steps: usize,
) -> NumericResult<OdeSolution> {
    solve_ode(f, x0, y0, h, steps, OdeMethod::Euler)
}

pub fn rk4<F: OdeFunction + ?Sized>(
    f: &F,
    x0: f64,
    y0: f64,
    h: f64,
    steps: usize,
) -> NumericResult<OdeSolution> {
    solve_ode(f, x0, y0, h, steps, OdeMethod::Rk4)
}

fn run<S: Stepper, F: OdeFunction + ?Sized>(
    stepper: &mut S,
    method: OdeMethod,
    f: &F,
    x0: f64,
    y0: f64,
    h: f64,
    steps: usize,
) -> NumericResult<OdeSolution> {
    ensure_finite("x0", x0)?;
    ensure_finite("y0", y0)?;
    ensure_finite("h", h)?;
    if h == 0.0 {
        return Err(NumericError::InvalidInput(
            "step size h must be non-zero.".to_string(),
        ));
    }
    if steps == 0 {
        return Err(NumericError::InvalidInput(
            "number of steps must be at least 1.".to_string(),
        ));
    }
    if steps > MAX_ODE_STEPS {
        return Err(NumericError::StepLimitExceeded {
            requested: steps,
            limit: MAX_ODE_STEPS,
        });
    }

    let mut points = Vec::with_capacity(steps + 1);
    points.push(OdePoint {
        step: 0,
        x: x0,
        y: y0,
        slopes: Vec::new(),
    });

    let (mut x, mut y) = (x0, y0);
    for step in 1..=steps {
        let (x_prev, y_prev) = (x, y);
        let slopes = stepper.step(f, &mut x, &mut y, h)?;
        if !y.is_finite() {
            return Err(NumericError::InvalidInput(format!(
                "solution diverged at step {step}: stepping from x = {x_prev}, y = {y_prev} gave y = {y}."
            )));
        }
        points.push(OdePoint { step, x, y, slopes });
    }

    Ok(OdeSolution { method, points })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(x: f64, y: f64) -> f64 {
        x + y
    }

    // Exact solution of y' = x + y, y(0) = 1.
    fn exact(x: f64) -> f64 {
        2.0 * x.exp() - x - 1.0
    }

    #[test]
    fn rk4_matches_reference_value() {
        let solution = rk4(&linear, 0.0, 1.0, 0.1, 10).expect("rk4");
        let (x, y) = solution.end().expect("end point");
        assert!((x - 1.0).abs() < 1e-12);
        assert!((y - 3.4366).abs() < 1e-4);
        assert!((y - exact(1.0)).abs() < 2e-5);
        assert_eq!(solution.points.len(), 11);
        assert_eq!(solution.points[1].slopes.len(), 4);
        assert_eq!(solution.points[1].slopes[0], 1.0);
    }

    #[test]
    fn euler_is_less_accurate_than_rk4() {
        let euler = euler(&linear, 0.0, 1.0, 0.1, 10).expect("euler");
        let (_, y) = euler.end().expect("end point");
        // 2·1.1¹⁰ - 2
        assert!((y - 3.1875).abs() < 1e-4);
        assert_eq!(euler.points[3].slopes.len(), 1);

        let rk4 = rk4(&linear, 0.0, 1.0, 0.1, 10).expect("rk4");
        let (_, y_rk4) = rk4.end().expect("end point");
        assert!((y_rk4 - exact(1.0)).abs() < (y - exact(1.0)).abs());
    }

    #[test]
    fn first_euler_step_by_hand() {
        let solution = euler(&linear, 0.0, 1.0, 0.1, 1).expect("euler");
        let p = &solution.points[1];
        assert_eq!(p.step, 1);
        assert!((p.x - 0.1).abs() < 1e-15);
        assert!((p.y - 1.1).abs() < 1e-15);
    }

    #[test]
    fn negative_step_integrates_backwards() {
        let solution = rk4(&|_x: f64, y: f64| y, 0.0, 1.0, -0.1, 10).expect("rk4");
        let (x, y) = solution.end().expect("end point");
        assert!((x + 1.0).abs() < 1e-12);
        assert!((y - (-1.0_f64).exp()).abs() < 1e-5);
    }

    #[test]
    fn step_limit_is_enforced() {
        assert_eq!(
            euler(&linear, 0.0, 1.0, 0.001, MAX_ODE_STEPS + 1).expect_err("too many steps"),
            NumericError::StepLimitExceeded {
                requested: 501,
                limit: 500
            }
        );
        assert!(euler(&linear, 0.0, 1.0, 0.001, MAX_ODE_STEPS).is_ok());
    }

    #[test]
    fn blow_up_is_reported_as_divergence() {
        // The slope stays finite at step 1 (1e302), the update overflows at step 2.
        let err =
            euler(&|_x: f64, y: f64| y * y * 1e300, 0.0, 10.0, 1.0, 5).expect_err("overflow");
        match err {
            NumericError::InvalidInput(message) => {
                assert!(message.contains("diverged at step 2"), "{message}");
            }
            other => panic!("expected a divergence error, got {other:?}"),
        }
    }
}
