//! Bracketing root finders and the interval scan that produces brackets.

use crate::convergence::{
    percent, relative_change, ConvergenceResult, IterationRecorder, IterationSettings,
};
use crate::error::{ensure_finite, NumericError, NumericResult};
use crate::traits::RealFunction;
use serde::{Deserialize, Serialize};

/// Hard cap on evaluation steps for one scan.
pub const MAX_SCAN_STEPS: usize = 10_000;
/// Hard cap on brackets reported by one scan.
pub const MAX_BRACKETS: usize = 50;

/// An interval expected to contain a root, i.e. `f(low) * f(high) <= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub low: f64,
    pub high: f64,
}

/// Resumable left-to-right scan for sign changes.
///
/// A host that must stay responsive calls [`BracketScanner::advance`] with a
/// small batch and yields between calls. The step and bracket caps are
/// enforced regardless of how the scan is driven.
#[derive(Debug, Clone)]
pub struct BracketScanner {
    start: f64,
    end: f64,
    step: f64,
    steps_done: usize,
    total_steps: usize,
    previous: Option<(f64, f64)>,
    brackets: Vec<Bracket>,
    done: bool,
}

impl BracketScanner {
    pub fn new(start: f64, end: f64, step: f64) -> NumericResult<Self> {
        ensure_finite("start", start)?;
        ensure_finite("end", end)?;
        ensure_finite("step", step)?;
        if step <= 0.0 {
            return Err(NumericError::InvalidInput(format!(
                "scan step must be positive, got {step}."
            )));
        }
        if end <= start {
            return Err(NumericError::InvalidInput(format!(
                "scan end ({end}) must be greater than start ({start})."
            )));
        }

        let intervals = ((end - start) / step).ceil();
        let total_steps = if intervals >= MAX_SCAN_STEPS as f64 {
            MAX_SCAN_STEPS
        } else {
            intervals as usize
        };

        Ok(Self {
            start,
            end,
            step,
            steps_done: 0,
            total_steps,
            previous: None,
            brackets: Vec::new(),
            done: false,
        })
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn steps_done(&self) -> usize {
        self.steps_done
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    pub fn into_brackets(self) -> Vec<Bracket> {
        self.brackets
    }

    /// Node `i` of the scan grid; computed from `start` so rounding does not drift.
    fn node(&self, i: usize) -> f64 {
        (self.start + i as f64 * self.step).min(self.end)
    }

    /// Evaluates up to `batch` further intervals. Returns `true` once the scan
    /// has finished.
    pub fn advance<F: RealFunction + ?Sized>(&mut self, f: &F, batch: usize) -> NumericResult<bool> {
        if self.done {
            return Ok(true);
        }

        let (mut x1, mut f1) = match self.previous {
            Some(prev) => prev,
            None => {
                let x = self.node(0);
                (x, f.eval(x)?)
            }
        };

        for _ in 0..batch {
            if self.steps_done >= self.total_steps || self.brackets.len() >= MAX_BRACKETS {
                self.done = true;
                break;
            }

            let x2 = self.node(self.steps_done + 1);
            let f2 = f.eval(x2)?;
            self.steps_done += 1;

            // A root sitting exactly on a grid node is reported once.
            let repeats_node = f1 == 0.0
                && self
                    .brackets
                    .last()
                    .map_or(false, |last| last.high == x1);
            if f1 * f2 <= 0.0 && !repeats_node {
                self.brackets.push(Bracket { low: x1, high: x2 });
            }

            x1 = x2;
            f1 = f2;
        }

        if self.steps_done >= self.total_steps || self.brackets.len() >= MAX_BRACKETS {
            self.done = true;
        }
        self.previous = Some((x1, f1));
        Ok(self.done)
    }
}

/// Scans `[start, end]` in fixed steps and returns every interval over which
/// `f` changes sign.
pub fn incremental_search<F: RealFunction + ?Sized>(
    f: &F,
    start: f64,
    end: f64,
    step: f64,
) -> NumericResult<Vec<Bracket>> {
    let mut scanner = BracketScanner::new(start, end, step)?;
    scanner.advance(f, MAX_SCAN_STEPS)?;
    Ok(scanner.into_brackets())
}

fn opposite_signs(fa: f64, fb: f64) -> bool {
    fa * fb < 0.0
}

/// Evaluates both endpoints and checks the bracket precondition.
///
/// Returns `Ok(Some(root))` when an endpoint is already an exact root.
fn check_bracket<F: RealFunction + ?Sized>(
    f: &F,
    low: f64,
    high: f64,
    settings: &IterationSettings,
) -> NumericResult<(f64, f64, Option<f64>)> {
    settings.validate()?;
    ensure_finite("lower bound", low)?;
    ensure_finite("upper bound", high)?;
    let f_low = f.eval(low)?;
    let f_high = f.eval(high)?;
    if f_low == 0.0 {
        return Ok((f_low, f_high, Some(low)));
    }
    if f_high == 0.0 {
        return Ok((f_low, f_high, Some(high)));
    }
    if !opposite_signs(f_low, f_high) {
        return Err(NumericError::InvalidBracket {
            low,
            high,
            f_low,
            f_high,
        });
    }
    Ok((f_low, f_high, None))
}

/// Interval halving. Stops when `|f(c)| < tol` or the half-width drops below `tol`.
pub fn bisection<F: RealFunction + ?Sized>(
    f: &F,
    a: f64,
    b: f64,
    settings: &IterationSettings,
) -> NumericResult<ConvergenceResult<f64>> {
    let (f_first, f_second, exact) = check_bracket(f, a, b, settings)?;
    let mut recorder = IterationRecorder::new();
    if let Some(root) = exact {
        return Ok(recorder.converged(root));
    }

    let (mut a, mut fa, mut b) = if a <= b {
        (a, f_first, b)
    } else {
        (b, f_second, a)
    };
    let mut previous: Option<f64> = None;
    let mut c = a;

    for _ in 0..settings.max_iterations {
        c = 0.5 * (a + b);
        let fc = f.eval(c)?;
        let error = previous.map(|p| percent(relative_change(c, p)));
        recorder.record_bracket(vec![a, b, c], fc, error, b - a);

        if fc.abs() < settings.tolerance || 0.5 * (b - a) < settings.tolerance {
            return Ok(recorder.converged(c));
        }

        if fa.signum() == fc.signum() {
            a = c;
            fa = fc;
        } else {
            b = c;
        }
        previous = Some(c);
    }

    Ok(recorder.exhausted(c))
}

/// Regula falsi: like bisection, but splits at the secant through the bracket.
///
/// Uses the Illinois modification: when the same endpoint survives two steps
/// in a row its function value is halved, so a convex function cannot pin one
/// end of the bracket forever.
pub fn false_position<F: RealFunction + ?Sized>(
    f: &F,
    a: f64,
    b: f64,
    settings: &IterationSettings,
) -> NumericResult<ConvergenceResult<f64>> {
    let (mut fa, mut fb, exact) = check_bracket(f, a, b, settings)?;
    let mut recorder = IterationRecorder::new();
    if let Some(root) = exact {
        return Ok(recorder.converged(root));
    }

    let (mut a, mut b) = (a, b);
    let mut previous: Option<f64> = None;
    let mut c = a;
    // Which endpoint moved last: -1 for `a`, 1 for `b`.
    let mut moved = 0;

    for _ in 0..settings.max_iterations {
        c = (a * fb - b * fa) / (fb - fa);
        let fc = f.eval(c)?;
        let change = previous.map(|p| relative_change(c, p));
        recorder.record_bracket(vec![a, b, c], fc, change.map(percent), (b - a).abs());

        if fc.abs() < settings.tolerance || 0.5 * (b - a).abs() < settings.tolerance {
            return Ok(recorder.converged(c));
        }

        if fa.signum() == fc.signum() {
            a = c;
            fa = fc;
            if moved == -1 {
                fb *= 0.5;
            }
            moved = -1;
        } else {
            b = c;
            fb = fc;
            if moved == 1 {
                fa *= 0.5;
            }
            moved = 1;
        }
        previous = Some(c);
    }

    Ok(recorder.exhausted(c))
}
