//! Host-facing request/response layer.
//!
//! A [`Problem`] names an algorithm family, its inputs and (for function
//! based families) the expression source. [`solve`] compiles expressions with
//! the host's [`ExpressionEvaluator`], runs the algorithm and returns a
//! [`Solution`]. It keeps no state between calls.

use crate::calculus::{
    differentiate, integrate, DerivativeEstimate, DifferenceScheme, IntegrationMethod, Quadrature,
};
use crate::convergence::IterationSettings;
use crate::error::NumericResult;
use crate::interpolation::{interpolate, DataPoint, InterpolationMethod, InterpolationResult};
use crate::linalg::{solve_linear, LinearMethod, LinearOutput, Matrix};
use crate::ode::{solve_ode, OdeMethod, OdeSolution};
use crate::roots::{find_root, incremental_search, Bracket, RootMethod, RootOutput};
use crate::traits::{Bivariate, ExpressionEvaluator, RealFunction, Univariate};
use serde::{Deserialize, Serialize};

fn default_x() -> String {
    "x".to_string()
}

fn default_y() -> String {
    "y".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Problem {
    Root {
        expression: String,
        #[serde(default = "default_x")]
        variable: String,
        method: RootMethod,
        #[serde(default)]
        settings: IterationSettings,
    },
    Scan {
        expression: String,
        #[serde(default = "default_x")]
        variable: String,
        start: f64,
        end: f64,
        step: f64,
    },
    Linear {
        matrix: Matrix,
        method: LinearMethod,
    },
    Interpolation {
        points: Vec<DataPoint>,
        x: f64,
        method: InterpolationMethod,
    },
    Integration {
        expression: String,
        #[serde(default = "default_x")]
        variable: String,
        lower: f64,
        upper: f64,
        segments: usize,
        method: IntegrationMethod,
    },
    Differentiation {
        expression: String,
        #[serde(default = "default_x")]
        variable: String,
        x: f64,
        h: f64,
        scheme: DifferenceScheme,
    },
    Ode {
        expression: String,
        #[serde(default = "default_x")]
        x_name: String,
        #[serde(default = "default_y")]
        y_name: String,
        x0: f64,
        y0: f64,
        h: f64,
        steps: usize,
        method: OdeMethod,
    },
}

impl Problem {
    pub fn family(&self) -> &'static str {
        match self {
            Problem::Root { .. } => "root",
            Problem::Scan { .. } => "scan",
            Problem::Linear { .. } => "linear",
            Problem::Interpolation { .. } => "interpolation",
            Problem::Integration { .. } => "integration",
            Problem::Differentiation { .. } => "differentiation",
            Problem::Ode { .. } => "ode",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Solution {
    Root { output: RootOutput },
    Scan { brackets: Vec<Bracket> },
    Linear { output: LinearOutput },
    Interpolation { result: InterpolationResult },
    Integration { result: Quadrature },
    Differentiation { result: DerivativeEstimate },
    Ode { solution: OdeSolution },
}

pub fn solve<E: ExpressionEvaluator + ?Sized>(
    evaluator: &E,
    problem: &Problem,
) -> NumericResult<Solution> {
    log::debug!("solving {} problem", problem.family());

    let solution = match problem {
        Problem::Root {
            expression,
            variable,
            method,
            settings,
        } => {
            let f = evaluator.compile(expression, &[variable.as_str()])?;
            let derivative = match method {
                RootMethod::NewtonRaphson {
                    derivative: Some(source),
                    ..
                } => Some(evaluator.compile(source, &[variable.as_str()])?),
                _ => None,
            };
            let df = derivative.as_ref().map(|d| Univariate::new(d, variable));
            let output = find_root(
                &f,
                variable,
                df.as_ref().map(|d| d as &dyn RealFunction),
                method,
                settings,
            )?;
            Solution::Root { output }
        }
        Problem::Scan {
            expression,
            variable,
            start,
            end,
            step,
        } => {
            let compiled = evaluator.compile(expression, &[variable.as_str()])?;
            let f = Univariate::new(&compiled, variable);
            Solution::Scan {
                brackets: incremental_search(&f, *start, *end, *step)?,
            }
        }
        Problem::Linear { matrix, method } => Solution::Linear {
            output: solve_linear(matrix, method)?,
        },
        Problem::Interpolation { points, x, method } => Solution::Interpolation {
            result: interpolate(points, *x, *method)?,
        },
        Problem::Integration {
            expression,
            variable,
            lower,
            upper,
            segments,
            method,
        } => {
            let compiled = evaluator.compile(expression, &[variable.as_str()])?;
            let f = Univariate::new(&compiled, variable);
            Solution::Integration {
                result: integrate(&f, *lower, *upper, *segments, *method)?,
            }
        }
        Problem::Differentiation {
            expression,
            variable,
            x,
            h,
            scheme,
        } => {
            let compiled = evaluator.compile(expression, &[variable.as_str()])?;
            let f = Univariate::new(&compiled, variable);
            Solution::Differentiation {
                result: differentiate(&f, *x, *h, *scheme)?,
            }
        }
        Problem::Ode {
            expression,
            x_name,
            y_name,
            x0,
            y0,
            h,
            steps,
            method,
        } => {
            let compiled = evaluator.compile(expression, &[x_name.as_str(), y_name.as_str()])?;
            let f = Bivariate::new(&compiled, x_name, y_name);
            Solution::Ode {
                solution: solve_ode(&f, *x0, *y0, *h, *steps, *method)?,
            }
        }
    };
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EvaluationError, NumericError};
    use crate::traits::{CompiledFunction, Value};
    use num_complex::Complex64;

    /// A tiny evaluator over a fixed menu of expressions, bound by name.
    struct Menu;

    struct Compiled {
        source: String,
        names: Vec<String>,
    }

    impl CompiledFunction for Compiled {
        fn evaluate(&self, bindings: &[(&str, Value)]) -> Result<Value, EvaluationError> {
            let arg = |i: usize| -> Result<Complex64, EvaluationError> {
                let name = &self.names[i];
                bindings
                    .iter()
                    .find(|(n, _)| *n == name.as_str())
                    .map(|(_, v)| v.into_complex())
                    .ok_or_else(|| EvaluationError::UnknownVariable(name.clone()))
            };
            let z = match self.source.as_str() {
                "x^3 - x - 2" => {
                    let x = arg(0)?;
                    x * x * x - x - 2.0
                }
                "3x^2 - 1" => {
                    let x = arg(0)?;
                    x * x * 3.0 - 1.0
                }
                "x^2 + 1" => {
                    let x = arg(0)?;
                    x * x + 1.0
                }
                "x + y" => arg(0)? + arg(1)?,
                other => {
                    return Err(EvaluationError::Host(format!(
                        "unsupported expression `{other}`"
                    )))
                }
            };
            Ok(if z.im == 0.0 {
                Value::Real(z.re)
            } else {
                Value::Complex(z)
            })
        }
    }

    impl ExpressionEvaluator for Menu {
        type Compiled = Compiled;

        fn compile(
            &self,
            expression: &str,
            free_variables: &[&str],
        ) -> Result<Compiled, EvaluationError> {
            Ok(Compiled {
                source: expression.to_string(),
                names: free_variables.iter().map(|s| s.to_string()).collect(),
            })
        }
    }

    fn root_problem(method: RootMethod) -> Problem {
        Problem::Root {
            expression: "x^3 - x - 2".to_string(),
            variable: "x".to_string(),
            method,
            settings: IterationSettings::default(),
        }
    }

    fn real_root(solution: Solution) -> f64 {
        match solution {
            Solution::Root {
                output: RootOutput::Real(result),
            } => *result.value().expect("root"),
            other => panic!("unexpected solution {other:?}"),
        }
    }

    #[test]
    fn root_problem_runs_bisection() {
        let problem = root_problem(RootMethod::Bisection {
            lower: 1.0,
            upper: 2.0,
        });
        let root = real_root(solve(&Menu, &problem).expect("solve"));
        assert!((root - 1.5213797068).abs() < 1e-6);
    }

    #[test]
    fn newton_uses_compiled_derivative() {
        let problem = root_problem(RootMethod::NewtonRaphson {
            x0: 1.5,
            derivative: Some("3x^2 - 1".to_string()),
        });
        let root = real_root(solve(&Menu, &problem).expect("solve"));
        assert!((root - 1.5213797068).abs() < 1e-6);
    }

    #[test]
    fn muller_reports_complex_root() {
        let problem = Problem::Root {
            expression: "x^2 + 1".to_string(),
            variable: "x".to_string(),
            method: RootMethod::Muller {
                x0: Value::Real(0.5),
                x1: Value::Real(1.0),
                x2: Value::Real(1.5),
            },
            settings: IterationSettings::default(),
        };
        match solve(&Menu, &problem).expect("solve") {
            Solution::Root {
                output: RootOutput::Complex(result),
            } => {
                let z = result.value().expect("root");
                assert!((z.im.abs() - 1.0).abs() < 1e-6);
            }
            other => panic!("unexpected solution {other:?}"),
        }
    }

    #[test]
    fn ode_problem_binds_both_variables() {
        let problem = Problem::Ode {
            expression: "x + y".to_string(),
            x_name: "x".to_string(),
            y_name: "y".to_string(),
            x0: 0.0,
            y0: 1.0,
            h: 0.1,
            steps: 10,
            method: OdeMethod::Rk4,
        };
        match solve(&Menu, &problem).expect("solve") {
            Solution::Ode { solution } => {
                let (_, y) = solution.end().expect("end point");
                assert!((y - 3.4366).abs() < 1e-4);
            }
            other => panic!("unexpected solution {other:?}"),
        }
    }

    #[test]
    fn evaluator_errors_surface_unchanged() {
        let problem = Problem::Integration {
            expression: "sin(x)".to_string(),
            variable: "x".to_string(),
            lower: 0.0,
            upper: 1.0,
            segments: 4,
            method: IntegrationMethod::Simpson,
        };
        let err = solve(&Menu, &problem).expect_err("unknown expression");
        assert_eq!(
            err,
            NumericError::Evaluation(EvaluationError::Host("unsupported expression `sin(x)`".into()))
        );
    }

    #[test]
    fn problems_deserialize_from_tagged_json() {
        let json = r#"{
            "family": "root",
            "expression": "x^3 - x - 2",
            "method": { "method": "secant", "x0": 1.0, "x1": 2.0 }
        }"#;
        let problem: Problem = serde_json::from_str(json).expect("deserialize");
        assert_eq!(problem.family(), "root");
        assert!(matches!(
            &problem,
            Problem::Root { variable, settings, .. }
                if variable == "x" && *settings == IterationSettings::default()
        ));
        let root = real_root(solve(&Menu, &problem).expect("solve"));
        assert!((root - 1.5213797068).abs() < 1e-6);

        let json = r#"{
            "family": "interpolation",
            "points": [{"x": 0.0, "y": 1.0}, {"x": 1.0, "y": 3.0}],
            "x": 0.25,
            "method": "linear_spline"
        }"#;
        let problem: Problem = serde_json::from_str(json).expect("deserialize");
        match solve(&Menu, &problem).expect("solve") {
            Solution::Interpolation { result } => assert_eq!(result.value, 1.5),
            other => panic!("unexpected solution {other:?}"),
        }
    }

    #[test]
    fn linear_problem_round_trips_through_json() {
        let json = r#"{
            "family": "linear",
            "matrix": [[2.0, 1.0], [1.0, 3.0]],
            "method": { "method": "gaussian_elimination", "rhs": [3.0, 5.0] }
        }"#;
        let problem: Problem = serde_json::from_str(json).expect("deserialize");
        let solution = solve(&Menu, &problem).expect("solve");
        let text = serde_json::to_string(&solution).expect("serialize");
        assert!(text.contains(r#""family":"linear""#));
        assert!(text.contains(r#""output":"direct""#));
        let back: Solution = serde_json::from_str(&text).expect("deserialize solution");
        assert_eq!(back, solution);
    }

    #[test]
    fn solving_twice_gives_identical_output() {
        let problem = Problem::Scan {
            expression: "x^3 - x - 2".to_string(),
            variable: "x".to_string(),
            start: -3.0,
            end: 3.0,
            step: 0.25,
        };
        let first = serde_json::to_string(&solve(&Menu, &problem).expect("first")).expect("json");
        let second = serde_json::to_string(&solve(&Menu, &problem).expect("second")).expect("json");
        assert_eq!(first, second);
        assert!(first.contains(r#""low":1.5"#));
    }
}
