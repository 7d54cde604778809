//! WASM bindings for the numlab engine.
//!
//! The host sends a JSON-shaped `Problem` plus a `compile` callback and gets a
//! JSON-shaped `Solution` back. Long bracket scans go through
//! [`WasmBracketScanRunner`] so the page stays responsive.

mod evaluator;
mod scan;

pub use evaluator::{JsCompiled, JsEvaluator};
pub use scan::WasmBracketScanRunner;

use anyhow::{anyhow, Context};
use numlab_core::convergence::IterationSettings;
use numlab_core::problem::{solve, Problem};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

fn run_problem(problem: JsValue, compile: js_sys::Function) -> anyhow::Result<JsValue> {
    let problem: Problem =
        from_value(problem).map_err(|e| anyhow!("Invalid problem: {}", e))?;
    let solution = solve(&JsEvaluator::new(compile), &problem)
        .with_context(|| format!("{} problem failed", problem.family()))?;
    to_value(&solution).map_err(|e| anyhow!("Serialization error: {}", e))
}

/// Solves one problem. `compile(expression, names)` must return a function
/// of a bindings object.
#[wasm_bindgen]
pub fn solve_problem(problem: JsValue, compile: js_sys::Function) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    run_problem(problem, compile).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

/// Default tolerance and iteration cap, for pre-filling host forms.
#[wasm_bindgen]
pub fn default_iteration_settings() -> Result<JsValue, JsValue> {
    to_value(&IterationSettings::default())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::solve_problem;
    use numlab_core::convergence::IterationSettings;
    use numlab_core::problem::{Problem, Solution};
    use numlab_core::roots::{RootMethod, RootOutput};
    use numlab_core::traits::Value;
    use serde_wasm_bindgen::{from_value, to_value};
    use wasm_bindgen_test::wasm_bindgen_test;

    /// Compiles through `new Function`, binding `names` as parameters.
    fn compile_with_js() -> js_sys::Function {
        js_sys::Function::new_with_args(
            "expression, names",
            "const f = new Function(...names, 'return ' + expression + ';');\n\
             return (bindings) => f(...names.map((n) => bindings[n]));",
        )
    }

    fn root_problem(expression: &str, method: RootMethod) -> wasm_bindgen::JsValue {
        let problem = Problem::Root {
            expression: expression.to_string(),
            variable: "x".to_string(),
            method,
            settings: IterationSettings::default(),
        };
        to_value(&problem).expect("problem")
    }

    #[wasm_bindgen_test]
    fn bisection_round_trips_through_js() {
        let problem = root_problem("x * x - 2", RootMethod::Bisection { lower: 1.0, upper: 2.0 });
        let solution: Solution =
            from_value(solve_problem(problem, compile_with_js()).expect("solve")).expect("solution");
        match solution {
            Solution::Root {
                output: RootOutput::Real(result),
            } => {
                assert!(result.is_converged());
                let root = *result.value().expect("root");
                assert!((root - 2f64.sqrt()).abs() < 1e-5);
            }
            other => panic!("unexpected solution {other:?}"),
        }
    }

    #[wasm_bindgen_test]
    fn muller_receives_complex_arguments() {
        // Real arithmetic on [re, im] pairs is meaningless, so this host
        // squares complex numbers explicitly.
        let compile = js_sys::Function::new_with_args(
            "expression, names",
            "return (b) => { const z = b[names[0]];\n\
             if (typeof z === 'number') { return z * z + 1; }\n\
             return [z[0] * z[0] - z[1] * z[1] + 1, 2 * z[0] * z[1]]; };",
        );
        let problem = root_problem(
            "x^2 + 1",
            RootMethod::Muller {
                x0: Value::Real(0.5),
                x1: Value::Real(1.0),
                x2: Value::Real(1.5),
            },
        );
        let solution: Solution =
            from_value(solve_problem(problem, compile).expect("solve")).expect("solution");
        match solution {
            Solution::Root {
                output: RootOutput::Complex(result),
            } => {
                let z = *result.value().expect("root");
                assert!(z.re.abs() < 1e-6);
                assert!((z.im.abs() - 1.0).abs() < 1e-6);
            }
            other => panic!("unexpected solution {other:?}"),
        }
    }

    #[wasm_bindgen_test]
    fn compile_failures_carry_context() {
        let compile = js_sys::Function::new_with_args(
            "expression, names",
            "throw new Error('unexpected token');",
        );
        let problem = root_problem("x +* 2", RootMethod::Secant { x0: 0.0, x1: 1.0 });
        let message = solve_problem(problem, compile)
            .err()
            .and_then(|err| err.as_string())
            .unwrap_or_default();
        assert!(message.contains("root problem failed"), "{message}");
        assert!(message.contains("unexpected token"), "{message}");
    }

    #[wasm_bindgen_test]
    fn invalid_problem_is_rejected() {
        let message = solve_problem(wasm_bindgen::JsValue::from_str("nope"), compile_with_js())
            .err()
            .and_then(|err| err.as_string())
            .unwrap_or_default();
        assert!(message.starts_with("Invalid problem"), "{message}");
    }
}
