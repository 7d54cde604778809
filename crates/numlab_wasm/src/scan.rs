//! Stepped bracket scan runner.
//!
//! A scan over a wide interval can take thousands of evaluations, each one a
//! call back into JavaScript. The runner lets the host advance it in batches
//! and yield to the event loop in between.

use crate::evaluator::{JsCompiled, JsEvaluator};
use numlab_core::roots::BracketScanner;
use numlab_core::traits::{ExpressionEvaluator, Univariate};
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

/// Progress payload for the stepped bracket scan.
#[derive(Serialize)]
struct BracketScanProgress {
    done: bool,
    steps_done: usize,
    total_steps: usize,
    brackets_found: usize,
}

struct BracketScanState {
    function: JsCompiled,
    variable: String,
    scanner: BracketScanner,
}

impl BracketScanState {
    fn progress(&self) -> BracketScanProgress {
        BracketScanProgress {
            done: self.scanner.is_done(),
            steps_done: self.scanner.steps_done(),
            total_steps: self.scanner.total_steps(),
            brackets_found: self.scanner.brackets().len(),
        }
    }
}

#[wasm_bindgen]
pub struct WasmBracketScanRunner {
    state: Option<BracketScanState>,
}

#[wasm_bindgen]
impl WasmBracketScanRunner {
    #[wasm_bindgen(constructor)]
    pub fn new(
        expression: &str,
        variable: &str,
        start: f64,
        end: f64,
        step: f64,
        compile: js_sys::Function,
    ) -> Result<WasmBracketScanRunner, JsValue> {
        console_error_panic_hook::set_once();

        let scanner = BracketScanner::new(start, end, step)
            .map_err(|e| JsValue::from_str(&format!("Invalid scan: {}", e)))?;
        let function = JsEvaluator::new(compile)
            .compile(expression, &[variable])
            .map_err(|e| JsValue::from_str(&format!("{}", e)))?;

        Ok(WasmBracketScanRunner {
            state: Some(BracketScanState {
                function,
                variable: variable.to_string(),
                scanner,
            }),
        })
    }

    pub fn is_done(&self) -> bool {
        self.state
            .as_ref()
            .map_or(true, |state| state.scanner.is_done())
    }

    pub fn run_steps(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        let f = Univariate::new(&state.function, &state.variable);
        state
            .scanner
            .advance(&f, batch_size as usize)
            .map_err(|e| JsValue::from_str(&format!("Bracket scan failed: {}", e)))?;

        to_value(&state.progress())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn get_progress(&self) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        to_value(&state.progress())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn get_result(&self) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        if !state.scanner.is_done() {
            return Err(JsValue::from_str("Bracket scan has not finished yet."));
        }

        to_value(state.scanner.brackets())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::WasmBracketScanRunner;
    use numlab_core::roots::Bracket;
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen_test::wasm_bindgen_test;

    /// Ignores the source and always compiles `x² - 2`.
    fn compile_square_minus_two() -> js_sys::Function {
        js_sys::Function::new_with_args(
            "expression, names",
            "return (bindings) => bindings[names[0]] * bindings[names[0]] - 2;",
        )
    }

    #[wasm_bindgen_test]
    fn scan_runs_in_batches() {
        let mut runner =
            WasmBracketScanRunner::new("x^2 - 2", "x", -3.0, 3.0, 0.5, compile_square_minus_two())
                .expect("runner");
        assert!(!runner.is_done());
        assert!(runner.get_result().is_err());

        runner.run_steps(4).expect("first batch");
        assert!(!runner.is_done());

        runner.run_steps(100).expect("second batch");
        assert!(runner.is_done());

        let brackets: Vec<Bracket> = from_value(runner.get_result().expect("result")).expect("brackets");
        assert_eq!(
            brackets,
            vec![
                Bracket { low: -1.5, high: -1.0 },
                Bracket { low: 1.0, high: 1.5 },
            ]
        );
    }

    #[wasm_bindgen_test]
    fn scan_rejects_reversed_interval() {
        let result =
            WasmBracketScanRunner::new("x^2 - 2", "x", 3.0, -3.0, 0.5, compile_square_minus_two());
        let message = result
            .err()
            .and_then(|err| err.as_string())
            .unwrap_or_default();
        assert!(message.contains("Invalid scan"));
    }
}
