//! Expression evaluation backed by a JavaScript `compile` callback.
//!
//! The host passes `compile(expression, names)`, which must return a function
//! `(bindings) => number | [re, im]`. `bindings` is a plain object keyed by
//! variable name; complex arguments arrive as `[re, im]` pairs.

use js_sys::{Array, Function, Object, Reflect};
use num_complex::Complex64;
use numlab_core::error::EvaluationError;
use numlab_core::traits::{CompiledFunction, ExpressionEvaluator, Value};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::{JsCast, JsValue};

pub struct JsEvaluator {
    compile: Function,
}

impl JsEvaluator {
    pub fn new(compile: Function) -> Self {
        Self { compile }
    }
}

pub struct JsCompiled {
    expression: String,
    function: Function,
}

fn host_error(context: &str, err: JsValue) -> EvaluationError {
    let message = err
        .as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"));
    EvaluationError::Host(format!("{context}: {message}"))
}

impl ExpressionEvaluator for JsEvaluator {
    type Compiled = JsCompiled;

    fn compile(
        &self,
        expression: &str,
        free_variables: &[&str],
    ) -> Result<JsCompiled, EvaluationError> {
        let names: Array = free_variables.iter().map(|n| JsValue::from_str(n)).collect();
        let function = self
            .compile
            .call2(&JsValue::NULL, &JsValue::from_str(expression), &names)
            .map_err(|e| host_error(&format!("cannot compile `{expression}`"), e))?;
        let function = function.dyn_into::<Function>().map_err(|_| {
            EvaluationError::Host(format!(
                "compile(`{expression}`) did not return a function."
            ))
        })?;
        Ok(JsCompiled {
            expression: expression.to_string(),
            function,
        })
    }
}

fn to_js(value: Value) -> Result<JsValue, EvaluationError> {
    match value {
        Value::Real(v) => Ok(JsValue::from_f64(v)),
        Value::Complex(z) => {
            to_value(&z).map_err(|e| EvaluationError::Host(format!("Serialization error: {e}")))
        }
    }
}

fn from_js(result: JsValue) -> Result<Value, EvaluationError> {
    if let Some(v) = result.as_f64() {
        return Ok(Value::Real(v));
    }
    from_value::<Complex64>(result)
        .map(Value::Complex)
        .map_err(|e| EvaluationError::Host(format!("expected a number or [re, im]: {e}")))
}

impl CompiledFunction for JsCompiled {
    fn evaluate(&self, bindings: &[(&str, Value)]) -> Result<Value, EvaluationError> {
        let args = Object::new();
        for (name, value) in bindings {
            Reflect::set(&args, &JsValue::from_str(name), &to_js(*value)?)
                .map_err(|e| host_error("cannot bind arguments", e))?;
        }
        let result = self
            .function
            .call1(&JsValue::NULL, &args)
            .map_err(|e| host_error(&format!("evaluating `{}`", self.expression), e))?;
        from_js(result)
    }
}
