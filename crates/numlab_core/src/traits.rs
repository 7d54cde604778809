use crate::error::EvaluationError;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A number produced or consumed by the expression evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Real(f64),
    Complex(Complex64),
}

impl Value {
    /// Returns the real value, rejecting results with a non-zero imaginary part.
    pub fn into_real(self) -> Result<f64, EvaluationError> {
        match self {
            Value::Real(v) => Ok(v),
            Value::Complex(z) if z.im == 0.0 => Ok(z.re),
            Value::Complex(z) => Err(EvaluationError::ComplexResult { re: z.re, im: z.im }),
        }
    }

    pub fn into_complex(self) -> Complex64 {
        match self {
            Value::Real(v) => Complex64::new(v, 0.0),
            Value::Complex(z) => z,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<Complex64> for Value {
    fn from(value: Complex64) -> Self {
        Value::Complex(value)
    }
}

/// A compiled expression supplied by the host.
///
/// `bindings` maps each free variable name to the value it takes for this
/// evaluation. Implementations must be pure: the same bindings always give
/// the same result.
pub trait CompiledFunction {
    fn evaluate(&self, bindings: &[(&str, Value)]) -> Result<Value, EvaluationError>;
}

/// Turns expression source into [`CompiledFunction`]s. The engine itself never
/// parses; hosts implement this on top of whatever parser they already have.
pub trait ExpressionEvaluator {
    type Compiled: CompiledFunction;

    fn compile(
        &self,
        expression: &str,
        free_variables: &[&str],
    ) -> Result<Self::Compiled, EvaluationError>;
}

/// f: ℝ → ℝ
pub trait RealFunction {
    fn eval(&self, x: f64) -> Result<f64, EvaluationError>;
}

/// f: ℝ × ℝ → ℝ, the right-hand side of `dy/dx = f(x, y)`.
pub trait OdeFunction {
    fn eval(&self, x: f64, y: f64) -> Result<f64, EvaluationError>;
}

/// f: ℂ → ℂ
pub trait ComplexFunction {
    fn eval(&self, z: Complex64) -> Result<Complex64, EvaluationError>;
}

impl<F: Fn(f64) -> f64> RealFunction for F {
    fn eval(&self, x: f64) -> Result<f64, EvaluationError> {
        Ok(self(x))
    }
}

impl<F: Fn(f64, f64) -> f64> OdeFunction for F {
    fn eval(&self, x: f64, y: f64) -> Result<f64, EvaluationError> {
        Ok(self(x, y))
    }
}

impl<F: Fn(Complex64) -> Complex64> ComplexFunction for F {
    fn eval(&self, z: Complex64) -> Result<Complex64, EvaluationError> {
        Ok(self(z))
    }
}

/// Binds the single free variable of a compiled expression.
pub struct Univariate<'a, C: CompiledFunction + ?Sized> {
    function: &'a C,
    variable: &'a str,
}

impl<'a, C: CompiledFunction + ?Sized> Univariate<'a, C> {
    pub fn new(function: &'a C, variable: &'a str) -> Self {
        Self { function, variable }
    }
}

impl<C: CompiledFunction + ?Sized> RealFunction for Univariate<'_, C> {
    fn eval(&self, x: f64) -> Result<f64, EvaluationError> {
        self.function
            .evaluate(&[(self.variable, Value::Real(x))])?
            .into_real()
    }
}

impl<C: CompiledFunction + ?Sized> ComplexFunction for Univariate<'_, C> {
    fn eval(&self, z: Complex64) -> Result<Complex64, EvaluationError> {
        Ok(self
            .function
            .evaluate(&[(self.variable, Value::Complex(z))])?
            .into_complex())
    }
}

/// Binds the `(x, y)` pair of an ODE right-hand side.
pub struct Bivariate<'a, C: CompiledFunction + ?Sized> {
    function: &'a C,
    x_name: &'a str,
    y_name: &'a str,
}

impl<'a, C: CompiledFunction + ?Sized> Bivariate<'a, C> {
    pub fn new(function: &'a C, x_name: &'a str, y_name: &'a str) -> Self {
        Self {
            function,
            x_name,
            y_name,
        }
    }
}

impl<C: CompiledFunction + ?Sized> OdeFunction for Bivariate<'_, C> {
    fn eval(&self, x: f64, y: f64) -> Result<f64, EvaluationError> {
        self.function
            .evaluate(&[(self.x_name, Value::Real(x)), (self.y_name, Value::Real(y))])?
            .into_real()
    }
}
