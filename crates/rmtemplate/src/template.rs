//! Template evaluation
//!
//! Templates use Jinja syntax. A string that is a single `{{ expr }}`
//! placeholder evaluates to the native value of `expr`; any other template
//! string renders to text. Absent results are reported as `None` so callers
//! can drop the field instead of storing an empty placeholder.

use crate::error::{Error, Result};
use crate::types::{SetVal, has_markers};
use log::trace;
use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use serde_json::{Number, Value};
use std::fmt;

/// Evaluates template strings against a data context
pub struct Evaluator {
    lenient: Environment<'static>,
    strict: Environment<'static>,
}

impl Evaluator {
    pub fn new() -> Self {
        let mut lenient = Environment::new();
        lenient.set_undefined_behavior(UndefinedBehavior::Lenient);
        let mut strict = Environment::new();
        strict.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { lenient, strict }
    }

    /// Evaluate `template` against `context`
    ///
    /// With `fail_on_undefined` unset, references to absent variables (and
    /// attributes of absent values) evaluate to nothing instead of failing.
    /// An attribute lookup on an absent value makes the whole template
    /// absent, surrounding text included.
    pub fn evaluate(
        &self,
        template: &str,
        context: &Value,
        fail_on_undefined: bool,
    ) -> Result<Option<Value>> {
        if !has_markers(template) {
            return Ok(Some(Value::String(template.to_string())));
        }

        let env = if fail_on_undefined {
            &self.strict
        } else {
            &self.lenient
        };
        let template_error = |source| Error::Template {
            template: template.to_string(),
            source,
        };

        let outcome = match single_expression(template) {
            Some(expr) => env
                .compile_expression(expr)
                .and_then(|compiled| compiled.eval(context)),
            None => env.render_str(template, context).map(minijinja::Value::from),
        };
        let value = match outcome {
            Ok(value) => value,
            Err(e) if !fail_on_undefined && e.kind() == ErrorKind::UndefinedError => {
                trace!("'{template}' looked up an absent value: {e}");
                return Ok(None);
            }
            Err(e) => return Err(template_error(e)),
        };

        if value.is_undefined() {
            if fail_on_undefined {
                return Err(template_error(minijinja::Error::new(
                    ErrorKind::UndefinedError,
                    format!("'{}' is undefined", template.trim()),
                )));
            }
            return Ok(None);
        }
        let evaluated = serde_json::to_value(&value)?;

        Ok(normalize(evaluated))
    }

    /// Evaluate a command template, calling functions with `data` directly
    pub fn evaluate_setval(&self, setval: &SetVal, data: &Value) -> Result<Option<Value>> {
        match setval {
            SetVal::Literal(text) => self.evaluate(text, data, false),
            SetVal::Function(f) => Ok(Some(f(data)).filter(|value| !value.is_null())),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator").finish_non_exhaustive()
    }
}

/// Return the inner expression when one placeholder spans the whole string
fn single_expression(template: &str) -> Option<&str> {
    let inner = template.trim().strip_prefix("{{")?.strip_suffix("}}")?;
    if has_markers(inner) || inner.contains("}}") {
        return None;
    }
    let inner = inner.strip_prefix('-').unwrap_or(inner);
    let inner = inner.strip_suffix('-').unwrap_or(inner);
    Some(inner.trim())
}

fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(coerce_numeric(text)),
        other => Some(other),
    }
}

/// Interpret numeric-looking text, keeping the text when the number would
/// not print back identically
///
/// `"65000"` becomes an integer while `"65000.1000"` (an AS-DOT number) and
/// `"007"` stay strings.
pub fn coerce_numeric(text: String) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        if int.to_string() == text {
            return Value::from(int);
        }
    } else if let Ok(float) = text.parse::<f64>()
        && float.is_finite()
        && float.to_string() == text
        && let Some(number) = Number::from_f64(float)
    {
        return Value::Number(number);
    }
    Value::String(text)
}
