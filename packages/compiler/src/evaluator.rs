//! Evaluation of literal css call arguments
//!
//! Nothing is executed: objects, arrays and scalars map directly to JSON, and
//! a function argument is applied to the registry input by substituting its
//! parameter. `input.keyframes(frames)` is the only callable.

use crate::error::{EvalError, EvalResult};
use crate::parser::{CallKind, Expr, Property};
use serde_json::{Map, Number, Value};
use swatch_engine::{Css, Keyframes, StyleMap};
use tracing::debug;

pub struct Evaluator<'a> {
    css: &'a mut Css,
    param: Option<String>,
    input: Value,
}

impl<'a> Evaluator<'a> {
    pub fn new(css: &'a mut Css) -> Self {
        let input = Value::Object(css.input().clone());
        Self {
            css,
            param: None,
            input,
        }
    }

    /// Run a `make` or `extend` call; returns the value that replaces it
    pub fn evaluate_call(&mut self, kind: CallKind, argument: Option<&Expr>) -> EvalResult<Value> {
        let Some(argument) = argument else {
            return Ok(Value::Object(Map::new()));
        };
        let value = self.evaluate_argument(argument)?;

        match kind {
            CallKind::Make => {
                let styles: StyleMap = serde_json::from_value(value)
                    .map_err(|e| EvalError::InvalidStyles(e.to_string()))?;
                let classes = self.css.make(&styles);
                debug!(keys = classes.len(), "evaluated css.make");
                serde_json::to_value(classes).map_err(|e| EvalError::InvalidStyles(e.to_string()))
            }
            CallKind::Extend => {
                let Value::Object(values) = value else {
                    return Err(EvalError::Unsupported("extend needs an object".to_string()));
                };
                let values = self.css.extend(values);
                // later functions see the new values
                self.input = Value::Object(self.css.input().clone());
                debug!(keys = values.len(), "evaluated css.extend");
                Ok(Value::Object(values))
            }
        }
    }

    /// Value of a call argument: a function is applied to the input
    pub fn evaluate_argument(&mut self, argument: &Expr) -> EvalResult<Value> {
        match argument {
            Expr::Function { param, body } => {
                self.param = param.clone();
                let result = self.evaluate(body);
                self.param = None;
                result
            }
            other => self.evaluate(other),
        }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Object(properties) => {
                let mut object = Map::new();
                for property in properties {
                    match property {
                        Property::Entry(key, value) => {
                            object.insert(key.clone(), self.evaluate(value)?);
                        }
                        Property::Spread(inner) => match self.evaluate(inner)? {
                            Value::Object(spread) => object.extend(spread),
                            Value::Null => {}
                            _ => return Err(EvalError::InvalidSpread),
                        },
                    }
                }
                Ok(Value::Object(object))
            }
            Expr::Array(items) => items
                .iter()
                .map(|item| self.evaluate(item))
                .collect::<EvalResult<Vec<_>>>()
                .map(Value::Array),
            Expr::String(text) => Ok(Value::String(text.clone())),
            Expr::Number(value) => number(*value),
            Expr::Bool(value) => Ok(Value::Bool(*value)),
            Expr::Null => Ok(Value::Null),
            Expr::Neg(inner) => match self.evaluate(inner)? {
                Value::Number(value) => number(-value.as_f64().unwrap_or_default()),
                _ => Err(EvalError::Unsupported("negation of a non-number".to_string())),
            },
            Expr::Ident(name) => self.lookup(name),
            Expr::Member { object, property } => Ok(match self.evaluate(object)? {
                Value::Object(mut fields) => fields.remove(property).unwrap_or(Value::Null),
                Value::Array(mut items) => match property.parse::<usize>() {
                    Ok(index) if index < items.len() => items.swap_remove(index),
                    _ => Value::Null,
                },
                _ => Value::Null,
            }),
            Expr::Call { callee, arguments } => self.call(callee, arguments),
            Expr::Function { .. } => Err(EvalError::Unsupported(
                "functions are only allowed as the call argument".to_string(),
            )),
        }
    }

    fn lookup(&self, name: &str) -> EvalResult<Value> {
        if self.param.as_deref() == Some(name) {
            return Ok(self.input.clone());
        }
        match name {
            "undefined" => Ok(Value::Null),
            _ => Err(EvalError::UnknownIdentifier(name.to_string())),
        }
    }

    fn call(&mut self, callee: &Expr, arguments: &[Expr]) -> EvalResult<Value> {
        let param = self.param.clone().unwrap_or_else(|| "input".to_string());

        let is_keyframes = matches!(
            callee,
            Expr::Member { object, property }
                if property == "keyframes" && matches!(object.as_ref(), Expr::Ident(name) if *name == param)
        );
        if !is_keyframes || self.param.is_none() {
            return Err(EvalError::UnsupportedCall(param));
        }

        let frames = match arguments.first() {
            Some(argument) => self.evaluate(argument)?,
            None => Value::Null,
        };
        let frames: Keyframes =
            serde_json::from_value(frames).map_err(|e| EvalError::InvalidStyles(e.to_string()))?;

        Ok(self
            .css
            .keyframes(&frames)
            .map(Value::String)
            .unwrap_or(Value::Null))
    }
}

fn number(value: f64) -> EvalResult<Value> {
    // integral values print without a fraction, as in JSON.stringify
    if value.fract() == 0.0 && value.abs() < 9e15 {
        return Ok(Value::Number(Number::from(value as i64)));
    }
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or(EvalError::InvalidNumber(value))
}
