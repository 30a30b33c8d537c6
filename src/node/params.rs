use crate::error::NodeError;
use serde_json::{Map, Value as JsonValue};
use std::ops::RangeInclusive;

/// Node parameters as submitted with the pipeline.
///
/// Accessors are lenient: a missing or `null` entry yields the default, and
/// numbers may arrive as strings. Values that cannot be coerced are reported as
/// `NodeError::InvalidParameter`.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    values: &'a Map<String, JsonValue>,
}

impl<'a> Params<'a> {
    pub fn new(values: &'a Map<String, JsonValue>) -> Self {
        Self { values }
    }

    pub fn raw(&self, name: &str) -> Option<&'a JsonValue> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn f64_or(&self, name: &str, default: f64) -> Result<f64, NodeError> {
        match self.raw(name) {
            None => Ok(default),
            Some(value) => as_f64(value).ok_or_else(|| invalid(name, value, "a number")),
        }
    }

    /// Reads an integer parameter. Fractional values are truncated toward zero.
    pub fn i64_or(&self, name: &str, default: i64) -> Result<i64, NodeError> {
        match self.raw(name) {
            None => Ok(default),
            Some(value) => as_f64(value)
                .filter(|x| x.is_finite())
                .map(|x| x.trunc() as i64)
                .ok_or_else(|| invalid(name, value, "an integer")),
        }
    }

    /// Reads a non-negative integer parameter.
    pub fn usize_or(&self, name: &str, default: usize) -> Result<usize, NodeError> {
        let value = self.i64_or(name, default as i64)?;
        usize::try_from(value).map_err(|_| NodeError::InvalidParameter {
            name: name.to_string(),
            message: format!("expected a non-negative integer, got {}", value),
        })
    }

    /// Reads a non-negative integer parameter that must lie within `range`.
    pub fn usize_in(
        &self,
        name: &str,
        default: usize,
        range: RangeInclusive<usize>,
    ) -> Result<usize, NodeError> {
        let value = self.usize_or(name, default)?;
        if range.contains(&value) {
            Ok(value)
        } else {
            Err(NodeError::InvalidParameter {
                name: name.to_string(),
                message: format!("{} is outside {}..={}", value, range.start(), range.end()),
            })
        }
    }

    pub fn str_or(&self, name: &str, default: &'a str) -> Result<&'a str, NodeError> {
        match self.raw(name) {
            None => Ok(default),
            Some(JsonValue::String(s)) => Ok(s.as_str()),
            Some(value) => Err(invalid(name, value, "a string")),
        }
    }

    /// Reads a string parameter that must be one of `options`.
    pub fn choice_or(
        &self,
        name: &str,
        default: &'a str,
        options: &[&str],
    ) -> Result<&'a str, NodeError> {
        let value = self.str_or(name, default)?;
        if options.contains(&value) {
            Ok(value)
        } else {
            Err(NodeError::InvalidParameter {
                name: name.to_string(),
                message: format!("'{}' is not one of {}", value, options.join(", ")),
            })
        }
    }
}

fn as_f64(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn invalid(name: &str, value: &JsonValue, expected: &str) -> NodeError {
    NodeError::InvalidParameter {
        name: name.to_string(),
        message: format!("expected {}, got {}", expected, value),
    }
}
