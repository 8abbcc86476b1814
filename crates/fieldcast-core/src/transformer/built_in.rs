//! Built-in transformers for common conversions
//!
//! Every transformer here except [`CommaSeparatedToList`] declares a default
//! type pair, and [`default_transformers`] returns one instance of each for
//! registration as defaults. All of them pass a null input through unchanged.
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

use super::{TransformContext, Transformer};
use crate::error::TransformError;
use crate::types::{Value, ValueType};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

fn unsupported(expected: ValueType, found: &Value, to: ValueType) -> TransformError {
    TransformError::UnsupportedInput {
        expected: expected.to_string(),
        found: found.type_label().to_string(),
        to: to.to_string(),
    }
}

/// Renders any value through its `Display` form
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyToString;

impl Transformer for AnyToString {
    fn transform(&self, value: Value, _context: &TransformContext<'_>) -> Result<Value, TransformError> {
        Ok(match value {
            Value::Null => Value::Null,
            Value::String(s) => Value::String(s),
            other => Value::String(other.to_string()),
        })
    }

    fn default_types(&self) -> Option<(ValueType, ValueType)> {
        Some((ValueType::Any, ValueType::String))
    }
}

/// `"true"` in any case becomes `true`, everything else `false`
#[derive(Debug, Default, Clone, Copy)]
pub struct StringToBoolean;

impl Transformer for StringToBoolean {
    fn transform(&self, value: Value, _context: &TransformContext<'_>) -> Result<Value, TransformError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(s) => Ok(Value::Boolean(s.eq_ignore_ascii_case("true"))),
            other => Err(unsupported(ValueType::String, &other, ValueType::Boolean)),
        }
    }

    fn default_types(&self) -> Option<(ValueType, ValueType)> {
        Some((ValueType::String, ValueType::Boolean))
    }
}

/// First character of the string
#[derive(Debug, Default, Clone, Copy)]
pub struct StringToChar;

impl Transformer for StringToChar {
    fn transform(&self, value: Value, _context: &TransformContext<'_>) -> Result<Value, TransformError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(s) => s.chars().next().map(Value::Char).ok_or_else(|| TransformError::Conversion {
                value: s.clone(),
                to: ValueType::Char.to_string(),
                reason: "string is empty".to_string(),
            }),
            other => Err(unsupported(ValueType::String, &other, ValueType::Char)),
        }
    }

    fn default_types(&self) -> Option<(ValueType, ValueType)> {
        Some((ValueType::String, ValueType::Char))
    }
}

macro_rules! string_parser {
    ($(#[$doc:meta])* $name:ident => $ty:ty, $variant:ident) => {
        $(#[$doc])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl Transformer for $name {
            fn transform(&self, value: Value, _context: &TransformContext<'_>) -> Result<Value, TransformError> {
                match value {
                    Value::Null => Ok(Value::Null),
                    Value::String(s) => s.parse::<$ty>().map(Value::$variant).map_err(|e| {
                        TransformError::Conversion {
                            value: s.clone(),
                            to: ValueType::$variant.to_string(),
                            reason: e.to_string(),
                        }
                    }),
                    other => Err(unsupported(ValueType::String, &other, ValueType::$variant)),
                }
            }

            fn default_types(&self) -> Option<(ValueType, ValueType)> {
                Some((ValueType::String, ValueType::$variant))
            }
        }
    };
}

string_parser!(
    /// Parses a decimal `i16`
    StringToShort => i16, Short
);
string_parser!(
    /// Parses a decimal `i32`
    StringToInt => i32, Int
);
string_parser!(
    /// Parses a decimal `i64`
    StringToLong => i64, Long
);
string_parser!(StringToFloat => f32, Float);
string_parser!(StringToDouble => f64, Double);

/// Milliseconds since the Unix epoch to a date
#[derive(Debug, Default, Clone, Copy)]
pub struct LongToDate;

impl Transformer for LongToDate {
    fn transform(&self, value: Value, _context: &TransformContext<'_>) -> Result<Value, TransformError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Long(millis) => Utc
                .timestamp_millis_opt(millis)
                .single()
                .map(Value::Date)
                .ok_or_else(|| TransformError::Conversion {
                    value: millis.to_string(),
                    to: ValueType::Date.to_string(),
                    reason: "timestamp out of range".to_string(),
                }),
            other => Err(unsupported(ValueType::Long, &other, ValueType::Date)),
        }
    }

    fn default_types(&self) -> Option<(ValueType, ValueType)> {
        Some((ValueType::Long, ValueType::Date))
    }
}

/// A date to milliseconds since the Unix epoch
#[derive(Debug, Default, Clone, Copy)]
pub struct DateToLong;

impl Transformer for DateToLong {
    fn transform(&self, value: Value, _context: &TransformContext<'_>) -> Result<Value, TransformError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Date(date) => Ok(Value::Long(date.timestamp_millis())),
            other => Err(unsupported(ValueType::Date, &other, ValueType::Long)),
        }
    }

    fn default_types(&self) -> Option<(ValueType, ValueType)> {
        Some((ValueType::Date, ValueType::Long))
    }
}

/// Numeric value to the character with that code point
#[derive(Debug, Default, Clone, Copy)]
pub struct NumberToChar;

impl Transformer for NumberToChar {
    fn transform(&self, value: Value, _context: &TransformContext<'_>) -> Result<Value, TransformError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let code = value
            .as_i64()
            .ok_or_else(|| unsupported(ValueType::Number, &value, ValueType::Char))?;
        u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .map(Value::Char)
            .ok_or_else(|| TransformError::Conversion {
                value: code.to_string(),
                to: ValueType::Char.to_string(),
                reason: "not a valid code point".to_string(),
            })
    }

    fn default_types(&self) -> Option<(ValueType, ValueType)> {
        Some((ValueType::Number, ValueType::Char))
    }
}

// Integral targets wrap and floating sources truncate, like primitive casts.
macro_rules! number_cast {
    ($name:ident, $variant:ident, |$n:ident| $convert:expr) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl Transformer for $name {
            fn transform(&self, value: Value, _context: &TransformContext<'_>) -> Result<Value, TransformError> {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                let converted = {
                    let $n = &value;
                    $convert
                };
                converted
                    .map(Value::$variant)
                    .ok_or_else(|| unsupported(ValueType::Number, &value, ValueType::$variant))
            }

            fn default_types(&self) -> Option<(ValueType, ValueType)> {
                Some((ValueType::Number, ValueType::$variant))
            }
        }
    };
}

number_cast!(NumberToShort, Short, |n| n.as_i64().map(|v| v as i16));
number_cast!(NumberToInt, Int, |n| n.as_i64().map(|v| v as i32));
number_cast!(NumberToLong, Long, |n| n.as_i64());
number_cast!(NumberToFloat, Float, |n| n.as_f64().map(|v| v as f32));
number_cast!(NumberToDouble, Double, |n| n.as_f64());

/// Splits a comma separated string into a list of trimmed strings
///
/// Not a default transformer; select it explicitly on a rule.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommaSeparatedToList;

impl Transformer for CommaSeparatedToList {
    fn transform(&self, value: Value, _context: &TransformContext<'_>) -> Result<Value, TransformError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(s) if s.is_empty() => Ok(Value::List(Vec::new())),
            Value::String(s) => Ok(Value::List(
                s.split(',')
                    .map(|item| Value::String(item.trim().to_string()))
                    .collect(),
            )),
            other => Err(unsupported(ValueType::String, &other, ValueType::List)),
        }
    }
}

/// One instance of every built-in default transformer, in registration order
pub fn default_transformers() -> Vec<Arc<dyn Transformer>> {
    vec![
        Arc::new(AnyToString),
        Arc::new(StringToBoolean),
        Arc::new(StringToChar),
        Arc::new(StringToDouble),
        Arc::new(StringToFloat),
        Arc::new(StringToInt),
        Arc::new(StringToLong),
        Arc::new(StringToShort),
        Arc::new(LongToDate),
        Arc::new(DateToLong),
        Arc::new(NumberToChar),
        Arc::new(NumberToDouble),
        Arc::new(NumberToFloat),
        Arc::new(NumberToLong),
        Arc::new(NumberToShort),
        Arc::new(NumberToInt),
    ]
}
