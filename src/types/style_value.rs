use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::{Color, ExprError, ExprResult};

/// The closed set of types a style expression can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Boolean,
    Number,
    String,
    Color,
    NumberArray,
    Size,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Color => "color",
            ValueType::NumberArray => "number[]",
            ValueType::Size => "size",
        };
        write!(f, "{}", name)
    }
}

/// A typed style value.
///
/// `Undefined` is produced only by accessor misses and unset context
/// readers; it is never the result of literal coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StyleValue {
    Boolean(bool),
    Number(f64),
    String(String),
    Color(Color),
    NumberArray(Vec<f64>),
    Size([f64; 2]),
    Undefined,
}

impl StyleValue {
    pub fn from_bool(val: bool) -> StyleValue {
        StyleValue::Boolean(val)
    }

    pub fn from_number(val: f64) -> StyleValue {
        StyleValue::Number(val)
    }

    pub fn from_string(val: String) -> StyleValue {
        StyleValue::String(val)
    }

    pub fn from_str(val: &str) -> StyleValue {
        StyleValue::String(val.to_owned())
    }

    pub fn from_color(val: Color) -> StyleValue {
        StyleValue::Color(val)
    }

    pub fn from_numbers(val: Vec<f64>) -> StyleValue {
        StyleValue::NumberArray(val)
    }

    pub fn from_size(width: f64, height: f64) -> StyleValue {
        StyleValue::Size([width, height])
    }

    pub fn as_type(&self) -> Option<ValueType> {
        match self {
            StyleValue::Boolean(_) => Some(ValueType::Boolean),
            StyleValue::Number(_) => Some(ValueType::Number),
            StyleValue::String(_) => Some(ValueType::String),
            StyleValue::Color(_) => Some(ValueType::Color),
            StyleValue::NumberArray(_) => Some(ValueType::NumberArray),
            StyleValue::Size(_) => Some(ValueType::Size),
            StyleValue::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, StyleValue::Undefined)
    }

    /// Numeric view used by the arithmetic and comparison operators.
    /// Anything that is not a number reads as NaN and propagates through
    /// IEEE-754 semantics.
    pub fn as_number(&self) -> f64 {
        match self {
            StyleValue::Number(val) => *val,
            _ => f64::NAN,
        }
    }

    /// Truthiness as observed by `!`, `all` and `any`: `true` and
    /// positive numbers are truthy, everything else is falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            StyleValue::Boolean(val) => *val,
            StyleValue::Number(val) => *val > 0.0,
            _ => false,
        }
    }

    /// String view used by `concat` and `to-string`, following the same
    /// forms as literal coercion. `Undefined` reads as the empty string.
    pub fn to_display_string(&self) -> String {
        match self {
            StyleValue::Boolean(val) => val.to_string(),
            StyleValue::Number(val) => val.to_string(),
            StyleValue::String(val) => val.clone(),
            StyleValue::Color(val) => val.to_string(),
            StyleValue::NumberArray(vals) => join_numbers(vals),
            StyleValue::Size(vals) => join_numbers(vals),
            StyleValue::Undefined => String::new(),
        }
    }

    /// Coerce a raw encoded primitive into the declared type, per the
    /// literal coercion table.
    pub fn coerce(raw: &Value, ty: ValueType) -> ExprResult<StyleValue> {
        match ty {
            ValueType::Boolean => match raw {
                Value::Bool(val) => Ok(StyleValue::Boolean(*val)),
                Value::Number(val) => Ok(StyleValue::Boolean(number_of(val) != 0.0)),
                Value::String(val) => Ok(StyleValue::Boolean(!val.is_empty())),
                Value::Null => Ok(StyleValue::Boolean(false)),
                Value::Object(_) => Ok(StyleValue::Boolean(true)),
                Value::Array(_) => Err(shape_error("a boolean", raw)),
            },
            ValueType::Number => match raw {
                Value::Number(val) => Ok(StyleValue::Number(number_of(val))),
                Value::String(val) => match val.trim().parse::<f64>() {
                    Ok(parsed) if !parsed.is_nan() => Ok(StyleValue::Number(parsed)),
                    _ => Err(shape_error("a number", raw)),
                },
                _ => Err(shape_error("a number", raw)),
            },
            ValueType::String => match raw {
                Value::Bool(val) => Ok(StyleValue::String(val.to_string())),
                Value::Number(val) => Ok(StyleValue::String(number_of(val).to_string())),
                Value::String(val) => Ok(StyleValue::String(val.clone())),
                Value::Array(items) => {
                    let mut parts = Vec::with_capacity(items.len());
                    for item in items.iter() {
                        match StyleValue::coerce(item, ValueType::String)? {
                            StyleValue::String(part) => parts.push(part),
                            _ => unreachable!(),
                        }
                    }
                    Ok(StyleValue::String(parts.join(",")))
                }
                _ => Err(shape_error("a string", raw)),
            },
            ValueType::Color => match raw {
                Value::String(val) => match Color::from_css(val) {
                    Some(color) => Ok(StyleValue::Color(color)),
                    None => Err(ExprError::literal(&format!(
                        "failed to parse \"{}\" as color",
                        val
                    ))),
                },
                Value::Array(items) => match numbers_of(items) {
                    Some(channels) if channels.len() == 3 => Ok(StyleValue::Color(Color::opaque(
                        channels[0],
                        channels[1],
                        channels[2],
                    ))),
                    Some(channels) if channels.len() == 4 => Ok(StyleValue::Color(Color::new(
                        channels[0],
                        channels[1],
                        channels[2],
                        channels[3],
                    ))),
                    _ => Err(shape_error("a color", raw)),
                },
                _ => Err(shape_error("a color", raw)),
            },
            ValueType::NumberArray => match raw {
                Value::Array(items) => match numbers_of(items) {
                    Some(vals) => Ok(StyleValue::NumberArray(vals)),
                    None => Err(shape_error("an array of numbers", raw)),
                },
                _ => Err(shape_error("an array of numbers", raw)),
            },
            ValueType::Size => match raw {
                Value::Number(val) => {
                    let side = number_of(val);
                    Ok(StyleValue::Size([side, side]))
                }
                Value::Array(items) => match numbers_of(items) {
                    Some(vals) if vals.len() == 2 => Ok(StyleValue::Size([vals[0], vals[1]])),
                    _ => Err(shape_error("a size (two numbers)", raw)),
                },
                _ => Err(shape_error("a size (two numbers)", raw)),
            },
        }
    }
}

fn shape_error(shape: &str, raw: &Value) -> ExprError {
    ExprError::literal(&format!("expected {}, got {}", shape, raw))
}

fn number_of(val: &serde_json::Number) -> f64 {
    val.as_f64().unwrap_or(f64::NAN)
}

fn numbers_of(items: &[Value]) -> Option<Vec<f64>> {
    items.iter().map(|item| item.as_f64()).collect()
}

fn join_numbers(vals: &[f64]) -> String {
    vals.iter()
        .map(|val| val.to_string())
        .collect::<Vec<String>>()
        .join(",")
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::String(val) => write!(f, "\"{}\"", val),
            StyleValue::Undefined => write!(f, "undefined"),
            other => write!(f, "{}", other.to_display_string()),
        }
    }
}

impl From<bool> for StyleValue {
    fn from(val: bool) -> StyleValue {
        StyleValue::Boolean(val)
    }
}

impl From<f64> for StyleValue {
    fn from(val: f64) -> StyleValue {
        StyleValue::Number(val)
    }
}

impl From<i32> for StyleValue {
    fn from(val: i32) -> StyleValue {
        StyleValue::Number(val as f64)
    }
}

impl From<i64> for StyleValue {
    fn from(val: i64) -> StyleValue {
        StyleValue::Number(val as f64)
    }
}

impl From<u32> for StyleValue {
    fn from(val: u32) -> StyleValue {
        StyleValue::Number(val as f64)
    }
}

impl From<&str> for StyleValue {
    fn from(val: &str) -> StyleValue {
        StyleValue::String(val.to_owned())
    }
}

impl From<String> for StyleValue {
    fn from(val: String) -> StyleValue {
        StyleValue::String(val)
    }
}

impl From<Color> for StyleValue {
    fn from(val: Color) -> StyleValue {
        StyleValue::Color(val)
    }
}

impl From<Vec<f64>> for StyleValue {
    fn from(val: Vec<f64>) -> StyleValue {
        StyleValue::NumberArray(val)
    }
}

impl From<[f64; 2]> for StyleValue {
    fn from(val: [f64; 2]) -> StyleValue {
        StyleValue::Size(val)
    }
}

#[cfg(test)]
mod test {
    use super::{StyleValue, ValueType};
    use serde_json::json;

    #[test]
    fn test_number_to_size() {
        assert_eq!(
            StyleValue::coerce(&json!(4), ValueType::Size).unwrap(),
            StyleValue::Size([4.0, 4.0])
        );
    }

    #[test]
    fn test_array_to_string_joins() {
        assert_eq!(
            StyleValue::coerce(&json!([1, "a", true]), ValueType::String).unwrap(),
            StyleValue::String("1,a,true".to_owned())
        );
    }

    #[test]
    fn test_bad_number_message() {
        let err = StyleValue::coerce(&json!("abc"), ValueType::Number).unwrap_err();
        assert_eq!(err.message(), "expected a number, got \"abc\"");
    }

    #[test]
    fn test_color_from_short_array() {
        let err = StyleValue::coerce(&json!([0, 255]), ValueType::Color).unwrap_err();
        assert_eq!(err.message(), "expected a color, got [0,255]");
    }

    #[test]
    fn test_boolean_fallbacks() {
        assert_eq!(
            StyleValue::coerce(&json!(null), ValueType::Boolean).unwrap(),
            StyleValue::Boolean(false)
        );
        assert_eq!(
            StyleValue::coerce(&json!({"any": 1}), ValueType::Boolean).unwrap(),
            StyleValue::Boolean(true)
        );
        assert_eq!(
            StyleValue::coerce(&json!(""), ValueType::Boolean).unwrap(),
            StyleValue::Boolean(false)
        );
        assert_eq!(
            StyleValue::coerce(&json!(0), ValueType::Boolean).unwrap(),
            StyleValue::Boolean(false)
        );
    }
}
