use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of value a parameter holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// Free text.
    String,
    /// Integer or decimal number.
    Number,
    /// List of objects, e.g. ecommerce `items`.
    Array,
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParameterType::String => "string",
            ParameterType::Number => "number",
            ParameterType::Array => "array",
        })
    }
}

/// Value of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// A numeric value.
    Number(f64),
    /// A text value.
    String(String),
    /// A list value.
    Array(Vec<Value>),
}

impl ParameterValue {
    /// Convert to the JSON value sent to GA, coercing numeric text for `number` parameters.
    ///
    /// Returns `None` for empty text and for NaN or infinite numbers, which JSON cannot carry.
    /// GA treats both the same as a missing parameter.
    pub(crate) fn to_payload(&self, parameter_type: ParameterType) -> Option<Value> {
        match self {
            ParameterValue::String(s) if s.is_empty() => None,
            ParameterValue::String(s) if parameter_type == ParameterType::Number => {
                match s.trim().parse::<f64>() {
                    Ok(n) if n.is_finite() => Some(number_to_value(n)),
                    _ => Some(Value::String(s.clone())),
                }
            }
            ParameterValue::String(s) => Some(Value::String(s.clone())),
            ParameterValue::Number(n) if !n.is_finite() => None,
            ParameterValue::Number(n) => Some(number_to_value(*n)),
            ParameterValue::Array(a) => Some(Value::Array(a.clone())),
        }
    }
}

/// Whole numbers go out as integers so `"value": 3` does not become `"value": 3.0`.
///
/// `n` must be finite.
fn number_to_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Number(value)
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParameterValue {
                fn from(value: $t) -> Self {
                    ParameterValue::Number(value as f64)
                }
            }
        )*
    };
}

number_from!(f32, i32, i64, u32, u64, usize);

impl From<Vec<Value>> for ParameterValue {
    fn from(value: Vec<Value>) -> Self {
        ParameterValue::Array(value)
    }
}

/// A typed event parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Kind of value the parameter accepts.
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,

    /// Current value, if one was set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ParameterValue>,

    /// Whether GA requires the parameter.
    #[serde(default)]
    pub required: bool,
}

impl Parameter {
    /// An optional parameter without a value.
    pub fn new(parameter_type: ParameterType) -> Self {
        Parameter {
            parameter_type,
            value: None,
            required: false,
        }
    }

    /// Set the value.
    pub fn with_value(mut self, value: impl Into<ParameterValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub(crate) fn payload_value(&self) -> Option<Value> {
        self.value
            .as_ref()
            .and_then(|v| v.to_payload(self.parameter_type))
    }
}

/// Flat view of one parameter, as listed by [`MpEvent::get_parameters`].
///
/// [`MpEvent::get_parameters`]: crate::MpEvent::get_parameters
#[derive(Debug, Clone, PartialEq)]
pub struct EventParameter {
    /// Parameter name.
    pub parameter_name: String,
    /// Current value.
    pub parameter_value: Option<ParameterValue>,
    /// Kind of value the parameter accepts.
    pub parameter_type: ParameterType,
    /// Whether GA requires the parameter.
    pub required: bool,
}

/// A user property attached to the whole request rather than to one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProperty {
    /// Property name.
    pub name: String,

    /// Kind of value the property holds.
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,

    /// Current value, if one was set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ParameterValue>,
}

impl UserProperty {
    /// A property with a value.
    pub fn new(name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        let value = value.into();
        let parameter_type = match value {
            ParameterValue::Number(_) => ParameterType::Number,
            ParameterValue::String(_) => ParameterType::String,
            ParameterValue::Array(_) => ParameterType::Array,
        };
        UserProperty {
            name: name.into(),
            parameter_type,
            value: Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn serialization_format() {
        let parameter = Parameter {
            parameter_type: ParameterType::String,
            value: Some("USD".into()),
            required: true,
        };
        assert_eq!(
            r#"{"type":"string","value":"USD","required":true}"#,
            serde_json::to_string(&parameter).unwrap()
        );
        assert_eq!(
            r#"{"type":"number","required":false}"#,
            serde_json::to_string(&Parameter::new(ParameterType::Number)).unwrap()
        );
    }

    #[test]
    fn deserialize_defaults_required() {
        let parameter: Parameter = serde_json::from_str(r#"{"type":"array"}"#).unwrap();
        assert_eq!(Parameter::new(ParameterType::Array), parameter);
    }

    #[test]
    fn deserialize_untagged_values() {
        let parameter: Parameter =
            serde_json::from_str(r#"{"type":"array","value":[{"item_id":"a"}]}"#).unwrap();
        assert_eq!(
            Some(ParameterValue::Array(vec![json!({"item_id": "a"})])),
            parameter.value
        );
        let parameter: Parameter =
            serde_json::from_str(r#"{"type":"number","value":2.5}"#).unwrap();
        assert_eq!(Some(ParameterValue::Number(2.5)), parameter.value);
    }

    #[test_case(ParameterValue::from(""), ParameterType::String, None ; "empty string")]
    #[test_case(ParameterValue::from("USD"), ParameterType::String, Some(json!("USD")) ; "string")]
    #[test_case(ParameterValue::from("12"), ParameterType::Number, Some(json!(12)) ; "numeric text")]
    #[test_case(ParameterValue::from("1.5"), ParameterType::Number, Some(json!(1.5)) ; "decimal text")]
    #[test_case(ParameterValue::from("abc"), ParameterType::Number, Some(json!("abc")) ; "non numeric text")]
    #[test_case(ParameterValue::from("NaN"), ParameterType::Number, Some(json!("NaN")) ; "nan text")]
    #[test_case(ParameterValue::from("inf"), ParameterType::Number, Some(json!("inf")) ; "infinite text")]
    #[test_case(ParameterValue::from("1e400"), ParameterType::Number, Some(json!("1e400")) ; "overflowing text")]
    #[test_case(ParameterValue::from(3.0), ParameterType::Number, Some(json!(3)) ; "whole number")]
    #[test_case(ParameterValue::from(3), ParameterType::Number, Some(json!(3)) ; "integer")]
    #[test_case(ParameterValue::Number(f64::NAN), ParameterType::Number, None ; "nan")]
    #[test_case(ParameterValue::Number(f64::INFINITY), ParameterType::Number, None ; "infinity")]
    #[test_case(ParameterValue::from(vec![json!(1)]), ParameterType::Array, Some(json!([1])) ; "array")]
    fn to_payload(value: ParameterValue, parameter_type: ParameterType, expected: Option<Value>) {
        assert_eq!(expected, value.to_payload(parameter_type));
    }

    #[test]
    fn user_property_infers_type() {
        let property = UserProperty::new("tier", 2.0);
        assert_eq!(ParameterType::Number, property.parameter_type);
        assert_eq!(
            r#"{"name":"tier","type":"number","value":2.0}"#,
            serde_json::to_string(&property).unwrap()
        );
    }
}
