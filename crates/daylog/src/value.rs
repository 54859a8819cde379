use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

/// A single item passed to a log call.
///
/// Scalars become part of the message text; maps are merged into the
/// record's structured data.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Map(BTreeMap<String, Value>),
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Str(s) => f.write_str(s),
            LogValue::Int(n) => write!(f, "{}", n),
            LogValue::Float(n) => write!(f, "{}", n),
            LogValue::Bool(b) => write!(f, "{}", b),
            LogValue::Map(map) => {
                let json = serde_json::to_string(map).unwrap_or_default();
                f.write_str(&json)
            }
        }
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::Str(s.to_string())
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::Str(s)
    }
}

impl From<&String> for LogValue {
    fn from(s: &String) -> Self {
        LogValue::Str(s.clone())
    }
}

impl From<bool> for LogValue {
    fn from(b: bool) -> Self {
        LogValue::Bool(b)
    }
}

impl From<f32> for LogValue {
    fn from(n: f32) -> Self {
        LogValue::Float(n as f64)
    }
}

impl From<f64> for LogValue {
    fn from(n: f64) -> Self {
        LogValue::Float(n)
    }
}

macro_rules! int_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for LogValue {
                fn from(n: $ty) -> Self {
                    LogValue::Int(n as i64)
                }
            }
        )*
    };
}

int_from!(i8, i16, i32, i64, u8, u16, u32, isize);

impl From<BTreeMap<String, Value>> for LogValue {
    fn from(map: BTreeMap<String, Value>) -> Self {
        LogValue::Map(map)
    }
}

impl From<Map<String, Value>> for LogValue {
    fn from(map: Map<String, Value>) -> Self {
        LogValue::Map(map.into_iter().collect())
    }
}

/// Message text and structured data extracted from a call's values.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Composed {
    pub message: String,
    pub data: Map<String, Value>,
}

/// Join scalar values into the message and merge maps into the data object.
///
/// Later map keys overwrite earlier ones.
pub(crate) fn compose(values: &[LogValue]) -> Composed {
    let mut composed = Composed::default();
    let mut parts = Vec::with_capacity(values.len());

    for value in values {
        match value {
            LogValue::Map(map) => {
                for (key, v) in map {
                    composed.data.insert(key.clone(), v.clone());
                }
            }
            scalar => parts.push(scalar.to_string()),
        }
    }

    composed.message = parts.join(" ");
    composed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_join_with_spaces() {
        let values = vec![
            LogValue::from("took"),
            LogValue::from(42),
            LogValue::from("ms"),
            LogValue::from(true),
            LogValue::from(1.5),
        ];
        let composed = compose(&values);
        assert_eq!(composed.message, "took 42 ms true 1.5");
        assert!(composed.data.is_empty());
    }

    #[test]
    fn test_maps_merge_into_data() {
        let mut first = BTreeMap::new();
        first.insert("user".to_string(), json!("ana"));
        first.insert("attempt".to_string(), json!(1));
        let mut second = BTreeMap::new();
        second.insert("attempt".to_string(), json!(2));

        let values = vec![
            LogValue::from("login"),
            LogValue::from(first),
            LogValue::from(second),
        ];
        let composed = compose(&values);
        assert_eq!(composed.message, "login");
        assert_eq!(composed.data.get("user"), Some(&json!("ana")));
        assert_eq!(composed.data.get("attempt"), Some(&json!(2)));
    }

    #[test]
    fn test_empty_values() {
        let composed = compose(&[]);
        assert_eq!(composed.message, "");
        assert!(composed.data.is_empty());
    }
}
