use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

/// A decoded wire cell value.
///
/// The engine sends dynamically typed JSON cells; this closed sum type is the
/// only shape the conversion layer operates on. Numbers are kept as their
/// original text so that 64-bit integers survive decoding without a lossy
/// float round trip — the converter decides the target kind.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Boolean(bool),
    /// A JSON number with no fraction or exponent, verbatim.
    IntegerText(String),
    /// A JSON number with a fraction or exponent, verbatim.
    FloatText(String),
    Text(String),
    Sequence(Vec<WireValue>),
    Mapping(BTreeMap<String, WireValue>),
}

impl WireValue {
    /// Short name of the wire kind, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Null => "null",
            WireValue::Boolean(_) => "boolean",
            WireValue::IntegerText(_) => "number",
            WireValue::FloatText(_) => "number",
            WireValue::Text(_) => "text",
            WireValue::Sequence(_) => "sequence",
            WireValue::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, WireValue::Null)
    }

    fn from_json(value: serde_json::Value) -> WireValue {
        match value {
            serde_json::Value::Null => WireValue::Null,
            serde_json::Value::Bool(b) => WireValue::Boolean(b),
            serde_json::Value::Number(n) => {
                // arbitrary_precision keeps the wire text inside the number;
                // the serializer emits it verbatim where Display would
                // normalize exponents (1.5e10 -> 1.5e+10).
                let text = serde_json::to_string(&n).unwrap_or_else(|_| n.to_string());
                if text.contains(['.', 'e', 'E']) {
                    WireValue::FloatText(text)
                } else {
                    WireValue::IntegerText(text)
                }
            }
            serde_json::Value::String(s) => WireValue::Text(s),
            serde_json::Value::Array(items) => {
                WireValue::Sequence(items.into_iter().map(WireValue::from_json).collect())
            }
            serde_json::Value::Object(entries) => WireValue::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, WireValue::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for WireValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(WireValue::from_json(value))
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireValue::Null => write!(f, "null"),
            WireValue::Boolean(b) => write!(f, "{}", b),
            WireValue::IntegerText(s) | WireValue::FloatText(s) | WireValue::Text(s) => {
                write!(f, "{}", s)
            }
            WireValue::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            WireValue::Mapping(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_text_is_preserved() {
        let v: WireValue = serde_json::from_str("9007199254740993").unwrap();
        assert_eq!(v, WireValue::IntegerText("9007199254740993".into()));

        let v: WireValue = serde_json::from_str("1.5e10").unwrap();
        assert_eq!(v, WireValue::FloatText("1.5e10".into()));
    }

    #[test]
    fn test_nested_decoding() {
        let v: WireValue = serde_json::from_str(r#"[[1, null], {"a": true}]"#).unwrap();
        match v {
            WireValue::Sequence(items) => {
                assert_eq!(
                    items[0],
                    WireValue::Sequence(vec![
                        WireValue::IntegerText("1".into()),
                        WireValue::Null
                    ])
                );
                assert!(matches!(items[1], WireValue::Mapping(_)));
            }
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(WireValue::Null.kind(), "null");
        assert_eq!(WireValue::Text("x".into()).kind(), "text");
        assert_eq!(WireValue::IntegerText("1".into()).kind(), "number");
    }
}
