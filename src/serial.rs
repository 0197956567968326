//! Bound-argument serialization.
//!
//! Parameterized statements are executed through an `EXECUTE ... USING`
//! rewrite, so every bound argument must be rendered as an engine SQL
//! literal.  Values with no literal mapping fail with
//! [`TrinoLinkError::Serialization`].

use crate::error::{Result, TrinoLinkError};

/// A value bound to a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Boolean(bool),
    Bigint(i64),
    Double(f64),
    Varchar(String),
}

impl Parameter {
    /// Render the engine SQL literal for this value.
    pub fn to_literal(&self) -> Result<String> {
        match self {
            Parameter::Boolean(b) => Ok(if *b { "true".into() } else { "false".into() }),
            Parameter::Bigint(i) => Ok(i.to_string()),
            Parameter::Double(d) => {
                if d.is_finite() {
                    // {:?} keeps the decimal point so the engine reads a double.
                    Ok(format!("{:?}", d))
                } else {
                    Err(TrinoLinkError::Serialization(format!(
                        "non-finite double {} has no SQL literal",
                        d
                    )))
                }
            }
            Parameter::Varchar(s) => Ok(format!("'{}'", s.replace('\'', "''"))),
        }
    }
}

impl From<bool> for Parameter {
    fn from(v: bool) -> Self {
        Parameter::Boolean(v)
    }
}

impl From<i32> for Parameter {
    fn from(v: i32) -> Self {
        Parameter::Bigint(v as i64)
    }
}

impl From<i64> for Parameter {
    fn from(v: i64) -> Self {
        Parameter::Bigint(v)
    }
}

impl From<f64> for Parameter {
    fn from(v: f64) -> Self {
        Parameter::Double(v)
    }
}

impl From<&str> for Parameter {
    fn from(v: &str) -> Self {
        Parameter::Varchar(v.to_string())
    }
}

impl From<String> for Parameter {
    fn from(v: String) -> Self {
        Parameter::Varchar(v)
    }
}
