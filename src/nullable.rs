//! Null-aware consumer values.
//!
//! Every scalar kind the engine can produce has a null-aware wrapper
//! ([`Nullable<T>`]) plus homogeneous nested sequence wrappers for one-,
//! two-, and three-dimensional arrays of that kind.  Each wrapper decodes
//! one dimension at a time using the next-lower wrapper; dimensionality is
//! bounded at three, and a deeper wire value fails the innermost scalar
//! decode instead of being silently truncated.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};

use crate::error::{Result, TrinoLinkError};
use crate::models::WireValue;
use crate::typeconv::parse_temporal;

/// A scalar kind that can be decoded from a non-null wire value.
pub trait WireScalar: Sized {
    /// Target-kind name used in conversion errors.
    const TARGET: &'static str;

    /// Placeholder stored alongside `valid: false`.
    fn null_value() -> Self;

    /// Decode a wire value known to be non-null.
    fn scan_present(value: &WireValue) -> Result<Self>;
}

/// A scalar value that may be null.
///
/// A wire `null` always decodes to `valid: false`, never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Nullable<T> {
    pub value: T,
    pub valid: bool,
}

impl<T: WireScalar> Nullable<T> {
    pub fn scan(value: &WireValue) -> Result<Self> {
        if value.is_null() {
            return Ok(Self {
                value: T::null_value(),
                valid: false,
            });
        }
        Ok(Self {
            value: T::scan_present(value)?,
            valid: true,
        })
    }
}

/// A one-dimensional array of nullable scalars; the array itself may be null.
#[derive(Debug, Clone, PartialEq)]
pub struct NullSlice<T> {
    pub values: Vec<Nullable<T>>,
    pub valid: bool,
}

impl<T: WireScalar> NullSlice<T> {
    pub fn scan(value: &WireValue) -> Result<Self> {
        let items = match value {
            WireValue::Null => {
                return Ok(Self {
                    values: Vec::new(),
                    valid: false,
                })
            }
            WireValue::Sequence(items) => items,
            other => {
                return Err(TrinoLinkError::conversion(
                    other,
                    other.kind(),
                    format!("[]{}", T::TARGET),
                ))
            }
        };
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(Nullable::scan(item)?);
        }
        Ok(Self {
            values,
            valid: true,
        })
    }
}

/// A two-dimensional array; inner arrays and elements may each be null.
#[derive(Debug, Clone, PartialEq)]
pub struct NullSlice2<T> {
    pub values: Vec<NullSlice<T>>,
    pub valid: bool,
}

impl<T: WireScalar> NullSlice2<T> {
    pub fn scan(value: &WireValue) -> Result<Self> {
        let items = match value {
            WireValue::Null => {
                return Ok(Self {
                    values: Vec::new(),
                    valid: false,
                })
            }
            WireValue::Sequence(items) => items,
            other => {
                return Err(TrinoLinkError::conversion(
                    other,
                    other.kind(),
                    format!("[][]{}", T::TARGET),
                ))
            }
        };
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(NullSlice::scan(item)?);
        }
        Ok(Self {
            values,
            valid: true,
        })
    }
}

/// A three-dimensional array, the deepest nesting the decoder supports.
#[derive(Debug, Clone, PartialEq)]
pub struct NullSlice3<T> {
    pub values: Vec<NullSlice2<T>>,
    pub valid: bool,
}

impl<T: WireScalar> NullSlice3<T> {
    pub fn scan(value: &WireValue) -> Result<Self> {
        let items = match value {
            WireValue::Null => {
                return Ok(Self {
                    values: Vec::new(),
                    valid: false,
                })
            }
            WireValue::Sequence(items) => items,
            other => {
                return Err(TrinoLinkError::conversion(
                    other,
                    other.kind(),
                    format!("[][][]{}", T::TARGET),
                ))
            }
        };
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(NullSlice2::scan(item)?);
        }
        Ok(Self {
            values,
            valid: true,
        })
    }
}

impl WireScalar for bool {
    const TARGET: &'static str = "bool";

    fn null_value() -> Self {
        false
    }

    fn scan_present(value: &WireValue) -> Result<Self> {
        match value {
            WireValue::Boolean(b) => Ok(*b),
            other => Err(TrinoLinkError::conversion(other, other.kind(), Self::TARGET)),
        }
    }
}

impl WireScalar for String {
    const TARGET: &'static str = "string";

    fn null_value() -> Self {
        String::new()
    }

    fn scan_present(value: &WireValue) -> Result<Self> {
        match value {
            WireValue::Text(s) => Ok(s.clone()),
            other => Err(TrinoLinkError::conversion(other, other.kind(), Self::TARGET)),
        }
    }
}

impl WireScalar for i64 {
    const TARGET: &'static str = "int64";

    fn null_value() -> Self {
        0
    }

    fn scan_present(value: &WireValue) -> Result<Self> {
        match value {
            WireValue::IntegerText(text) => text
                .parse::<i64>()
                .map_err(|_| TrinoLinkError::conversion(text, "number", Self::TARGET)),
            other => Err(TrinoLinkError::conversion(other, other.kind(), Self::TARGET)),
        }
    }
}

impl WireScalar for f64 {
    const TARGET: &'static str = "float64";

    fn null_value() -> Self {
        0.0
    }

    fn scan_present(value: &WireValue) -> Result<Self> {
        match value {
            WireValue::IntegerText(text) | WireValue::FloatText(text) => text
                .parse::<f64>()
                .map_err(|_| TrinoLinkError::conversion(text, "number", Self::TARGET)),
            // The engine encodes IEEE specials as strings.
            WireValue::Text(s) => match s.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                _ => Err(TrinoLinkError::conversion(s, "text", Self::TARGET)),
            },
            other => Err(TrinoLinkError::conversion(other, other.kind(), Self::TARGET)),
        }
    }
}

impl WireScalar for DateTime<FixedOffset> {
    const TARGET: &'static str = "timestamp";

    fn null_value() -> Self {
        DateTime::UNIX_EPOCH.fixed_offset()
    }

    fn scan_present(value: &WireValue) -> Result<Self> {
        match value {
            WireValue::Text(s) => parse_temporal(s),
            other => Err(TrinoLinkError::conversion(other, other.kind(), Self::TARGET)),
        }
    }
}

impl WireScalar for BTreeMap<String, WireValue> {
    const TARGET: &'static str = "map";

    fn null_value() -> Self {
        BTreeMap::new()
    }

    fn scan_present(value: &WireValue) -> Result<Self> {
        match value {
            WireValue::Mapping(entries) => Ok(entries.clone()),
            other => Err(TrinoLinkError::conversion(other, other.kind(), Self::TARGET)),
        }
    }
}
