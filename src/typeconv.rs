//! Wire-type conversion.
//!
//! Maps a declared column type name (e.g. `array(varchar(10))`) to a
//! converter that turns one wire cell into a null-aware native value.
//! Declared type names form an open, string-named type system; anything
//! without a known base name fails explicitly.

use std::collections::BTreeMap;

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
};
use chrono_tz::Tz;

use crate::error::{Result, TrinoLinkError};
use crate::models::WireValue;
use crate::nullable::Nullable;

/// A decoded native cell value, positionally aligned with the column list.
///
/// `Array` and `Map` are validated for shape but passed through without
/// per-element conversion; use the wrappers in [`crate::nullable`] to decode
/// their elements.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Boolean(bool),
    Bigint(i64),
    Double(f64),
    Varchar(String),
    Timestamp(DateTime<FixedOffset>),
    Array(Vec<WireValue>),
    Map(BTreeMap<String, WireValue>),
}

/// Converter for one declared column type.
#[derive(Debug, Clone)]
pub struct TypeConverter {
    type_name: String,
    parsed_type: Vec<String>,
}

impl TypeConverter {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            parsed_type: parse_type(type_name),
        }
    }

    /// The full declared type, e.g. `varchar(10)`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Type name with nested argument names, outermost first, numeric
    /// length arguments stripped: `array(varchar(10))` -> `["array", "varchar"]`.
    pub fn parsed_type(&self) -> &[String] {
        &self.parsed_type
    }

    /// Declared type with any trailing parenthesized length suffix removed,
    /// for metadata display: `varchar(10)` -> `varchar`.
    pub fn display_type_name(&self) -> &str {
        display_type_name(&self.type_name)
    }

    /// Convert one wire cell into a native value.
    pub fn convert(&self, value: &WireValue) -> Result<CellValue> {
        match self.parsed_type[0].as_str() {
            "boolean" => Ok(cell_from(Nullable::<bool>::scan(value)?, CellValue::Boolean)),
            "json" | "char" | "varchar" | "varbinary" | "interval year to month"
            | "interval day to second" | "decimal" | "ipaddress" | "unknown" => {
                Ok(cell_from(Nullable::<String>::scan(value)?, CellValue::Varchar))
            }
            "tinyint" | "smallint" | "integer" | "bigint" => {
                Ok(cell_from(Nullable::<i64>::scan(value)?, CellValue::Bigint))
            }
            "real" | "double" => Ok(cell_from(Nullable::<f64>::scan(value)?, CellValue::Double)),
            "date" | "time" | "time with time zone" | "timestamp"
            | "timestamp with time zone" => Ok(cell_from(
                Nullable::<DateTime<FixedOffset>>::scan(value)?,
                CellValue::Timestamp,
            )),
            "map" => match value {
                WireValue::Null => Ok(CellValue::Null),
                WireValue::Mapping(entries) => Ok(CellValue::Map(entries.clone())),
                other => Err(TrinoLinkError::conversion(other, other.kind(), "map")),
            },
            "array" => match value {
                WireValue::Null => Ok(CellValue::Null),
                WireValue::Sequence(items) => Ok(CellValue::Array(items.clone())),
                other => Err(TrinoLinkError::conversion(other, other.kind(), "slice")),
            },
            _ => Err(TrinoLinkError::UnsupportedType(self.type_name.clone())),
        }
    }
}

fn cell_from<T>(scanned: Nullable<T>, wrap: impl FnOnce(T) -> CellValue) -> CellValue {
    if scanned.valid {
        wrap(scanned.value)
    } else {
        CellValue::Null
    }
}

/// Parse a declared type into its component names: split on `(`, strip the
/// trailing `)` run from the final component, and drop it entirely when it
/// is a bare number (a length/precision argument).
pub fn parse_type(name: &str) -> Vec<String> {
    let mut parts: Vec<String> = name.split('(').map(str::to_string).collect();
    if parts.len() == 1 {
        return parts;
    }
    let last = parts.last_mut().expect("split yields at least one part");
    *last = last.trim_end_matches(')').to_string();
    if !last.is_empty() && last.parse::<i64>().is_ok() {
        parts.pop();
    }
    parts
}

/// Strip a trailing `(N)` length suffix from a declared type name.
pub fn display_type_name(name: &str) -> &str {
    if let Some(open) = name.rfind('(') {
        if name.ends_with(')') {
            let inner = &name[open + 1..name.len() - 1];
            if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
                return &name[..open];
            }
        }
    }
    name
}

const EPOCH_DATE: (i32, u32, u32) = (1970, 1, 1);

/// Parse a temporal payload: when the final space-separated token starts
/// with a non-digit it names a time zone and the remainder is resolved in
/// that zone; otherwise the whole payload is resolved in the local zone.
/// Date-only, time-only, and datetime layouts are tried in that order.
pub(crate) fn parse_temporal(text: &str) -> Result<DateTime<FixedOffset>> {
    let mut tokens = text.split(' ');
    let token_count = text.split(' ').count();
    let last = tokens.next_back().unwrap_or_default();
    let zone_named = token_count > 1
        && !last
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_digit());
    if zone_named {
        parse_temporal_with_zone(text)
    } else {
        parse_temporal_local(text)
    }
}

fn parse_temporal_local(text: &str) -> Result<DateTime<FixedOffset>> {
    let naive = parse_naive(text)
        .ok_or_else(|| TrinoLinkError::conversion(text, "text", "timestamp"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| TrinoLinkError::conversion(text, "text", "timestamp"))
}

fn parse_temporal_with_zone(text: &str) -> Result<DateTime<FixedOffset>> {
    let idx = text
        .rfind(' ')
        .ok_or_else(|| TrinoLinkError::conversion(text, "text", "timestamp with zone"))?;
    let (stamp, zone) = (&text[..idx], &text[idx + 1..]);
    let tz: Tz = zone.parse().map_err(|_| {
        TrinoLinkError::conversion(text, "text", format!("timestamp in zone {:?}", zone))
    })?;
    let naive = parse_naive(stamp)
        .ok_or_else(|| TrinoLinkError::conversion(text, "text", "timestamp with zone"))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| TrinoLinkError::conversion(text, "text", "timestamp with zone"))
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(time) = NaiveTime::parse_from_str(text, "%H:%M:%S%.f") {
        let (y, m, d) = EPOCH_DATE;
        return Some(NaiveDateTime::new(NaiveDate::from_ymd_opt(y, m, d)?, time));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").ok()
}
