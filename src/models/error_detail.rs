use serde::Deserialize;
use std::fmt;

/// An error reported by the engine inside an otherwise well-formed page.
///
/// A non-empty `error_name` on any page is terminal for that execution.
/// `USER_CANCELLED` is a distinguished terminal state.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryError {
    pub message: String,
    #[serde(rename = "errorName")]
    pub error_name: String,
    #[serde(rename = "errorCode")]
    pub error_code: i32,
    #[serde(rename = "errorLocation")]
    pub error_location: Option<ErrorLocation>,
    #[serde(rename = "failureInfo")]
    pub failure_info: Option<FailureInfo>,
    // Other fields omitted
}

/// Position of the failure within the submitted SQL text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorLocation {
    #[serde(rename = "lineNumber")]
    pub line_number: i32,
    #[serde(rename = "columnNumber")]
    pub column_number: i32,
}

/// Failure classification reported by the engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FailureInfo {
    #[serde(rename = "type")]
    pub failure_type: String,
    // Other fields omitted
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failure_type = self
            .failure_info
            .as_ref()
            .map(|fi| fi.failure_type.as_str())
            .unwrap_or_default();
        write!(f, "{}: {}", failure_type, self.message)?;
        if !self.error_name.is_empty() {
            write!(f, " ({}:{})", self.error_name, self.error_code)?;
        }
        if let Some(loc) = &self.error_location {
            write!(f, " at line {}:{}", loc.line_number, loc.column_number)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_decode_and_display() {
        let err: QueryError = serde_json::from_str(
            r#"{
                "message": "line 1:8: Column 'x' cannot be resolved",
                "errorName": "COLUMN_NOT_FOUND",
                "errorCode": 47,
                "errorLocation": {"lineNumber": 1, "columnNumber": 8},
                "failureInfo": {"type": "io.trino.spi.TrinoException"}
            }"#,
        )
        .unwrap();
        assert_eq!(err.error_name, "COLUMN_NOT_FOUND");
        assert_eq!(
            err.to_string(),
            "io.trino.spi.TrinoException: line 1:8: Column 'x' cannot be resolved \
             (COLUMN_NOT_FOUND:47) at line 1:8"
        );
    }

    #[test]
    fn test_display_without_optional_fields() {
        let err = QueryError {
            message: "boom".into(),
            error_name: "INTERNAL_ERROR".into(),
            error_code: 65536,
            ..Default::default()
        };
        assert_eq!(err.to_string(), ": boom (INTERNAL_ERROR:65536)");
    }
}
