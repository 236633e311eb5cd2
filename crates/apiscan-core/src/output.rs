//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Structured JSON:** every CLI response is a single JSON document on stdout
//! 2. **Status first:** every response has `status` as first field
//! 3. **Deterministic:** same input -> same output (field order, array ordering)
//! 4. **Versioned:** schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::Serialize;

use crate::error::{ApiscanError, OutputErrorCode};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    pub fn from_error(err: &ApiscanError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

/// Response emitted when a command fails.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &ApiscanError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Response of `apiscan inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct InspectResponse<T: Serialize> {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Git reference the modules were loaded from, when not the working tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub modules: Vec<T>,
}

impl<T: Serialize> InspectResponse<T> {
    pub fn new(reference: Option<String>, modules: Vec<T>) -> Self {
        InspectResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            reference,
            modules,
        }
    }
}

/// Response carrying a single string (`latest-tag`, `repo-root`).
#[derive(Debug, Clone, Serialize)]
pub struct ValueResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub value: String,
}

impl ValueResponse {
    pub fn new(value: impl Into<String>) -> Self {
        ValueResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            value: value.into(),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let err = ApiscanError::file_not_found("missing.py");
        let mut out = Vec::new();
        emit_response(&ErrorResponse::from_error(&err), &mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["schema_version"], SCHEMA_VERSION);
        assert_eq!(json["error"]["code"], 3);
        assert_eq!(json["error"]["message"], "file not found: missing.py");
    }

    #[test]
    fn test_status_is_first_field() {
        let response = ValueResponse::new("v1.2.0");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.starts_with("{\"status\":\"ok\""));
    }

    #[test]
    fn test_inspect_response_omits_missing_reference() {
        let response = InspectResponse::new(None, vec!["m".to_string()]);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("reference").is_none());
        assert_eq!(json["modules"][0], "m");
    }
}
