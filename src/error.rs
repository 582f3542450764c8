//! HTTP failure-mapping types for the control API.
//!
//! Each endpoint has its own error-body shape on the wire (mirroring
//! the three distinct `FMultiplay*ErrorResponse` structs in the
//! source SDK); decoding is endpoint-specific and falls back to a
//! synthesized 500 when the body doesn't parse (`spec.md` §4.5/§7).

use serde::Deserialize;

/// Error body for `ReadyServer`/`UnreadyServer`: `{status, title, detail}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorResponseBody {
    pub status: i32,
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

impl ErrorResponseBody {
    fn synthesize(status: i32, title: &str, detail: impl Into<String>) -> Self {
        ErrorResponseBody {
            status,
            title: title.to_owned(),
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid_allocation_id() -> Self {
        Self::synthesize(
            400,
            "Invalid Allocation ID",
            "Attempted to invoke ReadyServerForPlayers() with an invalid allocation ID.",
        )
    }

    pub(crate) fn deserialize_failed(endpoint: &str) -> Self {
        Self::synthesize(
            500,
            "Parsing failed error",
            format!("Failed to deserialize {endpoint} JSON response body on failure"),
        )
    }

    pub(crate) fn parse_failed(endpoint: &str) -> Self {
        Self::synthesize(
            500,
            "Parsing failed error",
            format!("Failed to parse {endpoint} JSON response body on failure"),
        )
    }
}

/// Error body for `PayloadAllocation`:
/// `{success, error, errorCode, errorMessage}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadAllocationErrorResponseBody {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: bool,
    pub error_code: i32,
    pub error_message: String,
}

impl PayloadAllocationErrorResponseBody {
    fn synthesize(error_code: i32, error_message: impl Into<String>) -> Self {
        PayloadAllocationErrorResponseBody {
            success: false,
            error: true,
            error_code,
            error_message: error_message.into(),
        }
    }

    pub(crate) fn deserialize_failed() -> Self {
        Self::synthesize(500, "Failed to deserialize JSON response body on failure")
    }

    pub(crate) fn parse_failed() -> Self {
        Self::synthesize(500, "Failed to parse JSON response body on failure")
    }
}

/// Body for `PayloadToken`: `{token, error}`. The same shape is used
/// on success (non-empty `token`, empty `error`) and on failure
/// (empty `token`, non-empty `error`) — the source reuses one struct
/// for both delegates.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct PayloadTokenResponseBody {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub error: String,
}

impl PayloadTokenResponseBody {
    pub(crate) fn deserialize_failed() -> Self {
        PayloadTokenResponseBody {
            token: String::new(),
            error: "Failed to deserialize PayloadToken JSON response body on failure".to_owned(),
        }
    }

    pub(crate) fn parse_failed() -> Self {
        PayloadTokenResponseBody {
            token: String::new(),
            error: "Failed to parse PayloadToken JSON response body on failure".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_body_decodes_documented_fields() {
        let value = serde_json::json!({"status": 404, "title": "Not Found", "detail": "no such server"});
        let body: ErrorResponseBody = serde_json::from_value(value).unwrap();
        assert_eq!(body.status, 404);
        assert_eq!(body.title, "Not Found");
    }

    #[test]
    fn payload_allocation_error_uses_camel_case_fields() {
        let value =
            serde_json::json!({"success": false, "error": true, "errorCode": 503, "errorMessage": "unavailable"});
        let body: PayloadAllocationErrorResponseBody = serde_json::from_value(value).unwrap();
        assert_eq!(body.error_code, 503);
        assert_eq!(body.error_message, "unavailable");
    }

    #[test]
    fn payload_token_response_round_trips() {
        let value = serde_json::json!({"token": "jwt-value", "error": ""});
        let body: PayloadTokenResponseBody = serde_json::from_value(value).unwrap();
        assert_eq!(body.token, "jwt-value");
        assert_eq!(body.error, "");
    }
}
