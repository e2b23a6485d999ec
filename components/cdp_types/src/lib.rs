// Protocol messages, DOM wire types, and error definitions
//
// This module is part of the Corten automation client.

pub mod domains;
pub mod errors;

pub use errors::{CdpError, CdpProtocolError};

use serde::{Deserialize, Serialize};

/// Request sent by an automation client to a page target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CdpRequest {
    /// Caller-chosen identifier echoed back in the response
    pub id: u64,
    /// Method name in format "Domain.method"
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// Response to a [`CdpRequest`]
///
/// Exactly one of `result` or `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CdpResponse {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<errors::CdpError>,
}

impl CdpResponse {
    /// Successful response carrying `result`
    pub fn success(id: u64, result: serde_json::Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Failed response carrying `error`
    pub fn failure(id: u64, error: CdpError) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_without_params() {
        let request: CdpRequest =
            serde_json::from_str(r#"{"id":7,"method":"DOM.getDocument"}"#).unwrap();

        assert_eq!(request.id, 7);
        assert_eq!(request.method, "DOM.getDocument");
        assert!(request.params.is_none());
    }

    #[test]
    fn test_request_round_trip_keeps_selector() {
        let request = CdpRequest {
            id: 1,
            method: "DOM.querySelector".to_string(),
            params: Some(json!({"nodeId": 1, "selector": "getById/foo"})),
        };

        let text = serde_json::to_string(&request).unwrap();
        assert!(text.contains("getById/foo"));
    }

    #[test]
    fn test_response_constructors() {
        let ok = CdpResponse::success(3, json!({"nodeId": 4}));
        assert!(!ok.is_error());
        assert_eq!(ok.result.unwrap()["nodeId"], 4);

        let failed = CdpResponse::failure(3, CdpError::invalid_request());
        assert!(failed.is_error());
        assert!(failed.result.is_none());
    }

    #[test]
    fn test_failure_omits_result_field() {
        let failed = CdpResponse::failure(9, CdpError::parse_error());
        let text = serde_json::to_string(&failed).unwrap();

        assert!(!text.contains("result"));
        assert!(text.contains("-32700"));
    }
}
