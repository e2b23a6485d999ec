// Protocol error types
// JSON-RPC 2.0 error codes plus the failures a page target reports

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error object carried by a failed [`crate::CdpResponse`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CdpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl fmt::Display for CdpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CDP Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for CdpError {}

impl CdpError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: i32, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Parse error (-32700)
    pub fn parse_error() -> Self {
        Self::new(-32700, "Parse error")
    }

    /// Invalid request (-32600)
    pub fn invalid_request() -> Self {
        Self::new(-32600, "Invalid Request")
    }

    /// Method not found (-32601)
    pub fn method_not_found(method: impl Into<String>) -> Self {
        let method = method.into();
        Self::with_data(
            -32601,
            "Method not found",
            serde_json::json!({ "method": method }),
        )
    }

    /// Invalid params (-32602)
    pub fn invalid_params(details: impl Into<String>) -> Self {
        let details = details.into();
        Self::with_data(
            -32602,
            "Invalid params",
            serde_json::json!({ "details": details }),
        )
    }

    /// Internal error (-32603)
    pub fn internal_error(details: impl Into<String>) -> Self {
        let details = details.into();
        Self::with_data(
            -32603,
            "Internal error",
            serde_json::json!({ "details": details }),
        )
    }

    /// Server error in the implementation-defined range (-32099..=-32000)
    ///
    /// Codes outside the range are clamped to -32000.
    pub fn server_error(code: i32, message: impl Into<String>) -> Self {
        let code = if (-32099..=-32000).contains(&code) {
            code
        } else {
            -32000
        };
        Self::new(code, message)
    }
}

/// Failures raised while serving a page-level protocol method
#[derive(Error, Debug)]
pub enum CdpProtocolError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Could not find node with given id: {0}")]
    NodeNotFound(u32),

    /// A selector could not be resolved; the message is reported verbatim
    #[error("{0}")]
    QueryFailed(String),

    #[error("CDP error: {0}")]
    CdpError(#[from] CdpError),
}

impl From<CdpProtocolError> for CdpError {
    fn from(error: CdpProtocolError) -> Self {
        match error {
            CdpProtocolError::SerializationError(e) => CdpError::internal_error(e.to_string()),
            CdpProtocolError::InvalidParams(details) => CdpError::invalid_params(details),
            CdpProtocolError::InvalidMethod(method) => CdpError::method_not_found(method),
            e @ CdpProtocolError::NodeNotFound(_) => CdpError::server_error(-32000, e.to_string()),
            CdpProtocolError::QueryFailed(message) => CdpError::server_error(-32000, message),
            CdpProtocolError::CdpError(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CdpError::parse_error().code, -32700);
        assert_eq!(CdpError::invalid_request().code, -32600);
        assert_eq!(CdpError::method_not_found("DOM.nope").code, -32601);
        assert_eq!(CdpError::invalid_params("bad").code, -32602);
        assert_eq!(CdpError::internal_error("boom").code, -32603);
    }

    #[test]
    fn test_server_error_clamps_code() {
        assert_eq!(CdpError::server_error(-32010, "x").code, -32010);
        assert_eq!(CdpError::server_error(7, "x").code, -32000);
    }

    #[test]
    fn test_query_failure_keeps_message() {
        let message = r#"Query set to use "getById", but no query handler of that name was found"#;
        let error: CdpError = CdpProtocolError::QueryFailed(message.to_string()).into();

        assert_eq!(error.code, -32000);
        assert_eq!(error.message, message);
    }

    #[test]
    fn test_node_not_found_conversion() {
        let error: CdpError = CdpProtocolError::NodeNotFound(42).into();
        assert_eq!(error.code, -32000);
        assert_eq!(error.message, "Could not find node with given id: 42");
    }
}
