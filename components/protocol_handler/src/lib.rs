//! Protocol message routing
//!
//! Routes `Domain.method` requests from an automation client to the domain
//! handler registered for `Domain` and wraps the outcome in a response. The
//! router works on in-process JSON strings; there is no transport.

use async_trait::async_trait;
use cdp_types::{CdpError, CdpRequest, CdpResponse};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A protocol domain such as `DOM` or `CSS`
#[async_trait]
pub trait DomainHandler: Send + Sync {
    /// Domain name, the part of the method before the dot
    fn name(&self) -> &str;

    /// Handle `method` (without the domain prefix)
    async fn handle_method(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError>;
}

/// Routes requests to registered [`DomainHandler`]s
pub struct ProtocolHandler {
    domains: DashMap<String, Arc<dyn DomainHandler>>,
}

impl ProtocolHandler {
    /// Create a router with no domains
    ///
    /// # Example
    /// ```
    /// use protocol_handler::ProtocolHandler;
    ///
    /// let handler = ProtocolHandler::new();
    /// assert!(handler.registered_domains().is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            domains: DashMap::new(),
        }
    }

    /// Register a domain, replacing any handler with the same name
    pub fn register_domain(&self, handler: Arc<dyn DomainHandler>) {
        let name = handler.name().to_string();
        debug!("Registering domain handler: {}", name);
        if self.domains.insert(name.clone(), handler).is_some() {
            warn!("Replaced existing domain handler: {}", name);
        }
    }

    /// Remove a domain, returning its handler if it was registered
    pub fn unregister_domain(&self, domain_name: &str) -> Option<Arc<dyn DomainHandler>> {
        debug!("Unregistering domain handler: {}", domain_name);
        self.domains.remove(domain_name).map(|(_, handler)| handler)
    }

    /// Names of the registered domains, sorted
    pub fn registered_domains(&self) -> Vec<String> {
        let mut names: Vec<String> = self.domains.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Handle a JSON-encoded request and return the JSON-encoded response
    ///
    /// Malformed JSON yields a parse error, well-formed JSON that is not a
    /// request yields an invalid-request error; both are answered with id 0.
    pub async fn handle_message(&self, message: &str) -> String {
        let response = match parse_request(message) {
            Ok(request) => self.handle_request(request).await,
            Err(error) => CdpResponse::failure(0, error),
        };
        encode_response(&response)
    }

    /// Handle an already decoded request
    pub async fn handle_request(&self, request: CdpRequest) -> CdpResponse {
        match self.route_request(&request).await {
            Ok(result) => CdpResponse::success(request.id, result),
            Err(error) => {
                debug!(
                    "Request {} ({}) failed: {}",
                    request.id, request.method, error
                );
                CdpResponse::failure(request.id, error)
            }
        }
    }

    async fn route_request(&self, request: &CdpRequest) -> Result<Value, CdpError> {
        let (domain_name, method_name) = split_method(&request.method)?;
        debug!(
            "Routing request {} to domain: {}, method: {}",
            request.id, domain_name, method_name
        );

        // Clone the handler out so the map is not held across the await
        let handler = self
            .domains
            .get(domain_name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                warn!("Domain not found: {}", domain_name);
                CdpError::method_not_found(&request.method)
            })?;

        handler
            .handle_method(method_name, request.params.clone())
            .await
    }
}

impl Default for ProtocolHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_request(message: &str) -> Result<CdpRequest, CdpError> {
    let json: Value = serde_json::from_str(message).map_err(|e| {
        error!("Invalid JSON: {}", e);
        CdpError::parse_error()
    })?;
    serde_json::from_value(json).map_err(|e| {
        error!("Invalid request structure: {}", e);
        CdpError::invalid_request()
    })
}

/// Split `Domain.method`; both parts must be non-empty
fn split_method(method: &str) -> Result<(&str, &str), CdpError> {
    match method.split_once('.') {
        Some((domain, name)) if !domain.is_empty() && !name.is_empty() => Ok((domain, name)),
        _ => {
            warn!("Invalid method format (expected Domain.method): {}", method);
            Err(CdpError::invalid_request())
        }
    }
}

fn encode_response(response: &CdpResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        error!("Failed to serialize response: {}", e);
        format!(
            r#"{{"id":{},"error":{{"code":-32603,"message":"Internal error"}}}}"#,
            response.id
        )
    })
}
