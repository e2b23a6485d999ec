//! DOM and CSS protocol domains
//!
//! Serves `DOM.*` and `CSS.*` methods over a shared [`page_dom::Document`].
//! Selectors passed to `DOM.querySelector` and `DOM.querySelectorAll` go
//! through a [`query_handlers::QueryHandlerRegistry`], so `name/arg`
//! selectors reach custom and built-in query handlers.

mod css_domain;
mod dom_domain;

pub use css_domain::{CssComputedStyleProperty, CssDomain, GetComputedStyleForNodeParams};
pub use dom_domain::DomDomain;

use cdp_types::{CdpError, CdpProtocolError};
use page_dom::DomError;
use query_handlers::QueryError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode method parameters, reporting failures as invalid params
pub(crate) fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, CdpError> {
    let params = params.ok_or_else(|| CdpError::invalid_params("Missing parameters"))?;
    serde_json::from_value(params)
        .map_err(|e| CdpError::invalid_params(format!("Invalid parameters: {}", e)))
}

pub(crate) fn to_result<T: serde::Serialize>(response: T) -> Result<Value, CdpError> {
    serde_json::to_value(response).map_err(|e| CdpProtocolError::from(e).into())
}

pub(crate) fn dom_error(error: DomError) -> CdpError {
    match error {
        DomError::NodeNotFound(id) => CdpProtocolError::NodeNotFound(id.0).into(),
        other => CdpProtocolError::QueryFailed(other.to_string()).into(),
    }
}

/// Query failures keep their message verbatim
pub(crate) fn query_error(error: QueryError) -> CdpError {
    match error {
        QueryError::Dom(error) => dom_error(error),
        other => CdpProtocolError::QueryFailed(other.to_string()).into(),
    }
}
