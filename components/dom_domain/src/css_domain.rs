//! CSS domain handler implementation
//!
//! Reports the computed style the page layout uses for an element.

use async_trait::async_trait;
use cdp_types::{domains::dom::NodeId, CdpError};
use page_dom::Document;
use protocol_handler::DomainHandler;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{dom_error, parse_params, to_result};

/// Parameters for CSS.getComputedStyleForNode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetComputedStyleForNodeParams {
    pub node_id: NodeId,
}

/// One computed property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CssComputedStyleProperty {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GetComputedStyleForNodeResponse {
    computed_style: Vec<CssComputedStyleProperty>,
}

/// CSS domain handler
pub struct CssDomain {
    document: Arc<Document>,
}

impl CssDomain {
    /// Create a CSS domain over `document`
    ///
    /// # Example
    /// ```
    /// use dom_domain::CssDomain;
    /// use page_dom::Document;
    /// use std::sync::Arc;
    ///
    /// let css = CssDomain::new(Arc::new(Document::new()));
    /// ```
    pub fn new(document: Arc<Document>) -> Self {
        Self { document }
    }

    async fn get_computed_style_for_node(&self, params: Option<Value>) -> Result<Value, CdpError> {
        debug!(
            "CSS.getComputedStyleForNode called with params: {:?}",
            params
        );

        let params: GetComputedStyleForNodeParams = parse_params(params)?;
        let style = self
            .document
            .computed_style(params.node_id)
            .map_err(dom_error)?;

        let computed_style = style
            .properties()
            .into_iter()
            .map(|(name, value)| CssComputedStyleProperty { name, value })
            .collect();

        to_result(GetComputedStyleForNodeResponse { computed_style })
    }
}

#[async_trait]
impl DomainHandler for CssDomain {
    fn name(&self) -> &str {
        "CSS"
    }

    async fn handle_method(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        debug!("CSS domain handling method: {}", method);

        match method {
            "getComputedStyleForNode" => self.get_computed_style_for_node(params).await,
            _ => {
                warn!("Unknown CSS method: {}", method);
                Err(CdpError::method_not_found(format!("CSS.{}", method)))
            }
        }
    }
}
