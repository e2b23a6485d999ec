//! DOM domain handler implementation
//!
//! Inspects the page document and resolves selectors, including
//! `name/arg` query handler selectors, for protocol clients.

use async_trait::async_trait;
use cdp_types::{domains::dom::*, CdpError};
use page_dom::Document;
use protocol_handler::DomainHandler;
use query_handlers::QueryHandlerRegistry;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{dom_error, parse_params, query_error, to_result};

/// Depth used when a request does not specify one
const DEFAULT_DEPTH: i32 = 1;

/// DOM domain handler
///
/// Shares its document and registry with the session that created it, so
/// handlers registered on the session are visible to protocol queries.
pub struct DomDomain {
    document: Arc<Document>,
    registry: Arc<QueryHandlerRegistry>,
}

impl DomDomain {
    /// Create a DOM domain over `document`, resolving selectors with `registry`
    ///
    /// # Example
    /// ```
    /// use dom_domain::DomDomain;
    /// use page_dom::Document;
    /// use query_handlers::QueryHandlerRegistry;
    /// use std::sync::Arc;
    ///
    /// let dom = DomDomain::new(
    ///     Arc::new(Document::new()),
    ///     Arc::new(QueryHandlerRegistry::new()),
    /// );
    /// ```
    pub fn new(document: Arc<Document>, registry: Arc<QueryHandlerRegistry>) -> Self {
        Self { document, registry }
    }

    async fn get_document(&self, params: Option<Value>) -> Result<Value, CdpError> {
        debug!("DOM.getDocument called with params: {:?}", params);

        let params: GetDocumentParams = match params {
            Some(params) => parse_params(Some(params))?,
            None => GetDocumentParams::default(),
        };

        let root = self
            .document
            .describe_node(
                self.document.root(),
                params.depth.unwrap_or(DEFAULT_DEPTH),
                params.pierce.unwrap_or(false),
            )
            .map_err(dom_error)?;

        to_result(GetDocumentResponse { root })
    }

    async fn describe_node(&self, params: Option<Value>) -> Result<Value, CdpError> {
        debug!("DOM.describeNode called with params: {:?}", params);

        let params: DescribeNodeParams = parse_params(params)?;
        let node = self
            .document
            .describe_node(params.node_id, params.depth.unwrap_or(DEFAULT_DEPTH), false)
            .map_err(dom_error)?;

        to_result(DescribeNodeResponse { node })
    }

    /// First node matching the selector under `nodeId`, or null
    async fn query_selector(&self, params: Option<Value>) -> Result<Value, CdpError> {
        debug!("DOM.querySelector called with params: {:?}", params);

        let params: QuerySelectorParams = parse_params(params)?;
        let node_id = self
            .registry
            .query_one(&self.document, params.node_id, &params.selector)
            .map_err(query_error)?;

        to_result(QuerySelectorResponse { node_id })
    }

    async fn query_selector_all(&self, params: Option<Value>) -> Result<Value, CdpError> {
        debug!("DOM.querySelectorAll called with params: {:?}", params);

        let params: QuerySelectorParams = parse_params(params)?;
        let node_ids = self
            .registry
            .query_all(&self.document, params.node_id, &params.selector)
            .map_err(query_error)?;

        to_result(QuerySelectorAllResponse { node_ids })
    }

    async fn get_box_model(&self, params: Option<Value>) -> Result<Value, CdpError> {
        debug!("DOM.getBoxModel called with params: {:?}", params);

        let params: GetBoxModelParams = parse_params(params)?;
        let model = self
            .document
            .box_model(params.node_id)
            .map_err(dom_error)?
            .ok_or_else(|| CdpError::server_error(-32000, "Could not compute box model."))?;

        to_result(GetBoxModelResponse { model })
    }

    async fn get_content_quads(&self, params: Option<Value>) -> Result<Value, CdpError> {
        debug!("DOM.getContentQuads called with params: {:?}", params);

        let params: GetBoxModelParams = parse_params(params)?;
        let model = self
            .document
            .box_model(params.node_id)
            .map_err(dom_error)?
            .ok_or_else(|| CdpError::server_error(-32000, "Could not compute content quads."))?;

        // One fragment per element; its quad is the border box
        to_result(GetContentQuadsResponse {
            quads: vec![model.border],
        })
    }
}

#[async_trait]
impl DomainHandler for DomDomain {
    fn name(&self) -> &str {
        "DOM"
    }

    async fn handle_method(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        debug!("DOM domain handling method: {}", method);

        match method {
            "getDocument" => self.get_document(params).await,
            "describeNode" => self.describe_node(params).await,
            "querySelector" => self.query_selector(params).await,
            "querySelectorAll" => self.query_selector_all(params).await,
            "getBoxModel" => self.get_box_model(params).await,
            "getContentQuads" => self.get_content_quads(params).await,
            _ => {
                warn!("Unknown DOM method: {}", method);
                Err(CdpError::method_not_found(format!("DOM.{}", method)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_handlers::QueryHandler;
    use serde_json::json;

    fn domain(html: &str) -> (DomDomain, Arc<Document>) {
        let document = Arc::new(Document::new());
        document.set_content(html).unwrap();
        let registry = Arc::new(QueryHandlerRegistry::new());
        registry
            .register(
                "getById",
                QueryHandler::new().with_query_one(|document, scope, id| {
                    Ok(document.query_selector(scope, &format!("[id=\"{}\"]", id))?)
                }),
            )
            .unwrap();
        (DomDomain::new(document.clone(), registry), document)
    }

    #[tokio::test]
    async fn test_domain_name() {
        let (dom, _) = domain("");
        assert_eq!(dom.name(), "DOM");
    }

    #[tokio::test]
    async fn test_get_document() {
        let (dom, _) = domain("<p>hi</p>");
        let value = dom.handle_method("getDocument", None).await.unwrap();

        assert_eq!(value["root"]["nodeId"], 1);
        assert_eq!(value["root"]["nodeType"], 9);
        assert_eq!(value["root"]["nodeName"], "#document");
        assert_eq!(value["root"]["children"][0]["nodeName"], "HTML");
        assert!(value["root"]["children"][0].get("children").is_none());
    }

    #[tokio::test]
    async fn test_get_document_full_depth() {
        let (dom, _) = domain(r#"<p id="x">hi</p>"#);
        let value = dom
            .handle_method("getDocument", Some(json!({"depth": -1})))
            .await
            .unwrap();

        let body = &value["root"]["children"][0]["children"][1];
        assert_eq!(body["nodeName"], "BODY");
        assert_eq!(body["children"][0]["attributes"], json!(["id", "x"]));
    }

    #[tokio::test]
    async fn test_describe_node() {
        let (dom, document) = domain(r#"<a href="/x">link</a>"#);
        let link = document.query_selector(document.root(), "a").unwrap().unwrap();

        let value = dom
            .handle_method("describeNode", Some(json!({"nodeId": link})))
            .await
            .unwrap();
        assert_eq!(value["node"]["localName"], "a");
        assert_eq!(value["node"]["childNodeCount"], 1);
    }

    #[tokio::test]
    async fn test_query_selector_with_handler() {
        let (dom, document) = domain(r#"<div id="not-foo"></div><div id="foo"></div>"#);
        let expected = document.get_element_by_id("foo").unwrap();

        let value = dom
            .handle_method(
                "querySelector",
                Some(json!({"nodeId": 1, "selector": "getById/foo"})),
            )
            .await
            .unwrap();
        assert_eq!(value["nodeId"], json!(expected));
    }

    #[tokio::test]
    async fn test_query_selector_not_found() {
        let (dom, _) = domain("<div></div>");
        let value = dom
            .handle_method(
                "querySelector",
                Some(json!({"nodeId": 1, "selector": ".nonexistent"})),
            )
            .await
            .unwrap();
        assert!(value["nodeId"].is_null());
    }

    #[tokio::test]
    async fn test_query_selector_all_derives_from_single() {
        let (dom, _) = domain(r#"<div id="foo"></div>"#);
        let value = dom
            .handle_method(
                "querySelectorAll",
                Some(json!({"nodeId": 1, "selector": "getById/foo"})),
            )
            .await
            .unwrap();
        assert_eq!(value["nodeIds"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_handler_message() {
        let (dom, _) = domain("");
        let error = dom
            .handle_method(
                "querySelectorAll",
                Some(json!({"nodeId": 1, "selector": "getByClass/foo"})),
            )
            .await
            .unwrap_err();

        assert_eq!(error.code, -32000);
        assert_eq!(
            error.message,
            "Query set to use \"getByClass\", but no query handler of that name was found"
        );
    }

    #[tokio::test]
    async fn test_query_selector_invalid_node() {
        let (dom, _) = domain("");
        let error = dom
            .handle_method(
                "querySelector",
                Some(json!({"nodeId": 99999, "selector": "div"})),
            )
            .await
            .unwrap_err();
        assert_eq!(error.code, -32000);
    }

    #[tokio::test]
    async fn test_query_selector_missing_params() {
        let (dom, _) = domain("");
        let error = dom.handle_method("querySelector", None).await.unwrap_err();
        assert_eq!(error.code, -32602);
    }

    #[tokio::test]
    async fn test_get_box_model() {
        let (dom, document) = domain(
            r#"<div style="left: 10px; top: 20px; width: 100px; height: 50px; padding: 5px"></div>"#,
        );
        let div = document.query_selector(document.root(), "div").unwrap().unwrap();

        let value = dom
            .handle_method("getBoxModel", Some(json!({"nodeId": div})))
            .await
            .unwrap();
        assert_eq!(value["model"]["width"], 110.0);
        assert_eq!(value["model"]["height"], 60.0);
        assert_eq!(
            value["model"]["content"],
            json!([15.0, 25.0, 115.0, 25.0, 115.0, 75.0, 15.0, 75.0])
        );

        let quads = dom
            .handle_method("getContentQuads", Some(json!({"nodeId": div})))
            .await
            .unwrap();
        assert_eq!(quads["quads"][0], value["model"]["border"]);
    }

    #[tokio::test]
    async fn test_box_model_of_hidden_element() {
        let (dom, document) = domain(r#"<div style="display: none; width: 10px"></div>"#);
        let div = document.query_selector(document.root(), "div").unwrap().unwrap();

        let error = dom
            .handle_method("getBoxModel", Some(json!({"nodeId": div})))
            .await
            .unwrap_err();
        assert_eq!(error.message, "Could not compute box model.");
    }

    #[tokio::test]
    async fn test_handle_method_unknown() {
        let (dom, _) = domain("");
        let error = dom.handle_method("setOuterHTML", None).await.unwrap_err();
        assert_eq!(error.code, -32601);
    }
}
