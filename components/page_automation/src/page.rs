//! Pages

use cdp_types::{domains::dom::Rect, CdpRequest};
use dom_domain::{CssDomain, DomDomain};
use page_dom::{Document, MouseEvent};
use protocol_handler::ProtocolHandler;
use query_handlers::QueryHandlerRegistry;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::element_handle::ElementHandle;
use crate::mouse::Mouse;
use crate::{AutomationConfig, AutomationError, Result};

/// A page: its document, the session's query handlers, a mouse and a
/// protocol endpoint serving `DOM` and `CSS`
///
/// Cloning is cheap; clones refer to the same page.
#[derive(Clone)]
pub struct Page {
    document: Arc<Document>,
    registry: Arc<QueryHandlerRegistry>,
    config: Arc<AutomationConfig>,
    mouse: Arc<Mouse>,
    protocol: Arc<ProtocolHandler>,
    next_request_id: Arc<AtomicU64>,
}

impl Page {
    pub(crate) fn new(registry: Arc<QueryHandlerRegistry>, config: Arc<AutomationConfig>) -> Self {
        let document = Arc::new(Document::new());

        let protocol = ProtocolHandler::new();
        protocol.register_domain(Arc::new(DomDomain::new(document.clone(), registry.clone())));
        protocol.register_domain(Arc::new(CssDomain::new(document.clone())));

        Self {
            mouse: Arc::new(Mouse::new(document.clone())),
            document,
            registry,
            config,
            protocol: Arc::new(protocol),
            next_request_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn mouse(&self) -> &Mouse {
        &self.mouse
    }

    pub fn config(&self) -> &AutomationConfig {
        &self.config
    }

    pub(crate) fn registry(&self) -> &QueryHandlerRegistry {
        &self.registry
    }

    /// Viewport rectangle at the origin
    pub fn viewport(&self) -> Rect {
        let viewport = self.config.viewport();
        Rect::new(0.0, 0.0, viewport.width as f64, viewport.height as f64)
    }

    /// Replace the body content with parsed `html`
    pub fn set_content(&self, html: &str) -> Result<()> {
        debug!("Setting page content ({} bytes)", html.len());
        Ok(self.document.set_content(html)?)
    }

    /// Mouse events dispatched on this page, oldest first
    pub fn events(&self) -> Vec<MouseEvent> {
        self.document.events()
    }

    /// Handle for the document node
    pub fn document_handle(&self) -> ElementHandle {
        ElementHandle::new(self.clone(), self.document.root())
    }

    /// First element matching `selector`, or `None`
    ///
    /// `selector` is CSS or `name/arg` for a registered query handler.
    pub async fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>> {
        self.document_handle().query_selector(selector).await
    }

    pub async fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        self.document_handle().query_selector_all(selector).await
    }

    /// Run `f` on the first element matching `selector`
    pub async fn eval_on_selector<F, R>(&self, selector: &str, f: F) -> Result<R>
    where
        F: FnOnce(&ElementHandle) -> anyhow::Result<R>,
    {
        self.document_handle().eval_on_selector(selector, f).await
    }

    /// Run `f` on every element matching `selector`
    pub async fn eval_on_selector_all<F, R>(&self, selector: &str, f: F) -> Result<R>
    where
        F: FnOnce(&[ElementHandle]) -> anyhow::Result<R>,
    {
        self.document_handle().eval_on_selector_all(selector, f).await
    }

    /// Click the first element matching `selector`
    pub async fn click(&self, selector: &str) -> Result<()> {
        self.query_selector(selector)
            .await?
            .ok_or_else(|| AutomationError::ElementNotFound(selector.to_string()))?
            .click()
            .await
    }

    /// Handle a JSON protocol message and return the JSON response
    pub async fn handle_message(&self, message: &str) -> String {
        self.protocol.handle_message(message).await
    }

    /// Call a protocol method, e.g. `DOM.querySelector`
    pub async fn send(&self, method: &str, params: Value) -> Result<Value> {
        let request = CdpRequest {
            id: self.next_request_id.fetch_add(1, Ordering::SeqCst),
            method: method.to_string(),
            params: Some(params),
        };
        let response = self.protocol.handle_request(request).await;
        match (response.result, response.error) {
            (_, Some(error)) => Err(AutomationError::Protocol(error)),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }

    pub fn registered_domains(&self) -> Vec<String> {
        self.protocol.registered_domains()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("document", &self.document)
            .field("viewport", &self.config.viewport())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> Page {
        Page::new(
            Arc::new(QueryHandlerRegistry::new()),
            Arc::new(AutomationConfig::default()),
        )
    }

    #[test]
    fn test_new_page_serves_dom_and_css() {
        let page = page();
        assert_eq!(page.registered_domains(), vec!["CSS", "DOM"]);
        assert_eq!(page.viewport(), Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[tokio::test]
    async fn test_query_selector_on_page() {
        let page = page();
        page.set_content(r#"<ul><li>a</li><li>b</li></ul>"#).unwrap();

        let items = page.query_selector_all("li").await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].text_content().unwrap(), "b");
        assert!(page.query_selector("ol").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_protocol_method() {
        let page = page();
        page.set_content(r#"<p id="x"></p>"#).unwrap();

        let result = page
            .send("DOM.querySelector", json!({"nodeId": 1, "selector": "#x"}))
            .await
            .unwrap();
        assert!(result["nodeId"].is_number());

        let error = page
            .send("DOM.querySelector", json!({"nodeId": 1, "selector": "nope/x"}))
            .await
            .unwrap_err();
        assert!(matches!(error, AutomationError::Protocol(ref e) if e.code == -32000));
    }

    #[tokio::test]
    async fn test_click_missing_element() {
        let page = page();
        let error = page.click("button").await.unwrap_err();

        assert_eq!(
            error.to_string(),
            "failed to find element matching selector \"button\""
        );
    }
}
