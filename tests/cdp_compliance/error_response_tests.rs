//! Error response tests
//!
//! Failed methods are answered with JSON-RPC errors carrying the request id.

use corten_automation::{AutomationConfig, AutomationSession, Page, QueryHandler};
use serde_json::{json, Value};

fn page(html: &str) -> (AutomationSession, Page) {
    let session = AutomationSession::new(AutomationConfig::default()).unwrap();
    let page = session.new_page();
    page.set_content(html).unwrap();
    (session, page)
}

async fn send(page: &Page, request: Value) -> Value {
    serde_json::from_str(&page.handle_message(&request.to_string()).await).unwrap()
}

// ============================================================================
// Unknown Method Error Tests
// ============================================================================

#[tokio::test]
async fn test_dom_unknown_method() {
    let (_session, page) = page("");

    let response = send(&page, json!({"id": 1, "method": "DOM.setOuterHTML"})).await;
    assert_eq!(response["id"], 1);
    assert_eq!(response["error"]["code"], -32601);
    assert_eq!(response["error"]["data"]["method"], "DOM.setOuterHTML");
}

#[tokio::test]
async fn test_unknown_domain() {
    let (_session, page) = page("");

    let response = send(&page, json!({"id": 2, "method": "Network.enable"})).await;
    assert_eq!(response["error"]["code"], -32601);
}

// ============================================================================
// Malformed Message Tests
// ============================================================================

#[tokio::test]
async fn test_malformed_messages() {
    let (_session, page) = page("");

    let parse: Value = serde_json::from_str(&page.handle_message("{").await).unwrap();
    assert_eq!(parse["error"]["code"], -32700);

    let structure: Value =
        serde_json::from_str(&page.handle_message(r#"{"method": "DOM.getDocument"}"#).await)
            .unwrap();
    assert_eq!(structure["error"]["code"], -32600);

    let format = send(&page, json!({"id": 3, "method": "getDocument"})).await;
    assert_eq!(format["error"]["code"], -32600);
}

// ============================================================================
// Query Failure Tests
// ============================================================================

#[tokio::test]
async fn test_unregistered_handler_reports_exact_message() {
    let (session, page) = page(r#"<div id="foo"></div>"#);
    let request = json!({
        "id": 4,
        "method": "DOM.querySelector",
        "params": {"nodeId": 1, "selector": "getById/foo"}
    });

    session
        .register_handler(
            "getById",
            QueryHandler::new().with_query_one(|document, scope, id| {
                Ok(document.query_selector(scope, &format!("[id=\"{}\"]", id))?)
            }),
        )
        .unwrap();
    let found = send(&page, request.clone()).await;
    assert!(found["result"]["nodeId"].is_number());

    session.unregister_handler("getById");
    let missing = send(&page, request).await;
    assert_eq!(missing["error"]["code"], -32000);
    assert_eq!(
        missing["error"]["message"],
        "Query set to use \"getById\", but no query handler of that name was found"
    );
}

#[tokio::test]
async fn test_invalid_css_selector() {
    let (_session, page) = page("");

    let response = send(
        &page,
        json!({"id": 5, "method": "DOM.querySelectorAll", "params": {"nodeId": 1, "selector": "div[="}}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32000);
    assert_eq!(response["error"]["message"], "'div[=' is not a valid selector");
}

#[tokio::test]
async fn test_invalid_aria_selector() {
    let (_session, page) = page("");

    let response = send(
        &page,
        json!({"id": 6, "method": "DOM.querySelector", "params": {"nodeId": 1, "selector": "aria/&"}}),
    )
    .await;
    assert_eq!(response["error"]["message"], "Invalid aria selector \"&\"");
}

#[tokio::test]
async fn test_text_node_scope_is_rejected() {
    let (_session, page) = page("<p>text</p>");
    let p = page.query_selector("p").await.unwrap().unwrap();
    let text = page.document().children(p.node_id())[0];

    let response = send(
        &page,
        json!({"id": 7, "method": "DOM.querySelector", "params": {"nodeId": text, "selector": "b"}}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32000);
}

// ============================================================================
// Unknown Node Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_node_ids() {
    let (_session, page) = page("");

    for method in [
        "DOM.describeNode",
        "DOM.getBoxModel",
        "DOM.getContentQuads",
        "CSS.getComputedStyleForNode",
    ] {
        let response = send(
            &page,
            json!({"id": 8, "method": method, "params": {"nodeId": 4242}}),
        )
        .await;
        assert_eq!(response["error"]["code"], -32000, "{}", method);
        assert_eq!(
            response["error"]["message"],
            "Could not find node with given id: 4242",
            "{}",
            method
        );
    }
}
