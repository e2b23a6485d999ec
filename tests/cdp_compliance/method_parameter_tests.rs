//! Method parameter tests
//!
//! Each method validates its parameters and answers in the documented shape.

use corten_automation::{AutomationConfig, AutomationSession, Page};
use serde_json::{json, Value};

fn page(html: &str) -> (AutomationSession, Page) {
    let session = AutomationSession::new(AutomationConfig::default()).unwrap();
    let page = session.new_page();
    page.set_content(html).unwrap();
    (session, page)
}

async fn call(page: &Page, method: &str, params: Option<Value>) -> Value {
    let mut request = json!({"id": 1, "method": method});
    if let Some(params) = params {
        request["params"] = params;
    }
    serde_json::from_str(&page.handle_message(&request.to_string()).await).unwrap()
}

// ============================================================================
// Missing / Malformed Parameter Tests
// ============================================================================

#[tokio::test]
async fn test_methods_require_params() {
    let (_session, page) = page("");

    for method in [
        "DOM.describeNode",
        "DOM.querySelector",
        "DOM.querySelectorAll",
        "DOM.getBoxModel",
        "DOM.getContentQuads",
        "CSS.getComputedStyleForNode",
    ] {
        let response = call(&page, method, None).await;
        assert_eq!(response["error"]["code"], -32602, "{}", method);
    }
}

#[tokio::test]
async fn test_query_selector_requires_selector() {
    let (_session, page) = page("");

    let response = call(&page, "DOM.querySelector", Some(json!({"nodeId": 1}))).await;
    assert_eq!(response["error"]["code"], -32602);
    assert!(response["error"]["data"]["details"]
        .as_str()
        .unwrap()
        .contains("selector"));
}

#[tokio::test]
async fn test_node_id_must_be_a_number() {
    let (_session, page) = page("");

    let response = call(&page, "DOM.getBoxModel", Some(json!({"nodeId": "1"}))).await;
    assert_eq!(response["error"]["code"], -32602);
}

// ============================================================================
// DOM Domain Parameter Tests
// ============================================================================

#[tokio::test]
async fn test_get_document_without_params() {
    let (_session, page) = page("");

    let response = call(&page, "DOM.getDocument", None).await;
    assert_eq!(response["result"]["root"]["nodeType"], 9);
    assert_eq!(response["result"]["root"]["childNodeCount"], 1);
}

#[tokio::test]
async fn test_get_document_pierce() {
    let (_session, page) = page(
        r#"<div id="host"><template shadowrootmode="open"><b>inside</b></template></div>"#,
    );

    let response = call(
        &page,
        "DOM.getDocument",
        Some(json!({"depth": -1, "pierce": true})),
    )
    .await;
    let host = &response["result"]["root"]["children"][0]["children"][1]["children"][0];
    assert_eq!(host["localName"], "div");
    assert_eq!(host["shadowRoots"][0]["shadowRootType"], "open");
    assert_eq!(host["shadowRoots"][0]["children"][0]["localName"], "b");

    let flat = call(&page, "DOM.getDocument", Some(json!({"depth": -1}))).await;
    let host = &flat["result"]["root"]["children"][0]["children"][1]["children"][0];
    assert!(host.get("shadowRoots").is_none());
}

#[tokio::test]
async fn test_query_selector_all_returns_document_order() {
    let (_session, page) = page(r#"<p class="x">1</p><div><p class="x">2</p></div>"#);
    let expected: Vec<_> = page
        .query_selector_all("p.x")
        .await
        .unwrap()
        .iter()
        .map(|element| element.node_id())
        .collect();

    let response = call(
        &page,
        "DOM.querySelectorAll",
        Some(json!({"nodeId": 1, "selector": "p.x"})),
    )
    .await;
    assert_eq!(response["result"]["nodeIds"], json!(expected));
}

#[tokio::test]
async fn test_pierce_selector_crosses_shadow_roots() {
    let (_session, page) = page(
        r#"<div><template shadowrootmode="open"><span class="deep"></span></template></div>"#,
    );

    let css = call(
        &page,
        "DOM.querySelectorAll",
        Some(json!({"nodeId": 1, "selector": ".deep"})),
    )
    .await;
    assert_eq!(css["result"]["nodeIds"], json!([]));

    let pierce = call(
        &page,
        "DOM.querySelectorAll",
        Some(json!({"nodeId": 1, "selector": "pierce/.deep"})),
    )
    .await;
    assert_eq!(pierce["result"]["nodeIds"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_box_model_shape() {
    let (_session, page) = page(r#"<div style="width: 40px; height: 10px; margin: 5px"></div>"#);
    let div = page.query_selector("div").await.unwrap().unwrap();

    let response = call(&page, "DOM.getBoxModel", Some(json!({"nodeId": div.node_id()}))).await;
    let model = &response["result"]["model"];
    for quad in ["content", "padding", "border", "margin"] {
        assert_eq!(model[quad].as_array().unwrap().len(), 8, "{}", quad);
    }
    assert_eq!(model["margin"], json!([0.0, 0.0, 50.0, 0.0, 50.0, 20.0, 0.0, 20.0]));
    assert_eq!(model["width"], 40.0);
}

// ============================================================================
// CSS Domain Parameter Tests
// ============================================================================

#[tokio::test]
async fn test_computed_style_inherits_visibility() {
    let (_session, page) = page(r#"<div style="visibility: hidden"><p style="display: flex"></p></div>"#);
    let p = page.query_selector("p").await.unwrap().unwrap();

    let response = call(
        &page,
        "CSS.getComputedStyleForNode",
        Some(json!({"nodeId": p.node_id()})),
    )
    .await;
    let properties = response["result"]["computedStyle"].as_array().unwrap();
    let value = |name: &str| {
        properties
            .iter()
            .find(|property| property["name"] == name)
            .map(|property| property["value"].clone())
    };

    assert_eq!(value("display"), Some(json!("flex")));
    assert_eq!(value("visibility"), Some(json!("hidden")));
    assert_eq!(value("pointer-events"), Some(json!("auto")));
}
