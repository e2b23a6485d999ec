//! End-to-end integration tests
//!
//! Drive a session the way an automation script does: register query
//! handlers, load content, resolve elements and interact with them.

use corten_automation::{
    AutomationConfig, AutomationError, AutomationSession, MouseEventKind, Page, QueryError,
    QueryHandler, WaitForSelectorOptions,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

fn session() -> AutomationSession {
    AutomationSession::new(AutomationConfig::default()).expect("default config is valid")
}

fn get_by_id() -> QueryHandler {
    QueryHandler::new().with_query_one(|document, scope, id| {
        Ok(document.query_selector(scope, &format!("[id=\"{}\"]", id))?)
    })
}

fn get_by_class() -> QueryHandler {
    QueryHandler::new().with_query_all(|document, scope, class| {
        Ok(document.query_selector_all(scope, &format!(".{}", class))?)
    })
}

async fn ids(page: &Page, selector: &str) -> Vec<String> {
    page.query_selector_all(selector)
        .await
        .unwrap()
        .iter()
        .filter_map(|element| element.get_attribute("id"))
        .collect()
}

/// Test 1: register, resolve, unregister
#[tokio::test]
async fn test_get_by_id_lifecycle() {
    let session = session();
    let page = session.new_page();
    page.set_content(r#"<div id="not-foo"></div><div id="foo"></div>"#)
        .unwrap();

    session.register_handler("getById", get_by_id()).unwrap();
    let foo = page.query_selector("getById/foo").await.unwrap().unwrap();
    assert_eq!(foo.get_attribute("id").as_deref(), Some("foo"));

    session.unregister_handler("getById");
    let error = page.query_selector("getById/foo").await.unwrap_err();
    assert_eq!(
        error.to_string(),
        "Query set to use \"getById\", but no query handler of that name was found"
    );
}

/// Test 2: multi-only handler answers single queries with its first match
#[tokio::test]
async fn test_get_by_class_document_order() {
    let session = session();
    let page = session.new_page();
    page.set_content(
        r#"<div id="a" class="foo"><p id="b" class="foo"></p></div><span id="c" class="foo"></span><i id="d" class="bar"></i>"#,
    )
    .unwrap();
    session.register_handler("getByClass", get_by_class()).unwrap();

    assert_eq!(ids(&page, "getByClass/foo").await, vec!["a", "b", "c"]);

    let first = page.query_selector("getByClass/foo").await.unwrap().unwrap();
    assert_eq!(first.get_attribute("id").as_deref(), Some("a"));
}

/// Test 3: single-only handler answers multi queries with zero or one match
#[tokio::test]
async fn test_single_only_handler_in_multi_query() {
    let session = session();
    let page = session.new_page();
    page.set_content(r#"<p id="x"></p>"#).unwrap();
    session.register_handler("getById", get_by_id()).unwrap();

    assert_eq!(ids(&page, "getById/x").await, vec!["x"]);
    assert!(page.query_selector_all("getById/y").await.unwrap().is_empty());
}

/// Test 4: name validation happens before anything is stored
#[tokio::test]
async fn test_invalid_names_are_rejected() {
    let session = session();

    for name in ["", "get-by-id", "get by id", "getById2", "get/ById"] {
        let result = session.register_handler(name, get_by_id());
        assert!(
            matches!(result, Err(AutomationError::Query(QueryError::InvalidName(_)))),
            "{:?} should be rejected",
            name
        );
    }
    assert!(session.handler_names().is_empty());
}

/// Test 5: clear removes every custom handler at once
#[tokio::test]
async fn test_clear_handlers() {
    let session = session();
    let page = session.new_page();
    page.set_content("<button>Save</button>").unwrap();
    session.register_handler("getById", get_by_id()).unwrap();
    session.register_handler("getByClass", get_by_class()).unwrap();

    session.clear_handlers();

    assert!(session.handler_names().is_empty());
    for selector in ["getById/x", "getByClass/x"] {
        assert!(matches!(
            page.query_selector(selector).await,
            Err(AutomationError::Query(QueryError::HandlerNotFound(_)))
        ));
    }
    // Built-in handlers survive
    assert!(page.query_selector("aria/Save&button").await.unwrap().is_some());
}

/// Test 6: selectors without a handler prefix are plain CSS
#[tokio::test]
async fn test_css_selectors_are_the_default() {
    let session = session();
    let page = session.new_page();
    page.set_content(r#"<a href="/x/y">link</a><p class="a/b"></p>"#)
        .unwrap();

    let link = page.query_selector(r#"a[href="/x/y"]"#).await.unwrap();
    assert!(link.is_some());
}

/// Test 7: a login form driven through built-in and custom handlers
#[tokio::test]
async fn test_login_form_flow() {
    let session = session();
    session.register_handler("getById", get_by_id()).unwrap();
    let page = session.new_page();
    page.set_content(
        r#"<form style="left: 40px; top: 40px; width: 400px; height: 300px">
             <label for="user">User name</label>
             <input id="user" style="top: 30px; width: 200px; height: 20px">
             <button id="login" style="top: 80px; width: 100px; height: 30px">Log in</button>
           </form>"#,
    )
    .unwrap();

    let input = page.query_selector("aria/User name&textbox").await.unwrap().unwrap();
    assert_eq!(input.get_attribute("id").as_deref(), Some("user"));

    let button = page.query_selector("getById/login").await.unwrap().unwrap();
    assert!(button.is_visible());
    assert_eq!(button.clickable_point().unwrap(), (90.0, 135.0));

    button.click().await.unwrap();
    let clicks: Vec<_> = page
        .events()
        .into_iter()
        .filter(|event| event.kind == MouseEventKind::Click)
        .collect();
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].target, Some(button.node_id()));
}

/// Test 8: text and pierce handlers see into shadow trees
#[tokio::test]
async fn test_shadow_dom_queries() {
    let session = session();
    let page = session.new_page();
    page.set_content(
        r#"<my-card id="card"><template shadowrootmode="open"><h2>Title</h2><slot></slot></template><p>Body text</p></my-card>"#,
    )
    .unwrap();

    assert!(page.query_selector("h2").await.unwrap().is_none());
    let heading = page.query_selector("pierce/h2").await.unwrap().unwrap();
    assert_eq!(heading.text_content().unwrap(), "Title");

    let by_text = page.query_selector("text/Title").await.unwrap().unwrap();
    assert_eq!(by_text, heading);

    let card = page.query_selector("#card").await.unwrap().unwrap();
    let nested = card.query_selector("text/Body").await.unwrap().unwrap();
    assert_eq!(nested.aria_role().as_deref(), Some("paragraph"));
}

/// Test 9: waiting for an element a background task inserts
#[tokio::test]
async fn test_wait_for_custom_selector() {
    let session = Arc::new(session());
    session.register_handler("getByClass", get_by_class()).unwrap();
    let page = session.new_page();

    let writer = page.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(50)).await;
        writer
            .set_content(r#"<div class="toast" style="width: 10px; height: 10px">Saved</div>"#)
            .unwrap();
    });

    let toast = page
        .wait_for_selector(
            "getByClass/toast",
            WaitForSelectorOptions::new()
                .visible()
                .polling(Duration::from_millis(10))
                .timeout(Duration::from_secs(2)),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(toast.text_content().unwrap(), "Saved");
}

/// Test 10: concurrent registration from several tasks
#[tokio::test]
async fn test_concurrent_sessions_and_registration() {
    let session = Arc::new(session());
    let page = session.new_page();
    page.set_content(r#"<b class="x"></b>"#).unwrap();

    let mut tasks = Vec::new();
    for name in ["alpha", "beta", "gamma"] {
        let session = session.clone();
        let page = page.clone();
        tasks.push(tokio::spawn(async move {
            session.register_handler(name, get_by_class()).unwrap();
            page.query_selector_all(&format!("{}/x", name))
                .await
                .unwrap()
                .len()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), 1);
    }
    assert_eq!(session.handler_names(), vec!["alpha", "beta", "gamma"]);
}
