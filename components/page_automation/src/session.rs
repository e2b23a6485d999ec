//! Automation session

use parking_lot::Mutex;
use query_handlers::{QueryHandler, QueryHandlerRegistry};
use std::sync::Arc;
use tracing::{debug, info};

use crate::page::Page;
use crate::{AutomationConfig, Result};

/// Owns the query handler registry and configuration shared by its pages
///
/// Handlers registered on a session are visible to every page the session
/// created, including pages created before the registration. Sessions do
/// not share handlers with each other.
///
/// # Example
///
/// ```
/// use page_automation::{AutomationConfig, AutomationSession, QueryHandler};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let session = AutomationSession::new(AutomationConfig::default())?;
/// session.register_handler(
///     "getById",
///     QueryHandler::new().with_query_one(|document, scope, id| {
///         Ok(document.query_selector(scope, &format!("[id=\"{}\"]", id))?)
///     }),
/// )?;
///
/// let page = session.new_page();
/// page.set_content(r#"<div id="foo">Foo</div>"#)?;
/// let element = page.query_selector("getById/foo").await?;
/// assert!(element.is_some());
/// # Ok(())
/// # }
/// ```
pub struct AutomationSession {
    config: Arc<AutomationConfig>,
    registry: Arc<QueryHandlerRegistry>,
    pages: Mutex<Vec<Page>>,
}

impl AutomationSession {
    /// Create a session after validating `config`
    pub fn new(config: AutomationConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "Creating automation session (viewport {}x{})",
            config.viewport().width,
            config.viewport().height
        );

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(QueryHandlerRegistry::new()),
            pages: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &AutomationConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<QueryHandlerRegistry> {
        &self.registry
    }

    /// Register a custom query handler under `name`
    pub fn register_handler(&self, name: &str, handler: QueryHandler) -> Result<()> {
        self.registry.register(name, handler)?;
        info!("Registered custom query handler: {}", name);
        Ok(())
    }

    /// Unregister a custom query handler; returns whether it was registered
    pub fn unregister_handler(&self, name: &str) -> bool {
        let removed = self.registry.unregister(name);
        if removed {
            info!("Unregistered custom query handler: {}", name);
        }
        removed
    }

    /// Remove every custom query handler
    pub fn clear_handlers(&self) {
        self.registry.clear();
        info!("Cleared custom query handlers");
    }

    /// Registered custom handler names, sorted
    pub fn handler_names(&self) -> Vec<String> {
        self.registry.handler_names()
    }

    /// Open a new blank page
    pub fn new_page(&self) -> Page {
        let page = Page::new(self.registry.clone(), self.config.clone());
        let mut pages = self.pages.lock();
        pages.push(page.clone());
        debug!("Opened page {}", pages.len());
        page
    }

    /// Pages opened by this session, oldest first
    pub fn pages(&self) -> Vec<Page> {
        self.pages.lock().clone()
    }

    /// Stop tracking `page`; returns whether it belonged to this session
    ///
    /// The page's document is freed once the caller drops its own clones.
    pub fn close_page(&self, page: &Page) -> bool {
        let mut pages = self.pages.lock();
        let before = pages.len();
        pages.retain(|open| !Arc::ptr_eq(open.document(), page.document()));
        let closed = pages.len() < before;
        if closed {
            debug!("Closed page, {} still open", pages.len());
        }
        closed
    }
}

impl std::fmt::Debug for AutomationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationSession")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("pages", &self.pages.lock().len())
            .finish()
    }
}
