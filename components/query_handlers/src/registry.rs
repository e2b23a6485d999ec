//! Query handler registry
//!
//! Maps handler names to [`QueryHandler`]s and resolves selector strings
//! against a document scope. Each registry is owned by its session, so
//! sessions never observe each other's handlers.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use page_dom::{Document, NodeId};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::builtin::{builtin_handlers, BUILTIN_HANDLER_NAMES};
use crate::error::{QueryError, Result};
use crate::handler::QueryHandler;
use crate::name::HandlerName;
use crate::selector::{parse_selector, ParsedSelector};

/// Registry of custom and built-in query handlers
///
/// Resolution is synchronous and side-effect free apart from reading the
/// document, so it can be called repeatedly by polling callers.
///
/// # Example
/// ```
/// use page_dom::Document;
/// use query_handlers::{QueryHandler, QueryHandlerRegistry};
///
/// let registry = QueryHandlerRegistry::new();
/// registry
///     .register(
///         "getById",
///         QueryHandler::new().with_query_one(|document, scope, id| {
///             Ok(document.query_selector(scope, &format!("[id=\"{}\"]", id))?)
///         }),
///     )
///     .unwrap();
///
/// let document = Document::new();
/// document.set_content(r#"<div id="foo"></div>"#).unwrap();
/// let found = registry.query_one(&document, document.root(), "getById/foo").unwrap();
/// assert!(found.is_some());
/// ```
pub struct QueryHandlerRegistry {
    custom: DashMap<String, QueryHandler>,
    builtins: HashMap<&'static str, QueryHandler>,
}

impl QueryHandlerRegistry {
    /// Registry with the built-in handlers and no custom handlers
    pub fn new() -> Self {
        Self {
            custom: DashMap::new(),
            builtins: builtin_handlers().into_iter().collect(),
        }
    }

    /// Register a custom handler under `name`
    ///
    /// The name is validated before anything is stored. Names already in use,
    /// including the built-in ones, are rejected.
    pub fn register(&self, name: &str, handler: QueryHandler) -> Result<()> {
        let name = HandlerName::parse(name)?;
        if BUILTIN_HANDLER_NAMES.contains(&name.as_str()) {
            return Err(QueryError::DuplicateName(name.into_inner()));
        }
        if handler.is_empty() {
            return Err(QueryError::InvalidHandler(name.into_inner()));
        }

        match self.custom.entry(name.into_inner()) {
            Entry::Occupied(entry) => Err(QueryError::DuplicateName(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!("Registered query handler: {}", entry.key());
                entry.insert(handler);
                Ok(())
            }
        }
    }

    /// Remove a custom handler; returns whether one was registered
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.custom.remove(name).is_some();
        if removed {
            debug!("Unregistered query handler: {}", name);
        } else {
            debug!("No query handler named {} to unregister", name);
        }
        removed
    }

    /// Remove every custom handler; built-in handlers stay
    pub fn clear(&self) {
        let count = self.custom.len();
        self.custom.clear();
        debug!("Cleared {} custom query handlers", count);
    }

    /// Registered custom handler names, sorted
    pub fn handler_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.custom.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Whether a custom handler named `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    pub fn builtin_names(&self) -> &'static [&'static str] {
        BUILTIN_HANDLER_NAMES
    }

    /// Clone the handler out so the map is not held while it runs
    fn lookup(&self, name: &str) -> Result<QueryHandler> {
        if let Some(handler) = self.builtins.get(name) {
            return Ok(handler.clone());
        }
        match self.custom.get(name) {
            Some(handler) => Ok(handler.value().clone()),
            None => {
                warn!("Query handler not found: {}", name);
                Err(QueryError::HandlerNotFound(name.to_string()))
            }
        }
    }

    /// Resolve `selector` to at most one node under `scope`
    pub fn query_one(
        &self,
        document: &Document,
        scope: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>> {
        document.ensure_scope(scope)?;
        match parse_selector(selector) {
            ParsedSelector::Css(css) => Ok(document.query_selector(scope, css)?),
            ParsedSelector::Handler { name, arg } => {
                let handler = self.lookup(name)?;
                debug!("Dispatching single query to handler {}", name);
                handler
                    .query_one(document, scope, arg)
                    .map_err(QueryError::Handler)
            }
        }
    }

    /// Resolve `selector` to every matching node under `scope`
    pub fn query_all(
        &self,
        document: &Document,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>> {
        document.ensure_scope(scope)?;
        match parse_selector(selector) {
            ParsedSelector::Css(css) => Ok(document.query_selector_all(scope, css)?),
            ParsedSelector::Handler { name, arg } => {
                let handler = self.lookup(name)?;
                debug!("Dispatching multi query to handler {}", name);
                handler
                    .query_all(document, scope, arg)
                    .map_err(QueryError::Handler)
            }
        }
    }
}

impl Default for QueryHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryHandlerRegistry")
            .field("custom", &self.handler_names())
            .field("builtins", &BUILTIN_HANDLER_NAMES)
            .finish()
    }
}
