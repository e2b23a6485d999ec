//! Query handler capability record

use page_dom::{Document, NodeId};
use std::fmt;
use std::sync::Arc;

/// Single-result handler body: `(document, scope, arg)`
pub type QueryOneFn =
    Arc<dyn Fn(&Document, NodeId, &str) -> anyhow::Result<Option<NodeId>> + Send + Sync>;

/// Multi-result handler body: `(document, scope, arg)`
pub type QueryAllFn =
    Arc<dyn Fn(&Document, NodeId, &str) -> anyhow::Result<Vec<NodeId>> + Send + Sync>;

/// A query handler: an optional single-result and an optional multi-result
/// capability
///
/// Whichever capability is missing is derived from the other: a handler with
/// only `query_all` answers single queries with the first match, a handler
/// with only `query_one` answers multi queries with zero or one match.
///
/// # Example
/// ```
/// use query_handlers::QueryHandler;
///
/// let handler = QueryHandler::new().with_query_one(|document, scope, id| {
///     Ok(document.query_selector(scope, &format!("[id=\"{}\"]", id))?)
/// });
/// assert!(handler.has_query_one());
/// assert!(!handler.has_query_all());
/// ```
#[derive(Clone, Default)]
pub struct QueryHandler {
    query_one: Option<QueryOneFn>,
    query_all: Option<QueryAllFn>,
}

impl QueryHandler {
    /// Handler with no capabilities; add at least one before registering
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query_one<F>(mut self, query_one: F) -> Self
    where
        F: Fn(&Document, NodeId, &str) -> anyhow::Result<Option<NodeId>> + Send + Sync + 'static,
    {
        self.query_one = Some(Arc::new(query_one));
        self
    }

    pub fn with_query_all<F>(mut self, query_all: F) -> Self
    where
        F: Fn(&Document, NodeId, &str) -> anyhow::Result<Vec<NodeId>> + Send + Sync + 'static,
    {
        self.query_all = Some(Arc::new(query_all));
        self
    }

    pub fn has_query_one(&self) -> bool {
        self.query_one.is_some()
    }

    pub fn has_query_all(&self) -> bool {
        self.query_all.is_some()
    }

    /// Whether neither capability is present
    pub fn is_empty(&self) -> bool {
        self.query_one.is_none() && self.query_all.is_none()
    }

    /// Resolve at most one node, falling back to the first `query_all` match
    pub fn query_one(
        &self,
        document: &Document,
        scope: NodeId,
        arg: &str,
    ) -> anyhow::Result<Option<NodeId>> {
        match (&self.query_one, &self.query_all) {
            (Some(query_one), _) => query_one(document, scope, arg),
            (None, Some(query_all)) => Ok(query_all(document, scope, arg)?.into_iter().next()),
            (None, None) => Ok(None),
        }
    }

    /// Resolve every match, falling back to the `query_one` result
    pub fn query_all(
        &self,
        document: &Document,
        scope: NodeId,
        arg: &str,
    ) -> anyhow::Result<Vec<NodeId>> {
        match (&self.query_all, &self.query_one) {
            (Some(query_all), _) => query_all(document, scope, arg),
            (None, Some(query_one)) => Ok(query_one(document, scope, arg)?.into_iter().collect()),
            (None, None) => Ok(Vec::new()),
        }
    }
}

impl fmt::Debug for QueryHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryHandler")
            .field("query_one", &self.has_query_one())
            .field("query_all", &self.has_query_all())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Document {
        let document = Document::new();
        document
            .set_content(r#"<i class="x"></i><b class="x"></b>"#)
            .unwrap();
        document
    }

    fn by_class_all() -> QueryHandler {
        QueryHandler::new().with_query_all(|document, scope, class| {
            Ok(document.query_selector_all(scope, &format!(".{}", class))?)
        })
    }

    fn by_class_one() -> QueryHandler {
        QueryHandler::new().with_query_one(|document, scope, class| {
            Ok(document.query_selector(scope, &format!(".{}", class))?)
        })
    }

    #[test]
    fn test_single_derived_from_all() {
        let document = page();
        let handler = by_class_all();
        let all = handler.query_all(&document, document.root(), "x").unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(
            handler.query_one(&document, document.root(), "x").unwrap(),
            Some(all[0])
        );
        assert_eq!(handler.query_one(&document, document.root(), "y").unwrap(), None);
    }

    #[test]
    fn test_all_derived_from_single() {
        let document = page();
        let handler = by_class_one();
        let one = handler.query_one(&document, document.root(), "x").unwrap();

        assert_eq!(
            handler.query_all(&document, document.root(), "x").unwrap(),
            one.into_iter().collect::<Vec<_>>()
        );
        assert!(handler
            .query_all(&document, document.root(), "y")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_errors_pass_through() {
        let document = page();
        let handler = QueryHandler::new().with_query_all(|_, _, arg| anyhow::bail!("bad {}", arg));

        let error = handler.query_one(&document, document.root(), "arg").unwrap_err();
        assert_eq!(error.to_string(), "bad arg");
    }

    #[test]
    fn test_debug_shows_capabilities() {
        let debug = format!("{:?}", by_class_one());
        assert_eq!(debug, "QueryHandler { query_one: true, query_all: false }");
        assert!(QueryHandler::new().is_empty());
    }
}
