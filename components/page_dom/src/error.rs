//! Error types for document operations

use cdp_types::domains::dom::NodeId;
use thiserror::Error;

/// Errors raised by [`crate::Document`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Could not find node with given id: {0}")]
    NodeNotFound(NodeId),

    /// Mirrors the platform's `SyntaxError` for unparsable selectors
    #[error("'{0}' is not a valid selector")]
    InvalidSelector(String),

    /// Queries can only run on documents, elements and shadow roots
    #[error("Node {0} cannot be used as a query scope")]
    InvalidScope(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Element {0} already hosts a shadow root")]
    ShadowRootExists(NodeId),

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("HTML parse error: {0}")]
    HtmlParse(String),
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DomError>;
