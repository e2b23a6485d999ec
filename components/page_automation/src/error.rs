//! Error types for page automation

use cdp_types::CdpError;
use page_dom::DomError;
use query_handlers::QueryError;
use std::time::Duration;
use thiserror::Error;

/// Messages reported when an element cannot be interacted with
pub const DETACHED_MESSAGE: &str = "Node is detached from document";
pub const NOT_VISIBLE_MESSAGE: &str = "Node is either not visible or not an HTMLElement";
pub const NOT_ELEMENT_MESSAGE: &str = "Node is not of type HTMLElement";

/// Errors that can occur in automation operations
#[derive(Error, Debug)]
pub enum AutomationError {
    /// Selector resolution failed
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Dom(#[from] DomError),

    /// A wait ran out of time
    #[error("Waiting for selector `{selector}` failed: timeout {}ms exceeded", .timeout.as_millis())]
    Timeout { selector: String, timeout: Duration },

    /// The element has no clickable point
    #[error("{0}")]
    NotInteractable(&'static str),

    /// `$eval`-style call found nothing
    #[error("failed to find element matching selector \"{0}\"")]
    ElementNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A protocol method failed
    #[error("Protocol error: {0}")]
    Protocol(#[from] CdpError),

    /// Other errors, including failures raised by evaluation callbacks
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for automation operations
pub type Result<T> = std::result::Result<T, AutomationError>;
