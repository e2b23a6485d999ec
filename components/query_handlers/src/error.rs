//! Error types for query handler registration and resolution

use page_dom::DomError;
use thiserror::Error;

/// Errors raised by [`crate::QueryHandlerRegistry`]
#[derive(Error, Debug)]
pub enum QueryError {
    /// Handler names may only contain ASCII letters
    #[error("Custom query handler names may only contain [a-zA-Z], got \"{0}\"")]
    InvalidName(String),

    #[error("A query handler named \"{0}\" already exists")]
    DuplicateName(String),

    /// Neither `query_one` nor `query_all` was supplied
    #[error("Query handler \"{0}\" must define at least one of queryOne or queryAll")]
    InvalidHandler(String),

    #[error("Query set to use \"{0}\", but no query handler of that name was found")]
    HandlerNotFound(String),

    /// Native CSS resolution or scope failure
    #[error(transparent)]
    Dom(#[from] DomError),

    /// Failure raised by a handler body, passed through unchanged
    #[error(transparent)]
    Handler(anyhow::Error),
}

/// Result type for query handler operations
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_not_found_message() {
        let error = QueryError::HandlerNotFound("getById".to_string());
        assert_eq!(
            error.to_string(),
            "Query set to use \"getById\", but no query handler of that name was found"
        );
    }

    #[test]
    fn test_handler_errors_are_transparent() {
        let error = QueryError::Handler(anyhow::anyhow!("boom"));
        assert_eq!(error.to_string(), "boom");
    }
}
