//! Handler names

use std::fmt;

use crate::error::{QueryError, Result};

/// A validated query handler name, ASCII letters only
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerName(String);

impl HandlerName {
    /// Validate `name`
    ///
    /// # Example
    /// ```
    /// use query_handlers::HandlerName;
    ///
    /// assert!(HandlerName::parse("getById").is_ok());
    /// assert!(HandlerName::parse("get-by-id").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self> {
        if is_valid_handler_name(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(QueryError::InvalidName(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for HandlerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for HandlerName {
    type Error = QueryError;

    fn try_from(name: &str) -> Result<Self> {
        Self::parse(name)
    }
}

impl AsRef<str> for HandlerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether `name` matches `^[a-zA-Z]+$`
pub fn is_valid_handler_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphabetic())
}
