//! Custom query handlers
//!
//! A selector string either names a handler, `<name>/<arg>`, or is plain
//! CSS. The [`QueryHandlerRegistry`] splits the prefix, looks the handler up
//! and runs its single- or multi-result capability against a
//! [`page_dom::Document`] scope.
//!
//! Built-in handlers:
//! - `aria/<name>&<role>` - accessible name and/or role
//! - `pierce/<css>` - CSS through shadow roots
//! - `text/<text>` - innermost elements containing the text

mod builtin;
mod error;
mod handler;
mod name;
mod registry;
mod selector;

pub use builtin::{
    aria_handler, pierce_handler, text_handler, AriaQuery, ARIA_HANDLER, BUILTIN_HANDLER_NAMES,
    PIERCE_HANDLER, TEXT_HANDLER,
};
pub use error::{QueryError, Result};
pub use handler::{QueryAllFn, QueryHandler, QueryOneFn};
pub use name::{is_valid_handler_name, HandlerName};
pub use registry::QueryHandlerRegistry;
pub use selector::{parse_selector, ParsedSelector};
