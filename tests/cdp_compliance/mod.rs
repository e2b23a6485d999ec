//! Protocol compliance suite
//!
//! Checks the `DOM` and `CSS` domains of a page against protocol
//! conventions: parameter validation, error codes and response shapes.

mod error_response_tests;
mod method_parameter_tests;
