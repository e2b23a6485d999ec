//! Corten automation client
//!
//! Element handles and custom query handlers over an in-process page. See
//! [`page_automation`] for the API.

pub use page_automation::*;
