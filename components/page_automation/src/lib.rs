//! Page automation with custom query handlers
//!
//! An [`AutomationSession`] owns the query handler registry and opens
//! [`Page`]s. Pages resolve selectors, either CSS or `name/arg` for a
//! registered query handler, into [`ElementHandle`]s that expose geometry,
//! visibility, input dispatch and nested queries.
//!
//! # Example
//!
//! ```
//! use page_automation::{AutomationConfig, AutomationSession, QueryHandler};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = AutomationSession::new(AutomationConfig::default())?;
//! session.register_handler(
//!     "getByClass",
//!     QueryHandler::new().with_query_all(|document, scope, class| {
//!         Ok(document.query_selector_all(scope, &format!(".{}", class))?)
//!     }),
//! )?;
//!
//! let page = session.new_page();
//! page.set_content(r#"<button class="go" style="width: 80px; height: 20px">Go</button>"#)?;
//! let button = page.query_selector("getByClass/go").await?.unwrap();
//! button.click().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod element_handle;
mod error;
mod mouse;
mod page;
mod session;
mod wait;

pub use config::{AutomationConfig, AutomationConfigBuilder, Viewport, WaitForSelectorOptions};
pub use element_handle::ElementHandle;
pub use error::{
    AutomationError, Result, DETACHED_MESSAGE, NOT_ELEMENT_MESSAGE, NOT_VISIBLE_MESSAGE,
};
pub use mouse::Mouse;
pub use page::Page;
pub use session::AutomationSession;

pub use page_dom::{Document, MouseEvent, MouseEventKind};
pub use query_handlers::{QueryError, QueryHandler};
