//! In-memory page document
//!
//! The page model query handlers and element handles run against: a DOM tree
//! with shadow roots, an HTML fragment parser, a CSS selector engine, deep
//! (shadow-piercing) traversal, inline-style layout, an accessibility model
//! and mouse input.
//!
//! # Example
//!
//! ```
//! use page_dom::Document;
//!
//! let document = Document::new();
//! document
//!     .set_content(r#"<button style="width: 80px; height: 20px">Save</button>"#)
//!     .unwrap();
//!
//! let button = document.query_selector(document.root(), "button").unwrap().unwrap();
//! assert_eq!(document.accessible_name(button), "Save");
//! assert!(document.box_model(button).unwrap().is_some());
//! ```

mod accessibility;
mod document;
mod error;
mod events;
mod html;
mod layout;
mod selector;
mod traversal;

pub use accessibility::normalize_whitespace;
pub use document::{Document, DOCUMENT_NODE_ID};
pub use error::{DomError, Result};
pub use events::{MouseEvent, MouseEventKind};
pub use layout::{ComputedStyle, Display, Edges, PointerEvents, Visibility};
pub use selector::Selector;

pub use cdp_types::domains::dom::{BoxModel, NodeId, NodeType, Quad, Rect, ShadowRootType};
