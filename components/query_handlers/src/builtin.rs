//! Built-in query handlers
//!
//! * `aria/<name>&<role>` matches by accessible name and/or role
//! * `pierce/<css>` matches CSS inside every shadow root under the scope
//! * `text/<text>` matches the innermost elements containing the text
//!
//! All three search the scope's deep subtree, shadow trees included.

use anyhow::bail;
use page_dom::{normalize_whitespace, Document, NodeId, Selector};

use crate::handler::QueryHandler;

pub const ARIA_HANDLER: &str = "aria";
pub const PIERCE_HANDLER: &str = "pierce";
pub const TEXT_HANDLER: &str = "text";

/// Names that cannot be registered as custom handlers
pub const BUILTIN_HANDLER_NAMES: &[&str] = &[ARIA_HANDLER, PIERCE_HANDLER, TEXT_HANDLER];

/// Elements whose text is never user-visible
const NON_TEXT_TAGS: &[&str] = &["head", "script", "style", "template", "title", "noscript"];

pub(crate) fn builtin_handlers() -> Vec<(&'static str, QueryHandler)> {
    vec![
        (ARIA_HANDLER, aria_handler()),
        (PIERCE_HANDLER, pierce_handler()),
        (TEXT_HANDLER, text_handler()),
    ]
}

/// Parsed `aria/` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AriaQuery {
    /// Whitespace-normalized accessible name, `None` matches any name
    pub name: Option<String>,
    pub role: Option<String>,
}

impl AriaQuery {
    /// Parse `name&role`, splitting at the last `&`; either side may be
    /// empty but not both
    ///
    /// Whatever follows the last `&` is the role, so a name containing `&`
    /// needs a trailing `&` (`Fish & Chips&`). Without it `Fish & Chips`
    /// reads as name `Fish` with role `chips`.
    pub fn parse(arg: &str) -> anyhow::Result<Self> {
        let (name, role) = match arg.rfind('&') {
            Some(split) => (&arg[..split], &arg[split + 1..]),
            None => (arg, ""),
        };
        let name = normalize_whitespace(name);
        let role = role.trim().to_ascii_lowercase();

        if name.is_empty() && role.is_empty() {
            bail!("Invalid aria selector \"{}\"", arg);
        }
        Ok(Self {
            name: (!name.is_empty()).then_some(name),
            role: (!role.is_empty()).then_some(role),
        })
    }

    fn matches(&self, document: &Document, element: NodeId) -> bool {
        if document.is_hidden_from_accessibility(element) {
            return false;
        }
        if let Some(role) = &self.role {
            if document.aria_role(element).as_deref() != Some(role.as_str()) {
                return false;
            }
        }
        match &self.name {
            Some(name) => document.accessible_name(element) == *name,
            None => true,
        }
    }
}

fn aria_matches(document: &Document, scope: NodeId, arg: &str) -> anyhow::Result<Vec<NodeId>> {
    let query = AriaQuery::parse(arg)?;
    Ok(document
        .deep_elements(scope)
        .into_iter()
        .filter(|element| query.matches(document, *element))
        .collect())
}

pub fn aria_handler() -> QueryHandler {
    QueryHandler::new()
        .with_query_one(|document, scope, arg| {
            let query = AriaQuery::parse(arg)?;
            Ok(document
                .deep_elements(scope)
                .into_iter()
                .find(|element| query.matches(document, *element)))
        })
        .with_query_all(aria_matches)
}

pub fn pierce_handler() -> QueryHandler {
    QueryHandler::new().with_query_all(|document, scope, css| {
        let selector = Selector::parse(css)?;
        Ok(document
            .deep_elements(scope)
            .into_iter()
            .filter(|element| document.matches_selector(*element, &selector))
            .collect())
    })
}

fn contains_text(document: &Document, element: NodeId, text: &str) -> bool {
    document
        .local_name(element)
        .is_some_and(|tag| !NON_TEXT_TAGS.contains(&tag.as_str()))
        && document.text_content(element).contains(text)
}

pub fn text_handler() -> QueryHandler {
    QueryHandler::new().with_query_all(|document, scope, text| {
        Ok(document
            .deep_elements(scope)
            .into_iter()
            .filter(|element| {
                contains_text(document, *element, text)
                    && !document
                        .element_children(*element)
                        .into_iter()
                        .any(|child| contains_text(document, child, text))
            })
            .collect())
    })
}
