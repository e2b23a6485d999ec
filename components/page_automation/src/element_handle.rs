//! Element handles
//!
//! An [`ElementHandle`] names one node of a page's document. Geometry reads
//! go straight to the page layout; input goes through the page mouse so it
//! is hit-tested like real input.

use cdp_types::domains::dom::{BoxModel, NodeId, Quad, Rect};
use page_dom::{Document, Visibility};
use std::sync::Arc;
use tracing::debug;

use crate::error::{DETACHED_MESSAGE, NOT_ELEMENT_MESSAGE, NOT_VISIBLE_MESSAGE};
use crate::page::Page;
use crate::{AutomationError, Result};

/// Quads smaller than this are not considered clickable
const MIN_CLICKABLE_AREA: f64 = 1.0;

/// Handle to a node in a page
#[derive(Clone)]
pub struct ElementHandle {
    page: Page,
    node: NodeId,
}

impl ElementHandle {
    pub(crate) fn new(page: Page, node: NodeId) -> Self {
        Self { page, node }
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    fn document(&self) -> &Document {
        self.page.document()
    }

    fn is_element(&self) -> bool {
        self.document().is_element(self.node)
    }

    pub fn is_connected(&self) -> bool {
        self.document().is_connected(self.node)
    }

    /// Border box in viewport coordinates, `None` when the node has no box
    pub fn bounding_box(&self) -> Result<Option<Rect>> {
        if !self.is_element() {
            return Ok(None);
        }
        Ok(self.document().bounding_rect(self.node)?)
    }

    pub fn box_model(&self) -> Result<Option<BoxModel>> {
        if !self.is_element() {
            return Ok(None);
        }
        Ok(self.document().box_model(self.node)?)
    }

    /// Quads covering the element's rendered area
    pub fn content_quads(&self) -> Result<Vec<Quad>> {
        if !self.is_connected() {
            return Err(AutomationError::NotInteractable(DETACHED_MESSAGE));
        }
        if !self.is_element() {
            return Err(AutomationError::NotInteractable(NOT_ELEMENT_MESSAGE));
        }
        Ok(self
            .document()
            .box_model(self.node)?
            .map(|model| vec![model.border])
            .unwrap_or_default())
    }

    /// Center of the first quad that is visible in the viewport
    pub fn clickable_point(&self) -> Result<(f64, f64)> {
        let viewport = self.page.viewport();
        self.content_quads()?
            .iter()
            .filter_map(|quad| Rect::from_quad(quad).intersection(&viewport))
            .find(|visible| visible.area() > MIN_CLICKABLE_AREA)
            .map(|visible| visible.center())
            .ok_or(AutomationError::NotInteractable(NOT_VISIBLE_MESSAGE))
    }

    /// Click the center of the element
    pub async fn click(&self) -> Result<()> {
        let (x, y) = self.clickable_point()?;
        debug!("Clicking node {} at ({}, {})", self.node, x, y);
        self.page.mouse().click(x, y);
        Ok(())
    }

    /// Move the mouse over the center of the element
    pub async fn hover(&self) -> Result<()> {
        let (x, y) = self.clickable_point()?;
        debug!("Hovering node {} at ({}, {})", self.node, x, y);
        self.page.mouse().move_to(x, y);
        Ok(())
    }

    /// Whether the element is rendered with a non-empty box and is not
    /// `visibility: hidden`
    pub fn is_visible(&self) -> bool {
        if !self.is_connected() {
            return false;
        }
        let has_area = matches!(self.bounding_box(), Ok(Some(rect)) if rect.area() > 0.0);
        let style_visible = self
            .document()
            .computed_style(self.node)
            .is_ok_and(|style| style.visibility == Visibility::Visible);
        has_area && style_visible
    }

    pub fn is_hidden(&self) -> bool {
        !self.is_visible()
    }

    /// Share of the element's box inside the viewport, between 0 and 1
    pub fn intersection_ratio(&self) -> f64 {
        let Ok(Some(rect)) = self.bounding_box() else {
            return 0.0;
        };
        if rect.area() == 0.0 {
            return 0.0;
        }
        rect.intersection(&self.page.viewport())
            .map(|visible| visible.area() / rect.area())
            .unwrap_or(0.0)
    }

    pub fn is_intersecting_viewport(&self) -> bool {
        self.intersection_ratio() > 0.0
    }

    /// First element under this one matching `selector`
    pub async fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>> {
        let found = self
            .page
            .registry()
            .query_one(self.document(), self.node, selector)?;
        Ok(found.map(|node| ElementHandle::new(self.page.clone(), node)))
    }

    /// Every element under this one matching `selector`
    pub async fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let found = self
            .page
            .registry()
            .query_all(self.document(), self.node, selector)?;
        Ok(found
            .into_iter()
            .map(|node| ElementHandle::new(self.page.clone(), node))
            .collect())
    }

    /// Run `f` on the first match of `selector` under this element
    pub async fn eval_on_selector<F, R>(&self, selector: &str, f: F) -> Result<R>
    where
        F: FnOnce(&ElementHandle) -> anyhow::Result<R>,
    {
        let element = self
            .query_selector(selector)
            .await?
            .ok_or_else(|| AutomationError::ElementNotFound(selector.to_string()))?;
        f(&element).map_err(AutomationError::Other)
    }

    /// Run `f` on all matches of `selector`; an empty match list is passed
    /// through
    pub async fn eval_on_selector_all<F, R>(&self, selector: &str, f: F) -> Result<R>
    where
        F: FnOnce(&[ElementHandle]) -> anyhow::Result<R>,
    {
        let elements = self.query_selector_all(selector).await?;
        f(&elements).map_err(AutomationError::Other)
    }

    pub fn text_content(&self) -> Result<String> {
        self.document().node_type(self.node)?;
        Ok(self.document().text_content(self.node))
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.document().get_attribute(self.node, name)
    }

    pub fn aria_role(&self) -> Option<String> {
        self.document().aria_role(self.node)
    }

    pub fn accessible_name(&self) -> String {
        self.document().accessible_name(self.node)
    }
}

impl PartialEq for ElementHandle {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && Arc::ptr_eq(self.page.document(), other.page.document())
    }
}

impl Eq for ElementHandle {}

impl std::fmt::Debug for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementHandle")
            .field("node", &self.node)
            .field("local_name", &self.document().local_name(self.node))
            .finish()
    }
}
