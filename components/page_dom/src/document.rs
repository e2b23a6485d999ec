//! In-memory document tree
//!
//! The document plays the role of the page's script realm: query handlers,
//! the selector engine, layout and accessibility all read from it. Nodes live
//! in concurrent maps keyed by [`NodeId`] and are never freed; removing a node
//! only detaches it, so stale handles observe a disconnected node instead of a
//! dangling id.

use cdp_types::domains::dom::{Node, NodeId, NodeType, ShadowRootType};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{DomError, Result};
use crate::events::MouseEvent;

/// Id of the `#document` node of every [`Document`]
pub const DOCUMENT_NODE_ID: NodeId = NodeId(1);

/// Stored state of one node
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) node_type: NodeType,
    /// Lower-case tag name for elements
    pub(crate) local_name: String,
    /// Character data for text and comment nodes
    pub(crate) value: String,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) shadow_root_type: Option<ShadowRootType>,
}

impl NodeData {
    fn document() -> Self {
        Self {
            node_type: NodeType::Document,
            local_name: String::new(),
            value: String::new(),
            attributes: Vec::new(),
            shadow_root_type: None,
        }
    }

    fn element(tag: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            local_name: tag.to_ascii_lowercase(),
            ..Self::document()
        }
    }

    fn text(value: &str) -> Self {
        Self {
            node_type: NodeType::Text,
            value: value.to_string(),
            ..Self::document()
        }
    }

    fn shadow_root(mode: ShadowRootType) -> Self {
        Self {
            node_type: NodeType::DocumentFragment,
            shadow_root_type: Some(mode),
            ..Self::document()
        }
    }

    fn node_name(&self) -> String {
        match self.node_type {
            NodeType::Element => self.local_name.to_ascii_uppercase(),
            NodeType::Text => "#text".to_string(),
            NodeType::Comment => "#comment".to_string(),
            NodeType::Document => "#document".to_string(),
            NodeType::DocumentFragment => "#document-fragment".to_string(),
            _ => String::new(),
        }
    }

    fn is_container(&self) -> bool {
        matches!(
            self.node_type,
            NodeType::Document | NodeType::Element | NodeType::DocumentFragment
        )
    }
}

/// A page document: `#document > html > (head, body)` plus whatever content
/// is added under it
pub struct Document {
    nodes: DashMap<NodeId, NodeData>,
    children: DashMap<NodeId, Vec<NodeId>>,
    parents: DashMap<NodeId, NodeId>,
    /// host -> shadow root
    shadow_roots: DashMap<NodeId, NodeId>,
    /// shadow root -> host
    shadow_hosts: DashMap<NodeId, NodeId>,
    next_node_id: AtomicU32,
    document_element: NodeId,
    head: NodeId,
    body: NodeId,
    pub(crate) hovered: RwLock<Option<NodeId>>,
    pub(crate) event_log: Mutex<Vec<MouseEvent>>,
    pub(crate) event_sender: broadcast::Sender<MouseEvent>,
}

impl Document {
    /// Create an empty document with `html`, `head` and `body` elements
    ///
    /// # Example
    /// ```
    /// use page_dom::Document;
    ///
    /// let document = Document::new();
    /// assert!(document.query_selector(document.root(), "body").unwrap().is_some());
    /// ```
    pub fn new() -> Self {
        let (event_sender, _) = broadcast::channel(256);
        let mut document = Self {
            nodes: DashMap::new(),
            children: DashMap::new(),
            parents: DashMap::new(),
            shadow_roots: DashMap::new(),
            shadow_hosts: DashMap::new(),
            next_node_id: AtomicU32::new(DOCUMENT_NODE_ID.0),
            document_element: DOCUMENT_NODE_ID,
            head: DOCUMENT_NODE_ID,
            body: DOCUMENT_NODE_ID,
            hovered: RwLock::new(None),
            event_log: Mutex::new(Vec::new()),
            event_sender,
        };

        let root = document.allocate(NodeData::document());
        let html = document.create_element("html");
        let head = document.create_element("head");
        let body = document.create_element("body");
        document.link(root, html);
        document.link(html, head);
        document.link(html, body);

        document.document_element = html;
        document.head = head;
        document.body = body;
        document
    }

    fn allocate(&self, data: NodeData) -> NodeId {
        let id = NodeId(self.next_node_id.fetch_add(1, Ordering::SeqCst));
        if data.is_container() {
            self.children.insert(id, Vec::new());
        }
        self.nodes.insert(id, data);
        id
    }

    fn link(&self, parent: NodeId, child: NodeId) {
        self.children.entry(parent).or_default().push(child);
        self.parents.insert(child, parent);
    }

    pub fn root(&self) -> NodeId {
        DOCUMENT_NODE_ID
    }

    pub fn document_element(&self) -> NodeId {
        self.document_element
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.allocate(NodeData::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&self, text: &str) -> NodeId {
        self.allocate(NodeData::text(text))
    }

    pub(crate) fn create_comment(&self, text: &str) -> NodeId {
        self.allocate(NodeData {
            node_type: NodeType::Comment,
            ..NodeData::text(text)
        })
    }

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached somewhere
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_data = self.node_data(parent)?;
        let child_data = self.node_data(child)?;

        if !parent_data.is_container() {
            return Err(DomError::HierarchyRequest(format!(
                "node {} cannot have children",
                parent
            )));
        }
        if matches!(
            child_data.node_type,
            NodeType::Document | NodeType::DocumentFragment
        ) {
            return Err(DomError::HierarchyRequest(format!(
                "node {} cannot be inserted",
                child
            )));
        }

        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(DomError::HierarchyRequest(format!(
                    "node {} is an ancestor of {}",
                    child, parent
                )));
            }
            cursor = self.flat_parent(current);
        }

        self.detach(child);
        self.link(parent, child);
        Ok(())
    }

    /// Create an element with attributes and append it to `parent`
    pub fn append_element(
        &self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<NodeId> {
        let element = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(element, name, value)?;
        }
        self.append_child(parent, element)?;
        Ok(element)
    }

    /// Create a text node and append it to `parent`
    pub fn append_text(&self, parent: NodeId, text: &str) -> Result<NodeId> {
        let node = self.create_text(text);
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Detach a node from its parent; the node stays addressable
    pub fn remove_node(&self, id: NodeId) -> Result<()> {
        let data = self.node_data(id)?;
        if data.node_type == NodeType::Document {
            return Err(DomError::HierarchyRequest(
                "the document node cannot be removed".to_string(),
            ));
        }
        debug!("Removing node {}", id);
        self.detach(id);
        Ok(())
    }

    fn detach(&self, id: NodeId) {
        if let Some((_, parent)) = self.parents.remove(&id) {
            if let Some(mut siblings) = self.children.get_mut(&parent) {
                siblings.retain(|sibling| *sibling != id);
            }
        }
    }

    /// Attach a shadow root to an element
    pub fn attach_shadow(&self, host: NodeId, mode: ShadowRootType) -> Result<NodeId> {
        if !self.is_element(host) {
            return Err(DomError::NotAnElement(host));
        }
        if self.shadow_roots.contains_key(&host) {
            return Err(DomError::ShadowRootExists(host));
        }

        let root = self.allocate(NodeData::shadow_root(mode));
        self.shadow_roots.insert(host, root);
        self.shadow_hosts.insert(root, host);
        debug!("Attached shadow root {} to host {}", root, host);
        Ok(root)
    }

    /// Replace the body content with the parsed HTML fragment
    ///
    /// The fragment is parsed into a detached container first. When parsing
    /// fails the body keeps its previous content.
    pub fn set_content(&self, html: &str) -> Result<()> {
        let staging = self.create_element("body");
        crate::html::parse_fragment(self, staging, html)?;

        // A top-level declarative shadow root belongs to the body
        let staged_shadow = self.shadow_roots.get(&staging).map(|root| *root);
        if staged_shadow.is_some() && self.shadow_roots.contains_key(&self.body) {
            return Err(DomError::ShadowRootExists(self.body));
        }

        for child in self.children(self.body) {
            self.detach(child);
        }
        *self.hovered.write() = None;

        if let Some(root) = staged_shadow {
            self.shadow_roots.remove(&staging);
            self.shadow_roots.insert(self.body, root);
            self.shadow_hosts.insert(root, self.body);
        }
        for child in self.children(staging) {
            self.append_child(self.body, child)?;
        }
        Ok(())
    }

    pub(crate) fn node_data(&self, id: NodeId) -> Result<NodeData> {
        self.nodes
            .get(&id)
            .map(|n| n.value().clone())
            .ok_or(DomError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_type(&self, id: NodeId) -> Result<NodeType> {
        self.nodes
            .get(&id)
            .map(|n| n.node_type)
            .ok_or(DomError::NodeNotFound(id))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node_type(id), Ok(NodeType::Element))
    }

    pub fn is_shadow_root(&self, id: NodeId) -> bool {
        self.shadow_hosts.contains_key(&id)
    }

    /// Lower-case tag name, `None` for non-elements
    pub fn local_name(&self, id: NodeId) -> Option<String> {
        let node = self.nodes.get(&id)?;
        (node.node_type == NodeType::Element).then(|| node.local_name.clone())
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<String> {
        let node = self.nodes.get(&id)?;
        node.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    /// Attributes in source order
    pub fn attributes(&self, id: NodeId) -> Vec<(String, String)> {
        self.nodes
            .get(&id)
            .map(|n| n.attributes.clone())
            .unwrap_or_default()
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let mut node = self.nodes.get_mut(&id).ok_or(DomError::NodeNotFound(id))?;
        if node.node_type != NodeType::Element {
            return Err(DomError::NotAnElement(id));
        }

        let name = name.to_ascii_lowercase();
        match node.attributes.iter().position(|(key, _)| *key == name) {
            Some(index) => node.attributes[index].1 = value.to_string(),
            None => node.attributes.push((name, value.to_string())),
        }
        Ok(())
    }

    pub fn remove_attribute(&self, id: NodeId, name: &str) -> Result<()> {
        let mut node = self.nodes.get_mut(&id).ok_or(DomError::NodeNotFound(id))?;
        if node.node_type != NodeType::Element {
            return Err(DomError::NotAnElement(id));
        }
        node.attributes
            .retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        Ok(())
    }

    pub fn class_list(&self, id: NodeId) -> Vec<String> {
        self.get_attribute(id, "class")
            .map(|classes| classes.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Light-tree parent
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).map(|p| *p.value())
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|parent| self.is_element(*parent))
    }

    /// Parent in the flattened tree: the light parent, or the host for a
    /// shadow root
    pub fn flat_parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).or_else(|| self.shadow_host(id))
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.children
            .get(&id)
            .map(|c| c.value().clone())
            .unwrap_or_default()
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .into_iter()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.shadow_roots.get(&host).map(|r| *r.value())
    }

    pub fn shadow_host(&self, root: NodeId) -> Option<NodeId> {
        self.shadow_hosts.get(&root).map(|h| *h.value())
    }

    /// Whether the node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == DOCUMENT_NODE_ID {
                return true;
            }
            cursor = self.flat_parent(current);
        }
        false
    }

    /// Concatenated character data of all light-tree text descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let Ok(data) = self.node_data(id) else {
            return String::new();
        };
        match data.node_type {
            NodeType::Text | NodeType::Comment => data.value,
            _ => {
                let mut text = String::new();
                for node in self.descendants(id) {
                    if self.node_type(node) == Ok(NodeType::Text) {
                        if let Some(n) = self.nodes.get(&node) {
                            text.push_str(&n.value);
                        }
                    }
                }
                text
            }
        }
    }

    /// First element in document order whose `id` attribute equals `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(DOCUMENT_NODE_ID)
            .into_iter()
            .find(|node| self.get_attribute(*node, "id").as_deref() == Some(id))
    }

    /// Protocol description of a node
    ///
    /// `depth` limits the returned subtree (-1 for unlimited); shadow roots
    /// are included when `pierce` is set.
    pub fn describe_node(&self, id: NodeId, depth: i32, pierce: bool) -> Result<Node> {
        let data = self.node_data(id)?;
        let child_ids = self.children(id);

        let children = if depth != 0 && !child_ids.is_empty() {
            let next = if depth > 0 { depth - 1 } else { depth };
            Some(
                child_ids
                    .iter()
                    .map(|child| self.describe_node(*child, next, pierce))
                    .collect::<Result<Vec<_>>>()?,
            )
        } else {
            None
        };

        let shadow_roots = match self.shadow_root(id) {
            Some(root) if pierce && depth != 0 => {
                let next = if depth > 0 { depth - 1 } else { depth };
                Some(vec![self.describe_node(root, next, pierce)?])
            }
            _ => None,
        };

        let attributes = (data.node_type == NodeType::Element).then(|| {
            data.attributes
                .iter()
                .flat_map(|(name, value)| [name.clone(), value.clone()])
                .collect()
        });

        Ok(Node {
            node_id: id,
            parent_id: self.parent(id),
            node_type: data.node_type,
            node_name: data.node_name(),
            local_name: data.local_name.clone(),
            node_value: data.value.clone(),
            child_node_count: data.is_container().then_some(child_ids.len() as u32),
            children,
            attributes,
            shadow_root_type: data.shadow_root_type,
            shadow_roots,
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("body", &self.body)
            .finish()
    }
}
