// DOM domain types

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Unique DOM node identifier, stable for the lifetime of a document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// DOM node type constants
#[derive(Debug, Clone, Copy, Serialize_repr, Deserialize_repr, PartialEq, Eq)]
#[repr(u32)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CData = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

/// Shadow root kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowRootType {
    UserAgent,
    Open,
    Closed,
}

/// DOM node description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub node_id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    pub node_type: NodeType,
    /// Upper-case tag name for elements, `#text`, `#document`, ...
    pub node_name: String,
    /// Lower-case tag name for elements, empty otherwise
    pub local_name: String,
    pub node_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_node_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
    /// Attributes (flat array: [name1, value1, name2, value2, ...])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_root_type: Option<ShadowRootType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_roots: Option<Vec<Node>>,
}

/// Quad representation (4 points clockwise from top-left: x1,y1,x2,y2,x3,y3,x4,y4)
pub type Quad = [f64; 8];

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle enclosing the quad's points
    pub fn from_quad(quad: &Quad) -> Self {
        let xs = [quad[0], quad[2], quad[4], quad[6]];
        let ys = [quad[1], quad[3], quad[5], quad[7]];
        let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_y = ys.iter().copied().fold(f64::INFINITY, f64::min);
        let max_y = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn to_quad(&self) -> Quad {
        let (left, top) = (self.x, self.y);
        let (right, bottom) = (self.x + self.width, self.y + self.height);
        [left, top, right, top, right, bottom, left, bottom]
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Center point `(x, y)`
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-open containment: the right and bottom edges are outside
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Overlapping area of two rectangles, `None` when they do not overlap
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// Box model of an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoxModel {
    pub content: Quad,
    pub padding: Quad,
    pub border: Quad,
    pub margin: Quad,
    /// Border box width
    pub width: f64,
    /// Border box height
    pub height: f64,
}

impl BoxModel {
    /// Bounding box of the border quad
    pub fn bounding_box(&self) -> Rect {
        Rect::from_quad(&self.border)
    }
}

/// Response for DOM.getDocument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetDocumentResponse {
    pub root: Node,
}

/// Parameters for DOM.getDocument
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetDocumentParams {
    /// Subtree depth to return; -1 for the whole tree
    #[serde(default)]
    pub depth: Option<i32>,
    /// Whether shadow roots are included in the returned subtree
    #[serde(default)]
    pub pierce: Option<bool>,
}

/// Parameters for DOM.describeNode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DescribeNodeParams {
    pub node_id: NodeId,
    #[serde(default)]
    pub depth: Option<i32>,
}

/// Response for DOM.describeNode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DescribeNodeResponse {
    pub node: Node,
}

/// Parameters for DOM.querySelector and DOM.querySelectorAll
///
/// `selector` may carry a query handler prefix (`name/arg`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuerySelectorParams {
    /// Scope node
    pub node_id: NodeId,
    pub selector: String,
}

/// Response for DOM.querySelector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuerySelectorResponse {
    pub node_id: Option<NodeId>,
}

/// Response for DOM.querySelectorAll
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuerySelectorAllResponse {
    pub node_ids: Vec<NodeId>,
}

/// Parameters for DOM.getBoxModel and DOM.getContentQuads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetBoxModelParams {
    pub node_id: NodeId,
}

/// Response for DOM.getBoxModel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetBoxModelResponse {
    pub model: BoxModel,
}

/// Response for DOM.getContentQuads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetContentQuadsResponse {
    pub quads: Vec<Quad>,
}
