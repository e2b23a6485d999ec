//! Tree walks
//!
//! Both walks use an explicit stack and visit every node at most once; the
//! tree is finite and acyclic because [`Document::append_child`] rejects
//! cycles.

use cdp_types::domains::dom::{NodeId, NodeType};

use crate::document::Document;
use crate::error::{DomError, Result};

impl Document {
    /// Light-tree descendants of `scope` in document order, excluding `scope`
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut visited = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).into_iter().rev().collect();

        while let Some(node) = stack.pop() {
            visited.push(node);
            stack.extend(self.children(node).into_iter().rev());
        }
        visited
    }

    /// Descendants of `scope` including shadow trees, excluding `scope`
    ///
    /// A host is followed by its shadow root and the shadow root's subtree,
    /// then by its light children. Shadow roots themselves appear in the
    /// output.
    pub fn deep_descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut visited = Vec::new();
        let mut stack = Vec::new();
        self.push_deep_children(scope, &mut stack);

        while let Some(node) = stack.pop() {
            visited.push(node);
            self.push_deep_children(node, &mut stack);
        }
        visited
    }

    fn push_deep_children(&self, node: NodeId, stack: &mut Vec<NodeId>) {
        stack.extend(self.children(node).into_iter().rev());
        if let Some(root) = self.shadow_root(node) {
            stack.push(root);
        }
    }

    /// Elements among [`Document::deep_descendants`]
    pub fn deep_elements(&self, scope: NodeId) -> Vec<NodeId> {
        self.deep_descendants(scope)
            .into_iter()
            .filter(|node| self.is_element(*node))
            .collect()
    }

    /// Flat-tree ancestors of `node`, nearest first, crossing shadow
    /// boundaries through hosts
    pub fn flat_ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut cursor = self.flat_parent(node);
        while let Some(current) = cursor {
            ancestors.push(current);
            cursor = self.flat_parent(current);
        }
        ancestors
    }

    /// Check that `scope` can anchor a query: a document, element or
    /// shadow root
    pub fn ensure_scope(&self, scope: NodeId) -> Result<()> {
        match self.node_type(scope)? {
            NodeType::Document | NodeType::Element | NodeType::DocumentFragment => Ok(()),
            _ => Err(DomError::InvalidScope(scope)),
        }
    }
}
