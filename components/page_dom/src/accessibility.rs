//! Accessibility model
//!
//! Computes ARIA roles (explicit `role` or the implicit role of the element)
//! and accessible names following the usual precedence: `aria-labelledby`,
//! `aria-label`, native labelling (`<label>`, `alt`, button values), content
//! for roles that take their name from content, and finally `title`.

use cdp_types::domains::dom::{NodeId, NodeType};

use crate::document::Document;
use crate::layout::Visibility;

/// Roles whose accessible name is computed from their content
const NAME_FROM_CONTENT_ROLES: &[&str] = &[
    "button",
    "cell",
    "checkbox",
    "columnheader",
    "gridcell",
    "heading",
    "link",
    "listitem",
    "menuitem",
    "option",
    "radio",
    "row",
    "rowheader",
    "switch",
    "tab",
    "tooltip",
    "treeitem",
];

/// Collapse runs of whitespace into single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Document {
    /// ARIA role of an element, explicit or implicit
    pub fn aria_role(&self, id: NodeId) -> Option<String> {
        let tag = self.local_name(id)?;
        if let Some(role) = self.get_attribute(id, "role") {
            if let Some(first) = role.split_whitespace().next() {
                return Some(first.to_ascii_lowercase());
            }
        }
        self.implicit_role(id, &tag).map(str::to_string)
    }

    fn implicit_role(&self, id: NodeId, tag: &str) -> Option<&'static str> {
        let role = match tag {
            "a" | "area" if self.has_attribute(id, "href") => "link",
            "article" => "article",
            "aside" => "complementary",
            "button" | "summary" => "button",
            "datalist" => "listbox",
            "details" | "fieldset" | "optgroup" => "group",
            "dialog" => "dialog",
            "footer" => "contentinfo",
            "form" => "form",
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
            "header" => "banner",
            "hr" => "separator",
            "img" => match self.get_attribute(id, "alt") {
                Some(alt) if alt.is_empty() => "presentation",
                _ => "img",
            },
            "input" => return self.input_role(id),
            "li" => "listitem",
            "main" => "main",
            "menu" | "ol" | "ul" => "list",
            "nav" => "navigation",
            "option" => "option",
            "p" => "paragraph",
            "progress" => "progressbar",
            "section" if self.has_label_attribute(id) => "region",
            "select" => {
                if self.has_attribute(id, "multiple") {
                    "listbox"
                } else {
                    "combobox"
                }
            }
            "table" => "table",
            "tbody" | "thead" | "tfoot" => "rowgroup",
            "td" => "cell",
            "textarea" => "textbox",
            "th" => "columnheader",
            "tr" => "row",
            _ => return None,
        };
        Some(role)
    }

    fn input_role(&self, id: NodeId) -> Option<&'static str> {
        let kind = self
            .get_attribute(id, "type")
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_else(|| "text".to_string());
        let role = match kind.as_str() {
            "button" | "submit" | "reset" | "image" => "button",
            "checkbox" => "checkbox",
            "radio" => "radio",
            "range" => "slider",
            "number" => "spinbutton",
            "search" => "searchbox",
            "hidden" | "file" | "color" | "date" | "datetime-local" | "month" | "time"
            | "week" | "password" => return None,
            _ => "textbox",
        };
        Some(role)
    }

    fn has_label_attribute(&self, id: NodeId) -> bool {
        self.get_attribute(id, "aria-label")
            .is_some_and(|label| !label.trim().is_empty())
            || self.has_attribute(id, "aria-labelledby")
    }

    /// Whether the element is excluded from the accessibility tree:
    /// disconnected, not rendered, `visibility: hidden`, or inside an
    /// `aria-hidden="true"` subtree
    pub fn is_hidden_from_accessibility(&self, id: NodeId) -> bool {
        if !self.is_rendered(id) {
            return true;
        }
        if self
            .computed_style(id)
            .map_or(true, |style| style.visibility != Visibility::Visible)
        {
            return true;
        }
        std::iter::once(id)
            .chain(self.flat_ancestors(id))
            .any(|node| {
                self.get_attribute(node, "aria-hidden")
                    .is_some_and(|hidden| hidden.eq_ignore_ascii_case("true"))
            })
    }

    /// Accessible name of an element, whitespace-normalized
    pub fn accessible_name(&self, id: NodeId) -> String {
        normalize_whitespace(&self.compute_name(id, true))
    }

    fn compute_name(&self, id: NodeId, follow_references: bool) -> String {
        let Some(tag) = self.local_name(id) else {
            return String::new();
        };

        if follow_references {
            if let Some(ids) = self.get_attribute(id, "aria-labelledby") {
                let name = ids
                    .split_whitespace()
                    .filter_map(|reference| self.element_in_same_tree(id, reference))
                    .map(|labeller| self.compute_name_from_subtree(labeller))
                    .collect::<Vec<_>>()
                    .join(" ");
                if !name.trim().is_empty() {
                    return name;
                }
            }
        }

        if let Some(label) = self.get_attribute(id, "aria-label") {
            if !label.trim().is_empty() {
                return label;
            }
        }

        if let Some(name) = self.native_name(id, &tag) {
            if !name.trim().is_empty() {
                return name;
            }
        }

        let role = self.aria_role(id);
        if role
            .as_deref()
            .is_some_and(|role| NAME_FROM_CONTENT_ROLES.contains(&role))
        {
            let name = self.compute_name_from_subtree(id);
            if !name.trim().is_empty() {
                return name;
            }
        }

        self.get_attribute(id, "title").unwrap_or_default()
    }

    fn native_name(&self, id: NodeId, tag: &str) -> Option<String> {
        match tag {
            "img" | "area" => self.get_attribute(id, "alt"),
            "input" => {
                let kind = self
                    .get_attribute(id, "type")
                    .map(|t| t.to_ascii_lowercase())
                    .unwrap_or_default();
                match kind.as_str() {
                    "submit" => self.get_attribute(id, "value").or(Some("Submit".into())),
                    "reset" => self.get_attribute(id, "value").or(Some("Reset".into())),
                    "button" => self.get_attribute(id, "value"),
                    "image" => self.get_attribute(id, "alt"),
                    _ => self.label_text(id),
                }
            }
            "textarea" | "select" | "meter" | "progress" | "output" => self.label_text(id),
            "fieldset" => self
                .element_children(id)
                .into_iter()
                .find(|child| self.local_name(*child).as_deref() == Some("legend"))
                .map(|legend| self.compute_name_from_subtree(legend)),
            "table" => self
                .element_children(id)
                .into_iter()
                .find(|child| self.local_name(*child).as_deref() == Some("caption"))
                .map(|caption| self.compute_name_from_subtree(caption)),
            _ => None,
        }
    }

    /// Text of the `<label>` elements associated with a form control
    fn label_text(&self, id: NodeId) -> Option<String> {
        let mut labels = Vec::new();
        if let Some(control_id) = self.get_attribute(id, "id").filter(|v| !v.is_empty()) {
            let root = self.tree_root(id);
            labels.extend(self.descendants(root).into_iter().filter(|node| {
                self.local_name(*node).as_deref() == Some("label")
                    && self.get_attribute(*node, "for").as_deref() == Some(control_id.as_str())
            }));
        }
        if let Some(wrapping) = self
            .flat_ancestors(id)
            .into_iter()
            .take_while(|ancestor| self.is_element(*ancestor))
            .find(|ancestor| self.local_name(*ancestor).as_deref() == Some("label"))
        {
            if !labels.contains(&wrapping) {
                labels.push(wrapping);
            }
        }

        if labels.is_empty() {
            return None;
        }
        Some(
            labels
                .into_iter()
                .map(|label| self.compute_name_from_subtree_excluding(label, Some(id)))
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    fn compute_name_from_subtree(&self, id: NodeId) -> String {
        self.compute_name_from_subtree_excluding(id, None)
    }

    fn compute_name_from_subtree_excluding(&self, id: NodeId, skip: Option<NodeId>) -> String {
        let mut name = String::new();
        for child in self.children(id) {
            if Some(child) == skip {
                continue;
            }
            match self.node_type(child) {
                Ok(NodeType::Text) => name.push_str(&self.text_content(child)),
                Ok(NodeType::Element) => {
                    if self.is_hidden_from_accessibility(child) {
                        continue;
                    }
                    let embedded = self.compute_name(child, false);
                    if !embedded.trim().is_empty() {
                        name.push_str(&embedded);
                    } else {
                        name.push_str(&self.compute_name_from_subtree_excluding(child, skip));
                    }
                }
                _ => {}
            }
        }
        name
    }

    /// Document or shadow root containing `id`
    fn tree_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    fn element_in_same_tree(&self, id: NodeId, element_id: &str) -> Option<NodeId> {
        let root = self.tree_root(id);
        self.descendants(root)
            .into_iter()
            .find(|node| self.get_attribute(*node, "id").as_deref() == Some(element_id))
    }
}
