//! Inline-style layout
//!
//! Elements are positioned from their inline `style` attribute only. A box's
//! border-box origin is its parent's content-box origin offset by `left`/`top`
//! and the leading margins; `width`/`height` size the content box and default
//! to zero. Lengths are in `px` (a bare number is accepted too); any other
//! unit is ignored. `visibility` and `pointer-events` inherit through the flat
//! tree, `display: none` removes the whole subtree from layout.

use cdp_types::domains::dom::{BoxModel, NodeId, NodeType, Rect};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{DomError, Result};

/// Elements the user agent never renders
const UNRENDERED_TAGS: &[&str] = &[
    "head", "link", "meta", "script", "style", "template", "title", "base", "noscript",
];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
    Flex,
    Grid,
    None,
}

impl Display {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "block" => Some(Self::Block),
            "inline" => Some(Self::Inline),
            "inline-block" => Some(Self::InlineBlock),
            "flex" => Some(Self::Flex),
            "grid" => Some(Self::Grid),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Inline => "inline",
            Self::InlineBlock => "inline-block",
            Self::Flex => "flex",
            Self::Grid => "grid",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

impl Visibility {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "visible" => Some(Self::Visible),
            "hidden" => Some(Self::Hidden),
            "collapse" => Some(Self::Collapse),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Collapse => "collapse",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PointerEvents {
    #[default]
    Auto,
    None,
}

/// Per-side lengths in px
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    /// Expand a 1 to 4 value shorthand the way CSS does
    fn from_shorthand(values: &[f64]) -> Option<Self> {
        let (top, right, bottom, left) = match *values {
            [all] => (all, all, all, all),
            [vertical, horizontal] => (vertical, horizontal, vertical, horizontal),
            [top, horizontal, bottom] => (top, horizontal, bottom, horizontal),
            [top, right, bottom, left] => (top, right, bottom, left),
            _ => return None,
        };
        Some(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    fn set_side(&mut self, side: &str, value: f64) -> bool {
        match side {
            "top" => self.top = value,
            "right" => self.right = value,
            "bottom" => self.bottom = value,
            "left" => self.left = value,
            _ => return false,
        }
        true
    }

    fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Resolved style of one element
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub pointer_events: PointerEvents,
    pub left: f64,
    pub top: f64,
    /// Content width, `None` for `auto`
    pub width: Option<f64>,
    /// Content height, `None` for `auto`
    pub height: Option<f64>,
    pub padding: Edges,
    pub border: Edges,
    pub margin: Edges,
}

impl ComputedStyle {
    /// Style as CSS property name/value pairs
    pub fn properties(&self) -> Vec<(String, String)> {
        let px = |value: f64| format!("{}px", value);
        let length = |value: Option<f64>| value.map(px).unwrap_or_else(|| "auto".to_string());

        let mut properties = vec![
            ("display".to_string(), self.display.as_str().to_string()),
            ("visibility".to_string(), self.visibility.as_str().to_string()),
            (
                "pointer-events".to_string(),
                match self.pointer_events {
                    PointerEvents::Auto => "auto".to_string(),
                    PointerEvents::None => "none".to_string(),
                },
            ),
            ("left".to_string(), px(self.left)),
            ("top".to_string(), px(self.top)),
            ("width".to_string(), length(self.width)),
            ("height".to_string(), length(self.height)),
        ];
        for (name, edges) in [
            ("padding", self.padding),
            ("margin", self.margin),
            ("border", self.border),
        ] {
            for (side, value) in [
                ("top", edges.top),
                ("right", edges.right),
                ("bottom", edges.bottom),
                ("left", edges.left),
            ] {
                let property = if name == "border" {
                    format!("border-{}-width", side)
                } else {
                    format!("{}-{}", name, side)
                };
                properties.push((property, px(value)));
            }
        }
        properties
    }
}

/// Declarations from a `style` attribute before inheritance
#[derive(Debug, Default)]
struct DeclaredStyle {
    style: ComputedStyle,
    visibility: Option<Visibility>,
    pointer_events: Option<PointerEvents>,
}

fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value);
    number.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_lengths(value: &str) -> Vec<f64> {
    value.split_whitespace().filter_map(parse_length).collect()
}

fn parse_declarations(style_attribute: &str) -> DeclaredStyle {
    let mut declared = DeclaredStyle::default();
    let style = &mut declared.style;

    for declaration in style_attribute.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim().trim_end_matches("!important").trim().to_ascii_lowercase();

        match property.as_str() {
            "display" => {
                if let Some(display) = Display::parse(&value) {
                    style.display = display;
                }
            }
            "visibility" => {
                if let Some(visibility) = Visibility::parse(&value) {
                    declared.visibility = Some(visibility);
                }
            }
            "pointer-events" => {
                declared.pointer_events = Some(if value == "none" {
                    PointerEvents::None
                } else {
                    PointerEvents::Auto
                });
            }
            "left" => style.left = parse_length(&value).unwrap_or(style.left),
            "top" => style.top = parse_length(&value).unwrap_or(style.top),
            "width" => style.width = parse_length(&value),
            "height" => style.height = parse_length(&value),
            "padding" => {
                if let Some(edges) = Edges::from_shorthand(&parse_lengths(&value)) {
                    style.padding = edges;
                }
            }
            "margin" => {
                if let Some(edges) = Edges::from_shorthand(&parse_lengths(&value)) {
                    style.margin = edges;
                }
            }
            "border-width" => {
                if let Some(edges) = Edges::from_shorthand(&parse_lengths(&value)) {
                    style.border = edges;
                }
            }
            "border" => {
                if let Some(width) = value.split_whitespace().find_map(parse_length) {
                    style.border = Edges::from_shorthand(&[width]).unwrap_or_default();
                }
            }
            other => {
                let Some(length) = parse_length(&value) else {
                    continue;
                };
                if let Some(side) = other.strip_prefix("padding-") {
                    style.padding.set_side(side, length);
                } else if let Some(side) = other.strip_prefix("margin-") {
                    style.margin.set_side(side, length);
                } else if let Some(side) = other
                    .strip_prefix("border-")
                    .and_then(|rest| rest.strip_suffix("-width"))
                {
                    style.border.set_side(side, length);
                }
            }
        }
    }

    declared
}

impl Document {
    fn declared_style(&self, id: NodeId) -> DeclaredStyle {
        self.get_attribute(id, "style")
            .map(|style| parse_declarations(&style))
            .unwrap_or_default()
    }

    /// Nearest element ancestor in the flat tree
    fn flat_parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.flat_ancestors(id)
            .into_iter()
            .find(|ancestor| self.is_element(*ancestor))
    }

    /// Computed style of an element, with inherited properties resolved
    pub fn computed_style(&self, id: NodeId) -> Result<ComputedStyle> {
        if self.node_type(id)? != NodeType::Element {
            return Err(DomError::NotAnElement(id));
        }

        let declared = self.declared_style(id);
        let mut style = declared.style;
        let mut visibility = declared.visibility;
        let mut pointer_events = declared.pointer_events;

        let mut cursor = self.flat_parent_element(id);
        while let Some(ancestor) = cursor {
            if visibility.is_some() && pointer_events.is_some() {
                break;
            }
            let inherited = self.declared_style(ancestor);
            visibility = visibility.or(inherited.visibility);
            pointer_events = pointer_events.or(inherited.pointer_events);
            cursor = self.flat_parent_element(ancestor);
        }

        style.visibility = visibility.unwrap_or_default();
        style.pointer_events = pointer_events.unwrap_or_default();
        Ok(style)
    }

    fn generates_box(&self, id: NodeId) -> bool {
        let Some(tag) = self.local_name(id) else {
            return false;
        };
        !UNRENDERED_TAGS.contains(&tag.as_str())
            && !self.has_attribute(id, "hidden")
            && self.declared_style(id).style.display != Display::None
    }

    /// Whether the element takes part in layout: connected, and neither it
    /// nor any flat-tree ancestor is `display: none`, `hidden` or a
    /// never-rendered element
    pub fn is_rendered(&self, id: NodeId) -> bool {
        if !self.is_element(id) || !self.is_connected(id) || !self.generates_box(id) {
            return false;
        }
        self.flat_ancestors(id)
            .into_iter()
            .filter(|ancestor| self.is_element(*ancestor))
            .all(|ancestor| self.generates_box(ancestor))
    }

    /// Box model of an element, `None` when it is not rendered
    pub fn box_model(&self, id: NodeId) -> Result<Option<BoxModel>> {
        if self.node_type(id)? != NodeType::Element {
            return Err(DomError::NotAnElement(id));
        }
        if !self.is_rendered(id) {
            return Ok(None);
        }

        // Outermost ancestor first
        let mut chain: Vec<NodeId> = self
            .flat_ancestors(id)
            .into_iter()
            .filter(|ancestor| self.is_element(*ancestor))
            .collect();
        chain.reverse();

        let mut origin = (0.0, 0.0);
        for ancestor in chain {
            let style = self.declared_style(ancestor).style;
            origin = (
                origin.0 + style.left + style.margin.left + style.border.left + style.padding.left,
                origin.1 + style.top + style.margin.top + style.border.top + style.padding.top,
            );
        }

        let style = self.declared_style(id).style;
        let content_width = style.width.unwrap_or(0.0);
        let content_height = style.height.unwrap_or(0.0);

        let border = Rect::new(
            origin.0 + style.left + style.margin.left,
            origin.1 + style.top + style.margin.top,
            content_width + style.padding.horizontal() + style.border.horizontal(),
            content_height + style.padding.vertical() + style.border.vertical(),
        );
        let padding = Rect::new(
            border.x + style.border.left,
            border.y + style.border.top,
            border.width - style.border.horizontal(),
            border.height - style.border.vertical(),
        );
        let content = Rect::new(
            padding.x + style.padding.left,
            padding.y + style.padding.top,
            content_width,
            content_height,
        );
        let margin = Rect::new(
            border.x - style.margin.left,
            border.y - style.margin.top,
            border.width + style.margin.horizontal(),
            border.height + style.margin.vertical(),
        );

        Ok(Some(BoxModel {
            content: content.to_quad(),
            padding: padding.to_quad(),
            border: border.to_quad(),
            margin: margin.to_quad(),
            width: border.width,
            height: border.height,
        }))
    }

    /// Border box of an element, `None` when it is not rendered
    pub fn bounding_rect(&self, id: NodeId) -> Result<Option<Rect>> {
        Ok(self.box_model(id)?.map(|model| model.bounding_box()))
    }

    /// Topmost hit-testable element whose border box contains `(x, y)`
    ///
    /// Later elements in deep document order paint above earlier ones.
    /// Elements with `visibility: hidden` or `pointer-events: none` are
    /// transparent to hit testing.
    pub fn element_from_point(&self, x: f64, y: f64) -> Option<NodeId> {
        self.deep_elements(self.root())
            .into_iter()
            .rev()
            .find(|element| {
                let Ok(Some(rect)) = self.bounding_rect(*element) else {
                    return false;
                };
                if !rect.contains(x, y) {
                    return false;
                }
                self.computed_style(*element).is_ok_and(|style| {
                    style.visibility == Visibility::Visible
                        && style.pointer_events == PointerEvents::Auto
                })
            })
    }
}
