//! CSS selector engine
//!
//! Supports type, universal, id, class and attribute selectors, the
//! `:hover`, `:first-child`, `:last-child`, `:only-child`, `:empty` and
//! `:not(...)` pseudo-classes, the four combinators and selector lists.
//! Combinators never cross a shadow boundary.

use cdp_types::domains::dom::NodeId;

use crate::document::Document;
use crate::error::{DomError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    Includes { key: String, value: String },
    DashMatch { key: String, value: String },
    StartsWith { key: String, value: String },
    EndsWith { key: String, value: String },
    Contains { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PseudoClass {
    Hover,
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Not(Vec<Vec<SelectorPart>>),
}

/// One compound selector, e.g. `div.item[data-x]:hover`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    pseudo_classes: Vec<PseudoClass>,
}

impl SelectorStep {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && !self.universal
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    step: SelectorStep,
    /// Relation to the part on the left
    combinator: Option<Combinator>,
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    groups: Vec<Vec<SelectorPart>>,
}

impl Selector {
    /// Parse a selector list
    ///
    /// # Example
    /// ```
    /// use page_dom::Selector;
    ///
    /// assert!(Selector::parse("div > .item, #main").is_ok());
    /// assert!(Selector::parse("div[").is_err());
    /// ```
    pub fn parse(selector: &str) -> Result<Self> {
        let invalid = || DomError::InvalidSelector(selector.to_string());
        let groups = parse_groups(selector).ok_or_else(invalid)?;
        Ok(Self {
            source: selector.to_string(),
            groups,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl std::str::FromStr for Selector {
    type Err = DomError;

    fn from_str(selector: &str) -> Result<Self> {
        Self::parse(selector)
    }
}

fn parse_groups(selector: &str) -> Option<Vec<Vec<SelectorPart>>> {
    split_groups(selector)?
        .iter()
        .map(|group| parse_chain(group))
        .collect()
}

fn split_groups(selector: &str) -> Option<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut paren_depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in selector.chars() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '"' | '\'' if bracket_depth > 0 => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                bracket_depth = bracket_depth.checked_sub(1)?;
                current.push(ch);
            }
            '(' => {
                paren_depth += 1;
                current.push(ch);
            }
            ')' => {
                paren_depth = paren_depth.checked_sub(1)?;
                current.push(ch);
            }
            ',' if bracket_depth == 0 && paren_depth == 0 => {
                let trimmed = current.trim();
                if trimmed.is_empty() {
                    return None;
                }
                groups.push(trimmed.to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if bracket_depth != 0 || paren_depth != 0 || quote.is_some() {
        return None;
    }
    let trimmed = current.trim();
    if trimmed.is_empty() {
        return None;
    }
    groups.push(trimmed.to_string());
    Some(groups)
}

fn tokenize(selector: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut paren_depth = 0usize;
    let mut quote: Option<char> = None;

    let flush = |current: &mut String, tokens: &mut Vec<String>| {
        if !current.trim().is_empty() {
            tokens.push(current.trim().to_string());
        }
        current.clear();
    };

    for ch in selector.chars() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        let nested = bracket_depth > 0 || paren_depth > 0;
        match ch {
            '"' | '\'' if bracket_depth > 0 => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                bracket_depth = bracket_depth.checked_sub(1)?;
                current.push(ch);
            }
            '(' => {
                paren_depth += 1;
                current.push(ch);
            }
            ')' => {
                paren_depth = paren_depth.checked_sub(1)?;
                current.push(ch);
            }
            '>' | '+' | '~' if !nested => {
                flush(&mut current, &mut tokens);
                tokens.push(ch.to_string());
            }
            ch if ch.is_ascii_whitespace() && !nested => flush(&mut current, &mut tokens),
            _ => current.push(ch),
        }
    }

    if bracket_depth != 0 || paren_depth != 0 || quote.is_some() {
        return None;
    }
    flush(&mut current, &mut tokens);
    Some(tokens)
}

fn parse_chain(selector: &str) -> Option<Vec<SelectorPart>> {
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokenize(selector)? {
        let combinator = match token.as_str() {
            ">" => Some(Combinator::Child),
            "+" => Some(Combinator::AdjacentSibling),
            "~" => Some(Combinator::GeneralSibling),
            _ => None,
        };
        if let Some(combinator) = combinator {
            if pending.is_some() || parts.is_empty() {
                return None;
            }
            pending = Some(combinator);
            continue;
        }

        let step = parse_step(&token)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(SelectorPart { step, combinator });
    }

    if parts.is_empty() || pending.is_some() {
        return None;
    }
    Some(parts)
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b >= 0x80
}

fn parse_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    let mut end = start;
    while end < bytes.len() && is_ident_char(bytes[end]) {
        end += 1;
    }
    if end == start {
        return None;
    }
    Some((src.get(start..end)?.to_string(), end))
}

fn parse_step(part: &str) -> Option<SelectorStep> {
    let bytes = part.as_bytes();
    let mut step = SelectorStep::default();
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'*' if i == 0 => {
                step.universal = true;
                i += 1;
            }
            b'#' => {
                let (id, next) = parse_ident(part, i + 1)?;
                if step.id.replace(id).is_some() {
                    return None;
                }
                i = next;
            }
            b'.' => {
                let (class, next) = parse_ident(part, i + 1)?;
                step.classes.push(class);
                i = next;
            }
            b'[' => {
                let (condition, next) = parse_attr_condition(part, i)?;
                step.attrs.push(condition);
                i = next;
            }
            b':' => {
                let (pseudo, next) = parse_pseudo(part, i)?;
                step.pseudo_classes.push(pseudo);
                i = next;
            }
            _ if i == 0 => {
                let (tag, next) = parse_ident(part, i)?;
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
            _ => return None,
        }
    }

    (!step.is_empty()).then_some(step)
}

fn parse_attr_condition(src: &str, open_bracket: usize) -> Option<(AttrCondition, usize)> {
    let close = open_bracket + find_attr_end(&src[open_bracket..])?;
    let body = src[open_bracket + 1..close].trim();

    let name_end = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'))
        .unwrap_or(body.len());
    if name_end == 0 {
        return None;
    }
    let key = body[..name_end].to_ascii_lowercase();
    let rest = body[name_end..].trim_start();
    if rest.is_empty() {
        return Some((AttrCondition::Exists { key }, close + 1));
    }

    let (operator, raw_value) = if let Some(value) = rest.strip_prefix('=') {
        ("=", value)
    } else {
        let operator = rest.get(..2)?;
        if !matches!(operator, "~=" | "|=" | "^=" | "$=" | "*=") {
            return None;
        }
        (operator, &rest[2..])
    };
    let value = parse_attr_value(raw_value.trim())?;

    let condition = match operator {
        "=" => AttrCondition::Eq { key, value },
        "~=" => AttrCondition::Includes { key, value },
        "|=" => AttrCondition::DashMatch { key, value },
        "^=" => AttrCondition::StartsWith { key, value },
        "$=" => AttrCondition::EndsWith { key, value },
        _ => AttrCondition::Contains { key, value },
    };
    Some((condition, close + 1))
}

/// Offset of the `]` closing the attribute selector at the start of `src`
fn find_attr_end(src: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, ch) in src.char_indices().skip(1) {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, ']') => return Some(idx),
            _ => {}
        }
    }
    None
}

fn parse_attr_value(raw: &str) -> Option<String> {
    for quote in ['"', '\''] {
        if let Some(inner) = raw.strip_prefix(quote) {
            return inner.strip_suffix(quote).map(str::to_string);
        }
    }
    if raw.is_empty() || raw.contains(char::is_whitespace) {
        return None;
    }
    Some(raw.to_string())
}

fn parse_pseudo(src: &str, colon: usize) -> Option<(PseudoClass, usize)> {
    let (name, next) = parse_ident(src, colon + 1)?;
    let pseudo = match name.to_ascii_lowercase().as_str() {
        "hover" => PseudoClass::Hover,
        "first-child" => PseudoClass::FirstChild,
        "last-child" => PseudoClass::LastChild,
        "only-child" => PseudoClass::OnlyChild,
        "empty" => PseudoClass::Empty,
        "not" => {
            let body = src.get(next..)?.strip_prefix('(')?;
            let close = find_matching_paren(body)?;
            let inner = parse_groups(&body[..close])?;
            return Some((PseudoClass::Not(inner), next + 1 + close + 1));
        }
        _ => return None,
    };
    Some((pseudo, next))
}

/// Offset of the `)` closing a parenthesised argument whose `(` was already
/// consumed
fn find_matching_paren(body: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;

    for (idx, b) in body.bytes().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'\'' | b'"' => quote = Some(b),
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

impl Document {
    /// First element in the light subtree of `scope` matching `css`
    pub fn query_selector(&self, scope: NodeId, css: &str) -> Result<Option<NodeId>> {
        self.ensure_scope(scope)?;
        let selector = Selector::parse(css)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .find(|node| self.matches_selector(*node, &selector)))
    }

    /// All elements in the light subtree of `scope` matching `css`, in
    /// document order
    pub fn query_selector_all(&self, scope: NodeId, css: &str) -> Result<Vec<NodeId>> {
        self.ensure_scope(scope)?;
        let selector = Selector::parse(css)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|node| self.matches_selector(*node, &selector))
            .collect())
    }

    /// Whether the element `id` matches `css`
    pub fn matches(&self, id: NodeId, css: &str) -> Result<bool> {
        self.node_type(id)?;
        let selector = Selector::parse(css)?;
        Ok(self.matches_selector(id, &selector))
    }

    /// Whether `id` is an element matching an already parsed selector
    pub fn matches_selector(&self, id: NodeId, selector: &Selector) -> bool {
        self.is_element(id)
            && selector
                .groups
                .iter()
                .any(|parts| self.matches_chain(id, parts))
    }

    fn matches_chain(&self, id: NodeId, parts: &[SelectorPart]) -> bool {
        let Some((last, rest)) = parts.split_last() else {
            return false;
        };
        if !self.matches_step(id, &last.step) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }

        match last.combinator.unwrap_or(Combinator::Descendant) {
            Combinator::Child => self
                .parent_element(id)
                .is_some_and(|parent| self.matches_chain(parent, rest)),
            Combinator::Descendant => {
                let mut cursor = self.parent_element(id);
                while let Some(ancestor) = cursor {
                    if self.matches_chain(ancestor, rest) {
                        return true;
                    }
                    cursor = self.parent_element(ancestor);
                }
                false
            }
            Combinator::AdjacentSibling => self
                .previous_element_sibling(id)
                .is_some_and(|sibling| self.matches_chain(sibling, rest)),
            Combinator::GeneralSibling => {
                let mut cursor = self.previous_element_sibling(id);
                while let Some(sibling) = cursor {
                    if self.matches_chain(sibling, rest) {
                        return true;
                    }
                    cursor = self.previous_element_sibling(sibling);
                }
                false
            }
        }
    }

    fn matches_step(&self, id: NodeId, step: &SelectorStep) -> bool {
        let Some(tag) = self.local_name(id) else {
            return false;
        };
        if step.tag.as_ref().is_some_and(|expected| *expected != tag) {
            return false;
        }
        if let Some(expected) = &step.id {
            if self.get_attribute(id, "id").as_deref() != Some(expected.as_str()) {
                return false;
            }
        }
        if !step.classes.is_empty() {
            let classes = self.class_list(id);
            if !step.classes.iter().all(|class| classes.contains(class)) {
                return false;
            }
        }
        step.attrs
            .iter()
            .all(|condition| self.matches_attr(id, condition))
            && step
                .pseudo_classes
                .iter()
                .all(|pseudo| self.matches_pseudo(id, pseudo))
    }

    fn matches_attr(&self, id: NodeId, condition: &AttrCondition) -> bool {
        let (key, expected) = match condition {
            AttrCondition::Exists { key } => return self.has_attribute(id, key),
            AttrCondition::Eq { key, value }
            | AttrCondition::Includes { key, value }
            | AttrCondition::DashMatch { key, value }
            | AttrCondition::StartsWith { key, value }
            | AttrCondition::EndsWith { key, value }
            | AttrCondition::Contains { key, value } => (key, value.as_str()),
        };
        let Some(actual) = self.get_attribute(id, key) else {
            return false;
        };

        match condition {
            AttrCondition::Exists { .. } => true,
            AttrCondition::Eq { .. } => actual == expected,
            AttrCondition::Includes { .. } => {
                !expected.is_empty() && actual.split_whitespace().any(|word| word == expected)
            }
            AttrCondition::DashMatch { .. } => {
                actual == expected || actual.starts_with(&format!("{}-", expected))
            }
            AttrCondition::StartsWith { .. } => {
                !expected.is_empty() && actual.starts_with(expected)
            }
            AttrCondition::EndsWith { .. } => !expected.is_empty() && actual.ends_with(expected),
            AttrCondition::Contains { .. } => !expected.is_empty() && actual.contains(expected),
        }
    }

    fn matches_pseudo(&self, id: NodeId, pseudo: &PseudoClass) -> bool {
        match pseudo {
            PseudoClass::Hover => self.hovered().is_some_and(|hovered| {
                hovered == id || self.flat_ancestors(hovered).contains(&id)
            }),
            PseudoClass::FirstChild => {
                self.parent(id).is_some() && self.previous_element_sibling(id).is_none()
            }
            PseudoClass::LastChild => {
                self.parent(id).is_some() && self.next_element_sibling(id).is_none()
            }
            PseudoClass::OnlyChild => {
                self.parent(id).is_some()
                    && self.previous_element_sibling(id).is_none()
                    && self.next_element_sibling(id).is_none()
            }
            PseudoClass::Empty => self.children(id).into_iter().all(|child| {
                !self.is_element(child) && self.text_content(child).is_empty()
            }),
            PseudoClass::Not(groups) => !groups.iter().any(|parts| self.matches_chain(id, parts)),
        }
    }

    fn element_siblings(&self, id: NodeId) -> Option<(Vec<NodeId>, usize)> {
        let parent = self.parent(id)?;
        let siblings = self.element_children(parent);
        let index = siblings.iter().position(|sibling| *sibling == id)?;
        Some((siblings, index))
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (siblings, index) = self.element_siblings(id)?;
        index.checked_sub(1).map(|prev| siblings[prev])
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (siblings, index) = self.element_siblings(id)?;
        siblings.get(index + 1).copied()
    }
}
