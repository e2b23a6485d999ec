//! HTML fragment parser
//!
//! Tag-soup parser sufficient for page content used by automation scenarios:
//! elements, attributes, text, comments, void and self-closing tags, raw-text
//! elements and declarative shadow roots (`<template shadowrootmode>`).

use cdp_types::domains::dom::{NodeId, ShadowRootType};

use crate::document::Document;
use crate::error::{DomError, Result};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

struct OpenElement {
    node: NodeId,
    tag: String,
}

/// Parse `html` and append the resulting nodes to `parent`
pub(crate) fn parse_fragment(document: &Document, parent: NodeId, html: &str) -> Result<()> {
    let bytes = html.as_bytes();
    let mut stack = vec![OpenElement {
        node: parent,
        tag: String::new(),
    }];
    let mut i = 0usize;

    while i < bytes.len() {
        if html[i..].starts_with("<!--") {
            let end = html[i + 4..]
                .find("-->")
                .ok_or_else(|| DomError::HtmlParse("unclosed HTML comment".into()))?;
            let comment = document.create_comment(&html[i + 4..i + 4 + end]);
            document.append_child(current(&stack), comment)?;
            i += 4 + end + 3;
            continue;
        }

        if bytes[i] == b'<' && html[i..].starts_with("</") {
            let (tag, next) = parse_end_tag(html, i)?;
            i = next;
            if let Some(index) = stack.iter().rposition(|open| open.tag == tag) {
                if index > 0 {
                    stack.truncate(index);
                }
            }
            continue;
        }

        if bytes[i] == b'<' && html[i..].starts_with("<!") {
            let end = html[i..]
                .find('>')
                .ok_or_else(|| DomError::HtmlParse("unclosed declaration".into()))?;
            i += end + 1;
            continue;
        }

        if bytes[i] == b'<' && bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic) {
            let (tag, attributes, self_closing, next) = parse_start_tag(html, i)?;
            i = next;
            let parent = current(&stack);

            if tag == "template" {
                if let Some(mode) = shadow_root_mode(&attributes) {
                    let root = document.attach_shadow(parent, mode)?;
                    stack.push(OpenElement { node: root, tag });
                    continue;
                }
            }

            let element = document.create_element(&tag);
            for (name, value) in &attributes {
                document.set_attribute(element, name, value)?;
            }
            document.append_child(parent, element)?;

            if RAW_TEXT_TAGS.contains(&tag.as_str()) && !self_closing {
                let close = find_end_tag(html, i, &tag)
                    .ok_or_else(|| DomError::HtmlParse(format!("unclosed <{}>", tag)))?;
                let body = &html[i..close];
                if !body.is_empty() {
                    let text = if tag == "script" || tag == "style" {
                        body.to_string()
                    } else {
                        decode_character_references(body)
                    };
                    document.append_text(element, &text)?;
                }
                let (_, after) = parse_end_tag(html, close)?;
                i = after;
                continue;
            }

            if !self_closing && !VOID_TAGS.contains(&tag.as_str()) {
                stack.push(OpenElement { node: element, tag });
            }
            continue;
        }

        let start = i;
        i += 1;
        while i < bytes.len() && bytes[i] != b'<' {
            i += 1;
        }
        let text = decode_character_references(&html[start..i]);
        if !text.is_empty() {
            document.append_text(current(&stack), &text)?;
        }
    }

    Ok(())
}

fn current(stack: &[OpenElement]) -> NodeId {
    // The fragment parent is never popped.
    stack.last().map(|open| open.node).unwrap_or(stack[0].node)
}

fn shadow_root_mode(attributes: &[(String, String)]) -> Option<ShadowRootType> {
    let (_, mode) = attributes
        .iter()
        .find(|(name, _)| name == "shadowrootmode" || name == "shadowroot")?;
    match mode.to_ascii_lowercase().as_str() {
        "open" => Some(ShadowRootType::Open),
        "closed" => Some(ShadowRootType::Closed),
        _ => None,
    }
}

type StartTag = (String, Vec<(String, String)>, bool, usize);

fn parse_start_tag(html: &str, start: usize) -> Result<StartTag> {
    let bytes = html.as_bytes();
    let mut i = start + 1;

    let name_start = i;
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' && bytes[i] != b'/'
    {
        i += 1;
    }
    let tag = html[name_start..i].to_ascii_lowercase();
    let mut attributes: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i) {
            None => return Err(DomError::HtmlParse(format!("unclosed start tag <{}", tag))),
            Some(b'>') => {
                i += 1;
                break;
            }
            Some(b'/') => {
                self_closing = true;
                i += 1;
                continue;
            }
            Some(_) => {}
        }

        let attr_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let name = html[attr_start..i].to_ascii_lowercase();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let mut value = String::new();
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let end = html[i + 1..].find(quote as char).ok_or_else(|| {
                        DomError::HtmlParse(format!("unterminated value for attribute {}", name))
                    })?;
                    value = decode_character_references(&html[i + 1..i + 1 + end]);
                    i += end + 2;
                }
                _ => {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    value = decode_character_references(&html[value_start..i]);
                }
            }
        }

        if !name.is_empty() && !attributes.iter().any(|(existing, _)| *existing == name) {
            attributes.push((name, value));
        }
    }

    Ok((tag, attributes, self_closing, i))
}

fn parse_end_tag(html: &str, start: usize) -> Result<(String, usize)> {
    let end = html[start..]
        .find('>')
        .ok_or_else(|| DomError::HtmlParse("unclosed end tag".into()))?;
    let tag = html[start + 2..start + end].trim().to_ascii_lowercase();
    Ok((tag, start + end + 1))
}

fn find_end_tag(html: &str, from: usize, tag: &str) -> Option<usize> {
    let needle = format!("</{}", tag);
    let lower = html[from..].to_ascii_lowercase();
    lower.find(&needle).map(|offset| from + offset)
}

pub(crate) fn decode_character_references(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity.strip_prefix('#').and_then(|number| {
                    let code = match number.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => number.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|ch| (ch, semi + 1))
        });

        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
