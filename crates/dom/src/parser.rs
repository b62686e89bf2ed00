//! Markup fragment parser
//!
//! Enough HTML to build demo pages and `innerHTML` fragments: start and
//! end tags, void elements, quoted/unquoted attributes, comments,
//! doctype declarations, character references and raw-text elements
//! (`script`, `style`, `textarea`, `title`). No implied tags and
//! no error recovery beyond closing unmatched elements.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::NodeId;
use crate::utils::{
    decode_character_references, is_escapable_raw_text_tag, is_raw_text_tag, is_void_tag,
};

/// Parse `markup` and append the resulting nodes under `parent`
///
/// Returns the ids of the top-level nodes created, in order.
pub fn parse_fragment(arena: &mut DomArena, parent: NodeId, markup: &str) -> Result<Vec<NodeId>> {
    let bytes = markup.as_bytes();
    let mut stack = vec![parent];
    let mut top_level = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            let end = find_subslice(bytes, i + 4, b"-->")
                .ok_or_else(|| DomError::MarkupParse("unclosed comment".into()))?;
            let comment = arena.create_comment(&markup[i + 4..end]);
            attach(arena, &stack, &mut top_level, comment)?;
            i = end + 3;
            continue;
        }

        if bytes[i] == b'<' && starts_with_at(bytes, i, b"</") {
            let (tag, next) = parse_end_tag(markup, i)?;
            i = next;

            // Close up to the matching element; stray end tags are ignored
            if let Some(pos) = stack
                .iter()
                .skip(1)
                .rposition(|&id| arena.get(id).map(|n| n.node_name == tag).unwrap_or(false))
            {
                stack.truncate(pos + 1);
            }
            continue;
        }

        if bytes[i] == b'<' && starts_with_at(bytes, i, b"<!") {
            let end = find_subslice(bytes, i, b">")
                .ok_or_else(|| DomError::MarkupParse("unclosed declaration".into()))?;
            i = end + 1;
            continue;
        }

        if bytes[i] == b'<' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_alphabetic()) {
            let (tag, attrs, self_closing, next) = parse_start_tag(markup, i)?;
            i = next;

            let element = arena.create_element(&tag);
            for (name, value) in &attrs {
                arena.set_attribute(element, name, value)?;
            }
            attach(arena, &stack, &mut top_level, element)?;

            if self_closing || is_void_tag(&tag) {
                continue;
            }
            if is_raw_text_tag(&tag) {
                i = parse_raw_text(arena, markup, i, element, &tag)?;
                continue;
            }
            stack.push(element);
            continue;
        }

        // Character data up to the next tag-looking '<'
        let text_start = i;
        i += 1;
        while i < bytes.len() && bytes[i] != b'<' {
            i += 1;
        }
        let text = decode_character_references(&markup[text_start..i]);
        if !text.is_empty() {
            let text_id = arena.create_text(&text);
            attach(arena, &stack, &mut top_level, text_id)?;
        }
    }

    Ok(top_level)
}

fn attach(
    arena: &mut DomArena,
    stack: &[NodeId],
    top_level: &mut Vec<NodeId>,
    node: NodeId,
) -> Result<()> {
    let parent = *stack
        .last()
        .ok_or_else(|| DomError::MarkupParse("missing parent element".into()))?;
    arena.append_child(parent, node)?;
    if stack.len() == 1 {
        top_level.push(node);
    }
    Ok(())
}

/// Consume the content of a raw-text element and its end tag
///
/// A missing end tag takes the rest of the input as content.
fn parse_raw_text(
    arena: &mut DomArena,
    markup: &str,
    at: usize,
    element: NodeId,
    tag: &str,
) -> Result<usize> {
    let bytes = markup.as_bytes();
    let (end, next) = match find_end_tag(bytes, at, tag) {
        Some(end) => (end, parse_end_tag(markup, end)?.1),
        None => (bytes.len(), bytes.len()),
    };

    let raw = &markup[at..end];
    let text = if is_escapable_raw_text_tag(tag) {
        decode_character_references(raw)
    } else {
        raw.to_string()
    };
    if !text.is_empty() {
        let text_id = arena.create_text(&text);
        arena.append_child(element, text_id)?;
    }
    Ok(next)
}

/// Position of the `</tag` that closes a raw-text element, ASCII case-insensitive
fn find_end_tag(bytes: &[u8], from: usize, tag: &str) -> Option<usize> {
    let tag = tag.as_bytes();
    let mut i = from;
    while let Some(pos) = find_subslice(bytes, i, b"</") {
        let name_start = pos + 2;
        let name_end = name_start + tag.len();
        let matches_name = bytes
            .get(name_start..name_end)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag));
        let terminated = bytes
            .get(name_end)
            .map_or(true, |b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/');
        if matches_name && terminated {
            return Some(pos);
        }
        i = pos + 2;
    }
    None
}

fn parse_start_tag(markup: &str, at: usize) -> Result<(String, Vec<(String, String)>, bool, usize)> {
    let bytes = markup.as_bytes();
    let mut i = at + 1;

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = markup[tag_start..i].to_ascii_lowercase();
    if tag.is_empty() {
        return Err(DomError::MarkupParse("empty tag name".into()));
    }

    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            return Err(DomError::MarkupParse(format!("unclosed <{}> start tag", tag)));
        }

        if bytes[i] == b'>' {
            i += 1;
            break;
        }

        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>') {
            self_closing = true;
            i += 2;
            break;
        }

        if !is_attr_name_char(bytes[i]) {
            return Err(DomError::MarkupParse(format!(
                "unexpected '{}' in <{}>",
                bytes[i] as char, tag
            )));
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        let name = markup[name_start..i].to_ascii_lowercase();

        skip_ws(bytes, &mut i);
        let value = if bytes.get(i) == Some(&b'=') {
            i += 1;
            skip_ws(bytes, &mut i);
            parse_attr_value(markup, &mut i)?
        } else {
            String::new()
        };

        // First occurrence wins, as in browsers
        if !attrs.iter().any(|(existing, _)| *existing == name) {
            attrs.push((name, value));
        }
    }

    Ok((tag, attrs, self_closing, i))
}

fn parse_end_tag(markup: &str, at: usize) -> Result<(String, usize)> {
    let bytes = markup.as_bytes();
    let mut i = at + 2;
    skip_ws(bytes, &mut i);

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = markup[tag_start..i].to_ascii_lowercase();

    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    if i >= bytes.len() {
        return Err(DomError::MarkupParse(format!("unclosed </{}> end tag", tag)));
    }

    Ok((tag, i + 1))
}

fn parse_attr_value(markup: &str, i: &mut usize) -> Result<String> {
    let bytes = markup.as_bytes();
    if *i >= bytes.len() {
        return Err(DomError::MarkupParse("missing attribute value".into()));
    }

    if bytes[*i] == b'\'' || bytes[*i] == b'"' {
        let quote = bytes[*i];
        *i += 1;
        let start = *i;
        while *i < bytes.len() && bytes[*i] != quote {
            *i += 1;
        }
        if *i >= bytes.len() {
            return Err(DomError::MarkupParse("unclosed quoted attribute value".into()));
        }
        let value = decode_character_references(&markup[start..*i]);
        *i += 1;
        return Ok(value);
    }

    let start = *i;
    while *i < bytes.len()
        && !bytes[*i].is_ascii_whitespace()
        && bytes[*i] != b'>'
        && !(bytes[*i] == b'/' && bytes.get(*i + 1) == Some(&b'>'))
    {
        *i += 1;
    }
    Ok(decode_character_references(&markup[start..*i]))
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn is_attr_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn starts_with_at(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    bytes
        .get(at..at + needle.len())
        .is_some_and(|window| window == needle)
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| from + pos)
}
