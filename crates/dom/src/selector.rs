//! CSS selector subset used by `querySelector`
//!
//! Supported: selector lists, `*`, type, `#id`, `.class`, `[attr]`,
//! `[attr=value]`, descendant and child combinators.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

/// One compound selector, e.g. `section.card#intro`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorStep {
    pub tag: Option<String>,
    pub universal: bool,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrCondition>,
}

impl SelectorStep {
    fn is_empty(&self) -> bool {
        !self.universal
            && self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
    }

    pub fn matches(&self, node: &DomNode) -> bool {
        if !node.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !node.node_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| node.has_class(class)) {
            return false;
        }
        self.attrs.iter().all(|cond| match cond {
            AttrCondition::Exists { key } => node.attributes.contains_key(key),
            AttrCondition::Eq { key, value } => node.attr(key) == Some(value.as_str()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// A complex selector: steps joined by combinators, rightmost last
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// `(combinator to the previous step, step)`; the first combinator is unused
    parts: Vec<(Combinator, SelectorStep)>,
}

impl ComplexSelector {
    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        self.matches_from(arena, node_id, self.parts.len())
    }

    fn matches_from(&self, arena: &DomArena, node_id: NodeId, len: usize) -> bool {
        let Some((combinator, step)) = len.checked_sub(1).and_then(|i| self.parts.get(i)) else {
            return true;
        };
        let Ok(node) = arena.get(node_id) else {
            return false;
        };
        if !step.matches(node) {
            return false;
        }
        if len == 1 {
            return true;
        }

        match combinator {
            Combinator::Child => node
                .parent_id
                .is_some_and(|parent| self.matches_from(arena, parent, len - 1)),
            Combinator::Descendant => {
                let mut current = node.parent_id;
                while let Some(ancestor) = current {
                    if self.matches_from(arena, ancestor, len - 1) {
                        return true;
                    }
                    current = arena.get(ancestor).ok().and_then(|n| n.parent_id);
                }
                false
            }
        }
    }
}

/// Parsed selector list (`a, b > c`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<ComplexSelector>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let alternatives = split_top_level(source)
            .into_iter()
            .map(|part| parse_complex(source, part))
            .collect::<Result<Vec<_>>>()?;

        if alternatives.is_empty() {
            return Err(DomError::invalid_selector(source, "empty selector"));
        }
        Ok(Self { alternatives })
    }

    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|alt| alt.matches(arena, node_id))
    }

    /// Fast path for `#id`
    pub fn id_only(&self) -> Option<&str> {
        match self.alternatives.as_slice() {
            [only] => match only.parts.as_slice() {
                [(_, step)]
                    if !step.universal
                        && step.tag.is_none()
                        && step.classes.is_empty()
                        && step.attrs.is_empty() =>
                {
                    step.id.as_deref()
                }
                _ => None,
            },
            _ => None,
        }
    }
}

fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in source.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&source[start..]);
    parts
}

fn parse_complex(source: &str, part: &str) -> Result<ComplexSelector> {
    let bytes = part.as_bytes();
    let mut parts = Vec::new();
    let mut pending = Combinator::Descendant;
    let mut i = 0usize;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            break;
        }

        if bytes[i] == b'>' {
            if parts.is_empty() {
                return Err(DomError::invalid_selector(source, "leading combinator"));
            }
            pending = Combinator::Child;
            i += 1;
            continue;
        }

        let step = parse_step(source, part, &mut i)?;
        parts.push((pending, step));
        pending = Combinator::Descendant;
    }

    if parts.is_empty() {
        return Err(DomError::invalid_selector(source, "empty selector"));
    }
    if pending == Combinator::Child {
        return Err(DomError::invalid_selector(source, "trailing combinator"));
    }

    Ok(ComplexSelector { parts })
}

fn parse_step(source: &str, part: &str, i: &mut usize) -> Result<SelectorStep> {
    let bytes = part.as_bytes();
    let mut step = SelectorStep::default();

    if *i < bytes.len() && bytes[*i] == b'*' {
        step.universal = true;
        *i += 1;
    } else if *i < bytes.len() && is_ident_char(bytes[*i]) {
        step.tag = Some(read_ident(part, i).to_ascii_lowercase());
    }

    while *i < bytes.len() {
        match bytes[*i] {
            b'#' => {
                *i += 1;
                let id = read_ident(part, i);
                if id.is_empty() {
                    return Err(DomError::invalid_selector(source, "empty id"));
                }
                step.id = Some(id.to_string());
            }
            b'.' => {
                *i += 1;
                let class = read_ident(part, i);
                if class.is_empty() {
                    return Err(DomError::invalid_selector(source, "empty class"));
                }
                step.classes.push(class.to_string());
            }
            b'[' => {
                *i += 1;
                step.attrs.push(parse_attr(source, part, i)?);
            }
            b' ' | b'\t' | b'\n' | b'\r' | b'>' => break,
            other => {
                return Err(DomError::invalid_selector(
                    source,
                    format!("unsupported character '{}'", other as char),
                ));
            }
        }
    }

    if step.is_empty() {
        return Err(DomError::invalid_selector(source, "empty compound selector"));
    }
    Ok(step)
}

fn parse_attr(source: &str, part: &str, i: &mut usize) -> Result<AttrCondition> {
    let bytes = part.as_bytes();
    skip_ws(bytes, i);
    let key = read_ident(part, i).to_ascii_lowercase();
    if key.is_empty() {
        return Err(DomError::invalid_selector(source, "empty attribute name"));
    }
    skip_ws(bytes, i);

    match bytes.get(*i) {
        Some(b']') => {
            *i += 1;
            Ok(AttrCondition::Exists { key })
        }
        Some(b'=') => {
            *i += 1;
            skip_ws(bytes, i);
            let value = match bytes.get(*i) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    *i += 1;
                    let start = *i;
                    while *i < bytes.len() && bytes[*i] != quote {
                        *i += 1;
                    }
                    if *i >= bytes.len() {
                        return Err(DomError::invalid_selector(source, "unclosed quote"));
                    }
                    let value = part[start..*i].to_string();
                    *i += 1;
                    value
                }
                _ => read_ident(part, i).to_string(),
            };
            skip_ws(bytes, i);
            if bytes.get(*i) != Some(&b']') {
                return Err(DomError::invalid_selector(source, "expected ']'"));
            }
            *i += 1;
            Ok(AttrCondition::Eq { key, value })
        }
        _ => Err(DomError::invalid_selector(
            source,
            "unsupported attribute operator",
        )),
    }
}

fn read_ident<'a>(part: &'a str, i: &mut usize) -> &'a str {
    let bytes = part.as_bytes();
    let start = *i;
    while *i < bytes.len() && is_ident_char(bytes[*i]) {
        *i += 1;
    }
    &part[start..*i]
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}
