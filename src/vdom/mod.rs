//! A detached, host independent node tree produced by the templating helpers
//! and materialized by a [`Host`](crate::host::Host).

use std::fmt::{self, Display, Formatter};

pub mod velement;
pub mod vtext;

pub use self::velement::VElement;
pub use self::vtext::VText;

/// A node in a detached markup tree.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    /// A text or comment node
    Text(VText),
    /// An element node
    Element(VElement),
}

impl VNode {
    /// The element, if this node is one.
    pub fn as_element(&self) -> Option<&VElement> {
        match self {
            VNode::Element(el) => Some(el),
            VNode::Text(_) => None,
        }
    }

    /// Whether the node is text consisting only of whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            VNode::Text(txt) => !txt.is_comment() && txt.content().trim().is_empty(),
            VNode::Element(_) => false,
        }
    }

    /// Concatenated text of this node and its descendants, comments excluded.
    pub fn text_content(&self) -> String {
        match self {
            VNode::Text(txt) if txt.is_comment() => String::new(),
            VNode::Text(txt) => txt.content().to_string(),
            VNode::Element(el) => el.children().iter().map(VNode::text_content).collect(),
        }
    }
}

impl Display for VNode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            VNode::Text(inner) => write!(f, "{}", inner),
            VNode::Element(inner) => write!(f, "{}", inner),
        }
    }
}

/// Escape text content for serialization.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape an attribute value for serialization inside double quotes.
pub(crate) fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
