//! Representation of text/comment in a markup tree.

use crate::vdom::{escape_text, VNode};
use std::fmt::{self, Display, Formatter};

/// The representation of text/comment in a markup tree.
#[derive(Debug, Clone, PartialEq)]
pub struct VText {
    /// The content of a text string
    content: String,
    /// Whether the content is a comment
    is_comment: bool,
    /// Whether the content is emitted verbatim, as inside `<style>`
    raw: bool,
}

impl VText {
    /// Create a textual VText.
    pub fn text(content: impl Into<String>) -> VText {
        VText {
            content: content.into(),
            is_comment: false,
            raw: false,
        }
    }

    /// Create a comment VText.
    pub fn comment(content: impl Into<String>) -> VText {
        VText {
            content: content.into(),
            is_comment: true,
            raw: false,
        }
    }

    /// Create text which is serialized without escaping.
    pub fn raw(content: impl Into<String>) -> VText {
        VText {
            content: content.into(),
            is_comment: false,
            raw: true,
        }
    }

    /// The unescaped content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the content is serialized without escaping.
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Whether this is a comment node.
    pub fn is_comment(&self) -> bool {
        self.is_comment
    }
}

impl From<VText> for VNode {
    fn from(text: VText) -> VNode {
        VNode::Text(text)
    }
}

impl Display for VText {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_comment {
            write!(f, "<!--{}-->", self.content)
        } else if self.raw {
            write!(f, "{}", self.content)
        } else {
            write!(f, "{}", escape_text(&self.content))
        }
    }
}
