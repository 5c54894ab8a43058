//! Element representation in a markup tree.

use crate::vdom::{escape_attribute, VNode};
use indexmap::IndexMap;
use std::fmt::{self, Display, Formatter};

/// The representation of an element in a markup tree.
#[derive(Debug, Clone, PartialEq)]
pub struct VElement {
    /// The tag of the element. Eg: h1, p, div, ...
    tag: String,
    /// The attributes of the given element, in source order
    attributes: Attributes,
    /// The child nodes of the given element
    children: Vec<VNode>,
}

/// A list of attributes.
#[derive(Debug, Clone, Default, PartialEq)]
struct Attributes(IndexMap<String, String>);

/// The key, value pair of an attribute on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// The key of the attribute
    key: String,
    /// The value pair of the attribute key. Bare attributes have an empty
    /// value.
    value: String,
}

impl Attribute {
    /// Create an Attribute for a VElement.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Attribute {
        Attribute {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Tags which never have children nor a closing tag.
pub const VOID_TAGS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Tags whose content is kept as-is rather than parsed as markup.
pub const RAW_TEXT_TAGS: [&str; 2] = ["script", "style"];

impl VElement {
    /// Create a VElement.
    pub fn new(
        tag: impl Into<String>,
        attributes: Vec<Attribute>,
        children: Vec<VNode>,
    ) -> VElement {
        VElement {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Attributes::from(attributes),
            children,
        }
    }

    /// Create a VElement without a child.
    pub fn childless(tag: impl Into<String>, attributes: Vec<Attribute>) -> VElement {
        VElement::new(tag, attributes, Vec::new())
    }

    /// The lowercase tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Look up an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.0.get(key).map(String::as_str)
    }

    /// All attributes in source order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .0
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The child nodes.
    pub fn children(&self) -> &[VNode] {
        &self.children
    }

    pub(crate) fn push_child(&mut self, child: VNode) {
        self.children.push(child);
    }

    /// Whether the tag is a void tag.
    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }
}

impl From<Vec<Attribute>> for Attributes {
    fn from(attributes: Vec<Attribute>) -> Attributes {
        let mut map = IndexMap::with_capacity(attributes.len());
        for attr in attributes {
            // The first occurrence of a duplicated attribute wins.
            map.entry(attr.key.to_ascii_lowercase()).or_insert(attr.value);
        }
        Attributes(map)
    }
}

impl From<VElement> for VNode {
    fn from(el: VElement) -> VNode {
        VNode::Element(el)
    }
}

impl Display for VElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_void() {
            write!(f, "<{}{}>", self.tag, self.attributes)
        } else {
            write!(f, "<{}{}>", self.tag, self.attributes)?;
            for child in self.children.iter() {
                write!(f, "{}", child)?;
            }
            write!(f, "</{}>", self.tag)
        }
    }
}

impl Display for Attributes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (k, v) in self.0.iter() {
            write!(f, " {}=\"{}\"", k, escape_attribute(v))?;
        }
        Ok(())
    }
}
