//! Templating helpers.
//!
//! A [`Template`] is a list of literal segments with values interpolated
//! between them, the same shape as a tagged template literal. [`html`] turns
//! one into a single [`Markup`] node and [`css`] into a [`Style`] node.
//!
//! The [`html!`](crate::html) and [`css!`](crate::css) macros build templates
//! from a literal in which every `${}` marks an interpolation slot:
//!
//! ```
//! use felement::html;
//!
//! let count = 0;
//! let markup = html!("<button>Count <span>${}</span></button>", count).unwrap();
//! assert_eq!(markup.to_string(), "<button>Count <span>0</span></button>");
//! ```

use crate::error::{Error, Result};
use crate::vdom::velement::Attribute;
use crate::vdom::{VElement, VNode, VText};
use std::fmt::{self, Display, Formatter};

mod entities;
pub mod parser;

/// The marker splitting a template literal into segments.
pub const SLOT: &str = "${}";

/// Literal segments and the values interpolated between them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    strings: Vec<Option<String>>,
    values: Vec<Option<String>>,
}

impl Template {
    /// Create a template from its raw parts. Value `i` is placed right after
    /// segment `i`.
    pub fn new(strings: Vec<Option<String>>, values: Vec<Option<String>>) -> Template {
        Template { strings, values }
    }

    /// Split `literal` at every [`SLOT`] and pair the pieces with `values`.
    pub fn format(literal: &str, values: Vec<Option<String>>) -> Template {
        Template {
            strings: literal.split(SLOT).map(|s| Some(s.to_string())).collect(),
            values,
        }
    }

    /// Number of interpolation slots between the literal segments.
    pub fn slots(&self) -> usize {
        self.strings.len().saturating_sub(1)
    }

    /// Number of interpolated values, filled or not.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Concatenate segments and values.
    pub fn render(&self) -> String {
        interpolate(&self.strings, &self.values)
    }
}

/// Concatenate literal segments and interpolated values strictly by index.
/// Missing segments and values contribute nothing; values without a
/// preceding segment are dropped.
pub fn interpolate<S: AsRef<str>, V: AsRef<str>>(
    strings: &[Option<S>],
    values: &[Option<V>],
) -> String {
    let mut result = String::new();
    for (i, segment) in strings.iter().enumerate() {
        if let Some(segment) = segment {
            result.push_str(segment.as_ref());
        }
        if let Some(Some(value)) = values.get(i) {
            result.push_str(value.as_ref());
        }
    }
    result
}

/// Values that can fill a template slot. `None` means the slot stays empty.
pub trait Interpolate {
    #[allow(missing_docs)]
    fn interpolate(&self) -> Option<String>;
}

macro_rules! interpolate_display {
    ($($t:ty),*) => {
        $(
            impl Interpolate for $t {
                fn interpolate(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

interpolate_display!(
    str, String, char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32,
    f64, Markup, Style
);

impl<T: Interpolate + ?Sized> Interpolate for &T {
    fn interpolate(&self) -> Option<String> {
        (**self).interpolate()
    }
}

impl<T: Interpolate> Interpolate for Option<T> {
    fn interpolate(&self) -> Option<String> {
        self.as_ref().and_then(Interpolate::interpolate)
    }
}

impl Interpolate for serde_json::Value {
    fn interpolate(&self) -> Option<String> {
        match self {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// How the first node is picked out of parsed markup.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ParseStrategy {
    /// Pick the first element, skipping any text or comments before it.
    FirstElement,
    /// Pick the first node once leading whitespace is dropped, which may be
    /// text.
    FirstNode,
}

impl Default for ParseStrategy {
    fn default() -> ParseStrategy {
        ParseStrategy::FirstElement
    }
}

/// A single markup node produced by [`html`].
#[derive(Debug, Clone, PartialEq)]
pub struct Markup(VNode);

impl Markup {
    /// The root node.
    pub fn node(&self) -> &VNode {
        &self.0
    }

    /// Consume into the root node.
    pub fn into_node(self) -> VNode {
        self.0
    }
}

impl From<VElement> for Markup {
    fn from(el: VElement) -> Markup {
        Markup(el.into())
    }
}

impl Display for Markup {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `<style>` node produced by [`css`]. The text is not validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Style(String);

impl Style {
    /// The stylesheet text.
    pub fn text(&self) -> &str {
        &self.0
    }

    /// The style element as a markup node.
    pub fn to_node(&self) -> VNode {
        VElement::new(
            "style",
            Vec::<Attribute>::new(),
            vec![VText::raw(self.0.clone()).into()],
        )
        .into()
    }
}

impl Display for Style {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "<style>{}</style>", self.0)
    }
}

/// Convert a template into a markup node using the template-element strategy.
pub fn html(template: &Template) -> Result<Markup> {
    html_with(template, ParseStrategy::FirstElement)
}

/// Convert a template into a markup node with an explicit strategy.
/// More values than slots is an error: the extra ones would be lost.
pub fn html_with(template: &Template, strategy: ParseStrategy) -> Result<Markup> {
    if template.value_count() > template.slots() {
        return Err(Error::TemplateConversion(format!(
            "{} values for {} slots in {:?}",
            template.value_count(),
            template.slots(),
            template.render()
        )));
    }
    parse_markup(&template.render(), strategy)
}

/// Parse markup text and pick its root according to `strategy`. Fails when
/// nothing usable is found.
pub fn parse_markup(text: &str, strategy: ParseStrategy) -> Result<Markup> {
    let nodes = parser::parse_fragment(text);
    let root = match strategy {
        ParseStrategy::FirstElement => nodes.into_iter().find(|n| n.as_element().is_some()),
        ParseStrategy::FirstNode => nodes.into_iter().find(|n| !n.is_blank()),
    };
    root.map(Markup)
        .ok_or_else(|| Error::TemplateConversion(text.to_string()))
}

/// Wrap a template verbatim in a style node.
pub fn css(template: &Template) -> Style {
    debug_assert!(
        template.value_count() <= template.slots(),
        "css template has more values than slots"
    );
    Style(template.render())
}

/// Build a [`Markup`] node from a literal with `${}` slots.
#[macro_export]
macro_rules! html {
    ($literal:expr) => {
        $crate::template::html(&$crate::template::Template::format(
            $literal,
            ::std::vec::Vec::new(),
        ))
    };
    ($literal:expr, $($value:expr),+ $(,)?) => {
        $crate::template::html(&$crate::template::Template::format(
            $literal,
            ::std::vec![$($crate::template::Interpolate::interpolate(&$value)),+],
        ))
    };
}

/// Build a [`Style`] node from a literal with `${}` slots.
#[macro_export]
macro_rules! css {
    ($literal:expr) => {
        $crate::template::css(&$crate::template::Template::format($literal, ::std::vec::Vec::new()))
    };
    ($literal:expr, $($value:expr),+ $(,)?) => {
        $crate::template::css(&$crate::template::Template::format(
            $literal,
            ::std::vec![$($crate::template::Interpolate::interpolate(&$value)),+],
        ))
    };
}
