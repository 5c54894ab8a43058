//! The subset of CSS selectors used to target listener nodes.
//!
//! Supported: type and universal selectors, `#id`, `.class`, `[attr]`,
//! `[attr=value]`, the descendant and child (`>`) combinators and selector
//! lists. Matching is always scoped to a root: only its descendants can
//! match and combinators never look above it.

use crate::error::{Error, Result};

/// A read-only view over a tree of elements, enough to evaluate selectors.
pub trait ElementTree {
    /// Node handle.
    type Node: Copy + Eq;

    /// The lowercase tag name, `None` for non-element nodes.
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    /// The value of an attribute.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// The parent node.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
}

/// A comma separated list of selectors; matches if any of them does.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    source: String,
    selectors: Vec<Selector>,
}

#[derive(Debug, Clone, PartialEq)]
struct Selector {
    compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl SelectorList {
    /// Parse a selector list.
    pub fn parse(source: &str) -> Result<SelectorList> {
        let fail = |reason: &str| Error::Selector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        let mut selectors = Vec::new();
        for part in split_top_level(source) {
            let mut cursor = Cursor {
                chars: part.trim().chars().collect(),
                pos: 0,
            };
            if cursor.chars.is_empty() {
                return Err(fail("empty selector"));
            }
            selectors.push(cursor.selector().map_err(|reason| fail(&reason))?);
        }
        Ok(SelectorList {
            source: source.to_string(),
            selectors,
        })
    }

    /// The selector text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `node`, a descendant of `scope`, matches.
    pub fn matches<T: ElementTree>(&self, tree: &T, node: T::Node, scope: T::Node) -> bool {
        self.selectors
            .iter()
            .any(|sel| sel.matches_at(tree, sel.compounds.len() - 1, node, scope))
    }
}

impl Selector {
    fn matches_at<T: ElementTree>(
        &self,
        tree: &T,
        idx: usize,
        node: T::Node,
        scope: T::Node,
    ) -> bool {
        if node == scope || !self.compounds[idx].matches(tree, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => match tree.parent(node) {
                Some(parent) => self.matches_at(tree, idx - 1, parent, scope),
                None => false,
            },
            Combinator::Descendant => {
                let mut ancestor = tree.parent(node);
                while let Some(current) = ancestor {
                    if current == scope {
                        return false;
                    }
                    if self.matches_at(tree, idx - 1, current, scope) {
                        return true;
                    }
                    ancestor = tree.parent(current);
                }
                false
            }
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
    }

    fn matches<T: ElementTree>(&self, tree: &T, node: T::Node) -> bool {
        let tag = match tree.tag_name(node) {
            Some(tag) => tag,
            None => return false,
        };
        if let Some(ref expected) = self.tag {
            if expected != "*" && expected != tag {
                return false;
            }
        }
        if let Some(ref id) = self.id {
            if tree.attribute(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let classes = tree.attribute(node, "class").unwrap_or("");
            if !self
                .classes
                .iter()
                .all(|class| classes.split_whitespace().any(|c| c == class))
            {
                return false;
            }
        }
        self.attributes.iter().all(|(name, value)| {
            match (tree.attribute(node, name), value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            }
        })
    }
}

fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&source[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&source[start..]);
    parts
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        self.pos += 1;
        ch
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().map_or(false, char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn selector(&mut self) -> std::result::Result<Selector, String> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let spaced = self.skip_whitespace();
            let combinator = match self.peek() {
                None => break,
                Some('>') => {
                    self.bump();
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if spaced => Combinator::Descendant,
                Some(ch) => return Err(format!("unexpected `{}`", ch)),
            };
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }
        Ok(Selector {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> std::result::Result<Compound, String> {
        let mut compound = Compound::default();
        if self.peek() == Some('*') {
            self.bump();
            compound.tag = Some("*".to_string());
        } else if self.peek().map_or(false, is_ident_char) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attributes.push(self.attribute()?);
                }
                Some(ch) if ch.is_whitespace() || ch == '>' => break,
                None => break,
                Some(ch) => return Err(format!("unsupported `{}`", ch)),
            }
        }
        if compound.is_empty() {
            return Err("expected a selector".to_string());
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> std::result::Result<(String, Option<String>), String> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let value = match self.bump() {
            Some(']') => return Ok((name, None)),
            Some('=') => {
                self.skip_whitespace();
                match self.peek() {
                    Some(q @ '"') | Some(q @ '\'') => {
                        self.bump();
                        let mut value = String::new();
                        loop {
                            match self.bump() {
                                Some(c) if c == q => break,
                                Some(c) => value.push(c),
                                None => return Err("unterminated string".to_string()),
                            }
                        }
                        value
                    }
                    _ => self.ident()?,
                }
            }
            Some(ch) => return Err(format!("unsupported attribute operator `{}`", ch)),
            None => return Err("unterminated attribute selector".to_string()),
        };
        self.skip_whitespace();
        match self.bump() {
            Some(']') => Ok((name, Some(value))),
            _ => Err("expected `]`".to_string()),
        }
    }

    fn ident(&mut self) -> std::result::Result<String, String> {
        let start = self.pos;
        while self.peek().map_or(false, is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err("expected an identifier".to_string());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod test {
    use super::*;

    /// A tiny tree: (tag, attributes, parent index).
    struct Tree(Vec<(&'static str, Vec<(&'static str, &'static str)>, Option<usize>)>);

    impl ElementTree for Tree {
        type Node = usize;

        fn tag_name(&self, node: usize) -> Option<&str> {
            Some(self.0[node].0)
        }

        fn attribute(&self, node: usize, name: &str) -> Option<&str> {
            self.0[node].1.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
        }

        fn parent(&self, node: usize) -> Option<usize> {
            self.0[node].2
        }
    }

    // div#outer > f-todos(0 is scope at 1) > ul.todos > li[data-id=1] > input
    fn tree() -> Tree {
        Tree(vec![
            ("div", vec![("id", "outer")], None),
            ("f-todos", vec![("data-key", "f0")], Some(0)),
            ("ul", vec![("class", "todos big")], Some(1)),
            ("li", vec![("data-id", "1")], Some(2)),
            ("input", vec![("type", "checkbox")], Some(3)),
        ])
    }

    #[test]
    fn should_match_type_class_and_attribute() {
        let tree = tree();
        assert!(SelectorList::parse("li").unwrap().matches(&tree, 3, 1));
        assert!(SelectorList::parse("ul.todos.big").unwrap().matches(&tree, 2, 1));
        assert!(SelectorList::parse("[data-id='1']").unwrap().matches(&tree, 3, 1));
        assert!(SelectorList::parse("li[data-id=1]").unwrap().matches(&tree, 3, 1));
        assert!(SelectorList::parse("input[type]").unwrap().matches(&tree, 4, 1));
        assert!(!SelectorList::parse("li[data-id=2]").unwrap().matches(&tree, 3, 1));
        assert!(!SelectorList::parse("ul.small").unwrap().matches(&tree, 2, 1));
    }

    #[test]
    fn should_match_combinators() {
        let tree = tree();
        assert!(SelectorList::parse("ul input").unwrap().matches(&tree, 4, 1));
        assert!(SelectorList::parse("ul > li > input").unwrap().matches(&tree, 4, 1));
        assert!(!SelectorList::parse("ul > input").unwrap().matches(&tree, 4, 1));
        assert!(SelectorList::parse("* > input").unwrap().matches(&tree, 4, 1));
    }

    #[test]
    fn should_not_look_above_scope() {
        let tree = tree();
        assert!(!SelectorList::parse("#outer li").unwrap().matches(&tree, 3, 1));
        assert!(!SelectorList::parse("f-todos li").unwrap().matches(&tree, 3, 1));
        assert!(!SelectorList::parse("f-todos").unwrap().matches(&tree, 1, 1));
    }

    #[test]
    fn should_match_any_of_a_list() {
        let tree = tree();
        let list = SelectorList::parse("button, li[data-id='1']").unwrap();
        assert!(list.matches(&tree, 3, 1));
        assert!(!list.matches(&tree, 2, 1));
        assert_eq!(list.as_str(), "button, li[data-id='1']");
    }

    #[test]
    fn should_reject_unsupported_selectors() {
        for bad in &["", "li:hover", "a + b", "a ~ b", "[x", "li,", "[x~=y]", "> li"] {
            assert!(
                matches!(SelectorList::parse(bad), Err(Error::Selector { .. })),
                "{} should be rejected",
                bad
            );
        }
    }
}
