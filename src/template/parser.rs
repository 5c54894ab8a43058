//! A forgiving HTML fragment parser. Like a browser it never rejects input:
//! unclosed elements are closed at the end, stray end tags are dropped and a
//! `<` that does not start markup is kept as text.

use super::entities;
use crate::vdom::velement::{Attribute, RAW_TEXT_TAGS};
use crate::vdom::{VElement, VNode, VText};

/// Tags that implicitly close an open sibling of the same name.
const SELF_NESTING_FORBIDDEN: [&str; 4] = ["li", "option", "p", "tr"];

/// Parse markup into the list of top-level nodes it describes.
pub fn parse_fragment(input: &str) -> Vec<VNode> {
    let mut parser = Parser {
        input,
        pos: 0,
        roots: Vec::new(),
        open: Vec::new(),
        text: String::new(),
    };
    parser.run();
    parser.roots
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    roots: Vec<VNode>,
    open: Vec<VElement>,
    text: String,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn run(&mut self) {
        while self.pos < self.input.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.comment();
            } else if rest.starts_with("</") && starts_with_name(&rest[2..]) {
                self.end_tag();
            } else if rest.starts_with('<') && starts_with_name(&rest[1..]) {
                self.start_tag();
            } else if rest.starts_with('<') {
                self.text.push('<');
                self.pos += 1;
            } else {
                let len = rest.find('<').unwrap_or(rest.len());
                self.text.push_str(&rest[..len]);
                self.pos += len;
            }
        }
        self.flush_text();
        while let Some(el) = self.open.pop() {
            self.append(el.into());
        }
    }

    fn append(&mut self, node: VNode) {
        match self.open.last_mut() {
            Some(parent) => parent.push_child(node),
            None => self.roots.push(node),
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = decode_entities(&std::mem::take(&mut self.text));
            self.append(VText::text(text).into());
        }
    }

    fn comment(&mut self) {
        self.flush_text();
        let body = &self.rest()[4..];
        let (content, consumed) = match body.find("-->") {
            Some(end) => (&body[..end], end + 3),
            None => (body, body.len()),
        };
        self.append(VText::comment(content).into());
        self.pos += 4 + consumed;
    }

    fn end_tag(&mut self) {
        self.flush_text();
        self.pos += 2;
        let name = self.name();
        self.skip_past('>');
        if let Some(idx) = self.open.iter().rposition(|el| el.tag() == name) {
            while self.open.len() > idx {
                if let Some(el) = self.open.pop() {
                    self.append(el.into());
                }
            }
        }
    }

    fn start_tag(&mut self) {
        self.flush_text();
        self.pos += 1;
        let name = self.name();
        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                break;
            } else if rest.starts_with('>') {
                self.pos += 1;
                break;
            } else if rest.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            } else if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }
            attributes.push(self.attribute());
        }

        if SELF_NESTING_FORBIDDEN.contains(&name.as_str())
            && self.open.last().map(VElement::tag) == Some(name.as_str())
        {
            if let Some(sibling) = self.open.pop() {
                self.append(sibling.into());
            }
        }

        let mut el = VElement::childless(name, attributes);
        if el.is_void() || self_closing {
            self.append(el.into());
        } else if RAW_TEXT_TAGS.contains(&el.tag()) {
            let content = self.raw_text(el.tag());
            if !content.is_empty() {
                el.push_child(VText::raw(content).into());
            }
            self.append(el.into());
        } else {
            self.open.push(el);
        }
    }

    fn attribute(&mut self) -> Attribute {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len())
            .max(1);
        let key = rest[..len].to_string();
        self.pos += len;

        self.skip_whitespace();
        if !self.rest().starts_with('=') {
            return Attribute::new(key, "");
        }
        self.pos += 1;
        self.skip_whitespace();

        let rest = self.rest();
        let value = match rest.chars().next() {
            Some(quote @ '"') | Some(quote @ '\'') => {
                let body = &rest[1..];
                let end = body.find(quote).unwrap_or(body.len());
                self.pos += 1 + (end + 1).min(body.len());
                &body[..end]
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += end;
                &rest[..end]
            }
        };
        Attribute::new(key, decode_entities(value))
    }

    fn raw_text(&mut self, tag: &str) -> String {
        let rest = self.rest();
        let closing = format!("</{}", tag);
        let end = rest
            .to_ascii_lowercase()
            .find(&closing)
            .unwrap_or(rest.len());
        let content = rest[..end].to_string();
        self.pos += end;
        if self.pos < self.input.len() {
            self.skip_past('>');
        }
        content
    }

    fn name(&mut self) -> String {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !is_name_char(c))
            .unwrap_or(rest.len());
        self.pos += len;
        rest[..len].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn skip_past(&mut self, ch: char) {
        let rest = self.rest();
        self.pos += rest.find(ch).map(|idx| idx + 1).unwrap_or(rest.len());
    }
}

fn starts_with_name(s: &str) -> bool {
    s.chars().next().map_or(false, |c| c.is_ascii_alphabetic())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' || c == '.'
}

/// Decode named and numeric character references. Unknown or unterminated
/// references are kept as written.
pub(crate) fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        let decoded = rest.find(';').and_then(|end| {
            let entity = &rest[1..end];
            decode_entity(entity).map(|ch| (ch, end + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    let code = match entity.strip_prefix('#') {
        Some(num) => match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        },
        None => return entities::lookup(entity),
    };
    char::from_u32(code)
}

#[cfg(test)]
mod test {
    use super::*;

    fn serialize(nodes: &[VNode]) -> String {
        nodes.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn should_parse_nested_elements() {
        let nodes = parse_fragment("<button>Count <span>0</span></button>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(serialize(&nodes), "<button>Count <span>0</span></button>");
    }

    #[test]
    fn should_parse_attribute_styles() {
        let nodes = parse_fragment(r#"<input type="checkbox" checked data-id='3' name=x>"#);
        let el = nodes[0].as_element().unwrap();
        assert_eq!(el.attribute("type"), Some("checkbox"));
        assert_eq!(el.attribute("checked"), Some(""));
        assert_eq!(el.attribute("data-id"), Some("3"));
        assert_eq!(el.attribute("name"), Some("x"));
        assert!(el.children().is_empty());
    }

    #[test]
    fn should_keep_surrounding_whitespace_as_text() {
        let nodes = parse_fragment("\n  <p>hi</p>\n");
        assert_eq!(nodes.len(), 3);
        assert!(nodes[0].is_blank());
        assert!(nodes[2].is_blank());
    }

    #[test]
    fn should_close_unclosed_elements_at_end() {
        let nodes = parse_fragment("<div><p>one");
        assert_eq!(serialize(&nodes), "<div><p>one</p></div>");
    }

    #[test]
    fn should_ignore_stray_end_tags() {
        let nodes = parse_fragment("<div>a</span>b</div>");
        assert_eq!(serialize(&nodes), "<div>ab</div>");
    }

    #[test]
    fn should_close_open_list_item_on_sibling() {
        let nodes = parse_fragment("<ul><li>a<li>b</ul>");
        assert_eq!(serialize(&nodes), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn should_parse_comments_and_self_closing_tags() {
        let nodes = parse_fragment("<div><!-- note --><br/><x-icon /></div>");
        assert_eq!(
            serialize(&nodes),
            "<div><!-- note --><br><x-icon></x-icon></div>"
        );
    }

    #[test]
    fn should_keep_style_content_raw() {
        let nodes = parse_fragment("<style>a > b { color: red; }</style>");
        assert_eq!(serialize(&nodes), "<style>a > b { color: red; }</style>");
    }

    #[test]
    fn should_treat_lone_angle_bracket_as_text() {
        let nodes = parse_fragment("1 < 2");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text_content(), "1 < 2");
    }

    #[test]
    fn should_decode_entities() {
        assert_eq!(
            decode_entities("a &amp; b &lt;c&gt; &#65;&#x42; &bogus;"),
            "a & b <c> AB &bogus;"
        );
        let nodes = parse_fragment(r#"<a title="x &quot;y&quot;">&copy</a>"#);
        let el = nodes[0].as_element().unwrap();
        assert_eq!(el.attribute("title"), Some(r#"x "y""#));
        assert_eq!(nodes[0].text_content(), "&copy");
    }

    #[test]
    fn should_decode_named_references() {
        let nodes =
            parse_fragment("<p>&copy; 2024 &mdash; x &times; y&hellip; &Eacute;t&eacute;</p>");
        assert_eq!(nodes[0].text_content(), "© 2024 — x × y… Été");
        assert_eq!(serialize(&nodes), "<p>© 2024 — x × y… Été</p>");
        assert_eq!(decode_entities("&euro;&nbsp;&Omega;&rarr;&COPY;"), "€\u{a0}Ω→&COPY;");
    }

    #[test]
    fn should_lowercase_tag_names() {
        let nodes = parse_fragment("<DIV Class=a></div>");
        let el = nodes[0].as_element().unwrap();
        assert_eq!(el.tag(), "div");
        assert_eq!(el.attribute("class"), Some("a"));
    }
}
