//! # Markup Model
//!
//! A small tree for inline HTML fragments: elements, text, comments and
//! processing instructions. The balancer works on the *serialized* form of an
//! element's content, so the serializer here is the single source of truth
//! for offsets: a node's length is the length of its serialization.
//!
//! Parsing goes through `quick-xml` configured to tolerate HTML habits
//! (unclosed and unmatched tags, void elements, valueless attributes).
//! Entities are decoded on the way in and text is re-escaped on the way out,
//! the same way a browser round-trips `innerHTML`.

pub mod strip;

pub use strip::{strip_generated, Ownership, OWNER_ATTR};

use crate::style::InlineStyle;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// A node in a parsed fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Decoded text.
    Text(String),
    /// Comment body, without the `<!--` `-->` delimiters.
    Comment(String),
    /// Instruction body, without the enclosing `<` `>`.
    ProcessingInstruction(String),
}

/// An element with its attributes in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The parsed `style` attribute.
    pub fn style(&self) -> InlineStyle {
        self.attr("style").map(InlineStyle::parse).unwrap_or_default()
    }

    pub fn is_void(&self) -> bool {
        is_void(&self.name)
    }

    /// Serialized length of the children only (`innerHTML.length`).
    pub fn inner_len(&self) -> usize {
        self.children.iter().map(Node::outer_len).sum()
    }

    /// Serialized length of the element including its own tags.
    pub fn outer_len(&self) -> usize {
        let mut out = String::new();
        self.write_tags(&mut out, true);
        out.len() + self.inner_len()
    }

    /// Concatenated decoded text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    fn write_tags(&self, out: &mut String, with_end: bool) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_attr(value, out);
            out.push('"');
        }
        out.push('>');
        if with_end && !self.is_void() {
            out.push_str("</");
            out.push_str(&self.name);
            out.push('>');
        }
    }

    fn write(&self, out: &mut String) {
        self.write_tags(out, false);
        if self.is_void() {
            return;
        }
        for child in &self.children {
            child.write(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl Node {
    pub fn text(s: &str) -> Self {
        Node::Text(s.to_string())
    }

    /// Serialized length (`outerHTML.length` for elements).
    pub fn outer_len(&self) -> usize {
        match self {
            Node::Element(el) => el.outer_len(),
            Node::Text(t) => {
                let mut out = String::new();
                escape_text(t, &mut out);
                out.len()
            }
            Node::Comment(c) => c.len() + 7,
            Node::ProcessingInstruction(pi) => pi.len() + 2,
        }
    }

    fn write(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write(out),
            Node::Text(t) => escape_text(t, out),
            Node::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
            Node::ProcessingInstruction(pi) => {
                out.push('<');
                out.push_str(pi);
                out.push('>');
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write(&mut out);
        f.write_str(&out)
    }
}

/// The children of an element, parsed from its inner markup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Serialize back to markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write(&mut out);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().map(Node::outer_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.nodes, &mut out);
        out
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
            _ => {}
        }
    }
}

/// Parse an inline markup fragment.
///
/// Never fails: anything the reader cannot make sense of is kept as text.
pub fn parse(src: &str) -> Fragment {
    let mut reader = Reader::from_str(src);
    {
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.check_comments = false;
    }

    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let el = element_from(&e);
                if el.is_void() {
                    append(&mut stack, &mut root, Node::Element(el));
                } else {
                    stack.push(el);
                }
            }
            Ok(Event::Empty(e)) => {
                append(&mut stack, &mut root, Node::Element(element_from(&e)));
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                // Close up to the nearest matching open element; stray end
                // tags are dropped like an HTML parser would.
                if let Some(pos) = stack.iter().rposition(|el| el.name == name) {
                    while stack.len() > pos {
                        if let Some(el) = stack.pop() {
                            append(&mut stack, &mut root, Node::Element(el));
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let raw = String::from_utf8_lossy(&e);
                append(&mut stack, &mut root, Node::Text(decode_entities(&raw)));
            }
            Ok(Event::CData(e)) => {
                let raw = String::from_utf8_lossy(&e).into_owned();
                append(&mut stack, &mut root, Node::Text(raw));
            }
            Ok(Event::Comment(e)) => {
                let body = String::from_utf8_lossy(&e).into_owned();
                append(&mut stack, &mut root, Node::Comment(body));
            }
            Ok(Event::PI(e)) => {
                let body = format!("?{}?", String::from_utf8_lossy(&e));
                append(&mut stack, &mut root, Node::ProcessingInstruction(body));
            }
            Ok(Event::Decl(_)) | Ok(Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(err) => {
                tracing::debug!(offset = before, "markup parse stopped: {err}; keeping rest as text");
                if let Some(rest) = src.get(before..) {
                    append(&mut stack, &mut root, Node::Text(rest.to_string()));
                }
                break;
            }
        }
    }

    // Unclosed elements are closed at the end of input.
    while let Some(el) = stack.pop() {
        append(&mut stack, &mut root, Node::Element(el));
    }

    Fragment::new(root)
}

/// Append a node to the innermost open element, merging adjacent text.
fn append(stack: &mut [Element], root: &mut Vec<Node>, node: Node) {
    let target = match stack.last_mut() {
        Some(el) => &mut el.children,
        None => root,
    };
    push_merged(target, node);
}

pub(crate) fn push_merged(target: &mut Vec<Node>, node: Node) {
    if let Node::Text(t) = &node {
        if t.is_empty() {
            return;
        }
        if let Some(Node::Text(prev)) = target.last_mut() {
            prev.push_str(t);
            return;
        }
    }
    target.push(node);
}

fn element_from(e: &BytesStart) -> Element {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
    let mut el = Element::new(&name);
    for attr in e.html_attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = decode_entities(&String::from_utf8_lossy(&attr.value));
        el.attrs.push((key, value));
    }
    el
}

/// Decode named and numeric character references.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    match quick_xml::escape::unescape_with(raw, resolve_entity) {
        Ok(decoded) => decoded.into_owned(),
        Err(err) => {
            tracing::trace!("leaving entities undecoded: {err}");
            raw.to_string()
        }
    }
}

fn resolve_entity(name: &str) -> Option<&'static str> {
    let s = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{00A0}",
        "shy" => "\u{00AD}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "thinsp" => "\u{2009}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "copy" => "\u{00A9}",
        _ => return None,
    };
    Some(s)
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        let frag = parse("Hello world");
        assert_eq!(frag.nodes, vec![Node::text("Hello world")]);
        assert_eq!(frag.to_markup(), "Hello world");
    }

    #[test]
    fn test_round_trip_nested() {
        let src = r#"The <b class="x">quick</b> brown <!--c--> fox"#;
        let frag = parse(src);
        assert_eq!(frag.to_markup(), src);
        assert_eq!(frag.len(), src.len());
    }

    #[test]
    fn test_void_elements_serialize_without_end_tag() {
        let frag = parse(r#"a<br data-owner="balance-text" />b<br>c"#);
        assert_eq!(frag.to_markup(), r#"a<br data-owner="balance-text">b<br>c"#);
    }

    #[test]
    fn test_entities_decode_and_reencode() {
        let frag = parse("a&nbsp;b &amp; c&shy;d");
        assert_eq!(frag.text_content(), "a\u{00A0}b & c\u{00AD}d");
        assert_eq!(frag.to_markup(), "a&nbsp;b &amp; c\u{00AD}d");
    }

    #[test]
    fn test_unclosed_element_is_closed_at_end() {
        let frag = parse("one <i>two three");
        assert_eq!(frag.to_markup(), "one <i>two three</i>");
    }

    #[test]
    fn test_stray_end_tag_dropped() {
        let frag = parse("one</b> two");
        assert_eq!(frag.to_markup(), "one two");
    }

    #[test]
    fn test_lengths() {
        let frag = parse(r#"x<span style="white-space: nowrap">ab</span><!--hi-->"#);
        let Node::Element(span) = &frag.nodes[1] else {
            panic!("expected span");
        };
        assert_eq!(span.inner_len(), 2);
        assert_eq!(span.outer_len(), r#"<span style="white-space: nowrap">ab</span>"#.len());
        assert_eq!(frag.nodes[2].outer_len(), "<!--hi-->".len());
    }

    #[test]
    fn test_element_style_attribute() {
        let frag = parse(r#"<span style="white-space: nowrap">x</span>"#);
        let Node::Element(span) = &frag.nodes[0] else {
            panic!("expected span");
        };
        assert_eq!(span.style().white_space(), Some(crate::style::WhiteSpace::Nowrap));
    }
}
