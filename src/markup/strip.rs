//! Removal of markup generated by a previous balancing pass.
//!
//! Every artifact the materializer inserts carries a `data-owner` attribute.
//! Stripping runs at the start of each pass so a re-balance (after a resize,
//! say) always starts from the original text.

use super::{push_merged, Element, Node};

/// Attribute that marks generated markup.
pub const OWNER_ATTR: &str = "data-owner";

/// The kinds of generated markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// `<br>` ending a line that broke at white space.
    Break,
    /// `<br>` ending a line that already ends in a hyphen or dash.
    HyphenBreak,
    /// `<span>` holding the visible hyphen that replaced a soft hyphen.
    SoftHyphen,
    /// `<span>` carrying justification word spacing.
    Justify,
}

impl Ownership {
    pub fn attr_value(&self) -> &'static str {
        match self {
            Self::Break => "balance-text",
            Self::HyphenBreak => "balance-text-hyphen",
            Self::SoftHyphen => "balance-text-softhyphen",
            Self::Justify => "balance-text-justify",
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Self::Break | Self::HyphenBreak => "br",
            Self::SoftHyphen | Self::Justify => "span",
        }
    }

    /// Which generated artifact an element is, if any.
    pub fn of(el: &Element) -> Option<Self> {
        let owner = el.attr(OWNER_ATTR)?;
        [
            Self::Break,
            Self::HyphenBreak,
            Self::SoftHyphen,
            Self::Justify,
        ]
        .into_iter()
        .find(|o| o.attr_value() == owner && o.tag() == el.name)
    }
}

/// Strip generated markup in place. Returns the number of artifacts removed.
///
/// - hyphen breaks are dropped (the hyphen they follow is already in the text)
/// - plain breaks become a single space
/// - soft-hyphen spans become U+00AD again
/// - justification spans are unwrapped, their children spliced into the parent
pub fn strip_generated(nodes: &mut Vec<Node>) -> usize {
    let mut removed = 0;
    let old = std::mem::take(nodes);
    for node in old {
        match node {
            Node::Element(mut el) => match Ownership::of(&el) {
                Some(Ownership::HyphenBreak) => removed += 1,
                Some(Ownership::Break) => {
                    removed += 1;
                    push_merged(nodes, Node::text(" "));
                }
                Some(Ownership::SoftHyphen) => {
                    removed += 1;
                    push_merged(nodes, Node::text("\u{00AD}"));
                }
                Some(Ownership::Justify) => {
                    removed += 1 + strip_generated(&mut el.children);
                    for child in el.children {
                        push_merged(nodes, child);
                    }
                }
                None => {
                    removed += strip_generated(&mut el.children);
                    nodes.push(Node::Element(el));
                }
            },
            other => push_merged(nodes, other),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;

    fn strip(src: &str) -> String {
        let mut frag = parse(src);
        strip_generated(&mut frag.nodes);
        frag.to_markup()
    }

    #[test]
    fn test_plain_break_becomes_space() {
        assert_eq!(
            strip(r#"The quick brown<br data-owner="balance-text" />fox"#),
            "The quick brown fox"
        );
    }

    #[test]
    fn test_hyphen_break_removed() {
        assert_eq!(
            strip(r#"well-<br data-owner="balance-text-hyphen" />known"#),
            "well-known"
        );
    }

    #[test]
    fn test_soft_hyphen_restored() {
        assert_eq!(
            strip(concat!(
                r#"extra<span data-owner="balance-text-softhyphen">-</span>"#,
                r#"<br data-owner="balance-text-hyphen" />ordinary"#
            )),
            "extra\u{00AD}ordinary"
        );
    }

    #[test]
    fn test_justify_span_unwrapped_keeps_nested_markup() {
        assert_eq!(
            strip(concat!(
                r#"<span style="word-spacing: 4px;" data-owner="balance-text-justify">The <b>quick</b> </span>"#,
                r#"<span style="word-spacing: 9px;" data-owner="balance-text-justify">fox </span>"#
            )),
            "The <b>quick</b> fox "
        );
    }

    #[test]
    fn test_foreign_markup_untouched() {
        let src = r#"a<br>b<span data-owner="someone-else">c</span>"#;
        assert_eq!(strip(src), src);
    }

    #[test]
    fn test_strip_is_idempotent() {
        let once = strip(r#"a<br data-owner="balance-text" />b"#);
        assert_eq!(strip(&once), once);
    }

    #[test]
    fn test_owner_requires_matching_tag() {
        let src = r#"a<span data-owner="balance-text">b</span>"#;
        assert_eq!(strip(src), src);
    }
}
