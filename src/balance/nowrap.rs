//! No-wrap ranges: spans of the buffer that must stay on one line.
//!
//! An embedded element whose computed `white-space` is `nowrap` covers its
//! whole serialized form, tags included. Offsets are byte offsets into the
//! serialized content, so every length here comes from the markup
//! serializer rather than from decoded text.

use crate::host::TextElement;
use crate::markup::{Fragment, Node};
use crate::style::WhiteSpace;

/// Half-open byte range `[start, end)`. Its boundaries are breakable, its
/// interior is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoWrapRange {
    pub start: usize,
    pub end: usize,
}

impl NoWrapRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Strictly inside.
    pub fn contains(&self, index: usize) -> bool {
        self.start < index && index < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Ranges for an element's full content.
///
/// `root` is the element's own computed white-space. A root that is itself
/// `nowrap` yields a single range over everything.
pub fn collect<E: TextElement + ?Sized>(
    element: &E,
    content: &Fragment,
    root: WhiteSpace,
) -> Vec<NoWrapRange> {
    if root == WhiteSpace::Nowrap {
        return vec![NoWrapRange::new(0, content.len())];
    }
    let (ranges, consumed) = walk_nodes(element, &content.nodes, root, 0);
    debug_assert_eq!(consumed, content.len());
    ranges
}

fn walk_nodes<E: TextElement + ?Sized>(
    element: &E,
    nodes: &[Node],
    inherited: WhiteSpace,
    offset: usize,
) -> (Vec<NoWrapRange>, usize) {
    let mut ranges = Vec::new();
    let mut consumed = 0;
    for node in nodes {
        let (mut found, len) = walk(element, node, inherited, offset + consumed);
        ranges.append(&mut found);
        consumed += len;
    }
    (ranges, consumed)
}

/// Ranges inside one node and the node's serialized length.
fn walk<E: TextElement + ?Sized>(
    element: &E,
    node: &Node,
    inherited: WhiteSpace,
    offset: usize,
) -> (Vec<NoWrapRange>, usize) {
    match node {
        Node::Element(el) => {
            let white_space = element.child_white_space(el, inherited);
            let outer = el.outer_len();
            if white_space == WhiteSpace::Nowrap {
                return (vec![NoWrapRange::new(offset, offset + outer)], outer);
            }
            let open_tag = outer - el.inner_len() - closing_tag_len(el);
            let (ranges, inner) = walk_nodes(element, &el.children, white_space, offset + open_tag);
            (ranges, inner + (outer - el.inner_len()))
        }
        other => (Vec::new(), other.outer_len()),
    }
}

fn closing_tag_len(el: &crate::markup::Element) -> usize {
    if el.is_void() {
        0
    } else {
        el.name.len() + 3
    }
}

/// Ranges for the remaining buffer after `consumed` bytes were cut off.
pub fn rebase(ranges: &[NoWrapRange], consumed: usize) -> Vec<NoWrapRange> {
    ranges
        .iter()
        .filter(|r| r.end > consumed)
        .map(|r| NoWrapRange::new(r.start.saturating_sub(consumed), r.end - consumed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BalanceError;
    use crate::host::BoxSize;
    use crate::markup::parse;
    use crate::style::StyleProperty;

    /// Content-only element; white-space comes from inline styles.
    struct Bare;

    impl TextElement for Bare {
        fn inner_markup(&self) -> String {
            String::new()
        }
        fn set_inner_markup(&mut self, _markup: &str) {}
        fn inline_style(&self, _property: StyleProperty) -> Option<String> {
            None
        }
        fn set_inline_style(&mut self, _property: StyleProperty, _value: Option<&str>) {}
        fn computed_style(&self, _property: StyleProperty) -> Option<String> {
            None
        }
        fn measure(&self) -> Result<BoxSize, BalanceError> {
            Ok(BoxSize::default())
        }
        fn measure_fragment(&self, _markup: &str) -> Result<f64, BalanceError> {
            Ok(0.0)
        }
        fn space_aspect_ratio(&self) -> Result<f64, BalanceError> {
            Ok(2.0)
        }
    }

    fn ranges(src: &str) -> Vec<NoWrapRange> {
        collect(&Bare, &parse(src), WhiteSpace::Normal)
    }

    #[test]
    fn test_single_nowrap_span() {
        let src = r#"The quick <span style="white-space: nowrap">brown fox</span> jumps"#;
        let r = ranges(src);
        let start = src.find("<span").unwrap();
        let end = src.find(" jumps").unwrap();
        assert_eq!(r, vec![NoWrapRange::new(start, end)]);
    }

    #[test]
    fn test_nested_in_plain_element() {
        let src = r#"a <b>bold <i style="white-space:nowrap">x y</i></b> c"#;
        let r = ranges(src);
        let start = src.find("<i").unwrap();
        let end = src.find("</b>").unwrap();
        assert_eq!(r, vec![NoWrapRange::new(start, end)]);
    }

    #[test]
    fn test_comments_and_entities_count_serialized_length() {
        let src = r#"a&amp;b <!--note--> <span style="white-space: nowrap">c d</span>"#;
        let r = ranges(src);
        let start = src.find("<span").unwrap();
        assert_eq!(r, vec![NoWrapRange::new(start, src.len())]);
    }

    #[test]
    fn test_inherited_nowrap_child_is_not_split_out() {
        let src = r#"<span style="white-space: nowrap">a <b>b c</b></span> d"#;
        let r = ranges(src);
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].start, 0);
    }

    #[test]
    fn test_plain_markup_has_no_ranges() {
        let src = r#"x <em>y <span style="white-space: normal">z w</span></em>"#;
        assert!(ranges(src).is_empty());
    }

    #[test]
    fn test_nowrap_root_covers_everything() {
        let frag = parse("a b c");
        assert_eq!(
            collect(&Bare, &frag, WhiteSpace::Nowrap),
            vec![NoWrapRange::new(0, 5)]
        );
    }

    #[test]
    fn test_rebase_drops_consumed_and_shifts() {
        let r = [NoWrapRange::new(2, 8), NoWrapRange::new(10, 20)];
        assert_eq!(rebase(&r, 10), vec![NoWrapRange::new(0, 10)]);
        assert_eq!(rebase(&r, 9), vec![NoWrapRange::new(1, 11)]);
        assert!(rebase(&r, 20).is_empty());
    }
}
