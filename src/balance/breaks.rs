//! Break-opportunity classification over serialized markup.
//!
//! The balancer does not use UAX#14 here. A position is breakable when it
//! directly follows a break character and is not itself one. Break
//! characters are white space (except no-break space), `-`, en dash, em dash
//! and soft hyphen, counted only outside markup tags.

use super::nowrap::NoWrapRange;

/// Whether a char ends a line-breakable run.
pub fn is_break_char(ch: char) -> bool {
    matches!(ch, '-' | '\u{2014}' | '\u{2013}' | '\u{00AD}') || (ch.is_whitespace() && ch != '\u{00A0}')
}

/// Break characters of one buffer state, scanned once.
#[derive(Debug, Clone)]
pub struct BreakOpportunities<'a> {
    len: usize,
    /// Byte span `[start, end)` of each break char, sorted by start.
    chars: Vec<(usize, usize)>,
    ranges: &'a [NoWrapRange],
}

impl<'a> BreakOpportunities<'a> {
    pub fn new(buffer: &str, ranges: &'a [NoWrapRange]) -> Self {
        let mut chars = Vec::new();
        // First `<` or `>` after the current position, scanning backwards.
        let mut next_angle: Option<char> = None;
        for (pos, ch) in buffer.char_indices().rev() {
            let in_tag = next_angle == Some('>');
            if is_break_char(ch) && !in_tag && !ranges.iter().any(|r| r.contains(pos)) {
                chars.push((pos, pos + ch.len_utf8()));
            }
            if ch == '<' || ch == '>' {
                next_angle = Some(ch);
            }
        }
        chars.reverse();
        Self {
            len: buffer.len(),
            chars,
            ranges,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_break_at(&self, index: usize) -> bool {
        self.chars.binary_search_by_key(&index, |c| c.0).is_ok()
    }

    fn break_ends_at(&self, index: usize) -> bool {
        let after = self.chars.partition_point(|c| c.0 < index);
        after > 0 && self.chars[after - 1].1 == index
    }

    /// Whether a line may end at byte offset `index`.
    pub fn is_opportunity(&self, index: usize) -> bool {
        if index == 0 || index == self.len {
            return true;
        }
        if index > self.len || self.ranges.iter().any(|r| r.contains(index)) {
            return false;
        }
        self.break_ends_at(index) && !self.is_break_at(index)
    }

    /// Every opportunity strictly between the buffer boundaries.
    pub fn interior(&self) -> impl Iterator<Item = usize> + '_ {
        self.chars
            .iter()
            .map(|c| c.1)
            .filter(move |&i| i < self.len && self.is_opportunity(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opportunities(buffer: &str) -> Vec<usize> {
        BreakOpportunities::new(buffer, &[]).interior().collect()
    }

    #[test]
    fn test_spaces_and_dashes() {
        assert_eq!(opportunities("The quick brown"), vec![4, 10]);
        assert_eq!(opportunities("well-known"), vec![5]);
        // A run of break chars yields one opportunity at its end.
        assert_eq!(opportunities("a  b"), vec![3]);
    }

    #[test]
    fn test_boundaries_always_breakable() {
        let b = BreakOpportunities::new("abc", &[]);
        assert!(b.is_opportunity(0));
        assert!(b.is_opportunity(3));
        assert!(!b.is_opportunity(1));
    }

    #[test]
    fn test_nbsp_is_not_a_break() {
        assert!(opportunities("a\u{00A0}b").is_empty());
        assert!(opportunities("a&nbsp;b").is_empty());
    }

    #[test]
    fn test_multibyte_break_chars() {
        // em dash is three bytes
        assert_eq!(opportunities("a\u{2014}b"), vec![4]);
        assert_eq!(opportunities("extra\u{00AD}ordinary"), vec![7]);
    }

    #[test]
    fn test_chars_inside_tags_ignored() {
        let buffer = r#"a <span class="x y" data-a="b-c">d e</span>"#;
        let found = opportunities(buffer);
        let expected = vec![2, buffer.find("e<").unwrap()];
        assert_eq!(found, expected);
    }

    #[test]
    fn test_nowrap_interior_excluded() {
        let buffer = "ab <i>c d</i> e";
        let ranges = [NoWrapRange::new(3, 13)];
        let b = BreakOpportunities::new(buffer, &ranges);
        assert_eq!(b.interior().collect::<Vec<_>>(), vec![3, 14]);
        assert!(!b.is_opportunity(8));
    }
}
