//! Turning a chosen split into output markup.

use crate::markup::{Ownership, OWNER_ATTR};

const SOFT_HYPHEN: char = '\u{00AD}';

/// One emitted line. Immutable once pushed to the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub is_hyphenated: bool,
    pub is_justified: bool,
}

impl Line {
    /// Build a line from the buffer prefix before a split.
    ///
    /// Trailing white space is trimmed. A trailing soft hyphen is replaced by
    /// a visible hyphen in a span that stripping turns back into U+00AD.
    ///
    /// Only a prefix that itself ends in a dash counts as hyphenated. A dash
    /// followed by trimmed white space gets the plain marker, which strips
    /// back to a space.
    pub fn from_prefix(prefix: &str, is_justified: bool) -> Self {
        let trimmed = prefix.trim_end_matches(|c: char| c.is_whitespace() && c != '\u{00A0}');
        if trimmed.len() != prefix.len() {
            return Self {
                text: trimmed.to_string(),
                is_hyphenated: false,
                is_justified,
            };
        }
        let (text, soft) = match trimmed.strip_suffix(SOFT_HYPHEN) {
            Some(head) => (format!("{head}{}", soft_hyphen_span()), true),
            None => (trimmed.to_string(), false),
        };
        let is_hyphenated = soft || text.ends_with(['-', '\u{2014}', '\u{2013}']);
        Self {
            text,
            is_hyphenated,
            is_justified,
        }
    }

    /// The last line: whatever is left in the buffer, untouched.
    pub fn remainder(buffer: &str, is_justified: bool) -> Self {
        Self {
            text: buffer.to_string(),
            is_hyphenated: false,
            is_justified,
        }
    }

    /// The marker that ends this line in plain (non-justified) output.
    pub fn break_marker(&self) -> String {
        let owner = if self.is_hyphenated {
            Ownership::HyphenBreak
        } else {
            Ownership::Break
        };
        format!(r#"<br {OWNER_ATTR}="{}" />"#, owner.attr_value())
    }
}

pub fn soft_hyphen_span() -> String {
    format!(
        r#"<span {OWNER_ATTR}="{}">-</span>"#,
        Ownership::SoftHyphen.attr_value()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_white_space_trimmed() {
        let line = Line::from_prefix("The quick brown \n", false);
        assert_eq!(line.text, "The quick brown");
        assert!(!line.is_hyphenated);
        assert_eq!(line.break_marker(), r#"<br data-owner="balance-text" />"#);
    }

    #[test]
    fn test_soft_hyphen_becomes_visible() {
        let line = Line::from_prefix("extra\u{00AD}", false);
        assert_eq!(
            line.text,
            r#"extra<span data-owner="balance-text-softhyphen">-</span>"#
        );
        assert!(line.is_hyphenated);
        assert_eq!(line.break_marker(), r#"<br data-owner="balance-text-hyphen" />"#);
    }

    #[test]
    fn test_dashes_use_hyphen_marker() {
        assert!(Line::from_prefix("well-", false).is_hyphenated);
        assert!(Line::from_prefix("wait\u{2014}", false).is_hyphenated);
        assert!(Line::from_prefix("1\u{2013}", false).is_hyphenated);
        assert!(!Line::from_prefix("a&nbsp;", false).is_hyphenated);
    }

    #[test]
    fn test_spaced_dash_uses_plain_marker() {
        let line = Line::from_prefix("wait \u{2014} ", false);
        assert_eq!(line.text, "wait \u{2014}");
        assert!(!line.is_hyphenated);
        assert_eq!(line.break_marker(), r#"<br data-owner="balance-text" />"#);

        let soft = Line::from_prefix("extra\u{00AD} ", false);
        assert_eq!(soft.text, "extra\u{00AD}");
        assert!(!soft.is_hyphenated);
    }

    #[test]
    fn test_remainder_kept_verbatim() {
        let line = Line::remainder("fox jumps ", true);
        assert_eq!(line.text, "fox jumps ");
        assert!(line.is_justified);
    }
}
