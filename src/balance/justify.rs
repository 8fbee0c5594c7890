//! Word spacing that stretches a line to the container width.

use crate::error::BalanceError;
use crate::host::TextElement;
use crate::markup::{Ownership, OWNER_ATTR};

/// Inter-word spacing in whole pixels. Negative when the text is wider than
/// the container.
pub fn word_spacing(container_width: f64, natural_width: f64, words: usize) -> i64 {
    if words < 2 {
        return 0;
    }
    ((container_width - natural_width) / (words - 1) as f64).floor() as i64
}

/// Justify one line.
///
/// The text is trimmed and gets a single trailing space. With fewer than two
/// words that is all; otherwise it is wrapped in a span carrying the word
/// spacing that stretches it to `container_width`.
pub fn justify<E: TextElement + ?Sized>(
    element: &E,
    text: &str,
    container_width: f64,
) -> Result<String, BalanceError> {
    let trimmed = text.trim();
    let words = trimmed.split(' ').count();
    let spaced = format!("{trimmed} ");
    if words < 2 {
        return Ok(spaced);
    }

    let natural = element.measure_fragment(&spaced)?;
    let spacing = word_spacing(container_width, natural, words);
    tracing::trace!(words, natural, spacing, "justify");
    Ok(format!(
        r#"<span style="word-spacing: {spacing}px;" {OWNER_ATTR}="{}">{spaced}</span>"#,
        Ownership::Justify.attr_value()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_sign() {
        assert_eq!(word_spacing(130.0, 90.0, 3), 20);
        assert_eq!(word_spacing(130.0, 84.0, 3), 23);
        assert_eq!(word_spacing(80.0, 90.0, 3), -5);
        assert_eq!(word_spacing(80.0, 91.0, 3), -6);
    }

    #[test]
    fn test_single_word_unchanged() {
        assert_eq!(word_spacing(100.0, 10.0, 1), 0);
    }
}
