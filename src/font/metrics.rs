//! Advance widths for the built-in font families.
//!
//! Widths are in 1/1000 em, taken from the Adobe Core 14 AFM files for the
//! printable ASCII range. Characters outside that range fall back to a few
//! explicit entries and then to the width of `n`.

/// Width table for one built-in face.
#[derive(Debug)]
pub struct StandardFontMetrics {
    /// Widths for U+0020..=U+007E.
    ascii: [u16; 95],
    en_dash: u16,
    em_dash: u16,
    default_width: u16,
}

impl StandardFontMetrics {
    /// Advance width of a character in 1/1000 em.
    pub fn char_units(&self, ch: char) -> u16 {
        let code = ch as u32;
        if (0x20..=0x7E).contains(&code) {
            return self.ascii[(code - 0x20) as usize];
        }
        match ch {
            // No-break space renders like a space.
            '\u{00A0}' => self.ascii[0],
            // Soft hyphen is invisible unless a line breaks at it.
            '\u{00AD}' => 0,
            // En dash / em dash.
            '\u{2013}' => self.en_dash,
            '\u{2014}' | '\u{2026}' => self.em_dash,
            '\u{2018}' | '\u{2019}' => self.ascii[('\'' as u32 - 0x20) as usize],
            '\u{201C}' | '\u{201D}' => self.ascii[('"' as u32 - 0x20) as usize],
            _ => self.default_width,
        }
    }

    /// Advance width of a character in points/pixels at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.char_units(ch) as f64 / 1000.0 * font_size
    }

    /// Width of a string with optional letter spacing after every char.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }
}

#[rustfmt::skip]
pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    ascii: [
        // space ! " # $ % & ' ( ) * + , - . /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // : ; < = > ? @
        278, 278, 584, 584, 584, 556, 1015,
        // A-Z
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [ \ ] ^ _ `
        278, 278, 278, 469, 556, 333,
        // a-z
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // { | } ~
        334, 260, 334, 584,
    ],
    en_dash: 556,
    em_dash: 1000,
    default_width: 556,
};

#[rustfmt::skip]
pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    ascii: [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        333, 333, 584, 584, 584, 611, 975,
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        333, 278, 333, 584, 556, 333,
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        389, 280, 389, 584,
    ],
    en_dash: 556,
    em_dash: 1000,
    default_width: 611,
};

/// Courier is monospaced: every glyph is 600 units.
pub static COURIER: StandardFontMetrics = StandardFontMetrics {
    ascii: [600; 95],
    en_dash: 600,
    em_dash: 600,
    default_width: 600,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_space() {
        assert!((HELVETICA.char_width(' ', 12.0) - 3.336).abs() < 1e-9);
    }

    #[test]
    fn test_courier_is_monospaced() {
        assert_eq!(COURIER.char_units('i'), COURIER.char_units('W'));
        assert!((COURIER.measure_string("abc", 10.0, 0.0) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_soft_hyphen_is_zero_width() {
        assert_eq!(HELVETICA.char_units('\u{00AD}'), 0);
        assert_eq!(COURIER.char_units('\u{00AD}'), 0);
    }

    #[test]
    fn test_nbsp_matches_space() {
        assert_eq!(HELVETICA.char_units('\u{00A0}'), HELVETICA.char_units(' '));
    }
}
