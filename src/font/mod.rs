//! # Font Metrics
//!
//! Character advance widths for the reference layout.
//!
//! The built-in families (Helvetica and Courier) need no font data. Custom
//! TrueType/OpenType faces are parsed with ttf-parser and registered under a
//! family name; lookups that miss fall back to Helvetica.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::error::BalanceError;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A font registry that maps font family + weight + style to font data.
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

#[derive(Debug, Clone)]
pub enum FontData {
    Standard(StandardFont),
    Custom(CustomFontMetrics),
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
}

impl CustomFontMetrics {
    /// Get the advance width of a character at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        if ch == '\u{00AD}' {
            return 0.0;
        }
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Result<Self, BalanceError> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| BalanceError::Font(format!("cannot parse font: {e}")))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        // The balancer only measures text, so the BMP is plenty.
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == 'n' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
        })
    }
}

static HELVETICA_FALLBACK: FontData = FontData::Standard(StandardFont::Helvetica);

/// The built-in faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
}

impl StandardFont {
    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
            Self::Courier => &metrics::COURIER,
        }
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();

        // Oblique faces share the upright advance widths.
        let standard_mappings = vec![
            (("Helvetica", 400, false), StandardFont::Helvetica),
            (("Helvetica", 700, false), StandardFont::HelveticaBold),
            (("Helvetica", 400, true), StandardFont::Helvetica),
            (("Helvetica", 700, true), StandardFont::HelveticaBold),
            (("Courier", 400, false), StandardFont::Courier),
            (("Courier", 700, false), StandardFont::Courier),
            (("Courier", 400, true), StandardFont::Courier),
            (("Courier", 700, true), StandardFont::Courier),
        ];

        for ((family, weight, italic), font) in standard_mappings {
            fonts.insert(
                FontKey {
                    family: family.to_string(),
                    weight,
                    italic,
                },
                FontData::Standard(font),
            );
        }

        Self { fonts }
    }

    /// Look up a font, falling back to Helvetica if not found.
    pub fn resolve(&self, family: &str, weight: u32, italic: bool) -> &FontData {
        let key = FontKey {
            family: family.to_string(),
            weight,
            italic,
        };
        if let Some(font) = self.fonts.get(&key) {
            return font;
        }

        // Try with normalized weight (snap to 400 or 700)
        let snapped_weight = if weight >= 600 { 700 } else { 400 };
        let key = FontKey {
            family: family.to_string(),
            weight: snapped_weight,
            italic,
        };
        if let Some(font) = self.fonts.get(&key) {
            return font;
        }

        let key = FontKey {
            family: "Helvetica".to_string(),
            weight: snapped_weight,
            italic,
        };
        self.fonts.get(&key).unwrap_or(&HELVETICA_FALLBACK)
    }

    /// Register a custom font from raw TrueType/OpenType bytes.
    pub fn register(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        data: &[u8],
    ) -> Result<(), BalanceError> {
        let metrics = CustomFontMetrics::from_font_data(data)?;
        self.fonts.insert(
            FontKey {
                family: family.to_string(),
                weight,
                italic,
            },
            FontData::Custom(metrics),
        );
        Ok(())
    }
}

/// A custom font supplied with page input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Font family name (e.g. "Inter", "Roboto").
    pub family: String,
    /// Base64-encoded font data, or a data URI (e.g. "data:font/ttf;base64,...").
    pub src: String,
    /// Font weight (100-900). Defaults to 400.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Whether this is an italic variant.
    #[serde(default)]
    pub italic: bool,
}

fn default_weight() -> u32 {
    400
}

impl FontEntry {
    /// Decode the base64 payload, accepting a data URI prefix.
    pub fn decode(&self) -> Result<Vec<u8>, BalanceError> {
        let payload = match self.src.split_once(";base64,") {
            Some((_, b64)) => b64,
            None => self.src.as_str(),
        };
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| BalanceError::Font(format!("{}: invalid base64: {e}", self.family)))
    }
}

/// Shared font context used by the reference layout.
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Get the advance width of a single character.
    pub fn char_width(
        &self,
        ch: char,
        family: &str,
        weight: u32,
        italic: bool,
        font_size: f64,
    ) -> f64 {
        match self.registry.resolve(family, weight, italic) {
            FontData::Standard(std_font) => std_font.metrics().char_width(ch, font_size),
            FontData::Custom(m) => m.char_width(ch, font_size),
        }
    }

    /// Measure the width of a string.
    pub fn measure_string(
        &self,
        text: &str,
        family: &str,
        weight: u32,
        italic: bool,
        font_size: f64,
    ) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, family, weight, italic, font_size))
            .sum()
    }

    /// Register every font entry, decoding its payload.
    pub fn register_entries(&mut self, entries: &[FontEntry]) -> Result<(), BalanceError> {
        for entry in entries {
            let data = entry.decode()?;
            self.registry
                .register(&entry.family, entry.weight, entry.italic, &data)?;
        }
        Ok(())
    }

    /// Access the underlying font registry mutably.
    pub fn registry_mut(&mut self) -> &mut FontRegistry {
        &mut self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::new();
        let w = ctx.char_width(' ', "Helvetica", 400, false, 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_font_context_bold_wider() {
        let ctx = FontContext::new();
        let regular = ctx.measure_string("bold", "Helvetica", 400, false, 12.0);
        let bold = ctx.measure_string("bold", "Helvetica", 700, false, 12.0);
        assert!(bold > regular, "Bold text should be wider");
    }

    #[test]
    fn test_font_context_fallback() {
        let ctx = FontContext::new();
        let w1 = ctx.char_width('A', "Helvetica", 400, false, 12.0);
        let w2 = ctx.char_width('A', "UnknownFont", 400, false, 12.0);
        assert!((w1 - w2).abs() < 0.001);
    }

    #[test]
    fn test_font_context_weight_resolution() {
        let ctx = FontContext::new();
        let w700 = ctx.char_width('A', "Helvetica", 700, false, 12.0);
        let w800 = ctx.char_width('A', "Helvetica", 800, false, 12.0);
        assert!((w700 - w800).abs() < 0.001);
    }

    #[test]
    fn test_courier_fixed_advance() {
        let ctx = FontContext::new();
        let w = ctx.measure_string("The quick", "Courier", 400, false, 10.0);
        assert!((w - 54.0).abs() < 1e-9);
    }

    #[test]
    fn test_font_entry_rejects_bad_base64() {
        let entry = FontEntry {
            family: "Broken".to_string(),
            src: "data:font/ttf;base64,@@@".to_string(),
            weight: 400,
            italic: false,
        };
        assert!(matches!(entry.decode(), Err(BalanceError::Font(_))));
    }

    #[test]
    fn test_register_rejects_garbage_font() {
        let mut registry = FontRegistry::new();
        let err = registry.register("Garbage", 400, false, b"not a font");
        assert!(err.is_err());
    }
}
