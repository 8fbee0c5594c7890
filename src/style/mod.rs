//! # Style Model
//!
//! The handful of CSS properties the balancer reads or temporarily overrides,
//! plus an inline-style map that parses and serializes `style="..."`
//! declarations.
//!
//! This is intentionally not a CSS engine. Values the balancer does not
//! understand are preserved as strings and handed back untouched when the
//! saved styles are restored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A style property the balancer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProperty {
    WhiteSpace,
    Float,
    Display,
    Position,
    LineHeight,
    TextAlign,
    WordSpacing,
    FontSize,
}

impl StyleProperty {
    /// The CSS property name.
    pub fn css_name(&self) -> &'static str {
        match self {
            Self::WhiteSpace => "white-space",
            Self::Float => "float",
            Self::Display => "display",
            Self::Position => "position",
            Self::LineHeight => "line-height",
            Self::TextAlign => "text-align",
            Self::WordSpacing => "word-spacing",
            Self::FontSize => "font-size",
        }
    }

    pub fn from_css_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "white-space" => Some(Self::WhiteSpace),
            "float" => Some(Self::Float),
            "display" => Some(Self::Display),
            "position" => Some(Self::Position),
            "line-height" => Some(Self::LineHeight),
            "text-align" => Some(Self::TextAlign),
            "word-spacing" => Some(Self::WordSpacing),
            "font-size" => Some(Self::FontSize),
            _ => None,
        }
    }
}

/// How white space inside an element is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhiteSpace {
    /// Collapse runs of white space, wrap at soft opportunities.
    #[default]
    Normal,
    /// Collapse runs of white space, never wrap.
    Nowrap,
    /// Preserve white space, wrap at soft opportunities.
    PreWrap,
    /// Preserve white space, never wrap.
    Pre,
}

impl WhiteSpace {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "nowrap" => Some(Self::Nowrap),
            "pre-wrap" => Some(Self::PreWrap),
            "pre" => Some(Self::Pre),
            _ => None,
        }
    }

    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Nowrap => "nowrap",
            Self::PreWrap => "pre-wrap",
            Self::Pre => "pre",
        }
    }

    /// Whether lines may wrap at soft break opportunities.
    pub fn wraps(&self) -> bool {
        matches!(self, Self::Normal | Self::PreWrap)
    }

    /// Whether runs of white space collapse to a single space.
    pub fn collapses(&self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap)
    }
}

/// Outer display type. Only the distinction between inline and block
/// formatting matters for measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
}

impl Display {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "block" => Some(Self::Block),
            "inline" => Some(Self::Inline),
            "inline-block" => Some(Self::InlineBlock),
            _ => None,
        }
    }
}

/// Horizontal alignment of lines inside the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

impl TextAlign {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Self::Left),
            "right" | "end" => Some(Self::Right),
            "center" => Some(Self::Center),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// Line height: the UA default or a multiplier of the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineHeight {
    Normal,
    Multiple(f64),
    Px(f64),
}

impl LineHeight {
    /// The UA's `normal` line height as a multiple of font size.
    pub const NORMAL_FACTOR: f64 = 1.2;

    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim().to_ascii_lowercase();
        if v == "normal" {
            return Some(Self::Normal);
        }
        if let Some(px) = parse_px(&v) {
            return Some(Self::Px(px));
        }
        v.parse::<f64>().ok().map(Self::Multiple)
    }

    /// Resolve to pixels for a given font size.
    pub fn resolve(&self, font_size: f64) -> f64 {
        match self {
            Self::Normal => font_size * Self::NORMAL_FACTOR,
            Self::Multiple(m) => font_size * m,
            Self::Px(px) => *px,
        }
    }
}

/// Parse a `12px` / `-3px` / `0` length.
pub fn parse_px(value: &str) -> Option<f64> {
    let v = value.trim();
    if v == "0" {
        return Some(0.0);
    }
    v.strip_suffix("px")?.trim().parse::<f64>().ok()
}

/// An ordered map of inline style declarations (`style="..."`).
///
/// Keys are lowercase property names; values are kept verbatim so unknown
/// properties survive a parse/serialize cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineStyle {
    declarations: BTreeMap<String, String>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute value.
    pub fn parse(attr: &str) -> Self {
        let mut declarations = BTreeMap::new();
        for decl in attr.split(';') {
            let Some((name, value)) = decl.split_once(':') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }
            declarations.insert(name, value.to_string());
        }
        Self { declarations }
    }

    pub fn get(&self, property: StyleProperty) -> Option<&str> {
        self.declarations
            .get(property.css_name())
            .map(String::as_str)
    }

    /// Set or clear a property. `None` and the empty string both remove it,
    /// which is what assigning `""` to an element style does.
    pub fn set(&mut self, property: StyleProperty, value: Option<&str>) {
        match value {
            Some(v) if !v.trim().is_empty() => {
                self.declarations
                    .insert(property.css_name().to_string(), v.trim().to_string());
            }
            _ => {
                self.declarations.remove(property.css_name());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn white_space(&self) -> Option<WhiteSpace> {
        self.get(StyleProperty::WhiteSpace).and_then(WhiteSpace::parse)
    }

    pub fn word_spacing(&self) -> Option<f64> {
        self.get(StyleProperty::WordSpacing).and_then(parse_px)
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.declarations {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}: {};", name, value)?;
            first = false;
        }
        Ok(())
    }
}

/// The inline styles the balancer overrides during a pass, captured so they
/// can be put back exactly as they were.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedStyles {
    pub white_space: Option<String>,
    pub float: Option<String>,
    pub display: Option<String>,
    pub position: Option<String>,
    pub line_height: Option<String>,
}

impl SavedStyles {
    pub const PROPERTIES: [StyleProperty; 5] = [
        StyleProperty::WhiteSpace,
        StyleProperty::Float,
        StyleProperty::Display,
        StyleProperty::Position,
        StyleProperty::LineHeight,
    ];

    /// Capture the current inline values through an accessor.
    pub fn capture(mut read: impl FnMut(StyleProperty) -> Option<String>) -> Self {
        Self {
            white_space: read(StyleProperty::WhiteSpace),
            float: read(StyleProperty::Float),
            display: read(StyleProperty::Display),
            position: read(StyleProperty::Position),
            line_height: read(StyleProperty::LineHeight),
        }
    }

    fn slot(&self, property: StyleProperty) -> Option<&String> {
        match property {
            StyleProperty::WhiteSpace => self.white_space.as_ref(),
            StyleProperty::Float => self.float.as_ref(),
            StyleProperty::Display => self.display.as_ref(),
            StyleProperty::Position => self.position.as_ref(),
            StyleProperty::LineHeight => self.line_height.as_ref(),
            _ => None,
        }
    }

    /// The saved value for a property, if it was set.
    pub fn get(&self, property: StyleProperty) -> Option<&str> {
        self.slot(property).map(String::as_str)
    }
}
