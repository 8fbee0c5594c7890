//! # Reference Host
//!
//! A page of text blocks laid out with the crate's own font metrics and
//! wrapping layout. It implements [`Host`] and [`TextElement`] so balancing
//! can run end-to-end without a browser, and it is what the CLI drives.
//!
//! Each block is a fixed-width container (`width` is its content width) with
//! a font, a stylesheet (the cascaded rules, treated as computed style), an
//! inline style, and inner markup. Measurements follow browser conventions:
//! block boxes take the full width, inline or floated boxes shrink to their
//! content, sizes are rounded to whole pixels like `offsetWidth`.

use crate::balance::{PassOutcome, SkipReason};
use crate::config::BalanceConfig;
use crate::error::BalanceError;
use crate::font::{FontContext, FontEntry};
use crate::host::{BoxSize, ElementId, Host, TextElement};
use crate::markup;
use crate::session::BatchReport;
use crate::style::{parse_px, Display, InlineStyle, LineHeight, StyleProperty, WhiteSpace};
use crate::text::{collect_inline, InlineItem, LineBox, TextLayout, TextStyle};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Font size used to measure the no-break space glyph box.
const SPACE_PROBE_FONT_SIZE: f64 = 2000.0;

/// Page input as read from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    #[serde(default)]
    pub config: BalanceConfig,
    #[serde(default)]
    pub fonts: Vec<FontEntry>,
    /// Pretend the host balances text natively.
    #[serde(default)]
    pub native_text_wrap: bool,
    /// Blocks to balance. Without one, blocks with the `balance-text` class
    /// are picked up the way the polyfill does it.
    #[serde(default)]
    pub selector: Option<String>,
    pub blocks: Vec<BlockSpec>,
}

/// One text block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSpec {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    /// Content width in pixels.
    pub width: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_weight")]
    pub font_weight: u32,
    #[serde(default)]
    pub italic: bool,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Cascaded stylesheet declarations.
    #[serde(default)]
    pub style: InlineStyle,
    /// The element's own `style` attribute.
    #[serde(default)]
    pub inline_style: InlineStyle,
    pub markup: String,
}

fn default_tag() -> String {
    "p".to_string()
}

fn default_font_family() -> String {
    "Helvetica".to_string()
}

fn default_font_weight() -> u32 {
    400
}

fn default_font_size() -> f64 {
    16.0
}

impl BlockSpec {
    pub fn new(width: f64, markup: &str) -> Self {
        Self {
            id: None,
            tag: default_tag(),
            classes: Vec::new(),
            width,
            font_family: default_font_family(),
            font_weight: default_font_weight(),
            italic: false,
            font_size: default_font_size(),
            style: InlineStyle::new(),
            inline_style: InlineStyle::new(),
            markup: markup.to_string(),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_ascii_lowercase();
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn font(mut self, family: &str, size: f64) -> Self {
        self.font_family = family.to_string();
        self.font_size = size;
        self
    }

    /// Add a stylesheet declaration.
    pub fn style(mut self, property: StyleProperty, value: &str) -> Self {
        self.style.set(property, Some(value));
        self
    }

    /// Add an inline declaration.
    pub fn inline(mut self, property: StyleProperty, value: &str) -> Self {
        self.inline_style.set(property, Some(value));
        self
    }
}

/// A text block on a [`Page`].
pub struct Block {
    id: Option<String>,
    tag: String,
    classes: Vec<String>,
    width: f64,
    font: TextStyle,
    stylesheet: InlineStyle,
    inline: InlineStyle,
    markup: String,
    fonts: Rc<FontContext>,
}

impl Block {
    fn new(spec: BlockSpec, fonts: Rc<FontContext>) -> Self {
        Self {
            id: spec.id,
            tag: spec.tag.to_ascii_lowercase(),
            classes: spec.classes,
            width: spec.width,
            font: TextStyle {
                font_family: spec.font_family,
                font_weight: spec.font_weight,
                italic: spec.italic,
                font_size: spec.font_size,
            },
            stylesheet: spec.style,
            inline: spec.inline_style,
            markup: markup::parse(&spec.markup).to_markup(),
            fonts,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn inline(&self) -> &InlineStyle {
        &self.inline
    }

    /// Resize the container, as a window resize would.
    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    /// Widths of the lines as currently rendered in the container.
    pub fn rendered_lines(&self) -> Vec<f64> {
        self.layout(&self.markup, self.wrap_width())
            .iter()
            .map(|l| l.width.round())
            .collect()
    }

    fn computed(&self, property: StyleProperty) -> String {
        if let Some(v) = self.inline.get(property).or_else(|| self.stylesheet.get(property)) {
            return v.to_string();
        }
        match property {
            StyleProperty::WhiteSpace => "normal".to_string(),
            StyleProperty::Float => "none".to_string(),
            StyleProperty::Display => "block".to_string(),
            StyleProperty::Position => "static".to_string(),
            StyleProperty::LineHeight => "normal".to_string(),
            StyleProperty::TextAlign => "left".to_string(),
            StyleProperty::WordSpacing => "0px".to_string(),
            StyleProperty::FontSize => format!("{}px", self.font.font_size),
        }
    }

    fn white_space(&self) -> WhiteSpace {
        WhiteSpace::parse(&self.computed(StyleProperty::WhiteSpace)).unwrap_or_default()
    }

    fn text_style(&self) -> TextStyle {
        let font_size = parse_px(&self.computed(StyleProperty::FontSize))
            .unwrap_or(self.font.font_size);
        TextStyle {
            font_size,
            ..self.font.clone()
        }
    }

    fn line_height(&self) -> f64 {
        let style = self.text_style();
        LineHeight::parse(&self.computed(StyleProperty::LineHeight))
            .unwrap_or(LineHeight::Normal)
            .resolve(style.font_size)
    }

    /// Block boxes fill the container; anything else shrinks to fit.
    fn shrinks_to_fit(&self) -> bool {
        let display = Display::parse(&self.computed(StyleProperty::Display)).unwrap_or_default();
        let floated = self.computed(StyleProperty::Float) != "none";
        let out_of_flow = matches!(
            self.computed(StyleProperty::Position).as_str(),
            "absolute" | "fixed"
        );
        display != Display::Block || floated || out_of_flow
    }

    fn wrap_width(&self) -> Option<f64> {
        self.white_space().wraps().then_some(self.width)
    }

    fn items(&self, markup: &str) -> Vec<InlineItem> {
        collect_inline(
            &markup::parse(markup),
            &self.fonts,
            &self.text_style(),
            self.white_space(),
        )
    }

    fn layout(&self, markup: &str, max_width: Option<f64>) -> Vec<LineBox> {
        let items = self.items(markup);
        if items.is_empty() {
            return Vec::new();
        }
        let hyphen = self.text_style().char_width(&self.fonts, '-');
        TextLayout::new().break_into_lines(&items, max_width, hyphen)
    }

    fn check_font(&self) -> Result<TextStyle, BalanceError> {
        let style = self.text_style();
        if !(style.font_size > 0.0 && style.font_size.is_finite()) {
            return Err(BalanceError::measurement(format!(
                "invalid font size {}",
                style.font_size
            )));
        }
        Ok(style)
    }
}

impl TextElement for Block {
    fn inner_markup(&self) -> String {
        self.markup.clone()
    }

    fn set_inner_markup(&mut self, markup: &str) {
        self.markup = markup::parse(markup).to_markup();
    }

    fn inline_style(&self, property: StyleProperty) -> Option<String> {
        self.inline.get(property).map(str::to_string)
    }

    fn set_inline_style(&mut self, property: StyleProperty, value: Option<&str>) {
        self.inline.set(property, value);
    }

    fn computed_style(&self, property: StyleProperty) -> Option<String> {
        Some(self.computed(property))
    }

    fn measure(&self) -> Result<BoxSize, BalanceError> {
        self.check_font()?;
        let lines = self.layout(&self.markup, self.wrap_width());
        let content_width = lines.iter().map(|l| l.width).fold(0.0, f64::max);
        let width = if self.shrinks_to_fit() {
            content_width
        } else {
            self.width
        };
        let height = lines.len() as f64 * self.line_height();
        let size = BoxSize {
            width: width.round(),
            height: height.round(),
        };
        tracing::trace!(width = size.width, height = size.height, "measure");
        Ok(size)
    }

    fn measure_fragment(&self, markup: &str) -> Result<f64, BalanceError> {
        self.check_font()?;
        let width = self
            .layout(markup, None)
            .iter()
            .map(|l| l.width)
            .fold(0.0, f64::max);
        Ok(width.round())
    }

    fn space_aspect_ratio(&self) -> Result<f64, BalanceError> {
        let style = TextStyle {
            font_size: SPACE_PROBE_FONT_SIZE,
            ..self.check_font()?
        };
        let width = style.char_width(&self.fonts, '\u{00A0}');
        if width <= 0.0 {
            return Err(BalanceError::measurement("no-break space has no width"));
        }
        Ok(LineHeight::Normal.resolve(SPACE_PROBE_FONT_SIZE) / width)
    }
}

/// `tag`, `.class`, `#id`, `*` and compounds such as `p.lead`.
#[derive(Debug, Default, PartialEq)]
struct SimpleSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl SimpleSelector {
    fn parse(src: &str) -> Option<Self> {
        let src = src.trim();
        if src.is_empty()
            || src
                .chars()
                .any(|c| !(c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '#' | '*')))
        {
            return None;
        }

        let mut sel = Self::default();
        let mut kind = None;
        let mut current = String::new();
        for ch in src.chars().chain(std::iter::once('.')) {
            if ch != '.' && ch != '#' {
                current.push(ch);
                continue;
            }
            match kind {
                None if current == "*" || current.is_empty() => {}
                None => sel.tag = Some(current.to_ascii_lowercase()),
                Some('.') if !current.is_empty() => sel.classes.push(current.clone()),
                Some('#') if !current.is_empty() => sel.id = Some(current.clone()),
                _ => return None,
            }
            kind = Some(ch);
            current.clear();
        }
        Some(sel)
    }

    fn matches(&self, block: &Block) -> bool {
        self.tag.as_ref().map_or(true, |t| *t == block.tag)
            && self.id.as_ref().map_or(true, |id| block.id.as_ref() == Some(id))
            && self.classes.iter().all(|c| block.classes.contains(c))
    }
}

/// Reference host: an ordered list of blocks sharing one font context.
pub struct Page {
    blocks: Vec<Block>,
    fonts: Rc<FontContext>,
    native_text_wrap: bool,
    config: BalanceConfig,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        Self::with_fonts(FontContext::new())
    }

    pub fn with_fonts(fonts: FontContext) -> Self {
        Self {
            blocks: Vec::new(),
            fonts: Rc::new(fonts),
            native_text_wrap: false,
            config: BalanceConfig::default(),
        }
    }

    pub fn from_spec(spec: PageSpec) -> Result<Self, BalanceError> {
        let mut fonts = FontContext::new();
        fonts.register_entries(&spec.fonts)?;
        let mut page = Self::with_fonts(fonts);
        page.native_text_wrap = spec.native_text_wrap;
        page.config = spec.config;
        for block in spec.blocks {
            page.push(block);
        }
        Ok(page)
    }

    pub fn from_json(json: &str) -> Result<Self, BalanceError> {
        let spec: PageSpec = serde_json::from_str(json)?;
        Self::from_spec(spec)
    }

    pub fn push(&mut self, spec: BlockSpec) -> ElementId {
        self.blocks.push(Block::new(spec, Rc::clone(&self.fonts)));
        ElementId(self.blocks.len() - 1)
    }

    pub fn set_native_text_wrap(&mut self, native: bool) {
        self.native_text_wrap = native;
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: ElementId) -> Option<&Block> {
        self.blocks.get(id.0)
    }

    pub fn block_mut(&mut self, id: ElementId) -> Option<&mut Block> {
        self.blocks.get_mut(id.0)
    }

    /// Summarize a batch for output.
    pub fn output(&self, report: &BatchReport) -> PageOutput {
        let blocks = self
            .blocks
            .iter()
            .enumerate()
            .map(|(i, block)| {
                let outcome = match report.get(ElementId(i)) {
                    None => BlockOutcome::Untouched,
                    Some(Ok(PassOutcome::Balanced { lines })) => {
                        BlockOutcome::Balanced { lines: lines.len() }
                    }
                    Some(Ok(PassOutcome::Skipped(reason))) => BlockOutcome::Skipped { reason: *reason },
                    Some(Err(e)) => BlockOutcome::Failed {
                        error: e.to_string(),
                    },
                };
                BlockOutput {
                    id: block.id.clone(),
                    markup: block.markup.clone(),
                    outcome,
                }
            })
            .collect();
        PageOutput { blocks }
    }
}

impl Host for Page {
    type Element = Block;

    fn select(&self, selector: &str) -> Vec<ElementId> {
        let selectors: Vec<SimpleSelector> = selector
            .split(',')
            .filter_map(|s| {
                let parsed = SimpleSelector::parse(s);
                if parsed.is_none() {
                    tracing::warn!(selector = s.trim(), "unsupported selector ignored");
                }
                parsed
            })
            .collect();
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| selectors.iter().any(|s| s.matches(b)))
            .map(|(i, _)| ElementId(i))
            .collect()
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Block> {
        self.blocks.get_mut(id.0)
    }

    fn supports_native_balance(&self) -> bool {
        self.native_text_wrap
    }
}

/// Result document written by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct PageOutput {
    pub blocks: Vec<BlockOutput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockOutput {
    pub id: Option<String>,
    pub markup: String,
    pub outcome: BlockOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BlockOutcome {
    Untouched,
    Balanced { lines: usize },
    Skipped { reason: SkipReason },
    Failed { error: String },
}
