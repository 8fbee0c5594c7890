//! # Text Layout
//!
//! Inline content → positioned lines, the way a browser would wrap it.
//!
//! This is the measuring side of the reference host: the balancer never sees
//! it directly, it only asks for widths and heights. It turns a parsed
//! fragment into a flat run of cells (one per rendered character, with its
//! advance and whether its context allows wrapping), then greedily fills
//! lines using UAX#14 break opportunities.

use crate::font::FontContext;
use crate::markup::{Fragment, Node};
use crate::style::WhiteSpace;
use unicode_linebreak::{linebreaks, BreakOpportunity};

const SOFT_HYPHEN: char = '\u{00AD}';

/// Font selection for a block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_weight: u32,
    pub italic: bool,
    pub font_size: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_weight: 400,
            italic: false,
            font_size: 16.0,
        }
    }
}

impl TextStyle {
    pub fn char_width(&self, fonts: &FontContext, ch: char) -> f64 {
        fonts.char_width(
            ch,
            &self.font_family,
            self.font_weight,
            self.italic,
            self.font_size,
        )
    }
}

/// One rendered character.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub advance: f64,
    /// The white-space mode in effect allows a soft wrap here.
    pub wrap: bool,
    /// A collapsible space: dropped at the start of a line.
    pub collapsible: bool,
}

impl Cell {
    /// Spaces hang past the end of a line and do not count toward its width.
    fn hangs(&self) -> bool {
        self.ch == ' '
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InlineItem {
    Cell(Cell),
    /// `<br>` or a preserved newline.
    ForcedBreak,
}

/// A line after wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    /// Cell range `[start, end)` within its segment.
    pub start: usize,
    pub end: usize,
    /// Width excluding hanging trailing spaces, including a rendered hyphen.
    pub width: f64,
    /// The line ended at a soft hyphen, which is drawn as `-`.
    pub hyphenated: bool,
}

#[derive(Clone, Copy)]
struct InheritedContext {
    white_space: WhiteSpace,
    word_spacing: f64,
}

/// Flatten a fragment into inline items.
pub fn collect_inline(
    fragment: &Fragment,
    fonts: &FontContext,
    style: &TextStyle,
    white_space: WhiteSpace,
) -> Vec<InlineItem> {
    let mut items = Vec::new();
    let ctx = InheritedContext {
        white_space,
        word_spacing: 0.0,
    };
    collect_nodes(&fragment.nodes, fonts, style, ctx, &mut items);
    items
}

fn collect_nodes(
    nodes: &[Node],
    fonts: &FontContext,
    style: &TextStyle,
    ctx: InheritedContext,
    items: &mut Vec<InlineItem>,
) {
    for node in nodes {
        match node {
            Node::Text(text) => collect_text(text, fonts, style, ctx, items),
            Node::Element(el) if el.name == "br" => items.push(InlineItem::ForcedBreak),
            Node::Element(el) => {
                let inline = el.style();
                let child_ctx = InheritedContext {
                    white_space: inline.white_space().unwrap_or(ctx.white_space),
                    word_spacing: inline.word_spacing().unwrap_or(ctx.word_spacing),
                };
                collect_nodes(&el.children, fonts, style, child_ctx, items);
            }
            Node::Comment(_) | Node::ProcessingInstruction(_) => {}
        }
    }
}

fn collect_text(
    text: &str,
    fonts: &FontContext,
    style: &TextStyle,
    ctx: InheritedContext,
    items: &mut Vec<InlineItem>,
) {
    let collapses = ctx.white_space.collapses();
    let wrap = ctx.white_space.wraps();
    let space_advance = style.char_width(fonts, ' ') + ctx.word_spacing;

    for ch in text.chars() {
        let is_space = matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{000C}');
        if is_space {
            if ch == '\n' && !collapses {
                items.push(InlineItem::ForcedBreak);
                continue;
            }
            if collapses {
                // Collapse across element boundaries too.
                if let Some(InlineItem::Cell(prev)) = items.last() {
                    if prev.collapsible {
                        continue;
                    }
                }
            }
            items.push(InlineItem::Cell(Cell {
                ch: ' ',
                advance: space_advance,
                wrap,
                collapsible: collapses,
            }));
            continue;
        }
        items.push(InlineItem::Cell(Cell {
            ch,
            advance: style.char_width(fonts, ch),
            wrap,
            collapsible: false,
        }));
    }
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Returns a vec of length `text.chars().count()`. Each entry is the break
/// opportunity *before* that character position (i.e. "can we break before
/// char[i]?"). Index 0 is always `None` (no break before the first char).
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields (byte_offset, opportunity) where byte_offset is the
    // position AFTER the break, i.e. the start of the next segment.
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
            map[byte_idx] = char_idx;
        }
        map[text.len()] = char_count;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break inline items into lines.
    ///
    /// `max_width: None` lays out without soft wrapping (forced breaks still
    /// apply). Each forced break starts a new segment; a trailing `<br>` does
    /// not produce an extra empty line.
    pub fn break_into_lines(
        &self,
        items: &[InlineItem],
        max_width: Option<f64>,
        hyphen_advance: f64,
    ) -> Vec<LineBox> {
        let mut segments: Vec<Vec<Cell>> = vec![Vec::new()];
        for item in items {
            match item {
                InlineItem::Cell(cell) => {
                    if let Some(seg) = segments.last_mut() {
                        seg.push(cell.clone());
                    }
                }
                InlineItem::ForcedBreak => segments.push(Vec::new()),
            }
        }
        if segments.len() > 1 && segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }

        segments
            .iter()
            .flat_map(|cells| self.wrap_segment(cells, max_width, hyphen_advance))
            .collect()
    }

    /// Greedy fill of one forced-break-free segment.
    fn wrap_segment(
        &self,
        cells: &[Cell],
        max_width: Option<f64>,
        hyphen_advance: f64,
    ) -> Vec<LineBox> {
        let n = cells.len();
        let text: String = cells.iter().map(|c| c.ch).collect();
        let opps = compute_break_opportunities(&text);
        let allowed = |i: usize| i > 0 && opps[i].is_some() && cells[i - 1].wrap;

        let mut lines = Vec::new();
        let mut start = skip_collapsible(cells, 0);
        let mut last_break: Option<usize> = None;
        let mut width = 0.0;
        let mut hanging = 0.0;
        let mut i = start;

        while i < n {
            if i > start && allowed(i) {
                last_break = Some(i);
            }
            let cell = &cells[i];
            if cell.hangs() {
                hanging += cell.advance;
                i += 1;
                continue;
            }

            let next = width + hanging + cell.advance;
            let overflows = max_width.is_some_and(|max| next > max + 1e-9);
            if overflows && i > start {
                if let Some(b) = last_break.filter(|b| *b > start) {
                    lines.push(make_line(cells, start, b, hyphen_advance));
                    start = skip_collapsible(cells, b);
                    i = start;
                    width = 0.0;
                    hanging = 0.0;
                    last_break = None;
                    continue;
                }
                // No break point on this line: let it overflow.
            }

            width = next;
            hanging = 0.0;
            i += 1;
        }

        lines.push(make_line(cells, start, n, hyphen_advance));
        lines
    }
}

fn skip_collapsible(cells: &[Cell], mut i: usize) -> usize {
    while i < cells.len() && cells[i].collapsible {
        i += 1;
    }
    i
}

fn make_line(cells: &[Cell], start: usize, end: usize, hyphen_advance: f64) -> LineBox {
    let end = end.max(start);
    let slice = &cells[start..end];
    let visible = slice
        .iter()
        .rposition(|c| !c.hangs())
        .map(|p| p + 1)
        .unwrap_or(0);
    let mut width: f64 = slice[..visible].iter().map(|c| c.advance).sum();
    let hyphenated = end < cells.len() && visible > 0 && slice[visible - 1].ch == SOFT_HYPHEN;
    if hyphenated {
        width += hyphen_advance;
    }
    LineBox {
        start,
        end,
        width,
        hyphenated,
    }
}
