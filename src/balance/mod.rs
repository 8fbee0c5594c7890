//! # Line Balancing
//!
//! Rewrites an element's content so that its lines come out roughly the same
//! length instead of leaving a short orphan on the last line.
//!
//! One pass over one element:
//!
//! 1. strip markup left by a previous pass
//! 2. measure the container, then the content forced onto a single line
//! 3. while more than one line remains: find the break whose prefix is
//!    closest to the remaining width divided by the remaining lines, emit
//!    that line with a break marker (or a justification span), and continue
//!    with the rest of the buffer
//! 4. write the result and restore the inline styles that were overridden
//!
//! The buffer is the element's serialized inner markup. Every width comes
//! from the host's [`TextElement`] oracle after writing a candidate prefix
//! into the element, so nested markup, entities and custom fonts are all
//! measured the way they will render.

pub mod breaks;
pub mod justify;
pub mod materialize;
pub mod nowrap;
pub mod search;

pub use breaks::BreakOpportunities;
pub use materialize::Line;
pub use nowrap::NoWrapRange;
pub use search::{Direction, WsProbe};

use crate::config::BalanceConfig;
use crate::error::BalanceError;
use crate::host::TextElement;
use crate::markup::strip_generated;
use crate::style::{SavedStyles, StyleProperty, TextAlign, WhiteSpace};
use serde::Serialize;

/// `Math.round` semantics: halves round up, also for negatives.
pub(crate) fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Sizes captured at the start of a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerMetrics {
    pub width: f64,
    pub height: f64,
    pub unwrapped_width: f64,
    pub unwrapped_height: f64,
    /// Expected trailing space trimmed per line.
    pub space_width: f64,
}

impl ContainerMetrics {
    /// Number of lines the content wraps to in the container.
    pub fn line_count(&self) -> usize {
        round_half_up(self.height / self.unwrapped_height).max(0.0) as usize
    }

    /// Target width for the next line.
    pub fn desired_width(&self, unwrapped_width: f64, remaining_lines: usize) -> f64 {
        round_half_up((unwrapped_width + self.space_width) / remaining_lines as f64 - self.space_width)
    }
}

/// Why a pass left the content as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    ZeroWidthContainer,
    FitsOnOneLine,
    OversizedInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Balanced { lines: Vec<Line> },
    Skipped(SkipReason),
}

impl PassOutcome {
    pub fn line_count(&self) -> usize {
        match self {
            PassOutcome::Balanced { lines } => lines.len(),
            PassOutcome::Skipped(_) => 0,
        }
    }
}

/// Runs balancing passes on single elements.
#[derive(Debug, Clone, Default)]
pub struct Balancer {
    config: BalanceConfig,
}

impl Balancer {
    pub fn new(config: BalanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Balance one element in place.
    ///
    /// On error the element gets its stripped original markup back, so no
    /// partial output survives. Inline styles are restored either way.
    pub fn balance<E: TextElement + ?Sized>(
        &self,
        element: &mut E,
    ) -> Result<PassOutcome, BalanceError> {
        let mut content = element.content();
        let stripped = strip_generated(&mut content.nodes);
        if stripped > 0 {
            tracing::debug!(stripped, "removed markup from previous pass");
        }
        let original = content.to_markup();
        element.set_inner_markup(&original);

        let saved = SavedStyles::capture(|p| element.inline_style(p));
        let result = self.run(element, &original, &saved);
        if result.is_err() {
            element.set_inner_markup(&original);
        }
        for property in SavedStyles::PROPERTIES {
            element.set_inline_style(property, saved.get(property));
        }
        result
    }

    fn run<E: TextElement + ?Sized>(
        &self,
        element: &mut E,
        original: &str,
        saved: &SavedStyles,
    ) -> Result<PassOutcome, BalanceError> {
        let original_white_space = element
            .computed_style(StyleProperty::WhiteSpace)
            .and_then(|v| WhiteSpace::parse(&v))
            .unwrap_or_default();
        let metrics = measure_container(element, original_white_space)?;
        tracing::trace!(?metrics, "container");

        if metrics.width <= 0.0 {
            return Ok(PassOutcome::Skipped(SkipReason::ZeroWidthContainer));
        }
        if metrics.unwrapped_width <= metrics.width {
            return Ok(PassOutcome::Skipped(SkipReason::FitsOnOneLine));
        }
        if metrics.unwrapped_width >= self.config.max_text_width {
            return Ok(PassOutcome::Skipped(SkipReason::OversizedInput));
        }
        if metrics.unwrapped_height <= 0.0 {
            return Err(BalanceError::measurement("content has no line height"));
        }

        let justified = element
            .computed_style(StyleProperty::TextAlign)
            .and_then(|v| TextAlign::parse(&v))
            == Some(TextAlign::Justify);

        // Nested nowrap spans are only visible under the original white-space.
        element.set_inline_style(StyleProperty::WhiteSpace, saved.get(StyleProperty::WhiteSpace));
        let root_white_space = element
            .computed_style(StyleProperty::WhiteSpace)
            .and_then(|v| WhiteSpace::parse(&v))
            .unwrap_or_default();
        let mut ranges = nowrap::collect(element, &element.content(), root_white_space);
        element.set_inline_style(StyleProperty::WhiteSpace, Some(WhiteSpace::Nowrap.as_css()));

        let mut remaining_lines = metrics.line_count();
        let mut unwrapped_width = metrics.unwrapped_width;
        let mut buffer = original.to_string();
        let mut output = String::new();
        let mut lines = Vec::with_capacity(remaining_lines);

        while remaining_lines > 1 {
            let breaks = BreakOpportunities::new(&buffer, &ranges);
            let desired = metrics.desired_width(unwrapped_width, remaining_lines);
            let mut measure = |index: usize| -> Result<f64, BalanceError> {
                element.set_inner_markup(&buffer[..index]);
                Ok(element.measure()?.width)
            };
            let split = search::split_index(
                &mut measure,
                &breaks,
                metrics.width,
                desired,
                remaining_lines,
            )?;

            if split == 0 || split >= buffer.len() {
                tracing::debug!(
                    split,
                    remaining_lines,
                    "no usable break opportunity, stopping early"
                );
                break;
            }

            let line = Line::from_prefix(&buffer[..split], justified);
            if justified {
                output.push_str(&justify::justify(element, &line.text, metrics.width)?);
            } else {
                output.push_str(&line.text);
                output.push_str(&line.break_marker());
            }
            lines.push(line);

            ranges = nowrap::rebase(&ranges, split);
            buffer.drain(..split);
            remaining_lines -= 1;

            element.set_inner_markup(&buffer);
            unwrapped_width = element.measure()?.width;
        }

        let last = Line::remainder(&buffer, justified);
        if justified {
            output.push_str(&justify::justify(element, &last.text, metrics.width)?);
        } else {
            output.push_str(&last.text);
        }
        lines.push(last);

        element.set_inner_markup(&output);
        tracing::debug!(lines = lines.len(), "balanced");
        Ok(PassOutcome::Balanced { lines })
    }
}

/// Measure the container as laid out, then the content on one line.
///
/// Leaves the element with the single-line overrides applied.
fn measure_container<E: TextElement + ?Sized>(
    element: &mut E,
    original_white_space: WhiteSpace,
) -> Result<ContainerMetrics, BalanceError> {
    element.set_inline_style(StyleProperty::LineHeight, Some("normal"));
    let container = element.measure()?;

    element.set_inline_style(StyleProperty::WhiteSpace, Some(WhiteSpace::Nowrap.as_css()));
    element.set_inline_style(StyleProperty::Float, Some("none"));
    element.set_inline_style(StyleProperty::Display, Some("inline"));
    element.set_inline_style(StyleProperty::Position, Some("static"));
    let unwrapped = element.measure()?;

    let space_width = if original_white_space == WhiteSpace::PreWrap {
        0.0
    } else {
        let ratio = element.space_aspect_ratio()?;
        if ratio > 0.0 {
            unwrapped.height / ratio
        } else {
            0.0
        }
    };

    Ok(ContainerMetrics {
        width: container.width,
        height: container.height,
        unwrapped_width: unwrapped.width,
        unwrapped_height: unwrapped.height,
        space_width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(space_width: f64) -> ContainerMetrics {
        ContainerMetrics {
            width: 130.0,
            height: 24.0,
            unwrapped_width: 250.0,
            unwrapped_height: 12.0,
            space_width,
        }
    }

    #[test]
    fn test_desired_width() {
        let m = metrics(6.0);
        assert_eq!(m.line_count(), 2);
        assert_eq!(m.desired_width(250.0, 2), 122.0);
    }

    #[test]
    fn test_desired_width_without_space_correction() {
        let m = metrics(0.0);
        assert_eq!(m.desired_width(250.0, 2), 125.0);
        assert_eq!(m.desired_width(250.0, 3), 83.0);
    }

    #[test]
    fn test_round_half_up_matches_js() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(15.5), 16.0);
    }

    #[test]
    fn test_line_count_rounds() {
        let mut m = metrics(6.0);
        m.height = 41.0;
        assert_eq!(m.line_count(), 3);
        m.height = 17.0;
        assert_eq!(m.line_count(), 1);
    }
}
