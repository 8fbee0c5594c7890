//! Directional search for the break nearest a desired width.
//!
//! The width oracle is a closure from a prefix length (byte offset) to the
//! rendered width of that prefix. Prefix widths are assumed non-decreasing
//! in the offset; the walk terminates regardless because it stops at the
//! buffer boundaries, which are always opportunities.

use super::breaks::BreakOpportunities;
use super::round_half_up;
use crate::error::BalanceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// Result of one directional search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WsProbe {
    pub index: usize,
    pub width: f64,
}

/// Walk from `start` through opportunities until the width condition holds.
///
/// Backward stops at `width <= desired`, a non-positive width, or 0.
/// Forward stops at `width >= desired`, `width >= container`, or the end.
pub fn find_break<F>(
    measure: &mut F,
    breaks: &BreakOpportunities<'_>,
    container_width: f64,
    desired_width: f64,
    direction: Direction,
    start: usize,
) -> Result<WsProbe, BalanceError>
where
    F: FnMut(usize) -> Result<f64, BalanceError>,
{
    let len = breaks.len();
    let mut index = start.min(len);
    loop {
        while !breaks.is_opportunity(index) {
            index = match direction {
                Direction::Backward => index - 1,
                Direction::Forward => index + 1,
            };
        }

        let width = measure(index)?;
        tracing::trace!(index, width, ?direction, "probe");

        let done = match direction {
            Direction::Backward => width <= desired_width || width <= 0.0 || index == 0,
            Direction::Forward => {
                width >= desired_width || width >= container_width || index == len
            }
        };
        if done {
            return Ok(WsProbe { index, width });
        }

        index = match direction {
            Direction::Backward => index - 1,
            Direction::Forward => index + 1,
        };
    }
}

/// Choose between the lower and upper probe.
///
/// Without a lower break the upper one wins; an upper break that overflows
/// the container loses; otherwise the closer to `desired` wins, ties going to
/// the lower.
pub fn choose(le: WsProbe, ge: WsProbe, container_width: f64, desired_width: f64) -> usize {
    if le.index == 0 {
        ge.index
    } else if ge.width > container_width || le.index == ge.index {
        le.index
    } else if (desired_width - le.width).abs() <= (ge.width - desired_width).abs() {
        le.index
    } else {
        ge.index
    }
}

/// Split offset for the next line: backward, forward, then backward again
/// from the forward result.
pub fn split_index<F>(
    measure: &mut F,
    breaks: &BreakOpportunities<'_>,
    container_width: f64,
    desired_width: f64,
    remaining_lines: usize,
) -> Result<usize, BalanceError>
where
    F: FnMut(usize) -> Result<f64, BalanceError>,
{
    let len = breaks.len();
    let guess = round_half_up((len + 1) as f64 / remaining_lines.max(1) as f64) - 1.0;
    let guess = guess.max(0.0) as usize;

    let le = find_break(
        measure,
        breaks,
        container_width,
        desired_width,
        Direction::Backward,
        guess,
    )?;
    let ge = find_break(
        measure,
        breaks,
        container_width,
        desired_width,
        Direction::Forward,
        le.index,
    )?;
    let le = find_break(
        measure,
        breaks,
        container_width,
        desired_width,
        Direction::Backward,
        ge.index,
    )?;

    let split = choose(le, ge, container_width, desired_width);
    tracing::debug!(
        desired = desired_width,
        le = le.index,
        le_width = le.width,
        ge = ge.index,
        ge_width = ge.width,
        split,
        "line split"
    );
    Ok(split)
}
