//! # Host Interfaces
//!
//! What the balancer needs from the environment that renders the text.
//!
//! A [`TextElement`] is one element whose content can be read, rewritten and
//! measured. A [`Host`] owns many of them and resolves selectors. The
//! reference implementation of both lives in [`crate::page`].

use crate::error::BalanceError;
use crate::markup::{self, Element, Fragment};
use crate::style::{StyleProperty, WhiteSpace};
use serde::{Deserialize, Serialize};

/// Stable handle for an element owned by a [`Host`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub usize);

/// Rendered border-box size, as a layout engine reports it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

/// An element whose inline content can be balanced.
///
/// Measurements reflect the element's *current* content and inline style,
/// so the balancer rewrites the content before each call. Implementations
/// are free to cache layout between calls as long as writes invalidate it.
pub trait TextElement {
    /// Serialized inner markup.
    fn inner_markup(&self) -> String;

    /// Replace the inner markup. Hosts may normalize it the way a browser
    /// re-serializes `innerHTML`.
    fn set_inner_markup(&mut self, markup: &str);

    /// Inline (`style="..."`) value of a property.
    fn inline_style(&self, property: StyleProperty) -> Option<String>;

    /// Set or clear (`None` or empty) an inline property.
    fn set_inline_style(&mut self, property: StyleProperty, value: Option<&str>);

    /// Computed value of a property after the cascade.
    fn computed_style(&self, property: StyleProperty) -> Option<String>;

    /// Size of the element as currently laid out.
    fn measure(&self) -> Result<BoxSize, BalanceError>;

    /// Width of `markup` rendered as an inline child of this element.
    fn measure_fragment(&self, markup: &str) -> Result<f64, BalanceError>;

    /// Height over width of a no-break space glyph box in this element's font.
    fn space_aspect_ratio(&self) -> Result<f64, BalanceError>;

    /// Parsed inner content.
    fn content(&self) -> Fragment {
        markup::parse(&self.inner_markup())
    }

    /// Computed white-space of a descendant element.
    fn child_white_space(&self, child: &Element, inherited: WhiteSpace) -> WhiteSpace {
        child.style().white_space().unwrap_or(inherited)
    }
}

/// The environment that owns text elements.
pub trait Host {
    type Element: TextElement;

    /// Elements matching a selector, in document order.
    fn select(&self, selector: &str) -> Vec<ElementId>;

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Self::Element>;

    /// The host balances text itself (`text-wrap: balance`).
    fn supports_native_balance(&self) -> bool {
        false
    }
}

/// What a balancing call applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Selector(String),
    Element(ElementId),
    Elements(Vec<ElementId>),
}

impl Target {
    /// Resolve to element ids against a host.
    pub fn resolve<H: Host>(&self, host: &H) -> Vec<ElementId> {
        match self {
            Target::Selector(sel) => host.select(sel),
            Target::Element(id) => vec![*id],
            Target::Elements(ids) => ids.clone(),
        }
    }
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Target::Selector(selector.to_string())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Target::Selector(selector)
    }
}

impl From<ElementId> for Target {
    fn from(id: ElementId) -> Self {
        Target::Element(id)
    }
}

impl From<Vec<ElementId>> for Target {
    fn from(ids: Vec<ElementId>) -> Self {
        Target::Elements(ids)
    }
}
