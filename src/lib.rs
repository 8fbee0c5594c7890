//! # balance-text
//!
//! Even out the lines of wrapped inline text.
//!
//! Greedy line wrapping fills each line as far as it can and leaves whatever
//! is left for the last one, which is how headlines end up with a single
//! orphaned word. Balancing keeps the same number of lines but chooses the
//! breaks so every line is about as wide as the others.
//!
//! The algorithm works on the element's serialized markup and asks its host
//! how wide a prefix renders. Breaks are written back as tagged `<br>`
//! elements (or justification spans), so a later pass can strip them and
//! start over, e.g. after the container is resized.
//!
//! ## Architecture
//!
//! ```text
//! Host / TextElement     : where the text lives, how wide it renders
//!       ↓
//!   [session]  : watch list, ready/load/resize events
//!       ↓
//!   [balance]  : strip → measure → split lines → materialize
//!       ↓
//!   [markup]   : parse, serialize, strip generated markup
//! ```
//!
//! [`page`] is a complete host built on [`text`] and [`font`]: a list of
//! fixed-width blocks measured with real font metrics. The CLI runs on it.

pub mod balance;
pub mod config;
pub mod error;
pub mod font;
pub mod host;
pub mod markup;
pub mod page;
pub mod session;
pub mod style;
pub mod text;

pub use balance::{Balancer, Line, PassOutcome, SkipReason};
pub use config::BalanceConfig;
pub use error::BalanceError;
pub use host::{BoxSize, ElementId, Host, Target, TextElement};
pub use page::{BlockSpec, Page, PageOutput, PageSpec};
pub use session::{BalancerSession, BatchReport, LayoutEvent};

/// Balance a page described as JSON.
///
/// Blocks matching the document's `selector` are balanced; without one the
/// page is treated like a document using the polyfill, and blocks with the
/// `balance-text` class are balanced on ready.
pub fn balance_json(json: &str) -> Result<PageOutput, BalanceError> {
    let spec: PageSpec = serde_json::from_str(json)?;
    let selector = spec.selector.clone();
    let mut page = Page::from_spec(spec)?;
    let mut session = BalancerSession::new(page.config().clone());

    let report = match selector {
        Some(selector) => session.balance(&mut page, selector),
        None => {
            session.polyfill(&page);
            session
                .handle_event(&mut page, LayoutEvent::Ready)
                .unwrap_or_default()
        }
    };
    Ok(page.output(&report))
}
