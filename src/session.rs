//! # Balancing Session
//!
//! Owns the watch list and decides when watched elements are re-balanced.
//!
//! A session never listens for events itself: the embedder feeds it
//! [`LayoutEvent`]s. Ready and load events re-balance everything watched
//! immediately. Resize events only mark the session dirty, and the next
//! [`BalancerSession::flush`] runs one pass for any number of resizes.

use crate::balance::{Balancer, PassOutcome};
use crate::config::BalanceConfig;
use crate::error::BalanceError;
use crate::host::{ElementId, Host, Target};

/// Selector watched by [`BalancerSession::polyfill`].
pub const POLYFILL_SELECTOR: &str = ".balance-text";

/// Layout-affecting events delivered by the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEvent {
    /// Document content is available.
    Ready,
    /// Everything, fonts included, has loaded.
    Load,
    Resize,
}

/// Result of one pass over one element.
#[derive(Debug)]
pub struct ElementReport {
    pub id: ElementId,
    pub result: Result<PassOutcome, BalanceError>,
}

/// Results of a batch, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<ElementReport>,
}

impl BatchReport {
    pub fn get(&self, id: ElementId) -> Option<&Result<PassOutcome, BalanceError>> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of elements that got balanced markup.
    pub fn balanced(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.result, Ok(PassOutcome::Balanced { .. })))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ElementReport> {
        self.entries.iter().filter(|e| e.result.is_err())
    }
}

/// Watch list and event handling around a [`Balancer`].
#[derive(Debug, Default)]
pub struct BalancerSession {
    balancer: Balancer,
    watched_selectors: Vec<String>,
    watched_elements: Vec<ElementId>,
    polyfilled: bool,
    running: bool,
    resize_pending: bool,
}

impl BalancerSession {
    pub fn new(config: BalanceConfig) -> Self {
        Self {
            balancer: Balancer::new(config),
            ..Default::default()
        }
    }

    fn defers_to_native<H: Host>(&self, host: &H) -> bool {
        let native = self.balancer.config().respect_native_text_wrap && host.supports_native_balance();
        if native {
            tracing::debug!("host balances text natively, nothing to do");
        }
        native
    }

    /// Balance the targeted elements once.
    pub fn balance<H: Host>(&self, host: &mut H, target: impl Into<Target>) -> BatchReport {
        if self.defers_to_native(&*host) {
            return BatchReport::default();
        }
        let ids = target.into().resolve(&*host);
        self.run_batch(host, &ids)
    }

    /// Watch the targets and balance everything watched.
    pub fn balance_and_watch<H: Host>(
        &mut self,
        host: &mut H,
        target: impl Into<Target>,
    ) -> BatchReport {
        if self.defers_to_native(&*host) {
            return BatchReport::default();
        }
        match target.into() {
            Target::Selector(sel) => {
                if !self.watched_selectors.contains(&sel) {
                    self.watched_selectors.push(sel);
                }
            }
            Target::Element(id) => self.watch_element(id),
            Target::Elements(ids) => ids.into_iter().for_each(|id| self.watch_element(id)),
        }
        self.start();
        self.update_watched(host)
    }

    fn watch_element(&mut self, id: ElementId) {
        if !self.watched_elements.contains(&id) {
            self.watched_elements.push(id);
        }
    }

    /// Stop watching. Selectors are matched by their text, not by the
    /// elements they currently resolve to.
    pub fn unwatch(&mut self, target: impl Into<Target>) {
        match target.into() {
            Target::Selector(sel) => self.watched_selectors.retain(|s| *s != sel),
            Target::Element(id) => self.watched_elements.retain(|e| *e != id),
            Target::Elements(ids) => self.watched_elements.retain(|e| !ids.contains(e)),
        }
    }

    /// Watch [`POLYFILL_SELECTOR`]. Balancing happens on the next ready,
    /// load or flushed resize.
    pub fn polyfill<H: Host>(&mut self, host: &H) {
        if self.polyfilled || self.defers_to_native(&*host) {
            return;
        }
        self.watched_selectors.push(POLYFILL_SELECTOR.to_string());
        self.start();
        self.polyfilled = true;
    }

    /// Balance every watched element: explicit ids first, then selector
    /// matches, each element once.
    pub fn update_watched<H: Host>(&self, host: &mut H) -> BatchReport {
        if self.defers_to_native(&*host) {
            return BatchReport::default();
        }
        let mut ids = self.watched_elements.clone();
        for sel in &self.watched_selectors {
            for id in host.select(sel) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        self.run_batch(host, &ids)
    }

    /// Start reacting to events.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop reacting to events and drop any pending resize.
    pub fn stop(&mut self) {
        self.running = false;
        self.resize_pending = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_resize_pending(&self) -> bool {
        self.resize_pending
    }

    pub fn watched_selectors(&self) -> &[String] {
        &self.watched_selectors
    }

    pub fn watched_elements(&self) -> &[ElementId] {
        &self.watched_elements
    }

    /// Feed one event. Returns the batch it triggered, if any.
    pub fn handle_event<H: Host>(&mut self, host: &mut H, event: LayoutEvent) -> Option<BatchReport> {
        if !self.running {
            return None;
        }
        match event {
            LayoutEvent::Ready | LayoutEvent::Load => {
                self.resize_pending = false;
                Some(self.update_watched(host))
            }
            LayoutEvent::Resize => {
                self.resize_pending = true;
                None
            }
        }
    }

    /// Run the pass owed to coalesced resize events.
    pub fn flush<H: Host>(&mut self, host: &mut H) -> Option<BatchReport> {
        if !(self.running && self.resize_pending) {
            return None;
        }
        self.resize_pending = false;
        Some(self.update_watched(host))
    }

    fn run_batch<H: Host>(&self, host: &mut H, ids: &[ElementId]) -> BatchReport {
        let mut report = BatchReport::default();
        for &id in ids {
            let result = match host.element_mut(id) {
                Some(element) => self.balancer.balance(element),
                None => Err(BalanceError::UnknownElement(id)),
            };
            if let Err(e) = &result {
                tracing::warn!(?id, "skipping element: {e}");
            }
            report.entries.push(ElementReport { id, result });
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{BlockSpec, Page};

    const TEXT: &str = "The quick brown fox jumps over";

    fn page() -> (Page, ElementId, ElementId) {
        let mut page = Page::new();
        let a = page.push(BlockSpec::new(130.0, TEXT).font("Courier", 10.0).class("balance-text"));
        let b = page.push(BlockSpec::new(130.0, TEXT).font("Courier", 10.0).id("other"));
        (page, a, b)
    }

    fn is_balanced(page: &Page, id: ElementId) -> bool {
        page.block(id).unwrap().markup().contains("data-owner")
    }

    #[test]
    fn test_balance_once_does_not_watch() {
        let (mut page, a, _) = page();
        let session = BalancerSession::default();
        let report = session.balance(&mut page, a);
        assert_eq!(report.balanced(), 1);
        assert!(session.watched_elements().is_empty());
        assert!(!session.is_running());
    }

    #[test]
    fn test_watch_is_idempotent() {
        let (mut page, _, b) = page();
        let mut session = BalancerSession::default();
        session.balance_and_watch(&mut page, "#other");
        session.balance_and_watch(&mut page, "#other");
        session.balance_and_watch(&mut page, b);
        session.balance_and_watch(&mut page, b);
        assert_eq!(session.watched_selectors(), ["#other".to_string()]);
        assert_eq!(session.watched_elements(), [b]);
        // Watched twice, balanced once per pass.
        assert_eq!(session.update_watched(&mut page).len(), 1);
    }

    #[test]
    fn test_unwatch() {
        let (mut page, a, b) = page();
        let mut session = BalancerSession::default();
        session.balance_and_watch(&mut page, vec![a, b]);
        session.balance_and_watch(&mut page, ".balance-text");
        session.unwatch(a);
        session.unwatch(".balance-text");
        assert_eq!(session.watched_elements(), [b]);
        assert!(session.watched_selectors().is_empty());
    }

    #[test]
    fn test_polyfill_waits_for_ready() {
        let (mut page, a, b) = page();
        let mut session = BalancerSession::default();
        session.polyfill(&page);
        session.polyfill(&page);
        assert_eq!(session.watched_selectors(), [POLYFILL_SELECTOR.to_string()]);
        assert!(!is_balanced(&page, a));

        let report = session.handle_event(&mut page, LayoutEvent::Ready).unwrap();
        assert_eq!(report.balanced(), 1);
        assert!(is_balanced(&page, a));
        assert!(!is_balanced(&page, b));
    }

    #[test]
    fn test_resizes_coalesce_until_flush() {
        let (mut page, _, _) = page();
        let mut session = BalancerSession::default();
        session.polyfill(&page);
        for _ in 0..5 {
            assert!(session.handle_event(&mut page, LayoutEvent::Resize).is_none());
        }
        assert!(session.is_resize_pending());
        assert_eq!(session.flush(&mut page).map(|r| r.len()), Some(1));
        assert!(session.flush(&mut page).is_none());
    }

    #[test]
    fn test_stopped_session_ignores_events() {
        let (mut page, _, _) = page();
        let mut session = BalancerSession::default();
        session.polyfill(&page);
        session.handle_event(&mut page, LayoutEvent::Resize);
        session.stop();
        assert!(session.flush(&mut page).is_none());
        assert!(session.handle_event(&mut page, LayoutEvent::Load).is_none());
    }

    #[test]
    fn test_native_support_is_a_no_op() {
        let (mut page, a, _) = page();
        page.set_native_text_wrap(true);
        let mut session = BalancerSession::default();
        assert!(session.balance(&mut page, a).is_empty());
        assert!(session.balance_and_watch(&mut page, a).is_empty());
        session.polyfill(&page);
        assert!(session.watched_elements().is_empty());
        assert!(session.watched_selectors().is_empty());
        assert!(!is_balanced(&page, a));
    }

    #[test]
    fn test_native_support_ignored_when_configured() {
        let (mut page, a, _) = page();
        page.set_native_text_wrap(true);
        let session = BalancerSession::new(BalanceConfig {
            respect_native_text_wrap: false,
            ..Default::default()
        });
        assert_eq!(session.balance(&mut page, a).balanced(), 1);
    }

    #[test]
    fn test_unknown_element_does_not_stop_batch() {
        let (mut page, a, _) = page();
        let session = BalancerSession::default();
        let report = session.balance(&mut page, vec![ElementId(99), a]);
        assert_eq!(report.len(), 2);
        assert!(matches!(
            report.get(ElementId(99)),
            Some(Err(BalanceError::UnknownElement(ElementId(99))))
        ));
        assert_eq!(report.balanced(), 1);
        assert_eq!(report.failures().count(), 1);
    }
}
