//! Viewport breakpoints and the observer that publishes them.
//!
//! The [`BreakpointObserver`] is the single source of truth for which named
//! breakpoints are active. It owns a [`ViewportSource`] that it starts lazily
//! on the first subscription and stops when the last subscriber leaves.
//! The embedding shell forwards viewport width changes through
//! [`BreakpointObserver::viewport_changed`].

use crate::error::BreakpointError;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

// ===== Breakpoint =====

/// Named viewport-width threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    /// Extra-extra-large.
    Xxl,
    /// Extra-large.
    Xl,
    /// Large.
    Lg,
    /// Medium.
    Md,
    /// Small.
    Sm,
    /// Extra-small.
    Xs,
}

impl Breakpoint {
    /// All breakpoints, largest first. "First match" lookups walk this order.
    pub const PRECEDENCE: [Breakpoint; 6] = [
        Breakpoint::Xxl,
        Breakpoint::Xl,
        Breakpoint::Lg,
        Breakpoint::Md,
        Breakpoint::Sm,
        Breakpoint::Xs,
    ];

    /// Short lowercase name (`"xxl"` ... `"xs"`).
    pub fn name(self) -> &'static str {
        match self {
            Breakpoint::Xxl => "xxl",
            Breakpoint::Xl => "xl",
            Breakpoint::Lg => "lg",
            Breakpoint::Md => "md",
            Breakpoint::Sm => "sm",
            Breakpoint::Xs => "xs",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===== BreakpointSet =====

/// Which breakpoints are currently active.
///
/// Immutable value: the observer replaces its set on change, it never edits
/// the published one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BreakpointSet {
    flags: [bool; 6],
}

impl BreakpointSet {
    /// No breakpoint active.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every breakpoint active.
    pub fn all() -> Self {
        Self { flags: [true; 6] }
    }

    /// Set containing exactly `active`.
    pub fn from_active(active: &[Breakpoint]) -> Self {
        active
            .iter()
            .fold(Self::empty(), |set, bp| set.with(*bp, true))
    }

    /// Resolve the set for a viewport `width` in pixels.
    ///
    /// `xs` is active below the `sm` threshold; every other breakpoint is
    /// active at or above its own minimum width.
    pub fn from_width(width: u32, thresholds: &BreakpointThresholds) -> Self {
        Self::empty()
            .with(Breakpoint::Xs, width < thresholds.sm)
            .with(Breakpoint::Sm, width >= thresholds.sm)
            .with(Breakpoint::Md, width >= thresholds.md)
            .with(Breakpoint::Lg, width >= thresholds.lg)
            .with(Breakpoint::Xl, width >= thresholds.xl)
            .with(Breakpoint::Xxl, width >= thresholds.xxl)
    }

    /// Copy with `breakpoint` switched to `active`.
    pub fn with(mut self, breakpoint: Breakpoint, active: bool) -> Self {
        self.flags[breakpoint.slot()] = active;
        self
    }

    /// Whether `breakpoint` is active.
    pub fn is_active(&self, breakpoint: Breakpoint) -> bool {
        self.flags[breakpoint.slot()]
    }

    /// Active breakpoints in precedence order (largest first).
    pub fn active(&self) -> impl Iterator<Item = Breakpoint> + '_ {
        Breakpoint::PRECEDENCE
            .into_iter()
            .filter(|bp| self.is_active(*bp))
    }

    /// Largest active breakpoint.
    pub fn largest(&self) -> Option<Breakpoint> {
        self.active().next()
    }
}

/// Minimum viewport widths (px) for each breakpoint above `xs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BreakpointThresholds {
    /// Small.
    pub sm: u32,
    /// Medium.
    pub md: u32,
    /// Large.
    pub lg: u32,
    /// Extra-large.
    pub xl: u32,
    /// Extra-extra-large.
    pub xxl: u32,
}

impl Default for BreakpointThresholds {
    fn default() -> Self {
        Self {
            sm: 576,
            md: 768,
            lg: 992,
            xl: 1200,
            xxl: 1600,
        }
    }
}

// ===== ViewportSource =====

/// Viewport media-query capability.
///
/// `start` begins watching and reports the current width; changes afterwards
/// are pushed into the observer by the embedding shell. A source that cannot
/// watch (headless contexts) returns [`BreakpointError::Unavailable`].
pub trait ViewportSource {
    /// Begin watching the viewport, returning its current width in pixels.
    fn start(&mut self) -> Result<u32, BreakpointError>;

    /// Stop watching. Called once the observer has no subscribers left.
    fn stop(&mut self);
}

/// Source for contexts without a viewport.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessViewport;

impl ViewportSource for HeadlessViewport {
    fn start(&mut self) -> Result<u32, BreakpointError> {
        Err(BreakpointError::Unavailable)
    }

    fn stop(&mut self) {}
}

// ===== BreakpointObserver =====

/// Handle returned by [`BreakpointObserver::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionToken(u64);

type Listener = Box<dyn FnMut(&BreakpointSet)>;

/// Observer shared between the consumers of one viewport.
pub type SharedObserver = Rc<RefCell<BreakpointObserver>>;

/// Publishes the active [`BreakpointSet`] to subscribers.
///
/// Listeners run while the observer is mutably borrowed, so they must not
/// call back into the same observer.
pub struct BreakpointObserver {
    source: Box<dyn ViewportSource>,
    thresholds: BreakpointThresholds,
    screens: BreakpointSet,
    listeners: BTreeMap<SubscriptionToken, Listener>,
    next_token: u64,
    watching: bool,
}

impl BreakpointObserver {
    /// Observer over `source` with default thresholds.
    pub fn new(source: impl ViewportSource + 'static) -> Self {
        Self::with_thresholds(source, BreakpointThresholds::default())
    }

    /// Observer over `source` with custom thresholds.
    pub fn with_thresholds(
        source: impl ViewportSource + 'static,
        thresholds: BreakpointThresholds,
    ) -> Self {
        Self {
            source: Box::new(source),
            thresholds,
            screens: BreakpointSet::empty(),
            listeners: BTreeMap::new(),
            next_token: 0,
            watching: false,
        }
    }

    /// Observer with no viewport; every subscription fails.
    pub fn headless() -> Self {
        Self::new(HeadlessViewport)
    }

    /// Wrap into the shared handle consumers hold.
    pub fn into_shared(self) -> SharedObserver {
        Rc::new(RefCell::new(self))
    }

    /// Currently published breakpoint set.
    pub fn current(&self) -> BreakpointSet {
        self.screens
    }

    /// Whether the viewport source is being watched.
    pub fn is_watching(&self) -> bool {
        self.watching
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Register `listener`; it is called at once with the current set and
    /// again on every change until unsubscribed.
    ///
    /// Starts the viewport source if this is the first listener.
    ///
    /// # Errors
    ///
    /// Returns the source's error when it cannot start watching; the
    /// listener is not registered in that case.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&BreakpointSet) + 'static,
    ) -> Result<SubscriptionToken, BreakpointError> {
        if !self.watching {
            let width = self.source.start()?;
            self.watching = true;
            self.screens = BreakpointSet::from_width(width, &self.thresholds);
            tracing::debug!(width, "viewport watch started");
        }

        let token = SubscriptionToken(self.next_token);
        self.next_token += 1;

        let mut listener: Listener = Box::new(listener);
        listener(&self.screens);
        self.listeners.insert(token, listener);
        Ok(token)
    }

    /// Remove a listener. Stops the source when none remain.
    ///
    /// Unknown tokens are ignored.
    pub fn unsubscribe(&mut self, token: SubscriptionToken) {
        self.listeners.remove(&token);
        if self.listeners.is_empty() && self.watching {
            self.source.stop();
            self.watching = false;
            tracing::debug!("viewport watch stopped");
        }
    }

    /// Viewport resized to `width`. Publishes when the set changes.
    ///
    /// Returns whether listeners were notified.
    pub fn viewport_changed(&mut self, width: u32) -> bool {
        self.publish(BreakpointSet::from_width(width, &self.thresholds))
    }

    /// Replace the published set directly (for sources that evaluate media
    /// queries themselves). Returns whether listeners were notified.
    pub fn publish(&mut self, screens: BreakpointSet) -> bool {
        if !self.watching || screens == self.screens {
            return false;
        }
        self.screens = screens;
        for listener in self.listeners.values_mut() {
            listener(&screens);
        }
        true
    }
}

impl fmt::Debug for BreakpointObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreakpointObserver")
            .field("screens", &self.screens)
            .field("subscribers", &self.listeners.len())
            .field("watching", &self.watching)
            .finish()
    }
}

#[cfg(test)]
#[path = "breakpoint_tests.rs"]
mod tests;
