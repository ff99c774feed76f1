//! Numbers that may vary per breakpoint.

use crate::breakpoint::{Breakpoint, BreakpointSet, SharedObserver, SubscriptionToken};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A fixed number or a per-breakpoint table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsiveValue {
    /// Same value at every width.
    Fixed(u32),
    /// Value per breakpoint; missing entries fall through to smaller ones.
    PerBreakpoint(BTreeMap<Breakpoint, u32>),
}

impl ResponsiveValue {
    /// Resolve against `screens`.
    ///
    /// Walks breakpoints largest first and returns the first entry whose
    /// breakpoint is active. With `fallback_to_xs`, the `xs` entry counts as
    /// active even when `xs` is not. Returns `default` when nothing matches.
    pub fn resolve(&self, screens: &BreakpointSet, default: u32, fallback_to_xs: bool) -> u32 {
        let table = match self {
            ResponsiveValue::Fixed(value) => return *value,
            ResponsiveValue::PerBreakpoint(table) => table,
        };

        Breakpoint::PRECEDENCE
            .iter()
            .filter(|bp| screens.is_active(**bp) || (**bp == Breakpoint::Xs && fallback_to_xs))
            .find_map(|bp| table.get(bp).copied())
            .unwrap_or(default)
    }

    /// Whether the value depends on the viewport.
    pub fn is_responsive(&self) -> bool {
        matches!(self, ResponsiveValue::PerBreakpoint(_))
    }
}

impl From<u32> for ResponsiveValue {
    fn from(value: u32) -> Self {
        ResponsiveValue::Fixed(value)
    }
}

/// A [`ResponsiveValue`] tracking a breakpoint observer.
///
/// Until the first notification every breakpoint counts as active, so the
/// largest configured entry wins.
pub struct ResponsiveState {
    value: ResponsiveValue,
    default: u32,
    fallback_to_xs: bool,
    screens: Rc<Cell<BreakpointSet>>,
    subscription: Option<(SharedObserver, SubscriptionToken)>,
}

impl ResponsiveState {
    /// Unobserved state.
    pub fn new(value: ResponsiveValue, default: u32, fallback_to_xs: bool) -> Self {
        Self {
            value,
            default,
            fallback_to_xs,
            screens: Rc::new(Cell::new(BreakpointSet::all())),
            subscription: None,
        }
    }

    /// Resolved number.
    pub fn get(&self) -> u32 {
        self.value
            .resolve(&self.screens.get(), self.default, self.fallback_to_xs)
    }

    /// Replace the value.
    pub fn set_value(&mut self, value: ResponsiveValue) {
        self.value = value;
    }

    /// Follow `observer` until dropped. A headless observer leaves the state
    /// at its initial all-active set.
    pub fn observe(&mut self, observer: &SharedObserver) {
        self.stop();
        let screens = Rc::clone(&self.screens);
        let subscribed = observer
            .borrow_mut()
            .subscribe(move |next| screens.set(*next));
        match subscribed {
            Ok(token) => self.subscription = Some((Rc::clone(observer), token)),
            Err(err) => tracing::debug!(error = %err, "responsive value not observing"),
        }
    }

    /// Whether an observer subscription is held.
    pub fn is_observing(&self) -> bool {
        self.subscription.is_some()
    }

    /// Stop following the observer.
    pub fn stop(&mut self) {
        let Some((observer, token)) = self.subscription.take() else {
            return;
        };
        match observer.try_borrow_mut() {
            Ok(mut observer) => observer.unsubscribe(token),
            Err(_) => tracing::warn!("breakpoint observer busy, subscription leaked"),
        };
    }
}

impl Drop for ResponsiveState {
    fn drop(&mut self) {
        self.stop();
    }
}
