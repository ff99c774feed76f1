//! Tests for breakpoint sets and the observer lifecycle.

use super::*;
use std::cell::Cell;

/// Source that counts start/stop calls.
struct CountingViewport {
    width: u32,
    starts: Rc<Cell<u32>>,
    stops: Rc<Cell<u32>>,
}

fn counting(width: u32) -> (CountingViewport, Rc<Cell<u32>>, Rc<Cell<u32>>) {
    let starts = Rc::new(Cell::new(0));
    let stops = Rc::new(Cell::new(0));
    let source = CountingViewport {
        width,
        starts: Rc::clone(&starts),
        stops: Rc::clone(&stops),
    };
    (source, starts, stops)
}

impl ViewportSource for CountingViewport {
    fn start(&mut self) -> Result<u32, BreakpointError> {
        self.starts.set(self.starts.get() + 1);
        Ok(self.width)
    }

    fn stop(&mut self) {
        self.stops.set(self.stops.get() + 1);
    }
}

// ===== BreakpointSet =====

#[test]
fn from_width_small_phone_is_xs_only() {
    let set = BreakpointSet::from_width(375, &BreakpointThresholds::default());
    assert_eq!(set, BreakpointSet::from_active(&[Breakpoint::Xs]));
}

#[test]
fn from_width_desktop_activates_all_lower_min_widths() {
    let set = BreakpointSet::from_width(1280, &BreakpointThresholds::default());
    let active: Vec<_> = set.active().collect();
    assert_eq!(
        active,
        vec![Breakpoint::Xl, Breakpoint::Lg, Breakpoint::Md, Breakpoint::Sm]
    );
    assert_eq!(set.largest(), Some(Breakpoint::Xl));
}

#[test]
fn from_width_threshold_is_inclusive() {
    let set = BreakpointSet::from_width(1600, &BreakpointThresholds::default());
    assert!(set.is_active(Breakpoint::Xxl));
    assert!(!set.is_active(Breakpoint::Xs));
}

#[test]
fn precedence_is_largest_first() {
    assert_eq!(Breakpoint::PRECEDENCE[0], Breakpoint::Xxl);
    assert_eq!(Breakpoint::PRECEDENCE[5], Breakpoint::Xs);
}

// ===== BreakpointObserver =====

#[test]
fn subscribe_delivers_current_set_immediately() {
    let (source, _, _) = counting(800);
    let mut observer = BreakpointObserver::new(source);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    observer
        .subscribe(move |set| sink.borrow_mut().push(*set))
        .expect("source starts");

    assert_eq!(seen.borrow().len(), 1);
    assert!(seen.borrow()[0].is_active(Breakpoint::Md));
}

#[test]
fn source_starts_lazily_and_once() {
    let (source, starts, _) = counting(800);
    let mut observer = BreakpointObserver::new(source);
    assert_eq!(starts.get(), 0, "no watch before first subscriber");

    observer.subscribe(|_| {}).unwrap();
    observer.subscribe(|_| {}).unwrap();
    assert_eq!(starts.get(), 1);
    assert!(observer.is_watching());
}

#[test]
fn last_unsubscribe_stops_source() {
    let (source, _, stops) = counting(800);
    let mut observer = BreakpointObserver::new(source);
    let a = observer.subscribe(|_| {}).unwrap();
    let b = observer.subscribe(|_| {}).unwrap();

    observer.unsubscribe(a);
    assert_eq!(stops.get(), 0);
    observer.unsubscribe(b);
    assert_eq!(stops.get(), 1);
    assert!(!observer.is_watching());
    assert_eq!(observer.subscriber_count(), 0);
}

#[test]
fn every_subscriber_receives_changes_until_unsubscribed() {
    let (source, _, _) = counting(400);
    let mut observer = BreakpointObserver::new(source);
    let first = Rc::new(Cell::new(0));
    let second = Rc::new(Cell::new(0));
    let (f, s) = (Rc::clone(&first), Rc::clone(&second));

    let token = observer.subscribe(move |_| f.set(f.get() + 1)).unwrap();
    observer.subscribe(move |_| s.set(s.get() + 1)).unwrap();

    assert!(observer.viewport_changed(1300));
    observer.unsubscribe(token);
    assert!(observer.viewport_changed(700));

    assert_eq!(first.get(), 2, "initial + one change");
    assert_eq!(second.get(), 3, "initial + two changes");
}

#[test]
fn unchanged_set_is_not_republished() {
    let (source, _, _) = counting(1000);
    let mut observer = BreakpointObserver::new(source);
    let calls = Rc::new(Cell::new(0));
    let c = Rc::clone(&calls);
    observer.subscribe(move |_| c.set(c.get() + 1)).unwrap();

    assert!(!observer.viewport_changed(1100), "still lg");
    assert_eq!(calls.get(), 1);
}

#[test]
fn headless_observer_rejects_subscription() {
    let mut observer = BreakpointObserver::headless();
    let result = observer.subscribe(|_| {});
    assert_eq!(result, Err(BreakpointError::Unavailable));
    assert_eq!(observer.subscriber_count(), 0);
    assert!(!observer.is_watching());
}

#[test]
fn changes_ignored_while_not_watching() {
    let (source, _, _) = counting(1000);
    let mut observer = BreakpointObserver::new(source);
    assert!(!observer.viewport_changed(300));
    assert_eq!(observer.current(), BreakpointSet::empty());
}
