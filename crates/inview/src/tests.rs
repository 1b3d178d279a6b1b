//! Scenario tests for InViewTracker
//!
//! Each test drives a page through scripted geometry and scroll events and
//! checks what the handler observed.

use crate::handler::{callback, Handler, InViewChange, ReactiveCell};
use crate::options::{BindingOptions, Offset, RawBindingOptions};
use crate::tracker::{BindingValue, InViewTracker};
use crate::InViewError;
use inview_core::{create_effect_in, Bounds, ElementId, Page, ReactiveGraph, State};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const VIEWPORT: f32 = 800.0;

/// Geometry for an element well below the fold
const OUT: Bounds = Bounds {
    x: 0.0,
    y: 1500.0,
    width: 100.0,
    height: 100.0,
};

/// Geometry for an element inside the viewport
const IN: Bounds = Bounds {
    x: 0.0,
    y: 200.0,
    width: 100.0,
    height: 100.0,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("inview=trace")
        .with_test_writer()
        .try_init();
}

fn setup(initial: Bounds) -> (Page, InViewTracker, ElementId) {
    init_tracing();
    let page = Page::with_screen_height(VIEWPORT);
    let tracker = InViewTracker::new(page.clone());
    let element = page.create_element(initial);
    (page, tracker, element)
}

type Calls = Rc<RefCell<Vec<(ElementId, bool)>>>;

fn recording_callback() -> (Calls, crate::handler::Callback) {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&calls);
    let cb = callback(move |element, InViewChange { is_inview }| {
        log.borrow_mut().push((element, is_inview));
    });
    (calls, cb)
}

/// Move the element to each geometry in turn, dispatching a scroll each time
fn play(page: &Page, element: ElementId, script: &[Bounds]) {
    for bounds in script {
        page.set_bounds(element, *bounds);
        page.dispatch_scroll();
    }
}

fn flags(calls: &Calls) -> Vec<bool> {
    calls.borrow().iter().map(|(_, flag)| *flag).collect()
}

// =============================================================================
// Callback strategy
// =============================================================================

#[test]
fn test_callback_fires_once_per_transition() {
    let (page, tracker, element) = setup(OUT);
    let (calls, cb) = recording_callback();

    tracker.init(element, BindingValue::new(cb)).unwrap();
    assert!(calls.borrow().is_empty());

    play(&page, element, &[OUT, OUT, IN, IN, OUT]);

    assert_eq!(flags(&calls), vec![true, false]);
    assert!(calls.borrow().iter().all(|(e, _)| *e == element));
    assert_eq!(tracker.state(element), Some(false));
}

#[test]
fn test_initially_visible_element_fires_on_bind() {
    let (_page, tracker, element) = setup(IN);
    let (calls, cb) = recording_callback();

    tracker.init(element, BindingValue::new(cb)).unwrap();

    assert_eq!(flags(&calls), vec![true]);
    assert_eq!(tracker.state(element), Some(true));
}

#[test]
fn test_fire_once_stops_after_first_transition() {
    let (page, tracker, element) = setup(OUT);
    let (calls, cb) = recording_callback();

    let value = BindingValue::new(cb)
        .with_json_options(r#"{ "fireOnce": true }"#)
        .unwrap();
    tracker.init(element, value).unwrap();

    play(&page, element, &[OUT, IN, OUT, IN, OUT, IN]);

    assert_eq!(flags(&calls), vec![true]);
    assert!(!tracker.is_bound(element));
    assert_eq!(tracker.state_count(), 0);
    assert_eq!(page.scroll_listener_count(), 0);
}

#[test]
fn test_fire_once_string_form() {
    let (page, tracker, element) = setup(IN);
    let (calls, cb) = recording_callback();

    let value = BindingValue::new(cb)
        .with_json_options(r#"{ "fireOnce": "true" }"#)
        .unwrap();
    tracker.init(element, value).unwrap();
    play(&page, element, &[OUT, IN]);

    assert_eq!(flags(&calls), vec![true]);
}

#[test]
fn test_rebind_after_fire_once() {
    let (page, tracker, element) = setup(OUT);
    let (calls, cb) = recording_callback();
    let options = BindingOptions::new().with_fire_once(true);

    tracker
        .bind(element, Handler::Callback(Rc::clone(&cb)), options)
        .unwrap();
    play(&page, element, &[IN]);
    assert!(!tracker.is_bound(element));

    // Fresh binding starts from an unknown state, so being in view fires again
    tracker.bind(element, Handler::Callback(cb), options).unwrap();
    assert_eq!(flags(&calls), vec![true, true]);
}

#[test]
fn test_rebinding_keeps_one_disposal_hook() {
    let (page, tracker, element) = setup(IN);
    let (calls, cb) = recording_callback();
    let options = BindingOptions::new().with_fire_once(true);

    // Each one-shot bind fires at once and tears itself down
    for _ in 0..100 {
        tracker
            .bind(element, Handler::Callback(Rc::clone(&cb)), options)
            .unwrap();
        assert!(!tracker.is_bound(element));
    }
    assert_eq!(calls.borrow().len(), 100);
    assert_eq!(page.dispose_callback_count(element), 1);

    tracker
        .bind(element, Handler::Callback(cb), BindingOptions::default())
        .unwrap();
    assert_eq!(page.dispose_callback_count(element), 1);

    page.remove_element(element);
    assert!(!tracker.is_bound(element));
    assert_eq!(page.scroll_listener_count(), 0);
}

// =============================================================================
// Reactive cell strategy
// =============================================================================

#[test]
fn test_cell_follows_visibility() {
    let (page, tracker, element) = setup(OUT);
    let graph = ReactiveGraph::shared();
    let visible = State::new_in(&graph, false);

    let observed = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&observed);
    let signal = visible.signal();
    graph.borrow_mut().create_effect(move |g| {
        log.borrow_mut().push(g.get(signal).unwrap_or(false));
    });

    tracker
        .init(element, BindingValue::new(visible.clone()))
        .unwrap();
    play(&page, element, &[OUT, IN, IN, OUT, OUT]);

    assert_eq!(*observed.borrow(), vec![false, true, false]);
    assert_eq!(visible.version(), 2);
    assert!(!visible.get());
    // Cells carry their own state; the registry stays empty
    assert_eq!(tracker.state(element), None);
}

#[test]
fn test_cell_already_consistent_is_not_written() {
    let (page, tracker, element) = setup(IN);
    let graph = ReactiveGraph::shared();
    let visible = State::new_in(&graph, true);

    tracker
        .init(element, BindingValue::new(visible.clone()))
        .unwrap();
    page.dispatch_scroll();

    assert!(visible.get());
    assert_eq!(visible.version(), 0);
}

#[test]
fn test_cell_fire_once() {
    let (page, tracker, element) = setup(OUT);
    let graph = ReactiveGraph::shared();
    let visible = State::new_in(&graph, false);

    tracker
        .bind(
            element,
            Handler::cell(visible.clone()),
            BindingOptions::new().with_fire_once(true),
        )
        .unwrap();
    play(&page, element, &[IN, OUT, IN]);

    assert!(visible.get());
    assert_eq!(visible.version(), 1);
}

#[test]
fn test_custom_cell_through_trait_object() {
    struct Shared(Rc<RefCell<Vec<bool>>>);
    impl ReactiveCell for Shared {
        fn get(&self) -> bool {
            self.0.borrow().last().copied().unwrap_or(false)
        }
        fn set(&self, value: bool) {
            self.0.borrow_mut().push(value);
        }
    }

    let (page, tracker, element) = setup(OUT);
    let writes = Rc::new(RefCell::new(Vec::new()));
    let cell: Rc<dyn ReactiveCell> = Rc::new(Shared(Rc::clone(&writes)));

    tracker.init(element, BindingValue::new(cell)).unwrap();
    play(&page, element, &[IN, OUT]);

    assert_eq!(*writes.borrow(), vec![true, false]);
}

// =============================================================================
// Options
// =============================================================================

#[test]
fn test_top_in_view_with_absolute_pad() {
    let (page, tracker, element) = setup(Bounds::vertical(900.0, 1200.0));
    let (calls, cb) = recording_callback();

    let options = RawBindingOptions {
        offset: Some("top-in-view".to_string()),
        pad: Some(50.0),
        ..Default::default()
    };
    tracker
        .init(element, BindingValue::new(cb).with_options(options))
        .unwrap();

    // Padded top at 830
    page.scroll_by(120.0);
    assert!(calls.borrow().is_empty());
    // Padded top at 800
    page.scroll_by(30.0);
    assert_eq!(flags(&calls), vec![true]);
    // Padded top above the viewport, element body still visible
    page.scroll_by(900.0);
    assert_eq!(flags(&calls), vec![true, false]);
}

#[test]
fn test_bottom_in_view() {
    let (page, tracker, element) = setup(Bounds::vertical(600.0, 1000.0));
    let (calls, cb) = recording_callback();

    tracker
        .bind(
            element,
            Handler::Callback(cb),
            BindingOptions::new().with_offset(Offset::BottomInView),
        )
        .unwrap();
    assert!(calls.borrow().is_empty());

    page.scroll_by(200.0);
    assert_eq!(flags(&calls), vec![true]);
}

#[test]
fn test_defer_waits_for_next_turn() {
    let (page, tracker, element) = setup(IN);
    let (calls, cb) = recording_callback();

    let value = BindingValue::new(cb)
        .with_json_options(r#"{ "defer": true }"#)
        .unwrap();
    tracker.init(element, value).unwrap();

    assert!(tracker.is_bound(element));
    assert!(!tracker.is_attached(element));
    assert_eq!(page.scroll_listener_count(), 0);
    assert!(calls.borrow().is_empty());

    page.run_pending_tasks();
    assert!(tracker.is_attached(element));
    assert_eq!(flags(&calls), vec![true]);
}

#[test]
fn test_defer_reads_geometry_from_next_turn() {
    let (page, tracker, element) = setup(OUT);
    let (calls, cb) = recording_callback();

    tracker
        .bind(
            element,
            Handler::Callback(cb),
            BindingOptions::new().with_defer(true),
        )
        .unwrap();
    // Layout settles after bind but before the deferred turn
    page.set_bounds(element, IN);
    page.run_pending_tasks();

    assert_eq!(flags(&calls), vec![true]);
}

#[test]
fn test_unbind_before_deferred_turn_never_attaches() {
    let (page, tracker, element) = setup(IN);
    let (calls, cb) = recording_callback();

    tracker
        .bind(
            element,
            Handler::Callback(cb),
            BindingOptions::new().with_defer(true),
        )
        .unwrap();
    page.remove_element(element);
    page.run_pending_tasks();

    assert_eq!(page.scroll_listener_count(), 0);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_effect_can_bind_next_element() {
    let (page, tracker, sentinel) = setup(OUT);
    let next = page.create_element(IN);
    let graph = ReactiveGraph::shared();
    let sentinel_visible = State::new_in(&graph, false);
    let next_visible = State::new_in(&graph, false);

    // Load the next item once the sentinel shows up
    let signal = sentinel_visible.signal();
    let handle = tracker.clone();
    let cell = next_visible.clone();
    create_effect_in(&graph, move |g| {
        if g.get(signal) == Some(true) && !handle.is_bound(next) {
            handle.init(next, BindingValue::new(cell.clone())).unwrap();
        }
    });

    tracker
        .init(sentinel, BindingValue::new(sentinel_visible.clone()))
        .unwrap();
    assert!(!tracker.is_bound(next));

    play(&page, sentinel, &[IN]);
    assert!(sentinel_visible.get());
    assert!(tracker.is_attached(next));
    assert!(next_visible.get());
    assert_eq!(next_visible.version(), 1);

    play(&page, next, &[OUT]);
    assert!(!next_visible.get());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unsupported_handler_installs_nothing() {
    let (page, tracker, element) = setup(IN);

    let err = tracker
        .init(element, BindingValue::new("not a handler"))
        .unwrap_err();

    assert!(matches!(err, InViewError::UnsupportedHandler(_)));
    assert!(!tracker.is_bound(element));
    assert_eq!(page.scroll_listener_count(), 0);
}

#[test]
fn test_bare_closure_needs_callback_wrapper() {
    let (page, tracker, element) = setup(IN);
    let hits = Rc::new(Cell::new(0));

    let counter = Rc::clone(&hits);
    let bare = move |_: ElementId, _: InViewChange| counter.set(counter.get() + 1);
    let err = tracker
        .init(element, BindingValue::new(bare))
        .unwrap_err();
    assert!(matches!(err, InViewError::UnsupportedHandler(_)));
    assert_eq!(page.scroll_listener_count(), 0);
    assert_eq!(page.dispose_callback_count(element), 0);

    let counter = Rc::clone(&hits);
    tracker
        .init(
            element,
            BindingValue::callback(move |_, _| counter.set(counter.get() + 1)),
        )
        .unwrap();
    assert_eq!(hits.get(), 1);
    assert_eq!(page.dispose_callback_count(element), 1);
}

#[test]
fn test_invalid_mode_rejected_at_bind() {
    let (page, tracker, element) = setup(IN);
    let (calls, cb) = recording_callback();

    let value = BindingValue::new(cb)
        .with_json_options(r#"{ "offset": "sideways" }"#)
        .unwrap();
    let err = tracker.init(element, value).unwrap_err();

    assert!(matches!(err, InViewError::InvalidMode(ref mode) if mode == "sideways"));
    assert_eq!(page.scroll_listener_count(), 0);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_double_bind_rejected() {
    let (page, tracker, element) = setup(OUT);
    let (_calls, cb) = recording_callback();

    tracker
        .init(element, BindingValue::new(Rc::clone(&cb)))
        .unwrap();
    let err = tracker.init(element, BindingValue::new(cb)).unwrap_err();

    assert!(matches!(err, InViewError::DoubleBind(e) if e == element));
    assert_eq!(page.scroll_listener_count(), 1);
    assert_eq!(tracker.binding_count(), 1);
}

#[test]
fn test_unknown_element_rejected() {
    let (page, tracker, element) = setup(IN);
    let (_calls, cb) = recording_callback();
    page.remove_element(element);

    let err = tracker.init(element, BindingValue::new(cb)).unwrap_err();
    assert!(matches!(err, InViewError::UnknownElement(_)));
}

// =============================================================================
// Teardown
// =============================================================================

#[test]
fn test_disposal_stops_notifications() {
    let (page, tracker, element) = setup(OUT);
    let (calls, cb) = recording_callback();

    tracker.init(element, BindingValue::new(cb)).unwrap();
    play(&page, element, &[IN]);

    let teardown = tracker.remove_listener(element);
    teardown();
    play(&page, element, &[OUT, IN, OUT]);

    assert_eq!(flags(&calls), vec![true]);
    assert!(!tracker.is_bound(element));
    assert_eq!(tracker.state(element), None);

    // Running the thunk again is a silent no-op
    teardown();
}

#[test]
fn test_element_removal_unbinds() {
    let (page, tracker, element) = setup(OUT);
    let other = page.create_element(OUT);
    let (calls, cb) = recording_callback();

    tracker
        .init(element, BindingValue::new(Rc::clone(&cb)))
        .unwrap();
    tracker.init(other, BindingValue::new(cb)).unwrap();
    assert_eq!(page.scroll_listener_count(), 2);

    page.remove_element(element);
    assert_eq!(page.scroll_listener_count(), 1);

    play(&page, other, &[IN]);
    assert_eq!(*calls.borrow(), vec![(other, true)]);
}

#[test]
fn test_callback_can_unbind_itself() {
    let (page, tracker, element) = setup(OUT);
    let hits = Rc::new(RefCell::new(0));

    let counter = Rc::clone(&hits);
    let handle = tracker.clone();
    let cb = callback(move |element, _| {
        *counter.borrow_mut() += 1;
        handle.unbind(element);
    });
    tracker.init(element, BindingValue::new(cb)).unwrap();

    play(&page, element, &[IN, OUT, IN]);
    assert_eq!(*hits.borrow(), 1);
    assert_eq!(tracker.state_count(), 0);
}

#[test]
fn test_dropped_tracker_leaves_inert_listeners() {
    let (page, tracker, element) = setup(OUT);
    let (calls, cb) = recording_callback();

    tracker.init(element, BindingValue::new(cb)).unwrap();
    drop(tracker);

    play(&page, element, &[IN]);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_independent_trackers() {
    init_tracing();
    let page_a = Page::with_screen_height(VIEWPORT);
    let page_b = Page::with_screen_height(VIEWPORT);
    let tracker_a = InViewTracker::new(page_a.clone());
    let tracker_b = InViewTracker::new(page_b.clone());
    let a = page_a.create_element(OUT);
    let b = page_b.create_element(OUT);
    let (calls, cb) = recording_callback();

    tracker_a
        .init(a, BindingValue::new(Rc::clone(&cb)))
        .unwrap();
    tracker_b.init(b, BindingValue::new(cb)).unwrap();

    play(&page_a, a, &[IN]);
    assert_eq!(*calls.borrow(), vec![(a, true)]);
    assert_eq!(tracker_a.state_count(), 1);
    assert_eq!(tracker_b.state(b), None);
}

#[test]
fn test_evaluate_matches_scroll_tick() {
    let (page, tracker, element) = setup(OUT);
    let (calls, cb) = recording_callback();
    tracker.init(element, BindingValue::new(cb)).unwrap();

    page.set_bounds(element, IN);
    assert_eq!(tracker.evaluate(element), Some(true));
    assert_eq!(tracker.evaluate(element), Some(true));
    assert_eq!(flags(&calls), vec![true]);

    let stranger = page.create_element(IN);
    assert_eq!(tracker.evaluate(stranger), None);
}

#[test]
fn test_evaluate_returns_visibility_the_handler_saw() {
    let (page, tracker, element) = setup(OUT);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&seen);
    let host = page.clone();
    let cb = callback(move |element, change| {
        log.borrow_mut().push(change.is_inview);
        // The handler collapses the element out of view
        host.set_bounds(element, OUT);
    });
    tracker.init(element, BindingValue::new(cb)).unwrap();

    page.set_bounds(element, IN);
    assert_eq!(tracker.evaluate(element), Some(true));
    assert_eq!(tracker.evaluate(element), Some(false));
    assert_eq!(*seen.borrow(), vec![true, false]);
}
