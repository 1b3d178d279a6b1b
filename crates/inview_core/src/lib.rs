//! inview core primitives
//!
//! The host-side pieces the visibility tracker is built against:
//!
//! - **Reactive cells**: a small signal graph and the [`State`] cell handle
//! - **Elements**: stable [`ElementId`] handles and their [`Bounds`]
//! - **Page**: live element geometry, the page-wide scroll event source,
//!   disposal callbacks and window metrics
//! - **Scheduler**: a next-turn [`TaskQueue`]
//!
//! Everything is single-threaded and driven from host event callbacks.
//!
//! # Example
//!
//! ```rust
//! use inview_core::{Bounds, Page, ReactiveGraph, State};
//! use std::rc::Rc;
//!
//! let graph = ReactiveGraph::shared();
//! let seen = State::new_in(&graph, false);
//!
//! let page = Page::with_screen_height(600.0);
//! let banner = page.create_element(Bounds::vertical(700.0, 760.0));
//!
//! let listener_page = page.clone();
//! let cell = seen.clone();
//! page.add_scroll_listener(Rc::new(move || {
//!     if let Some(bounds) = listener_page.bounding_rect(banner) {
//!         cell.set(bounds.top() < listener_page.viewport_height());
//!     }
//! }));
//!
//! page.scroll_by(200.0);
//! assert!(seen.get());
//! ```

pub mod element;
pub mod page;
pub mod reactive;
pub mod scheduler;

pub use element::{Bounds, ElementId};
pub use page::{DisposeCallback, ListenerId, Page, ScrollListener};
pub use reactive::{
    create_effect_in, Effect, EffectId, ReactiveGraph, SharedReactiveGraph, Signal, SignalId, State,
};
pub use scheduler::TaskQueue;
