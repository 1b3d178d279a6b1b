//! inview - scroll-driven visibility tracking
//!
//! Tracks whether bound elements are within the vertical viewport and keeps
//! a reactive cell in sync, or calls back, whenever that flips.
//!
//! - **Geometry**: interval overlap, top-edge padding, edge selection by mode
//! - **Registries**: one binding and one last-known state per element
//! - **Strategies**: reactive cell sync or callback-on-transition
//! - **Binding**: option parsing, handler resolution, teardown on disposal
//!
//! # Example
//!
//! ```rust
//! use inview::{BindingValue, InViewTracker};
//! use inview_core::{Bounds, Page, ReactiveGraph, State};
//!
//! let page = Page::with_screen_height(800.0);
//! let tracker = InViewTracker::new(page.clone());
//!
//! let graph = ReactiveGraph::shared();
//! let footer_visible = State::new_in(&graph, false);
//! let footer = page.create_element(Bounds::vertical(1200.0, 1300.0));
//!
//! tracker.init(footer, BindingValue::new(footer_visible.clone()))?;
//! assert!(!footer_visible.get());
//!
//! page.scroll_by(500.0);
//! assert!(footer_visible.get());
//!
//! // Removing the element tears the binding down
//! page.remove_element(footer);
//! assert!(!tracker.is_bound(footer));
//! # Ok::<(), inview::InViewError>(())
//! ```
//!
//! # Callbacks and options
//!
//! ```rust
//! use inview::{callback, BindingValue, InViewTracker};
//! use inview_core::{Bounds, Page};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let page = Page::with_screen_height(800.0);
//! let tracker = InViewTracker::new(page.clone());
//! let hero = page.create_element(Bounds::vertical(900.0, 1100.0));
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let log = Rc::clone(&seen);
//! let value = BindingValue::new(callback(move |_, change| {
//!     log.borrow_mut().push(change.is_inview);
//! }))
//! .with_json_options(r#"{ "offset": "top-in-view", "fireOnce": "true" }"#)?;
//!
//! tracker.init(hero, value)?;
//! page.scroll_by(200.0);
//! page.scroll_by(-200.0);
//! page.scroll_by(200.0);
//! assert_eq!(*seen.borrow(), vec![true]);
//! # Ok::<(), inview::InViewError>(())
//! ```

pub mod error;
pub mod geometry;
pub mod handler;
pub mod options;
pub mod registry;
pub mod strategy;
pub mod tracker;
pub mod viewport;

#[cfg(test)]
mod tests;

pub use error::{InViewError, Result};
pub use geometry::{get_bottom, get_top, is_overlapping, is_percent};
pub use handler::{callback, Callback, Handler, InViewChange, ReactiveCell};
pub use options::{BindingOptions, FireOnce, Offset, RawBindingOptions};
pub use registry::{Binding, BindingId, Registry};
pub use tracker::{BindingValue, InViewTracker};
pub use viewport::{bounds_in_viewport, is_in_viewport};
