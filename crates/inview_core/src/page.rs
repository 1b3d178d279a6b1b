//! Host page environment
//!
//! [`Page`] stands in for the browser window and document the tracker talks
//! to: it owns the rendered elements and their live bounds, the page-wide
//! scroll event source, per-element disposal callbacks, window metrics and
//! the next-turn task queue.
//!
//! `Page` is a cheap-clone handle. Each field sits behind its own cell and
//! every method borrows only for the duration of the call, so listeners and
//! disposal callbacks are free to call back into the page.
//!
//! ```rust
//! use inview_core::{Bounds, Page};
//! use std::rc::Rc;
//!
//! let page = Page::with_screen_height(800.0);
//! let card = page.create_element(Bounds::vertical(900.0, 1000.0));
//!
//! page.add_scroll_listener(Rc::new(|| println!("scrolled")));
//! page.scroll_by(200.0);
//! assert_eq!(page.bounding_rect(card).map(|b| b.top()), Some(700.0));
//! ```

use crate::element::{Bounds, ElementId};
use crate::scheduler::TaskQueue;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

new_key_type! {
    /// Handle of a registered scroll listener
    pub struct ListenerId;
}

/// Page-wide scroll handler
pub type ScrollListener = Rc<dyn Fn()>;

/// Callback run when an element is removed from the page
pub type DisposeCallback = Box<dyn FnOnce()>;

struct ElementNode {
    bounds: Bounds,
    dispose: SmallVec<[DisposeCallback; 2]>,
}

struct PageState {
    elements: RefCell<SlotMap<ElementId, ElementNode>>,
    listeners: RefCell<SlotMap<ListenerId, ScrollListener>>,
    /// Registration order of `listeners`
    listener_order: RefCell<Vec<ListenerId>>,
    tasks: TaskQueue,
    outer_height: Cell<Option<f32>>,
    screen_height: Cell<f32>,
}

/// Shared handle to the host page
#[derive(Clone)]
pub struct Page {
    inner: Rc<PageState>,
}

impl Default for Page {
    fn default() -> Self {
        Self::with_screen_height(0.0)
    }
}

impl Page {
    /// Create an empty page with no window metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty page whose screen is `height` pixels tall
    pub fn with_screen_height(height: f32) -> Self {
        Self {
            inner: Rc::new(PageState {
                elements: RefCell::new(SlotMap::with_key()),
                listeners: RefCell::new(SlotMap::with_key()),
                listener_order: RefCell::new(Vec::new()),
                tasks: TaskQueue::new(),
                outer_height: Cell::new(None),
                screen_height: Cell::new(height),
            }),
        }
    }

    // =========================================================================
    // Elements
    // =========================================================================

    /// Add an element with the given viewport-relative bounds
    pub fn create_element(&self, bounds: Bounds) -> ElementId {
        self.inner.elements.borrow_mut().insert(ElementNode {
            bounds,
            dispose: SmallVec::new(),
        })
    }

    /// Check whether the element is still part of the page
    pub fn contains(&self, element: ElementId) -> bool {
        self.inner.elements.borrow().contains_key(element)
    }

    /// Live bounding rectangle of an element
    ///
    /// Returns None once the element has been removed.
    pub fn bounding_rect(&self, element: ElementId) -> Option<Bounds> {
        self.inner
            .elements
            .borrow()
            .get(element)
            .map(|node| node.bounds)
    }

    /// Replace an element's bounds, as after a reflow
    ///
    /// Returns false if the element is not on the page.
    pub fn set_bounds(&self, element: ElementId, bounds: Bounds) -> bool {
        match self.inner.elements.borrow_mut().get_mut(element) {
            Some(node) => {
                node.bounds = bounds;
                true
            }
            None => false,
        }
    }

    /// Register a callback to run when `element` is removed
    ///
    /// Returns false (and drops the callback) if the element is not on the page.
    pub fn add_dispose_callback(
        &self,
        element: ElementId,
        callback: impl FnOnce() + 'static,
    ) -> bool {
        match self.inner.elements.borrow_mut().get_mut(element) {
            Some(node) => {
                node.dispose.push(Box::new(callback));
                true
            }
            None => false,
        }
    }

    /// Number of disposal callbacks waiting on `element`
    pub fn dispose_callback_count(&self, element: ElementId) -> usize {
        self.inner
            .elements
            .borrow()
            .get(element)
            .map_or(0, |node| node.dispose.len())
    }

    /// Remove an element, running its disposal callbacks first
    ///
    /// Callbacks run in registration order while the element is still
    /// present. Returns false if the element was not on the page.
    pub fn remove_element(&self, element: ElementId) -> bool {
        let callbacks = match self.inner.elements.borrow_mut().get_mut(element) {
            Some(node) => std::mem::take(&mut node.dispose),
            None => return false,
        };

        tracing::debug!(?element, callbacks = callbacks.len(), "disposing element");
        for callback in callbacks {
            callback();
        }

        self.inner.elements.borrow_mut().remove(element);
        true
    }

    /// Number of elements on the page
    pub fn element_count(&self) -> usize {
        self.inner.elements.borrow().len()
    }

    // =========================================================================
    // Window metrics
    // =========================================================================

    /// Set the outer window height; `None` when the host cannot report it
    pub fn set_outer_height(&self, height: Option<f32>) {
        self.inner.outer_height.set(height);
    }

    pub fn set_screen_height(&self, height: f32) {
        self.inner.screen_height.set(height);
    }

    /// Height of the vertical viewport
    ///
    /// The outer window height when it is known and non-zero, else the
    /// screen height.
    pub fn viewport_height(&self) -> f32 {
        match self.inner.outer_height.get() {
            Some(height) if height != 0.0 => height,
            _ => self.inner.screen_height.get(),
        }
    }

    // =========================================================================
    // Scroll events
    // =========================================================================

    /// Attach a page-wide scroll listener
    pub fn add_scroll_listener(&self, listener: ScrollListener) -> ListenerId {
        let id = self.inner.listeners.borrow_mut().insert(listener);
        self.inner.listener_order.borrow_mut().push(id);
        id
    }

    /// Detach a scroll listener; false if it was not attached
    pub fn remove_scroll_listener(&self, id: ListenerId) -> bool {
        let removed = self.inner.listeners.borrow_mut().remove(id).is_some();
        if removed {
            self.inner.listener_order.borrow_mut().retain(|l| *l != id);
        }
        removed
    }

    pub fn scroll_listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Deliver one scroll event
    ///
    /// Listeners attached when the dispatch starts are called in registration
    /// order; one removed by an earlier listener in the same dispatch is
    /// skipped. Returns the number of listeners called.
    pub fn dispatch_scroll(&self) -> usize {
        let order = self.inner.listener_order.borrow().clone();
        let mut called = 0;
        for id in order {
            let listener = self.inner.listeners.borrow().get(id).cloned();
            if let Some(listener) = listener {
                listener();
                called += 1;
            }
        }
        called
    }

    /// Scroll the document down by `dy` pixels and deliver a scroll event
    ///
    /// Every element moves up by `dy` relative to the viewport.
    pub fn scroll_by(&self, dy: f32) -> usize {
        for node in self.inner.elements.borrow_mut().values_mut() {
            node.bounds = node.bounds.offset_y(-dy);
        }
        self.dispatch_scroll()
    }

    // =========================================================================
    // Task queue
    // =========================================================================

    /// Queue a task for the next turn of the host loop
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.inner.tasks.defer(task);
    }

    /// Run the tasks queued for this turn
    pub fn run_pending_tasks(&self) -> usize {
        self.inner.tasks.run_pending()
    }

    pub fn pending_task_count(&self) -> usize {
        self.inner.tasks.len()
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("elements", &self.element_count())
            .field("scroll_listeners", &self.scroll_listener_count())
            .field("viewport_height", &self.viewport_height())
            .field("tasks", &self.inner.tasks)
            .finish()
    }
}
