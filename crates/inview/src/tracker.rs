//! The visibility tracker
//!
//! [`InViewTracker`] owns the registries for one page. Binding an element
//! installs one page-wide scroll listener for it that re-reads the element's
//! geometry on every scroll event and notifies the handler when visibility
//! flips. Every binding evaluates once as soon as its listener attaches.
//!
//! Scroll listeners and disposal callbacks only hold weak references to the
//! tracker, so dropping the last tracker handle turns them into no-ops.

use crate::error::{InViewError, Result};
use crate::handler::{Handler, InViewChange};
use crate::options::{BindingOptions, RawBindingOptions};
use crate::registry::{BindingId, Registry};
use crate::strategy;
use crate::viewport::is_in_viewport;
use inview_core::{ElementId, Page};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A declaratively supplied binding value
///
/// Either a bare handler, or a handler with options. The handler is
/// type-erased, as hosts hand it over, and is resolved at bind time.
pub struct BindingValue {
    handler: Box<dyn Any>,
    options: RawBindingOptions,
}

impl BindingValue {
    /// A bare handler with default options
    ///
    /// `handler` must be a `State<bool>`, an `Rc<dyn ReactiveCell>` or a
    /// [`Callback`](crate::Callback). Closures go through
    /// [`callback`](crate::callback) or [`BindingValue::callback`]; passed
    /// directly they are rejected at bind time as unsupported.
    pub fn new(handler: impl Any) -> Self {
        Self {
            handler: Box::new(handler),
            options: RawBindingOptions::default(),
        }
    }

    /// A callback handler with default options
    pub fn callback(f: impl Fn(ElementId, InViewChange) + 'static) -> Self {
        Self::new(crate::handler::callback(f))
    }

    pub fn with_options(mut self, options: RawBindingOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach options given as a JSON object
    pub fn with_json_options(self, json: &str) -> Result<Self> {
        Ok(self.with_options(RawBindingOptions::from_json(json)?))
    }
}

impl fmt::Debug for BindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingValue")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

struct TrackerState {
    page: Page,
    registry: RefCell<Registry>,
}

/// Tracks element visibility on one page
#[derive(Clone)]
pub struct InViewTracker {
    inner: Rc<TrackerState>,
}

impl InViewTracker {
    pub fn new(page: Page) -> Self {
        Self {
            inner: Rc::new(TrackerState {
                page,
                registry: RefCell::new(Registry::new()),
            }),
        }
    }

    pub fn page(&self) -> &Page {
        &self.inner.page
    }

    fn downgrade(&self) -> Weak<TrackerState> {
        Rc::downgrade(&self.inner)
    }

    fn upgrade(weak: &Weak<TrackerState>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    // =========================================================================
    // Binding
    // =========================================================================

    /// Bind an element from a declarative value
    ///
    /// Options are validated and the handler kind resolved before anything is
    /// installed, so a rejected value leaves no trace.
    pub fn init(&self, element: ElementId, value: BindingValue) -> Result<()> {
        let resolved = value.options.resolve().and_then(|options| {
            Handler::from_any(value.handler.as_ref()).map(|handler| (options, handler))
        });

        match resolved {
            Ok((options, handler)) => self.bind(element, handler, options),
            Err(err) => {
                tracing::warn!(?element, %err, "rejected binding");
                Err(err)
            }
        }
    }

    /// Bind an element with an already-resolved handler
    ///
    /// The first bind of an element registers teardown with the page, so the
    /// binding goes away when the element is removed. Unless `options.defer`
    /// is set, the listener attaches and evaluates before this returns;
    /// otherwise both happen on the page's next turn.
    pub fn bind(&self, element: ElementId, handler: Handler, options: BindingOptions) -> Result<()> {
        let page = &self.inner.page;
        if !page.contains(element) {
            return Err(InViewError::UnknownElement(element));
        }

        let kind = handler.kind();
        let (id, needs_hook) = {
            let mut registry = self.inner.registry.borrow_mut();
            let id = registry.insert(element, handler, options)?;
            (id, registry.hook_disposal(element))
        };

        // One hook per element; it unbinds whatever binding is current
        if needs_hook {
            page.add_dispose_callback(element, self.dispose_hook(element));
        }

        tracing::debug!(
            ?element,
            handler = kind,
            offset = %options.offset,
            pad = ?options.pad,
            fire_once = options.fire_once,
            defer = options.defer,
            "bound element"
        );

        if options.defer {
            let weak = self.downgrade();
            page.defer(move || {
                if let Some(tracker) = Self::upgrade(&weak) {
                    tracker.bind_listener(id);
                }
            });
        } else {
            self.bind_listener(id);
        }
        Ok(())
    }

    /// Attach the scroll listener for a binding and evaluate once
    ///
    /// No-op for a binding that was removed or already attached.
    fn bind_listener(&self, id: BindingId) {
        let pending = self
            .inner
            .registry
            .borrow()
            .get(id)
            .is_some_and(|binding| binding.listener.is_none());
        if !pending {
            return;
        }

        let weak = self.downgrade();
        let listener = self.inner.page.add_scroll_listener(Rc::new(move || {
            if let Some(tracker) = Self::upgrade(&weak) {
                tracker.tick(id);
            }
        }));
        self.inner.registry.borrow_mut().set_listener(id, listener);

        self.tick(id);
    }

    /// Teardown thunk for an element
    ///
    /// Running it unbinds whatever binding the element has at that moment;
    /// it is a silent no-op when there is none.
    pub fn remove_listener(&self, element: ElementId) -> impl Fn() + 'static {
        let weak = self.downgrade();
        move || {
            if let Some(tracker) = Self::upgrade(&weak) {
                tracker.unbind(element);
            }
        }
    }

    /// Disposal callback registered with the page, once per element
    fn dispose_hook(&self, element: ElementId) -> impl FnOnce() + 'static {
        let weak = self.downgrade();
        move || {
            if let Some(tracker) = Self::upgrade(&weak) {
                tracker.unbind(element);
                tracker.inner.registry.borrow_mut().release_disposal(element);
            }
        }
    }

    /// Remove an element's binding, its scroll listener and its state
    ///
    /// Returns false if the element was not bound.
    pub fn unbind(&self, element: ElementId) -> bool {
        let id = self.inner.registry.borrow().binding_for(element);
        match id {
            Some(id) => self.unbind_binding(id),
            None => false,
        }
    }

    fn unbind_binding(&self, id: BindingId) -> bool {
        let removed = self.inner.registry.borrow_mut().remove(id);
        let Some(binding) = removed else {
            return false;
        };

        if let Some(listener) = binding.listener {
            self.inner.page.remove_scroll_listener(listener);
        }
        tracing::debug!(element = ?binding.element, "unbound element");
        true
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// One scroll tick for one binding
    ///
    /// Returns the visibility the handler was evaluated against, or None if
    /// the binding is gone.
    fn tick(&self, id: BindingId) -> Option<bool> {
        let binding = self.inner.registry.borrow().get(id).cloned()?;
        let element = binding.element;
        let in_view = is_in_viewport(&self.inner.page, element, &binding.options);

        let fired = match &binding.handler {
            Handler::Cell(cell) => strategy::sync_cell(cell.as_ref(), in_view),
            Handler::Callback(callback) => {
                let previous = self.inner.registry.borrow().get_state(element);
                match strategy::transition(previous, in_view) {
                    Some(now) => {
                        self.inner.registry.borrow_mut().set_state(element, now);
                        callback(element, InViewChange { is_inview: now });
                        true
                    }
                    None => false,
                }
            }
        };

        if fired {
            tracing::trace!(?element, in_view, handler = binding.handler.kind(), "visibility changed");
            if binding.options.fire_once {
                tracing::debug!(?element, "one-shot binding fired, tearing down");
                self.unbind_binding(id);
            }
        }
        Some(in_view)
    }

    /// Evaluate an element's binding now, as a scroll event would
    ///
    /// Returns the visibility the handler saw, or None if the element has no
    /// attached binding.
    pub fn evaluate(&self, element: ElementId) -> Option<bool> {
        let id = {
            let registry = self.inner.registry.borrow();
            let id = registry.binding_for(element)?;
            registry.get(id)?.listener?;
            id
        };
        self.tick(id)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_bound(&self, element: ElementId) -> bool {
        self.inner.registry.borrow().binding_for(element).is_some()
    }

    /// Whether the element's scroll listener is attached (false while deferred)
    pub fn is_attached(&self, element: ElementId) -> bool {
        let registry = self.inner.registry.borrow();
        registry
            .binding_for(element)
            .and_then(|id| registry.get(id))
            .is_some_and(|binding| binding.listener.is_some())
    }

    /// Last visibility recorded for a callback binding
    pub fn state(&self, element: ElementId) -> Option<bool> {
        self.inner.registry.borrow().get_state(element)
    }

    pub fn binding_count(&self) -> usize {
        self.inner.registry.borrow().len()
    }

    pub fn state_count(&self) -> usize {
        self.inner.registry.borrow().state_count()
    }
}

impl fmt::Debug for InViewTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InViewTracker")
            .field("page", &self.inner.page)
            .field("bindings", &self.binding_count())
            .field("states", &self.state_count())
            .finish()
    }
}
