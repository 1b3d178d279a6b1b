//! Listener and visibility state registries
//!
//! Both registries are keyed by [`ElementId`]. Each element has at most one
//! [`Binding`]; its last observed visibility (used by callback handlers) is
//! evicted together with the binding. The registry also remembers which
//! elements already carry a disposal hook, so rebinding never adds another.

use crate::error::{InViewError, Result};
use crate::handler::Handler;
use crate::options::BindingOptions;
use inview_core::{ElementId, ListenerId};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Identity of one bind of one element
    ///
    /// Rebinding an element yields a fresh id, so deferred work and scroll
    /// listeners holding an old id can tell they are stale.
    pub struct BindingId;
}

/// A live element binding
#[derive(Clone, Debug)]
pub struct Binding {
    pub element: ElementId,
    pub handler: Handler,
    pub options: BindingOptions,
    /// Attached scroll listener; None while a deferred attach is pending
    pub listener: Option<ListenerId>,
}

/// Per-tracker binding and state storage
#[derive(Debug, Default)]
pub struct Registry {
    bindings: SlotMap<BindingId, Binding>,
    by_element: FxHashMap<ElementId, BindingId>,
    states: FxHashMap<ElementId, bool>,
    /// Elements whose page disposal callback points at this registry
    dispose_hooks: FxHashSet<ElementId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Visibility state
    // =========================================================================

    /// Last recorded visibility; None if never evaluated
    pub fn get_state(&self, element: ElementId) -> Option<bool> {
        self.states.get(&element).copied()
    }

    pub fn set_state(&mut self, element: ElementId, value: bool) {
        self.states.insert(element, value);
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    /// Add a binding for an element that has none
    pub fn insert(
        &mut self,
        element: ElementId,
        handler: Handler,
        options: BindingOptions,
    ) -> Result<BindingId> {
        if self.by_element.contains_key(&element) {
            return Err(InViewError::DoubleBind(element));
        }

        let id = self.bindings.insert(Binding {
            element,
            handler,
            options,
            listener: None,
        });
        self.by_element.insert(element, id);
        Ok(id)
    }

    pub fn get(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(id)
    }

    /// Current binding of an element
    pub fn binding_for(&self, element: ElementId) -> Option<BindingId> {
        self.by_element.get(&element).copied()
    }

    /// Record the scroll listener attached for a binding
    pub fn set_listener(&mut self, id: BindingId, listener: ListenerId) -> bool {
        match self.bindings.get_mut(id) {
            Some(binding) => {
                binding.listener = Some(listener);
                true
            }
            None => false,
        }
    }

    /// Remove a binding and the element's visibility state
    pub fn remove(&mut self, id: BindingId) -> Option<Binding> {
        let binding = self.bindings.remove(id)?;
        self.by_element.remove(&binding.element);
        self.states.remove(&binding.element);
        Some(binding)
    }

    // =========================================================================
    // Disposal hooks
    // =========================================================================

    /// Note that `element` gets a disposal hook; false if it already has one
    pub fn hook_disposal(&mut self, element: ElementId) -> bool {
        self.dispose_hooks.insert(element)
    }

    /// Forget the hook once the page has run it
    pub fn release_disposal(&mut self, element: ElementId) -> bool {
        self.dispose_hooks.remove(&element)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
