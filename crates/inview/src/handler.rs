//! Notification handlers
//!
//! A binding notifies either a reactive cell or a plain callback. The kind is
//! resolved once at bind time into [`Handler`]; declaratively supplied values
//! arrive type-erased and are resolved with [`Handler::from_any`].

use crate::error::{InViewError, Result};
use inview_core::{ElementId, State};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Payload delivered to callback handlers on every visibility transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InViewChange {
    /// Whether the element is now in view
    pub is_inview: bool,
}

/// Callback notified with the element and its new visibility
pub type Callback = Rc<dyn Fn(ElementId, InViewChange)>;

/// Wrap a closure as a [`Callback`]
pub fn callback(f: impl Fn(ElementId, InViewChange) + 'static) -> Callback {
    Rc::new(f)
}

/// A readable and writable boolean cell the host can observe
pub trait ReactiveCell {
    fn get(&self) -> bool;
    fn set(&self, value: bool);
}

impl ReactiveCell for State<bool> {
    fn get(&self) -> bool {
        State::get(self)
    }

    fn set(&self, value: bool) {
        State::set(self, value);
    }
}

/// How a binding reports visibility changes
#[derive(Clone)]
pub enum Handler {
    /// Keep a boolean cell in sync; the cell is its own state memory
    Cell(Rc<dyn ReactiveCell>),
    /// Call back on transitions; state memory lives in the tracker
    Callback(Callback),
}

impl Handler {
    pub fn cell(cell: impl ReactiveCell + 'static) -> Self {
        Handler::Cell(Rc::new(cell))
    }

    pub fn callback(f: impl Fn(ElementId, InViewChange) + 'static) -> Self {
        Handler::Callback(Rc::new(f))
    }

    /// Resolve a type-erased handler value
    ///
    /// Accepts a `State<bool>`, an `Rc<dyn ReactiveCell>` or a [`Callback`].
    /// A bare closure has an anonymous type and cannot be recognised here;
    /// wrap it with [`callback`] first.
    pub fn from_any(value: &dyn Any) -> Result<Self> {
        if let Some(state) = value.downcast_ref::<State<bool>>() {
            return Ok(Handler::Cell(Rc::new(state.clone())));
        }
        if let Some(cell) = value.downcast_ref::<Rc<dyn ReactiveCell>>() {
            return Ok(Handler::Cell(Rc::clone(cell)));
        }
        if let Some(callback) = value.downcast_ref::<Callback>() {
            return Ok(Handler::Callback(Rc::clone(callback)));
        }
        Err(InViewError::UnsupportedHandler(describe(value).to_string()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Cell(_) => "cell",
            Handler::Callback(_) => "callback",
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler::{}", self.kind())
    }
}

/// Best-effort name for a rejected handler value
fn describe(value: &dyn Any) -> &'static str {
    if value.is::<String>() || value.is::<&'static str>() {
        "a string"
    } else if value.is::<bool>() {
        "a boolean"
    } else if value.is::<f64>() || value.is::<f32>() || value.is::<i32>() || value.is::<i64>() {
        "a number"
    } else if value.is::<State<i32>>() || value.is::<State<String>>() {
        "a non-boolean state"
    } else {
        "a value"
    }
}
