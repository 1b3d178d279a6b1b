//! Binding error types

use inview_core::ElementId;
use thiserror::Error;

/// Errors raised while binding an element
///
/// All of these describe static misconfiguration detected at bind time.
/// None of them is transient, so callers should not retry.
#[derive(Error, Debug)]
pub enum InViewError {
    /// `offset` is not one of the known modes
    #[error("Invalid offset mode {0:?}: expected \"in-view\", \"top-in-view\" or \"bottom-in-view\"")]
    InvalidMode(String),

    /// The handler is neither a reactive cell nor a callback
    #[error("Unsupported handler: {0} is neither a reactive cell nor a callback")]
    UnsupportedHandler(String),

    /// The element already has a live binding
    #[error("Element {0:?} is already bound; unbind it before binding again")]
    DoubleBind(ElementId),

    /// The element is not part of the page
    #[error("Element {0:?} is not on the page")]
    UnknownElement(ElementId),

    /// Declarative options could not be parsed
    #[error("Invalid binding options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

/// Result type for binding operations
pub type Result<T> = std::result::Result<T, InViewError>;
