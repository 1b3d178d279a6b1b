//! Binding options
//!
//! [`BindingOptions`] is the typed configuration resolved once per element at
//! bind time. [`RawBindingOptions`] is the declarative surface it is resolved
//! from, deserializable from the same camelCase object hosts write in markup:
//!
//! ```rust
//! use inview::{Offset, RawBindingOptions};
//!
//! let raw = RawBindingOptions::from_json(
//!     r#"{ "offset": "top-in-view", "pad": 0.25, "fireOnce": "true" }"#,
//! )?;
//! let options = raw.resolve()?;
//!
//! assert_eq!(options.offset, Offset::TopInView);
//! assert_eq!(options.pad, Some(0.25));
//! assert!(options.fire_once);
//! assert!(!options.defer);
//! # Ok::<(), inview::InViewError>(())
//! ```

use crate::error::{InViewError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which edges of an element must reach the viewport for it to count as in view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Offset {
    /// Any part of the (padded) element
    #[default]
    InView,
    /// The (padded) top edge
    TopInView,
    /// The bottom edge
    BottomInView,
}

impl Offset {
    pub fn as_str(self) -> &'static str {
        match self {
            Offset::InView => "in-view",
            Offset::TopInView => "top-in-view",
            Offset::BottomInView => "bottom-in-view",
        }
    }
}

impl FromStr for Offset {
    type Err = InViewError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "in-view" => Ok(Offset::InView),
            "top-in-view" => Ok(Offset::TopInView),
            "bottom-in-view" => Ok(Offset::BottomInView),
            other => Err(InViewError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved per-binding configuration
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BindingOptions {
    /// Edge selection mode
    pub offset: Offset,
    /// Fraction of element height (see [`crate::geometry::is_percent`]) or
    /// absolute pixels added to the top edge
    pub pad: Option<f32>,
    /// Tear the binding down after its first state change
    pub fire_once: bool,
    /// Attach on the next turn of the host loop instead of during bind
    pub defer: bool,
}

impl BindingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, offset: Offset) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_pad(mut self, pad: f32) -> Self {
        self.pad = Some(pad);
        self
    }

    pub fn with_fire_once(mut self, fire_once: bool) -> Self {
        self.fire_once = fire_once;
        self
    }

    pub fn with_defer(mut self, defer: bool) -> Self {
        self.defer = defer;
        self
    }
}

/// `fireOnce` as written declaratively
///
/// Hosts write a boolean or a string. Any other JSON value is kept so the
/// binding still parses; it just leaves one-shot mode off.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FireOnce {
    Bool(bool),
    Text(String),
    Other(serde_json::Value),
}

impl FireOnce {
    /// Only `true` and `"true"` enable one-shot mode
    pub fn is_enabled(&self) -> bool {
        match self {
            FireOnce::Bool(enabled) => *enabled,
            FireOnce::Text(text) => text == "true",
            FireOnce::Other(_) => false,
        }
    }
}

/// Unvalidated binding options, as supplied by the host
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawBindingOptions {
    pub offset: Option<String>,
    pub pad: Option<f32>,
    pub fire_once: Option<FireOnce>,
    pub defer: Option<bool>,
}

impl RawBindingOptions {
    /// Parse options from a JSON object; unknown keys are ignored
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate and apply defaults
    ///
    /// A missing or empty `offset` means `in-view`.
    pub fn resolve(&self) -> Result<BindingOptions> {
        let offset = match self.offset.as_deref() {
            None | Some("") => Offset::default(),
            Some(mode) => mode.parse()?,
        };

        Ok(BindingOptions {
            offset,
            pad: self.pad,
            fire_once: self.fire_once.as_ref().is_some_and(FireOnce::is_enabled),
            defer: self.defer.unwrap_or(false),
        })
    }
}

impl From<BindingOptions> for RawBindingOptions {
    fn from(options: BindingOptions) -> Self {
        Self {
            offset: Some(options.offset.as_str().to_string()),
            pad: options.pad,
            fire_once: Some(FireOnce::Bool(options.fire_once)),
            defer: Some(options.defer),
        }
    }
}
