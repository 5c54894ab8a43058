#![deny(missing_docs)]
//! A minimal custom element framework.
//!
//! Implement [`Component`](component::Component) for a type, register it for
//! a tag with a [`Runtime`](runtime::Runtime) and every occurrence of the tag
//! turns into a stateful element: its markup comes from a string template,
//! state changes re-render it and listeners declared by selector are bound
//! to the rendered nodes.

use std::cell::RefCell;
use std::rc::Rc;

pub mod component;
pub mod config;
pub mod dom;
pub mod error;
pub mod host;
pub mod key;
pub mod props;
pub mod registry;
pub mod runtime;
pub mod selector;
pub mod state;
pub mod template;
pub mod vdom;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{Error, Result};

#[allow(missing_docs)]
pub mod prelude {
    pub use crate::component::{Component, Element, Status};
    pub use crate::config::Config;
    pub use crate::dom::Document;
    pub use crate::error::{Error, Result};
    pub use crate::host::{Event, Host, NodeId};
    pub use crate::key::Key;
    pub use crate::props::{PropKind, PropSchema, Props};
    pub use crate::runtime::Runtime;
    pub use crate::state::State;
    pub use crate::template::{Markup, Style, Template};
    pub use crate::{css, html};
    pub use serde_json::{json, Value};
}

/// Shared, mutable ownership as used between the runtime, its instances and
/// their host.
pub type Shared<T> = Rc<RefCell<T>>;
