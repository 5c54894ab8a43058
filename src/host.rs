//! The contract between the framework and the environment that owns the
//! document tree.

use crate::error::Result;
use crate::selector::SelectorList;
use crate::vdom::VNode;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

/// Opaque handle to a node owned by a [`Host`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn new(id: u64) -> NodeId {
        NodeId(id)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A DOM event as seen by listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    name: String,
    target: NodeId,
    current_target: NodeId,
}

impl Event {
    #[allow(missing_docs)]
    pub fn new(name: impl Into<String>, target: NodeId, current_target: NodeId) -> Event {
        Event {
            name: name.into(),
            target,
            current_target,
        }
    }

    /// The event type, e.g. `click`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node the event was dispatched on.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose listener is running.
    pub fn current_target(&self) -> NodeId {
        self.current_target
    }
}

/// A listener as registered with the host.
pub type Handler = Rc<dyn Fn(&Event) -> Result<()>>;

/// Everything the framework needs from its environment: tag lookup,
/// attribute access, subtree replacement, scoped queries and listener
/// attachment. Markup parsing is done by the framework itself and handed
/// over as [`VNode`]s.
pub trait Host {
    /// The lowercase tag name of an element node.
    fn tag_name(&self, node: NodeId) -> Result<String>;

    /// Read an attribute.
    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>>;

    /// Write an attribute.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()>;

    /// Drop every child of `node` and put `markup` in their place.
    fn replace_children(&mut self, node: NodeId, markup: &VNode) -> Result<()>;

    /// Append `child` after the existing children of `node`.
    fn append_node(&mut self, node: NodeId, child: &VNode) -> Result<()>;

    /// Every descendant element of `root` matching `selector`, in document
    /// order. `root` itself is never part of the result.
    fn query_all(&self, root: NodeId, selector: &SelectorList) -> Result<Vec<NodeId>>;

    /// Attach a listener for `event` to `node`.
    fn add_listener(&mut self, node: NodeId, event: &str, handler: Handler) -> Result<()>;

    /// `root` followed by its descendant elements, in document order.
    fn elements(&self, root: NodeId) -> Result<Vec<NodeId>>;

    /// Whether `node` still refers to a live node. Handles of nodes dropped
    /// by [`replace_children`](Host::replace_children) are dead.
    fn contains(&self, node: NodeId) -> bool;
}
