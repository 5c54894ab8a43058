//! An in-memory document tree implementing [`Host`]. It is what native code
//! and the tests run against; in the browser `web::WebHost` plays the same
//! role.

use crate::error::{Error, Result};
use crate::host::{Event, Handler, Host, NodeId};
use crate::selector::{ElementTree, SelectorList};
use crate::template::parser::parse_fragment;
use crate::vdom::velement::Attribute;
use crate::vdom::{VElement, VNode, VText};
use crate::Shared;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

enum NodeKind {
    Element {
        tag: String,
        attributes: IndexMap<String, String>,
    },
    Text {
        content: String,
        raw: bool,
    },
    Comment(String),
}

struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<(String, Handler)>,
}

/// An in-memory document. It starts with a single `body` element.
pub struct Document {
    nodes: HashMap<NodeId, NodeData>,
    next_id: u64,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Document {
        Document::new()
    }
}

impl Document {
    /// Create a document containing only a `body` element.
    pub fn new() -> Document {
        let mut doc = Document {
            nodes: HashMap::new(),
            next_id: 0,
            body: NodeId::new(0),
        };
        doc.body = doc.create_element("body");
        doc
    }

    /// Create a document ready to be handed to a runtime.
    pub fn shared() -> Shared<Document> {
        Rc::new(RefCell::new(Document::new()))
    }

    /// The `body` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    fn insert_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeData {
                kind,
                parent: None,
                children: Vec::new(),
                listeners: Vec::new(),
            },
        );
        id
    }

    fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes
            .get(&id)
            .ok_or_else(|| Error::UnknownNode(id.to_string()))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| Error::UnknownNode(id.to_string()))
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert_node(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: IndexMap::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text_node(&mut self, content: &str) -> NodeId {
        self.insert_node(NodeKind::Text {
            content: content.to_string(),
            raw: false,
        })
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        if parent == child || self.is_ancestor(child, parent) {
            return Err(Error::Host(format!(
                "cannot append {} inside its own subtree",
                child
            )));
        }
        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detach `child` from `parent`. The node and its subtree stay alive and
    /// can be appended again.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.node(child)?.parent != Some(parent) {
            return Err(Error::Host(format!("{} is not a child of {}", child, parent)));
        }
        self.detach(child)
    }

    fn detach(&mut self, child: NodeId) -> Result<()> {
        if let Some(parent) = self.node_mut(child)?.parent.take() {
            self.node_mut(parent)?.children.retain(|&c| c != child);
        }
        Ok(())
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// Free a node and everything below it.
    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(data) = self.nodes.remove(&id) {
            for child in data.children {
                self.drop_subtree(child);
            }
        }
    }

    /// Materialize `vnode` as the last child of `parent`.
    pub fn insert(&mut self, parent: NodeId, vnode: &VNode) -> Result<NodeId> {
        let id = match vnode {
            VNode::Text(txt) if txt.is_comment() => {
                self.insert_node(NodeKind::Comment(txt.content().to_string()))
            }
            VNode::Text(txt) => self.insert_node(NodeKind::Text {
                content: txt.content().to_string(),
                raw: txt.is_raw(),
            }),
            VNode::Element(el) => {
                let id = self.insert_node(NodeKind::Element {
                    tag: el.tag().to_string(),
                    attributes: el
                        .attributes()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                });
                for child in el.children() {
                    self.insert(id, child)?;
                }
                id
            }
        };
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Parse `markup` and append every resulting node to `parent`.
    pub fn append_html(&mut self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>> {
        parse_fragment(markup)
            .iter()
            .map(|vnode| self.insert(parent, vnode))
            .collect()
    }

    /// The children of a node.
    pub fn children(&self, node: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.node(node)?.children.clone())
    }

    /// The parent of a node.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    /// Whether the handle still refers to a live node.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// The first match of `selector` below `root`.
    pub fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let selector = SelectorList::parse(selector)?;
        Ok(self.query_all(root, &selector)?.into_iter().next())
    }

    /// Rebuild the detached markup tree of a node.
    pub fn to_vnode(&self, id: NodeId) -> Result<VNode> {
        let data = self.node(id)?;
        Ok(match data.kind {
            NodeKind::Comment(ref content) => VText::comment(content.clone()).into(),
            NodeKind::Text { ref content, raw } => {
                if raw {
                    VText::raw(content.clone()).into()
                } else {
                    VText::text(content.clone()).into()
                }
            }
            NodeKind::Element {
                ref tag,
                ref attributes,
            } => {
                let attributes = attributes
                    .iter()
                    .map(|(k, v)| Attribute::new(k.clone(), v.clone()))
                    .collect();
                let children = data
                    .children
                    .iter()
                    .map(|&child| self.to_vnode(child))
                    .collect::<Result<Vec<_>>>()?;
                VElement::new(tag.clone(), attributes, children).into()
            }
        })
    }

    /// Serialize a node including itself.
    pub fn outer_html(&self, node: NodeId) -> Result<String> {
        Ok(self.to_vnode(node)?.to_string())
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, node: NodeId) -> Result<String> {
        self.node(node)?
            .children
            .iter()
            .map(|&child| self.outer_html(child))
            .collect()
    }

    /// Concatenated text below a node.
    pub fn text_content(&self, node: NodeId) -> Result<String> {
        Ok(self.to_vnode(node)?.text_content())
    }

    /// Number of listeners attached to `root` and its descendants.
    pub fn listener_count(&self, root: NodeId) -> Result<usize> {
        let data = self.node(root)?;
        let mut count = data.listeners.len();
        for &child in data.children.iter() {
            count += self.listener_count(child)?;
        }
        Ok(count)
    }

    /// Dispatch `event` on `target` and let it bubble up through the
    /// ancestors. The propagation path and its handlers are collected first,
    /// then the document is released so handlers are free to mutate it.
    /// Returns the number of handlers that ran.
    pub fn dispatch(this: &Shared<Document>, target: NodeId, event: &str) -> Result<usize> {
        let queued: Vec<(NodeId, Handler)> = {
            let doc = this.borrow();
            doc.node(target)?;
            let mut path = vec![target];
            let mut current = doc.parent(target);
            while let Some(id) = current {
                path.push(id);
                current = doc.parent(id);
            }
            path.into_iter()
                .flat_map(|id| {
                    doc.nodes[&id]
                        .listeners
                        .iter()
                        .filter(|(name, _)| name == event)
                        .map(move |(_, handler)| (id, Rc::clone(handler)))
                        .collect::<Vec<_>>()
                })
                .collect()
        };

        trace!(%target, event, handlers = queued.len(), "dispatching event");
        for (current, handler) in queued.iter() {
            handler(&Event::new(event, target, *current))?;
        }
        Ok(queued.len())
    }

    fn descendants_into(&self, node: NodeId, out: &mut Vec<NodeId>) {
        if let Some(data) = self.nodes.get(&node) {
            for &child in data.children.iter() {
                if let Some(NodeData {
                    kind: NodeKind::Element { .. },
                    ..
                }) = self.nodes.get(&child)
                {
                    out.push(child);
                }
                self.descendants_into(child, out);
            }
        }
    }
}

impl ElementTree for Document {
    type Node = NodeId;

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        match self.nodes.get(&node)?.kind {
            NodeKind::Element { ref tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match self.nodes.get(&node)?.kind {
            NodeKind::Element { ref attributes, .. } => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Document::parent(self, node)
    }
}

impl Host for Document {
    fn tag_name(&self, node: NodeId) -> Result<String> {
        self.node(node)?;
        ElementTree::tag_name(self, node)
            .map(str::to_string)
            .ok_or_else(|| Error::Host(format!("{} is not an element", node)))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        self.node(node)?;
        Ok(ElementTree::attribute(self, node, name).map(str::to_string))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        match self.node_mut(node)?.kind {
            NodeKind::Element {
                ref mut attributes, ..
            } => {
                attributes.insert(name.to_ascii_lowercase(), value.to_string());
                Ok(())
            }
            _ => Err(Error::Host(format!("{} is not an element", node))),
        }
    }

    fn replace_children(&mut self, node: NodeId, markup: &VNode) -> Result<()> {
        let old = std::mem::take(&mut self.node_mut(node)?.children);
        for child in old {
            self.drop_subtree(child);
        }
        self.insert(node, markup)?;
        Ok(())
    }

    fn append_node(&mut self, node: NodeId, child: &VNode) -> Result<()> {
        self.insert(node, child).map(|_| ())
    }

    fn query_all(&self, root: NodeId, selector: &SelectorList) -> Result<Vec<NodeId>> {
        self.node(root)?;
        let mut candidates = Vec::new();
        self.descendants_into(root, &mut candidates);
        Ok(candidates
            .into_iter()
            .filter(|&node| selector.matches(self, node, root))
            .collect())
    }

    fn add_listener(&mut self, node: NodeId, event: &str, handler: Handler) -> Result<()> {
        self.node_mut(node)?
            .listeners
            .push((event.to_string(), handler));
        Ok(())
    }

    fn elements(&self, root: NodeId) -> Result<Vec<NodeId>> {
        self.node(root)?;
        let mut out = vec![root];
        self.descendants_into(root, &mut out);
        Ok(out)
    }

    fn contains(&self, node: NodeId) -> bool {
        Document::contains(self, node)
    }
}
