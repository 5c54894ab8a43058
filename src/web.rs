//! The browser [`Host`]: renders into the live DOM through `web-sys`.

use crate::error::{Error, Result};
use crate::host::{Event, Handler, Host, NodeId};
use crate::selector::{ElementTree, SelectorList};
use crate::vdom::VNode;
use crate::Shared;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Error {
        value
            .as_string()
            .map_or_else(|| Error::Host(format!("{:?}", value)), Error::Host)
    }
}

/// Hands out stable [`NodeId`]s for DOM elements.
#[derive(Default)]
struct NodeTable {
    entries: RefCell<Vec<(NodeId, web_sys::Element)>>,
    next: Cell<u64>,
}

impl NodeTable {
    fn id_of(&self, element: &web_sys::Element) -> NodeId {
        if let Some((id, _)) = self.entries.borrow().iter().find(|(_, el)| el == element) {
            return *id;
        }
        let id = NodeId::new(self.next.get());
        self.next.set(self.next.get() + 1);
        self.entries.borrow_mut().push((id, element.clone()));
        id
    }

    fn get(&self, id: NodeId) -> Result<web_sys::Element> {
        self.entries
            .borrow()
            .iter()
            .find(|(node, _)| *node == id)
            .map(|(_, el)| el.clone())
            .ok_or_else(|| Error::UnknownNode(id.to_string()))
    }

    fn forget(&self, ids: &[NodeId]) {
        self.entries.borrow_mut().retain(|(id, _)| !ids.contains(id));
    }
}

type Listeners = RefCell<HashMap<NodeId, Vec<(String, Handler)>>>;

/// A [`Host`] backed by the page's `document`.
///
/// Every DOM listener is the same closure, which looks the handlers of the
/// current target up in a table. Re-rendering a subtree only drops table
/// entries, so a handler may re-render the very node it is running on.
pub struct WebHost {
    document: web_sys::Document,
    table: Rc<NodeTable>,
    listeners: Rc<Listeners>,
    dispatcher: Closure<dyn FnMut(web_sys::Event)>,
}

impl WebHost {
    /// Attach to the document of the current window.
    pub fn new() -> Result<WebHost> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| Error::Host("DOM is not available".to_string()))?;
        let table = Rc::new(NodeTable::default());
        let listeners: Rc<Listeners> = Rc::default();
        let dispatcher = {
            let table = Rc::clone(&table);
            let listeners = Rc::clone(&listeners);
            Closure::<dyn FnMut(web_sys::Event)>::new(move |ev: web_sys::Event| {
                dispatch(&table, &listeners, &ev)
            })
        };
        Ok(WebHost {
            document,
            table,
            listeners,
            dispatcher,
        })
    }

    /// Attach to the current document, ready to be handed to a runtime.
    pub fn shared() -> Result<Shared<WebHost>> {
        Ok(Rc::new(RefCell::new(WebHost::new()?)))
    }

    /// The `body` element.
    pub fn body(&self) -> Result<NodeId> {
        let body = self
            .document
            .body()
            .ok_or_else(|| Error::Host("document has no body".to_string()))?;
        Ok(self.node(&body))
    }

    /// The handle of a DOM element.
    pub fn node(&self, element: &web_sys::Element) -> NodeId {
        self.table.id_of(element)
    }

    /// The DOM element behind a handle.
    pub fn element(&self, node: NodeId) -> Result<web_sys::Element> {
        self.table.get(node)
    }

    fn materialize(&self, vnode: &VNode) -> Result<web_sys::Node> {
        Ok(match vnode {
            VNode::Text(txt) if txt.is_comment() => {
                self.document.create_comment(txt.content()).into()
            }
            VNode::Text(txt) => self.document.create_text_node(txt.content()).into(),
            VNode::Element(el) => {
                let element = self.document.create_element(el.tag())?;
                for (name, value) in el.attributes() {
                    element.set_attribute(name, value)?;
                }
                for child in el.children() {
                    element.append_child(&self.materialize(child)?)?;
                }
                element.into()
            }
        })
    }

    fn descendants(&self, root: &web_sys::Element) -> Result<Vec<web_sys::Element>> {
        let list = root.query_selector_all("*")?;
        Ok((0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .collect())
    }
}

fn dispatch(table: &NodeTable, listeners: &Listeners, ev: &web_sys::Event) {
    let as_element = |target: Option<web_sys::EventTarget>| {
        target.and_then(|target| target.dyn_into::<web_sys::Element>().ok())
    };
    let current = match as_element(ev.current_target()) {
        Some(el) => table.id_of(&el),
        None => return,
    };
    let target = as_element(ev.target()).map_or(current, |el| table.id_of(&el));
    let name = ev.type_();

    let queued: Vec<Handler> = listeners
        .borrow()
        .get(&current)
        .map(|handlers| {
            handlers
                .iter()
                .filter(|(event, _)| *event == name)
                .map(|(_, handler)| Rc::clone(handler))
                .collect()
        })
        .unwrap_or_default();

    let event = Event::new(name.as_str(), target, current);
    for handler in queued {
        if let Err(err) = handler(&event) {
            error!(%current, event = %name, %err, "listener failed");
        }
    }
}

/// A frozen copy of a subtree, enough to evaluate scoped selectors without
/// going back and forth across the JS boundary.
struct Snapshot {
    elements: Vec<web_sys::Element>,
    tags: Vec<String>,
    attributes: Vec<Vec<(String, String)>>,
    parents: Vec<Option<usize>>,
}

impl Snapshot {
    fn capture(root: web_sys::Element, descendants: Vec<web_sys::Element>) -> Snapshot {
        let mut elements = Vec::with_capacity(descendants.len() + 1);
        elements.push(root);
        elements.extend(descendants);

        let tags = elements
            .iter()
            .map(|el| el.tag_name().to_ascii_lowercase())
            .collect();
        let attributes = elements
            .iter()
            .map(|el| {
                let map = el.attributes();
                (0..map.length())
                    .filter_map(|i| map.item(i))
                    .map(|attr| (attr.name().to_ascii_lowercase(), attr.value()))
                    .collect()
            })
            .collect();
        // Elements arrive in document order, so a parent always precedes
        // its children.
        let parents = elements
            .iter()
            .enumerate()
            .map(|(idx, el)| {
                let parent = el.parent_element()?;
                elements[..idx].iter().position(|candidate| *candidate == parent)
            })
            .collect();

        Snapshot {
            elements,
            tags,
            attributes,
            parents,
        }
    }
}

impl ElementTree for Snapshot {
    type Node = usize;

    fn tag_name(&self, node: usize) -> Option<&str> {
        self.tags.get(node).map(String::as_str)
    }

    fn attribute(&self, node: usize, name: &str) -> Option<&str> {
        self.attributes
            .get(node)?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn parent(&self, node: usize) -> Option<usize> {
        *self.parents.get(node)?
    }
}

impl Host for WebHost {
    fn tag_name(&self, node: NodeId) -> Result<String> {
        Ok(self.element(node)?.tag_name().to_ascii_lowercase())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        Ok(self.element(node)?.get_attribute(name))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.element(node)?.set_attribute(name, value)?;
        Ok(())
    }

    fn replace_children(&mut self, node: NodeId, markup: &VNode) -> Result<()> {
        let root = self.element(node)?;
        let stale: Vec<NodeId> = self
            .descendants(&root)?
            .iter()
            .map(|el| self.node(el))
            .collect();
        self.listeners
            .borrow_mut()
            .retain(|id, _| !stale.contains(id));
        self.table.forget(&stale);

        while let Some(child) = root.first_child() {
            root.remove_child(&child)?;
        }
        root.append_child(&self.materialize(markup)?)?;
        Ok(())
    }

    fn append_node(&mut self, node: NodeId, child: &VNode) -> Result<()> {
        self.element(node)?.append_child(&self.materialize(child)?)?;
        Ok(())
    }

    fn query_all(&self, root: NodeId, selector: &SelectorList) -> Result<Vec<NodeId>> {
        let element = self.element(root)?;
        let snapshot = Snapshot::capture(element.clone(), self.descendants(&element)?);
        Ok((1..snapshot.elements.len())
            .filter(|&idx| selector.matches(&snapshot, idx, 0))
            .map(|idx| self.node(&snapshot.elements[idx]))
            .collect())
    }

    fn add_listener(&mut self, node: NodeId, event: &str, handler: Handler) -> Result<()> {
        // The browser ignores a second registration of the same closure.
        self.element(node)?
            .add_event_listener_with_callback(event, self.dispatcher.as_ref().unchecked_ref())?;
        self.listeners
            .borrow_mut()
            .entry(node)
            .or_default()
            .push((event.to_string(), handler));
        Ok(())
    }

    fn elements(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let element = self.element(root)?;
        let mut out = vec![root];
        out.extend(self.descendants(&element)?.iter().map(|el| self.node(el)));
        Ok(out)
    }

    fn contains(&self, node: NodeId) -> bool {
        self.table.get(node).is_ok()
    }
}
