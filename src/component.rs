//! Components and the element instances built around them.

use crate::error::{Error, Result};
use crate::host::{Event, Handler, Host, NodeId};
use crate::key::Key;
use crate::props::{PropSchema, Props};
use crate::selector::SelectorList;
use crate::state::State;
use crate::template::{Markup, Style};
use crate::Shared;
use serde_json::Value;
use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace, warn};

/// Trait to define a custom element. Implement it on a type holding whatever
/// the element needs besides its state, register it with a
/// [`Runtime`](crate::runtime::Runtime) and the runtime builds an
/// [`Element`] around it for every occurrence of the tag.
///
/// # Example
/// ```
/// use felement::prelude::*;
///
/// #[derive(Default)]
/// struct Counter;
///
/// impl Component for Counter {
///     fn initial_state(&self) -> Value {
///         json!({ "count": 0 })
///     }
///
///     fn created(&self, el: &mut Element<Self>) -> Result<()> {
///         el.add_listener("button", "click", Self::increment)
///     }
///
///     fn template(&self, el: &Element<Self>) -> Result<Markup> {
///         html!("<button>Count: ${}</button>", el.state().get("count"))
///     }
/// }
///
/// impl Counter {
///     fn increment(&self, el: &mut Element<Self>, _: &Event) -> Result<()> {
///         let count = el.state().get_as::<i64>("count").unwrap_or(0);
///         el.set_state(json!({ "count": count + 1 }))
///     }
/// }
/// ```
pub trait Component: Sized + 'static {
    /// The attributes read as props when the element is connected.
    fn schema() -> PropSchema {
        PropSchema::new()
    }

    /// The state the element starts with. Must be a JSON object.
    fn initial_state(&self) -> Value {
        Value::Object(Default::default())
    }

    /// Invoked right after construction, typically to declare listeners.
    #[allow(unused_variables)]
    fn created(&self, el: &mut Element<Self>) -> Result<()> {
        Ok(())
    }

    /// Invoked once props are resolved, right before the first render.
    #[allow(unused_variables)]
    fn mounted(&self, el: &mut Element<Self>) -> Result<()> {
        Ok(())
    }

    /// The markup of the element for its current state and props.
    fn template(&self, el: &Element<Self>) -> Result<Markup>;

    /// The stylesheet appended after the markup on every render.
    #[allow(unused_variables)]
    fn styles(&self, el: &Element<Self>) -> Option<Style> {
        None
    }

    /// Invoked when the element is removed from the document.
    #[allow(unused_variables)]
    fn disconnected(&self, el: &Element<Self>) {}
}

/// Where an element is in its lifecycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Status {
    /// Built, but not rendered yet.
    Constructed,
    /// Rendered at least once.
    Rendered,
    /// Removed from the document.
    Disconnected,
}

type Callback<C> = Rc<dyn Fn(&C, &mut Element<C>, &Event) -> Result<()>>;

/// A declared listener, attached on every render.
struct Listener<C: Component> {
    selector: SelectorList,
    event: String,
    callback: Callback<C>,
}

/// A live instance of a component: its key, state, props and listeners.
pub struct Element<C: Component> {
    key: Key,
    root: NodeId,
    host: Shared<dyn Host>,
    component: Rc<C>,
    state: State,
    props: Props,
    listeners: Vec<Listener<C>>,
    status: Status,
    renders: usize,
    strict_listeners: bool,
    this: Weak<RefCell<Element<C>>>,
}

/// What a runtime hands over when it builds an instance.
pub(crate) struct Construct {
    pub key: Key,
    pub root: NodeId,
    pub host: Shared<dyn Host>,
    pub strict_listeners: bool,
}

impl<C: Component> Element<C> {
    /// Build an instance around `component`: tag the root node with the key,
    /// set the initial state and run the `created` hook.
    pub(crate) fn create(component: C, init: Construct) -> Result<Shared<Element<C>>> {
        let state = State::from_value(component.initial_state())?;
        init.host
            .borrow_mut()
            .set_attribute(init.root, "data-key", init.key.as_str())?;

        let component = Rc::new(component);
        let el = Rc::new_cyclic(|this| {
            RefCell::new(Element {
                key: init.key,
                root: init.root,
                host: init.host,
                component: Rc::clone(&component),
                state,
                props: Props::default(),
                listeners: Vec::new(),
                status: Status::Constructed,
                renders: 0,
                strict_listeners: init.strict_listeners,
                this: this.clone(),
            })
        });
        debug!(key = %el.borrow().key, "element constructed");

        component.created(&mut el.borrow_mut())?;
        Ok(el)
    }

    /// The unique key of this instance.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The host node this instance renders into.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The current state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The props resolved at connect time.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// The component this instance wraps.
    pub fn component(&self) -> &C {
        &self.component
    }

    #[allow(missing_docs)]
    pub fn status(&self) -> Status {
        self.status
    }

    /// How many times the instance has rendered.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Number of declared listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Read an attribute of any host node, e.g. an event target.
    pub fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        self.host()?.attribute(node, name)
    }

    /// Shallow-merge `partial` into the state and render again. Before the
    /// first render only the merge happens; the connect render picks it up.
    pub fn set_state(&mut self, partial: Value) -> Result<()> {
        if self.status == Status::Disconnected {
            return Err(Error::Disconnected(self.key.to_string()));
        }
        self.state.merge(partial)?;
        match self.status {
            Status::Rendered => self.render(),
            _ => Ok(()),
        }
    }

    /// Declare a listener. Nothing is attached until the next render, where
    /// `callback` is bound to every node below this instance matching
    /// `selector`.
    pub fn add_listener<F>(&mut self, selector: &str, event: &str, callback: F) -> Result<()>
    where
        F: Fn(&C, &mut Element<C>, &Event) -> Result<()> + 'static,
    {
        self.listeners.push(Listener {
            selector: SelectorList::parse(selector)?,
            event: event.to_string(),
            callback: Rc::new(callback),
        });
        Ok(())
    }

    /// Read the declared props off the root node.
    pub fn resolve_props(&mut self) -> Result<()> {
        let props = {
            let host = self.host()?;
            C::schema().resolve(|name| host.attribute(self.root, name))?
        };
        self.props = props;
        Ok(())
    }

    /// Resolve props, run `mounted` and render for the first time.
    pub(crate) fn connected(&mut self) -> Result<()> {
        debug!(key = %self.key, "element connected");
        self.resolve_props()?;
        let component = Rc::clone(&self.component);
        component.mounted(self)?;
        self.render()
    }

    /// Mark the instance as removed. Attached listeners are left alone.
    pub(crate) fn disconnected(&mut self) {
        info!(key = %self.key, "element removed from DOM");
        let component = Rc::clone(&self.component);
        component.disconnected(self);
        self.status = Status::Disconnected;
    }

    fn render(&mut self) -> Result<()> {
        let component = Rc::clone(&self.component);
        let markup = component.template(self)?;

        self.host_mut()?.replace_children(self.root, markup.node())?;
        self.activate_listeners()?;

        if let Some(style) = component.styles(self) {
            self.host_mut()?.append_node(self.root, &style.to_node())?;
        }

        self.status = Status::Rendered;
        self.renders += 1;
        debug!(key = %self.key, renders = self.renders, "element rendered");
        Ok(())
    }

    fn activate_listeners(&self) -> Result<()> {
        for listener in self.listeners.iter() {
            let targets = self.host()?.query_all(self.root, &listener.selector)?;
            if targets.is_empty() {
                if self.strict_listeners {
                    return Err(Error::ListenerTargetMissing(
                        listener.selector.as_str().to_string(),
                    ));
                }
                warn!(
                    key = %self.key,
                    selector = listener.selector.as_str(),
                    "listener matched no element"
                );
                continue;
            }

            let mut host = self.host_mut()?;
            for target in targets {
                trace!(key = %self.key, %target, event = %listener.event, "attaching listener");
                host.add_listener(target, &listener.event, self.handler(&listener.callback))?;
            }
        }
        Ok(())
    }

    fn handler(&self, callback: &Callback<C>) -> Handler {
        let this = self.this.clone();
        let callback = Rc::clone(callback);
        let key = self.key.clone();
        Rc::new(move |event: &Event| {
            // The instance is gone once the runtime dropped it.
            let el = match this.upgrade() {
                Some(el) => el,
                None => return Ok(()),
            };
            let mut el = el
                .try_borrow_mut()
                .map_err(|_| Error::Reentrant(key.to_string()))?;
            let component = Rc::clone(&el.component);
            callback(&component, &mut el, event)
        })
    }

    fn host(&self) -> Result<Ref<'_, dyn Host + 'static>> {
        self.host
            .try_borrow()
            .map_err(|_| Error::Reentrant(self.key.to_string()))
    }

    fn host_mut(&self) -> Result<RefMut<'_, dyn Host + 'static>> {
        self.host
            .try_borrow_mut()
            .map_err(|_| Error::Reentrant(self.key.to_string()))
    }
}

/// The type erased view a runtime keeps of its instances.
pub(crate) trait Lifecycle {
    fn key(&self) -> &Key;
    fn connected(&self) -> Result<()>;
    fn disconnected(&self) -> Result<()>;
    fn as_any(&self) -> &dyn Any;
}

/// A runtime's handle to one instance.
pub(crate) struct Mounted<C: Component> {
    key: Key,
    element: Shared<Element<C>>,
}

impl<C: Component> Mounted<C> {
    pub fn new(element: Shared<Element<C>>) -> Mounted<C> {
        let key = element.borrow().key.clone();
        Mounted { key, element }
    }

    pub fn element(&self) -> &Shared<Element<C>> {
        &self.element
    }

    fn borrow_mut(&self) -> Result<RefMut<'_, Element<C>>> {
        self.element
            .try_borrow_mut()
            .map_err(|_| Error::Reentrant(self.key.to_string()))
    }
}

impl<C: Component> Lifecycle for Mounted<C> {
    fn key(&self) -> &Key {
        &self.key
    }

    fn connected(&self) -> Result<()> {
        self.borrow_mut()?.connected()
    }

    fn disconnected(&self) -> Result<()> {
        self.borrow_mut()?.disconnected();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::Document;
    use crate::props::PropKind;
    use serde_json::json;

    #[derive(Default)]
    struct Counter;

    impl Component for Counter {
        fn initial_state(&self) -> Value {
            json!({ "count": 0 })
        }

        fn created(&self, el: &mut Element<Self>) -> Result<()> {
            el.add_listener("button", "click", Counter::increment)
        }

        fn template(&self, el: &Element<Self>) -> Result<Markup> {
            crate::html!(
                "<button>Count <span>${}</span></button>",
                el.state().get("count")
            )
        }
    }

    impl Counter {
        fn increment(&self, el: &mut Element<Self>, _: &Event) -> Result<()> {
            let count = el.state().get_as::<i64>("count").unwrap_or(0);
            el.set_state(json!({ "count": count + 1 }))
        }
    }

    fn mount<C: Component>(component: C, markup: &str) -> (Shared<Document>, Shared<Element<C>>) {
        let doc = Document::shared();
        let root = {
            let mut doc = doc.borrow_mut();
            let body = doc.body();
            doc.append_html(body, markup).unwrap()[0]
        };
        let host: Shared<dyn Host> = doc.clone();
        let el = Element::create(
            component,
            Construct {
                key: Key::from("k0"),
                root,
                host,
                strict_listeners: false,
            },
        )
        .unwrap();
        (doc, el)
    }

    #[test]
    fn should_tag_root_with_key_on_construction() {
        let (doc, el) = mount(Counter, "<f-counter></f-counter>");
        let el = el.borrow();
        assert_eq!(el.status(), Status::Constructed);
        assert_eq!(el.listener_count(), 1);
        assert_eq!(
            doc.borrow().outer_html(el.root()).unwrap(),
            r#"<f-counter data-key="k0"></f-counter>"#
        );
    }

    #[test]
    fn should_render_on_connect_and_state_change() {
        let (doc, el) = mount(Counter, "<f-counter></f-counter>");
        el.borrow_mut().connected().unwrap();
        let root = el.borrow().root();
        assert_eq!(
            doc.borrow().inner_html(root).unwrap(),
            "<button>Count <span>0</span></button>"
        );

        el.borrow_mut().set_state(json!({ "count": 1 })).unwrap();
        el.borrow_mut().set_state(json!({ "count": 2 })).unwrap();
        assert_eq!(el.borrow().state().to_value(), json!({ "count": 2 }));
        assert_eq!(el.borrow().render_count(), 3);
        assert_eq!(
            doc.borrow().inner_html(root).unwrap(),
            "<button>Count <span>2</span></button>"
        );
    }

    #[test]
    fn should_handle_clicks_through_declared_listener() {
        let (doc, el) = mount(Counter, "<f-counter></f-counter>");
        el.borrow_mut().connected().unwrap();
        let root = el.borrow().root();

        for _ in 0..3 {
            let button = doc.borrow().query_selector(root, "button").unwrap().unwrap();
            assert_eq!(Document::dispatch(&doc, button, "click").unwrap(), 1);
        }
        assert_eq!(el.borrow().state().get_as::<i64>("count"), Some(3));
        assert_eq!(doc.borrow().text_content(root).unwrap(), "Count 3");
        assert_eq!(doc.borrow().listener_count(root).unwrap(), 1);
    }

    #[test]
    fn should_defer_render_for_state_set_before_connect() {
        let (doc, el) = mount(Counter, "<f-counter></f-counter>");
        el.borrow_mut().set_state(json!({ "count": 7 })).unwrap();
        assert_eq!(el.borrow().render_count(), 0);
        el.borrow_mut().connected().unwrap();
        let root = el.borrow().root();
        assert_eq!(doc.borrow().text_content(root).unwrap(), "Count 7");
    }

    #[test]
    fn should_refuse_state_changes_after_disconnect() {
        let (_doc, el) = mount(Counter, "<f-counter></f-counter>");
        el.borrow_mut().connected().unwrap();
        el.borrow_mut().disconnected();
        assert_eq!(el.borrow().status(), Status::Disconnected);
        assert_eq!(
            el.borrow_mut().set_state(json!({ "count": 1 })),
            Err(Error::Disconnected("k0".to_string()))
        );
    }

    struct Greeting;

    impl Component for Greeting {
        fn schema() -> PropSchema {
            PropSchema::new()
                .required("name", PropKind::String)
                .prop("excited", PropKind::Boolean)
        }

        fn template(&self, el: &Element<Self>) -> Result<Markup> {
            let mark = if el.props().bool("excited") == Some(true) { "!" } else { "." };
            crate::html!("<p>Hello ${}${}</p>", el.props().str("name"), mark)
        }

        fn styles(&self, _: &Element<Self>) -> Option<Style> {
            Some(crate::css!("p { margin: 0; }"))
        }
    }

    #[test]
    fn should_resolve_props_and_append_styles() {
        let (doc, el) = mount(Greeting, r#"<x-greet name="Ada" excited></x-greet>"#);
        el.borrow_mut().connected().unwrap();
        let root = el.borrow().root();
        assert_eq!(
            doc.borrow().inner_html(root).unwrap(),
            "<p>Hello Ada!</p><style>p { margin: 0; }</style>"
        );
    }

    #[test]
    fn should_fail_connect_on_missing_required_prop() {
        let (_doc, el) = mount(Greeting, "<x-greet></x-greet>");
        assert_eq!(
            el.borrow_mut().connected(),
            Err(Error::MissingProp("name".to_string()))
        );
        assert_eq!(el.borrow().render_count(), 0);
    }

    struct Broken;

    impl Component for Broken {
        fn created(&self, el: &mut Element<Self>) -> Result<()> {
            el.add_listener("a", "click", |_: &Broken, _: &mut Element<Broken>, _: &Event| Ok(()))
        }

        fn template(&self, _: &Element<Self>) -> Result<Markup> {
            crate::html!("<p>no links</p>")
        }
    }

    #[test]
    fn should_tolerate_unmatched_selector_unless_strict() {
        let (doc, el) = mount(Broken, "<x-broken></x-broken>");
        el.borrow_mut().connected().unwrap();
        let root = el.borrow().root();
        assert_eq!(doc.borrow().listener_count(root).unwrap(), 0);

        el.borrow_mut().strict_listeners = true;
        assert_eq!(
            el.borrow_mut().set_state(json!({})),
            Err(Error::ListenerTargetMissing("a".to_string()))
        );
    }

    #[test]
    fn should_reject_invalid_listener_selector() {
        let (_doc, el) = mount(Broken, "<x-broken></x-broken>");
        let result = el.borrow_mut().add_listener(
            "a:hover",
            "click",
            |_: &Broken, _: &mut Element<Broken>, _: &Event| Ok(()),
        );
        assert!(matches!(result, Err(Error::Selector { .. })));
    }
}
