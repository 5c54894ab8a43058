use felement::prelude::*;
use felement::Shared;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Counter;

impl Component for Counter {
    fn initial_state(&self) -> Value {
        json!({ "count": 0 })
    }

    fn created(&self, el: &mut Element<Self>) -> Result<()> {
        el.add_listener("button", "click", Counter::handle_click)
    }

    fn template(&self, el: &Element<Self>) -> Result<Markup> {
        html!("<button>Count: ${}</button>", el.state().get("count"))
    }
}

impl Counter {
    fn handle_click(&self, el: &mut Element<Self>, _: &Event) -> Result<()> {
        let count = el.state().get_as::<i64>("count").unwrap_or(0);
        el.set_state(json!({ "count": count + 1 }))
    }
}

/// Records every lifecycle hook it goes through.
struct Recorder {
    calls: Rc<RefCell<Vec<&'static str>>>,
}

impl Component for Recorder {
    fn schema() -> PropSchema {
        PropSchema::new().prop("label", PropKind::String)
    }

    fn created(&self, _: &mut Element<Self>) -> Result<()> {
        self.calls.borrow_mut().push("created");
        Ok(())
    }

    fn mounted(&self, _: &mut Element<Self>) -> Result<()> {
        self.calls.borrow_mut().push("mounted");
        Ok(())
    }

    fn template(&self, el: &Element<Self>) -> Result<Markup> {
        self.calls.borrow_mut().push("template");
        html!("<p>${}</p>", el.props().str("label"))
    }

    fn styles(&self, _: &Element<Self>) -> Option<Style> {
        self.calls.borrow_mut().push("styles");
        None
    }

    fn disconnected(&self, _: &Element<Self>) {
        self.calls.borrow_mut().push("disconnected");
    }
}

fn page(markup: &str) -> (Shared<Document>, NodeId) {
    let doc = Document::shared();
    let body = doc.borrow().body();
    doc.borrow_mut().append_html(body, markup).unwrap();
    (doc, body)
}

#[test]
fn should_increment_on_every_click() {
    let (doc, body) = page("<f-counter></f-counter>");
    let mut runtime = Runtime::new(doc.clone(), Config::default());
    runtime.define::<Counter>("f-counter").unwrap();
    runtime.upgrade(body).unwrap();

    let counter = doc.borrow().query_selector(body, "f-counter").unwrap().unwrap();
    assert_eq!(doc.borrow().text_content(counter).unwrap(), "Count: 0");
    for expected in 1..=5 {
        let button = doc.borrow().query_selector(counter, "button").unwrap().unwrap();
        Document::dispatch(&doc, button, "click").unwrap();
        assert_eq!(
            doc.borrow().text_content(counter).unwrap(),
            format!("Count: {}", expected)
        );
    }
    // Re-rendering never stacks listeners.
    assert_eq!(doc.borrow().listener_count(counter).unwrap(), 1);
}

#[test]
fn should_run_hooks_in_order() {
    let (doc, body) = page(r#"<x-recorder label="hi"></x-recorder>"#);
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut runtime = Runtime::new(doc.clone(), Config::default());
    let recorded = Rc::clone(&calls);
    runtime
        .define_with("x-recorder", move || Recorder {
            calls: Rc::clone(&recorded),
        })
        .unwrap();

    runtime.upgrade(body).unwrap();
    let recorder = doc.borrow().query_selector(body, "x-recorder").unwrap().unwrap();
    assert_eq!(doc.borrow().inner_html(recorder).unwrap(), "<p>hi</p>");

    runtime
        .instance::<Recorder>(recorder)
        .unwrap()
        .borrow_mut()
        .set_state(json!({ "seen": true }))
        .unwrap();
    runtime.disconnect(recorder).unwrap();

    assert_eq!(
        *calls.borrow(),
        vec![
            "created",
            "mounted",
            "template",
            "styles",
            "template",
            "styles",
            "disconnected"
        ]
    );
}

#[test]
fn should_keep_instances_apart() {
    let (doc, body) = page("<f-counter></f-counter><div><f-counter></f-counter></div>");
    let mut runtime = Runtime::new(doc.clone(), Config::default());
    runtime.define::<Counter>("f-counter").unwrap();
    assert_eq!(runtime.upgrade(body).unwrap(), 2);

    let nodes = doc.borrow().children(body).unwrap();
    let first = nodes[0];
    let second = doc.borrow().query_selector(nodes[1], "f-counter").unwrap().unwrap();
    assert_eq!(
        doc.borrow().outer_html(second).unwrap(),
        r#"<f-counter data-key="f1"><button>Count: 0</button></f-counter>"#
    );

    let button = doc.borrow().query_selector(first, "button").unwrap().unwrap();
    Document::dispatch(&doc, button, "click").unwrap();
    assert_eq!(doc.borrow().text_content(first).unwrap(), "Count: 1");
    assert_eq!(doc.borrow().text_content(second).unwrap(), "Count: 0");
}

#[test]
fn should_refuse_to_register_twice() {
    let doc = Document::shared();
    let mut runtime = Runtime::new(doc, Config::default());
    runtime.define::<Counter>("f-counter").unwrap();
    assert_eq!(
        runtime.define::<Counter>("f-counter"),
        Err(Error::AlreadyRegistered("f-counter".to_string()))
    );
    assert!(runtime.is_defined("f-counter"));
}

#[test]
fn should_fail_strictly_on_unmatched_listener() {
    struct Lonely;

    impl Component for Lonely {
        fn created(&self, el: &mut Element<Self>) -> Result<()> {
            el.add_listener(".missing", "click", |_: &Lonely, _: &mut Element<Lonely>, _: &Event| {
                Ok(())
            })
        }

        fn template(&self, _: &Element<Self>) -> Result<Markup> {
            html!("<p>alone</p>")
        }
    }

    let (doc, body) = page("<x-lonely></x-lonely>");
    let config = Config::from_json(r#"{ "strict_listeners": true }"#).unwrap();
    let mut runtime = Runtime::new(doc, config);
    runtime.define_with("x-lonely", || Lonely).unwrap();
    assert_eq!(
        runtime.upgrade(body),
        Err(Error::ListenerTargetMissing(".missing".to_string()))
    );
}

/// Renders nothing usable while its `blank` flag is set.
#[derive(Default)]
struct Flicker;

impl Component for Flicker {
    fn schema() -> PropSchema {
        PropSchema::new().prop("blank", PropKind::Boolean)
    }

    fn mounted(&self, el: &mut Element<Self>) -> Result<()> {
        let blank = el.props().bool("blank").unwrap_or(false);
        el.set_state(json!({ "blank": blank }))
    }

    fn template(&self, el: &Element<Self>) -> Result<Markup> {
        if el.state().get_as::<bool>("blank").unwrap_or(false) {
            html!("  ${}  ", "")
        } else {
            html!("<p>shown</p>")
        }
    }
}

#[test]
fn should_keep_children_when_first_render_is_blank() {
    let (doc, body) = page("<x-flicker blank><em>server</em></x-flicker>");
    let mut runtime = Runtime::new(doc.clone(), Config::default());
    runtime.define::<Flicker>("x-flicker").unwrap();

    let node = doc.borrow().query_selector(body, "x-flicker").unwrap().unwrap();
    assert!(matches!(
        runtime.connect(node),
        Err(Error::TemplateConversion(_))
    ));
    assert_eq!(doc.borrow().inner_html(node).unwrap(), "<em>server</em>");
    let flicker = runtime.instance::<Flicker>(node).unwrap();
    assert_eq!(flicker.borrow().render_count(), 0);
}

#[test]
fn should_keep_last_render_when_update_is_blank() {
    let (doc, body) = page("<x-flicker></x-flicker>");
    let mut runtime = Runtime::new(doc.clone(), Config::default());
    runtime.define::<Flicker>("x-flicker").unwrap();
    runtime.upgrade(body).unwrap();

    let node = doc.borrow().query_selector(body, "x-flicker").unwrap().unwrap();
    let flicker = runtime.instance::<Flicker>(node).unwrap();
    assert!(matches!(
        flicker.borrow_mut().set_state(json!({ "blank": true })),
        Err(Error::TemplateConversion(_))
    ));
    assert_eq!(doc.borrow().inner_html(node).unwrap(), "<p>shown</p>");
    assert_eq!(flicker.borrow().render_count(), 1);
}

struct Gauge;

impl Component for Gauge {
    fn schema() -> PropSchema {
        PropSchema::new().required("level", PropKind::Number)
    }

    fn template(&self, el: &Element<Self>) -> Result<Markup> {
        html!("<meter>${}</meter>", el.props().number("level"))
    }
}

#[test]
fn should_reject_uncoercible_prop_on_connect() {
    let (doc, body) = page(r#"<x-gauge level="7"></x-gauge><x-gauge level="abc"></x-gauge>"#);
    let mut runtime = Runtime::new(doc.clone(), Config::default());
    runtime.define_with("x-gauge", || Gauge).unwrap();

    let nodes = doc.borrow().children(body).unwrap();
    runtime.connect(nodes[0]).unwrap();
    assert_eq!(doc.borrow().inner_html(nodes[0]).unwrap(), "<meter>7</meter>");
    assert_eq!(
        runtime.connect(nodes[1]),
        Err(Error::PropTypeMismatch {
            name: "level".to_string(),
            expected: PropKind::Number,
            value: "abc".to_string(),
        })
    );
    assert_eq!(doc.borrow().inner_html(nodes[1]).unwrap(), "");
}

/// Forwards clicks on its first button to its second one.
struct Relay {
    doc: Shared<Document>,
}

impl Component for Relay {
    fn created(&self, el: &mut Element<Self>) -> Result<()> {
        el.add_listener(".forward", "click", Relay::forward)?;
        el.add_listener(".target", "click", |_: &Relay, el: &mut Element<Relay>, _: &Event| {
            el.set_state(json!({ "hit": true }))
        })
    }

    fn template(&self, _: &Element<Self>) -> Result<Markup> {
        html!(r#"<div><button class="forward">a</button><button class="target">b</button></div>"#)
    }
}

impl Relay {
    fn forward(&self, el: &mut Element<Self>, _: &Event) -> Result<()> {
        let target = self.doc.borrow().query_selector(el.root(), ".target")?;
        match target {
            Some(target) => Document::dispatch(&self.doc, target, "click").map(|_| ()),
            None => Ok(()),
        }
    }
}

#[test]
fn should_report_reentrant_dispatch_into_own_instance() {
    let (doc, body) = page("<x-relay></x-relay>");
    let mut runtime = Runtime::new(doc.clone(), Config::default());
    let relay_doc = Rc::clone(&doc);
    runtime
        .define_with("x-relay", move || Relay {
            doc: Rc::clone(&relay_doc),
        })
        .unwrap();
    runtime.upgrade(body).unwrap();

    let node = doc.borrow().query_selector(body, "x-relay").unwrap().unwrap();
    let key = runtime.instance_key(node).unwrap().to_string();
    let forward = doc.borrow().query_selector(node, ".forward").unwrap().unwrap();
    assert_eq!(
        Document::dispatch(&doc, forward, "click"),
        Err(Error::Reentrant(key))
    );

    // The instance is released again and still usable.
    let target = doc.borrow().query_selector(node, ".target").unwrap().unwrap();
    assert_eq!(Document::dispatch(&doc, target, "click").unwrap(), 1);
    let relay = runtime.instance::<Relay>(node).unwrap();
    assert_eq!(relay.borrow().state().get_as::<bool>("hit"), Some(true));
}

#[test]
fn should_disconnect_children_replaced_by_parent_render() {
    struct Shelf;

    impl Component for Shelf {
        fn template(&self, el: &Element<Self>) -> Result<Markup> {
            html!(
                "<div>${}<f-counter></f-counter></div>",
                el.state().get_as::<String>("title")
            )
        }
    }

    let (doc, body) = page("<x-shelf></x-shelf>");
    let mut runtime = Runtime::new(doc.clone(), Config::default());
    runtime.define::<Counter>("f-counter").unwrap();
    runtime.define_with("x-shelf", || Shelf).unwrap();
    assert_eq!(runtime.upgrade(body).unwrap(), 2);

    let shelf = doc.borrow().query_selector(body, "x-shelf").unwrap().unwrap();
    for title in &["a", "b", "c"] {
        runtime
            .instance::<Shelf>(shelf)
            .unwrap()
            .borrow_mut()
            .set_state(json!({ "title": title }))
            .unwrap();
        assert_eq!(runtime.upgrade(body).unwrap(), 1);
        assert_eq!(runtime.instance_count(), 2);
    }
    assert_eq!(doc.borrow().text_content(shelf).unwrap(), "cCount: 0");
}
