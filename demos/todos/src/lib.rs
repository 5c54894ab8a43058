//! `f-todos`: a list loaded from the url given in its `url` attribute.
//!
//! Loading goes through [`TodoSource`]. Hooks are synchronous, so the source
//! answers right away instead of performing a network request. The browser
//! entry publishes its items with a [`JsonSource`] at `/todos.json`; pages
//! asking for any other url get a load error. A source backed by `fetch`
//! would have to preload its documents before `upgrade` runs.

use felement::prelude::*;
use felement::vdom::VText;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// A single todo item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Where `f-todos` loads its items from.
pub trait TodoSource {
    /// The items published at `url`.
    fn load(&self, url: &str) -> Result<Vec<Todo>>;
}

/// Serves JSON documents registered up front, keyed by url. Stands in for an
/// HTTP client.
#[derive(Debug, Default)]
pub struct JsonSource {
    documents: HashMap<String, String>,
}

impl JsonSource {
    pub fn new() -> JsonSource {
        JsonSource::default()
    }

    /// Publish `body` at `url`.
    pub fn with(mut self, url: &str, body: &str) -> JsonSource {
        self.documents.insert(url.to_string(), body.to_string());
        self
    }
}

impl TodoSource for JsonSource {
    fn load(&self, url: &str) -> Result<Vec<Todo>> {
        let body = self
            .documents
            .get(url)
            .ok_or_else(|| Error::Host(format!("nothing published at {}", url)))?;
        serde_json::from_str(body).map_err(|e| Error::Host(format!("{}: {}", url, e)))
    }
}

/// Lists the todos found at its `url` prop; clicking an item toggles it.
pub struct Todos {
    source: Rc<dyn TodoSource>,
}

impl Todos {
    pub fn new(source: Rc<dyn TodoSource>) -> Todos {
        Todos { source }
    }

    fn todos(el: &Element<Self>) -> Vec<Todo> {
        el.state().get_as("todos").unwrap_or_default()
    }

    fn render_list(el: &Element<Self>) -> String {
        Todos::todos(el)
            .iter()
            .map(|todo| {
                format!(
                    r#"<li data-id="{}">{}<input type="checkbox"{}></li>"#,
                    todo.id,
                    VText::text(todo.title.as_str()),
                    if todo.completed { " checked" } else { "" }
                )
            })
            .collect()
    }

    fn handle_click(&self, el: &mut Element<Self>, event: &Event) -> Result<()> {
        let clicked = el
            .attribute(event.current_target(), "data-id")?
            .and_then(|id| id.parse::<u64>().ok());
        let mut todos = Todos::todos(el);
        for todo in todos.iter_mut() {
            if Some(todo.id) == clicked {
                todo.completed = !todo.completed;
            }
        }
        el.set_state(json!({ "todos": todos }))
    }
}

impl Component for Todos {
    fn schema() -> PropSchema {
        PropSchema::new().required("url", PropKind::String)
    }

    fn initial_state(&self) -> Value {
        json!({ "todos": [] })
    }

    fn mounted(&self, el: &mut Element<Self>) -> Result<()> {
        let url = el.props().str("url").unwrap_or_default().to_string();
        let todos = self.source.load(&url)?;
        debug!(%url, count = todos.len(), "todos loaded");
        el.set_state(json!({ "todos": todos }))?;
        el.add_listener("li", "click", Todos::handle_click)
    }

    fn template(&self, el: &Element<Self>) -> Result<Markup> {
        html!(
            r#"
      <div>
        <h1>Todos</h1>
        <ul class="todos">${}</ul>
      </div>
    "#,
            Todos::render_list(el)
        )
    }

    fn styles(&self, _: &Element<Self>) -> Option<Style> {
        Some(css!(
            "
      h1 {
        font-weight: 100;
        font-size: 1.8rem;
      }

      ul.todos {
        list-style: none;
        padding: 1rem 0;
      }

      ul.todos li {
        display: flex;
        margin: 0.5rem 0;
        border-bottom: 1px solid #e6e6e6;
        padding: 1rem 0;
        cursor: pointer;
      }

      input[type=checkbox] {
        margin: auto 0 auto auto;
      }
    "
        ))
    }
}

/// Register `f-todos`, loading from `source`.
pub fn define(runtime: &mut Runtime, source: Rc<dyn TodoSource>) -> Result<()> {
    runtime.define_with("f-todos", move || Todos::new(Rc::clone(&source)))
}

/// Browser entry. Serves a fixed list at `/todos.json`; `f-todos` elements on
/// the page are expected to carry that url.
#[cfg(target_arch = "wasm32")]
mod app {
    use super::JsonSource;
    use felement::prelude::*;
    use felement::web::WebHost;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    const TODOS: &str = r#"[
        { "id": 1, "title": "Write the element base", "completed": true },
        { "id": 2, "title": "Add a registry", "completed": false },
        { "id": 3, "title": "Ship the demos", "completed": false }
    ]"#;

    thread_local! {
        static RUNTIME: RefCell<Option<Runtime>> = RefCell::new(None);
    }

    #[wasm_bindgen(start)]
    pub fn run() -> std::result::Result<(), JsValue> {
        let host = WebHost::shared().map_err(|e| JsValue::from(e.to_string()))?;
        let body = host.borrow().body().map_err(|e| JsValue::from(e.to_string()))?;
        let mut runtime = Runtime::new(host, Config::default());
        let source = Rc::new(JsonSource::new().with("/todos.json", TODOS));
        super::define(&mut runtime, source).map_err(|e| JsValue::from(e.to_string()))?;
        runtime
            .upgrade(body)
            .map_err(|e| JsValue::from(e.to_string()))?;
        RUNTIME.with(|slot| *slot.borrow_mut() = Some(runtime));
        Ok(())
    }
}
