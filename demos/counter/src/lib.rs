use felement::prelude::*;

/// A button counting its own clicks.
#[derive(Default)]
pub struct Counter;

impl Component for Counter {
    fn initial_state(&self) -> Value {
        json!({ "count": 0 })
    }

    fn created(&self, el: &mut Element<Self>) -> Result<()> {
        el.add_listener("button", "click", Counter::handle_click)
    }

    fn template(&self, el: &Element<Self>) -> Result<Markup> {
        html!(
            "<button>Count <span>${}</span></button>",
            el.state().get("count")
        )
    }

    fn styles(&self, _: &Element<Self>) -> Option<Style> {
        Some(css!(
            "
    button {
      padding: 0.5rem 1rem;
      border: 1px solid #bbbbbb;
      border-radius: 0.2rem;
      margin: 0 0 3rem 0;
      background: white;
      display: inline-flex;
      outline: none;
    }

    button:hover,
    button:active {
      background: #f7f7f7;
    }

    button span {
      margin-left: 0.4rem;
      background: #ececec;
      border-radius: 50%;
      height: 1rem;
      width: 1rem;
    }
    "
        ))
    }
}

impl Counter {
    fn handle_click(&self, el: &mut Element<Self>, _: &Event) -> Result<()> {
        let count = el.state().get_as::<i64>("count").unwrap_or(0) + 1;
        el.set_state(json!({ "count": count }))
    }
}

/// Register the demo elements.
pub fn define(runtime: &mut Runtime) -> Result<()> {
    runtime.define::<Counter>("f-counter")
}

#[cfg(target_arch = "wasm32")]
mod app {
    use felement::prelude::*;
    use felement::web::WebHost;
    use std::cell::RefCell;
    use wasm_bindgen::prelude::*;

    thread_local! {
        static RUNTIME: RefCell<Option<Runtime>> = RefCell::new(None);
    }

    #[wasm_bindgen(start)]
    pub fn run() -> std::result::Result<(), JsValue> {
        let host = WebHost::shared().map_err(|e| JsValue::from(e.to_string()))?;
        let body = host.borrow().body().map_err(|e| JsValue::from(e.to_string()))?;
        let mut runtime = Runtime::new(host, Config::default());
        super::define(&mut runtime).map_err(|e| JsValue::from(e.to_string()))?;
        runtime
            .upgrade(body)
            .map_err(|e| JsValue::from(e.to_string()))?;
        RUNTIME.with(|slot| *slot.borrow_mut() = Some(runtime));
        Ok(())
    }
}
