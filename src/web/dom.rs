//! DOM side of the host boundary

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventInit, HtmlInputElement};

use crate::intercept::{ElementLike, QuickConnectHost};

/// Quick Connect input located by selector on every access.
///
/// The host framework re-renders the input freely, so no element is cached.
pub struct DomHost {
    document: Document,
    input_selector: String,
}

impl DomHost {
    pub fn new(document: Document, input_selector: &str) -> Self {
        Self {
            document,
            input_selector: input_selector.to_string(),
        }
    }

    fn input(&self) -> Option<HtmlInputElement> {
        self.document
            .query_selector(&self.input_selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    }
}

impl QuickConnectHost for DomHost {
    fn read_input(&self) -> Option<String> {
        self.input().map(|input| input.value())
    }

    fn write_input(&self, value: &str) {
        if let Some(input) = self.input() {
            input.set_value(value);
        }
    }

    fn notify_input_changed(&self) {
        let Some(input) = self.input() else {
            return;
        };
        let init = EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(false);
        match Event::new_with_event_init_dict("input", &init) {
            Ok(event) => {
                let _ = input.dispatch_event(&event);
            }
            Err(e) => qc_warn!("input event not created: {}", super::describe_js(&e)),
        }
    }
}

/// `web_sys::Element` for target matching
pub struct DomElement(pub Element);

impl ElementLike for DomElement {
    fn matches(&self, selector: &str) -> bool {
        self.0.matches(selector).unwrap_or(false)
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent_element().map(DomElement)
    }
}

/// Event target as an element, if it is one
pub fn event_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}
