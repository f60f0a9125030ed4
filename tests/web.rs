//! Browser binding tests (`wasm-pack test --headless --chrome`)

#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use quickconnect_recording::web::{analyze_uri, install, rewrite_uri};
use quickconnect_recording::{QuickConnectConfig, RewritePolicy};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Event, EventInit, HtmlElement, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_rewrite_uri_with_payload() {
    let out = rewrite_uri(
        "vnc://server1",
        Some(r#"{"defaults":{"recording-path":"/data/rec"}}"#.to_string()),
        None,
    )
    .unwrap();
    assert_eq!(out, "vnc://server1?port=5900&recording-path=%2Fdata%2Frec");
}

#[wasm_bindgen_test]
fn test_rewrite_uri_rejects_bad_input() {
    assert!(rewrite_uri("rdp://h", Some("{oops".to_string()), None).is_err());
    assert!(rewrite_uri("rdp://h", None, Some("fastest".to_string())).is_err());
}

#[wasm_bindgen_test]
fn test_rewrite_uri_baseline_policy() {
    let out = rewrite_uri("server1", None, Some("baseline".to_string())).unwrap();
    assert_eq!(out, "server1?security=nla&ignore-cert=true");
}

#[wasm_bindgen_test]
fn test_analyze_uri_object() {
    let target = analyze_uri("rdp://server1:3389").unwrap();
    let protocol = js_sys::Reflect::get(&target, &JsValue::from_str("protocol")).unwrap();
    let has_port = js_sys::Reflect::get(&target, &JsValue::from_str("has_port")).unwrap();
    assert_eq!(protocol.as_string().as_deref(), Some("rdp"));
    assert_eq!(has_port.as_bool(), Some(true));
}

#[wasm_bindgen_test]
fn test_install_rejects_empty_endpoint() {
    let config = js_sys::JSON::parse(r#"{"defaults_endpoint":" "}"#).unwrap();
    let err = install(config).err().unwrap();
    assert_eq!(err.as_string().as_deref(), Some("defaults_endpoint must not be empty"));
}

#[wasm_bindgen_test]
fn test_install_and_uninstall() {
    let config = QuickConnectConfig {
        policy: RewritePolicy::Baseline,
        log_rewrites: false,
        ..QuickConnectConfig::default()
    };
    let mut handle = install(serde_wasm_bindgen::to_value(&config).unwrap()).unwrap();
    assert!(handle.is_installed());
    assert_eq!(handle.phase(), "idle");
    assert!(handle.rewrite("ssh://box").starts_with("ssh://box?typescript-path="));

    handle.uninstall();
    assert!(!handle.is_installed());
}

#[wasm_bindgen_test]
fn test_install_with_undefined_uses_defaults() {
    let handle = install(JsValue::UNDEFINED).unwrap();
    // No defaults fetched yet: only the vnc port rule applies
    assert_eq!(handle.rewrite("vnc://h"), "vnc://h?port=5900");
}

// ============================================================================
// Event suppression against real markup
// ============================================================================

/// Quick Connect input and button appended to the body, removed on drop
struct QuickConnectMarkup {
    input: HtmlInputElement,
    button: HtmlElement,
    /// Clicks seen by a page listener on the button itself
    page_clicks: Rc<Cell<u32>>,
    _on_click: Closure<dyn FnMut(Event)>,
}

impl QuickConnectMarkup {
    fn new(uri: &str) -> Self {
        let document = web_sys::window().unwrap().document().unwrap();
        let body = document.body().unwrap();

        let input: HtmlInputElement = document.create_element("input").unwrap().dyn_into().unwrap();
        input.set_class_name("quickconnect-field");
        input.set_value(uri);
        let button: HtmlElement = document.create_element("button").unwrap().dyn_into().unwrap();
        button.set_class_name("quickconnect-button");
        body.append_child(&input).unwrap();
        body.append_child(&button).unwrap();

        let page_clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&page_clicks);
        let on_click = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            counter.set(counter.get() + 1);
        });
        button
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .unwrap();

        Self {
            input,
            button,
            page_clicks,
            _on_click: on_click,
        }
    }

    /// Dispatch a bubbling, cancelable click on the button
    fn click(&self) -> Event {
        let init = EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        let event = Event::new_with_event_init_dict("click", &init).unwrap();
        self.button.dispatch_event(&event).unwrap();
        event
    }
}

impl Drop for QuickConnectMarkup {
    fn drop(&mut self) {
        self.input.remove();
        self.button.remove();
    }
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

/// Server-defaults config whose endpoint does not exist on the test server
fn unreachable_defaults_config() -> JsValue {
    let config = QuickConnectConfig {
        defaults_endpoint: "/quickconnect-recording-test/no-such-endpoint".to_string(),
        fetch_timeout_ms: 2_000,
        log_rewrites: false,
        ..QuickConnectConfig::default()
    };
    serde_wasm_bindgen::to_value(&config).unwrap()
}

#[wasm_bindgen_test]
async fn test_click_suppressed_before_fetch_then_replayed() {
    let markup = QuickConnectMarkup::new("vnc://h");
    let handle = install(unreachable_defaults_config()).unwrap();

    let event = markup.click();

    // Contract: the native action is stopped synchronously, before the fetch resolves
    assert!(event.default_prevented());
    assert_eq!(markup.page_clicks.get(), 0);
    // The cycle is queued, not yet polled
    assert_eq!(handle.phase(), "capturing");

    for _ in 0..200 {
        if markup.input.value() != "vnc://h" {
            break;
        }
        sleep(10).await;
    }

    // Failed fetch: empty defaults, only the vnc port rule applies
    assert_eq!(markup.input.value(), "vnc://h?port=5900");
    // Rewrite and resume run in the same turn; the replayed click reaches the page once
    assert_eq!(markup.page_clicks.get(), 1);
    assert_eq!(handle.phase(), "idle");
}

#[wasm_bindgen_test]
fn test_uninstalled_handle_leaves_clicks_alone() {
    let markup = QuickConnectMarkup::new("vnc://h");
    let mut handle = install(unreachable_defaults_config()).unwrap();
    handle.uninstall();

    let event = markup.click();

    assert!(!event.default_prevented());
    assert_eq!(markup.page_clicks.get(), 1);
    assert_eq!(markup.input.value(), "vnc://h");
}
