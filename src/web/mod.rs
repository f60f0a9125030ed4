//! Browser bindings
//!
//! `install()` registers capture-phase `click`, `submit` and `blur`
//! listeners on the document and hands qualifying events to the
//! InterceptionController. A deferred capture stops the event before the
//! listener returns and finishes the cycle on the microtask queue.

pub mod dom;
pub mod fetch;
pub mod resume;

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event};

use crate::config::{BaselineProfile, ConfigError, QuickConnectConfig, RewritePolicy};
use crate::defaults::DefaultsDocument;
use crate::intercept::{
    is_quick_connect_target, Capture, InterceptionController, ReentrancyGuard, ResumeStrategy, Trigger,
};
use crate::rewrite::RewriteEngine;
use crate::target::ParsedTarget;

use dom::{event_element, DomElement, DomHost};
use fetch::FetchSource;
use resume::{ClickReplay, ScopeInvoke};

type WebController = InterceptionController<DomHost, FetchSource>;
type Listener = Closure<dyn FnMut(Event)>;

/// Best-effort text of a thrown JS value
pub(crate) fn describe_js(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// =============================================================================
// Installation
// =============================================================================

/// Installed interception; dropping or `uninstall()`-ing it removes the listeners
#[wasm_bindgen]
pub struct QuickConnectHandle {
    controller: Rc<WebController>,
    document: Document,
    listeners: Vec<(&'static str, Listener)>,
}

/// Install Quick Connect interception on the current document.
///
/// `config` is a partial `QuickConnectConfig`; omitted fields take their
/// defaults, `undefined` takes all of them.
#[wasm_bindgen]
pub fn install(config: JsValue) -> Result<QuickConnectHandle, JsValue> {
    let config: QuickConnectConfig = if config.is_undefined() || config.is_null() {
        QuickConnectConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| to_js(ConfigError::Invalid(e.to_string())))?
    };
    config.validate().map_err(to_js)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("install() needs a browser document"))?;

    let selectors = &config.selectors;
    let resumers: Vec<Box<dyn ResumeStrategy>> = vec![
        Box::new(ScopeInvoke::new(document.clone(), &selectors.form)),
        Box::new(ClickReplay::new(document.clone(), &selectors.trigger)),
    ];
    let controller = Rc::new(InterceptionController::new(
        &config,
        DomHost::new(document.clone(), &selectors.input),
        FetchSource::new(&config.defaults_endpoint, config.fetch_timeout_ms),
        resumers,
        ReentrancyGuard::new(),
    ));

    let mut handle = QuickConnectHandle {
        controller,
        document,
        listeners: Vec::new(),
    };

    let depth = selectors.ancestor_depth;
    handle.listen("click", Trigger::Click, selectors.trigger.clone(), depth)?;
    // submit and blur target the element itself
    handle.listen("submit", Trigger::Submit, selectors.form.clone(), 0)?;
    handle.listen("blur", Trigger::Blur, selectors.input.clone(), 0)?;

    qc_log!("Quick Connect interception installed ({} policy)", config.policy);
    Ok(handle)
}

impl QuickConnectHandle {
    fn listen(
        &mut self,
        event_type: &'static str,
        trigger: Trigger,
        selector: String,
        depth: usize,
    ) -> Result<(), JsValue> {
        let controller = Rc::clone(&self.controller);
        let listener = Listener::new(move |event: Event| {
            let Some(target) = event_element(&event) else {
                return;
            };
            if !is_quick_connect_target(&DomElement(target), &selector, depth) {
                return;
            }
            dispatch(&event, controller.capture(trigger));
        });

        self.document.add_event_listener_with_callback_and_bool(
            event_type,
            listener.as_ref().unchecked_ref(),
            true,
        )?;
        self.listeners.push((event_type, listener));
        Ok(())
    }

    fn remove_listeners(&mut self) {
        for (event_type, listener) in self.listeners.drain(..) {
            if let Err(e) = self.document.remove_event_listener_with_callback_and_bool(
                event_type,
                listener.as_ref().unchecked_ref(),
                true,
            ) {
                qc_warn!("{} listener not removed: {}", event_type, describe_js(&e));
            }
        }
    }
}

fn dispatch(event: &Event, capture: Capture) {
    match capture {
        Capture::PassThrough | Capture::RewrittenInPlace { .. } => {}
        Capture::Deferred(cycle) => {
            event.stop_immediate_propagation();
            event.prevent_default();
            spawn_local(async move {
                let report = cycle.await;
                if report.resumed_by.is_none() {
                    qc_error!("Quick Connect submit {} could not be resumed", report.cycle);
                }
            });
        }
    }
}

impl Drop for QuickConnectHandle {
    fn drop(&mut self) {
        self.remove_listeners();
    }
}

#[wasm_bindgen]
impl QuickConnectHandle {
    /// Remove the listeners; later events reach the page untouched
    pub fn uninstall(&mut self) {
        self.remove_listeners();
        qc_log!("Quick Connect interception removed");
    }

    #[wasm_bindgen(js_name = isInstalled)]
    pub fn is_installed(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Diagnostic counters as a plain object
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.controller.stats()).map_err(to_js)
    }

    /// Phase of the most recent cycle
    pub fn phase(&self) -> String {
        self.controller.phase().to_string()
    }

    /// Rewrite `uri` with the installed policy and the cached defaults, if any
    pub fn rewrite(&self, uri: &str) -> String {
        let defaults = self.controller.provider().current().unwrap_or_default();
        self.controller.engine().rewrite(uri, &defaults)
    }

    /// Forget the cached defaults document
    #[wasm_bindgen(js_name = clearDefaults)]
    pub fn clear_defaults(&self) {
        self.controller.provider().clear();
    }
}

// =============================================================================
// Standalone helpers
// =============================================================================

/// Rewrite `uri` against a defaults payload without installing anything.
///
/// `defaults_json` is the endpoint's response body; `policy` is
/// `"server-defaults"` (default) or `"baseline"`.
#[wasm_bindgen(js_name = rewriteUri)]
pub fn rewrite_uri(uri: &str, defaults_json: Option<String>, policy: Option<String>) -> Result<String, JsValue> {
    let policy = match policy.as_deref() {
        None => RewritePolicy::default(),
        Some(name) => RewritePolicy::from_name(name)
            .ok_or_else(|| to_js(ConfigError::Invalid(format!("unknown policy '{}'", name))))?,
    };
    let defaults = match defaults_json.as_deref() {
        None | Some("") => DefaultsDocument::default(),
        Some(body) => DefaultsDocument::from_json(body).map_err(to_js)?,
    };
    let engine = RewriteEngine::new(policy, BaselineProfile::default());
    Ok(engine.rewrite(uri, &defaults))
}

/// Protocol, host and port presence as seen by the analyzer
#[wasm_bindgen(js_name = analyzeUri)]
pub fn analyze_uri(uri: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&ParsedTarget::analyze(uri)).map_err(to_js)
}
