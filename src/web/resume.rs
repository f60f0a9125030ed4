//! Browser resume strategies
//!
//! `ScopeInvoke` calls the Quick Connect form's AngularJS scope handler on
//! the next digest. `ClickReplay` clicks the trigger again while the
//! re-entrancy guard is held.

use js_sys::{Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use super::describe_js;
use crate::intercept::{ReentrancyGuard, ResumeOutcome, ResumeStrategy};

pub struct ScopeInvoke {
    document: Document,
    form_selector: String,
}

impl ScopeInvoke {
    pub fn new(document: Document, form_selector: &str) -> Self {
        Self {
            document,
            form_selector: form_selector.to_string(),
        }
    }

    /// `Ok(false)` when some piece of the AngularJS chain is missing
    fn invoke(&self) -> Result<bool, JsValue> {
        let Some(form) = self.document.query_selector(&self.form_selector)? else {
            return Ok(false);
        };
        let Some(window) = web_sys::window() else {
            return Ok(false);
        };

        let angular = Reflect::get(&window, &JsValue::from_str("angular"))?;
        if !angular.is_object() {
            return Ok(false);
        }
        let Some(element) = method(&angular, "element")? else {
            return Ok(false);
        };
        let wrapped = element.call1(&angular, &form)?;
        let Some(scope_of) = method(&wrapped, "scope")? else {
            return Ok(false);
        };
        let scope = scope_of.call0(&wrapped)?;
        if !scope.is_object() {
            return Ok(false);
        }

        let Some(quick_connect) = method(&scope, "quickConnect")? else {
            return Ok(false);
        };
        let Some(apply_async) = method(&scope, "$applyAsync")? else {
            return Ok(false);
        };

        let target = scope.clone();
        let handler = Closure::once_into_js(move || {
            if let Err(e) = quick_connect.call0(&target) {
                qc_error!("quickConnect() threw: {}", describe_js(&e));
            }
        });
        apply_async.call1(&scope, &handler)?;
        Ok(true)
    }
}

impl ResumeStrategy for ScopeInvoke {
    fn label(&self) -> &'static str {
        "scope-invoke"
    }

    fn resume(&self, _guard: &ReentrancyGuard) -> ResumeOutcome {
        match self.invoke() {
            Ok(true) => ResumeOutcome::Resumed,
            Ok(false) => ResumeOutcome::Unavailable,
            Err(e) => {
                qc_warn!("scope handler unavailable: {}", describe_js(&e));
                ResumeOutcome::Unavailable
            }
        }
    }
}

/// Property `name` of `target` if it is callable
fn method(target: &JsValue, name: &str) -> Result<Option<Function>, JsValue> {
    if !target.is_object() && !target.is_function() {
        return Ok(None);
    }
    Ok(Reflect::get(target, &JsValue::from_str(name))?
        .dyn_into::<Function>()
        .ok())
}

pub struct ClickReplay {
    document: Document,
    trigger_selector: String,
}

impl ClickReplay {
    pub fn new(document: Document, trigger_selector: &str) -> Self {
        Self {
            document,
            trigger_selector: trigger_selector.to_string(),
        }
    }
}

impl ResumeStrategy for ClickReplay {
    fn label(&self) -> &'static str {
        "click-replay"
    }

    fn resume(&self, guard: &ReentrancyGuard) -> ResumeOutcome {
        let trigger = self
            .document
            .query_selector(&self.trigger_selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        match trigger {
            Some(button) => {
                guard.hold(|| button.click());
                ResumeOutcome::Resumed
            }
            None => ResumeOutcome::Unavailable,
        }
    }
}
