//! `fetch()`-backed DefaultsSource
//!
//! GET with `cache: no-cache` and `credentials: same-origin`. An optional
//! AbortController timer bounds the whole exchange, body included.

use std::cell::Cell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestCache, RequestCredentials, RequestInit, Response, Window};

use super::describe_js;
use crate::defaults::{DefaultsError, DefaultsSource};

pub struct FetchSource {
    endpoint: String,
    timeout_ms: u32,
}

impl FetchSource {
    pub fn new(endpoint: &str, timeout_ms: u32) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            timeout_ms,
        }
    }
}

impl DefaultsSource for FetchSource {
    fn fetch(&self) -> LocalBoxFuture<'static, Result<String, DefaultsError>> {
        let endpoint = self.endpoint.clone();
        let timeout_ms = self.timeout_ms;
        Box::pin(async move { fetch_body(&endpoint, timeout_ms).await })
    }
}

fn transport(e: JsValue) -> DefaultsError {
    DefaultsError::Transport(describe_js(&e))
}

async fn fetch_body(endpoint: &str, timeout_ms: u32) -> Result<String, DefaultsError> {
    let window = web_sys::window().ok_or_else(|| DefaultsError::Transport("no window".into()))?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_cache(RequestCache::NoCache);
    opts.set_credentials(RequestCredentials::SameOrigin);

    let timer = match timeout_ms {
        0 => None,
        ms => Some(AbortTimer::start(&window, &opts, ms)?),
    };

    let result = exchange(&window, endpoint, &opts).await;
    match (result, &timer) {
        (Err(DefaultsError::Transport(_)), Some(t)) if t.fired() => Err(DefaultsError::Timeout(timeout_ms)),
        (result, _) => result,
    }
}

async fn exchange(window: &Window, endpoint: &str, opts: &RequestInit) -> Result<String, DefaultsError> {
    let request = Request::new_with_str_and_init(endpoint, opts).map_err(transport)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?
        .dyn_into()
        .map_err(transport)?;

    if !response.ok() {
        return Err(DefaultsError::Status(response.status()));
    }

    let body = JsFuture::from(response.text().map_err(transport)?)
        .await
        .map_err(transport)?;
    body.as_string()
        .ok_or_else(|| DefaultsError::Parse("response body is not text".into()))
}

/// Aborts the request when the timeout fires; cleared on drop
struct AbortTimer {
    window: Window,
    handle: i32,
    fired: Rc<Cell<bool>>,
    _callback: Closure<dyn FnMut()>,
}

impl AbortTimer {
    fn start(window: &Window, opts: &RequestInit, timeout_ms: u32) -> Result<Self, DefaultsError> {
        let controller = AbortController::new().map_err(transport)?;
        opts.set_signal(Some(&controller.signal()));

        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let callback = Closure::<dyn FnMut()>::new(move || {
            flag.set(true);
            controller.abort();
        });
        let handle = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                i32::try_from(timeout_ms).unwrap_or(i32::MAX),
            )
            .map_err(transport)?;

        Ok(Self {
            window: window.clone(),
            handle,
            fired,
            _callback: callback,
        })
    }

    fn fired(&self) -> bool {
        self.fired.get()
    }
}

impl Drop for AbortTimer {
    fn drop(&mut self) {
        self.window.clear_timeout_with_handle(self.handle);
    }
}
