//! Console diagnostics
//!
//! Thin wrappers over `web_sys::console` with a fixed component prefix.
//! Off-wasm the messages are discarded, so native tests never reach into JS.

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) const PREFIX: &str = "[quickconnect-recording]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Log,
    Warn,
    Error,
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn emit(level: Level, message: &str) {
    let line = wasm_bindgen::JsValue::from_str(&format!("{} {}", PREFIX, message));
    match level {
        Level::Log => web_sys::console::log_1(&line),
        Level::Warn => web_sys::console::warn_1(&line),
        Level::Error => web_sys::console::error_1(&line),
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn emit(_level: Level, _message: &str) {}

macro_rules! qc_log {
    ($($arg:tt)*) => {
        $crate::log::emit($crate::log::Level::Log, &format!($($arg)*))
    };
}

macro_rules! qc_warn {
    ($($arg:tt)*) => {
        $crate::log::emit($crate::log::Level::Warn, &format!($($arg)*))
    };
}

#[allow(unused_macros)]
macro_rules! qc_error {
    ($($arg:tt)*) => {
        $crate::log::emit($crate::log::Level::Error, &format!($($arg)*))
    };
}
