//! Quick Connect Recording: submit interception + URI rewrite pipeline
//!
//! A Rust/WASM implementation of the Quick Connect recording-defaults
//! integration for a remote-desktop web client.
//!
//! # Architecture
//!
//! - `target/` - URI Analyzer: protocol, host and port-presence extraction
//!   with ordered fallback strategies, name sanitizing, stamp formatting
//! - `defaults/` - Defaults Provider: server defaults document, key
//!   normalization, per-session cache
//! - `rewrite/` - Rewrite Engine: `ensure_param` / `set_param` upserts,
//!   template expansion, baseline and server-defaults rule sets
//! - `intercept/` - Interception Controller: cycle driver, re-entrancy
//!   guard, resume strategies
//! - `web/` - Browser bindings: capture listeners, fetch, AngularJS resume
//! - `config.rs` - Configuration types and defaults
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { install } from 'quickconnect-recording';
//!
//! await init();
//!
//! // Server defaults are fetched on every Quick Connect submit
//! const handle = install({ policy: 'server-defaults', fetch_timeout_ms: 5000 });
//!
//! // Inspect what a URI would become with the cached defaults
//! console.log(handle.rewrite('rdp://server1'));
//! console.log(handle.stats());
//! ```

#[macro_use]
mod log;

pub mod config;
pub mod defaults;
pub mod intercept;
pub mod rewrite;
pub mod target;
#[cfg(target_arch = "wasm32")]
pub mod web;

// Public exports
pub use config::*;
pub use defaults::*;
pub use intercept::*;
pub use rewrite::*;
pub use target::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("quickconnect-recording v{}", env!("CARGO_PKG_VERSION"))
}
