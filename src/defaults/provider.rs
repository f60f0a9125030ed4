//! DefaultsProvider: fetch + per-session cache
//!
//! The transport is abstracted behind `DefaultsSource`, so the browser uses
//! `fetch()` while tests use canned bodies. Failures never leave the
//! provider; callers always receive a document.

use std::cell::{Cell, RefCell};
use std::fmt;

use futures::future::LocalBoxFuture;

use super::document::DefaultsDocument;
use crate::config::DefaultsCachePolicy;

/// Why a defaults fetch produced no document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultsError {
    /// Network failure or a rejected `fetch()` promise
    Transport(String),
    /// Non-2xx HTTP status
    Status(u16),
    /// The request was aborted by the fetch timeout
    Timeout(u32),
    /// Body was not valid JSON
    Parse(String),
}

impl fmt::Display for DefaultsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultsError::Transport(msg) => write!(f, "Transport error: {}", msg),
            DefaultsError::Status(code) => write!(f, "Unexpected HTTP status: {}", code),
            DefaultsError::Timeout(ms) => write!(f, "Timed out after {}ms", ms),
            DefaultsError::Parse(msg) => write!(f, "Invalid defaults JSON: {}", msg),
        }
    }
}

impl std::error::Error for DefaultsError {}

impl From<serde_json::Error> for DefaultsError {
    fn from(e: serde_json::Error) -> Self {
        DefaultsError::Parse(e.to_string())
    }
}

/// Where the raw defaults body comes from
pub trait DefaultsSource {
    /// One uncached GET; resolves to the response body of a 2xx reply
    fn fetch(&self) -> LocalBoxFuture<'static, Result<String, DefaultsError>>;
}

/// Owns the source and the last successfully fetched document
pub struct DefaultsProvider<S> {
    source: S,
    policy: DefaultsCachePolicy,
    /// Last successful document; lives as long as the provider (one page session)
    cache: RefCell<Option<DefaultsDocument>>,
    fetches: Cell<u64>,
    failures: Cell<u64>,
}

impl<S: DefaultsSource> DefaultsProvider<S> {
    pub fn new(source: S, policy: DefaultsCachePolicy) -> Self {
        Self {
            source,
            policy,
            cache: RefCell::new(None),
            fetches: Cell::new(0),
            failures: Cell::new(0),
        }
    }

    /// Fetch and parse without touching the cache
    pub async fn try_fetch(&self) -> Result<DefaultsDocument, DefaultsError> {
        self.fetches.set(self.fetches.get() + 1);
        let body = self.source.fetch().await?;
        Ok(DefaultsDocument::from_json(&body)?)
    }

    /// Fetch; every failure resolves to an empty document
    pub async fn fetch_defaults(&self) -> DefaultsDocument {
        match self.try_fetch().await {
            Ok(doc) => doc,
            Err(e) => {
                self.failures.set(self.failures.get() + 1);
                qc_warn!("defaults unavailable: {}", e);
                DefaultsDocument::default()
            }
        }
    }

    /// Document for one interception cycle.
    ///
    /// Honors the cache policy. A successful fetch replaces the cache
    /// wholesale; a failed one falls back to the cached document, or an
    /// empty one before the first success.
    pub async fn load(&self) -> DefaultsDocument {
        if self.policy == DefaultsCachePolicy::Once {
            if let Some(doc) = self.current() {
                return doc;
            }
        }

        // No borrow is held across this await; overlapping cycles share the cache
        match self.try_fetch().await {
            Ok(doc) => {
                *self.cache.borrow_mut() = Some(doc.clone());
                doc
            }
            Err(e) => {
                self.failures.set(self.failures.get() + 1);
                qc_warn!("defaults unavailable, using cached document: {}", e);
                self.current().unwrap_or_default()
            }
        }
    }

    /// Last successfully fetched document
    pub fn current(&self) -> Option<DefaultsDocument> {
        self.cache.borrow().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.borrow().is_some()
    }

    /// Forget the cached document
    pub fn clear(&self) {
        self.cache.borrow_mut().take();
    }

    pub fn policy(&self) -> DefaultsCachePolicy {
        self.policy
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetches.get()
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.get()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
