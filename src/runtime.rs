//! Runtime Description
//!
//! A [`Runtime`] tells the storage facade where it is running and which
//! media the host exposes. It takes the place of probing global objects:
//! the host decides what exists, the drivers decide whether it works.
//!
//! ```
//! use stashkv::medium::{InMemoryCookieJar, InMemoryStore};
//! use stashkv::Runtime;
//! use std::sync::Arc;
//!
//! let runtime = Runtime::browser()
//!     .with_local_storage(Arc::new(InMemoryStore::new()))
//!     .with_cookie_jar(Arc::new(InMemoryCookieJar::new()));
//!
//! assert!(runtime.is_browser());
//! assert!(Runtime::server().local_storage().is_none());
//! ```

use crate::medium::{CookieJar, NameValueStore};
use std::fmt;
use std::sync::Arc;

/// The kind of execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// A browser-like context that may expose durable media and cookies.
    Browser,
    /// A server or other non-browser context; only memory storage is used.
    Server,
}

#[derive(Clone)]
pub struct Runtime {
    context: Context,
    local_storage: Option<Arc<dyn NameValueStore>>,
    cookie_jar: Option<Arc<dyn CookieJar>>,
}

impl Runtime {
    /// A browser-like context with no media attached yet.
    pub fn browser() -> Self {
        Self {
            context: Context::Browser,
            local_storage: None,
            cookie_jar: None,
        }
    }

    /// A non-browser context.
    pub fn server() -> Self {
        Self {
            context: Context::Server,
            local_storage: None,
            cookie_jar: None,
        }
    }

    pub fn with_local_storage(mut self, store: Arc<dyn NameValueStore>) -> Self {
        self.local_storage = Some(store);
        self
    }

    pub fn with_cookie_jar(mut self, jar: Arc<dyn CookieJar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn is_browser(&self) -> bool {
        self.context == Context::Browser
    }

    pub fn local_storage(&self) -> Option<&Arc<dyn NameValueStore>> {
        self.local_storage.as_ref()
    }

    pub fn cookie_jar(&self) -> Option<&Arc<dyn CookieJar>> {
        self.cookie_jar.as_ref()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("context", &self.context)
            .field("local_storage", &self.local_storage.is_some())
            .field("cookie_jar", &self.cookie_jar.is_some())
            .finish()
    }
}
