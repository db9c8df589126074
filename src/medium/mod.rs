//! Physical Media
//!
//! The drivers never touch storage directly. They talk to one of two
//! medium interfaces, shaped after the browser APIs they stand in for:
//!
//! - [`NameValueStore`]: a string-keyed, string-valued store scoped to an
//!   origin (the `localStorage` shape)
//! - [`CookieJar`]: the ambient cookie header (the `document.cookie` shape),
//!   read as one `a=b; c=d` string and written one `Set-Cookie` line at a time
//!
//! A host embeds the crate by implementing these traits over its real media.
//! The crate ships reference implementations:
//!
//! - [`InMemoryStore`]: process-local name/value store with a byte quota
//! - [`FileStore`]: durable name/value store backed by a JSON file
//! - [`InMemoryCookieJar`]: cookie jar with native expiry and size limits
//!
//! All media take `&self` and are `Send + Sync`, so one medium can back
//! several storage facades at once (as `localStorage` does across scripts).

pub mod cookie_jar;
pub mod file;
pub mod memory;

pub use cookie_jar::{InMemoryCookieJar, DEFAULT_MAX_COOKIES, MAX_COOKIE_BYTES};
pub use file::FileStore;
pub use memory::{InMemoryStore, DEFAULT_QUOTA_BYTES};

use crate::error::MediumError;

/// A durable, string-keyed, string-valued store.
pub trait NameValueStore: Send + Sync {
    /// Number of stored items.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the item at `index`, in the medium's own order.
    fn key(&self, index: usize) -> Option<String>;

    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores an item. Fails when the medium refuses the write
    /// (quota exceeded, restricted mode).
    fn set_item(&self, key: &str, value: &str) -> Result<(), MediumError>;

    /// Removes an item. Removing a missing item is a no-op.
    fn remove_item(&self, key: &str);

    /// All item names.
    fn keys(&self) -> Vec<String> {
        (0..self.len()).filter_map(|i| self.key(i)).collect()
    }
}

/// The cookie header of a browsing context.
pub trait CookieJar: Send + Sync {
    /// Whether the runtime allows cookies at all.
    fn cookie_enabled(&self) -> bool;

    /// The current cookies as a header string: `name=value; name2=value2`.
    /// Expired cookies are never included.
    fn read(&self) -> Result<String, MediumError>;

    /// Applies one cookie line, e.g. `name=value; Max-Age=60; Path=/`.
    /// A line whose `Max-Age` is zero or whose `Expires` is in the past
    /// deletes the cookie.
    fn write(&self, cookie: &str) -> Result<(), MediumError>;
}
