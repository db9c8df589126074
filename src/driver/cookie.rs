//! Cookie Driver
//!
//! Stores each entry as one cookie in the ambient [`CookieJar`]:
//!
//! ```text
//! <escaped-key>=<escaped-value>; Max-Age=<seconds>; Path=/
//! ```
//!
//! Removal writes the same name with an empty value and an `Expires` date
//! in the past.
//!
//! ## Expiry
//!
//! An entry with a TTL is written twice: the value cookie and its shadow
//! cookie `<escaped-key>.___exp` both carry a native `Max-Age`, so the jar
//! drops them on its own. The shadow holds the exact deadline in
//! milliseconds, which lets the expiration layer hide the entry before the
//! whole-second native expiry fires. Entries without a TTL get the
//! configured default max-age (about ten years).
//!
//! ## Escaping
//!
//! Cookie headers cannot carry `;`, `=`, whitespace or non-ASCII bytes, so
//! names and values are percent-encoded. Letters, digits and `@*_+-./` are
//! left alone, which keeps the `.___exp` suffix readable on the wire.

use super::{Driver, DriverKind};
use crate::config::CookieOptions;
use crate::medium::CookieJar;
use crate::now_millis;
use crate::runtime::Runtime;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cookie written and deleted by the support probe.
pub const PROBE_COOKIE: &str = "___isSupported___";

/// `Expires` value used to delete a cookie.
const EXPIRED_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Characters that are percent-encoded in cookie names and values.
const COOKIE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'@')
    .remove(b'*')
    .remove(b'_')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'/');

pub fn escape(text: &str) -> String {
    utf8_percent_encode(text, COOKIE_ESCAPE).to_string()
}

/// Reverses [`escape`]. Text that does not decode to UTF-8 is returned as is.
pub fn unescape(text: &str) -> String {
    percent_decode_str(text)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| text.to_string())
}

/// Splits a cookie header into unescaped names and still-escaped values.
/// The first occurrence of a name wins.
fn parse_header(header: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for pair in header.split(';') {
        let Some((name, value)) = pair.trim().split_once('=') else {
            continue;
        };

        let name = unescape(name.trim());
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);

        if !pairs.iter().any(|(existing, _)| *existing == name) {
            pairs.push((name, value.to_string()));
        }
    }

    pairs
}

pub struct CookieDriver {
    jar: Arc<dyn CookieJar>,
    options: CookieOptions,
}

impl CookieDriver {
    pub fn new(jar: Arc<dyn CookieJar>, options: CookieOptions) -> Self {
        Self { jar, options }
    }

    /// Builds the driver from the runtime's jar if it passes the probe.
    pub fn from_runtime(runtime: &Runtime, options: CookieOptions) -> Option<Self> {
        if !Self::is_supported(runtime) {
            return None;
        }
        runtime
            .cookie_jar()
            .map(|jar| Self::new(Arc::clone(jar), options))
    }

    /// Checks that cookies are enabled and that a probe cookie sticks.
    pub fn probe(jar: &dyn CookieJar) -> bool {
        if !jar.cookie_enabled() {
            return false;
        }

        let written = jar.write(&format!(
            "{}=value; Max-Age={}; Path=/",
            PROBE_COOKIE,
            crate::config::DEFAULT_COOKIE_MAX_AGE_SECS
        ));
        if let Err(err) = written {
            debug!(error = %err, "Cookie jar rejected the probe cookie");
            return false;
        }

        let persisted = jar
            .read()
            .map(|header| header.contains(PROBE_COOKIE))
            .unwrap_or(false);

        let _ = jar.write(&format!("{}=; Expires={}; Path=/", PROBE_COOKIE, EXPIRED_DATE));
        persisted
    }

    fn header(&self) -> Vec<(String, String)> {
        match self.jar.read() {
            Ok(header) => parse_header(&header),
            Err(err) => {
                warn!(error = %err, "Failed to read cookie header");
                Vec::new()
            }
        }
    }

    fn write_cookie(&self, key: &str, value: &str, max_age_secs: u64) -> bool {
        let line = format!(
            "{}={}; Max-Age={}; Path={}",
            escape(key),
            escape(value),
            max_age_secs,
            self.options.path
        );

        match self.jar.write(&line) {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "Cookie write failed");
                false
            }
        }
    }
}

impl fmt::Debug for CookieDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieDriver")
            .field("options", &self.options)
            .finish()
    }
}

impl Driver for CookieDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Cookie
    }

    fn is_supported(runtime: &Runtime) -> bool {
        runtime
            .cookie_jar()
            .is_some_and(|jar| Self::probe(jar.as_ref()))
    }

    fn raw_get(&self, key: &str) -> Option<String> {
        self.header()
            .into_iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| unescape(&value))
    }

    fn raw_set(&self, key: &str, value: &str) -> bool {
        self.write_cookie(key, value, self.options.default_max_age_secs)
    }

    fn raw_set_expiring(&self, key: &str, value: &str, expires_at: u64) -> bool {
        let remaining_ms = expires_at.saturating_sub(now_millis());
        self.write_cookie(key, value, remaining_ms.div_ceil(1000))
    }

    fn raw_remove(&self, key: &str) -> bool {
        let existed = self.raw_has(key);

        let line = format!(
            "{}=; Expires={}; Path={}",
            escape(key),
            EXPIRED_DATE,
            self.options.path
        );
        if let Err(err) = self.jar.write(&line) {
            warn!(key, error = %err, "Cookie removal failed");
        }

        existed
    }

    fn raw_has(&self, key: &str) -> bool {
        self.header().iter().any(|(name, _)| name == key)
    }

    fn raw_keys(&self) -> Vec<String> {
        self.header().into_iter().map(|(name, _)| name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::InMemoryCookieJar;

    fn driver() -> (Arc<InMemoryCookieJar>, CookieDriver) {
        let jar = Arc::new(InMemoryCookieJar::new());
        let driver = CookieDriver::new(jar.clone(), CookieOptions::default());
        (jar, driver)
    }

    #[test]
    fn test_escape_delimiters_and_unicode() {
        assert_eq!(escape("a;b=c d"), "a%3Bb%3Dc%20d");
        assert_eq!(escape("key.___exp"), "key.___exp");
        assert_eq!(unescape(&escape("Кириллица")), "Кириллица");
        assert_eq!(unescape(&escape("⦁")), "⦁");
        assert_eq!(unescape("%E0%A4%A"), "%E0%A4%A");
    }

    #[test]
    fn test_wire_format() {
        let (jar, driver) = driver();

        assert!(driver.raw_set("a b", "\"x;y\""));
        assert_eq!(jar.read().unwrap(), "a%20b=%22x%3By%22");
        assert_eq!(driver.raw_get("a b"), Some("\"x;y\"".to_string()));
        assert_eq!(driver.raw_keys(), vec!["a b".to_string()]);
    }

    #[test]
    fn test_remove() {
        let (jar, driver) = driver();

        driver.raw_set("k", "1");
        assert!(driver.raw_remove("k"));
        assert!(!driver.raw_remove("k"));
        assert!(jar.is_empty());
    }

    #[test]
    fn test_expiring_write_sets_native_max_age() {
        let (jar, driver) = driver();

        let expires_at = now_millis() + 50;
        assert!(driver.raw_set_expiring("k", "1", expires_at));
        assert!(driver.raw_has("k"));

        // Native max-age is rounded up to a whole second
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(!driver.raw_has("k"));
        assert!(jar.is_empty());
    }

    #[test]
    fn test_parse_header_first_wins_and_quotes() {
        let pairs = parse_header("a=1; b=\"2\"; a=3; junk");
        assert_eq!(
            pairs,
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_probe() {
        let jar = Arc::new(InMemoryCookieJar::new());
        let runtime = Runtime::browser().with_cookie_jar(jar.clone());
        assert!(CookieDriver::is_supported(&runtime));
        assert!(jar.is_empty());

        let runtime = Runtime::browser().with_cookie_jar(Arc::new(InMemoryCookieJar::disabled()));
        assert!(!CookieDriver::is_supported(&runtime));
        assert!(CookieDriver::from_runtime(&runtime, CookieOptions::default()).is_none());
    }
}
