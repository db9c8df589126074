//! In-Memory Cookie Jar
//!
//! Emulates the `document.cookie` accessor pair: reads return every live
//! cookie as one header string, writes take one `Set-Cookie`-style line.
//!
//! ## Supported Attributes
//!
//! - `Max-Age=<seconds>`: relative expiry; zero or negative deletes
//! - `Expires=<HTTP-date>`: absolute expiry; a past date deletes
//! - `Path=<path>`: cookies are identified by name and path
//!
//! `Max-Age` wins over `Expires` when both are present. Other attributes
//! (`Domain`, `Secure`, `SameSite`, ...) are accepted and ignored.
//!
//! ## Limits
//!
//! Like a browser, the jar refuses cookies whose name plus value exceed
//! 4096 bytes and caps the number of cookies it holds.

use super::CookieJar;
use crate::error::MediumError;
use crate::now_millis;
use chrono::DateTime;
use parking_lot::RwLock;

/// Largest name plus value a single cookie may carry.
pub const MAX_COOKIE_BYTES: usize = 4096;

/// Default cap on the number of cookies in one jar.
pub const DEFAULT_MAX_COOKIES: usize = 180;

#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    value: String,
    path: String,
    /// Milliseconds since epoch; `None` means a session cookie
    expires_at: Option<u64>,
}

impl StoredCookie {
    fn is_live(&self, now: u64) -> bool {
        self.expires_at.map(|at| at > now).unwrap_or(true)
    }
}

/// A parsed cookie line.
#[derive(Debug)]
struct CookieLine {
    name: String,
    value: String,
    path: String,
    expires_at: Option<u64>,
}

fn parse_line(line: &str, now: u64) -> Result<CookieLine, MediumError> {
    let mut parts = line.split(';');

    let pair = parts.next().unwrap_or_default().trim();
    let (name, value) = pair
        .split_once('=')
        .ok_or_else(|| MediumError::MalformedCookie(line.to_string()))?;

    let mut max_age: Option<f64> = None;
    let mut expires: Option<u64> = None;
    let mut path = "/".to_string();

    for attr in parts {
        let (attr_name, attr_value) = match attr.split_once('=') {
            Some((n, v)) => (n.trim(), v.trim()),
            None => (attr.trim(), ""),
        };

        if attr_name.eq_ignore_ascii_case("max-age") {
            max_age = attr_value.parse::<f64>().ok();
        } else if attr_name.eq_ignore_ascii_case("expires") {
            expires = DateTime::parse_from_rfc2822(attr_value)
                .ok()
                .map(|date| date.timestamp_millis().max(0) as u64);
        } else if attr_name.eq_ignore_ascii_case("path") && !attr_value.is_empty() {
            path = attr_value.to_string();
        }
    }

    let expires_at = match (max_age, expires) {
        (Some(secs), _) if secs <= 0.0 => Some(0),
        (Some(secs), _) => Some(now.saturating_add((secs * 1000.0) as u64)),
        (None, at) => at,
    };

    Ok(CookieLine {
        name: name.trim().to_string(),
        value: value.trim().to_string(),
        path,
        expires_at,
    })
}

#[derive(Debug)]
pub struct InMemoryCookieJar {
    cookies: RwLock<Vec<StoredCookie>>,
    enabled: bool,
    max_cookies: usize,
}

impl Default for InMemoryCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCookieJar {
    pub fn new() -> Self {
        Self {
            cookies: RwLock::new(Vec::new()),
            enabled: true,
            max_cookies: DEFAULT_MAX_COOKIES,
        }
    }

    /// A jar for a runtime where the user switched cookies off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    pub fn with_max_cookies(mut self, max_cookies: usize) -> Self {
        self.max_cookies = max_cookies;
        self
    }

    /// Number of live cookies.
    pub fn len(&self) -> usize {
        let now = now_millis();
        self.cookies.read().iter().filter(|c| c.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CookieJar for InMemoryCookieJar {
    fn cookie_enabled(&self) -> bool {
        self.enabled
    }

    fn read(&self) -> Result<String, MediumError> {
        if !self.enabled {
            return Ok(String::new());
        }

        let now = now_millis();
        let mut cookies = self.cookies.write();
        cookies.retain(|c| c.is_live(now));

        Ok(cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; "))
    }

    fn write(&self, cookie: &str) -> Result<(), MediumError> {
        if !self.enabled {
            return Err(MediumError::CookiesDisabled);
        }

        let now = now_millis();
        let line = parse_line(cookie, now)?;

        let size = line.name.len() + line.value.len();
        if size > MAX_COOKIE_BYTES {
            return Err(MediumError::CookieTooLarge {
                size,
                max: MAX_COOKIE_BYTES,
            });
        }

        let mut cookies = self.cookies.write();
        cookies.retain(|c| c.is_live(now));

        let existing = cookies
            .iter()
            .position(|c| c.name == line.name && c.path == line.path);

        // An already-expired line is a deletion
        if line.expires_at.is_some_and(|at| at <= now) {
            if let Some(index) = existing {
                cookies.remove(index);
            }
            return Ok(());
        }

        let stored = StoredCookie {
            name: line.name,
            value: line.value,
            path: line.path,
            expires_at: line.expires_at,
        };

        match existing {
            Some(index) => cookies[index] = stored,
            None if cookies.len() >= self.max_cookies => {
                return Err(MediumError::TooManyCookies(self.max_cookies));
            }
            None => cookies.push(stored),
        }

        Ok(())
    }
}
