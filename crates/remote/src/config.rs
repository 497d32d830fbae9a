use std::env;
use std::time::Duration;

use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for `HttpRemoteClient`.
#[derive(Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    /// Raw `Cookie` header value carrying the session.
    pub session_cookie: Option<String>,
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_cookie: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RemoteConfig {
    /// Reads `COURSES_API_URL`, `COURSES_SESSION_COOKIE` and
    /// `COURSES_HTTP_TIMEOUT_SECS`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        match lookup("COURSES_API_URL") {
            Some(url) if !url.trim().is_empty() => config.base_url = url.trim().to_string(),
            _ => debug!("COURSES_API_URL not set, using default: {DEFAULT_BASE_URL}"),
        }

        config.session_cookie = lookup("COURSES_SESSION_COOKIE")
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        if let Some(raw) = lookup("COURSES_HTTP_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                Ok(_) => warn!("COURSES_HTTP_TIMEOUT_SECS must be > 0, using default"),
                Err(e) => warn!("Invalid COURSES_HTTP_TIMEOUT_SECS value: {e}"),
            }
        }

        config
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field(
                "session_cookie",
                &self.session_cookie.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = RemoteConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.session_cookie.is_none());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn reads_all_values() {
        let config = RemoteConfig::from_lookup(lookup_from(&[
            ("COURSES_API_URL", "https://courses.example.com/"),
            ("COURSES_SESSION_COOKIE", "sid=abc123"),
            ("COURSES_HTTP_TIMEOUT_SECS", "4"),
        ]));
        assert_eq!(config.base_url, "https://courses.example.com/");
        assert_eq!(config.session_cookie.as_deref(), Some("sid=abc123"));
        assert_eq!(config.timeout, Duration::from_secs(4));
    }

    #[test]
    fn ignores_bad_timeout_and_blank_cookie() {
        let config = RemoteConfig::from_lookup(lookup_from(&[
            ("COURSES_SESSION_COOKIE", "  "),
            ("COURSES_HTTP_TIMEOUT_SECS", "soon"),
        ]));
        assert!(config.session_cookie.is_none());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn debug_redacts_cookie() {
        let config = RemoteConfig::default().with_session_cookie("sid=secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }
}
