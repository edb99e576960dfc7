//! Header containers used at the boundary between HTTP and governance.

/// Header names read and written by the governor.
pub mod names {
    pub const ORIGIN: &str = "Origin";
    pub const USER_AGENT: &str = "User-Agent";
    pub const X_API_TOKEN: &str = "X-Api-Token";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const IF_NONE_MATCH: &str = "If-None-Match";

    pub const ACCESS_CONTROL_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
    pub const ACCESS_CONTROL_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
    pub const ACCESS_CONTROL_ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
    pub const ACCESS_CONTROL_EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";
    pub const ACCESS_CONTROL_MAX_AGE: &str = "Access-Control-Max-Age";
    pub const X_RATELIMIT_LIMIT: &str = "X-RateLimit-Limit";
    pub const X_RATELIMIT_REMAINING: &str = "X-RateLimit-Remaining";
    pub const RETRY_AFTER: &str = "Retry-After";
    pub const ETAG: &str = "ETag";
    pub const LINK: &str = "Link";
}

/// Inbound headers with case-insensitive lookup.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders {
    entries: Vec<(String, String)>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// First value for `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Like `get`, but treats whitespace-only values as absent.
    pub fn get_non_blank(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Outbound headers in insertion order. Setting a name twice replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: Vec<(&'static str, String)>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(n, v)| (*n, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_lookup_ignores_case() {
        let headers = RequestHeaders::new().with("user-agent", "Rspec");
        assert_eq!(headers.get("User-Agent"), Some("Rspec"));
        assert_eq!(headers.get("Origin"), None);
    }

    #[test]
    fn test_blank_values_are_absent() {
        let headers = RequestHeaders::new().with("Origin", "   ");
        assert_eq!(headers.get("Origin"), Some("   "));
        assert_eq!(headers.get_non_blank("Origin"), None);
    }

    #[test]
    fn test_response_set_replaces_and_keeps_order() {
        let mut headers = ResponseHeaders::new();
        headers.set(names::X_RATELIMIT_LIMIT, "60");
        headers.set(names::ETAG, "\"abc\"");
        headers.set(names::X_RATELIMIT_LIMIT, "5000");

        let collected: Vec<_> = headers.iter().collect();
        assert_eq!(
            collected,
            vec![(names::X_RATELIMIT_LIMIT, "5000"), (names::ETAG, "\"abc\"")]
        );
    }
}
