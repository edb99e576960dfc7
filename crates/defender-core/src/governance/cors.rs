//! CORS policy.
//!
//! Any non-empty Origin is echoed back verbatim. Without an Origin no CORS
//! header is written at all, not even a wildcard.

use super::config::CorsConfig;
use super::headers::{RequestHeaders, ResponseHeaders, names};

/// CORS outcome for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsDecision {
    pub allowed: bool,
    pub allow_origin: Option<String>,
    pub allow_methods: Vec<String>,
    pub expose_headers: Vec<String>,
}

impl CorsDecision {
    /// Write the decision onto `headers`. No-op when not allowed.
    pub fn apply(&self, headers: &mut ResponseHeaders) {
        let Some(origin) = self.allow_origin.as_deref().filter(|_| self.allowed) else {
            return;
        };

        headers.set(names::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.set(
            names::ACCESS_CONTROL_ALLOW_METHODS,
            self.allow_methods.join(", "),
        );
        if !self.expose_headers.is_empty() {
            headers.set(
                names::ACCESS_CONTROL_EXPOSE_HEADERS,
                self.expose_headers.join(", "),
            );
        }
    }
}

/// Stateless origin policy.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    config: CorsConfig,
}

impl CorsPolicy {
    pub fn new(config: CorsConfig) -> Self {
        Self { config }
    }

    pub fn decide(&self, origin: Option<&str>) -> CorsDecision {
        match origin.filter(|o| !o.is_empty()) {
            Some(origin) => CorsDecision {
                allowed: true,
                allow_origin: Some(origin.to_string()),
                allow_methods: self.config.allow_methods.clone(),
                expose_headers: self.config.expose_headers.clone(),
            },
            None => CorsDecision {
                allowed: false,
                allow_origin: None,
                allow_methods: Vec::new(),
                expose_headers: Vec::new(),
            },
        }
    }

    /// Headers for an `OPTIONS` preflight.
    pub fn preflight(&self, request: &RequestHeaders) -> ResponseHeaders {
        let mut headers = ResponseHeaders::new();
        let decision = self.decide(request.get(names::ORIGIN));
        if !decision.allowed {
            return headers;
        }

        decision.apply(&mut headers);
        headers.set(
            names::ACCESS_CONTROL_ALLOW_HEADERS,
            self.config.allow_headers.join(", "),
        );
        headers.set(
            names::ACCESS_CONTROL_MAX_AGE,
            self.config.max_age_secs.to_string(),
        );
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_echoed_with_methods() {
        let policy = CorsPolicy::default();
        let mut headers = ResponseHeaders::new();
        policy.decide(Some("http://ohanapi.org")).apply(&mut headers);

        assert_eq!(
            headers.get(names::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some("http://ohanapi.org")
        );
        let methods = headers.get(names::ACCESS_CONTROL_ALLOW_METHODS).unwrap();
        for method in ["GET", "POST", "PUT"] {
            assert!(methods.contains(method), "{method} missing from {methods}");
        }
    }

    #[test]
    fn test_no_origin_means_no_headers() {
        let policy = CorsPolicy::default();
        let decision = policy.decide(None);
        assert!(!decision.allowed);

        let mut headers = ResponseHeaders::new();
        decision.apply(&mut headers);
        assert!(headers.is_empty());

        policy.decide(Some("")).apply(&mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_any_non_empty_origin_is_echoed_verbatim() {
        let policy = CorsPolicy::default();

        let decision = policy.decide(Some("  "));
        assert!(decision.allowed);
        assert_eq!(decision.allow_origin.as_deref(), Some("  "));

        let mut headers = ResponseHeaders::new();
        policy.decide(Some("null")).apply(&mut headers);
        assert_eq!(headers.get(names::ACCESS_CONTROL_ALLOW_ORIGIN), Some("null"));
    }

    #[test]
    fn test_configured_methods_are_used() {
        let policy = CorsPolicy::new(CorsConfig {
            allow_methods: vec!["GET".into(), "PATCH".into()],
            ..CorsConfig::default()
        });
        let decision = policy.decide(Some("https://example.org"));
        assert_eq!(decision.allow_methods, vec!["GET", "PATCH"]);
    }

    #[test]
    fn test_preflight_adds_allow_headers_and_max_age() {
        let policy = CorsPolicy::default();
        let request = RequestHeaders::new().with("Origin", "https://example.org");
        let headers = policy.preflight(&request);

        assert_eq!(
            headers.get(names::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some("https://example.org")
        );
        assert!(headers.contains(names::ACCESS_CONTROL_ALLOW_HEADERS));
        assert_eq!(headers.get(names::ACCESS_CONTROL_MAX_AGE), Some("1728000"));

        assert!(policy.preflight(&RequestHeaders::new()).is_empty());
    }
}
