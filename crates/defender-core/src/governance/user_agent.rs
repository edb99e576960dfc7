//! User-Agent gate.

use super::headers::{RequestHeaders, names};

/// A request passes only with a User-Agent that is present and not blank.
pub fn validate(headers: &RequestHeaders) -> bool {
    headers.get_non_blank(names::USER_AGENT).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_user_agent_passes() {
        let headers = RequestHeaders::new().with("User-Agent", "Rspec");
        assert!(validate(&headers));
    }

    #[test]
    fn test_missing_or_blank_user_agent_fails() {
        assert!(!validate(&RequestHeaders::new()));
        assert!(!validate(&RequestHeaders::new().with("User-Agent", "")));
        assert!(!validate(&RequestHeaders::new().with("User-Agent", " \t")));
    }
}
