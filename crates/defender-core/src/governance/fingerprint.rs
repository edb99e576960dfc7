//! Conditional-GET validation by content fingerprint.
//!
//! Nothing is stored: the fingerprint is recomputed from the freshly fetched
//! page on every request, so a match only depends on deterministic
//! serialization.

use sha2::{Digest, Sha256};

/// Result of comparing a body against the client's validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvaluation {
    /// Strong ETag for the body, quotes included.
    pub fingerprint: String,
    pub not_modified: bool,
}

/// SHA-256 of `body` as a quoted hex ETag.
pub fn fingerprint(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// Exact string comparison; weak validators and lists are not interpreted.
pub fn evaluate(body: &[u8], validator: Option<&str>) -> CacheEvaluation {
    let fingerprint = fingerprint(body);
    let not_modified = validator.is_some_and(|v| v == fingerprint);

    CacheEvaluation {
        fingerprint,
        not_modified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_bodies_share_a_fingerprint() {
        let body = br#"[{"name":"Example"}]"#;
        assert_eq!(fingerprint(body), fingerprint(body));
    }

    #[test]
    fn test_any_byte_change_alters_the_fingerprint() {
        assert_ne!(
            fingerprint(br#"[{"name":"Example"}]"#),
            fingerprint(br#"[{"name":"Examplf"}]"#)
        );
        assert_ne!(fingerprint(b"[]"), fingerprint(b"[] "));
    }

    #[test]
    fn test_fingerprint_is_quoted_hex() {
        let etag = fingerprint(b"");
        assert_eq!(
            etag,
            "\"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\""
        );
    }

    #[test]
    fn test_matching_validator_is_not_modified() {
        let body = b"[1,2,3]";
        let etag = fingerprint(body);
        let evaluation = evaluate(body, Some(&etag));
        assert!(evaluation.not_modified);
        assert_eq!(evaluation.fingerprint, etag);
    }

    #[test]
    fn test_stale_or_missing_validator_is_modified() {
        let body = b"[1,2,3]";
        assert!(!evaluate(body, Some("1234567890")).not_modified);
        assert!(!evaluate(body, None).not_modified);

        let unquoted = fingerprint(body).trim_matches('"').to_string();
        assert!(!evaluate(body, Some(&unquoted)).not_modified);
    }
}
