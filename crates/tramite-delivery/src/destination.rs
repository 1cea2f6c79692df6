use once_cell::sync::Lazy;
use regex::Regex;

/// Largest base64 payload the e-mail provider accepts (25 MiB).
pub const MAX_ENCODED_PAYLOAD_BYTES: usize = 25 * 1024 * 1024;

static DESTINATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Loose e-mail shape check: something, `@`, a dotted domain, no spaces.
#[must_use]
pub fn is_valid_destination(address: &str) -> bool {
    DESTINATION.is_match(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_addresses() {
        assert!(is_valid_destination("ciudadano@example.hn"));
        assert!(is_valid_destination("a.b+c@sub.domain.org"));
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for address in ["", "plain", "a@b", "@b.com", "a@.com ", "a b@c.com", "a@@b.com"] {
            assert!(!is_valid_destination(address), "{address:?} accepted");
        }
    }
}
