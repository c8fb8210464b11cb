//! Cached access token and its expiry arithmetic

use std::fmt;

use super::clock::UnixMillis;

/// Subtracted from the declared lifetime so a token is retired slightly
/// before the identity provider would reject it.
pub const EXPIRY_MARGIN_MS: u64 = 60_000;

/// Bearer token plus the instant it stops being used.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub token: String,
    pub expires_at: UnixMillis,
}

impl StoredToken {
    /// `expires_at = issued_at + expires_in * 1000 - 60000`.
    ///
    /// A lifetime at or below the margin yields an expiry at or before
    /// `issued_at`, so the next read mints a fresh token.
    pub fn new(token: String, expires_in_secs: u64, issued_at: UnixMillis) -> Self {
        let expires_at = issued_at
            .saturating_add(expires_in_secs.saturating_mul(1000))
            .saturating_sub(EXPIRY_MARGIN_MS);

        Self { token, expires_at }
    }

    /// Exactly-at-expiry counts as expired.
    pub fn is_expired(&self, now: UnixMillis) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_subtracts_margin() {
        let token = StoredToken::new("abc".to_string(), 3600, 1_700_000_000_000);
        assert_eq!(token.expires_at, 1_700_000_000_000 + 3_600_000 - 60_000);

        let token = StoredToken::new("abc".to_string(), 120, 0);
        assert_eq!(token.expires_at, 60_000);
    }

    #[test]
    fn test_expired_at_exact_instant() {
        let token = StoredToken::new("abc".to_string(), 120, 0);
        assert!(!token.is_expired(59_999));
        assert!(token.is_expired(60_000));
        assert!(token.is_expired(60_001));
    }

    #[test]
    fn test_lifetime_shorter_than_margin_is_already_expired() {
        let issued = 1_000_000;
        let token = StoredToken::new("abc".to_string(), 30, issued);
        assert!(token.expires_at < issued);
        assert!(token.is_expired(issued));

        let token = StoredToken::new("abc".to_string(), 60, issued);
        assert!(token.is_expired(issued));
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = StoredToken::new("super-secret-bearer".to_string(), 3600, 0);
        assert!(!format!("{:?}", token).contains("super-secret-bearer"));
    }
}
