//! Credential verification at the connection boundary.
//!
//! ARCHITECTURE
//! ============
//! The relay treats the credential issuer as opaque: all it needs is
//! `verify(token) -> Option<user_id>`. [`TokenVerifier`] is that seam; the
//! shipped implementation checks self-contained signed tokens
//! (`v1.<user_id>.<expires_unix>.<signature>`) so admission needs no
//! database round trip. [`HmacTokenVerifier::mint`] exists for issuing in
//! dev tooling and tests.

use std::fmt::Write;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

/// Opaque credential issuer boundary: token in, user id (or nothing) out.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Option<i64>;
}

/// Verifies sha256-signed expiring tokens minted with a shared secret.
pub struct HmacTokenVerifier {
    secret: String,
}

impl HmacTokenVerifier {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    /// Mint a token for `user_id` valid for `ttl`.
    #[must_use]
    pub fn mint(&self, user_id: i64, ttl: Duration) -> String {
        let expires = now_unix() + i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let sig = self.signature(user_id, expires);
        format!("v1.{user_id}.{expires}.{sig}")
    }

    fn signature(&self, user_id: i64, expires: i64) -> String {
        let digest = Sha256::digest(format!("{}.{user_id}.{expires}", self.secret).as_bytes());
        bytes_to_hex(&digest)
    }
}

impl TokenVerifier for HmacTokenVerifier {
    fn verify(&self, token: &str) -> Option<i64> {
        let mut parts = token.split('.');
        if parts.next() != Some("v1") {
            return None;
        }
        let user_id: i64 = parts.next()?.parse().ok()?;
        let expires: i64 = parts.next()?.parse().ok()?;
        let sig = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        if expires <= now_unix() {
            return None;
        }
        if sig != self.signature(user_id, expires) {
            return None;
        }
        Some(user_id)
    }
}

fn now_unix() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_secs()).unwrap_or(0)
}

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_then_verify_round_trips() {
        let verifier = HmacTokenVerifier::new("secret");
        let token = verifier.mint(42, Duration::from_secs(60));
        assert_eq!(verifier.verify(&token), Some(42));
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = HmacTokenVerifier::new("secret");
        let token = verifier.mint(42, Duration::ZERO);
        assert_eq!(verifier.verify(&token), None);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = HmacTokenVerifier::new("secret-a");
        let verifier = HmacTokenVerifier::new("secret-b");
        let token = issuer.mint(42, Duration::from_secs(60));
        assert_eq!(verifier.verify(&token), None);
    }

    #[test]
    fn tampered_user_id_is_rejected() {
        let verifier = HmacTokenVerifier::new("secret");
        let token = verifier.mint(42, Duration::from_secs(60));
        let tampered = token.replacen("42", "43", 1);
        assert_eq!(verifier.verify(&tampered), None);
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        let verifier = HmacTokenVerifier::new("secret");
        for garbage in ["", "v1", "v1.x.y.z", "v2.1.99999999999.abc", "v1.1.2.3.4.5"] {
            assert_eq!(verifier.verify(garbage), None, "{garbage:?}");
        }
    }

    #[test]
    fn bytes_to_hex_formats_pairs() {
        assert_eq!(bytes_to_hex(&[0x00, 0xff, 0x0a]), "00ff0a");
    }
}
