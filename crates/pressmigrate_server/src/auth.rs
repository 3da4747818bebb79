//! Bearer token authentication for the export endpoints.
//!
//! The configured token is never compared directly. Both the expected and
//! the presented token are run through HMAC-SHA256 under a per-process
//! random key and the tags are compared in constant time.

use crate::error::{ServerError, ServerResult};
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Length of generated tokens.
pub const TOKEN_LEN: usize = 64;

/// Generates a random alphanumeric token.
pub fn generate_token() -> Zeroizing<String> {
    Zeroizing::new(
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect(),
    )
}

/// Validates `Authorization: Bearer <token>` headers.
#[derive(Clone)]
pub struct TokenAuth {
    key: Zeroizing<[u8; 32]>,
    expected: [u8; 32],
}

impl TokenAuth {
    /// Creates a validator accepting exactly `token`.
    pub fn new(token: &str) -> ServerResult<Self> {
        let mut key = Zeroizing::new([0u8; 32]);
        rand::thread_rng().fill_bytes(&mut key[..]);
        let expected = Self::tag(&key, token)?;
        Ok(Self { key, expected })
    }

    fn mac(key: &[u8; 32], token: &str) -> ServerResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(key)
            .map_err(|e| ServerError::Internal(format!("hmac key: {e}")))?;
        mac.update(token.as_bytes());
        Ok(mac)
    }

    fn tag(key: &[u8; 32], token: &str) -> ServerResult<[u8; 32]> {
        Ok(Self::mac(key, token)?.finalize().into_bytes().into())
    }

    /// Checks an `Authorization` header value.
    ///
    /// The scheme is matched case-insensitively. A header without a bearer
    /// token is [`ServerError::MissingToken`]; a token that does not match
    /// is [`ServerError::InvalidToken`].
    pub fn authorize(&self, header: Option<&str>) -> ServerResult<()> {
        let token = header
            .map(str::trim)
            .and_then(|h| {
                let (scheme, rest) = h.split_at_checked(7)?;
                scheme.eq_ignore_ascii_case("bearer ").then_some(rest.trim())
            })
            .filter(|t| !t.is_empty())
            .ok_or(ServerError::MissingToken)?;

        Self::mac(&self.key, token)?
            .verify_slice(&self.expected)
            .map_err(|_| ServerError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(*a, *b);
    }

    #[test]
    fn accepts_matching_token() {
        let auth = TokenAuth::new("s3cret").unwrap();
        assert!(auth.authorize(Some("Bearer s3cret")).is_ok());
        assert!(auth.authorize(Some("bearer s3cret")).is_ok());
        assert!(auth.authorize(Some("BEARER   s3cret  ")).is_ok());
    }

    #[test]
    fn rejects_missing_token() {
        let auth = TokenAuth::new("s3cret").unwrap();
        for header in [None, Some(""), Some("Bearer "), Some("Basic abc"), Some("s3cret")] {
            assert!(
                matches!(auth.authorize(header), Err(ServerError::MissingToken)),
                "{header:?}"
            );
        }
    }

    #[test]
    fn rejects_wrong_token() {
        let auth = TokenAuth::new("s3cret").unwrap();
        assert!(matches!(
            auth.authorize(Some("Bearer s3cre")),
            Err(ServerError::InvalidToken)
        ));
        assert!(matches!(
            auth.authorize(Some("Bearer S3CRET")),
            Err(ServerError::InvalidToken)
        ));
    }
}
