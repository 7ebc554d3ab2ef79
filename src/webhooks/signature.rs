//! Webhook signature verification (HMAC-SHA256, `X-Hub-Signature-256`).
//!
//! GitHub signs each delivery with the shared secret and sends the digest as
//! `sha256=<hex>`. Deliveries are verified before any parsing happens.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const PREFIX: &str = "sha256=";

/// Why a delivery's signature was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature header is missing")]
    Missing,

    #[error("signature header is not of the form sha256=<hex>")]
    Malformed,

    #[error("signature does not match payload")]
    Mismatch,
}

/// The shared webhook secret.
#[derive(Clone)]
pub struct WebhookSecret(Vec<u8>);

impl WebhookSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        WebhookSecret(secret.into())
    }

    /// Computes the HMAC-SHA256 of `payload` under this secret.
    pub fn sign(&self, payload: &[u8]) -> Vec<u8> {
        self.mac(payload).finalize().into_bytes().to_vec()
    }

    /// Formats a signature the way GitHub sends it.
    pub fn header_value(&self, payload: &[u8]) -> String {
        format!("{}{}", PREFIX, hex::encode(self.sign(payload)))
    }

    /// Checks the `X-Hub-Signature-256` header against `payload`.
    ///
    /// The comparison is constant-time.
    pub fn verify(&self, payload: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
        let header = header.ok_or(SignatureError::Missing)?;
        let expected = header
            .strip_prefix(PREFIX)
            .and_then(|digest| hex::decode(digest).ok())
            .ok_or(SignatureError::Malformed)?;

        self.mac(payload)
            .verify_slice(&expected)
            .map_err(|_| SignatureError::Mismatch)
    }

    fn mac(&self, payload: &[u8]) -> HmacSha256 {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.0)
            .expect("HMAC can take key of any size");
        mac.update(payload);
        mac
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(..)")
    }
}
