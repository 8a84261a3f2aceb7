//! HMAC-SHA256 payload signing.
//!
//! The signature covers the exact serialized envelope bytes sent as the
//! request body — sign what you send. Receivers recompute the HMAC over the
//! raw body with the shared secret and compare constant-time against the
//! `X-Webhook-Signature` header with the `sha256=` prefix stripped.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix carried by every signature header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Compute the signature for a serialized payload.
///
/// Returns the hex digest prefixed with `sha256=`. Pure and deterministic.
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a signature header against a raw request body.
///
/// Returns `false` (never an error) for a mismatch, a wrong secret, or a
/// header missing the `sha256=` prefix, so receiving-side callers can branch
/// without special-casing malformed input.
pub fn verify(body: &[u8], signature_header: &str, secret: &str) -> bool {
    let Some(received_hex) = signature_header.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };

    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    let expected_hex = hex::encode(mac.finalize().into_bytes());

    constant_time_eq(received_hex.as_bytes(), expected_hex.as_bytes())
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
