use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::app_error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC-SHA256 of the raw webhook body.
pub const SIGNATURE_HEADER: &str = "Chapa-Signature";

pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `signature` against the body. Must run before the body is parsed.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> AppResult<()> {
    if secret.is_empty() {
        tracing::error!("Webhook secret is not configured, rejecting delivery");
        return Err(AppError::SignatureInvalid);
    }

    let provided = signature.trim().to_ascii_lowercase();
    if provided.is_empty() {
        return Err(AppError::SignatureInvalid);
    }

    let expected = sign_payload(secret, body);
    if constant_time_compare(&provided, &expected) {
        Ok(())
    } else {
        Err(AppError::SignatureInvalid)
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
