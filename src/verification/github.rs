use crate::request::IncomingRequest;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Header carrying the HMAC-SHA256 signature of the body.
pub const GITHUB_HEADER: &str = "X-Hub-Signature-256";

type HmacSha256 = Hmac<Sha256>;

/// Compute the signature GitHub would send for this body: `sha256=` and the hex HMAC.
pub fn sign(body: &[u8], token: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(token.as_bytes()).ok()?;
    mac.update(body);
    Some(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Verify the GitHub signature over the raw body. The comparison runs in constant time.
pub fn verify_github_request(request: &IncomingRequest, token: &str) -> bool {
    let Some(signature) = request.headers().get(GITHUB_HEADER) else {
        return false;
    };
    let Some(expected) = sign(request.body(), token) else {
        return false;
    };

    signature.as_bytes().ct_eq(expected.as_bytes()).into()
}
