use crate::request::IncomingRequest;
use subtle::ConstantTimeEq;

/// Header carrying the shared secret as-is.
pub const GITLAB_HEADER: &str = "X-Gitlab-Token";

/// Verify the GitLab token, it has to be equal to the shared secret.
/// The body is not part of the check.
pub fn verify_gitlab_request(request: &IncomingRequest, token: &str) -> bool {
    request
        .headers()
        .get(GITLAB_HEADER)
        .map(|value| value.as_bytes().ct_eq(token.as_bytes()).into())
        .unwrap_or(false)
}
