use crate::request::IncomingRequest;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;
use subtle::ConstantTimeEq;

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Basic authorization credentials, as sent by Gitea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    /// Parse an `Authorization: Basic ...` header value. Returns `None` for other
    /// schemes or if the credentials are not valid base64 encoded UTF-8.
    pub fn parse(header: &str) -> Option<Self> {
        let (scheme, encoded) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':').unwrap_or((decoded.as_str(), ""));

        Some(BasicCredentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn from_request(request: &IncomingRequest) -> Option<Self> {
        request
            .headers()
            .get(AUTHORIZATION_HEADER)
            .and_then(BasicCredentials::parse)
    }
}

/// The canonical header form of the credentials, e.g. `Basic dXNlcjpwYXNz`.
impl fmt::Display for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        write!(f, "Basic {encoded}")
    }
}

/// Verify basic authorization: the canonical header form of the credentials
/// has to be equal to the shared secret.
pub fn verify_basic_auth(request: &IncomingRequest, token: &str) -> bool {
    BasicCredentials::from_request(request)
        .map(|credentials| credentials.to_string().as_bytes().ct_eq(token.as_bytes()).into())
        .unwrap_or(false)
}
