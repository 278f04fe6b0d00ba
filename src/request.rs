use serde_json::{Map, Value};

/// The JSON object sent in a webhook delivery.
pub type Payload = Map<String, Value>;

/// Request headers with case-insensitive lookup.
#[derive(Debug, Clone, Default)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header. Repeated names are kept, lookup returns the first one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Headers(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// An inbound webhook delivery, as received from the HTTP layer.
///
/// The body is kept exactly as it was sent, because signatures are computed
/// over the raw bytes and not over the parsed JSON.
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    headers: Headers,
    body: Vec<u8>,
    remote_address: Option<String>,
}

impl IncomingRequest {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        IncomingRequest {
            headers: Headers::new(),
            body: body.into(),
            remote_address: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_remote_address(mut self, remote_address: Option<String>) -> Self {
        self.remote_address = remote_address;
        self
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn remote_address(&self) -> Option<&str> {
        self.remote_address.as_deref()
    }

    /// The full value of the Content-Type header, or an empty string if it is missing.
    pub fn content_type(&self) -> &str {
        self.headers.get("Content-Type").unwrap_or_default()
    }
}
