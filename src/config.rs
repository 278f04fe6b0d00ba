use log::debug;
use serde_json::Value;
use std::{collections::HashMap, fs};
use thiserror::Error;

/// The key of the webhook token in the tokens file, if nothing else is configured.
pub const DEFAULT_TOKEN_KEY: &str = "webhookGit";

/// A custom error describing the error cases of loading the shared secret.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The tokens file cannot be read.
    #[error("cannot read token file {0}: {1}")]
    Unreadable(String, std::io::Error),
    /// The tokens file is not a JSON object.
    #[error("token file {0} is not a valid JSON object: {1}")]
    InvalidJson(String, serde_json::Error),
    /// The tokens file doesn't have a string under the key.
    #[error("token file {0} doesn't have a string value for {1}")]
    MissingKey(String, String),
}

/// Load the webhook token from a JSON file, e.g. `{"webhookGit": "1234"}`.
pub fn load_token(path: &str, key: &str) -> Result<String, ConfigError> {
    let content =
        fs::read_to_string(path).map_err(|err| ConfigError::Unreadable(path.to_string(), err))?;
    let tokens: HashMap<String, Value> = serde_json::from_str(&content)
        .map_err(|err| ConfigError::InvalidJson(path.to_string(), err))?;

    let token = tokens
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::MissingKey(path.to_string(), key.to_string()))?;
    debug!("Loaded webhook token {key} from {path}.");

    Ok(token.to_string())
}
